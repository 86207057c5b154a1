//! Core types for caudal
//!
//! This crate provides the fundamental types used throughout the caudal project:
//!
//! - [`Transaction`] / [`TxnKind`] - A validated cash-flow record
//! - [`Granularity`] - Period size for bucketing (month, quarter, year, or none)
//! - [`period`] - Canonical bucket keys, period start dates and Spanish labels
//! - [`format`] - es-ES EUR currency, percent and date rendering
//!
//! # Example
//!
//! ```
//! use caudal_core::{Granularity, NaiveDate, Transaction, TxnKind};
//! use rust_decimal_macros::dec;
//!
//! let txn = Transaction::new(
//!     NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!     dec!(100),
//!     TxnKind::Income,
//!     "Salary",
//! );
//!
//! assert_eq!(txn.signed_amount(), dec!(100));
//! assert_eq!(Granularity::Monthly.key_for(txn.date).as_deref(), Some("2024-01"));
//! assert_eq!(Granularity::Monthly.label_for(txn.date), "enero 2024");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod format;
pub mod period;
pub mod transaction;

pub use format::{format_date, format_date_short, format_eur, format_percent};
pub use period::{month_name_es, quarter_of, Granularity, ParseGranularityError, GRAND_TOTAL_LABEL};
pub use transaction::{Transaction, TxnKind};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
