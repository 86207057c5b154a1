//! Pure cash-flow reporting pipeline.
//!
//! Turns a validated transaction sequence into everything a dashboard
//! renders: filtered rows, period buckets, KPIs and chart series. The
//! stages compose as one pure function per invocation:
//!
//! ```text
//! transactions -> apply_filters -> aggregate -> Kpis::compute -> DashboardView
//! ```
//!
//! Nothing is cached and no state survives between invocations; a changed
//! filter or granularity recomputes the whole view from the transaction
//! sequence.
//!
//! # Example
//!
//! ```
//! use caudal_core::{Granularity, NaiveDate, Transaction, TxnKind};
//! use caudal_report::{build_view, FilterConfig};
//! use rust_decimal_macros::dec;
//!
//! let transactions = vec![
//!     Transaction::new(
//!         NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
//!         dec!(100),
//!         TxnKind::Income,
//!         "Salary",
//!     ),
//!     Transaction::new(
//!         NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
//!         dec!(40),
//!         TxnKind::Expense,
//!         "Food",
//!     ),
//! ];
//!
//! let view = build_view(&transactions, &FilterConfig::default(), Granularity::Monthly);
//! assert_eq!(view.kpis.figures.period_label, "enero 2024");
//! assert_eq!(view.kpis.net_display, "60,00 €");
//! assert_eq!(view.buckets.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod filter;
pub mod kpi;
pub mod view;

pub use aggregate::{aggregate, PeriodBucket};
pub use filter::{apply_filters, FilterConfig};
pub use kpi::{balance_series, category_totals, kind_totals, KpiStatus, Kpis, TopCategory};
pub use view::{
    build_view, BucketSummary, Chart, ChartSet, DashboardView, KpiPanel, Series, TableModel,
    TableRow,
};

use rust_decimal::Decimal;

/// Convert a sum to the `f64` representation used by chart series.
pub(crate) fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse().unwrap_or(0.0)
}
