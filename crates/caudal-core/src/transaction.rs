//! Transaction record and its kind.
//!
//! A [`Transaction`] is a single validated cash-flow movement. The stored
//! amount is a magnitude; whether it adds to or subtracts from the balance is
//! carried by [`TxnKind`], not by the sign of the number.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a cash-flow movement.
///
/// Serialized as the source strings `income` / `expense` (the JSON field is
/// named `type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    /// Money flowing in.
    Income,
    /// Money flowing out.
    Expense,
}

impl TxnKind {
    /// Parse a kind from its raw source string, case-insensitively.
    ///
    /// Returns `None` for anything other than `income` / `expense`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// True for [`TxnKind::Income`].
    #[must_use]
    pub const fn is_income(self) -> bool {
        matches!(self, Self::Income)
    }

    /// The Spanish badge label shown in the transaction table.
    #[must_use]
    pub const fn badge_label(self) -> &'static str {
        match self {
            Self::Income => "Ingreso",
            Self::Expense => "Gasto",
        }
    }
}

impl fmt::Display for TxnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => f.write_str("income"),
            Self::Expense => f.write_str("expense"),
        }
    }
}

/// A single validated cash-flow record.
///
/// # Examples
///
/// ```
/// use caudal_core::{NaiveDate, Transaction, TxnKind};
/// use rust_decimal_macros::dec;
///
/// let txn = Transaction::new(
///     NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
///     dec!(40),
///     TxnKind::Expense,
///     "Food",
/// )
/// .with_description("Groceries");
///
/// assert_eq!(txn.year(), 2024);
/// assert_eq!(txn.signed_amount(), dec!(-40));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar date of the movement (no time component).
    pub date: NaiveDate,
    /// Magnitude of the movement; the sign lives in `kind`.
    pub amount: Decimal,
    /// Income or expense.
    #[serde(rename = "type")]
    pub kind: TxnKind,
    /// Non-empty, case-preserving category label.
    pub category: String,
    /// Free-text description, possibly empty.
    #[serde(default)]
    pub description: String,
}

impl Transaction {
    /// Create a transaction with an empty description.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        kind: TxnKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            kind,
            category: category.into(),
            description: String::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The amount signed by kind: income positive, expense negative.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TxnKind::Income => self.amount,
            TxnKind::Expense => -self.amount,
        }
    }

    /// Calendar year of the transaction date.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}
