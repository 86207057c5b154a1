//! Period aggregation: grouping the filtered sequence into calendar buckets.

use caudal_core::{Granularity, NaiveDate, Transaction, TxnKind};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One aggregated period of the filtered transaction sequence.
///
/// Buckets partition their input: every filtered transaction belongs to
/// exactly one bucket, and the bucket sums equal the sums of its members'
/// amounts by kind. Buckets are recomputed wholesale on every pipeline run;
/// none persist across runs.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodBucket {
    /// Canonical period key: `YYYY-MM`, `YYYY-Qn` or `YYYY`.
    pub key: String,
    /// Human label, e.g. `enero 2024`, `2024 Q1`, `2024`.
    pub label: String,
    /// First calendar day of the period. Used solely for ordering.
    pub start: NaiveDate,
    /// Sum of member income amounts.
    pub income: Decimal,
    /// Sum of member expense amounts.
    pub expense: Decimal,
    /// The member transactions, in filtered order.
    pub transactions: Vec<Transaction>,
}

impl PeriodBucket {
    /// Income minus expense for this period.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.income - self.expense
    }

    /// Number of member transactions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.transactions.len()
    }
}

/// Group a filtered sequence into period buckets, ordered ascending by
/// period start.
///
/// [`Granularity::AllPeriods`] bypasses bucketing and returns an empty
/// vector; the grand-totals mode computes directly from the filtered
/// sequence instead.
#[must_use]
pub fn aggregate(transactions: &[Transaction], granularity: Granularity) -> Vec<PeriodBucket> {
    if !granularity.is_bucketed() {
        return Vec::new();
    }

    let mut grouped: BTreeMap<String, PeriodBucket> = BTreeMap::new();

    for txn in transactions {
        let Some(key) = granularity.key_for(txn.date) else {
            continue;
        };
        let bucket = grouped.entry(key.clone()).or_insert_with(|| PeriodBucket {
            key,
            label: granularity.label_for(txn.date),
            start: granularity.period_start(txn.date),
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            transactions: Vec::new(),
        });
        match txn.kind {
            TxnKind::Income => bucket.income += txn.amount,
            TxnKind::Expense => bucket.expense += txn.amount,
        }
        bucket.transactions.push(txn.clone());
    }

    let mut buckets: Vec<PeriodBucket> = grouped.into_values().collect();
    // Key order is already chronological within one granularity; the sort
    // states the ordering contract explicitly
    buckets.sort_by_key(|b| b.start);
    buckets
}
