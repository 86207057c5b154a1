//! KPI derivation: headline figures, statuses, top categories and the
//! running balance.

use crate::aggregate::PeriodBucket;
use crate::decimal_to_f64;
use caudal_core::{Granularity, NaiveDate, Transaction, TxnKind, GRAND_TOTAL_LABEL};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Period label shown when there is nothing to display.
const NO_PERIOD_LABEL: &str = "N/A";

/// Traffic-light classification of a KPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiStatus {
    /// Healthy.
    Ok,
    /// Borderline.
    Warn,
    /// Negative.
    Risk,
}

impl KpiStatus {
    /// Classify a signed amount: positive is `Ok`, zero is `Warn`, negative
    /// is `Risk`.
    #[must_use]
    pub fn of_signed(value: Decimal) -> Self {
        if value > Decimal::ZERO {
            Self::Ok
        } else if value < Decimal::ZERO {
            Self::Risk
        } else {
            Self::Warn
        }
    }

    /// Classify a net margin percentage: above 15 is `Ok`, non-negative is
    /// `Warn`, negative is `Risk`.
    #[must_use]
    pub fn of_margin(margin: f64) -> Self {
        if margin > 15.0 {
            Self::Ok
        } else if margin >= 0.0 {
            Self::Warn
        } else {
            Self::Risk
        }
    }
}

/// A kind's highest-total category over the filtered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCategory {
    /// The category label.
    pub category: String,
    /// Its summed amount.
    pub total: Decimal,
}

/// Headline figures for one (filter, granularity) pair.
///
/// Display income and expense describe the most recent bucket when
/// bucketed, or grand totals when not; top categories and the ending
/// balance always describe the entire filtered sequence.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    /// Label of the period the income and expense figures describe;
    /// `Total General` for grand totals, `N/A` when there is no data.
    pub period_label: String,
    /// Display income.
    pub income: Decimal,
    /// Display expense.
    pub expense: Decimal,
    /// Display income minus display expense.
    pub net_cashflow: Decimal,
    /// Net margin as a percentage of display income, sign-preserving when
    /// income is not positive.
    pub net_margin_pct: f64,
    /// Classification of the margin.
    pub margin_status: KpiStatus,
    /// Classification of the net cashflow.
    pub net_status: KpiStatus,
    /// Highest-total expense category, if any has a positive total.
    pub top_expense: Option<TopCategory>,
    /// Highest-total income category, if any has a positive total.
    pub top_income: Option<TopCategory>,
    /// Cumulative net cashflow over every day in the filtered sequence.
    pub ending_balance: Decimal,
    /// Classification of the ending balance.
    pub balance_status: KpiStatus,
}

impl Kpis {
    /// Derive the KPIs from the filtered sequence and its buckets.
    #[must_use]
    pub fn compute(
        filtered: &[Transaction],
        buckets: &[PeriodBucket],
        granularity: Granularity,
    ) -> Self {
        let (income, expense, period_label) = if granularity.is_bucketed() {
            match buckets.last() {
                Some(latest) => (latest.income, latest.expense, latest.label.clone()),
                None => (Decimal::ZERO, Decimal::ZERO, NO_PERIOD_LABEL.to_string()),
            }
        } else if filtered.is_empty() {
            (Decimal::ZERO, Decimal::ZERO, NO_PERIOD_LABEL.to_string())
        } else {
            let (income, expense) = kind_totals(filtered);
            (income, expense, GRAND_TOTAL_LABEL.to_string())
        };

        let net = income - expense;
        let margin = net_margin_pct(income, net);
        let ending_balance = balance_series(filtered)
            .last()
            .map_or(Decimal::ZERO, |(_, balance)| *balance);

        Self {
            period_label,
            income,
            expense,
            net_cashflow: net,
            net_margin_pct: margin,
            margin_status: KpiStatus::of_margin(margin),
            net_status: KpiStatus::of_signed(net),
            top_expense: top_category(&category_totals(filtered, TxnKind::Expense)),
            top_income: top_category(&category_totals(filtered, TxnKind::Income)),
            ending_balance,
            balance_status: KpiStatus::of_signed(ending_balance),
        }
    }
}

/// Net margin as a percentage of income.
///
/// When income is not positive the ratio is undefined; the margin then
/// collapses to the sign of the net cashflow: `100`, `-100` or `0`.
fn net_margin_pct(income: Decimal, net: Decimal) -> f64 {
    if income > Decimal::ZERO {
        decimal_to_f64(net / income * Decimal::ONE_HUNDRED)
    } else if net > Decimal::ZERO {
        100.0
    } else if net < Decimal::ZERO {
        -100.0
    } else {
        0.0
    }
}

/// Grand income and expense totals over a transaction sequence.
#[must_use]
pub fn kind_totals(transactions: &[Transaction]) -> (Decimal, Decimal) {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for txn in transactions {
        match txn.kind {
            TxnKind::Income => income += txn.amount,
            TxnKind::Expense => expense += txn.amount,
        }
    }
    (income, expense)
}

/// Per-category totals for one kind, in first-seen input order.
#[must_use]
pub fn category_totals(transactions: &[Transaction], kind: TxnKind) -> Vec<(String, Decimal)> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for txn in transactions.iter().filter(|t| t.kind == kind) {
        match totals.iter_mut().find(|(category, _)| *category == txn.category) {
            Some((_, total)) => *total += txn.amount,
            None => totals.push((txn.category.clone(), txn.amount)),
        }
    }
    totals
}

/// Running balance per distinct day, in date order.
///
/// Same-day transactions collapse into one signed daily net before the
/// prefix sum, so the input order can never change any point of the series.
#[must_use]
pub fn balance_series(transactions: &[Transaction]) -> Vec<(NaiveDate, Decimal)> {
    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for txn in transactions {
        *daily.entry(txn.date).or_insert(Decimal::ZERO) += txn.signed_amount();
    }

    let mut running = Decimal::ZERO;
    daily
        .into_iter()
        .map(|(date, net)| {
            running += net;
            (date, running)
        })
        .collect()
}

/// The category with the strictly greatest positive total.
///
/// The scan starts at zero and only a strictly greater total wins, so ties
/// keep the first-seen category and nothing qualifies unless positive.
fn top_category(totals: &[(String, Decimal)]) -> Option<TopCategory> {
    let mut best: Option<TopCategory> = None;
    for (category, total) in totals {
        let max = best.as_ref().map_or(Decimal::ZERO, |b| b.total);
        if *total > max {
            best = Some(TopCategory {
                category: category.clone(),
                total: *total,
            });
        }
    }
    best
}
