//! The filter stage: year, category and description predicates.

use caudal_core::Transaction;
use serde::{Deserialize, Serialize};

/// Filter parameters for one pipeline invocation.
///
/// An explicit immutable value handed to the pipeline on every run; `None`
/// and an empty description mean "all". The three predicates compose as a
/// logical AND, each one element-local, so application order can never
/// change the result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Keep only transactions dated in this calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Keep only transactions with exactly this category, case-sensitive.
    #[serde(default)]
    pub category: Option<String>,
    /// Keep only transactions whose description contains this text,
    /// case-insensitive. Whitespace-only text is a no-op.
    #[serde(default)]
    pub description: String,
}

impl FilterConfig {
    /// A configuration that keeps everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one calendar year.
    #[must_use]
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Restrict to one exact category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to descriptions containing the given text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Apply the year, category and description filters, preserving the relative
/// order of the input.
///
/// An empty result is a valid outcome, distinct from "nothing loaded" which
/// is an error at the loader boundary.
#[must_use]
pub fn apply_filters(transactions: &[Transaction], config: &FilterConfig) -> Vec<Transaction> {
    let needle = config.description.trim().to_lowercase();
    transactions
        .iter()
        .filter(|txn| {
            config.year.map_or(true, |year| txn.year() == year)
                && config
                    .category
                    .as_ref()
                    .map_or(true, |category| txn.category == *category)
                && (needle.is_empty() || txn.description.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use caudal_core::{NaiveDate, TxnKind};
    use rust_decimal_macros::dec;

    fn txn(date: (i32, u32, u32), category: &str, description: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            dec!(10),
            TxnKind::Expense,
            category,
        )
        .with_description(description)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn((2023, 12, 30), "Comida", "Cena de empresa"),
            txn((2024, 1, 5), "Comida", "Supermercado"),
            txn((2024, 2, 10), "Ocio", "Cine"),
            txn((2024, 3, 1), "comida", "supermercado barrio"),
        ]
    }

    #[test]
    fn test_default_config_keeps_everything_in_order() {
        let input = sample();
        let out = apply_filters(&input, &FilterConfig::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_year_filter_keeps_only_that_year() {
        let out = apply_filters(&sample(), &FilterConfig::new().with_year(2024));
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|t| t.year() == 2024));
    }

    #[test]
    fn test_category_filter_is_exact_and_case_sensitive() {
        let out = apply_filters(&sample(), &FilterConfig::new().with_category("Comida"));
        assert_eq!(out.len(), 2);
        // Lowercase "comida" is a different category
        let out = apply_filters(&sample(), &FilterConfig::new().with_category("comida"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].description, "supermercado barrio");
    }

    #[test]
    fn test_description_filter_is_case_insensitive_substring() {
        let out = apply_filters(&sample(), &FilterConfig::new().with_description("SUPERMERCADO"));
        assert_eq!(out.len(), 2);
        let out = apply_filters(&sample(), &FilterConfig::new().with_description("cine"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_blank_description_filter_is_a_no_op() {
        let input = sample();
        let out = apply_filters(&input, &FilterConfig::new().with_description("   "));
        assert_eq!(out, input);
    }

    #[test]
    fn test_filters_compose_as_and() {
        let config = FilterConfig::new()
            .with_year(2024)
            .with_category("Comida")
            .with_description("super");
        let out = apply_filters(&sample(), &config);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].description, "Supermercado");
    }

    #[test]
    fn test_empty_result_is_valid() {
        let out = apply_filters(&sample(), &FilterConfig::new().with_year(1999));
        assert!(out.is_empty());
    }
}
