//! Calendar-period bucketing: granularities, keys, labels and start dates.
//!
//! A bucketed granularity maps every date to a canonical period key
//! (`YYYY-MM`, `YYYY-Qn` or `YYYY`), a human label in Spanish (`enero 2024`,
//! `2024 Q1`, `2024`) and the first day of the period, which is used solely
//! for chronological ordering of buckets.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Label used in place of a period label when no bucketing is applied.
pub const GRAND_TOTAL_LABEL: &str = "Total General";

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// The period size used when bucketing transactions.
///
/// Serialized as the selector values `all_periods`, `monthly`, `quarterly`
/// and `annual`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// No bucketing; grand totals over the whole filtered set.
    #[default]
    AllPeriods,
    /// One bucket per calendar month.
    Monthly,
    /// One bucket per calendar quarter.
    Quarterly,
    /// One bucket per calendar year.
    Annual,
}

impl Granularity {
    /// All selectable granularities, in selector order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::AllPeriods, Self::Monthly, Self::Quarterly, Self::Annual]
    }

    /// True when this granularity groups transactions into period buckets.
    #[must_use]
    pub const fn is_bucketed(self) -> bool {
        !matches!(self, Self::AllPeriods)
    }

    /// The Spanish word used in the transaction-table caption.
    #[must_use]
    pub const fn caption_word(self) -> &'static str {
        match self {
            Self::AllPeriods => "General",
            Self::Monthly => "Mensual",
            Self::Quarterly => "Trimestral",
            Self::Annual => "Anual",
        }
    }

    /// Canonical bucket key for a date: `YYYY-MM`, `YYYY-Qn` or `YYYY`.
    ///
    /// `None` when no bucketing applies. Within one granularity the
    /// lexicographic order of keys equals chronological order.
    #[must_use]
    pub fn key_for(self, date: NaiveDate) -> Option<String> {
        match self {
            Self::AllPeriods => None,
            Self::Monthly => Some(format!("{:04}-{:02}", date.year(), date.month())),
            Self::Quarterly => Some(format!("{:04}-Q{}", date.year(), quarter_of(date))),
            Self::Annual => Some(format!("{:04}", date.year())),
        }
    }

    /// First day of the period containing `date` (first of month, quarter or
    /// year). For [`Granularity::AllPeriods`] the date itself is returned.
    #[must_use]
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let first = match self {
            Self::AllPeriods => return date,
            Self::Monthly => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            Self::Quarterly => {
                NaiveDate::from_ymd_opt(date.year(), (quarter_of(date) - 1) * 3 + 1, 1)
            }
            Self::Annual => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        first.unwrap_or(date)
    }

    /// Human label for the period containing `date`: `enero 2024`, `2024 Q1`
    /// or `2024`. For [`Granularity::AllPeriods`] this is [`GRAND_TOTAL_LABEL`].
    #[must_use]
    pub fn label_for(self, date: NaiveDate) -> String {
        match self {
            Self::AllPeriods => GRAND_TOTAL_LABEL.to_string(),
            Self::Monthly => format!("{} {}", month_name_es(date.month()), date.year()),
            Self::Quarterly => format!("{} Q{}", date.year(), quarter_of(date)),
            Self::Annual => format!("{:04}", date.year()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::AllPeriods => "all_periods",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing a [`Granularity`] from a string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown granularity `{0}` (expected all_periods, monthly, quarterly or annual)")]
pub struct ParseGranularityError(String);

impl FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_periods" => Ok(Self::AllPeriods),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" => Ok(Self::Annual),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

/// Calendar quarter of a date, 1 through 4.
#[must_use]
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Spanish month name for a 1-based month number, as used in monthly labels.
///
/// Out-of-range months render as an empty string.
#[must_use]
pub fn month_name_es(month: u32) -> &'static str {
    match month {
        1..=12 => MONTHS_ES[(month - 1) as usize],
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_monthly_keys_and_labels() {
        let d = date(2024, 1, 15);
        assert_eq!(Granularity::Monthly.key_for(d).unwrap(), "2024-01");
        assert_eq!(Granularity::Monthly.label_for(d), "enero 2024");
        assert_eq!(Granularity::Monthly.period_start(d), date(2024, 1, 1));

        let d = date(2023, 12, 31);
        assert_eq!(Granularity::Monthly.key_for(d).unwrap(), "2023-12");
        assert_eq!(Granularity::Monthly.label_for(d), "diciembre 2023");
    }

    #[test]
    fn test_quarterly_keys_and_labels() {
        assert_eq!(
            Granularity::Quarterly.key_for(date(2024, 1, 1)).unwrap(),
            "2024-Q1"
        );
        assert_eq!(
            Granularity::Quarterly.key_for(date(2024, 3, 31)).unwrap(),
            "2024-Q1"
        );
        assert_eq!(
            Granularity::Quarterly.key_for(date(2024, 4, 1)).unwrap(),
            "2024-Q2"
        );
        assert_eq!(
            Granularity::Quarterly.key_for(date(2024, 12, 31)).unwrap(),
            "2024-Q4"
        );
        assert_eq!(
            Granularity::Quarterly.label_for(date(2024, 5, 20)),
            "2024 Q2"
        );
        assert_eq!(
            Granularity::Quarterly.period_start(date(2024, 8, 15)),
            date(2024, 7, 1)
        );
    }

    #[test]
    fn test_annual_keys_and_labels() {
        let d = date(2024, 6, 15);
        assert_eq!(Granularity::Annual.key_for(d).unwrap(), "2024");
        assert_eq!(Granularity::Annual.label_for(d), "2024");
        assert_eq!(Granularity::Annual.period_start(d), date(2024, 1, 1));
    }

    #[test]
    fn test_all_periods_has_no_key() {
        let d = date(2024, 6, 15);
        assert_eq!(Granularity::AllPeriods.key_for(d), None);
        assert_eq!(Granularity::AllPeriods.label_for(d), GRAND_TOTAL_LABEL);
        assert_eq!(Granularity::AllPeriods.period_start(d), d);
    }

    #[test]
    fn test_parses_selector_values() {
        assert_eq!(
            "all_periods".parse::<Granularity>().unwrap(),
            Granularity::AllPeriods
        );
        assert_eq!(
            "monthly".parse::<Granularity>().unwrap(),
            Granularity::Monthly
        );
        assert_eq!(
            "quarterly".parse::<Granularity>().unwrap(),
            Granularity::Quarterly
        );
        assert_eq!(
            "annual".parse::<Granularity>().unwrap(),
            Granularity::Annual
        );
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        for g in Granularity::all() {
            let json = serde_json::to_string(&g).unwrap();
            let back: Granularity = serde_json::from_str(&json).unwrap();
            assert_eq!(back, g);
        }
        assert_eq!(
            serde_json::to_string(&Granularity::AllPeriods).unwrap(),
            "\"all_periods\""
        );
    }

    #[test]
    fn test_month_names_cover_the_year() {
        assert_eq!(month_name_es(1), "enero");
        assert_eq!(month_name_es(9), "septiembre");
        assert_eq!(month_name_es(12), "diciembre");
        assert_eq!(month_name_es(0), "");
        assert_eq!(month_name_es(13), "");
    }

    proptest! {
        #[test]
        fn prop_period_start_never_exceeds_date(
            y in 1990i32..2100,
            m in 1u32..=12,
            d in 1u32..=28,
        ) {
            let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
            for g in Granularity::all() {
                let start = g.period_start(date);
                prop_assert!(start <= date);
                if g.is_bucketed() {
                    // Same period, same key and label
                    prop_assert_eq!(g.key_for(start), g.key_for(date));
                    prop_assert_eq!(g.label_for(start), g.label_for(date));
                }
            }
            let q = quarter_of(date);
            prop_assert!((1..=4).contains(&q));
        }
    }
}
