//! Cash-flow JSON loader with per-record validation.
//!
//! This crate turns a raw JSON source (file, string or HTTP endpoint) into a
//! validated [`Dataset`]. Validation is per record: a bad record is rejected
//! with a diagnostic and never aborts the load, while whole-source problems
//! (unreachable endpoint, non-array JSON, nothing usable) fail the load as a
//! whole.
//!
//! # Features
//!
//! - Strict `YYYY-MM-DD` date validation
//! - Amounts as JSON numbers or numeric strings, parsed to [`Decimal`]
//! - Case-insensitive `income` / `expense` kinds, trimmed categories
//! - Rejected records carried in the result with index and reason
//! - Stable date-ascending ordering with year and category sets
//!
//! # Example
//!
//! ```
//! use caudal_loader::Loader;
//!
//! let data = Loader::new()
//!     .load_str(r#"[
//!         {"date": "2024-01-05", "amount": 100, "type": "income", "category": "Salary"},
//!         {"date": "not-a-date", "amount": 10, "type": "income", "category": "X"}
//!     ]"#)
//!     .unwrap();
//!
//! assert_eq!(data.transactions.len(), 1);
//! assert_eq!(data.rejected.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use caudal_core::{NaiveDate, Transaction, TxnKind};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that abort a load as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The remote source could not be fetched or read.
    #[error("source unavailable: failed to fetch {url}: {reason}")]
    SourceUnavailable {
        /// The URL that failed.
        url: String,
        /// Transport or HTTP failure description.
        reason: String,
    },

    /// IO error reading a source file.
    #[error("failed to read file {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The source was retrieved but is not a JSON array.
    #[error("malformed source: {reason}")]
    MalformedSource {
        /// What was wrong with the payload.
        reason: String,
    },

    /// The source array contained no records at all.
    #[error("source contains no records")]
    EmptySource,

    /// The source array was non-empty but every record failed validation.
    #[error("no valid records in source ({rejected} rejected)")]
    NoValidRecords {
        /// How many records were rejected.
        rejected: usize,
    },
}

/// Why a single raw record was rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// The record is not a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,

    /// The date field is missing or not a strict `YYYY-MM-DD` calendar date.
    #[error("invalid date `{raw}` (expected YYYY-MM-DD)")]
    BadDate {
        /// The raw date value.
        raw: String,
    },

    /// The amount field is missing or does not parse as a finite number.
    #[error("invalid amount {raw} (expected a number or numeric string)")]
    BadAmount {
        /// The raw amount value, rendered as JSON.
        raw: String,
    },

    /// The type field is not `income` or `expense` (case-insensitive).
    #[error("invalid type `{raw}` (expected income or expense)")]
    BadKind {
        /// The raw type value.
        raw: String,
    },

    /// The category field is missing, not a string, or blank after trimming.
    #[error("category is missing or blank")]
    EmptyCategory,
}

/// A rejected raw record: its position in the source array and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Zero-based index of the record in the raw source array.
    pub index: usize,
    /// Why validation rejected it.
    pub reason: RejectReason,
}

/// Result of a successful load.
///
/// Holds the validated transactions in canonical order (date ascending,
/// stable for same-day records) together with the year and category sets and
/// the per-record rejection diagnostics. Accepted plus rejected always equals
/// the size of the raw source array.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Validated transactions, sorted ascending by date.
    pub transactions: Vec<Transaction>,
    /// Every calendar year that occurs in `transactions`.
    pub years: BTreeSet<i32>,
    /// Every category that occurs in `transactions`, case-preserving.
    pub categories: BTreeSet<String>,
    /// Records from the raw source that failed validation.
    pub rejected: Vec<RejectedRecord>,
}

impl Dataset {
    /// Number of validated transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// True when no transaction survived validation.
    ///
    /// Unreachable through [`Loader`], which fails such loads, but kept total
    /// for callers constructing datasets by hand.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// First and last transaction dates, in canonical order.
    #[must_use]
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.transactions.first(), self.transactions.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Year choices for the year selector, most recent first.
    #[must_use]
    pub fn filter_years(&self) -> Vec<i32> {
        self.years.iter().rev().copied().collect()
    }

    /// Category choices for the category selector, ascending
    /// case-insensitively.
    #[must_use]
    pub fn filter_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.categories.iter().cloned().collect();
        categories.sort_by_key(|c| c.to_lowercase());
        categories
    }
}

/// Cash-flow source loader.
///
/// ```
/// use caudal_loader::Loader;
/// use std::time::Duration;
///
/// let loader = Loader::new().with_timeout(Duration::from_secs(5));
/// assert!(loader.load_str("[]").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    timeout: Duration,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

impl Loader {
    /// Create a loader with the default HTTP timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall HTTP timeout used by [`Loader::fetch`].
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load a dataset from a JSON file.
    ///
    /// # Errors
    ///
    /// [`LoadError::Io`] when the file cannot be read, otherwise the same
    /// errors as [`Loader::load_str`].
    pub fn load_path(&self, path: &Path) -> Result<Dataset, LoadError> {
        let source = fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.load_str(&source)
    }

    /// Load a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// [`LoadError::MalformedSource`] when the text is not valid JSON,
    /// otherwise the same errors as [`Loader::load_value`].
    pub fn load_str(&self, source: &str) -> Result<Dataset, LoadError> {
        let value: Value =
            serde_json::from_str(source).map_err(|e| LoadError::MalformedSource {
                reason: format!("invalid JSON: {e}"),
            })?;
        self.load_value(value)
    }

    /// Load a dataset from an already-parsed JSON value.
    ///
    /// Validates record by record: a rejected record is logged, recorded in
    /// [`Dataset::rejected`] and excluded, and the load continues.
    ///
    /// # Errors
    ///
    /// - [`LoadError::MalformedSource`] when the value is not an array
    /// - [`LoadError::EmptySource`] when the array has no records
    /// - [`LoadError::NoValidRecords`] when every record is rejected
    pub fn load_value(&self, value: Value) -> Result<Dataset, LoadError> {
        let Value::Array(records) = value else {
            return Err(LoadError::MalformedSource {
                reason: format!(
                    "expected a top-level array, found {}",
                    json_type_name(&value)
                ),
            });
        };

        if records.is_empty() {
            return Err(LoadError::EmptySource);
        }

        let mut transactions = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for (index, record) in records.iter().enumerate() {
            match validate_record(record) {
                Ok(txn) => transactions.push(txn),
                Err(reason) => {
                    tracing::warn!(index, %reason, "record rejected");
                    rejected.push(RejectedRecord { index, reason });
                }
            }
        }

        if transactions.is_empty() {
            return Err(LoadError::NoValidRecords {
                rejected: rejected.len(),
            });
        }

        // Canonical order; stable, so same-day records keep source order
        transactions.sort_by_key(|t| t.date);

        let mut years = BTreeSet::new();
        let mut categories = BTreeSet::new();
        for txn in &transactions {
            years.insert(txn.year());
            categories.insert(txn.category.clone());
        }

        Ok(Dataset {
            transactions,
            years,
            categories,
            rejected,
        })
    }

    /// Load a dataset over HTTP GET.
    ///
    /// # Errors
    ///
    /// [`LoadError::SourceUnavailable`] on transport failures and non-2xx
    /// responses, otherwise the same errors as [`Loader::load_str`].
    pub fn fetch(&self, url: &str) -> Result<Dataset, LoadError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent
            .get(url)
            .set("Accept", "application/json")
            .call()
            .map_err(|e| LoadError::SourceUnavailable {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let body = response
            .into_string()
            .map_err(|e| LoadError::SourceUnavailable {
                url: url.to_string(),
                reason: format!("failed to read response body: {e}"),
            })?;
        self.load_str(&body)
    }
}

/// Load a dataset from a JSON file.
///
/// Convenience wrapper around [`Loader::load_path`] with default settings.
pub fn load(path: &Path) -> Result<Dataset, LoadError> {
    Loader::new().load_path(path)
}

/// Validate one raw record against the acceptance rule.
fn validate_record(record: &Value) -> Result<Transaction, RejectReason> {
    let Value::Object(fields) = record else {
        return Err(RejectReason::NotAnObject);
    };

    let date_raw = fields.get("date").and_then(Value::as_str).unwrap_or("");
    let date = parse_strict_date(date_raw).ok_or_else(|| RejectReason::BadDate {
        raw: date_raw.to_string(),
    })?;

    let amount = fields
        .get("amount")
        .and_then(parse_amount)
        .ok_or_else(|| RejectReason::BadAmount {
            raw: fields
                .get("amount")
                .map_or_else(|| "missing".to_string(), Value::to_string),
        })?;

    let kind_raw = fields.get("type").and_then(Value::as_str).unwrap_or("");
    let kind = TxnKind::parse(kind_raw).ok_or_else(|| RejectReason::BadKind {
        raw: kind_raw.to_string(),
    })?;

    let category = fields
        .get("category")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(RejectReason::EmptyCategory)?;

    let description = fields
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("");

    Ok(Transaction::new(date, amount, kind, category).with_description(description))
}

/// Parse a date in strict canonical `YYYY-MM-DD` form.
///
/// Rejects non-canonical spellings (`2024-1-5`) that a plain chrono parse
/// would accept.
fn parse_strict_date(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    (date.format("%Y-%m-%d").to_string() == raw).then_some(date)
}

/// Parse an amount from a JSON number or a numeric string.
fn parse_amount(value: &Value) -> Option<Decimal> {
    let token = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&token)
        .or_else(|_| Decimal::from_scientific(&token))
        .ok()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
