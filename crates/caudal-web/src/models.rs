//! Request and response shapes for the dashboard API.

use caudal_core::Granularity;
use caudal_report::FilterConfig;
use serde::{Deserialize, Serialize};

/// One dashboard request: a granularity plus the three filters.
///
/// This is the JSON body of `POST /api/filter` and the unit the debounced
/// live-view worker consumes. Every field defaults to "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRequest {
    /// Bucketing granularity; defaults to `all_periods`.
    #[serde(default)]
    pub granularity: Granularity,
    /// Calendar-year filter.
    #[serde(default)]
    pub year: Option<i32>,
    /// Exact-category filter.
    #[serde(default)]
    pub category: Option<String>,
    /// Description substring filter.
    #[serde(default)]
    pub description: String,
}

impl ViewRequest {
    /// The filter portion of the request.
    #[must_use]
    pub fn filter_config(&self) -> FilterConfig {
        FilterConfig {
            year: self.year,
            category: self.category.clone(),
            description: self.description.clone(),
        }
    }
}

/// Raw query parameters of `GET /api/dashboard`.
///
/// Everything arrives as an optional string; `all` and the empty string
/// mean "no filter", matching the selector values a dashboard client
/// submits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    /// Granularity selector value.
    #[serde(default)]
    pub granularity: Option<String>,
    /// Year selector value, a year number or `all`.
    #[serde(default)]
    pub year: Option<String>,
    /// Category selector value, a category or `all`.
    #[serde(default)]
    pub category: Option<String>,
    /// Description search text.
    #[serde(default)]
    pub description: Option<String>,
}

impl ViewQuery {
    /// Convert the raw parameters into a typed request.
    ///
    /// # Errors
    ///
    /// A human-readable message when the granularity or year does not
    /// parse; the caller answers 400 with it.
    pub fn into_request(self) -> Result<ViewRequest, String> {
        let granularity = match self.granularity.as_deref() {
            None | Some("") => Granularity::default(),
            Some(raw) => raw.parse().map_err(|e| format!("{e}"))?,
        };
        let year = match self.year.as_deref() {
            None | Some("") | Some("all") => None,
            Some(raw) => Some(
                raw.parse::<i32>()
                    .map_err(|_| format!("invalid year `{raw}`"))?,
            ),
        };
        let category = self
            .category
            .filter(|c| !c.is_empty() && c != "all");

        Ok(ViewRequest {
            granularity,
            year,
            category,
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Payload of `GET /api/options`: the dropdown choices.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    /// Selectable granularities, in selector order.
    pub granularities: Vec<String>,
    /// Years present in the dataset, most recent first.
    pub years: Vec<i32>,
    /// Categories present in the dataset, ascending case-insensitively.
    pub categories: Vec<String>,
}

/// Payload of a successful `POST /api/reload`.
#[derive(Debug, Clone, Serialize)]
pub struct ReloadSummary {
    /// Accepted transaction count.
    pub transactions: usize,
    /// Distinct years.
    pub years: usize,
    /// Distinct categories.
    pub categories: usize,
    /// Rejected record count.
    pub rejected: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults_to_all() {
        let request = ViewQuery::default().into_request().unwrap();
        assert_eq!(request, ViewRequest::default());
        assert_eq!(request.granularity, Granularity::AllPeriods);
    }

    #[test]
    fn test_query_parses_selector_values() {
        let query = ViewQuery {
            granularity: Some("monthly".to_string()),
            year: Some("2024".to_string()),
            category: Some("Comida".to_string()),
            description: Some("super".to_string()),
        };
        let request = query.into_request().unwrap();
        assert_eq!(request.granularity, Granularity::Monthly);
        assert_eq!(request.year, Some(2024));
        assert_eq!(request.category.as_deref(), Some("Comida"));
        assert_eq!(request.description, "super");
    }

    #[test]
    fn test_query_treats_all_as_no_filter() {
        let query = ViewQuery {
            granularity: Some("annual".to_string()),
            year: Some("all".to_string()),
            category: Some("all".to_string()),
            description: None,
        };
        let request = query.into_request().unwrap();
        assert_eq!(request.year, None);
        assert_eq!(request.category, None);
    }

    #[test]
    fn test_query_rejects_garbage() {
        let query = ViewQuery {
            year: Some("banana".to_string()),
            ..ViewQuery::default()
        };
        assert!(query.into_request().is_err());

        let query = ViewQuery {
            granularity: Some("weekly".to_string()),
            ..ViewQuery::default()
        };
        assert!(query.into_request().is_err());
    }

    #[test]
    fn test_request_body_fields_all_default() {
        let request: ViewRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, ViewRequest::default());

        let request: ViewRequest =
            serde_json::from_str(r#"{"granularity": "quarterly", "year": 2023}"#).unwrap();
        assert_eq!(request.granularity, Granularity::Quarterly);
        assert_eq!(request.year, Some(2023));
    }
}
