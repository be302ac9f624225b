//! Raw client payloads, as received on the wire.
//!
//! Nothing here is trusted: field names, operators and values are plain
//! strings and JSON until the `QueryBuilder` validates them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{PageSpec, QuerySpecification};
use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};

/// One proposed condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawCondition {
    /// Column name, checked against the whitelist
    pub field: String,
    /// Operator name or symbol: eq, neq, gt, gte, lt, lte, in, like, isnull, notnull, between
    pub operator: String,
    /// Scalar, or array for `in` and `between`; omitted for `isnull`/`notnull`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub value: Option<Value>,
}

impl RawCondition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawSort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
}

/// Page request: `{"kind":"offset","pageNumber":1,"pageSize":10}` or
/// `{"kind":"cursor","lastID":0,"limit":10}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawPage {
    Offset {
        #[serde(rename = "pageNumber")]
        page_number: u64,
        #[serde(rename = "pageSize")]
        page_size: u64,
    },
    Cursor {
        #[serde(rename = "lastID", alias = "lastId", default)]
        last_id: u64,
        limit: u64,
    },
}

impl Default for RawPage {
    fn default() -> Self {
        RawPage::Offset {
            page_number: DEFAULT_PAGE_NUMBER,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl From<PageSpec> for RawPage {
    fn from(page: PageSpec) -> Self {
        match page {
            PageSpec::Offset {
                page_number,
                page_size,
            } => RawPage::Offset {
                page_number,
                page_size,
            },
            PageSpec::Cursor { last_id, limit } => RawPage::Cursor { last_id, limit },
        }
    }
}

/// Full list query payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawQuery {
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
    /// `and` (default) or `or`, applied uniformly to all conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<RawSort>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub page: RawPage,
}

/// Condition-only payload used to fetch a single record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RawConditions {
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combinator: Option<String>,
}

impl From<&QuerySpecification> for RawQuery {
    fn from(spec: &QuerySpecification) -> Self {
        let conditions = spec
            .conditions()
            .iter()
            .map(|c| RawCondition::new(c.field(), c.operator().as_str(), c.value().to_json()))
            .collect();

        RawQuery {
            conditions,
            combinator: Some(spec.combinator().as_str().to_string()),
            sort: Some(RawSort {
                field: Some(spec.sort().field().to_string()),
                direction: Some(spec.sort().direction().as_str().to_string()),
            }),
            page: spec.page().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_offset_payload() {
        let raw: RawQuery = serde_json::from_value(json!({
            "conditions": [{"field": "email", "operator": "eq", "value": "a@x.com"}],
            "page": {"kind": "offset", "pageNumber": 1, "pageSize": 10}
        }))
        .unwrap();

        assert_eq!(raw.conditions.len(), 1);
        assert_eq!(raw.conditions[0].value, Some(json!("a@x.com")));
        assert_eq!(raw.combinator, None);
        assert_eq!(
            raw.page,
            RawPage::Offset {
                page_number: 1,
                page_size: 10
            }
        );
    }

    #[test]
    fn test_deserialize_cursor_payload() {
        let raw: RawQuery = serde_json::from_value(json!({
            "page": {"kind": "cursor", "lastID": 0, "limit": 5}
        }))
        .unwrap();

        assert!(raw.conditions.is_empty());
        assert_eq!(raw.page, RawPage::Cursor { last_id: 0, limit: 5 });
    }

    #[test]
    fn test_null_value_is_absent() {
        let raw: RawCondition = serde_json::from_value(json!({
            "field": "locked_at", "operator": "isnull", "value": null
        }))
        .unwrap();
        assert_eq!(raw.value, None);
    }

    #[test]
    fn test_missing_page_defaults_to_first_offset_page() {
        let raw: RawQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            raw.page,
            RawPage::Offset {
                page_number: DEFAULT_PAGE_NUMBER,
                page_size: DEFAULT_PAGE_SIZE
            }
        );
    }

    #[test]
    fn test_negative_page_size_is_rejected_by_serde() {
        let result = serde_json::from_value::<RawQuery>(json!({
            "page": {"kind": "offset", "pageNumber": 1, "pageSize": -1}
        }));
        assert!(result.is_err());
    }
}
