//! Query validator/builder.
//!
//! Turns untrusted `RawQuery` payloads into `QuerySpecification`s. Checks run
//! in a fixed order per condition: field against the whitelist, operator
//! against the grammar, then value shape against the operator's arity.

use serde_json::Value;

use super::{
    Arity, ColumnWhitelist, Combinator, ConditionSet, ConditionValue, FilterCondition, Operator,
    PageSpec, Paginator, QueryError, QuerySpecification, RawCondition, RawConditions, RawPage,
    RawQuery, RawSort, Scalar, Sort, SortDirection,
};
use crate::constants::{MAX_CONDITIONS, MAX_IN_VALUES, MAX_PAGE_SIZE};

/// Bounds guarding against pathological payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_conditions: usize,
    pub max_in_values: usize,
    pub max_page_size: u64,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_conditions: MAX_CONDITIONS,
            max_in_values: MAX_IN_VALUES,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

/// Validates raw payloads for one resource.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    whitelist: ColumnWhitelist,
    limits: QueryLimits,
}

impl QueryBuilder {
    pub fn new(whitelist: ColumnWhitelist) -> Self {
        Self {
            whitelist,
            limits: QueryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: QueryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn whitelist(&self) -> &ColumnWhitelist {
        &self.whitelist
    }

    pub fn limits(&self) -> QueryLimits {
        self.limits
    }

    /// Paginator keyed on this resource's primary key
    pub fn paginator(&self) -> Paginator {
        Paginator::new(self.whitelist.primary_key())
    }

    /// Validate a full list query.
    pub fn build(&self, raw: &RawQuery) -> Result<QuerySpecification, QueryError> {
        let filter = self.build_filter(&raw.conditions, raw.combinator.as_deref())?;
        let page = self.build_page(raw.page)?;
        let sort = self.build_sort(raw.sort.as_ref(), page)?;

        Ok(QuerySpecification::new(filter, sort, page))
    }

    /// Validate a condition-only payload; at least one condition is required.
    pub fn build_conditions(&self, raw: &RawConditions) -> Result<ConditionSet, QueryError> {
        if raw.conditions.is_empty() {
            return Err(QueryError::EmptyConditions);
        }
        self.build_filter(&raw.conditions, raw.combinator.as_deref())
    }

    /// Unfiltered cursor query over the primary key ("list by last id").
    pub fn cursor(
        &self,
        last_id: u64,
        limit: u64,
        direction: SortDirection,
    ) -> Result<QuerySpecification, QueryError> {
        let page = self.build_page(RawPage::Cursor { last_id, limit })?;
        let sort = Sort::new(self.whitelist.primary_key(), direction);

        Ok(QuerySpecification::new(ConditionSet::default(), sort, page))
    }

    /// Validate a single condition.
    pub fn build_condition(&self, raw: &RawCondition) -> Result<FilterCondition, QueryError> {
        if !self.whitelist.contains(&raw.field) {
            return Err(QueryError::InvalidField(raw.field.clone()));
        }

        let operator: Operator = raw.operator.parse()?;
        let value = self.shape_value(&raw.field, operator, raw.value.as_ref())?;

        Ok(FilterCondition::new(raw.field.as_str(), operator, value))
    }

    fn build_filter(
        &self,
        conditions: &[RawCondition],
        combinator: Option<&str>,
    ) -> Result<ConditionSet, QueryError> {
        if conditions.len() > self.limits.max_conditions {
            return Err(QueryError::TooManyConditions {
                count: conditions.len(),
                max: self.limits.max_conditions,
            });
        }

        let combinator = combinator
            .map(Combinator::parse)
            .transpose()?
            .unwrap_or_default();

        let conditions = conditions
            .iter()
            .map(|c| self.build_condition(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ConditionSet::new(conditions, combinator))
    }

    fn shape_value(
        &self,
        field: &str,
        operator: Operator,
        value: Option<&Value>,
    ) -> Result<ConditionValue, QueryError> {
        let invalid = |reason: String| QueryError::shape(field, operator.as_str(), reason);
        let value = value.filter(|v| !v.is_null());

        match operator.arity() {
            Arity::None => match value {
                None => Ok(ConditionValue::None),
                Some(_) => Err(invalid("takes no value".to_string())),
            },
            Arity::One => {
                let value = value.ok_or_else(|| invalid("requires a value".to_string()))?;
                let scalar = Scalar::from_json(value)
                    .ok_or_else(|| invalid("requires a single scalar value".to_string()))?;
                if operator == Operator::Like && scalar.as_text().is_none() {
                    return Err(invalid("requires a string pattern".to_string()));
                }
                Ok(ConditionValue::One(scalar))
            }
            Arity::Pair => {
                let mut bounds = scalar_list(value).map_err(invalid)?;
                if bounds.len() != 2 {
                    return Err(invalid(format!(
                        "requires exactly 2 bounds, got {}",
                        bounds.len()
                    )));
                }
                let high = bounds.pop();
                let low = bounds.pop();
                match (low, high) {
                    (Some(low), Some(high)) => Ok(ConditionValue::Pair(low, high)),
                    _ => Err(invalid("requires exactly 2 bounds".to_string())),
                }
            }
            Arity::Many => {
                let values = scalar_list(value).map_err(invalid)?;
                if values.is_empty() {
                    return Err(invalid("requires at least one value".to_string()));
                }
                if values.len() > self.limits.max_in_values {
                    return Err(invalid(format!(
                        "accepts at most {} values",
                        self.limits.max_in_values
                    )));
                }
                Ok(ConditionValue::Many(values))
            }
        }
    }

    fn build_page(&self, page: RawPage) -> Result<PageSpec, QueryError> {
        match page {
            RawPage::Offset {
                page_number,
                page_size,
            } => {
                if page_number == 0 {
                    return Err(QueryError::InvalidPageNumber);
                }
                self.check_page_size(page_size)?;
                // The skipped row count is bound as a BIGINT.
                let skipped = (page_number - 1)
                    .checked_mul(page_size)
                    .filter(|offset| i64::try_from(*offset).is_ok());
                if skipped.is_none() {
                    return Err(QueryError::InvalidPageNumber);
                }
                Ok(PageSpec::Offset {
                    page_number,
                    page_size,
                })
            }
            RawPage::Cursor { last_id, limit } => {
                self.check_page_size(limit)?;
                if i64::try_from(last_id).is_err() {
                    return Err(QueryError::InvalidCursor(last_id));
                }
                Ok(PageSpec::Cursor { last_id, limit })
            }
        }
    }

    fn check_page_size(&self, size: u64) -> Result<(), QueryError> {
        if size == 0 || size > self.limits.max_page_size {
            return Err(QueryError::InvalidPageSize {
                size,
                max: self.limits.max_page_size,
            });
        }
        Ok(())
    }

    fn build_sort(&self, raw: Option<&RawSort>, page: PageSpec) -> Result<Sort, QueryError> {
        let primary_key = self.whitelist.primary_key();

        let field = raw
            .and_then(|s| s.field.as_deref())
            .filter(|f| !f.is_empty())
            .unwrap_or(primary_key);
        if !self.whitelist.contains(field) {
            return Err(QueryError::InvalidField(field.to_string()));
        }

        let direction = raw
            .and_then(|s| s.direction.as_deref())
            .map(SortDirection::parse)
            .transpose()?
            .unwrap_or_default();

        if page.is_cursor() && field != primary_key {
            return Err(QueryError::CursorSortMismatch {
                expected: primary_key.to_string(),
                requested: field.to_string(),
            });
        }

        Ok(Sort::new(field, direction))
    }
}

/// Array of scalars; error text describes the mismatch.
fn scalar_list(value: Option<&Value>) -> Result<Vec<Scalar>, String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| Scalar::from_json(item).ok_or_else(|| "values must be scalars".to_string()))
            .collect(),
        Some(_) => Err("requires an array of values".to_string()),
        None => Err("requires a value".to_string()),
    }
}
