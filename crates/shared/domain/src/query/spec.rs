//! Validated query specification.

use std::fmt;

use super::{FilterCondition, QueryError};

/// How conditions of one set are joined. Uniform across the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "and" | "&&" | "&" => Ok(Combinator::And),
            "or" | "||" | "|" => Ok(Combinator::Or),
            _ => Err(QueryError::InvalidCombinator(input.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(QueryError::InvalidSortDirection(input.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sort key over a whitelisted column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: String,
    direction: SortDirection,
}

impl Sort {
    pub(crate) fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

/// Page request, validated against the page size limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSpec {
    Offset { page_number: u64, page_size: u64 },
    Cursor { last_id: u64, limit: u64 },
}

impl PageSpec {
    pub fn is_cursor(&self) -> bool {
        matches!(self, PageSpec::Cursor { .. })
    }

    /// Maximum number of rows the page returns
    pub fn limit(&self) -> u64 {
        match self {
            PageSpec::Offset { page_size, .. } => *page_size,
            PageSpec::Cursor { limit, .. } => *limit,
        }
    }
}

/// Validated conditions joined by a single combinator.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConditionSet {
    conditions: Vec<FilterCondition>,
    combinator: Combinator,
}

impl ConditionSet {
    pub(crate) fn new(conditions: Vec<FilterCondition>, combinator: Combinator) -> Self {
        Self {
            conditions,
            combinator,
        }
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        &self.conditions
    }

    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}

/// Immutable result of validating a client query.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpecification {
    filter: ConditionSet,
    sort: Sort,
    page: PageSpec,
}

impl QuerySpecification {
    pub(crate) fn new(filter: ConditionSet, sort: Sort, page: PageSpec) -> Self {
        Self { filter, sort, page }
    }

    pub fn filter(&self) -> &ConditionSet {
        &self.filter
    }

    pub fn conditions(&self) -> &[FilterCondition] {
        self.filter.conditions()
    }

    pub fn combinator(&self) -> Combinator {
        self.filter.combinator()
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    pub fn page(&self) -> PageSpec {
        self.page
    }
}
