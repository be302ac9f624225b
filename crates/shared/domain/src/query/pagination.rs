//! Pagination planning.
//!
//! A `QueryPlan` is storage-agnostic: the repository translates it into its own
//! query language. Ordering always ends on the primary key so that offset pages
//! are deterministic, and cursor pages seek on the primary key instead of
//! skipping rows.

use super::{
    ConditionSet, ConditionValue, FilterCondition, Operator, PageSpec, QuerySpecification, Scalar,
    Sort, SortDirection,
};
use crate::constants::FIRST_PAGE_CURSOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    primary_key: String,
}

impl Paginator {
    pub fn new(primary_key: impl Into<String>) -> Self {
        Self {
            primary_key: primary_key.into(),
        }
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Plan the fetch of one page of `spec`.
    pub fn plan(&self, spec: &QuerySpecification) -> QueryPlan {
        let order = self.order(spec.sort());

        match spec.page() {
            PageSpec::Offset {
                page_number,
                page_size,
            } => QueryPlan {
                filter: spec.filter().clone(),
                cursor: None,
                order,
                offset: page_number.saturating_sub(1).saturating_mul(page_size),
                limit: page_size,
                mode: PlanMode::Offset,
            },
            PageSpec::Cursor { last_id, limit } => QueryPlan {
                filter: spec.filter().clone(),
                cursor: self.seek(last_id, spec.sort().direction()),
                order,
                offset: 0,
                limit,
                mode: PlanMode::Cursor,
            },
        }
    }

    /// Plan for "first record matching `filter`", lowest primary key first.
    pub fn first(&self, filter: ConditionSet) -> QueryPlan {
        QueryPlan {
            filter,
            cursor: None,
            order: vec![Sort::new(self.primary_key.as_str(), SortDirection::Asc)],
            offset: 0,
            limit: 1,
            mode: PlanMode::Single,
        }
    }

    fn order(&self, sort: &Sort) -> Vec<Sort> {
        let mut order = vec![sort.clone()];
        if sort.field() != self.primary_key {
            order.push(Sort::new(self.primary_key.as_str(), SortDirection::Asc));
        }
        order
    }

    fn seek(&self, last_id: u64, direction: SortDirection) -> Option<FilterCondition> {
        let operator = match direction {
            SortDirection::Asc => Operator::Gt,
            // Nothing sorts above the first descending page
            SortDirection::Desc if last_id == FIRST_PAGE_CURSOR => return None,
            SortDirection::Desc => Operator::Lt,
        };
        let bound = i64::try_from(last_id).unwrap_or(i64::MAX);

        Some(FilterCondition::new(
            self.primary_key.as_str(),
            operator,
            ConditionValue::One(Scalar::Int(bound)),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlanMode {
    Offset,
    Cursor,
    Single,
}

/// Storage-agnostic description of one page fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    filter: ConditionSet,
    cursor: Option<FilterCondition>,
    order: Vec<Sort>,
    offset: u64,
    limit: u64,
    mode: PlanMode,
}

impl QueryPlan {
    /// Client conditions, joined by their own combinator
    pub fn filter(&self) -> &ConditionSet {
        &self.filter
    }

    /// Seek predicate; always AND-ed with the filter as a whole
    pub fn cursor(&self) -> Option<&FilterCondition> {
        self.cursor.as_ref()
    }

    pub fn order(&self) -> &[Sort] {
        &self.order
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn is_cursor(&self) -> bool {
        self.mode == PlanMode::Cursor
    }

    /// Offset pages report the total matching count
    pub fn counts_total(&self) -> bool {
        self.mode == PlanMode::Offset
    }

    /// Cursor for the following page, given the primary keys of this page in order.
    ///
    /// `None` when the page was short: there is nothing left to fetch.
    pub fn next_last_id(&self, page_ids: &[u64]) -> Option<u64> {
        if !self.is_cursor() || (page_ids.len() as u64) < self.limit {
            return None;
        }
        page_ids.last().copied()
    }
}
