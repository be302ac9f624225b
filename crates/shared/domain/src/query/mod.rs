//! Storage-agnostic query subsystem.
//!
//! Client payloads (`RawQuery`) are validated against a `ColumnWhitelist` and
//! a fixed operator grammar by the `QueryBuilder`, producing an immutable
//! `QuerySpecification`. The `Paginator` turns a specification into a
//! `QueryPlan` with page bounds and a total sort order; executing the plan is
//! the storage layer's job.
//!
//! Field names that pass the whitelist are only ever used to select a known
//! column; client values are only ever bound as parameters.

mod builder;
mod condition;
mod error;
mod pagination;
mod raw;
mod spec;
mod whitelist;

pub use builder::{QueryBuilder, QueryLimits};
pub use condition::{Arity, ConditionValue, FilterCondition, Operator, Scalar};
pub use error::QueryError;
pub use pagination::{Paginator, QueryPlan};
pub use raw::{RawCondition, RawConditions, RawPage, RawQuery, RawSort};
pub use spec::{Combinator, ConditionSet, PageSpec, QuerySpecification, Sort, SortDirection};
pub use whitelist::ColumnWhitelist;
