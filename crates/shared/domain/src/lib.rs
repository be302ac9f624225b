//! Domain layer - Core business entities and the query model.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the `users` entity and the storage-agnostic query subsystem (column
//! whitelist, filter conditions, validator/builder and paginator).

pub mod constants;
pub mod error;
pub mod query;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use query::{
    Arity, ColumnWhitelist, Combinator, ConditionSet, ConditionValue, FilterCondition, Operator,
    PageSpec, Paginator, QueryBuilder, QueryError, QueryLimits, QueryPlan, QuerySpecification,
    RawCondition, RawConditions, RawPage, RawQuery, RawSort, Scalar, Sort, SortDirection,
};
pub use user::{CreateUser, UpdateUser, User, UserProfile};
