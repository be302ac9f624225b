//! Repository layer for data access.

pub mod entities;
mod filter;
mod user_repository;

pub use filter::{select_for, ConditionTranslator};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
