//! Service layer - business logic over the repository.

mod user_service;

pub use user_service::{UserManager, UserPage, UserService};

#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
