//! Application state for dependency injection.

use std::sync::Arc;

use user_service_lib::infra::Database;
use user_service_lib::service::UserService;

use crate::auth::AuthPipeline;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub auth: Arc<AuthPipeline>,
    /// Absent when the router runs over a mocked service
    pub database: Option<Database>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        user_service: Arc<dyn UserService>,
        auth: AuthPipeline,
        database: Option<Database>,
    ) -> Self {
        Self {
            user_service,
            auth: Arc::new(auth),
            database,
        }
    }
}
