//! User Service Library
//!
//! Users resource logic: the SeaORM entity and migrations, the repository that
//! executes validated query plans, and the service that validates client
//! queries before any storage call.

pub mod config;
pub mod infra;
pub mod repository;
pub mod service;

use std::sync::Arc;

use tracing::info;

use common::{AppError, AppResult};
use domain::QueryBuilder;

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::repository::{entities::user, UserStore};
use crate::service::{UserManager, UserService};

/// Connect, migrate and wire the user service.
pub async fn bootstrap(config: &UserServiceConfig) -> AppResult<(Database, Arc<dyn UserService>)> {
    let db = Database::connect(&config.database).await?;
    let service = user_service(db.get_connection())?;

    Ok((db, service))
}

/// Wire the service over an existing connection.
pub fn user_service(connection: sea_orm::DatabaseConnection) -> AppResult<Arc<dyn UserService>> {
    let whitelist = user::whitelist().map_err(AppError::from)?;
    info!(columns = whitelist.len(), "users column whitelist loaded");

    let repo = Arc::new(UserStore::new(connection));
    Ok(Arc::new(UserManager::new(repo, QueryBuilder::new(whitelist))))
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &UserServiceConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}
