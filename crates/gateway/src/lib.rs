//! API Gateway Library
//!
//! HTTP surface of the users resource: routing, the configurable auth
//! pipeline, request DTOs and the response envelope.

pub mod auth;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::info;

use user_service_lib::MigrateAction;

use crate::auth::AuthPipeline;
use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Run the HTTP server with the given configuration.
pub async fn run_server(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Misconfigured auth must stop startup, not open the API
    let auth = AuthPipeline::from_config(&config.auth)?;

    let (database, user_service) = user_service_lib::bootstrap(&config.users).await?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(user_service, auth, Some(database));

    // Build router
    let app = create_router(state).layer(TraceLayer::new_for_http());

    info!("Gateway listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &GatewayConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    user_service_lib::run_migrations(&config.users, action).await
}
