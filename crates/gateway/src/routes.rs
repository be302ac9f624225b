//! Route configuration.

use axum::{middleware, routing::post, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::handlers::{health_routes, user_handler, user_routes};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Versioned prefix of the users resource
pub const USERS_PATH: &str = "/api/v1/users";

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    Router::new()
        // Health check (no auth)
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // User routes behind the configured auth pipeline
        .nest(USERS_PATH, user_routes().route_layer(auth.clone()))
        // A nested "/" only matches the bare prefix
        .route(
            &format!("{}/", USERS_PATH),
            post(user_handler::create_user).route_layer(auth),
        )
        .with_state(state)
}
