//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::health_handler::{HealthResponse, ServiceHealth, ServiceStatus};
use crate::handlers::user_handler::{
    CreateUserRequest, CreatedUser, CursorList, IdsRequest, OffsetList, UpdateUserRequest,
    UserDetail, UserItems,
};
use domain::{RawCondition, RawConditions, RawQuery, RawSort, User, UserProfile};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
        crate::handlers::user_handler::delete_users_by_ids,
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::list_users_by_ids,
        crate::handlers::user_handler::list_users_by_last_id,
        crate::handlers::user_handler::get_user_by_condition,
    ),
    components(
        schemas(
            User,
            UserProfile,
            CreateUserRequest,
            UpdateUserRequest,
            IdsRequest,
            RawQuery,
            RawConditions,
            RawCondition,
            RawSort,
            CreatedUser,
            UserDetail,
            UserItems,
            OffsetList,
            CursorList,
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Users resource; every response uses the {code, msg, data} envelope"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    domain::DEFAULT_SESSION_COOKIE_NAME,
                ))),
            );
        }
    }
}
