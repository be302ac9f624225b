//! User handlers.

use axum::{
    extract::{rejection::QueryRejection, Extension, Path, Query, State},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{ApiResponse, AppError, AppResult, Empty};
use domain::{
    CreateUser, QueryError, RawConditions, RawQuery, SortDirection, UpdateUser, User,
    UserProfile, DEFAULT_PAGE_SIZE, MAX_IDS, PRIMARY_KEY_COLUMN,
};
use user_service_lib::service::UserPage;

use crate::auth::Identity;
use crate::extractors::{AppJson, ValidatedJson};
use crate::state::AppState;

// =============================================================================
// Request DTOs
// =============================================================================

/// User creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "jane@example.com")]
    pub email: String,
    /// Password digest produced by the issuing application
    #[serde(default)]
    pub encrypted_password: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(req: CreateUserRequest) -> Self {
        CreateUser {
            email: req.email,
            encrypted_password: req.encrypted_password,
            profile: req.profile,
        }
    }
}

/// User update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub encrypted_password: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl From<UpdateUserRequest> for UpdateUser {
    fn from(req: UpdateUserRequest) -> Self {
        UpdateUser {
            email: req.email,
            encrypted_password: req.encrypted_password,
            profile: req.profile,
        }
    }
}

/// Identifier set for bulk operations
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct IdsRequest {
    #[validate(length(
        min = 1,
        max = (MAX_IDS as u64),
        message = "ids must hold between 1 and 100 entries"
    ))]
    #[schema(example = json!([1, 2, 3]))]
    pub ids: Vec<u64>,
}

/// Cursor list query string
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LastIdParams {
    /// Last id of the previous page; 0 for the first page
    #[serde(rename = "lastID", default)]
    pub last_id: u64,
    /// Page size
    pub limit: Option<u64>,
    /// `id` (ascending) or `-id` (descending)
    pub sort: Option<String>,
}

// =============================================================================
// Response payloads
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedUser {
    pub id: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserDetail {
    pub users: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserItems {
    pub items: Vec<User>,
}

/// Offset page
#[derive(Debug, Serialize, ToSchema)]
pub struct OffsetList {
    pub items: Vec<User>,
    /// Matching rows across all pages
    pub total: u64,
}

/// Cursor page
#[derive(Debug, Serialize, ToSchema)]
pub struct CursorList {
    pub items: Vec<User>,
    /// Pass as `lastID` to fetch the next page; null on the last page
    #[serde(rename = "nextLastID")]
    pub next_last_id: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UserList {
    Offset(OffsetList),
    Cursor(CursorList),
}

impl From<UserPage> for UserList {
    fn from(page: UserPage) -> Self {
        match page.total {
            Some(total) => UserList::Offset(OffsetList {
                items: page.items,
                total,
            }),
            None => UserList::Cursor(CursorList {
                items: page.items,
                next_last_id: page.next_last_id,
            }),
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/list", get(list_users_by_last_id).post(list_users))
        .route("/list/ids", post(list_users_by_ids))
        .route("/delete/ids", post(delete_users_by_ids))
        .route("/condition", post(get_user_by_condition))
        .route(
            "/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn parse_id(raw: &str) -> AppResult<u64> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::validation("id must be a positive integer")),
    }
}

/// `id` or `-id`; any other field cannot drive a cursor.
fn cursor_direction(sort: Option<&str>) -> AppResult<SortDirection> {
    let sort = sort.map(str::trim).unwrap_or_default();
    let (field, direction) = match sort.strip_prefix('-') {
        Some(field) => (field, SortDirection::Desc),
        None => (sort, SortDirection::Asc),
    };

    if !field.is_empty() && field != PRIMARY_KEY_COLUMN {
        return Err(QueryError::CursorSortMismatch {
            expected: PRIMARY_KEY_COLUMN.to_string(),
            requested: field.to_string(),
        }
        .into());
    }
    Ok(direction)
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreatedUser),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> AppResult<ApiResponse<CreatedUser>> {
    let user = state.user_service.create_user(payload.into()).await?;
    Ok(ApiResponse::ok(CreatedUser { id: user.id }))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User detail", body = UserDetail),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserDetail>> {
    let user = state.user_service.get_user(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(UserDetail { users: user }))
}

/// Update a user by id
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = u64, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<Empty>> {
    state
        .user_service
        .update_user(parse_id(&id)?, payload.into())
        .await?;
    Ok(ApiResponse::empty())
}

/// Delete a user by id
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(("id" = u64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Empty>> {
    let id = parse_id(&id)?;
    state.user_service.delete_user(id).await?;

    tracing::info!(user_id = id, by = %identity.subject(), "delete request served");
    Ok(ApiResponse::empty())
}

/// Delete users by id set
#[utoipa::path(
    post,
    path = "/api/v1/users/delete/ids",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Users deleted"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn delete_users_by_ids(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ValidatedJson(payload): ValidatedJson<IdsRequest>,
) -> AppResult<ApiResponse<Empty>> {
    let deleted = state.user_service.delete_users(payload.ids).await?;

    tracing::info!(deleted, by = %identity.subject(), "bulk delete request served");
    Ok(ApiResponse::empty())
}

/// List users with conditions, sort and offset or cursor pagination
#[utoipa::path(
    post,
    path = "/api/v1/users/list",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = RawQuery,
    responses(
        (status = 200, description = "Offset page, or CursorList for cursor pages", body = OffsetList),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    AppJson(query): AppJson<RawQuery>,
) -> AppResult<ApiResponse<UserList>> {
    let page = state.user_service.list_users(query).await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Fetch users by id set, in request order
#[utoipa::path(
    post,
    path = "/api/v1/users/list/ids",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = IdsRequest,
    responses(
        (status = 200, description = "Users found", body = UserItems),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users_by_ids(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<IdsRequest>,
) -> AppResult<ApiResponse<UserItems>> {
    let items = state.user_service.list_users_by_ids(payload.ids).await?;
    Ok(ApiResponse::ok(UserItems { items }))
}

/// Cursor page over the primary key
#[utoipa::path(
    get,
    path = "/api/v1/users/list",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    params(LastIdParams),
    responses(
        (status = 200, description = "Cursor page", body = CursorList),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_users_by_last_id(
    State(state): State<AppState>,
    params: Result<Query<LastIdParams>, QueryRejection>,
) -> AppResult<ApiResponse<CursorList>> {
    let Query(params) = params.map_err(|e| AppError::validation(e.body_text()))?;
    let direction = cursor_direction(params.sort.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    let page = state
        .user_service
        .list_users_after(params.last_id, limit, direction)
        .await?;

    Ok(ApiResponse::ok(CursorList {
        items: page.items,
        next_last_id: page.next_last_id,
    }))
}

/// First user matching the conditions
#[utoipa::path(
    post,
    path = "/api/v1/users/condition",
    tag = "Users",
    security(("bearer_auth" = []), ("session_cookie" = [])),
    request_body = RawConditions,
    responses(
        (status = 200, description = "Matching user", body = UserDetail),
        (status = 400, description = "Invalid query"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No user matches")
    )
)]
pub async fn get_user_by_condition(
    State(state): State<AppState>,
    AppJson(conditions): AppJson<RawConditions>,
) -> AppResult<ApiResponse<UserDetail>> {
    let user = state.user_service.get_user_by_condition(conditions).await?;
    Ok(ApiResponse::ok(UserDetail { users: user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
    }

    #[test]
    fn test_cursor_direction() {
        assert_eq!(cursor_direction(None).unwrap(), SortDirection::Asc);
        assert_eq!(cursor_direction(Some("id")).unwrap(), SortDirection::Asc);
        assert_eq!(cursor_direction(Some("-id")).unwrap(), SortDirection::Desc);
        assert!(matches!(
            cursor_direction(Some("email")),
            Err(AppError::InvalidQuery(QueryError::CursorSortMismatch { .. }))
        ));
    }

    #[test]
    fn test_first_page_cursor_is_default() {
        let params: LastIdParams = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(params.last_id, domain::FIRST_PAGE_CURSOR);
    }

    #[test]
    fn test_ids_request_bounds() {
        assert!(IdsRequest { ids: vec![] }.validate().is_err());
        assert!(IdsRequest { ids: vec![1; MAX_IDS + 1] }.validate().is_err());
        assert!(IdsRequest { ids: vec![1; MAX_IDS] }.validate().is_ok());
        assert!(IdsRequest { ids: vec![1, 2] }.validate().is_ok());
    }

    #[test]
    fn test_list_payload_shapes() {
        let offset = UserList::from(UserPage {
            items: vec![],
            total: Some(3),
            next_last_id: None,
        });
        assert_eq!(
            serde_json::to_value(offset).unwrap(),
            serde_json::json!({"items": [], "total": 3})
        );

        let cursor = UserList::from(UserPage {
            items: vec![],
            total: None,
            next_last_id: None,
        });
        assert_eq!(
            serde_json::to_value(cursor).unwrap(),
            serde_json::json!({"items": [], "nextLastID": null})
        );
    }
}
