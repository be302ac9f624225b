//! Authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use common::AppError;

use crate::state::AppState;

/// Run the configured pipeline; on success the `Identity` is available to
/// handlers through `Extension<Identity>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = state.auth.authenticate(request.headers())?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
