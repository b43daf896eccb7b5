//! Admin token check
//!
//! Admin routes require `X-Admin-Token` to equal the configured token. With
//! no token configured every admin request is refused.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::error::ApiError;
use crate::AppState;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.admin_token.as_deref() else {
        warn!("Admin request refused: no admin token configured");
        return Err(ApiError::Unauthorized);
    };

    let provided = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        warn!("Admin request refused: invalid token");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}
