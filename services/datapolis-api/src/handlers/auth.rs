//! Authentication handlers (sign-in, refresh)

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use datapolis_types::{LoginRequest, RefreshRequest, TokenResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /sign-in
///
/// Exchange a username and password for an access/refresh token pair
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".to_string(),
        ));
    }

    let pair = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(pair.into()))
}

/// POST /refresh
///
/// Issue a new access token; the refresh token is returned unchanged
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(req) = payload?;

    if req.refresh_token.is_empty() {
        return Err(ApiError::BadRequest(
            "refresh_token is required".to_string(),
        ));
    }

    let pair = state.auth.refresh_token(&req.refresh_token).await?;
    Ok(Json(pair.into()))
}
