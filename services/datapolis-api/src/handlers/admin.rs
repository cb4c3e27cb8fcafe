//! Admin-only user management handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use datapolis_auth_core::NewUser;
use datapolis_types::{UserId, UserProfile};

use crate::error::ApiResult;
use crate::extractors::RequireAdmin;
use crate::state::AppState;

/// POST /admin/sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(new_user) = payload?;
    let profile = state.users.register(new_user).await?;
    tracing::info!(admin = %admin.user_id, user_id = %profile.id, "Admin created user");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.users.list_users().await?))
}

/// GET /admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Path(id) = path?;
    Ok(Json(state.users.get_user(UserId(id)).await?))
}
