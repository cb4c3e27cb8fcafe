//! Self-service user handlers

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use datapolis_auth_core::UserChanges;
use datapolis_types::{UserId, UserProfile};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

/// GET /me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<UserProfile>> {
    let profile = state.users.get_user(actor.user_id).await?;
    Ok(Json(profile))
}

/// PATCH /users/{id}
///
/// Admins may update anyone; other users only themselves
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserChanges>, JsonRejection>,
) -> ApiResult<Json<UserProfile>> {
    let Path(id) = path?;
    let Json(changes) = payload?;

    let profile = state.users.update_user(&actor, UserId(id), changes).await?;
    Ok(Json(profile))
}

/// PUT /users/{id}/password
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    let Json(req) = payload?;

    state
        .users
        .update_password(&actor, UserId(id), req.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
