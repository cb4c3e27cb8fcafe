//! Axum extractors for authentication

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use datapolis_auth_core::{Actor, AuthError};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller, resolved from a bearer access token
#[derive(Debug, Clone)]
pub struct AuthUser(pub Actor);

/// Authenticated caller holding the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Actor);

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = bearer_token(parts)?;

        let actor = app_state.auth.authenticate(token).inspect_err(|e| {
            tracing::debug!(error = %e, "Bearer token rejected");
        })?;

        Ok(AuthUser(actor))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(actor) = AuthUser::from_request_parts(parts, state).await?;

        if !actor.is_admin() {
            tracing::debug!(user_id = %actor.user_id, "Admin route denied");
            return Err(AuthError::NoPermission.into());
        }
        Ok(RequireAdmin(actor))
    }
}

/// Extract the token from `Authorization: Bearer <token>`
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::MissingToken)?;

    let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::InvalidToken.into()),
    }
}
