//! Datapolis API
//!
//! HTTP request layer over the auth core.
//!
//! ## Public Endpoints
//!
//! - `POST /sign-in` - Exchange credentials for a token pair
//! - `POST /refresh` - New access token from a refresh token
//!
//! ## Authenticated Endpoints
//!
//! - `GET /me` - Profile of the caller
//! - `PATCH /users/{id}` - Update a profile (self, or anyone for admins)
//! - `PUT /users/{id}/password` - Change a password (self, or anyone for admins)
//!
//! ## Admin Endpoints
//!
//! - `POST /admin/sign-up` - Register a user
//! - `GET /admin/users` - List users
//! - `GET /admin/users/{id}` - Get a user
//!
//! ## Health Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /ready` - Readiness check

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod state;

use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use crate::config::{Config, ConfigError};
pub use crate::error::{ApiError, ApiResult};
pub use crate::state::AppState;

/// Preflight cache lifetime
const CORS_MAX_AGE: Duration = Duration::from_secs(12 * 60 * 60);

/// Build the HTTP router with its middleware stack
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.request_timeout();

    let public_routes = Router::new()
        .route("/sign-in", post(handlers::sign_in))
        .route("/refresh", post(handlers::refresh));

    let user_routes = Router::new()
        .route("/me", get(handlers::me))
        .route("/users/{id}", patch(handlers::update_user))
        .route("/users/{id}/password", put(handlers::update_password));

    let admin_routes = Router::new()
        .route("/admin/sign-up", post(handlers::sign_up))
        .route("/admin/users", get(handlers::list_users))
        .route("/admin/users/{id}", get(handlers::get_user));

    // Health routes (no timeout - must always respond quickly)
    let health_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready));

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        // Request ID propagation (outermost)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        // Tracing with request details
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.cors_allowed_origins))
        .layer(CompressionLayer::new())
        // Request timeout (innermost - closest to handler)
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .layer(middleware)
        .merge(health_routes) // Health routes without timeout
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
