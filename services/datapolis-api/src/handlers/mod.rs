//! HTTP handlers

mod admin;
mod auth;
mod health;
mod users;

pub use admin::{get_user, list_users, sign_up};
pub use auth::{refresh, sign_in};
pub use health::{health, ready};
pub use users::{me, update_password, update_user};
