//! Datapolis Auth Core - Authentication and authorization logic
//!
//! Password hashing, access/refresh token issuance and verification,
//! login and refresh orchestration, and the permission rules applied to
//! user management.

pub mod config;
pub mod error;
pub mod password;
pub mod permission;
pub mod service;
pub mod token;
pub mod users;

pub use config::*;
pub use error::*;
pub use password::{validate_password, PasswordHasher, MIN_PASSWORD_LENGTH};
pub use permission::*;
pub use service::*;
pub use token::*;
pub use users::*;
