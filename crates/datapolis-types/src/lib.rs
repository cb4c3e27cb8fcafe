//! Datapolis Types - Shared domain types
//!
//! This crate contains domain types used across Datapolis crates:
//! - User identity and roles
//! - Token pairs and the sign-in/refresh wire shapes

pub mod auth;
pub mod user;

pub use auth::*;
pub use user::*;
