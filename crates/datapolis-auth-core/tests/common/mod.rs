//! Common test utilities for datapolis-auth-core integration tests

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::*;
