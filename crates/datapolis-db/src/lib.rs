//! Datapolis DB - Credential store
//!
//! SQLx-based user store for Datapolis services, plus an in-memory
//! implementation of the same repository trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use datapolis_db::{create_pool, Repositories, UserRepository};
//!
//! let pool = create_pool("postgres://localhost/datapolis").await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_username("alice").await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::MemoryUserRepository;
pub use models::*;
pub use pg::{PgUserRepository, Repositories};
pub use pool::{create_pool, create_pool_with_options, DbPool, PoolOptions};
pub use repo::*;
