//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates all the SQL logic and data access patterns, allowing the HTTP handlers
//! and the command line tools to work with domain models without needing to know about
//! the underlying schema or queries.
//!
//! Each sub-module is responsible for one entity (users, matches, categories, comments)
//! plus the sample data seeder. All public functions are re-exported here for convenient
//! access under the `crate::db::services::` path.

pub mod category_service;
pub mod comment_service;
pub mod match_service;
pub mod seed_service;
pub mod user_service;

pub use category_service::*;
pub use comment_service::*;
pub use match_service::*;
pub use seed_service::*;
pub use user_service::*;
