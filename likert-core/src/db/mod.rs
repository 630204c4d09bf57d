//! Database layer for likert
//!
//! A blocking local key-value store on SQLite:
//! - Schema migrations
//! - Whole-value get/put/delete

pub mod repo;
pub mod schema;

pub use repo::Database;
