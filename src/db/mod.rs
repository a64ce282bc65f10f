//! Database module: schema, row models and query execution.
//!
//! Layout:
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `models.rs`: Rust structs mirroring selected rows
//! - `filter.rs`: AND-combined predicate lists shared by count and page queries
//! - `sqlite.rs`: read queries behind the directory API
//! - `import.rs`: bulk import and verification, the only write path

pub mod filter;
pub mod import;
pub mod models;
pub mod schema;
pub mod sqlite;

pub use filter::{BindValue, FilterSet};
pub use schema::SQLITE_INIT;
pub use sqlite::{DirectoryStorage, OpenMode, SqlitePool, sqlite_file};
