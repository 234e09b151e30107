//! Database module: models, schema and repository traits for the record store.
//!
//! Layout:
//! - `repository.rs`: the `UserRepository` / `RecordStore` seams the services depend on
//! - `models.rs`: row structs that need conversion into domain types
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the sqlx-backed implementation of both traits

pub mod models;
pub mod repository;
pub mod schema;
pub mod sqlite;

pub use repository::{RecordStore, UserRepository};
pub use schema::SQLITE_INIT;
pub use sqlite::{SqlitePool, SqliteStore};
