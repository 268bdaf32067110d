//! Storage layer
//!
//! Versioned SQLite persistence for the word library and dictation
//! sessions.
//!
//! ## Architecture
//!
//! - `schema`: table definitions and forward-only migrations
//! - `database`: synchronous, transactional access to both collections
//! - `error`: validation, not-found and storage errors

pub mod database;
pub mod error;
pub mod schema;

pub use database::Database;
pub use error::{StorageError, StorageResult, ValidationError};
pub use schema::{get_schema_version, migrate, needs_migration, DATABASE_NAME, SCHEMA_VERSION};
