//! Dictation Core Library
//!
//! This crate provides the persistence layer for a dictation practice
//! tool: a hierarchical word library and the record of every dictation
//! session (which words were tested and how each was recalled).
//!
//! # Architecture
//!
//! - **SQLite**: single local database with a versioned schema
//! - **Store**: async facade; each operation is one transaction
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open().await?;
//!
//! // Add a word under a virtual folder
//! let id = store.insert_word(NewWord::new("霜", "shuāng", "G1/U1/L1")).await?;
//!
//! // Start a session from a subtree
//! let words = store.query_words_by_path_prefix("G1/U1").await?;
//! let snapshot = words.iter().map(SessionWord::snapshot).collect();
//! let session_id = store.create_session(NewSession::new("Week 1", "G1/U1", snapshot)).await?;
//! ```
//!
//! # Modules
//!
//! - `store`: Async storage interface (main entry point)
//! - `models`: Words, sessions and session words
//! - `storage`: SQLite schema, migrations and queries
//! - `config`: Application configuration
//! - `settings`: In-memory dictation preferences

pub mod config;
pub mod models;
pub mod settings;
pub mod storage;
pub mod store;

pub use config::Config;
pub use models::{
    DictationSession, ImportReport, NewSession, NewWord, SessionQuery, SessionStatus,
    SessionWord, SortOrder, Word, WordStatus,
};
pub use settings::Settings;
pub use storage::{Database, StorageError, StorageResult, ValidationError};
pub use store::Store;
