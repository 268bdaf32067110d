//! Unified storage interface
//!
//! The `Store` is the async entry point for the rest of the application.
//! Each call runs its SQLite work on tokio's blocking pool and suspends the
//! caller until it finishes; the connection sits behind a mutex so one
//! operation writes at a time.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open().await?;
//!
//! let id = store.insert_word(NewWord::new("霜", "shuāng", "G1/U1/L1")).await?;
//! let words = store.query_words_by_path_prefix("G1/U1").await?;
//! ```

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::models::{
    DictationSession, ImportReport, NewSession, NewWord, SessionQuery, SessionStatus, Word,
    WordStatus,
};
use crate::storage::{Database, StorageError, StorageResult};

/// Async storage interface for the word library and dictation sessions
#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Database>>,
    config: Config,
}

impl Store {
    /// Open the store using the configuration from the default location
    pub async fn open() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        Self::open_with_config(config)
            .await
            .context("Failed to open dictation database")
    }

    /// Open the store with a specific configuration
    ///
    /// Creates the database on first use and applies pending migrations.
    pub async fn open_with_config(config: Config) -> StorageResult<Self> {
        let path = config.database_path();
        let db = tokio::task::spawn_blocking(move || Database::open(&path))
            .await
            .map_err(|e| StorageError::TaskAborted(e.to_string()))??;

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            config,
        })
    }

    /// Open a store backed by an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Ok(Self {
            db: Arc::new(Mutex::new(Database::open_in_memory()?)),
            config: Config::default(),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` against the database on the blocking pool
    async fn run<T, F>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Database) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut guard = db
                .lock()
                .map_err(|_| StorageError::TaskAborted("database lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StorageError::TaskAborted(e.to_string()))?
    }

    /// Schema version of the open database
    pub async fn schema_version(&self) -> StorageResult<i32> {
        self.run(|db| db.schema_version()).await
    }

    // ==================== Word Operations ====================

    /// Insert a word and return its id
    pub async fn insert_word(&self, word: NewWord) -> StorageResult<i64> {
        self.run(move |db| db.insert_word(&word)).await
    }

    /// Insert candidates that are not in the library yet
    pub async fn import_words(&self, words: Vec<NewWord>) -> StorageResult<ImportReport> {
        debug!(candidates = words.len(), "importing words");
        self.run(move |db| db.import_words(&words)).await
    }

    /// Get a word by ID
    pub async fn get_word(&self, id: i64) -> StorageResult<Option<Word>> {
        self.run(move |db| db.get_word(id)).await
    }

    /// Get all words
    pub async fn list_words(&self) -> StorageResult<Vec<Word>> {
        self.run(|db| db.list_words()).await
    }

    /// Words at or below a path prefix
    pub async fn query_words_by_path_prefix(
        &self,
        prefix: impl Into<String>,
    ) -> StorageResult<Vec<Word>> {
        let prefix = prefix.into();
        self.run(move |db| db.query_words_by_path_prefix(&prefix))
            .await
    }

    /// Distinct paths at or below a prefix
    pub async fn list_paths(&self, prefix: impl Into<String>) -> StorageResult<Vec<String>> {
        let prefix = prefix.into();
        self.run(move |db| db.list_paths(&prefix)).await
    }

    /// Look up a word by its natural key
    pub async fn find_word_by_path_and_content(
        &self,
        path: impl Into<String>,
        content: impl Into<String>,
    ) -> StorageResult<Option<Word>> {
        let path = path.into();
        let content = content.into();
        self.run(move |db| db.find_word_by_path_and_content(&path, &content))
            .await
    }

    /// Delete a word
    pub async fn delete_word(&self, id: i64) -> StorageResult<()> {
        self.run(move |db| db.delete_word(id)).await
    }

    /// Get count of words
    pub async fn word_count(&self) -> StorageResult<i64> {
        self.run(|db| db.word_count()).await
    }

    // ==================== Session Operations ====================

    /// Create a pending session and return its id
    pub async fn create_session(&self, session: NewSession) -> StorageResult<i64> {
        self.run(move |db| db.create_session(&session)).await
    }

    /// Get a session by ID
    pub async fn get_session(&self, id: i64) -> StorageResult<Option<DictationSession>> {
        self.run(move |db| db.get_session(id)).await
    }

    /// Record the status of one word in a session
    pub async fn update_session_word_status(
        &self,
        session_id: i64,
        word_id: i64,
        status: WordStatus,
    ) -> StorageResult<()> {
        self.run(move |db| db.update_session_word_status(session_id, word_id, status))
            .await
    }

    /// Mark a session completed
    pub async fn complete_session(&self, session_id: i64) -> StorageResult<()> {
        self.run(move |db| db.complete_session(session_id)).await
    }

    /// List sessions for history views
    pub async fn list_sessions(&self, query: SessionQuery) -> StorageResult<Vec<DictationSession>> {
        self.run(move |db| db.list_sessions(query)).await
    }

    /// Delete a session
    pub async fn delete_session(&self, id: i64) -> StorageResult<()> {
        self.run(move |db| db.delete_session(id)).await
    }

    /// Number of sessions in each status
    pub async fn session_counts_by_status(&self) -> StorageResult<Vec<(SessionStatus, i64)>> {
        self.run(|db| db.session_counts_by_status()).await
    }

    /// Get count of sessions
    pub async fn session_count(&self) -> StorageResult<i64> {
        self.run(|db| db.session_count()).await
    }
}
