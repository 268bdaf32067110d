//! SQLite schema and migrations
//!
//! The schema version lives in the `schema_info` table. Opening a database
//! applies every pending migration in one transaction. Migrations only go
//! forward; a database stamped with a newer version is rejected.
//!
//! ## Generations
//!
//! - v1: `words(id, content, path, status, created_at)`
//! - v2: `words` drops `status` and gains `pinyin`; `dictation_sessions`
//!   holds the per-word status instead. The v1 status values are discarded.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};
use tracing::{debug, info, warn};

use super::error::{StorageError, StorageResult};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Fixed name of the database
pub const DATABASE_NAME: &str = "dictation-db";

const SCHEMA_INFO: &str = r#"
    CREATE TABLE IF NOT EXISTS schema_info (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

const V1_WORDS: &str = r#"
    CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        path TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'new',
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_words_path ON words(path);
    CREATE INDEX IF NOT EXISTS idx_words_path_content ON words(path, content);
"#;

const V2_WORDS: &str = r#"
    CREATE TABLE words_v2 (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        content TEXT NOT NULL,
        pinyin TEXT NOT NULL DEFAULT '',
        path TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    INSERT INTO words_v2 (id, content, pinyin, path, created_at)
    SELECT id, content, '', path, created_at FROM words;

    DROP TABLE words;
    ALTER TABLE words_v2 RENAME TO words;

    -- Subtree queries (range scan on the path prefix)
    CREATE INDEX idx_words_path ON words(path);

    -- Duplicate detection on (path, content)
    CREATE INDEX idx_words_path_content ON words(path, content);
"#;

const V2_SESSIONS: &str = r#"
    CREATE TABLE IF NOT EXISTS dictation_sessions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        note TEXT,
        filter_path TEXT NOT NULL,
        -- JSON array of session words, in presentation order
        words TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
            CHECK (status IN ('pending', 'in_progress', 'completed')),
        created_at INTEGER NOT NULL,
        completed_at INTEGER,
        CHECK ((status = 'completed') = (completed_at IS NOT NULL))
    );

    CREATE INDEX IF NOT EXISTS idx_sessions_status ON dictation_sessions(status);
    CREATE INDEX IF NOT EXISTS idx_sessions_created_at ON dictation_sessions(created_at);
"#;

/// Bring the database up to the current schema version
pub fn migrate(conn: &mut Connection) -> StorageResult<()> {
    migrate_to(conn, SCHEMA_VERSION)
}

/// Apply migrations up to `target`
///
/// The version is read under a write lock, so a second process opening the
/// same file waits and then sees the migrated version.
pub(crate) fn migrate_to(conn: &mut Connection, target: i32) -> StorageResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let current = get_schema_version(&tx)?.unwrap_or(0);

    if current > SCHEMA_VERSION {
        return Err(StorageError::UnsupportedVersion {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }
    if current >= target {
        debug!(version = current, "schema is up to date");
        return Ok(());
    }

    tx.execute_batch(SCHEMA_INFO)?;

    if current < 1 && target >= 1 {
        tx.execute_batch(V1_WORDS)?;
        info!("applied schema v1");
    }

    if current < 2 && target >= 2 {
        migrate_v2(&tx)?;
        info!("applied schema v2");
    }

    set_schema_version(&tx, target)?;
    tx.commit()?;

    info!(from = current, to = target, "database migrated");
    Ok(())
}

/// v1 -> v2: relocate word status into session records
fn migrate_v2(tx: &Transaction<'_>) -> StorageResult<()> {
    let graded: i64 = tx.query_row(
        "SELECT COUNT(*) FROM words WHERE status != 'new'",
        [],
        |row| row.get(0),
    )?;
    if graded > 0 {
        warn!(
            words = graded,
            "dropping per-word status from the v1 schema; it is not carried into sessions"
        );
    }

    tx.execute_batch(V2_WORDS)?;
    tx.execute_batch(V2_SESSIONS)?;
    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> StorageResult<Option<i32>> {
    if !table_exists(conn, "schema_info")? {
        return Ok(None);
    }

    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = 'version'",
            [],
            |row| row.get(0),
        )
        .optional()?;

    Ok(value.and_then(|v| v.parse().ok()))
}

/// Check if schema needs initialization or migration
pub fn needs_migration(conn: &Connection) -> bool {
    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

fn set_schema_version(tx: &Transaction<'_>, version: i32) -> StorageResult<()> {
    tx.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [version.to_string()],
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> StorageResult<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?")?
        .exists([name])?;
    Ok(exists)
}
