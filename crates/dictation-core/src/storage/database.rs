//! SQLite access for words and dictation sessions
//!
//! `Database` owns the connection and runs every logical operation in a
//! single statement or transaction. It is synchronous; `Store` wraps it
//! for async callers.
//!
//! ## Tables
//!
//! - `words` - library items, indexed by `path` and (`path`, `content`)
//! - `dictation_sessions` - session records; `words` column holds the
//!   embedded session words as a JSON array

use std::path::Path;

use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};
use tracing::{debug, info};

use super::error::{StorageError, StorageResult};
use super::schema::{self, get_schema_version};
use crate::models::{
    normalize_path, normalize_prefix, now_millis, DictationSession, ImportReport, NewSession,
    NewWord, SessionQuery, SessionStatus, SessionWord, SortOrder, Word, WordStatus,
};

const WORD_COLUMNS: &str = "id, content, pinyin, path, created_at";
const SESSION_COLUMNS: &str =
    "id, name, note, filter_path, words, status, created_at, completed_at";

/// Synchronous handle to the dictation database
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create the database file and migrate it
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "opened database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(mut conn: Connection) -> StorageResult<Self> {
        schema::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Schema version stamped in the database
    pub fn schema_version(&self) -> StorageResult<i32> {
        Ok(get_schema_version(&self.conn)?.unwrap_or(0))
    }

    // ==================== Words ====================

    /// Insert a word and return its id
    ///
    /// Only the id is assigned here; `created_at` is stored as given.
    /// Duplicates are not rejected; check with
    /// [`find_word_by_path_and_content`](Self::find_word_by_path_and_content).
    pub fn insert_word(&mut self, word: &NewWord) -> StorageResult<i64> {
        let word = word.validated()?;
        let id = insert_word_row(&self.conn, &word)?;
        debug!(id, path = %word.path, "inserted word");
        Ok(id)
    }

    /// Insert many words in one transaction, skipping existing
    /// (`path`, `content`) pairs
    ///
    /// Any invalid candidate rejects the whole batch.
    pub fn import_words(&mut self, words: &[NewWord]) -> StorageResult<ImportReport> {
        let words = words
            .iter()
            .map(NewWord::validated)
            .collect::<Result<Vec<_>, _>>()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut report = ImportReport::default();

        for word in &words {
            if find_word(&tx, &word.path, &word.content)?.is_some() {
                report.skipped += 1;
                continue;
            }
            report.inserted.push(insert_word_row(&tx, word)?);
        }

        tx.commit()?;
        info!(
            inserted = report.inserted.len(),
            skipped = report.skipped,
            "imported words"
        );
        Ok(report)
    }

    /// Get a word by id
    pub fn get_word(&self, id: i64) -> StorageResult<Option<Word>> {
        let word = self
            .conn
            .query_row(
                &format!("SELECT {} FROM words WHERE id = ?", WORD_COLUMNS),
                params![id],
                word_from_row,
            )
            .optional()?;
        Ok(word)
    }

    /// Get all words, ordered by path
    pub fn list_words(&self) -> StorageResult<Vec<Word>> {
        self.query_words_by_path_prefix("")
    }

    /// Words whose path equals `prefix` or lies below it
    ///
    /// `"A"` matches `"A"` and `"A/x"` but not `"AB/x"`. An empty prefix
    /// selects every word.
    pub fn query_words_by_path_prefix(&self, prefix: &str) -> StorageResult<Vec<Word>> {
        let prefix = normalize_prefix(prefix)?;

        let mut stmt;
        let rows = if prefix.is_empty() {
            stmt = self.conn.prepare(&format!(
                "SELECT {} FROM words ORDER BY path, id",
                WORD_COLUMNS
            ))?;
            stmt.query_map([], word_from_row)?
        } else {
            let (lower, upper) = subtree_bounds(&prefix);
            stmt = self.conn.prepare(&format!(
                "SELECT {} FROM words
                 WHERE path = ?1 OR (path >= ?2 AND path < ?3)
                 ORDER BY path, id",
                WORD_COLUMNS
            ))?;
            stmt.query_map(params![prefix, lower, upper], word_from_row)?
        };

        let words = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(prefix = %prefix, count = words.len(), "queried words by prefix");
        Ok(words)
    }

    /// Distinct paths at or below `prefix` (virtual folder listing)
    pub fn list_paths(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let prefix = normalize_prefix(prefix)?;

        let mut stmt;
        let rows = if prefix.is_empty() {
            stmt = self
                .conn
                .prepare("SELECT DISTINCT path FROM words ORDER BY path")?;
            stmt.query_map([], path_from_row)?
        } else {
            let (lower, upper) = subtree_bounds(&prefix);
            stmt = self.conn.prepare(
                "SELECT DISTINCT path FROM words
                 WHERE path = ?1 OR (path >= ?2 AND path < ?3)
                 ORDER BY path",
            )?;
            stmt.query_map(params![prefix, lower, upper], path_from_row)?
        };

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Point lookup on (`path`, `content`)
    ///
    /// A path that could never have been stored finds nothing.
    pub fn find_word_by_path_and_content(
        &self,
        path: &str,
        content: &str,
    ) -> StorageResult<Option<Word>> {
        let Ok(path) = normalize_path(path) else {
            return Ok(None);
        };
        find_word(&self.conn, &path, content.trim())
    }

    /// Delete a word
    ///
    /// Session snapshots of the word are left untouched.
    pub fn delete_word(&mut self, id: i64) -> StorageResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM words WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(StorageError::WordNotFound { id });
        }
        debug!(id, "deleted word");
        Ok(())
    }

    /// Count of words in the library
    pub fn word_count(&self) -> StorageResult<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count)
    }

    // ==================== Sessions ====================

    /// Create a pending session and return its id
    pub fn create_session(&mut self, session: &NewSession) -> StorageResult<i64> {
        let session = session.validated()?;
        let words = serde_json::to_string(&session.words)?;

        self.conn.execute(
            "INSERT INTO dictation_sessions (name, note, filter_path, words, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.name,
                session.note,
                session.filter_path,
                words,
                SessionStatus::Pending.as_str(),
                now_millis(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        info!(id, words = session.words.len(), "created dictation session");
        Ok(id)
    }

    /// Get a session by id
    pub fn get_session(&self, id: i64) -> StorageResult<Option<DictationSession>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM dictation_sessions WHERE id = ?",
                    SESSION_COLUMNS
                ),
                params![id],
                SessionRow::from_row,
            )
            .optional()?;

        row.map(SessionRow::hydrate).transpose()
    }

    /// Record the status of one word in a session
    ///
    /// Only the matching entry changes; order is preserved. A pending
    /// session moves to in progress. Completed sessions keep their status.
    pub fn update_session_word_status(
        &mut self,
        session_id: i64,
        word_id: i64,
        status: WordStatus,
    ) -> StorageResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (words, session_status): (String, String) = tx
            .query_row(
                "SELECT words, status FROM dictation_sessions WHERE id = ?",
                params![session_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StorageError::SessionNotFound { id: session_id })?;

        let mut words: Vec<SessionWord> = serde_json::from_str(&words)?;
        let entry = words
            .iter_mut()
            .find(|w| w.word_id == word_id)
            .ok_or(StorageError::SessionWordNotFound {
                session_id,
                word_id,
            })?;
        entry.status = status;

        let session_status = match session_status.parse::<SessionStatus>()? {
            SessionStatus::Pending => SessionStatus::InProgress,
            other => other,
        };

        tx.execute(
            "UPDATE dictation_sessions SET words = ?1, status = ?2 WHERE id = ?3",
            params![
                serde_json::to_string(&words)?,
                session_status.as_str(),
                session_id
            ],
        )?;
        tx.commit()?;

        debug!(session_id, word_id, status = %status, "updated session word");
        Ok(())
    }

    /// Mark a session completed
    ///
    /// The first completion wins: calling this on a completed session
    /// keeps the original `completed_at`.
    pub fn complete_session(&mut self, session_id: i64) -> StorageResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let status: String = tx
            .query_row(
                "SELECT status FROM dictation_sessions WHERE id = ?",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::SessionNotFound { id: session_id })?;

        if status.parse::<SessionStatus>()? == SessionStatus::Completed {
            debug!(session_id, "session already completed");
            return Ok(());
        }

        tx.execute(
            "UPDATE dictation_sessions SET status = ?1, completed_at = ?2 WHERE id = ?3",
            params![SessionStatus::Completed.as_str(), now_millis(), session_id],
        )?;
        tx.commit()?;

        info!(session_id, "completed dictation session");
        Ok(())
    }

    /// List sessions, optionally filtered by status, ordered by creation time
    pub fn list_sessions(&self, query: SessionQuery) -> StorageResult<Vec<DictationSession>> {
        let order = match query.order {
            SortOrder::NewestFirst => "DESC",
            SortOrder::OldestFirst => "ASC",
        };
        let filter = if query.status.is_some() {
            "WHERE status = ?1"
        } else {
            ""
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM dictation_sessions {} ORDER BY created_at {}, id {}",
            SESSION_COLUMNS, filter, order, order
        ))?;

        let rows = stmt.query_map(
            params_from_iter(query.status.iter().map(|s| s.as_str())),
            SessionRow::from_row,
        )?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.hydrate()?);
        }
        Ok(sessions)
    }

    /// Delete a session
    pub fn delete_session(&mut self, id: i64) -> StorageResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM dictation_sessions WHERE id = ?", params![id])?;
        if deleted == 0 {
            return Err(StorageError::SessionNotFound { id });
        }
        debug!(id, "deleted dictation session");
        Ok(())
    }

    /// Number of sessions in each status, in `SessionStatus::ALL` order
    pub fn session_counts_by_status(&self) -> StorageResult<Vec<(SessionStatus, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, COUNT(*) FROM dictation_sessions GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts: Vec<(SessionStatus, i64)> =
            SessionStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for (status, count) in rows {
            let status = status.parse::<SessionStatus>()?;
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                entry.1 = count;
            }
        }
        Ok(counts)
    }

    /// Count of stored sessions
    pub fn session_count(&self) -> StorageResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM dictation_sessions",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Half-open key range `[prefix + "/", prefix + "0")` covering the subtree
///
/// `'0'` is the code point after `'/'`, so the range holds exactly the
/// paths starting with `prefix + "/"`.
fn subtree_bounds(prefix: &str) -> (String, String) {
    (format!("{}/", prefix), format!("{}0", prefix))
}

fn insert_word_row(conn: &Connection, word: &NewWord) -> StorageResult<i64> {
    conn.execute(
        "INSERT INTO words (content, pinyin, path, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![word.content, word.pinyin, word.path, word.created_at],
    )?;
    Ok(conn.last_insert_rowid())
}

fn find_word(conn: &Connection, path: &str, content: &str) -> StorageResult<Option<Word>> {
    let word = conn
        .query_row(
            &format!(
                "SELECT {} FROM words WHERE path = ?1 AND content = ?2 ORDER BY id LIMIT 1",
                WORD_COLUMNS
            ),
            params![path, content],
            word_from_row,
        )
        .optional()?;
    Ok(word)
}

fn path_from_row(row: &Row<'_>) -> rusqlite::Result<String> {
    row.get(0)
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<Word> {
    Ok(Word {
        id: row.get(0)?,
        content: row.get(1)?,
        pinyin: row.get(2)?,
        path: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Raw session row before the embedded words are decoded
struct SessionRow {
    id: i64,
    name: String,
    note: Option<String>,
    filter_path: String,
    words: String,
    status: String,
    created_at: i64,
    completed_at: Option<i64>,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            note: row.get(2)?,
            filter_path: row.get(3)?,
            words: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            completed_at: row.get(7)?,
        })
    }

    fn hydrate(self) -> StorageResult<DictationSession> {
        Ok(DictationSession {
            id: self.id,
            name: self.name,
            note: self.note,
            filter_path: self.filter_path,
            words: serde_json::from_str(&self.words)?,
            status: self.status.parse()?,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_words(words: &[(&str, &str, &str)]) -> Database {
        let mut db = Database::open_in_memory().unwrap();
        for (content, pinyin, path) in words {
            db.insert_word(&NewWord::new(*content, *pinyin, *path))
                .unwrap();
        }
        db
    }

    fn snapshot_all(db: &Database) -> Vec<SessionWord> {
        db.list_words()
            .unwrap()
            .iter()
            .map(SessionWord::snapshot)
            .collect()
    }

    fn paths(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.path.as_str()).collect()
    }

    #[test]
    fn test_insert_and_find_round_trip() {
        let mut db = Database::open_in_memory().unwrap();
        let id = db
            .insert_word(&NewWord::new("霜", "shuāng", "G1/U1/L1"))
            .unwrap();
        assert_eq!(id, 1);

        let found = db
            .find_word_by_path_and_content("G1/U1/L1", "霜")
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.content, "霜");
        assert_eq!(found.pinyin, "shuāng");
        assert_eq!(found.path, "G1/U1/L1");
        assert_eq!(db.get_word(id).unwrap(), Some(found));

        assert!(db
            .find_word_by_path_and_content("G1/U1/L2", "霜")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_insert_keeps_supplied_created_at() {
        let mut db = Database::open_in_memory().unwrap();
        let word: NewWord = serde_json::from_str(
            r#"{"content": "霜", "pinyin": "shuāng", "path": "G1", "createdAt": 100}"#,
        )
        .unwrap();
        db.insert_word(&word).unwrap();

        let found = db.find_word_by_path_and_content("G1", "霜").unwrap().unwrap();
        assert_eq!(found.created_at, 100);

        let report = db
            .import_words(&[NewWord::new("雪", "xuě", "G1").with_created_at(7)])
            .unwrap();
        let imported = db.get_word(report.inserted[0]).unwrap().unwrap();
        assert_eq!(imported.created_at, 7);
    }

    #[test]
    fn test_find_with_malformed_path_finds_nothing() {
        let db = db_with_words(&[("霜", "shuāng", "A/B")]);
        assert!(db
            .find_word_by_path_and_content("A//B", "霜")
            .unwrap()
            .is_none());
        assert!(db.find_word_by_path_and_content("", "霜").unwrap().is_none());
    }

    #[test]
    fn test_insert_rejects_invalid_word() {
        let mut db = Database::open_in_memory().unwrap();

        let err = db.insert_word(&NewWord::new("", "x", "G1")).unwrap_err();
        assert!(err.is_validation());

        let err = db.insert_word(&NewWord::new("霜", "", "G1//L1")).unwrap_err();
        assert!(err.is_validation());

        assert_eq!(db.word_count().unwrap(), 0);
    }

    #[test]
    fn test_duplicates_are_not_rejected_by_storage() {
        let mut db = Database::open_in_memory().unwrap();
        let word = NewWord::new("霜", "shuāng", "G1");
        let first = db.insert_word(&word).unwrap();
        let second = db.insert_word(&word).unwrap();
        assert_ne!(first, second);

        let found = db.find_word_by_path_and_content("G1", "霜").unwrap().unwrap();
        assert_eq!(found.id, first);
    }

    #[test]
    fn test_prefix_query_matches_subtree_only() {
        let db = db_with_words(&[
            ("一", "yī", "A"),
            ("二", "èr", "A/x"),
            ("三", "sān", "A/x/y"),
            ("四", "sì", "AB/x"),
            ("五", "wǔ", "A-B"),
            ("六", "liù", "B"),
        ]);

        let words = db.query_words_by_path_prefix("A").unwrap();
        assert_eq!(paths(&words), vec!["A", "A/x", "A/x/y"]);

        let words = db.query_words_by_path_prefix("A/x").unwrap();
        assert_eq!(paths(&words), vec!["A/x", "A/x/y"]);

        let words = db.query_words_by_path_prefix("A/x/").unwrap();
        assert_eq!(paths(&words), vec!["A/x", "A/x/y"]);

        assert!(db.query_words_by_path_prefix("A/z").unwrap().is_empty());
        assert_eq!(db.query_words_by_path_prefix("").unwrap().len(), 6);
    }

    #[test]
    fn test_prefix_query_with_unicode_paths() {
        let db = db_with_words(&[
            ("霜", "shuāng", "一年级下册/第一单元/第一课"),
            ("雪", "xuě", "一年级下册/第一单元/第二课"),
            ("冰", "bīng", "一年级下册/第二单元"),
            ("风", "fēng", "一年级下册第一单元"),
        ]);

        let words = db
            .query_words_by_path_prefix("一年级下册/第一单元")
            .unwrap();
        assert_eq!(words.len(), 2);

        let words = db.query_words_by_path_prefix("一年级下册").unwrap();
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_list_paths() {
        let db = db_with_words(&[
            ("一", "", "G1/U1"),
            ("二", "", "G1/U1"),
            ("三", "", "G1/U2"),
            ("四", "", "G2"),
        ]);

        assert_eq!(db.list_paths("G1").unwrap(), vec!["G1/U1", "G1/U2"]);
        assert_eq!(db.list_paths("").unwrap().len(), 3);
    }

    #[test]
    fn test_delete_word() {
        let mut db = db_with_words(&[("霜", "shuāng", "G1")]);
        db.delete_word(1).unwrap();
        assert_eq!(db.word_count().unwrap(), 0);

        let err = db.delete_word(1).unwrap_err();
        assert!(matches!(err, StorageError::WordNotFound { id: 1 }));
    }

    #[test]
    fn test_import_skips_existing_and_batch_duplicates() {
        let mut db = db_with_words(&[("霜", "shuāng", "G1/U1")]);

        let report = db
            .import_words(&[
                NewWord::new("霜", "shuāng", "G1/U1"),
                NewWord::new("雪", "xuě", "G1/U1"),
                NewWord::new("雪", "xuě", "G1/U1"),
                NewWord::new("霜", "shuāng", "G1/U2"),
            ])
            .unwrap();

        assert_eq!(report.inserted, vec![2, 3]);
        assert_eq!(report.skipped, 2);
        assert_eq!(db.word_count().unwrap(), 3);
    }

    #[test]
    fn test_import_rejects_batch_with_invalid_word() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .import_words(&[NewWord::new("霜", "", "G1"), NewWord::new("", "", "G1")])
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(db.word_count().unwrap(), 0);
    }

    #[test]
    fn test_create_session_starts_pending() {
        let mut db = db_with_words(&[("霜", "shuāng", "G1")]);
        let words = snapshot_all(&db);

        let id = db
            .create_session(&NewSession::new("Week 1", "G1", words.clone()).with_note("first try"))
            .unwrap();

        let session = db.get_session(id).unwrap().unwrap();
        assert_eq!(session.name, "Week 1");
        assert_eq!(session.note.as_deref(), Some("first try"));
        assert_eq!(session.filter_path, "G1");
        assert_eq!(session.words, words);
        assert_eq!(session.status, SessionStatus::Pending);
        assert!(session.completed_at.is_none());
        assert!(session.created_at > 0);
    }

    #[test]
    fn test_create_session_requires_words() {
        let mut db = Database::open_in_memory().unwrap();
        let err = db
            .create_session(&NewSession::new("Empty", "G1", Vec::new()))
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(db.session_count().unwrap(), 0);
    }

    #[test]
    fn test_update_word_status_changes_only_target() {
        let mut db = db_with_words(&[("一", "yī", "G1"), ("二", "èr", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();

        db.update_session_word_status(id, 2, WordStatus::Correct)
            .unwrap();

        let session = db.get_session(id).unwrap().unwrap();
        let statuses: Vec<(i64, WordStatus)> = session
            .words
            .iter()
            .map(|w| (w.word_id, w.status))
            .collect();
        assert_eq!(
            statuses,
            vec![(1, WordStatus::New), (2, WordStatus::Correct)]
        );
        assert_eq!(session.status, SessionStatus::InProgress);
    }

    #[test]
    fn test_update_word_status_not_found() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();

        let err = db
            .update_session_word_status(id, 42, WordStatus::Fuzzy)
            .unwrap_err();
        assert!(matches!(
            err,
            StorageError::SessionWordNotFound { word_id: 42, .. }
        ));

        let err = db
            .update_session_word_status(99, 1, WordStatus::Fuzzy)
            .unwrap_err();
        assert!(matches!(err, StorageError::SessionNotFound { id: 99 }));

        // Failed update leaves the session untouched
        let session = db.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Pending);
    }

    #[test]
    fn test_complete_session_first_write_wins() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();

        db.complete_session(id).unwrap();
        let first = db.get_session(id).unwrap().unwrap();
        assert_eq!(first.status, SessionStatus::Completed);
        let completed_at = first.completed_at.unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        db.complete_session(id).unwrap();
        let second = db.get_session(id).unwrap().unwrap();
        assert_eq!(second.completed_at, Some(completed_at));

        assert!(db.complete_session(99).unwrap_err().is_not_found());
    }

    #[test]
    fn test_regrading_completed_session_keeps_status() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();
        db.complete_session(id).unwrap();

        db.update_session_word_status(id, 1, WordStatus::WrongWriting)
            .unwrap();

        let session = db.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.completed_at.is_some());
        assert_eq!(session.words[0].status, WordStatus::WrongWriting);
    }

    #[test]
    fn test_deleting_word_keeps_session_snapshot() {
        let mut db = db_with_words(&[("霜", "shuāng", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();
        db.update_session_word_status(id, 1, WordStatus::Fuzzy)
            .unwrap();

        db.delete_word(1).unwrap();

        let session = db.get_session(id).unwrap().unwrap();
        let word = session.word(1).unwrap();
        assert_eq!(word.content, "霜");
        assert_eq!(word.pinyin, "shuāng");
        assert_eq!(word.status, WordStatus::Fuzzy);
    }

    #[test]
    fn test_list_sessions_filter_and_order() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let words = snapshot_all(&db);

        let first = db
            .create_session(&NewSession::new("first", "G1", words.clone()))
            .unwrap();
        let second = db
            .create_session(&NewSession::new("second", "G1", words.clone()))
            .unwrap();
        let third = db
            .create_session(&NewSession::new("third", "G1", words))
            .unwrap();
        db.complete_session(second).unwrap();

        let ids = |sessions: Vec<DictationSession>| -> Vec<i64> {
            sessions.iter().map(|s| s.id).collect()
        };

        let all = db.list_sessions(SessionQuery::default()).unwrap();
        assert_eq!(ids(all), vec![third, second, first]);

        let oldest = db
            .list_sessions(SessionQuery::default().oldest_first())
            .unwrap();
        assert_eq!(ids(oldest), vec![first, second, third]);

        let completed = db
            .list_sessions(SessionQuery::with_status(SessionStatus::Completed))
            .unwrap();
        assert_eq!(ids(completed), vec![second]);

        let pending = db
            .list_sessions(SessionQuery::with_status(SessionStatus::Pending).oldest_first())
            .unwrap();
        assert_eq!(ids(pending), vec![first, third]);
    }

    #[test]
    fn test_delete_session() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let id = db
            .create_session(&NewSession::new("s", "G1", snapshot_all(&db)))
            .unwrap();

        db.delete_session(id).unwrap();
        assert!(db.get_session(id).unwrap().is_none());
        assert!(db.delete_session(id).unwrap_err().is_not_found());
        // Library is unaffected
        assert_eq!(db.word_count().unwrap(), 1);
    }

    #[test]
    fn test_migrated_v1_database_is_usable() {
        let mut conn = Connection::open_in_memory().unwrap();
        schema::migrate_to(&mut conn, 1).unwrap();
        conn.execute(
            "INSERT INTO words (content, path, status, created_at) VALUES ('霜', 'G1/U1', 'fuzzy', 1)",
            [],
        )
        .unwrap();

        let db = Database::with_connection(conn).unwrap();
        assert_eq!(db.schema_version().unwrap(), 2);

        let word = db
            .find_word_by_path_and_content("G1/U1", "霜")
            .unwrap()
            .unwrap();
        assert_eq!(word.pinyin, "");
        assert_eq!(word.created_at, 1);
    }

    #[test]
    fn test_open_on_disk_persists() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dictation-db.sqlite");

        {
            let mut db = Database::open(&path).unwrap();
            db.insert_word(&NewWord::new("霜", "shuāng", "G1")).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.word_count().unwrap(), 1);
        assert_eq!(db.schema_version().unwrap(), 2);
    }

    #[test]
    fn test_two_handles_on_one_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("dictation-db.sqlite");

        {
            let mut conn = Connection::open(&path).unwrap();
            schema::migrate_to(&mut conn, 1).unwrap();
            conn.execute(
                "INSERT INTO words (content, path, status, created_at) VALUES ('霜', 'G1', 'fuzzy', 1)",
                [],
            )
            .unwrap();
        }

        let mut first = Database::open(&path).unwrap();
        let mut second = Database::open(&path).unwrap();
        assert_eq!(first.schema_version().unwrap(), 2);
        assert_eq!(second.schema_version().unwrap(), 2);

        let id = first
            .create_session(&NewSession::new("s", "G1", snapshot_all(&first)))
            .unwrap();
        second
            .update_session_word_status(id, 1, WordStatus::Correct)
            .unwrap();
        first.complete_session(id).unwrap();

        let session = second.get_session(id).unwrap().unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert_eq!(session.words[0].status, WordStatus::Correct);
    }

    #[test]
    fn test_session_counts_by_status() {
        let mut db = db_with_words(&[("一", "yī", "G1")]);
        let words = snapshot_all(&db);

        assert_eq!(
            db.session_counts_by_status().unwrap(),
            vec![
                (SessionStatus::Pending, 0),
                (SessionStatus::InProgress, 0),
                (SessionStatus::Completed, 0),
            ]
        );

        for name in ["a", "b", "c"] {
            db.create_session(&NewSession::new(name, "G1", words.clone()))
                .unwrap();
        }
        db.update_session_word_status(1, 1, WordStatus::Fuzzy)
            .unwrap();
        db.complete_session(2).unwrap();

        assert_eq!(
            db.session_counts_by_status().unwrap(),
            vec![
                (SessionStatus::Pending, 1),
                (SessionStatus::InProgress, 1),
                (SessionStatus::Completed, 1),
            ]
        );
    }
}
