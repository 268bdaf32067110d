//! Data models for the dictation store
//!
//! Defines the library item (`Word`), the session record
//! (`DictationSession`) and the per-word snapshot embedded in a session
//! (`SessionWord`).
//!
//! Timestamps are milliseconds since the Unix epoch.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::ValidationError;

/// Separator between segments of a word path
pub const PATH_SEPARATOR: char = '/';

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds to a UTC datetime (for display)
pub fn to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Normalize a `/`-delimited category path
///
/// Segments are trimmed. Empty paths and empty segments (`"A//B"`,
/// `"/A"`, `"A/"`) are rejected.
pub fn normalize_path(path: &str) -> Result<String, ValidationError> {
    if path.trim().is_empty() {
        return Err(ValidationError::MissingField("path"));
    }

    let segments: Vec<&str> = path.split(PATH_SEPARATOR).map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ValidationError::MalformedPath(path.to_string()));
    }

    Ok(segments.join("/"))
}

/// Normalize a prefix used for subtree queries
///
/// Unlike [`normalize_path`], an empty prefix (or a bare `/`) is allowed
/// and means the whole library. Trailing separators are ignored.
pub fn normalize_prefix(prefix: &str) -> Result<String, ValidationError> {
    let trimmed = prefix.trim().trim_end_matches(PATH_SEPARATOR);
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    normalize_path(trimmed)
}

/// A library item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// Surrogate key assigned by the store
    pub id: i64,
    /// The character or short phrase being learned
    pub content: String,
    /// Pronunciation annotation
    pub pinyin: String,
    /// Category path, e.g. `"GradeA/UnitB/LessonC"`
    pub path: String,
    pub created_at: i64,
}

/// A word that has not been stored yet
///
/// The store assigns the id; everything else, `created_at` included, is
/// kept as given.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub content: String,
    #[serde(default)]
    pub pinyin: String,
    pub path: String,
    /// Omitted in import files means "now"
    #[serde(default = "now_millis")]
    pub created_at: i64,
}

impl NewWord {
    pub fn new(
        content: impl Into<String>,
        pinyin: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            pinyin: pinyin.into(),
            path: path.into(),
            created_at: now_millis(),
        }
    }

    /// Keep an existing creation time (re-imports, restores)
    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }

    /// Check required fields and return the normalized form
    pub fn validated(&self) -> Result<NewWord, ValidationError> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ValidationError::MissingField("content"));
        }

        Ok(NewWord {
            content: content.to_string(),
            pinyin: self.pinyin.trim().to_string(),
            path: normalize_path(&self.path)?,
            created_at: self.created_at,
        })
    }
}

/// Progress of a single word within a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WordStatus {
    /// Not dictated yet
    #[default]
    New,
    /// Knows the character but not its pinyin
    WrongPinyin,
    /// Knows the pinyin but wrote the character wrong
    WrongWriting,
    /// Unsure
    Fuzzy,
    /// Fully recalled
    Correct,
}

impl WordStatus {
    pub const ALL: [WordStatus; 5] = [
        WordStatus::New,
        WordStatus::WrongPinyin,
        WordStatus::WrongWriting,
        WordStatus::Fuzzy,
        WordStatus::Correct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WordStatus::New => "new",
            WordStatus::WrongPinyin => "wrong_pinyin",
            WordStatus::WrongWriting => "wrong_writing",
            WordStatus::Fuzzy => "fuzzy",
            WordStatus::Correct => "correct",
        }
    }

    /// Whether the word has been graded
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WordStatus::New)
    }
}

impl fmt::Display for WordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WordStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// Progress of a whole session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 3] = [
        SessionStatus::Pending,
        SessionStatus::InProgress,
        SessionStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus(s.to_string()))
    }
}

/// A word as it was when a session was created
///
/// `content` and `pinyin` are copies, so the session stays readable after
/// the library word is edited or deleted. `word_id` is not a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionWord {
    pub word_id: i64,
    pub content: String,
    pub pinyin: String,
    #[serde(default)]
    pub status: WordStatus,
}

impl SessionWord {
    /// Snapshot a library word with status `new`
    pub fn snapshot(word: &Word) -> Self {
        Self {
            word_id: word.id,
            content: word.content.clone(),
            pinyin: word.pinyin.clone(),
            status: WordStatus::New,
        }
    }
}

/// A dictation session record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DictationSession {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Path prefix the words were selected with
    pub filter_path: String,
    /// Words in presentation order
    pub words: Vec<SessionWord>,
    pub status: SessionStatus,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

impl DictationSession {
    /// Number of words in the session
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Find the entry for a library word
    pub fn word(&self, word_id: i64) -> Option<&SessionWord> {
        self.words.iter().find(|w| w.word_id == word_id)
    }

    /// Whether every word has been graded
    pub fn all_graded(&self) -> bool {
        self.words.iter().all(|w| w.status.is_terminal())
    }

    /// Count of words per status, in `WordStatus::ALL` order
    pub fn progress(&self) -> Vec<(WordStatus, usize)> {
        WordStatus::ALL
            .into_iter()
            .map(|status| {
                let count = self.words.iter().filter(|w| w.status == status).count();
                (status, count)
            })
            .collect()
    }

    /// Words matching any of `statuses`, reset to `new`
    ///
    /// Used to build a re-test session from a finished one (for example
    /// only the `wrong_pinyin` items).
    pub fn words_with_status(&self, statuses: &[WordStatus]) -> Vec<SessionWord> {
        self.words
            .iter()
            .filter(|w| statuses.contains(&w.status))
            .map(|w| SessionWord {
                status: WordStatus::New,
                ..w.clone()
            })
            .collect()
    }
}

/// A session that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub name: String,
    pub note: Option<String>,
    pub filter_path: String,
    pub words: Vec<SessionWord>,
}

impl NewSession {
    pub fn new(
        name: impl Into<String>,
        filter_path: impl Into<String>,
        words: Vec<SessionWord>,
    ) -> Self {
        Self {
            name: name.into(),
            note: None,
            filter_path: filter_path.into(),
            words,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check required fields and return the normalized form
    pub fn validated(&self) -> Result<NewSession, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        if self.words.is_empty() {
            return Err(ValidationError::EmptySession);
        }

        let note = self
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(NewSession {
            name: name.to_string(),
            note,
            filter_path: normalize_prefix(&self.filter_path)?,
            words: self.words.clone(),
        })
    }
}

/// Ordering for session listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// Filter and ordering for `list_sessions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionQuery {
    pub status: Option<SessionStatus>,
    pub order: SortOrder,
}

impl SessionQuery {
    pub fn with_status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn oldest_first(mut self) -> Self {
        self.order = SortOrder::OldestFirst;
        self
    }
}

/// Outcome of a bulk import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Ids of the inserted words, in input order
    pub inserted: Vec<i64>,
    /// Candidates skipped because (`path`, `content`) already existed
    pub skipped: usize,
}
