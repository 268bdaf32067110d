//! Session command handlers

use anyhow::{bail, Context, Result};
use rand::seq::SliceRandom;
use tracing::debug;

use dictation_core::{
    NewSession, SessionQuery, SessionStatus, SessionWord, Settings, SortOrder, Store, WordStatus,
};

use crate::output::Output;

/// Where the words of a new session come from
pub enum Source {
    /// Library words at or below a path
    Library { path: String },
    /// Words of an earlier session, optionally filtered by status
    Session { id: i64, only: Vec<WordStatus> },
}

/// Create a session
///
/// With `auto_shuffle` on, the words are stored in a random dictation
/// order.
pub async fn create(
    store: &Store,
    name: String,
    note: Option<String>,
    source: Source,
    settings: &Settings,
    output: &Output,
) -> Result<()> {
    let (filter_path, mut words) = match source {
        Source::Library { path } => {
            let words: Vec<SessionWord> = store
                .query_words_by_path_prefix(path.clone())
                .await?
                .iter()
                .map(SessionWord::snapshot)
                .collect();
            if words.is_empty() {
                bail!("No words found under '{}'", path);
            }
            (path, words)
        }
        Source::Session { id, only } => {
            let session = store
                .get_session(id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Session not found: {}", id))?;
            let statuses = if only.is_empty() {
                WordStatus::ALL.to_vec()
            } else {
                only
            };
            let words = session.words_with_status(&statuses);
            if words.is_empty() {
                bail!("Session {} has no words with the requested status", id);
            }
            (session.filter_path, words)
        }
    };

    if settings.auto_shuffle() {
        words.shuffle(&mut rand::thread_rng());
    }

    debug!(words = words.len(), filter_path = %filter_path, "creating session");
    let mut session = NewSession::new(name, filter_path, words);
    session.note = note;

    let id = store
        .create_session(session)
        .await
        .context("Failed to create session")?;

    output.created("session", id);
    Ok(())
}

/// Record a word status
pub async fn mark(
    store: &Store,
    session_id: i64,
    word_id: i64,
    status: WordStatus,
    output: &Output,
) -> Result<()> {
    store
        .update_session_word_status(session_id, word_id, status)
        .await?;

    output.success(&format!(
        "Word {} in session {} marked {}",
        word_id, session_id, status
    ));
    Ok(())
}

/// Complete a session
pub async fn complete(store: &Store, id: i64, output: &Output) -> Result<()> {
    let session = store
        .get_session(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Session not found: {}", id))?;

    if session.status == SessionStatus::Completed {
        output.success(&format!("Session {} was already completed", id));
        return Ok(());
    }

    store.complete_session(id).await?;

    if session.all_graded() {
        output.success(&format!("Session {} completed", id));
    } else {
        let ungraded = session
            .words
            .iter()
            .filter(|w| !w.status.is_terminal())
            .count();
        output.success(&format!(
            "Session {} completed ({} word(s) left ungraded)",
            id, ungraded
        ));
    }
    Ok(())
}

/// List sessions
pub async fn list(
    store: &Store,
    status: Option<SessionStatus>,
    oldest_first: bool,
    output: &Output,
) -> Result<()> {
    let query = SessionQuery {
        status,
        order: if oldest_first {
            SortOrder::OldestFirst
        } else {
            SortOrder::NewestFirst
        },
    };

    let sessions = store.list_sessions(query).await?;
    output.print_sessions(&sessions);
    Ok(())
}

/// Show a session
pub async fn show(store: &Store, id: i64, output: &Output) -> Result<()> {
    let session = store
        .get_session(id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Session not found: {}", id))?;

    output.print_session(&session);
    Ok(())
}

/// Delete a session
pub async fn delete(store: &Store, id: i64, output: &Output) -> Result<()> {
    store.delete_session(id).await?;
    output.success(&format!("Deleted session {}", id));
    Ok(())
}
