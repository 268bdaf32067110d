//! Word command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::debug;

use dictation_core::{NewWord, Store};

use crate::output::Output;

/// Add a word, refusing an existing (path, content) pair
pub async fn add(
    store: &Store,
    content: String,
    pinyin: String,
    path: String,
    output: &Output,
) -> Result<()> {
    if let Some(existing) = store
        .find_word_by_path_and_content(path.clone(), content.clone())
        .await?
    {
        bail!(
            "'{}' already exists under '{}' (word {})",
            existing.content,
            existing.path,
            existing.id
        );
    }

    let id = store
        .insert_word(NewWord::new(content, pinyin, path))
        .await
        .context("Failed to add word")?;

    output.created("word", id);
    Ok(())
}

/// List words, optionally below a path
pub async fn list(store: &Store, path: String, output: &Output) -> Result<()> {
    let words = store.query_words_by_path_prefix(path).await?;
    output.print_words(&words);
    Ok(())
}

/// Find a single word by its path and content
pub async fn find(store: &Store, path: String, content: String, output: &Output) -> Result<()> {
    let word = store
        .find_word_by_path_and_content(path.clone(), content.clone())
        .await?
        .ok_or_else(|| anyhow::anyhow!("No word '{}' under '{}'", content, path))?;

    output.print_word(&word);
    Ok(())
}

/// List the category paths below a prefix
pub async fn paths(store: &Store, prefix: String, output: &Output) -> Result<()> {
    let paths = store.list_paths(prefix).await?;
    output.print_paths(&paths);
    Ok(())
}

/// Delete a word
pub async fn delete(store: &Store, id: i64, output: &Output) -> Result<()> {
    store.delete_word(id).await?;
    output.success(&format!("Deleted word {}", id));
    Ok(())
}

/// Import words from a JSON file
pub async fn import(store: &Store, file: PathBuf, output: &Output) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read import file {:?}", file))?;
    let words =
        parse_import(&content).with_context(|| format!("Invalid import file {:?}", file))?;
    debug!(file = ?file, candidates = words.len(), "read import file");

    let report = store
        .import_words(words)
        .await
        .context("Failed to import words")?;

    output.print_import_report(&report);
    Ok(())
}

/// Parse a JSON array of candidate words
fn parse_import(content: &str) -> Result<Vec<NewWord>> {
    let words: Vec<NewWord> = serde_json::from_str(content)?;
    if words.is_empty() {
        bail!("No words to import");
    }
    Ok(words)
}
