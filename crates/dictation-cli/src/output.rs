//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use dictation_core::models::to_datetime;
use dictation_core::{DictationSession, ImportReport, Word};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single word
    pub fn print_word(&self, word: &Word) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", word.id);
                println!("Content: {}", word.content);
                if !word.pinyin.is_empty() {
                    println!("Pinyin:  {}", word.pinyin);
                }
                println!("Path:    {}", word.path);
                println!("Created: {}", format_timestamp(word.created_at));
            }
            OutputFormat::Json => print_json(word),
            OutputFormat::Quiet => println!("{}", word.id),
        }
    }

    /// Print a list of words
    pub fn print_words(&self, words: &[Word]) {
        match self.format {
            OutputFormat::Human => {
                if words.is_empty() {
                    println!("No words found.");
                    return;
                }
                for word in words {
                    println!(
                        "{:>5} | {} | {} | {}",
                        word.id,
                        truncate(&word.content, 12),
                        truncate(&word.pinyin, 20),
                        word.path
                    );
                }
                println!("\n{} word(s)", words.len());
            }
            OutputFormat::Json => print_json(&words),
            OutputFormat::Quiet => {
                for word in words {
                    println!("{}", word.id);
                }
            }
        }
    }

    /// Print category paths
    pub fn print_paths(&self, paths: &[String]) {
        match self.format {
            OutputFormat::Human => {
                if paths.is_empty() {
                    println!("No paths found.");
                    return;
                }
                for path in paths {
                    println!("{}", path);
                }
            }
            OutputFormat::Json => print_json(&paths),
            OutputFormat::Quiet => {
                for path in paths {
                    println!("{}", path);
                }
            }
        }
    }

    /// Print a session with its words
    pub fn print_session(&self, session: &DictationSession) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:      {}", session.id);
                println!("Name:    {}", session.name);
                if let Some(ref note) = session.note {
                    println!("Note:    {}", note);
                }
                println!("Filter:  {}", display_path(&session.filter_path));
                println!("Status:  {}", session.status);
                println!("Created: {}", format_timestamp(session.created_at));
                if let Some(completed_at) = session.completed_at {
                    println!("Done:    {}", format_timestamp(completed_at));
                }

                println!();
                println!("── Words ({}) ──", session.word_count());
                for word in &session.words {
                    println!(
                        "{:>5} | {} | {} | {}",
                        word.word_id,
                        truncate(&word.content, 12),
                        truncate(&word.pinyin, 20),
                        word.status
                    );
                }

                let progress: Vec<String> = session
                    .progress()
                    .into_iter()
                    .filter(|(_, count)| *count > 0)
                    .map(|(status, count)| format!("{} {}", count, status))
                    .collect();
                println!();
                println!("{}", progress.join(", "));
            }
            OutputFormat::Json => print_json(session),
            OutputFormat::Quiet => println!("{}", session.id),
        }
    }

    /// Print a list of sessions
    pub fn print_sessions(&self, sessions: &[DictationSession]) {
        match self.format {
            OutputFormat::Human => {
                if sessions.is_empty() {
                    println!("No sessions found.");
                    return;
                }
                for session in sessions {
                    println!(
                        "{:>5} | {} | {:<11} | {:>3} word(s) | {}",
                        session.id,
                        format_timestamp(session.created_at),
                        session.status.as_str(),
                        session.word_count(),
                        truncate(&session.name, 30)
                    );
                }
                println!("\n{} session(s)", sessions.len());
            }
            OutputFormat::Json => print_json(&sessions),
            OutputFormat::Quiet => {
                for session in sessions {
                    println!("{}", session.id);
                }
            }
        }
    }

    /// Print the result of a bulk import
    pub fn print_import_report(&self, report: &ImportReport) {
        match self.format {
            OutputFormat::Human => {
                println!(
                    "✓ Imported {} word(s), skipped {} duplicate(s)",
                    report.inserted.len(),
                    report.skipped
                );
            }
            OutputFormat::Json => print_json(report),
            OutputFormat::Quiet => {
                for id in &report.inserted {
                    println!("{}", id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a newly created id
    pub fn created(&self, kind: &str, id: i64) {
        match self.format {
            OutputFormat::Human => println!("✓ Created {} {}", kind, id),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"status": "success", "id": id}));
            }
            OutputFormat::Quiet => println!("{}", id),
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode JSON output: {}", e),
    }
}

/// Format epoch milliseconds as local-agnostic UTC time
fn format_timestamp(millis: i64) -> String {
    to_datetime(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(all words)"
    } else {
        path
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
