//! Dictation CLI
//!
//! Command-line interface for the dictation word library and session
//! history.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dictation_core::{Config, SessionStatus, Settings, Store, WordStatus};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "dictation")]
#[command(about = "Dictation practice - word library and session history")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log storage operations to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the word library
    Word {
        #[command(subcommand)]
        command: WordCommands,
    },
    /// Import words from a JSON file
    Import {
        /// JSON array of {"content", "pinyin", "path", "createdAt"} objects
        file: PathBuf,
    },
    /// Manage dictation sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Show database location, schema version and counts
    Status,
    /// Show configuration
    Config,
}

#[derive(Subcommand)]
enum WordCommands {
    /// Add a word to the library
    #[command(alias = "create")]
    Add {
        /// Character or short phrase
        content: String,
        /// Pronunciation
        #[arg(short = 'y', long, default_value = "")]
        pinyin: String,
        /// Category path, e.g. "Grade1/Unit1/Lesson1"
        #[arg(short, long)]
        path: String,
    },
    /// List words, optionally below a path
    #[command(alias = "ls")]
    List {
        /// Path prefix
        #[arg(short, long, default_value = "")]
        path: String,
    },
    /// Find a word by path and content
    Find {
        /// Character or short phrase
        content: String,
        /// Category path
        #[arg(short, long)]
        path: String,
    },
    /// List category paths below a prefix
    Paths {
        /// Path prefix
        #[arg(default_value = "")]
        prefix: String,
    },
    /// Delete a word
    #[command(alias = "rm")]
    Delete {
        /// Word ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Create a session from the words below a path
    #[command(alias = "add")]
    Create {
        /// Session name
        #[arg(short, long)]
        name: String,
        /// Path prefix selecting the words
        #[arg(short, long, default_value = "")]
        path: String,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Take the words from an earlier session instead of the library
        #[arg(long)]
        from: Option<i64>,
        /// With --from, keep only words with these statuses
        #[arg(long, requires = "from")]
        only: Vec<WordStatus>,
        /// Keep the library order instead of shuffling
        #[arg(long)]
        no_shuffle: bool,
    },
    /// Record the status of a word in a session
    Mark {
        /// Session ID
        session_id: i64,
        /// Word ID
        word_id: i64,
        /// new, wrong_pinyin, wrong_writing, fuzzy or correct
        status: WordStatus,
    },
    /// Mark a session completed
    Complete {
        /// Session ID
        id: i64,
    },
    /// List sessions
    #[command(alias = "ls")]
    List {
        /// Filter by status (pending, in_progress, completed)
        #[arg(short, long)]
        status: Option<SessionStatus>,
        /// Oldest first
        #[arg(long)]
        oldest_first: bool,
    },
    /// Show a session with its words
    Show {
        /// Session ID
        id: i64,
    },
    /// Delete a session
    #[command(alias = "rm")]
    Delete {
        /// Session ID
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;

    // Commands that don't need the store
    if let Commands::Config = cli.command {
        return commands::config::show(&config, cli.config.as_ref(), &output);
    }

    let store = Store::open_with_config(config)
        .await
        .context("Failed to open dictation database")?;

    match cli.command {
        Commands::Word { command } => handle_word_command(command, &store, &output).await,
        Commands::Import { file } => commands::word::import(&store, file, &output).await,
        Commands::Session { command } => handle_session_command(command, &store, &output).await,
        Commands::Status => commands::status::show(&store, &output).await,
        Commands::Config => unreachable!(), // Handled above
    }
}

async fn handle_word_command(command: WordCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        WordCommands::Add {
            content,
            pinyin,
            path,
        } => commands::word::add(store, content, pinyin, path, output).await,
        WordCommands::List { path } => commands::word::list(store, path, output).await,
        WordCommands::Find { content, path } => {
            commands::word::find(store, path, content, output).await
        }
        WordCommands::Paths { prefix } => commands::word::paths(store, prefix, output).await,
        WordCommands::Delete { id } => commands::word::delete(store, id, output).await,
    }
}

async fn handle_session_command(
    command: SessionCommands,
    store: &Store,
    output: &Output,
) -> Result<()> {
    match command {
        SessionCommands::Create {
            name,
            path,
            note,
            from,
            only,
            no_shuffle,
        } => {
            let source = match from {
                Some(id) => commands::session::Source::Session { id, only },
                None => commands::session::Source::Library { path },
            };
            let mut settings = Settings::default();
            if no_shuffle {
                settings.set_auto_shuffle(false);
            }
            commands::session::create(store, name, note, source, &settings, output).await
        }
        SessionCommands::Mark {
            session_id,
            word_id,
            status,
        } => commands::session::mark(store, session_id, word_id, status, output).await,
        SessionCommands::Complete { id } => commands::session::complete(store, id, output).await,
        SessionCommands::List {
            status,
            oldest_first,
        } => commands::session::list(store, status, oldest_first, output).await,
        SessionCommands::Show { id } => commands::session::show(store, id, output).await,
        SessionCommands::Delete { id } => commands::session::delete(store, id, output).await,
    }
}

/// Install the stderr log subscriber
///
/// `RUST_LOG` wins when set; otherwise warnings only, or debug with
/// `--verbose`.
fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "dictation_core={},dictation_cli={}",
            log_level, log_level
        ))
    });

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
