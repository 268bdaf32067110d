//! Status command handler

use anyhow::Result;

use dictation_core::Store;

use crate::output::{Output, OutputFormat};

/// Show status information
pub async fn show(store: &Store, output: &Output) -> Result<()> {
    let config = store.config();
    let version = store.schema_version().await?;
    let words = store.word_count().await?;

    let by_status = store.session_counts_by_status().await?;
    let sessions: i64 = by_status.iter().map(|(_, count)| count).sum();

    match output.format {
        OutputFormat::Json => {
            let counts: serde_json::Map<String, serde_json::Value> = by_status
                .iter()
                .map(|(status, count)| (status.to_string(), serde_json::json!(count)))
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "database": config.database_path(),
                    "schema_version": version,
                    "words": words,
                    "sessions": sessions,
                    "sessions_by_status": counts,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.database_path().display());
        }
        OutputFormat::Human => {
            println!("Dictation Status");
            println!("================");
            println!();
            println!("Storage:");
            println!("  Database: {}", config.database_path().display());
            println!("  Schema:   v{}", version);
            println!();
            println!("Contents:");
            println!("  Words:    {}", words);
            println!("  Sessions: {}", sessions);
            for (status, count) in &by_status {
                println!("    {:<12} {}", status.as_str(), count);
            }
        }
    }

    Ok(())
}
