//! Config command handler

use std::path::PathBuf;

use anyhow::Result;

use dictation_core::Config;

use crate::output::{Output, OutputFormat};

/// Show the effective configuration
pub fn show(config: &Config, config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "database_name": config.database_name,
                    "database_path": config.database_path(),
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.database_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:      {}", config.data_dir.display());
            println!("  database_name: {}", config.database_name);
            println!();
            println!("Database:    {}", config.database_path().display());
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}
