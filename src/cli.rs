use std::path::PathBuf;
use clap::Parser;

use crate::config::Settings;
use crate::export::OutputFormat;

#[derive(Parser)]
#[command(name = "interesting")]
#[command(version)]
#[command(about = "Find pending Gerrit changes that touch the files you care about")]
#[command(long_about = "Runs the query of each selected interest against the Gerrit server behind a git remote, then reports the open changes whose current patch set adds, modifies or deletes files matching the interest's specs.")]
pub struct Cli {
    /// Git remote pointing at the Gerrit server
    #[arg(short, long, help = "Git remote name (defaults to gerrit)")]
    pub remote: Option<String>,

    /// Explicit remote URL, bypassing git config
    #[arg(short, long, help = "ssh:// URL of the Gerrit project")]
    pub url: Option<String>,

    /// Interests definition file
    #[arg(short, long, value_name = "FILE", help = "Interests file (defaults to interests.yaml)")]
    pub interests: Option<PathBuf>,

    /// Only consider changes updated after this point
    #[arg(short, long, help = "Date, or relative age like 7d, 2w, 1m")]
    pub after: Option<String>,

    /// Enable debug logging
    #[arg(long, help = "Enable debug output")]
    pub debug: bool,

    /// Output format
    #[arg(long, default_value = "text", help = "Output format")]
    pub output: OutputFormat,

    /// Interests to evaluate
    #[arg(value_name = "INTEREST", help = "Interest names to evaluate (defaults to all)")]
    pub queries: Vec<String>,
}

impl Cli {
    pub fn get_remote(&self, settings: &Settings) -> String {
        self.remote.clone().unwrap_or_else(|| settings.remote.clone())
    }

    pub fn get_interests_path(&self, settings: &Settings) -> PathBuf {
        self.interests
            .clone()
            .unwrap_or_else(|| settings.interests_file.clone())
    }

    pub fn setup_logging(&self) {
        let level = if self.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }

    pub fn validate(&self, settings: &Settings) -> Result<(), String> {
        let path = self.get_interests_path(settings);

        if !path.is_file() {
            return Err(format!("Interests file does not exist: {}", path.display()));
        }

        if let Some(after) = &self.after {
            if after.trim().is_empty() {
                return Err("--after must not be empty".to_string());
            }
        }

        Ok(())
    }
}
