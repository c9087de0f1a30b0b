//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// CivicPulse - hashtag sentiment dashboard
///
/// Fetch classified mentions of a hashtag, keep those at or above a
/// priority threshold, and summarize them by topic, sentiment and urgency.
/// Also answers civic questions through an LLM chat assistant.
///
/// Examples:
///   civicpulse --hashtag climate --fixture fixtures/sample_records.json
///   civicpulse --hashtag climate,budget --threshold 70 --api-url http://localhost:8080
///   civicpulse --hashtag "#budget" --view urgency --format json
///   civicpulse --ask "Who handles potholes on my street?"
///   civicpulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Hashtag(s) to track (comma-separated or repeated, leading # optional)
    #[arg(
        short = 't',
        long = "hashtag",
        value_name = "TAG",
        value_delimiter = ',',
        required_unless_present_any = ["init_config", "ask"]
    )]
    pub hashtags: Vec<String>,

    /// Minimum priority score (0-100) a mention needs to be shown
    #[arg(short = 'p', long, value_name = "SCORE", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold: Option<u8>,

    /// Which part of the dashboard to render
    #[arg(long, default_value = "all", value_name = "VIEW")]
    pub view: View,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the dashboard to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Sentiment backend base URL
    #[arg(long, value_name = "URL", env = "CIVICPULSE_API_URL")]
    pub api_url: Option<String>,

    /// Read records from a JSON fixture file instead of a backend
    ///
    /// Takes precedence over --api-url.
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .civicpulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Request timeout in seconds (backend and chat)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Ask the civic chat assistant a question and exit
    #[arg(long, value_name = "QUESTION", conflicts_with = "hashtags")]
    pub ask: Option<String>,

    /// Chat model to use for --ask
    #[arg(long, value_name = "MODEL", env = "CIVICPULSE_CHAT_MODEL")]
    pub model: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .civicpulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Dashboard section selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Every section
    #[default]
    All,
    /// Topic distribution
    Topic,
    /// Sentiment distribution
    Sentiment,
    /// Urgency distribution and reasons
    Urgency,
    /// Filtered results table
    Table,
}

impl View {
    pub fn shows(&self, section: View) -> bool {
        *self == View::All || *self == section
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref question) = self.ask {
            if question.trim().is_empty() {
                return Err("Question for --ask must not be empty".to_string());
            }
        } else if self.hashtags.iter().all(|t| t.trim().trim_start_matches('#').is_empty()) {
            return Err("At least one non-empty hashtag is required".to_string());
        }

        // Validate backend URL format
        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate fixture file if provided
        if let Some(ref fixture) = self.fixture {
            if !fixture.is_file() {
                return Err(format!("Fixture file does not exist: {}", fixture.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
