//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.civicpulse.toml` files.

use crate::chat::knowledge::{default_entries, default_fallback};
use crate::chat::KnowledgeEntry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".civicpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Sentiment data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Dashboard settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Chat assistant settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where sentiment records come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the sentiment backend.
    #[serde(default)]
    pub api_url: Option<String>,

    /// JSON fixture file used instead of a backend.
    #[serde(default)]
    pub fixture: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            fixture: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Dashboard rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Priority threshold used when none is given on the command line.
    #[serde(default)]
    pub default_threshold: u8,

    /// Maximum rows in the results table.
    #[serde(default = "default_max_table_rows")]
    pub max_table_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0,
            max_table_rows: default_max_table_rows(),
        }
    }
}

fn default_max_table_rows() -> usize {
    50
}

/// Chat assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_chat_url")]
    pub api_url: String,

    /// Model name.
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens in the answer.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// System prompt sent with every question.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Answer used when no knowledge entry matches.
    #[serde(default = "default_fallback")]
    pub fallback_message: String,

    /// Offline answers keyed by keywords.
    #[serde(default = "default_entries")]
    pub knowledge: Vec<KnowledgeEntry>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: default_chat_url(),
            model: default_chat_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout(),
            system_prompt: default_system_prompt(),
            fallback_message: default_fallback(),
            knowledge: default_entries(),
        }
    }
}

fn default_chat_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "llama3-70b-8192".to_string()
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    300
}

fn default_system_prompt() -> String {
    "You are CivicPulse, a helpful assistant for civic engagement topics. Provide concise, \
     informative answers about community issues, local governance, and public services."
        .to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually given.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(threshold) = args.threshold {
            self.dashboard.default_threshold = threshold;
        }

        // A source on the command line replaces both configured sources
        if let Some(ref url) = args.api_url {
            self.source.api_url = Some(url.clone());
            self.source.fixture = None;
        }
        if let Some(ref fixture) = args.fixture {
            self.source.fixture = Some(fixture.clone());
            self.source.api_url = None;
        }

        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
            self.chat.timeout_seconds = timeout;
        }

        if let Some(ref model) = args.model {
            self.chat.model = model.clone();
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check values that serde alone cannot constrain.
    pub fn validate(&self) -> Result<()> {
        if self.dashboard.default_threshold > 100 {
            anyhow::bail!(
                "dashboard.default_threshold must be between 0 and 100, got {}",
                self.dashboard.default_threshold
            );
        }
        if self.dashboard.max_table_rows == 0 {
            anyhow::bail!("dashboard.max_table_rows must be at least 1");
        }
        if self.source.timeout_seconds == 0 {
            anyhow::bail!("source.timeout_seconds must be at least 1");
        }
        if self.chat.timeout_seconds == 0 {
            anyhow::bail!("chat.timeout_seconds must be at least 1");
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::tests::make_args;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chat.model, "llama3-70b-8192");
        assert_eq!(config.chat.api_key_env, "GROQ_API_KEY");
        assert_eq!(config.chat.max_tokens, 300);
        assert_eq!(config.dashboard.default_threshold, 0);
        assert!(config.source.api_url.is_none());
        assert_eq!(config.chat.knowledge.len(), 3);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[source]
api_url = "http://localhost:8080"
timeout_seconds = 10

[dashboard]
default_threshold = 60

[chat]
model = "llama3-8b-8192"
api_key_env = "CIVIC_CHAT_KEY"

[[chat.knowledge]]
keywords = ["water", "pipe"]
answer = "Report leaks to the water board."
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.source.api_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.source.timeout_seconds, 10);
        assert_eq!(config.dashboard.default_threshold, 60);
        assert_eq!(config.dashboard.max_table_rows, 50);
        assert_eq!(config.chat.model, "llama3-8b-8192");
        assert_eq!(config.chat.api_key_env, "CIVIC_CHAT_KEY");
        assert_eq!(config.chat.knowledge.len(), 1);
        assert_eq!(config.chat.knowledge[0].keywords, vec!["water", "pipe"]);
        // Unset fields keep their defaults
        assert_eq!(config.chat.max_tokens, 300);
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let result: Result<Config, _> = toml::from_str("[dashboard]\ndefault_threshold = 300\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.dashboard.default_threshold = 101;
        assert!(config.validate().is_err());

        config.dashboard.default_threshold = 100;
        config.dashboard.max_table_rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config: Config = toml::from_str("[source]\ntimeout_seconds = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source.timeout_seconds"));

        let config: Config = toml::from_str("[chat]\ntimeout_seconds = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("chat.timeout_seconds"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dashboard]\nmax_table_rows = 5").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.dashboard.max_table_rows, 5);

        assert!(Config::load(Path::new("/no/such/.civicpulse.toml")).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[dashboard]"));
        assert!(toml_str.contains("[chat]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.chat.knowledge, Config::default().chat.knowledge);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.source.api_url = Some("http://configured".to_string());

        let mut args = make_args();
        args.threshold = Some(70);
        args.fixture = Some(PathBuf::from("fixtures/sample_records.json"));
        args.timeout = Some(12);
        args.model = Some("mixtral-8x7b-32768".to_string());

        config.merge_with_args(&args);
        assert_eq!(config.dashboard.default_threshold, 70);
        assert!(config.source.api_url.is_none());
        assert_eq!(
            config.source.fixture,
            Some(PathBuf::from("fixtures/sample_records.json"))
        );
        assert_eq!(config.source.timeout_seconds, 12);
        assert_eq!(config.chat.timeout_seconds, 12);
        assert_eq!(config.chat.model, "mixtral-8x7b-32768");
    }

    #[test]
    fn test_merge_keeps_config_when_args_absent() {
        let mut config = Config::default();
        config.dashboard.default_threshold = 40;
        config.source.api_url = Some("http://configured".to_string());

        config.merge_with_args(&make_args());
        assert_eq!(config.dashboard.default_threshold, 40);
        assert_eq!(config.source.api_url.as_deref(), Some("http://configured"));
    }
}
