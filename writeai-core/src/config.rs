//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/writeai/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/writeai/` (~/.config/writeai/)
//! - Data: `$XDG_DATA_HOME/writeai/` (~/.local/share/writeai/)
//! - State/Logs: `$XDG_STATE_HOME/writeai/` (~/.local/state/writeai/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Text-generation provider (optional; text commands fail without it)
    #[serde(default)]
    pub openai: Option<OpenAiConfig>,

    /// Voice-synthesis provider (optional; tts commands fail without it)
    #[serde(default)]
    pub elevenlabs: Option<ElevenLabsConfig>,

    /// Quota defaults for new profiles
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenAI-compatible text-generation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OpenAiConfig {
    /// API key (can also come from OPENAI_API_KEY)
    pub api_key: Option<String>,

    /// Chat-completions model
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Default token ceiling per generation
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            endpoint: default_openai_endpoint(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl OpenAiConfig {
    /// Resolve the API key from config or environment.
    pub fn resolved_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                Error::Config(
                    "openai.api_key is required (or set OPENAI_API_KEY)".to_string(),
                )
            })
    }
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_provider_timeout() -> u64 {
    60
}

/// ElevenLabs voice-synthesis configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ElevenLabsConfig {
    /// API key (can also come from ELEVENLABS_API_KEY)
    pub api_key: Option<String>,

    /// Synthesis model
    #[serde(default = "default_elevenlabs_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_elevenlabs_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_elevenlabs_model(),
            endpoint: default_elevenlabs_endpoint(),
            timeout_secs: default_provider_timeout(),
        }
    }
}

impl ElevenLabsConfig {
    /// Resolve the API key from config or environment.
    pub fn resolved_api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("ELEVENLABS_API_KEY").ok())
            .ok_or_else(|| {
                Error::Config(
                    "elevenlabs.api_key is required (or set ELEVENLABS_API_KEY)".to_string(),
                )
            })
    }
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_elevenlabs_endpoint() -> String {
    "https://api.elevenlabs.io".to_string()
}

/// Quota defaults applied when a profile row is first created
#[derive(Debug, Deserialize, Clone)]
pub struct QuotaConfig {
    /// Monthly word ceiling for free-plan profiles
    #[serde(default = "default_free_monthly_words")]
    pub free_monthly_words: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            free_monthly_words: default_free_monthly_words(),
        }
    }
}

fn default_free_monthly_words() -> i64 {
    10_000
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/writeai/config.toml` (~/.config/writeai/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("writeai").join("config.toml")
    }

    /// Returns the data directory path (for SQLite database and audio files)
    ///
    /// `$XDG_DATA_HOME/writeai/` (~/.local/share/writeai/)
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join("writeai")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/writeai/` (~/.local/state/writeai/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("writeai")
    }

    /// Returns the database file path
    ///
    /// `$XDG_DATA_HOME/writeai/data.db` (~/.local/share/writeai/data.db)
    pub fn database_path() -> PathBuf {
        Self::data_dir().join("data.db")
    }

    /// Returns the directory where synthesized audio files are stored
    ///
    /// `$XDG_DATA_HOME/writeai/audio/`
    pub fn audio_dir() -> PathBuf {
        Self::data_dir().join("audio")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/writeai/writeai.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("writeai.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.openai.is_none());
        assert!(config.elevenlabs.is_none());
        assert_eq!(config.quota.free_monthly_words, 10_000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[openai]
api_key = "sk-test"
model = "gpt-4o"

[elevenlabs]
api_key = "el-test"

[quota]
free_monthly_words = 5000

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(openai.model, "gpt-4o");
        assert_eq!(openai.endpoint, "https://api.openai.com");
        assert_eq!(openai.max_tokens, 1000);

        let elevenlabs = config.elevenlabs.unwrap();
        assert_eq!(elevenlabs.model, "eleven_multilingual_v2");

        assert_eq!(config.quota.free_monthly_words, 5000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_paths_end_with_expected_names() {
        assert!(Config::config_path().ends_with("writeai/config.toml"));
        assert!(Config::database_path().ends_with("writeai/data.db"));
        assert!(Config::audio_dir().ends_with("writeai/audio"));
    }
}
