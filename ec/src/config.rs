//! Emotional Compass configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::llm::LlmError;

const APP_DIR: &str = "emotional-compass";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider configuration
    pub llm: LlmConfig,

    /// Where the slot files live
    pub storage: StorageConfig,

    /// Breathing exercise timing
    pub grounding: GroundingConfig,

    /// Directory of `.pmt` prompt overrides
    #[serde(rename = "prompts-dir")]
    pub prompts_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .emotional-compass.yml
        let local_config = PathBuf::from(".emotional-compass.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/emotional-compass/config.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(APP_DIR).join("config.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the configured log level before logging is set up
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load(config_path).ok().and_then(|config| config.log_level)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "anthropic" supported)
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            max_tokens: 2048,
            timeout_ms: 60_000,
        }
    }
}

impl LlmConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, LlmError> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(LlmError::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding one JSON file per slot
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));
        Self { dir }
    }
}

/// Grounding exercise timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingConfig {
    /// Total length of the exercise
    #[serde(rename = "duration-secs")]
    pub duration_secs: u64,

    /// Length of each inhale or exhale
    #[serde(rename = "breath-secs")]
    pub breath_secs: u64,
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            duration_secs: 30,
            breath_secs: 5,
        }
    }
}

impl GroundingConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs.max(1))
    }

    pub fn breath(&self) -> Duration {
        Duration::from_secs(self.breath_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.api_key_env, "ANTHROPIC_API_KEY");
        assert_eq!(config.grounding.duration_secs, 30);
        assert_eq!(config.grounding.breath_secs, 5);
        assert!(config.prompts_dir.is_none());
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_load_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "llm:\n  model: claude-test\n  timeout-ms: 5000\ngrounding:\n  duration-secs: 10\nlog-level: debug"
        )
        .unwrap();

        let config = Config::load_from_file(file.path()).unwrap();
        assert_eq!(config.llm.model, "claude-test");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.grounding.duration_secs, 10);
        assert_eq!(config.grounding.breath_secs, 5);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_load_explicit_path_missing_fails() {
        let missing = PathBuf::from("/definitely/not/here/config.yml");
        assert!(Config::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_zero_durations_are_clamped() {
        let grounding = GroundingConfig {
            duration_secs: 0,
            breath_secs: 0,
        };
        assert_eq!(grounding.duration(), Duration::from_secs(1));
        assert_eq!(grounding.breath(), Duration::from_secs(1));
    }

    #[test]
    #[serial]
    fn test_api_key_from_env() {
        let config = LlmConfig {
            api_key_env: "EC_TEST_API_KEY".to_string(),
            ..Default::default()
        };

        unsafe { std::env::set_var("EC_TEST_API_KEY", "  sk-test  ") };
        assert_eq!(config.api_key().unwrap(), "sk-test");

        unsafe { std::env::remove_var("EC_TEST_API_KEY") };
        assert!(matches!(config.api_key(), Err(LlmError::MissingApiKey(_))));
    }

    #[test]
    #[serial]
    fn test_blank_api_key_is_missing() {
        let config = LlmConfig {
            api_key_env: "EC_TEST_BLANK_KEY".to_string(),
            ..Default::default()
        };

        unsafe { std::env::set_var("EC_TEST_BLANK_KEY", "   ") };
        assert!(config.api_key().is_err());
        unsafe { std::env::remove_var("EC_TEST_BLANK_KEY") };
    }
}
