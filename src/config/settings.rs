//! TOML-based configuration for askdata.
//!
//! Supports a config file (askdata.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [oracle]
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama-3.3-70b-versatile"
//! api_key = "${GROQ_API_KEY}"
//! timeout_secs = 60
//!
//! [dataset]
//! numeric_threshold = 1.0
//!
//! [compress]
//! max_rows = 10
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compress::DEFAULT_MAX_ROWS;
use crate::dataset::InferenceOptions;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Language model endpoint used for planning and explanations.
    pub oracle: OracleSettings,

    /// CSV loading and type inference.
    pub dataset: DatasetSettings,

    /// Result compression for the explainer.
    pub compress: CompressSettings,

    /// HTTP server.
    pub server: ServerSettings,
}

/// Chat-completions endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OracleSettings {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model name sent with every request.
    pub model: String,

    /// API key (supports ${ENV_VAR} expansion).
    pub api_key: String,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: "${GROQ_API_KEY}".to_string(),
            timeout_secs: 60,
        }
    }
}

impl OracleSettings {
    /// Get the API key with environment variables expanded.
    pub fn resolved_api_key(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.api_key)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Dataset loading settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DatasetSettings {
    /// Fraction of non-missing cells that must parse for a column to be numeric.
    pub numeric_threshold: f64,
}

impl Default for DatasetSettings {
    fn default() -> Self {
        Self {
            numeric_threshold: InferenceOptions::default().numeric_threshold,
        }
    }
}

impl DatasetSettings {
    pub fn inference_options(&self) -> InferenceOptions {
        InferenceOptions {
            numeric_threshold: self.numeric_threshold,
        }
    }
}

/// Result compression settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct CompressSettings {
    /// Rows passed to the explainer when no intent narrows the result.
    pub max_rows: usize,
}

impl Default for CompressSettings {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

impl ServerSettings {
    /// `host:port` for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ASKDATA_CONFIG`
    /// 2. `./askdata.toml`
    /// 3. `~/.config/askdata/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("ASKDATA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("askdata.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("askdata").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    fn check(&self) -> Result<(), SettingsError> {
        let threshold = self.dataset.numeric_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(SettingsError::InvalidConfig(format!(
                "dataset.numeric_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if self.compress.max_rows == 0 {
            return Err(SettingsError::InvalidConfig(
                "compress.max_rows must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch != '}') {
                name.push(ch);
            }
            chars.next(); // consume '}'
            name
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
