//! TOML-based configuration for Tally.
//!
//! Supports a config file (tally.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! default_measure = "amount"
//!
//! [engine.currency]
//! base = "SGD"
//! dimension = "currency"
//! rates = { INR = 0.016, USD = 1.35 }
//!
//! [discovery]
//! sample_size = 1000
//! recover_columns = ["Customer"]
//! name = "Household Finance"
//!
//! [refine]
//! api_key = "${GEMINI_API_KEY}"
//! model = "gemini-2.5-flash-lite"
//! timeout_secs = 30
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::engine::{CurrencyConfig, ExecuteOptions};
use crate::schema::discover::DEFAULT_SAMPLE_SIZE;
use crate::schema::refine::{GeminiConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::schema::DiscoverOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "TALLY_CONFIG";

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
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Query execution defaults.
    pub engine: EngineSettings,

    /// Schema discovery.
    pub discovery: DiscoverySettings,

    /// Schema refinement.
    pub refine: RefineSettings,
}

/// Query execution defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Measure aggregated when a query names none.
    pub default_measure: Option<String>,

    /// Currency normalization; omitted disables it.
    pub currency: Option<CurrencySettings>,
}

/// Currency normalization settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CurrencySettings {
    /// Base currency code.
    pub base: String,

    /// Dimension holding currency codes.
    pub dimension: String,

    /// `code → base` conversion rates.
    pub rates: HashMap<String, f64>,
}

/// Schema discovery settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Rows inspected; 0 inspects up to the hard cap.
    pub sample_size: usize,

    /// Skipped columns to force back in as dimensions.
    pub recover_columns: Vec<String>,

    /// Dataset name override.
    pub name: Option<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            recover_columns: Vec::new(),
            name: None,
        }
    }
}

/// Schema refinement settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RefineSettings {
    /// API key (supports ${ENV_VAR} expansion).
    pub api_key: Option<String>,

    /// Model name.
    pub model: String,

    /// Base URL of the models endpoint.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RefineSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl RefineSettings {
    /// Get the API key with environment variables expanded.
    pub fn resolved_api_key(&self) -> Result<Option<String>, SettingsError> {
        self.api_key.as_deref().map(expand_env_vars).transpose()
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
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TALLY_CONFIG`
    /// 2. `./tally.toml`
    /// 3. `~/.config/tally/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tally.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tally").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        tracing::debug!("no config file found, using defaults");
        Ok(Settings::default())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(currency) = &self.engine.currency {
            if currency.dimension.is_empty() {
                return Err(SettingsError::InvalidConfig(
                    "engine.currency.dimension must not be empty".to_string(),
                ));
            }
            if let Some((code, rate)) = currency.rates.iter().find(|(_, r)| **r <= 0.0) {
                return Err(SettingsError::InvalidConfig(format!(
                    "engine.currency.rates.{code} must be positive, got {rate}"
                )));
            }
        }
        Ok(())
    }

    /// Execution options from the `[engine]` section.
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            default_measure: self.engine.default_measure.clone(),
            currency: self.engine.currency.as_ref().map(|c| {
                CurrencyConfig::new(&c.base, &c.dimension, c.rates.clone())
            }),
        }
    }

    /// Discovery options from the `[discovery]` section.
    pub fn discover_options(&self) -> DiscoverOptions {
        let mut options = DiscoverOptions::default()
            .with_sample_size(self.discovery.sample_size)
            .recover(self.discovery.recover_columns.iter().cloned());
        if let Some(name) = &self.discovery.name {
            options = options.with_name(name);
        }
        options
    }

    /// Gemini connection settings from the `[refine]` section.
    pub fn gemini_config(&self) -> Result<GeminiConfig, SettingsError> {
        let api_key = self
            .refine
            .resolved_api_key()?
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SettingsError::InvalidConfig("refine.api_key is not set".to_string()))?;

        Ok(GeminiConfig::new(api_key)
            .with_model(&self.refine.model)
            .with_endpoint(&self.refine.endpoint)
            .with_timeout(Duration::from_secs(self.refine.timeout_secs)))
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
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
