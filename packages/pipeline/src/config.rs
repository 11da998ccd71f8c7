//! Environment-driven pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr as _;
use std::time::Duration;

use risk_map_district_models::AggregationMode;
use thiserror::Error;

/// Variable holding the model API credential.
pub const CREDENTIAL_VAR: &str = "OPENAPI_KEY";
/// Default chat-completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default chat-completion endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default data root.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `RISK_MAP_MODE` is neither `latest` nor `cumulative`.
    #[error("Invalid aggregation mode '{value}'. Use 'latest' or 'cumulative'.")]
    InvalidMode {
        /// Rejected value.
        value: String,
    },

    /// `AI_TIMEOUT_SECS` is not a positive integer.
    #[error("Invalid AI_TIMEOUT_SECS '{value}'. Use a positive number of seconds.")]
    InvalidTimeout {
        /// Rejected value.
        value: String,
    },
}

/// Settings of a [`crate::RiskPipeline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Root holding one subdirectory per data source.
    pub data_dir: PathBuf,
    /// Snapshot selection policy.
    pub mode: AggregationMode,
    /// Name of the variable read for the model credential on each run.
    pub credential_var: String,
    /// Chat-completion model id.
    pub model: String,
    /// Chat-completion endpoint root.
    pub base_url: String,
    /// Model request timeout.
    pub timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            mode: AggregationMode::default(),
            credential_var: CREDENTIAL_VAR.to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Unset
    /// and empty variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable holds an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mode = match var("RISK_MAP_MODE") {
            Some(value) => AggregationMode::from_str(value.trim())
                .map_err(|_| ConfigError::InvalidMode { value })?,
            None => defaults.mode,
        };

        let timeout = match var("AI_TIMEOUT_SECS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::InvalidTimeout { value }),
            },
            None => defaults.timeout,
        };

        Ok(Self {
            data_dir: var("RISK_MAP_DATA_DIR").map_or(defaults.data_dir, PathBuf::from),
            mode,
            credential_var: defaults.credential_var,
            model: var("AI_MODEL").unwrap_or(defaults.model),
            base_url: var("AI_BASE_URL").unwrap_or(defaults.base_url),
            timeout,
        })
    }
}
