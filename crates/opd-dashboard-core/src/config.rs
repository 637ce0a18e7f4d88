//! Dashboard configuration and secrets.
//!
//! Loaded from a JSON file, then overlaid with environment variables so that
//! secrets can stay out of the file:
//!
//! | Variable | Overrides |
//! |---|---|
//! | `OPENAI_API_KEY` | `inference.api_key` |
//! | `GOOGLE_APPLICATION_CREDENTIALS` | `store.credentials_path` (sheets backend) |
//! | `SHEET_ID` | `store.sheet_id` (sheets backend) |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "OPD_DASHBOARD_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "opd-dashboard.json";

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_WORKSHEET: &str = "Sheet1";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
/// Environment variable naming a service-account key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Sampling temperature sent with every summary request.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing secret: {0}")]
    MissingSecret(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    pub store: StoreConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

/// Which record store backend to use.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
    Sheets(SheetsSettings),
    Sqlite { path: PathBuf },
}

/// Google Sheets store settings.
///
/// The service-account key is given inline (`credentials`) or as a key file
/// (`credentials_path`). [`AppConfig::load`] reads the file into
/// `credentials`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SheetsSettings {
    #[serde(default)]
    pub sheet_id: String,
    #[serde(default)]
    pub credentials: Option<ServiceAccountKey>,
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// The fields of a Google service-account key file that token minting needs.
/// Other fields of the file are ignored.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}

// Keeps the private key out of logs.
impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

/// Hosted text-generation settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct InferenceConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_inference_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: default_inference_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.to_string()
}

fn default_inference_base_url() -> String {
    DEFAULT_INFERENCE_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl AppConfig {
    /// Load from a file, apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&raw)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.resolve_credentials()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse without overrides or validation.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Overlay values from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.inference.api_key = key;
        }
        if let StoreConfig::Sheets(settings) = &mut self.store {
            if let Some(path) = get(CREDENTIALS_ENV) {
                settings.credentials = None;
                settings.credentials_path = Some(PathBuf::from(path));
            }
            if let Some(id) = get("SHEET_ID") {
                settings.sheet_id = id;
            }
        }
    }

    /// Read the service-account key file into `credentials` unless the key
    /// was given inline.
    pub fn resolve_credentials(&mut self) -> Result<(), ConfigError> {
        if let StoreConfig::Sheets(settings) = &mut self.store {
            if settings.credentials.is_none() {
                if let Some(path) = &settings.credentials_path {
                    settings.credentials = Some(ServiceAccountKey::from_file(path)?);
                }
            }
        }
        Ok(())
    }

    /// Both secrets must be present at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let StoreConfig::Sheets(settings) = &self.store {
            if settings.sheet_id.trim().is_empty() {
                return Err(ConfigError::MissingSecret("store.sheet_id (or SHEET_ID)"));
            }
            let Some(key) = &settings.credentials else {
                return Err(ConfigError::MissingSecret(
                    "store.credentials or store.credentials_path (or GOOGLE_APPLICATION_CREDENTIALS)",
                ));
            };
            if key.client_email.trim().is_empty() || key.private_key.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "service-account key needs client_email and private_key".to_string(),
                ));
            }
        }
        if self.inference.api_key.trim().is_empty() {
            return Err(ConfigError::MissingSecret(
                "inference.api_key (or OPENAI_API_KEY)",
            ));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(ConfigError::Invalid(format!(
                "inference.temperature must be between 0 and 2, got {}",
                self.inference.temperature
            )));
        }
        Ok(())
    }
}

/// Config file location: explicit path, then `OPD_DASHBOARD_CONFIG`, then
/// `opd-dashboard.json` in the working directory.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}
