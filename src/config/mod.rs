//! Configuration management for Rahalah
//!
//! Loads `config.toml`, applies `RAHALAH_SECTION__KEY` environment overrides and
//! optional profiles, and validates the result before anything is built from it.

use crate::error::{RahalahError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub interpreter: InterpreterConfig,
    pub catalog: CatalogConfig,
    pub hotel_search: HotelSearchConfig,
    pub locale: LocaleConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Location defaults and vocabulary source for the interpreter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpreterConfig {
    pub default_origin: String,
    pub default_destination: String,
    pub collision_fallback: String,
    pub collision_alternate: String,
    /// Replaces the built-in vocabulary when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_path: Option<PathBuf>,
}

/// Fixture catalog source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Replaces the built-in fixtures when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

/// Hotel search API request settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotelSearchConfig {
    pub base_url: String,
    pub engine: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub adults: u32,
    pub default_nights: u32,
    /// Check-in offset from today when the query has no date keyword
    pub check_in_offset_days: u32,
}

/// Display language
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleConfig {
    pub language: String,
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RahalahError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| RahalahError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| RahalahError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_profile(profile)?;
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| RahalahError::Config(format!("Unknown profile '{}'", profile)))?;

        if let Some(origin) = overrides.default_origin {
            self.interpreter.default_origin = origin;
        }
        if let Some(destination) = overrides.default_destination {
            self.interpreter.default_destination = destination;
        }
        if let Some(language) = overrides.language {
            self.locale.language = language;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: RAHALAH_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("RAHALAH_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "INTERPRETER__DEFAULT_ORIGIN" => {
                self.interpreter.default_origin = value.to_uppercase();
            }
            "INTERPRETER__DEFAULT_DESTINATION" => {
                self.interpreter.default_destination = value.to_uppercase();
            }
            "INTERPRETER__VOCABULARY_PATH" => {
                self.interpreter.vocabulary_path = Some(PathBuf::from(value));
            }
            "CATALOG__CATALOG_PATH" => {
                self.catalog.catalog_path = Some(PathBuf::from(value));
            }
            "HOTEL_SEARCH__ADULTS" => {
                self.hotel_search.adults = parse_number(path, value)?;
            }
            "HOTEL_SEARCH__DEFAULT_NIGHTS" => {
                self.hotel_search.default_nights = parse_number(path, value)?;
            }
            "LOCALE__LANGUAGE" => {
                self.locale.language = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RahalahError::Config("Cannot determine config directory".to_string()))?;

        Ok(config_dir.join("rahalah").join("config.toml"))
    }
}

fn parse_number(path: &str, value: &str) -> Result<u32> {
    value.parse().map_err(|_| RahalahError::InvalidConfigValue {
        path: path.to_string(),
        message: format!("Cannot parse '{}' as a number", value),
    })
}

/// Expand a leading `~/` to the home directory
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| RahalahError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| RahalahError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            interpreter: InterpreterConfig::default(),
            catalog: CatalogConfig::default(),
            hotel_search: HotelSearchConfig::default(),
            locale: LocaleConfig {
                language: "ar".to_string(),
            },
            profiles: HashMap::new(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            default_origin: "DMM".to_string(),
            default_destination: "JED".to_string(),
            collision_fallback: "JED".to_string(),
            collision_alternate: "RUH".to_string(),
            vocabulary_path: None,
        }
    }
}

impl Default for HotelSearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.searchapi.io/api/v1/search".to_string(),
            engine: "google_hotels".to_string(),
            api_key_env: "SEARCHAPI_API_KEY".to_string(),
            adults: 2,
            default_nights: 3,
            check_in_offset_days: 7,
        }
    }
}
