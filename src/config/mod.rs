//! Configuration loading and management

use crate::core::error::ConfigError;
use crate::core::locale::{Currency, ExchangeRates, Language};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Env var holding the path of the YAML configuration file
pub const CONFIG_PATH_ENV: &str = "NURSERY_CONFIG";

/// Env var overriding `server.bind`
pub const BIND_ENV: &str = "NURSERY_BIND";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "127.0.0.1:8080"
    pub bind: String,

    /// Seconds a session may stay unused before it is forgotten
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            session_idle_secs: 30 * 24 * 60 * 60,
        }
    }
}

impl ServerConfig {
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

/// Interface language settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocaleConfig {
    pub default_language: Language,

    /// Languages offered by `?lang=`
    pub languages: Vec<Language>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            default_language: Language::En,
            languages: vec![Language::En, Language::De, Language::Ar],
        }
    }
}

impl LocaleConfig {
    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }
}

/// Display currency settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    /// Currency shown before a user picks one
    pub default: Currency,

    /// Value of one EUR in each currency
    pub rates: HashMap<Currency, f64>,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default: Currency::Eur,
            rates: HashMap::from([
                (Currency::Eur, 1.0),
                (Currency::Usd, 1.08),
                (Currency::Aed, 3.95),
            ]),
        }
    }
}

impl CurrencyConfig {
    pub fn exchange_rates(&self) -> ExchangeRates {
        ExchangeRates::new(self.rates.clone())
    }
}

/// Account rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    pub min_password_length: usize,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub locale: LocaleConfig,
    pub currency: CurrencyConfig,
    pub accounts: AccountsConfig,

    /// YAML file with the facility catalog; the bundled demo catalog is
    /// used when unset
    pub seed_file: Option<String>,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError {
            file: None,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration, used for tests and when no file is given
    pub fn default_config() -> Self {
        Self::default()
    }

    /// Resolve configuration from the environment
    ///
    /// Reads the file named by `NURSERY_CONFIG` when set, then applies
    /// `NURSERY_BIND`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default_config(),
        };
        if let Ok(bind) = std::env::var(BIND_ENV) {
            config.server.bind = bind;
        }
        Ok(config)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.locale.is_enabled(self.locale.default_language) {
            return Err(ConfigError::InvalidValue {
                field: "locale.default_language".to_string(),
                value: self.locale.default_language.to_string(),
                message: "must be one of locale.languages".to_string(),
            });
        }
        if let Some((currency, rate)) = self.currency.rates.iter().find(|(_, r)| **r <= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: format!("currency.rates.{}", currency),
                value: rate.to_string(),
                message: "rates must be positive".to_string(),
            });
        }
        if self.server.session_idle_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.session_idle_secs".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.accounts.min_password_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "accounts.min_password_length".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
