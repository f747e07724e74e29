//! Process-wide store settings.
//!
//! Classes read the global configuration when they are built, so changes only
//! affect classes built afterwards.

use crate::core::{Result, StoreError};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::RwLock;
use tracing::debug;

pub const ENV_UNSET_VALUES_FALLBACK_TO_DEFAULT: &str = "TYPED_STORE_UNSET_VALUES_FALLBACK_TO_DEFAULT";
pub const ENV_READ_UNSET_RETURNS_DEFAULT: &str = "TYPED_STORE_READ_UNSET_RETURNS_DEFAULT";
pub const ENV_REGISTER_ATTRIBUTES: &str = "TYPED_STORE_REGISTER_ATTRIBUTES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Absent typed keys receive their default when a store is cast or loaded.
    pub unset_values_fallback_to_default: bool,

    /// Reading an absent typed key returns its default without writing it.
    pub read_unset_returns_default: bool,

    /// Typed keys show up as record attributes of their own.
    pub register_attributes: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            unset_values_fallback_to_default: true,
            read_unset_returns_default: false,
            register_attributes: false,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unset_values_fallback_to_default(mut self, enabled: bool) -> Self {
        self.unset_values_fallback_to_default = enabled;
        self
    }

    pub fn read_unset_returns_default(mut self, enabled: bool) -> Self {
        self.read_unset_returns_default = enabled;
        self
    }

    pub fn register_attributes(mut self, enabled: bool) -> Self {
        self.register_attributes = enabled;
        self
    }

    /// Missing fields keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| StoreError::Configuration(format!("invalid store config: {}", e)))
    }

    /// Defaults overridden by whichever environment variables are set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(enabled) = env_flag(ENV_UNSET_VALUES_FALLBACK_TO_DEFAULT)? {
            config.unset_values_fallback_to_default = enabled;
        }
        if let Some(enabled) = env_flag(ENV_READ_UNSET_RETURNS_DEFAULT)? {
            config.read_unset_returns_default = enabled;
        }
        if let Some(enabled) = env_flag(ENV_REGISTER_ATTRIBUTES)? {
            config.register_attributes = enabled;
        }
        Ok(config)
    }
}

fn env_flag(name: &str) -> Result<Option<bool>> {
    match env::var(name) {
        Ok(raw) => parse_flag(&raw)
            .map(Some)
            .ok_or_else(|| StoreError::Configuration(format!("{} must be a boolean, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

pub(crate) fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "on" => Some(true),
        "0" | "false" | "f" | "no" | "off" => Some(false),
        _ => None,
    }
}

lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<StoreConfig> = RwLock::new(StoreConfig::default());
}

/// Snapshot of the global configuration.
pub fn current() -> Result<StoreConfig> {
    Ok(GLOBAL_CONFIG.read()?.clone())
}

pub fn configure<F>(update: F) -> Result<()>
where
    F: FnOnce(&mut StoreConfig),
{
    let mut config = GLOBAL_CONFIG.write()?;
    update(&mut *config);
    debug!(
        unset_values_fallback_to_default = config.unset_values_fallback_to_default,
        read_unset_returns_default = config.read_unset_returns_default,
        register_attributes = config.register_attributes,
        "store config updated"
    );
    Ok(())
}

pub fn set_global(config: StoreConfig) -> Result<()> {
    configure(|current| *current = config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.unset_values_fallback_to_default);
        assert!(!config.read_unset_returns_default);
        assert!(!config.register_attributes);
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = StoreConfig::from_json(r#"{"read_unset_returns_default":true}"#).unwrap();
        assert!(config.unset_values_fallback_to_default);
        assert!(config.read_unset_returns_default);
        assert!(matches!(
            StoreConfig::from_json("[1]"),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
