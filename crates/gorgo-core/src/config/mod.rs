//! # Gorgo Core Configuration
//!
//! Per-plugin configuration maps and the small amount of manager and
//! application configuration the core understands.
//!
//! The core never reads files. Callers hand it already-read text
//! ([`AppConfig::from_toml_str`] and friends) or build the maps directly.
pub mod error;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::kernel::constants;

pub use error::ConfigError;

/// Supported configuration text formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON
    Json,
    /// YAML - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }
}

/// Loosely typed configuration of a single plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    values: HashMap<String, serde_json::Value>,
}

impl PluginConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Create a configuration from a HashMap
    pub fn from_hashmap(values: HashMap<String, serde_json::Value>) -> Self {
        Self { values }
    }

    /// Get a configuration value converted to `T`; `None` if absent or of another type
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values
            .get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Get a configuration value with default
    pub fn get_or<T: for<'de> Deserialize<'de>>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    /// Get the raw value
    pub fn get_raw(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    /// Set a configuration value
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let json_value = serde_json::to_value(value).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.values.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Builder-style insert of an already converted value
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Remove a configuration value
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.values.remove(key)
    }

    /// Check if key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Get all keys
    pub fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge with another config, overriding existing values
    pub fn merge(&mut self, other: &PluginConfig) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Return `defaults` overlaid with this configuration.
    ///
    /// Used by callers that want a plugin's `default_config` applied; the
    /// plugin manager does not do this on its own.
    pub fn with_defaults(&self, defaults: &PluginConfig) -> PluginConfig {
        let mut merged = defaults.clone();
        merged.merge(self);
        merged
    }
}

impl From<HashMap<String, serde_json::Value>> for PluginConfig {
    fn from(values: HashMap<String, serde_json::Value>) -> Self {
        Self::from_hashmap(values)
    }
}

/// Configuration of every plugin, keyed by plugin name
pub type PluginConfigs = HashMap<String, PluginConfig>;

/// How the plugin manager computes installation order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderingStrategy {
    /// Descending priority; among equal priorities a dependency is moved in
    /// front of its dependent. Chains and cross-priority dependencies are not
    /// resolved.
    #[default]
    PriorityPairwise,
    /// Dependencies always first (Kahn's algorithm), priority breaks ties.
    DependencyGraph,
}

/// Plugin manager settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub ordering: OrderingStrategy,
}

/// The `[app]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub version: String,
    pub debug: bool,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: constants::DEFAULT_APP_NAME.to_string(),
            version: constants::DEFAULT_APP_VERSION.to_string(),
            debug: false,
        }
    }
}

/// Application configuration as understood by the core.
/// Sections owned by external collaborators (e.g. `[server]`) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub manager: ManagerConfig,
    pub plugins: PluginConfigs,
}

impl AppConfig {
    /// Decode from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Deserialization {
            format: ConfigFormat::Json,
            source: Box::new(e),
        })
    }

    /// Decode from TOML text
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Deserialization {
            format: ConfigFormat::Toml,
            source: Box::new(e),
        })
    }

    /// Decode from YAML text
    #[cfg(feature = "yaml-config")]
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::Deserialization {
            format: ConfigFormat::Yaml,
            source: Box::new(e),
        })
    }

    /// Configuration for one plugin, empty if none was given
    pub fn plugin(&self, name: &str) -> PluginConfig {
        self.plugins.get(name).cloned().unwrap_or_default()
    }
}
