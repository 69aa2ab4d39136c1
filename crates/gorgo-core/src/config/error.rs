use std::error::Error as StdError;

use thiserror::Error;

use crate::config::ConfigFormat;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to deserialize {} configuration: {source}", .format.name())]
    Deserialization {
        format: ConfigFormat,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("Invalid value for configuration key '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
