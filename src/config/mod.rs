//! Layered loader configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults (the stock extension table and blocklist)
//! 2. JSON settings files, in the order they were added
//! 3. Environment variables prefixed with `VELOS_LOADER_`
//!
//! ```rust,no_run
//! use velos_loaders::{LoaderSettings, ModuleLoader};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = LoaderSettings::builder()
//!     .file("velos.settings.json")
//!     .env()
//!     .build()
//!     .await?;
//! let loader = ModuleLoader::builder().policy(settings.policy()?).build();
//! # let _ = loader;
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod file;
pub mod settings;

pub use env::{ENV_PREFIX, EnvSource};
pub use file::FileSource;
pub use settings::{LoaderSettings, LoaderSettingsBuilder, SettingsLayer};

use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The key with invalid value
        key: String,
        /// Error message
        message: String,
    },

    /// Malformed settings file
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable present but unreadable
    #[error("Environment error for {key}: {source}")]
    Env {
        key: String,
        source: std::env::VarError,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "extensions.script".to_string(),
            message: "unknown file kind".to_string(),
        };
        assert!(err.to_string().contains("extensions.script"));

        let err = ConfigError::Env {
            key: "VELOS_LOADER_IGNORE_CASE".to_string(),
            source: std::env::VarError::NotPresent,
        };
        assert!(err.to_string().contains("VELOS_LOADER_IGNORE_CASE"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: ConfigError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }
}
