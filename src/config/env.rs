//! Environment variable overrides.
//!
//! Environment variables are read once per build and never written.

use super::settings::SettingsLayer;
use super::{ConfigError, ConfigResult};

pub const ENV_PREFIX: &str = "VELOS_LOADER_";

/// Reads `<PREFIX>BLOCKED_NAMES` (comma list), `<PREFIX>IGNORE_CASE` and
/// `<PREFIX>SKIP_HIDDEN` (booleans).
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::prefixed(ENV_PREFIX)
    }

    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Get the full environment variable name
    fn env_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key.to_uppercase().replace('.', "_"))
    }

    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        let env_key = self.env_key(key);
        match std::env::var(&env_key) {
            Ok(value) => Ok(Some(value)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(source) => Err(ConfigError::Env {
                key: env_key,
                source,
            }),
        }
    }

    fn get_bool(&self, key: &str) -> ConfigResult<Option<bool>> {
        self.get(key)?
            .map(|raw| parse_bool(&self.env_key(key), &raw))
            .transpose()
    }

    pub fn layer(&self) -> ConfigResult<SettingsLayer> {
        let blocked_names = self.get("blocked.names")?.map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect()
        });

        Ok(SettingsLayer {
            blocked_names,
            ignore_case: self.get_bool("ignore.case")?,
            skip_hidden: self.get_bool("skip.hidden")?,
            ..SettingsLayer::default()
        })
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(key: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{raw}'"),
        }),
    }
}
