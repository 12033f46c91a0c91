//! Loader settings and their layered construction.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::env::EnvSource;
use super::file::FileSource;
use super::{ConfigError, ConfigResult};
use crate::plugins::{PluginSource, PluginsConfig, null_as_empty};
use crate::policy::{AllowOptions, ExtensionPolicy, FileKind, LoaderPolicy, PathAllowlist};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderSettings {
    /// File kind label (`code`, `data`) to the suffixes loaded as that kind.
    pub extensions: BTreeMap<String, Vec<String>>,
    pub blocked_names: Vec<String>,
    pub ignore_case: bool,
    pub skip_hidden: bool,
    #[serde(deserialize_with = "null_as_empty")]
    pub plugin_sources: Vec<PluginSource>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        let builtin = ExtensionPolicy::builtin();
        let options = AllowOptions::default();

        Self {
            extensions: [FileKind::Code, FileKind::Data]
                .into_iter()
                .map(|kind| (kind.to_string(), builtin.suffixes(kind).to_vec()))
                .collect(),
            blocked_names: PathAllowlist::builtin().blocked().to_vec(),
            ignore_case: options.ignore_case,
            skip_hidden: options.skip_hidden,
            plugin_sources: Vec::new(),
        }
    }
}

impl LoaderSettings {
    pub fn builder() -> LoaderSettingsBuilder {
        LoaderSettingsBuilder::default()
    }

    /// Overlays every field the layer sets.
    pub fn apply(&mut self, layer: SettingsLayer) {
        if let Some(extensions) = layer.extensions {
            self.extensions = extensions;
        }
        if let Some(blocked_names) = layer.blocked_names {
            self.blocked_names = blocked_names;
        }
        if let Some(ignore_case) = layer.ignore_case {
            self.ignore_case = ignore_case;
        }
        if let Some(skip_hidden) = layer.skip_hidden {
            self.skip_hidden = skip_hidden;
        }
        if let Some(plugin_sources) = layer.plugin_sources {
            self.plugin_sources = plugin_sources;
        }
    }

    /// Validates the settings into an immutable policy.
    pub fn policy(&self) -> ConfigResult<LoaderPolicy> {
        let rules = self
            .extensions
            .iter()
            .map(|(label, suffixes)| {
                FileKind::from_label(label)
                    .map(|kind| (kind, suffixes.clone()))
                    .ok_or_else(|| ConfigError::InvalidValue {
                        key: format!("extensions.{label}"),
                        message: "expected \"code\" or \"data\"".into(),
                    })
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let extensions = ExtensionPolicy::new(rules).map_err(|e| ConfigError::InvalidValue {
            key: "extensions".into(),
            message: e.to_string(),
        })?;

        let allowlist = PathAllowlist::new(self.blocked_names.iter().cloned()).with_options(
            AllowOptions {
                ignore_case: self.ignore_case,
                skip_hidden: self.skip_hidden,
            },
        );

        Ok(LoaderPolicy::new(extensions, allowlist))
    }

    pub fn plugins(&self) -> PluginsConfig {
        PluginsConfig::new(self.plugin_sources.iter().cloned())
    }
}

/// One partial source of settings; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsLayer {
    pub extensions: Option<BTreeMap<String, Vec<String>>>,
    pub blocked_names: Option<Vec<String>>,
    pub ignore_case: Option<bool>,
    pub skip_hidden: Option<bool>,
    pub plugin_sources: Option<Vec<PluginSource>>,
}

#[derive(Debug, Default)]
pub struct LoaderSettingsBuilder {
    files: Vec<FileSource>,
    env: Option<EnvSource>,
}

impl LoaderSettingsBuilder {
    /// Adds a JSON settings file; later files win.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(FileSource::new(path));
        self
    }

    /// Reads `VELOS_LOADER_*` overrides.
    pub fn env(mut self) -> Self {
        self.env = Some(EnvSource::new());
        self
    }

    pub fn env_with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env = Some(EnvSource::prefixed(prefix));
        self
    }

    pub async fn build(self) -> ConfigResult<LoaderSettings> {
        let mut settings = LoaderSettings::default();

        for file in &self.files {
            settings.apply(file.layer().await?);
            tracing::debug!(path = %file.path().display(), "Applied settings file");
        }

        if let Some(env) = &self.env {
            settings.apply(env.layer()?);
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::BLOCKED_NAMES;

    #[test]
    fn test_defaults_match_builtin_policy() {
        let settings = LoaderSettings::default();
        assert_eq!(settings.extensions["code"], vec![".js", ".mjs", ".cjs"]);
        assert_eq!(settings.extensions["data"], vec![".json"]);
        assert_eq!(settings.blocked_names, BLOCKED_NAMES);
        assert_eq!(settings.policy().unwrap(), LoaderPolicy::default());
    }

    #[test]
    fn test_policy_rejects_unknown_kind() {
        let mut settings = LoaderSettings::default();
        settings
            .extensions
            .insert("script".into(), vec![".ts".into()]);

        let err = settings.policy().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "extensions.script"));
    }

    #[test]
    fn test_policy_rejects_duplicate_suffix() {
        let mut settings = LoaderSettings::default();
        settings
            .extensions
            .insert("data".into(), vec![".json".into(), ".js".into()]);

        let err = settings.policy().unwrap_err();
        assert!(err.to_string().contains(".js"));
    }

    #[test]
    fn test_policy_carries_allow_options() {
        let settings = LoaderSettings {
            blocked_names: vec!["dist".into()],
            skip_hidden: false,
            ..LoaderSettings::default()
        };
        let policy = settings.policy().unwrap();

        assert!(!policy.allowlist.is_allowed("DIST"));
        assert!(policy.allowlist.is_allowed(".hidden"));
        assert!(policy.allowlist.is_allowed("node_modules"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: LoaderSettings =
            serde_json::from_str(r#"{"skipHidden": false, "pluginSources": null}"#).unwrap();
        assert!(!settings.skip_hidden);
        assert!(settings.plugin_sources.is_empty());
        assert!(settings.ignore_case);
        assert_eq!(settings.blocked_names, BLOCKED_NAMES);
    }

    #[tokio::test]
    async fn test_layered_build() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("base.json");
        let local = dir.path().join("local.json");
        tokio::fs::write(
            &base,
            r#"{"blockedNames": ["vendor"], "ignoreCase": false, "pluginSources": [{"type": "folder", "path": "plugins"}]}"#,
        )
        .await
        .unwrap();
        tokio::fs::write(&local, r#"{"ignoreCase": true}"#).await.unwrap();

        // SAFETY: Test-only environment setup
        unsafe { std::env::set_var("TEST_LAYERED_BUILD_BLOCKED_NAMES", "dist") };
        let settings = LoaderSettings::builder()
            .file(&base)
            .file(&local)
            .file(dir.path().join("missing.json"))
            .env_with_prefix("TEST_LAYERED_BUILD_")
            .build()
            .await
            .unwrap();
        unsafe { std::env::remove_var("TEST_LAYERED_BUILD_BLOCKED_NAMES") };

        assert_eq!(settings.blocked_names, vec!["dist"]);
        assert!(settings.ignore_case);
        assert_eq!(settings.plugins().plugin_sources.len(), 1);
        assert_eq!(settings.extensions, LoaderSettings::default().extensions);
    }
}
