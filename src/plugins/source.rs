//! Plugin source configuration.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::InlineHandler;

/// Kind of a plugin source, taken from its `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    Inline,
    File,
    Folder,
    Url,
    /// Any other `type`; dispatching it is a logged no-op.
    Other(String),
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline => "inline",
            Self::File => "file",
            Self::Folder => "folder",
            Self::Url => "url",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for SourceKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "inline" => Self::Inline,
            "file" => Self::File,
            "folder" => Self::Folder,
            "url" => Self::Url,
            _ => Self::Other(kind),
        }
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handler of an `inline` source.
///
/// Configuration files can only name a handler; the dispatcher resolves the
/// name against its handler table. Code building a config can attach the
/// handler directly.
#[derive(Clone)]
pub enum Handler {
    Named(String),
    Callable(Arc<dyn InlineHandler>),
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

impl Serialize for Handler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Named(name) => serializer.serialize_str(name),
            Self::Callable(_) => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for Handler {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::Named)
    }
}

/// One entry of `pluginSources`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSource {
    #[serde(rename = "type")]
    pub kind: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<Handler>,
}

impl PluginSource {
    fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            path: None,
            handler: None,
        }
    }

    pub fn inline(handler: impl InlineHandler + 'static) -> Self {
        Self {
            handler: Some(Handler::Callable(Arc::new(handler))),
            ..Self::new(SourceKind::Inline)
        }
    }

    pub fn named_inline(name: impl Into<String>) -> Self {
        Self {
            handler: Some(Handler::Named(name.into())),
            ..Self::new(SourceKind::Inline)
        }
    }

    pub fn file(path: impl Into<String>) -> Self {
        Self::new(SourceKind::File).with_path(path)
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self::new(SourceKind::Folder).with_path(path)
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::new(SourceKind::Url).with_path(url)
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Application configuration as seen by the dispatcher.
///
/// Only `pluginSources` is interpreted; other keys are kept in `extra` and
/// passed through to inline handlers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    #[serde(rename = "pluginSources", default, deserialize_with = "null_as_empty")]
    pub plugin_sources: Vec<PluginSource>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PluginsConfig {
    pub fn new(sources: impl IntoIterator<Item = PluginSource>) -> Self {
        Self {
            plugin_sources: sources.into_iter().collect(),
            extra: Map::new(),
        }
    }

    pub fn source(mut self, source: PluginSource) -> Self {
        self.plugin_sources.push(source);
        self
    }
}

/// Reads an absent or `null` list as empty.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_plugin_sources() {
        let config: PluginsConfig = serde_json::from_value(json!({
            "pluginSources": [
                {"type": "folder", "path": "./plugins"},
                {"type": "file", "path": "~/shared/logger.js"},
                {"type": "inline", "handler": "metrics"},
                {"type": "url", "path": "https://example.com/p.js"},
                {"type": "git"}
            ],
            "server": {"port": 3000}
        }))
        .unwrap();

        let kinds: Vec<_> = config.plugin_sources.iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                SourceKind::Folder,
                SourceKind::File,
                SourceKind::Inline,
                SourceKind::Url,
                SourceKind::Other("git".into()),
            ]
        );
        assert_eq!(config.plugin_sources[0].path.as_deref(), Some("./plugins"));
        assert!(matches!(
            config.plugin_sources[2].handler,
            Some(Handler::Named(ref name)) if name == "metrics"
        ));
        assert_eq!(config.extra["server"], json!({"port": 3000}));
    }

    #[test]
    fn test_missing_sources_default_to_empty() {
        let config: PluginsConfig = serde_json::from_str("{}").unwrap();
        assert!(config.plugin_sources.is_empty());

        let config: PluginsConfig =
            serde_json::from_str(r#"{"pluginSources": null, "debug": true}"#).unwrap();
        assert!(config.plugin_sources.is_empty());
        assert_eq!(config.extra["debug"], json!(true));
    }

    #[test]
    fn test_non_string_handler_rejected() {
        let result: Result<PluginSource, _> =
            serde_json::from_value(json!({"type": "inline", "handler": 42}));
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_round_trip_of_kind() {
        let source = PluginSource::folder("plugins");
        let value = serde_json::to_value(&source).unwrap();
        assert_eq!(value, json!({"type": "folder", "path": "plugins"}));
        assert_eq!(SourceKind::Other("git".into()).to_string(), "git");
    }
}
