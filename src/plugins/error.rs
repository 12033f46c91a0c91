use std::path::PathBuf;

use super::SourceKind;
use crate::common::BoxError;

/// Failure of one plugin source or one file inside a folder source.
///
/// Never escapes [`PluginDispatcher::dispatch`](super::PluginDispatcher::dispatch);
/// it is logged and counted in the report.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("'{kind}' source requires a path")]
    MissingPath { kind: SourceKind },

    #[error("No code suffix configured for folder sources")]
    NoCodeSuffix,

    #[error("Failed to read plugin folder {path}: {source}")]
    ReadFolder {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Load(#[from] crate::Error),

    #[error("Registration failed: {0}")]
    Sink(BoxError),

    #[error("Inline handler failed: {0}")]
    Handler(BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::MissingPath {
            kind: SourceKind::Folder,
        };
        assert_eq!(err.to_string(), "'folder' source requires a path");

        let err = PluginError::ReadFolder {
            path: PathBuf::from("/srv/plugins"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/srv/plugins"));
        assert!(msg.contains("gone"));

        let err = PluginError::Sink("duplicate route".into());
        assert!(err.to_string().contains("duplicate route"));
    }

    #[test]
    fn test_load_error_is_transparent() {
        let err: PluginError = crate::Error::NotFound {
            path: PathBuf::from("/srv/a.js"),
        }
        .into();
        assert_eq!(err.to_string(), "File not found: /srv/a.js");
    }
}
