//! The structured-data read capability.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait DataReader: Send + Sync {
    /// Reads and parses the file at `path`. Malformed content must surface as
    /// [`Error::Parse`](crate::Error::Parse).
    async fn read(&self, path: &Path) -> crate::Result<Value>;
}

/// Reads UTF-8 JSON files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReader;

#[async_trait]
impl DataReader for JsonReader {
    async fn read(&self, path: &Path) -> crate::Result<Value> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| crate::Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        tokio::fs::write(&path, r#"{"pluginSources": []}"#)
            .await
            .unwrap();

        let value = JsonReader.read(&path).await.unwrap();
        assert_eq!(value, json!({"pluginSources": []}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let err = JsonReader.read(&path).await.unwrap_err();
        assert!(matches!(err, crate::Error::Parse { ref path, .. } if path.ends_with("broken.json")));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = JsonReader
            .read(Path::new("/nonexistent/settings.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
