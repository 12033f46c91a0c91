//! JSON settings files.

use std::path::{Path, PathBuf};

use super::ConfigResult;
use super::settings::SettingsLayer;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file as one settings layer. A missing file is an empty layer.
    pub async fn layer(&self) -> ConfigResult<SettingsLayer> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!(path = %self.path.display(), "Settings file not found, skipping");
            return Ok(SettingsLayer::default());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
