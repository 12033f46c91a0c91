//! Loading files named relative to a base directory.

use std::path::Path;

use futures::future::try_join_all;
use serde_json::Value;

use super::ModuleLoader;
use crate::common::path::resolve;
use crate::guard::{SelfImportGuard, entry};
use crate::module::LoadedUnit;

/// One file name or a batch of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSpec {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for FileSpec {
    fn from(name: &str) -> Self {
        Self::One(name.to_string())
    }
}

impl From<String> for FileSpec {
    fn from(name: String) -> Self {
        Self::One(name)
    }
}

impl From<Vec<String>> for FileSpec {
    fn from(names: Vec<String>) -> Self {
        Self::Many(names)
    }
}

impl From<&[&str]> for FileSpec {
    fn from(names: &[&str]) -> Self {
        Self::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl TryFrom<&Value> for FileSpec {
    type Error = crate::Error;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        const SHAPE: &str = "\"filenames\" must be a string or an array of strings";

        match value {
            Value::String(name) => Ok(Self::One(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or_else(|| crate::Error::InvalidArgument(SHAPE.into()))
                })
                .collect::<crate::Result<Vec<_>>>()
                .map(Self::Many),
            _ => Err(crate::Error::InvalidArgument(SHAPE.into())),
        }
    }
}

/// Result of [`ModuleLoader::load`], shaped like the request.
#[derive(Debug, Clone)]
pub enum Loaded {
    /// `None` when the single file was skipped as a self-import.
    One(Option<LoadedUnit>),
    /// Loaded units in request order, self-import skips left out.
    Many(Vec<LoadedUnit>),
}

impl Loaded {
    pub fn into_vec(self) -> Vec<LoadedUnit> {
        match self {
            Self::One(unit) => unit.into_iter().collect(),
            Self::Many(units) => units,
        }
    }
}

impl ModuleLoader {
    /// Loads one file or a batch, matching the shape of `spec`.
    pub async fn load(
        &self,
        base: impl AsRef<Path>,
        spec: impl Into<FileSpec>,
    ) -> crate::Result<Loaded> {
        match spec.into() {
            FileSpec::One(name) => self.load_one(base, &name).await.map(Loaded::One),
            FileSpec::Many(names) => self.load_many(base, &names).await.map(Loaded::Many),
        }
    }

    /// Loads `base/name`.
    ///
    /// Data files are parsed, code units are imported and guarded. Returns
    /// `Ok(None)` when the unit is skipped as a self-import.
    #[tracing::instrument(skip_all, fields(base = %base.as_ref().display(), name = name))]
    pub async fn load_one(
        &self,
        base: impl AsRef<Path>,
        name: &str,
    ) -> crate::Result<Option<LoadedUnit>> {
        let guard = self.guard(entry::FILE_LOADER);
        self.load_file(&guard, base.as_ref(), name).await
    }

    /// Loads every name concurrently and keeps request order.
    ///
    /// Fails fast: the first error other than a self-import skip fails the
    /// whole batch.
    #[tracing::instrument(skip_all, fields(base = %base.as_ref().display(), count = names.len()))]
    pub async fn load_many<S: AsRef<str>>(
        &self,
        base: impl AsRef<Path>,
        names: &[S],
    ) -> crate::Result<Vec<LoadedUnit>> {
        let guard = self.guard(entry::FILE_LOADER);
        let base = base.as_ref();

        let units = try_join_all(
            names
                .iter()
                .map(|name| self.load_file(&guard, base, name.as_ref())),
        )
        .await?;

        Ok(units.into_iter().flatten().collect())
    }

    async fn load_file(
        &self,
        guard: &SelfImportGuard,
        base: &Path,
        name: &str,
    ) -> crate::Result<Option<LoadedUnit>> {
        if name.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "file name must not be empty".into(),
            ));
        }

        let classified = self.policy.extensions.classify(name)?;
        let path = resolve(base, name);
        tracing::debug!(path = %path.display(), kind = %classified.kind, "Loading file");

        self.load_path(guard, &path, classified.kind).await
    }
}
