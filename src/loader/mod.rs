//! File, recursive and pattern loaders.
//!
//! Every public operation builds a fresh [`SelfImportGuard`] naming itself,
//! so a code unit that wraps one loader is only rejected by that loader.

mod file;
mod pattern;
mod recursive;

pub use file::{FileSpec, Loaded};
pub use pattern::NamedUnit;
pub use recursive::OnLoad;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::guard::{ActiveLoads, LoaderIdentity, SelfImportGuard};
use crate::module::{CodeImporter, DataReader, JsonReader, LoadedUnit, Module, ModuleTable};
use crate::policy::{FileKind, LoaderPolicy};

/// Loads data files and code units by path.
#[derive(Clone)]
pub struct ModuleLoader {
    policy: Arc<LoaderPolicy>,
    importer: Arc<dyn CodeImporter>,
    reader: Arc<dyn DataReader>,
    location: Option<PathBuf>,
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("policy", &self.policy)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl Default for ModuleLoader {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ModuleLoader {
    pub fn builder() -> ModuleLoaderBuilder {
        ModuleLoaderBuilder::default()
    }

    pub fn policy(&self) -> &LoaderPolicy {
        &self.policy
    }

    /// The loader's own file, compared against every candidate.
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn set_location(&mut self, location: Option<PathBuf>) {
        self.location = location;
    }

    pub(crate) fn set_policy(&mut self, policy: Arc<LoaderPolicy>) {
        self.policy = policy;
    }

    pub(crate) fn guard(&self, entry: &'static str) -> SelfImportGuard {
        SelfImportGuard::new(LoaderIdentity::new(self.location.as_deref(), entry))
    }

    /// Loads an existing, already classified file.
    pub(crate) async fn load_path(
        &self,
        guard: &SelfImportGuard,
        path: &Path,
        kind: FileKind,
    ) -> crate::Result<Option<LoadedUnit>> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(crate::Error::NotFound {
                path: path.to_path_buf(),
            });
        }

        match kind {
            FileKind::Data => Ok(Some(LoadedUnit::Data(self.reader.read(path).await?))),
            FileKind::Code => Ok(self
                .import_guarded(guard, path)
                .await?
                .map(LoadedUnit::from_module)),
        }
    }

    /// Imports `path` unless the guard flags it. `Ok(None)` means skipped.
    pub(crate) async fn import_guarded(
        &self,
        guard: &SelfImportGuard,
        path: &Path,
    ) -> crate::Result<Option<Module>> {
        if guard.should_skip_path(path).await {
            tracing::warn!(path = %path.display(), loader = guard.identity().entry(), "Skipping self-import");
            return Ok(None);
        }

        let module = ActiveLoads::scope(path, self.importer.import(path)).await?;

        if guard.should_skip(path, &module).await {
            tracing::warn!(path = %path.display(), loader = guard.identity().entry(), "Skipping self-import");
            return Ok(None);
        }

        Ok(Some(module))
    }
}

#[derive(Default)]
pub struct ModuleLoaderBuilder {
    policy: Option<Arc<LoaderPolicy>>,
    importer: Option<Arc<dyn CodeImporter>>,
    reader: Option<Arc<dyn DataReader>>,
    location: Option<Option<PathBuf>>,
}

impl ModuleLoaderBuilder {
    pub fn policy(mut self, policy: impl Into<Arc<LoaderPolicy>>) -> Self {
        self.policy = Some(policy.into());
        self
    }

    pub fn importer(mut self, importer: impl CodeImporter + 'static) -> Self {
        self.importer = Some(Arc::new(importer));
        self
    }

    pub fn shared_importer(mut self, importer: Arc<dyn CodeImporter>) -> Self {
        self.importer = Some(importer);
        self
    }

    pub fn reader(mut self, reader: impl DataReader + 'static) -> Self {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Overrides the loader's own location; defaults to the running executable.
    pub fn location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(Some(path.into()));
        self
    }

    pub fn without_location(mut self) -> Self {
        self.location = Some(None);
        self
    }

    pub fn build(self) -> ModuleLoader {
        ModuleLoader {
            policy: self.policy.unwrap_or_default(),
            importer: self
                .importer
                .unwrap_or_else(|| Arc::new(ModuleTable::new())),
            reader: self.reader.unwrap_or_else(|| Arc::new(JsonReader)),
            location: self
                .location
                .unwrap_or_else(|| std::env::current_exe().ok()),
        }
    }
}
