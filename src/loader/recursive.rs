//! Recursive registration of every code unit under a set of directories.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::ModuleLoader;
use crate::common::BoxError;
use crate::discovery::{DirectoryWalker, WalkEntry};
use crate::guard::{ActiveLoads, SelfImportGuard, entry};
use crate::module::PluginFn;
use crate::plugins::RegistrationSink;
use crate::policy::FileKind;

/// Replaces the default registration of a discovered callable.
#[async_trait]
pub trait OnLoad: Send + Sync {
    async fn on_load(
        &self,
        plugin: Arc<dyn PluginFn>,
        path: &Path,
        name: &str,
    ) -> Result<(), BoxError>;
}

#[async_trait]
impl<F, Fut> OnLoad for F
where
    F: Fn(Arc<dyn PluginFn>, PathBuf, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn on_load(
        &self,
        plugin: Arc<dyn PluginFn>,
        path: &Path,
        name: &str,
    ) -> Result<(), BoxError> {
        self(plugin, path.to_path_buf(), name.to_string()).await
    }
}

impl ModuleLoader {
    /// Walks `dirs` and registers the default export of every code unit.
    ///
    /// With `on_load` set, the callable goes to it instead of the sink.
    /// Failures are logged per file and never stop the walk. Returns how many
    /// callables were handed off.
    #[tracing::instrument(skip_all, fields(dirs = dirs.len()))]
    pub async fn load_recursive<P: AsRef<Path>>(
        &self,
        sink: &dyn RegistrationSink,
        dirs: &[P],
        on_load: Option<&dyn OnLoad>,
    ) -> usize {
        let guard = self.guard(entry::RECURSIVE_MODULE_LOADER);
        let extensions = self.policy.extensions.clone();
        let mut walker = DirectoryWalker::new(self.policy.allowlist.clone(), dirs)
            .file_filter(move |name| extensions.kind_of(name) == Some(FileKind::Code));

        let mut registered = 0;
        while let Some(file) = walker.next_entry().await {
            match self.register_file(&guard, sink, on_load, &file).await {
                Ok(true) => registered += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Failed to load module");
                }
            }
        }

        tracing::debug!(registered, "Recursive load finished");
        registered
    }

    async fn register_file(
        &self,
        guard: &SelfImportGuard,
        sink: &dyn RegistrationSink,
        on_load: Option<&dyn OnLoad>,
        file: &WalkEntry,
    ) -> Result<bool, BoxError> {
        let Some(module) = self.import_guarded(guard, &file.path).await? else {
            return Ok(false);
        };

        let Some(plugin) = module.default_function().cloned() else {
            tracing::debug!(path = %file.path.display(), "Default export is not callable, skipping");
            return Ok(false);
        };

        // Registration may run plugin code that loads again.
        ActiveLoads::scope(&file.path, async {
            match on_load {
                Some(handler) => handler.on_load(plugin, &file.path, &file.name).await,
                None => sink.register(plugin).await,
            }
        })
        .await?;

        Ok(true)
    }
}
