//! The code-unit import capability.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::Module;
use crate::common::BoxError;
use crate::common::path::{absolute, resolve};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No module registered for {path}")]
    Unregistered { path: PathBuf },

    #[error("Module {path} failed to initialise: {message}")]
    Failed { path: PathBuf, message: String },
}

impl ImportError {
    pub fn path(&self) -> &Path {
        match self {
            Self::Unregistered { path } | Self::Failed { path, .. } => path,
        }
    }
}

/// Turns an absolute path into the exports of a code unit.
///
/// Implementations may run arbitrary host code; they are free to call back
/// into a [`ModuleLoader`](crate::ModuleLoader), which rejects re-entry into a
/// path that is already being loaded.
#[async_trait]
pub trait CodeImporter: Send + Sync {
    async fn import(&self, path: &Path) -> Result<Module, ImportError>;
}

#[async_trait]
impl<T: CodeImporter + ?Sized> CodeImporter for Arc<T> {
    async fn import(&self, path: &Path) -> Result<Module, ImportError> {
        (**self).import(path).await
    }
}

type ModuleFactory = Arc<dyn Fn() -> Result<Module, BoxError> + Send + Sync>;

/// Build-time registration table mapping file paths to module factories.
///
/// The file still has to exist on disk for discovery to find it; the table
/// supplies what importing it produces. Factories run on every import, so a
/// module's initialisation is observed each time it is loaded.
#[derive(Clone, Default)]
pub struct ModuleTable {
    root: Option<PathBuf>,
    factories: HashMap<PathBuf, ModuleFactory>,
}

impl std::fmt::Debug for ModuleTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.factories.keys().collect();
        keys.sort();
        f.debug_struct("ModuleTable")
            .field("root", &self.root)
            .field("modules", &keys)
            .finish()
    }
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relative registration paths are resolved against `root`.
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(absolute(root.as_ref())),
            factories: HashMap::new(),
        }
    }

    fn key(&self, path: &Path) -> PathBuf {
        match &self.root {
            Some(root) if path.is_relative() => resolve(root, path),
            _ => absolute(path),
        }
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, module: Module) -> &mut Self {
        self.insert_with(path, move || Ok(module.clone()))
    }

    pub fn insert_with<F>(&mut self, path: impl AsRef<Path>, factory: F) -> &mut Self
    where
        F: Fn() -> Result<Module, BoxError> + Send + Sync + 'static,
    {
        let key = self.key(path.as_ref());
        self.factories.insert(key, Arc::new(factory));
        self
    }

    pub fn module(mut self, path: impl AsRef<Path>, module: Module) -> Self {
        self.insert(path, module);
        self
    }

    pub fn module_with<F>(mut self, path: impl AsRef<Path>, factory: F) -> Self
    where
        F: Fn() -> Result<Module, BoxError> + Send + Sync + 'static,
    {
        self.insert_with(path, factory);
        self
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.factories.contains_key(&self.key(path.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

#[async_trait]
impl CodeImporter for ModuleTable {
    async fn import(&self, path: &Path) -> Result<Module, ImportError> {
        let key = absolute(path);
        let factory = self
            .factories
            .get(&key)
            .ok_or_else(|| ImportError::Unregistered { path: key.clone() })?;

        factory().map_err(|e| ImportError::Failed {
            path: key,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_import_registered_module() {
        let table = ModuleTable::with_root("/srv/app")
            .module("plugins/a.js", Module::new().with_default(json!("a")));

        assert!(table.contains("/srv/app/plugins/a.js"));
        assert_eq!(table.len(), 1);

        let module = table
            .import(Path::new("/srv/app/plugins/./a.js"))
            .await
            .unwrap();
        assert_eq!(
            module.default_export().and_then(|e| e.as_value()),
            Some(&json!("a"))
        );
    }

    #[tokio::test]
    async fn test_import_unregistered() {
        let table = ModuleTable::new();
        let err = table.import(Path::new("/nowhere/x.js")).await.unwrap_err();
        assert!(matches!(err, ImportError::Unregistered { .. }));
        assert_eq!(err.path(), Path::new("/nowhere/x.js"));
    }

    #[tokio::test]
    async fn test_failing_factory() {
        let table = ModuleTable::new().module_with("/srv/broken.js", || {
            Err("SyntaxError: unexpected token".into())
        });
        let err = table.import(Path::new("/srv/broken.js")).await.unwrap_err();
        assert!(err.to_string().contains("unexpected token"));
        assert!(matches!(err, ImportError::Failed { .. }));
    }

    #[tokio::test]
    async fn test_factory_runs_on_every_import() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let table = ModuleTable::new().module_with("/srv/counted.js", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Module::new())
        });

        table.import(Path::new("/srv/counted.js")).await.unwrap();
        table.import(Path::new("/srv/counted.js")).await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }
}
