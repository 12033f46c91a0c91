//! Self-import protection for loading operations.
//!
//! Two mechanisms run side by side:
//!
//! - [`SelfImportGuard`] compares a candidate against the [`LoaderIdentity`]
//!   of the running operation: the loader's own file, or a callable whose
//!   source text mentions the loader's entry name.
//! - [`ActiveLoads`] keeps a task-local stack of the paths currently being
//!   loaded. Re-entering a path that is already on the stack is refused
//!   before anything is imported, which bounds recursion even when the
//!   importer cannot expose source text.
//!
//! The stack is task-local: an importer that spawns a new task to call back
//! into a loader starts with an empty stack.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::common::path::{absolute, same_file};
use crate::module::{Export, Module};

tokio::task_local! {
    static ACTIVE_LOADS: Arc<Vec<PathBuf>>;
}

/// Entry names of the public loading operations.
pub mod entry {
    pub const FILE_LOADER: &str = "file_loader";
    pub const RECURSIVE_MODULE_LOADER: &str = "recursive_module_loader";
    pub const PATTERN_FILE_LOADER: &str = "pattern_file_loader";
    pub const PLUGINS_LOADER: &str = "plugins_loader";
}

/// Who is loading: the loader's own location and its entry-function name.
///
/// Built fresh for every loading operation and dropped when it returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderIdentity {
    path: Option<PathBuf>,
    entry: &'static str,
}

impl LoaderIdentity {
    pub fn new(path: Option<&Path>, entry: &'static str) -> Self {
        Self {
            path: path.map(absolute),
            entry,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entry(&self) -> &'static str {
        self.entry
    }
}

#[derive(Debug, Clone)]
pub struct SelfImportGuard {
    identity: LoaderIdentity,
}

impl SelfImportGuard {
    pub fn new(identity: LoaderIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &LoaderIdentity {
        &self.identity
    }

    pub async fn is_self_file(&self, path: &Path) -> bool {
        match self.identity.path.as_deref() {
            Some(own) => same_file(own, path).await,
            None => false,
        }
    }

    /// Heuristic: true when the export is a callable whose source text
    /// names the loader's entry as a whole identifier. Renamed or opaque
    /// callables slip through; [`ActiveLoads`] covers those.
    pub fn references_loader(&self, export: Option<&Export>) -> bool {
        export
            .and_then(Export::as_function)
            .and_then(|f| f.source_text())
            .is_some_and(|source| mentions_identifier(source, self.identity.entry))
    }

    pub fn is_active(&self, path: &Path) -> bool {
        ActiveLoads::contains(path)
    }

    /// Checks that can run before the candidate is imported.
    pub async fn should_skip_path(&self, path: &Path) -> bool {
        self.is_active(path) || self.is_self_file(path).await
    }

    pub async fn should_skip(&self, path: &Path, module: &Module) -> bool {
        self.references_loader(module.default_export()) || self.should_skip_path(path).await
    }
}

/// True when `ident` occurs in `source` not directly preceded or followed by
/// another identifier character, so `file_loader` does not match inside
/// `pattern_file_loader`.
fn mentions_identifier(source: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_' || c == '$';

    source.match_indices(ident).any(|(start, _)| {
        let before = source[..start].chars().next_back();
        let after = source[start + ident.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Task-local stack of paths being loaded.
pub struct ActiveLoads;

impl ActiveLoads {
    pub fn contains(path: &Path) -> bool {
        let path = absolute(path);
        ACTIVE_LOADS
            .try_with(|stack| stack.iter().any(|p| *p == path))
            .unwrap_or(false)
    }

    pub fn current() -> Vec<PathBuf> {
        ACTIVE_LOADS
            .try_with(|stack| stack.as_ref().clone())
            .unwrap_or_default()
    }

    /// Runs `fut` with `path` pushed onto the stack it inherits.
    pub async fn scope<F: Future>(path: &Path, fut: F) -> F::Output {
        let mut stack = Self::current();
        stack.push(absolute(path));
        ACTIVE_LOADS.scope(Arc::new(stack), fut).await
    }
}
