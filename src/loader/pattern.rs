//! Loading every file under a directory whose name matches a wildcard.

use std::path::{Path, PathBuf};

use super::ModuleLoader;
use crate::discovery::{DirectoryWalker, WalkEntry, WildcardPattern};
use crate::guard::{SelfImportGuard, entry};
use crate::module::LoadedUnit;

/// A unit loaded by [`ModuleLoader::load_pattern`], tagged with its origin.
#[derive(Debug, Clone)]
pub struct NamedUnit {
    pub name: String,
    pub path: PathBuf,
    pub unit: LoadedUnit,
}

impl ModuleLoader {
    /// Loads every file under `base` whose entry name matches `pattern`.
    ///
    /// `*` is the only wildcard. Matching files with an unsupported suffix,
    /// failing imports and self-imports are logged and left out. Results
    /// follow walk order.
    #[tracing::instrument(skip_all, fields(base = %base.as_ref().display(), pattern = pattern))]
    pub async fn load_pattern(
        &self,
        base: impl AsRef<Path>,
        pattern: &str,
    ) -> crate::Result<Vec<NamedUnit>> {
        let matcher = WildcardPattern::compile(pattern)?;
        let guard = self.guard(entry::PATTERN_FILE_LOADER);
        let mut walker = DirectoryWalker::new(self.policy.allowlist.clone(), [base.as_ref()])
            .file_filter(move |name| matcher.matches(name));

        let mut units = Vec::new();
        while let Some(file) = walker.next_entry().await {
            match self.load_matched(&guard, &file).await {
                Ok(Some(unit)) => units.push(NamedUnit {
                    name: file.name,
                    path: file.path,
                    unit,
                }),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Failed to load matching file");
                }
            }
        }

        Ok(units)
    }

    async fn load_matched(
        &self,
        guard: &SelfImportGuard,
        file: &WalkEntry,
    ) -> crate::Result<Option<LoadedUnit>> {
        let classified = self.policy.extensions.classify(&file.name)?;
        self.load_path(guard, &file.path, classified.kind).await
    }
}
