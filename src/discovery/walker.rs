//! Depth-first directory traversal with allowlist pruning.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::path::{Path, PathBuf};

use tokio::fs::ReadDir;

use crate::common::path::absolute;
use crate::policy::PathAllowlist;

type FileFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// A file yielded by [`DirectoryWalker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Bare entry name.
    pub name: String,
}

/// Walks one or more root directories, yielding eligible files one at a time.
///
/// Subdirectories whose name the allowlist rejects are pruned without
/// descending. Each directory is read at most once per walker, keyed by its
/// canonical path, which also breaks symlink cycles. Entries come back in
/// directory-listing order, which is platform defined.
pub struct DirectoryWalker {
    allowlist: PathAllowlist,
    filter: Option<FileFilter>,
    roots: VecDeque<PathBuf>,
    stack: Vec<(PathBuf, ReadDir)>,
    visited: HashSet<PathBuf>,
}

impl DirectoryWalker {
    pub fn new<I, P>(allowlist: PathAllowlist, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            allowlist,
            filter: None,
            roots: roots.into_iter().map(|r| absolute(r.as_ref())).collect(),
            stack: Vec::new(),
            visited: HashSet::new(),
        }
    }

    /// Only yield files whose entry name passes `filter`.
    pub fn file_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Advances the walk to the next eligible file.
    pub async fn next_entry(&mut self) -> Option<WalkEntry> {
        loop {
            let Some((dir, entries)) = self.stack.last_mut() else {
                let root = self.roots.pop_front()?;
                self.enter(&root).await;
                continue;
            };

            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => {
                    self.stack.pop();
                    continue;
                }
                Err(e) => {
                    tracing::warn!(path = %dir.display(), error = %e, "Failed to read directory entry");
                    self.stack.pop();
                    continue;
                }
            };

            let path = entry.path();
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                tracing::debug!(path = %path.display(), "Skipping non UTF-8 entry name");
                continue;
            };

            let file_type = match entry.file_type().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to stat entry");
                    continue;
                }
            };

            let (is_dir, is_file) = if file_type.is_symlink() {
                match tokio::fs::metadata(&path).await {
                    Ok(meta) => (meta.is_dir(), meta.is_file()),
                    Err(_) => {
                        tracing::debug!(path = %path.display(), "Skipping dangling symlink");
                        continue;
                    }
                }
            } else {
                (file_type.is_dir(), file_type.is_file())
            };

            if is_dir {
                if self.allowlist.is_allowed(&name) {
                    self.enter(&path).await;
                } else {
                    tracing::debug!(path = %path.display(), "Pruned excluded directory");
                }
                continue;
            }

            if !is_file {
                continue;
            }

            if let Some(filter) = &self.filter
                && !filter(&name)
            {
                continue;
            }

            return Some(WalkEntry { path, name });
        }
    }

    async fn enter(&mut self, dir: &Path) {
        let key = match tokio::fs::canonicalize(dir).await {
            Ok(canonical) => canonical,
            Err(_) => absolute(dir),
        };
        if !self.visited.insert(key) {
            tracing::debug!(path = %dir.display(), "Directory already visited");
            return;
        }

        match tokio::fs::read_dir(dir).await {
            Ok(entries) => self.stack.push((dir.to_path_buf(), entries)),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Cannot read directory");
            }
        }
    }

    /// Drives the walk to completion, awaiting `visit` for each file before
    /// moving on.
    pub async fn walk<F, Fut>(mut self, mut visit: F)
    where
        F: FnMut(WalkEntry) -> Fut,
        Fut: Future<Output = ()>,
    {
        while let Some(entry) = self.next_entry().await {
            visit(entry).await;
        }
    }

    pub async fn collect(mut self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();
        while let Some(entry) = self.next_entry().await {
            entries.push(entry);
        }
        entries
    }
}
