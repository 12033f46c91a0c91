//! Turning a source's `path` into an absolute location.

use std::path::{Path, PathBuf};

use crate::common::path::{expand_home, resolve};

pub trait PathResolver: Send + Sync {
    fn resolve(&self, base_dir: &Path, raw: &str) -> PathBuf;
}

impl<F> PathResolver for F
where
    F: Fn(&Path, &str) -> PathBuf + Send + Sync,
{
    fn resolve(&self, base_dir: &Path, raw: &str) -> PathBuf {
        self(base_dir, raw)
    }
}

/// Expands a leading `~`, then resolves against `base_dir`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPathResolver;

impl PathResolver for DefaultPathResolver {
    fn resolve(&self, base_dir: &Path, raw: &str) -> PathBuf {
        resolve(base_dir, expand_home(raw))
    }
}
