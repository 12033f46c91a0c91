pub(crate) mod path;

use std::path::PathBuf;

pub(crate) fn home_dir() -> Option<PathBuf> {
    directories::UserDirs::new().map(|d| d.home_dir().to_path_buf())
}

/// Error type returned by host-provided collaborators (sinks, inline handlers,
/// plugin functions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
