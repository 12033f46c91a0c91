//! Extension and entry-name policy shared by every loader.
//!
//! Both tables are immutable once built. They are handed to each component at
//! construction instead of living in process-wide statics, so a host can run
//! loaders with different policies side by side.

mod allowlist;
mod extensions;

pub use allowlist::{AllowOptions, BLOCKED_NAMES, PathAllowlist};
pub use extensions::{Classified, ExtensionPolicy, FileKind};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("Suffix '{ext}' is registered for both {first} and {second}")]
    DuplicateSuffix {
        ext: String,
        first: FileKind,
        second: FileKind,
    },

    #[error("Invalid suffix '{ext}': must start with '.' and name an extension")]
    InvalidSuffix { ext: String },
}

/// Extension table plus allowlist, shared read-only between components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderPolicy {
    pub extensions: ExtensionPolicy,
    pub allowlist: PathAllowlist,
}

impl LoaderPolicy {
    pub fn new(extensions: ExtensionPolicy, allowlist: PathAllowlist) -> Self {
        Self {
            extensions,
            allowlist,
        }
    }
}
