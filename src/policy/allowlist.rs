//! Entry-name allowlist applied while traversing directories.

use std::ffi::OsStr;

/// Names that are never traversed or loaded.
pub const BLOCKED_NAMES: &[&str] = &[
    "node_modules",
    ".git",
    ".npmignore",
    ".vscode",
    ".DS_Store",
    "Thumbs.db",
];

const HIDDEN_MARKER: char = '.';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowOptions {
    pub ignore_case: bool,
    pub skip_hidden: bool,
}

impl Default for AllowOptions {
    fn default() -> Self {
        Self {
            ignore_case: true,
            skip_hidden: true,
        }
    }
}

/// Decides whether a single directory entry may be considered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathAllowlist {
    blocked: Vec<String>,
    options: AllowOptions,
}

impl Default for PathAllowlist {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PathAllowlist {
    pub fn builtin() -> Self {
        Self::new(BLOCKED_NAMES.iter().copied())
    }

    pub fn new<I, S>(blocked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocked: blocked.into_iter().map(Into::into).collect(),
            options: AllowOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AllowOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> AllowOptions {
        self.options
    }

    pub fn blocked(&self) -> &[String] {
        &self.blocked
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.is_allowed_with(name, self.options)
    }

    /// Non-UTF-8 names are never allowed.
    pub fn is_allowed_os(&self, name: &OsStr) -> bool {
        name.to_str().is_some_and(|n| self.is_allowed(n))
    }

    /// `name` must be a bare entry name; anything containing a path separator
    /// is rejected outright.
    pub fn is_allowed_with(&self, name: &str, options: AllowOptions) -> bool {
        if name.is_empty() || name.contains(['/', '\\']) {
            return false;
        }

        if options.skip_hidden && name.starts_with(HIDDEN_MARKER) {
            return false;
        }

        !self.blocked.iter().any(|blocked| {
            if options.ignore_case {
                blocked.to_lowercase() == name.to_lowercase()
            } else {
                blocked == name
            }
        })
    }
}
