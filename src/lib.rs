//! # velos-loaders
//!
//! Dynamic module discovery and plugin registration for Velos host applications.
//!
//! The crate walks directory trees, applies extension and entry-name policy,
//! imports matching files through a host-supplied [`CodeImporter`], refuses to
//! let a loader import itself, and hands the resulting callables to a
//! [`RegistrationSink`].
//!
//! ## Loading files
//!
//! ```rust,no_run
//! use velos_loaders::{ModuleLoader, ModuleTable};
//!
//! # async fn example() -> velos_loaders::Result<()> {
//! let loader = ModuleLoader::builder()
//!     .importer(ModuleTable::with_root("./sample"))
//!     .build();
//!
//! let settings = loader.load_one("./sample", "settings.json").await?;
//! let batch = loader
//!     .load_many("./sample", &["settings.json", "velos.config.js"])
//!     .await?;
//! # let _ = (settings, batch);
//! # Ok(())
//! # }
//! ```
//!
//! ## Dispatching plugin sources
//!
//! ```rust,no_run
//! use velos_loaders::{DefaultPathResolver, ModuleTable, PluginDispatcher, PluginsConfig};
//! # use velos_loaders::{PluginFn, RegistrationSink, BoxError};
//! # use std::sync::Arc;
//! # struct App;
//! # #[async_trait::async_trait]
//! # impl RegistrationSink for App {
//! #     async fn register(&self, _f: Arc<dyn PluginFn>) -> Result<(), BoxError> { Ok(()) }
//! # }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config: PluginsConfig = serde_json::from_str(
//!     r#"{"pluginSources": [{"type": "folder", "path": "plugins"}]}"#,
//! )?;
//! let dispatcher = PluginDispatcher::new(ModuleTable::with_root("./sample"));
//! let report = dispatcher
//!     .dispatch(&config, &App, "./sample".as_ref(), &DefaultPathResolver)
//!     .await;
//! println!("registered {} plugins", report.registered.len());
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod discovery;
pub mod guard;
pub mod loader;
pub mod module;
pub mod plugins;
pub mod policy;

use std::path::PathBuf;

pub use common::BoxError;
pub use config::{ConfigError, LoaderSettings, LoaderSettingsBuilder};
pub use discovery::{DirectoryWalker, WalkEntry, WildcardPattern};
pub use guard::{ActiveLoads, LoaderIdentity, SelfImportGuard};
pub use loader::{FileSpec, Loaded, ModuleLoader, ModuleLoaderBuilder, NamedUnit, OnLoad};
pub use module::{
    CodeImporter, DataReader, Export, FnPlugin, ImportError, JsonReader, LoadedUnit, Module,
    ModuleTable, PluginFn, plugin_fn,
};
pub use plugins::{
    DefaultPathResolver, DispatchReport, Handler, InlineHandler, PathResolver, PluginDispatcher,
    PluginError, PluginSource, PluginsConfig, RegistrationSink, SourceKind,
};
pub use policy::{
    AllowOptions, Classified, ExtensionPolicy, FileKind, LoaderPolicy, PathAllowlist, PolicyError,
};

/// Error type for loader operations.
///
/// A self-import skip is not an error: single loads return `Ok(None)` and
/// batch loads leave the entry out.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The call itself was malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The file name carries no `.` suffix.
    #[error("File \"{file}\" has no extension")]
    NoExtension { file: String },

    /// The suffix is not registered for any file kind.
    #[error("Unsupported extension \"{ext}\"; supported: {supported}")]
    UnsupportedExtension { ext: String, supported: String },

    /// The resolved file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A data file could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A code unit failed while being imported.
    #[error("Failed to import {}: {message}", path.display())]
    Import { path: PathBuf, message: String },

    /// Invalid or unreadable loader configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad call shape
    Argument,
    /// Extension policy violations
    Policy,
    /// Missing files
    Missing,
    /// Malformed data or failing code units
    Content,
    /// Configuration and IO failures
    Internal,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) => ErrorCategory::Argument,
            Error::NoExtension { .. } | Error::UnsupportedExtension { .. } => {
                ErrorCategory::Policy
            }
            Error::NotFound { .. } => ErrorCategory::Missing,
            Error::Parse { .. } | Error::Import { .. } => ErrorCategory::Content,
            Error::Config(_) | Error::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_policy_violation(&self) -> bool {
        self.category() == ErrorCategory::Policy
    }

    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::Missing
    }
}

impl From<ImportError> for Error {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Unregistered { path } => Error::Import {
                path,
                message: "no module registered for this path".into(),
            },
            ImportError::Failed { path, message } => Error::Import { path, message },
        }
    }
}

impl From<PolicyError> for Error {
    fn from(err: PolicyError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(e) => Error::Io(e),
            other => Error::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
