//! Plugin-source dispatch.
//!
//! A host configuration lists `pluginSources`; [`PluginDispatcher`] walks the
//! list in order and registers every callable it finds with the host's
//! [`RegistrationSink`]. One bad source never stops the others.

mod dispatcher;
mod error;
mod resolver;
mod sink;
mod source;

pub use dispatcher::{DispatchReport, PluginDispatcher};
pub use error::PluginError;
pub use resolver::{DefaultPathResolver, PathResolver};
pub use sink::{InlineHandler, RegistrationSink};
pub use source::{Handler, PluginSource, PluginsConfig, SourceKind};
pub(crate) use source::null_as_empty;
