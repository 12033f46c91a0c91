//! In-memory shape of a loaded code unit.
//!
//! A code unit is whatever a [`CodeImporter`] produces for a path: an optional
//! default export plus named exports. Exports are either plain values or
//! callables implementing [`PluginFn`]; callables are what the loaders hand to
//! a [`RegistrationSink`](crate::plugins::RegistrationSink).
//!
//! Importing runs host-defined code. Nothing here sandboxes it; the import
//! primitive is a trust boundary owned by the host.

mod importer;
mod reader;

pub use importer::{CodeImporter, ImportError, ModuleTable};
pub use reader::{DataReader, JsonReader};

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::common::BoxError;

/// A callable exported from a code unit.
#[async_trait]
pub trait PluginFn: Send + Sync {
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Source text of the callable, when the importer can provide it.
    fn source_text(&self) -> Option<&str> {
        None
    }

    async fn call(&self, input: Value) -> Result<Value, BoxError>;
}

/// [`PluginFn`] backed by a closure.
pub struct FnPlugin<F> {
    name: String,
    source: Option<String>,
    f: F,
}

impl<F, Fut> FnPlugin<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            source: None,
            f,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[async_trait]
impl<F, Fut> PluginFn for FnPlugin<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn source_text(&self) -> Option<&str> {
        self.source.as_deref()
    }

    async fn call(&self, input: Value) -> Result<Value, BoxError> {
        (self.f)(input).await
    }
}

/// Shorthand for an `Arc<dyn PluginFn>` built from a closure.
pub fn plugin_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn PluginFn>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BoxError>> + Send + 'static,
{
    Arc::new(FnPlugin::new(name, f))
}

#[derive(Clone)]
pub enum Export {
    Function(Arc<dyn PluginFn>),
    Value(Value),
}

impl std::fmt::Debug for Export {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Function(func) => f.debug_tuple("Function").field(&func.name()).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

impl Export {
    pub fn function(f: Arc<dyn PluginFn>) -> Self {
        Self::Function(f)
    }

    pub fn as_function(&self) -> Option<&Arc<dyn PluginFn>> {
        match self {
            Self::Function(f) => Some(f),
            Self::Value(_) => None,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Function(_) => None,
        }
    }
}

impl From<Value> for Export {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Arc<dyn PluginFn>> for Export {
    fn from(f: Arc<dyn PluginFn>) -> Self {
        Self::Function(f)
    }
}

/// Exports of one imported code unit.
#[derive(Debug, Clone, Default)]
pub struct Module {
    default: Option<Export>,
    named: BTreeMap<String, Export>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(mut self, export: impl Into<Export>) -> Self {
        self.default = Some(export.into());
        self
    }

    pub fn with_named(mut self, name: impl Into<String>, export: impl Into<Export>) -> Self {
        self.named.insert(name.into(), export.into());
        self
    }

    pub fn default_export(&self) -> Option<&Export> {
        self.default.as_ref()
    }

    pub fn named(&self) -> &BTreeMap<String, Export> {
        &self.named
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.named.get(name)
    }

    /// The default export when it is callable.
    pub fn default_function(&self) -> Option<&Arc<dyn PluginFn>> {
        self.default.as_ref().and_then(Export::as_function)
    }
}

/// What a single successful load hands back to the caller.
#[derive(Debug, Clone)]
pub enum LoadedUnit {
    /// Parsed contents of a data file.
    Data(Value),
    /// Default export of a code unit.
    Export(Export),
    /// A code unit without a default export.
    Module(Arc<Module>),
}

impl LoadedUnit {
    pub(crate) fn from_module(module: Module) -> Self {
        match module.default {
            Some(export) => Self::Export(export),
            None => Self::Module(Arc::new(module)),
        }
    }

    pub fn as_data(&self) -> Option<&Value> {
        match self {
            Self::Data(v) => Some(v),
            Self::Export(Export::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Arc<dyn PluginFn>> {
        match self {
            Self::Export(export) => export.as_function(),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Self::Module(m) => Some(m),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_plugin_fn_call() {
        let f = plugin_fn("double", |input: Value| async move {
            let n = input
                .as_i64()
                .ok_or_else(|| BoxError::from("expected a number"))?;
            Ok::<_, BoxError>(json!(n * 2))
        });
        assert_eq!(f.name(), "double");
        assert!(f.source_text().is_none());
        assert_eq!(f.call(json!(21)).await.unwrap(), json!(42));
        assert!(f.call(json!("x")).await.is_err());
    }

    #[test]
    fn test_fn_plugin_source_text() {
        let f = FnPlugin::new("wrapper", |_: Value| async { Ok::<_, BoxError>(Value::Null) })
            .with_source("async function wrapper(app) { await file_loader(app) }");
        assert!(f.source_text().unwrap().contains("file_loader"));
    }

    #[test]
    fn test_loaded_unit_prefers_default() {
        let module = Module::new()
            .with_default(json!({"port": 3000}))
            .with_named("helper", json!(1));
        let unit = LoadedUnit::from_module(module);
        assert_eq!(unit.as_data(), Some(&json!({"port": 3000})));

        let module = Module::new().with_named("helper", json!(1));
        let unit = LoadedUnit::from_module(module);
        let module = unit.as_module().unwrap();
        assert_eq!(module.get("helper").and_then(Export::as_value), Some(&json!(1)));
        assert!(module.default_export().is_none());
    }

    #[test]
    fn test_export_debug_shows_function_name() {
        let export = Export::function(plugin_fn("logger", |_: Value| async { Ok::<_, BoxError>(Value::Null) }));
        assert_eq!(format!("{export:?}"), "Function(\"logger\")");
    }
}
