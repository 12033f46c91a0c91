use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    Handler, InlineHandler, PathResolver, PluginError, PluginSource, PluginsConfig,
    RegistrationSink, SourceKind,
};
use crate::guard::{ActiveLoads, SelfImportGuard, entry};
use crate::loader::ModuleLoader;
use crate::module::CodeImporter;
use crate::policy::{FileKind, LoaderPolicy};

/// Summary of one [`PluginDispatcher::dispatch`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Names of the registered plugins, in registration order.
    pub registered: Vec<String>,
    /// Sources and files passed over without failing: `url` and unknown
    /// source kinds, self-imports, non-callable exports.
    pub skipped: usize,
    /// Sources and files whose processing failed.
    pub failed: usize,
}

/// Processes `pluginSources` one by one and registers what they yield.
pub struct PluginDispatcher {
    loader: ModuleLoader,
    handlers: HashMap<String, Arc<dyn InlineHandler>>,
}

impl PluginDispatcher {
    pub fn new(importer: impl CodeImporter + 'static) -> Self {
        Self::with_loader(ModuleLoader::builder().importer(importer).build())
    }

    pub fn with_loader(loader: ModuleLoader) -> Self {
        Self {
            loader,
            handlers: HashMap::new(),
        }
    }

    /// Registers a handler that `inline` sources can name.
    pub fn handler(mut self, name: impl Into<String>, handler: impl InlineHandler + 'static) -> Self {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn location(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader.set_location(Some(path.into()));
        self
    }

    pub fn policy(mut self, policy: impl Into<Arc<LoaderPolicy>>) -> Self {
        self.loader.set_policy(policy.into());
        self
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Dispatches every source in order. Never fails: a failing source is
    /// logged and counted, and the next source still runs.
    #[tracing::instrument(skip_all, fields(base_dir = %base_dir.display(), sources = config.plugin_sources.len()))]
    pub async fn dispatch(
        &self,
        config: &PluginsConfig,
        sink: &dyn RegistrationSink,
        base_dir: &Path,
        resolver: &dyn PathResolver,
    ) -> DispatchReport {
        let guard = self.loader.guard(entry::PLUGINS_LOADER);
        let mut report = DispatchReport::default();

        for source in &config.plugin_sources {
            let ctx = SourceContext {
                guard: &guard,
                config,
                sink,
                base_dir,
                resolver,
            };
            if let Err(e) = self.dispatch_source(&ctx, source, &mut report).await {
                report.failed += 1;
                tracing::error!(
                    source_type = %source.kind,
                    path = source.path.as_deref().unwrap_or_default(),
                    error = %e,
                    "Failed to load plugin source"
                );
            }
        }

        tracing::debug!(
            registered = report.registered.len(),
            skipped = report.skipped,
            failed = report.failed,
            "Plugin dispatch finished"
        );
        report
    }

    async fn dispatch_source(
        &self,
        ctx: &SourceContext<'_>,
        source: &PluginSource,
        report: &mut DispatchReport,
    ) -> Result<(), PluginError> {
        match &source.kind {
            SourceKind::Inline => self.run_inline(ctx, source, report).await,
            SourceKind::File => {
                let path = self.source_path(ctx, source)?;
                self.register_file(ctx, &path, report).await
            }
            SourceKind::Folder => {
                let dir = self.source_path(ctx, source)?;
                self.register_folder(ctx, &dir, report).await
            }
            SourceKind::Url => {
                tracing::warn!(path = source.path.as_deref().unwrap_or_default(), "URL plugin sources are not supported");
                report.skipped += 1;
                Ok(())
            }
            SourceKind::Other(kind) => {
                tracing::warn!(source_type = %kind, "Unknown plugin source type");
                report.skipped += 1;
                Ok(())
            }
        }
    }

    fn source_path(
        &self,
        ctx: &SourceContext<'_>,
        source: &PluginSource,
    ) -> Result<PathBuf, PluginError> {
        let raw = source
            .path
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| PluginError::MissingPath {
                kind: source.kind.clone(),
            })?;
        Ok(ctx.resolver.resolve(ctx.base_dir, raw))
    }

    async fn run_inline(
        &self,
        ctx: &SourceContext<'_>,
        source: &PluginSource,
        report: &mut DispatchReport,
    ) -> Result<(), PluginError> {
        let handler = match &source.handler {
            Some(Handler::Callable(handler)) => handler.clone(),
            Some(Handler::Named(name)) => match self.handlers.get(name) {
                Some(handler) => handler.clone(),
                None => {
                    tracing::warn!(name = %name, "Inline handler not registered, skipping");
                    report.skipped += 1;
                    return Ok(());
                }
            },
            None => {
                tracing::warn!("Inline plugin source has no handler");
                report.skipped += 1;
                return Ok(());
            }
        };

        handler
            .handle(ctx.sink, ctx.config)
            .await
            .map_err(PluginError::Handler)
    }

    async fn register_file(
        &self,
        ctx: &SourceContext<'_>,
        path: &Path,
        report: &mut DispatchReport,
    ) -> Result<(), PluginError> {
        let Some(unit) = self
            .loader
            .load_path(ctx.guard, path, FileKind::Code)
            .await?
        else {
            report.skipped += 1;
            return Ok(());
        };

        let Some(plugin) = unit.as_function().cloned() else {
            tracing::warn!(path = %path.display(), "Plugin does not export a callable, skipping");
            report.skipped += 1;
            return Ok(());
        };

        ActiveLoads::scope(path, ctx.sink.register(plugin.clone()))
            .await
            .map_err(PluginError::Sink)?;

        tracing::debug!(path = %path.display(), name = plugin.name(), "Registered plugin");
        report.registered.push(plugin.name().to_string());
        Ok(())
    }

    /// Registers every top-level file in `dir` ending with the primary code
    /// suffix. A failing file is logged and counted; the rest still load.
    async fn register_folder(
        &self,
        ctx: &SourceContext<'_>,
        dir: &Path,
        report: &mut DispatchReport,
    ) -> Result<(), PluginError> {
        let suffix = self
            .loader
            .policy()
            .extensions
            .primary_suffix(FileKind::Code)
            .ok_or(PluginError::NoCodeSuffix)?
            .to_string();

        let files = list_files(dir, &suffix)
            .await
            .map_err(|source| PluginError::ReadFolder {
                path: dir.to_path_buf(),
                source,
            })?;

        for path in files {
            if let Err(e) = self.register_file(ctx, &path, report).await {
                report.failed += 1;
                tracing::error!(path = %path.display(), error = %e, "Failed to load plugin");
            }
        }
        Ok(())
    }
}

struct SourceContext<'a> {
    guard: &'a SelfImportGuard,
    config: &'a PluginsConfig,
    sink: &'a dyn RegistrationSink,
    base_dir: &'a Path,
    resolver: &'a dyn PathResolver,
}

async fn list_files(dir: &Path, suffix: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches_suffix = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.ends_with(suffix));
        if !matches_suffix {
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to stat plugin file");
            }
        }
    }

    Ok(files)
}
