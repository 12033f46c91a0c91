use std::sync::Arc;

use async_trait::async_trait;

use super::PluginsConfig;
use crate::common::BoxError;
use crate::module::PluginFn;

/// The host application component that accepts loaded plugins.
#[async_trait]
pub trait RegistrationSink: Send + Sync {
    async fn register(&self, plugin: Arc<dyn PluginFn>) -> Result<(), BoxError>;
}

#[async_trait]
impl<T: RegistrationSink + ?Sized> RegistrationSink for Arc<T> {
    async fn register(&self, plugin: Arc<dyn PluginFn>) -> Result<(), BoxError> {
        (**self).register(plugin).await
    }
}

/// Handler behind an `inline` plugin source.
#[async_trait]
pub trait InlineHandler: Send + Sync {
    async fn handle(
        &self,
        sink: &dyn RegistrationSink,
        config: &PluginsConfig,
    ) -> Result<(), BoxError>;
}
