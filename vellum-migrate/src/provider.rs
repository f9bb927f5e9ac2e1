//! Migration discovery across pluggable descriptor providers.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::error;
use vellum_schema::{ExtensionId, MigrationDescriptor};

use crate::error::MigrateResult;

/// A source of migration descriptors for an extension.
///
/// Providers match on the extension id only; the version carried by the
/// `ExtensionId` is irrelevant to discovery.
#[async_trait::async_trait]
pub trait DescriptorProvider: Send + Sync {
    /// Get the migration descriptors this provider knows for the extension.
    async fn migrations(
        &self,
        extension: &ExtensionId,
    ) -> MigrateResult<Vec<MigrationDescriptor>>;
}

/// The registry the engine asks for the current set of providers.
///
/// Modeled as its own seam so that a broken registry can be told apart from a
/// broken provider: the registry being unavailable degrades discovery to an
/// empty result, while a provider error fails the whole discovery.
pub trait ProviderRegistry: Send + Sync {
    /// The currently registered providers.
    fn providers(&self) -> MigrateResult<Vec<Arc<dyn DescriptorProvider>>>;
}

/// A fixed, in-process provider registry.
#[derive(Default)]
pub struct StaticProviderRegistry {
    providers: Vec<Arc<dyn DescriptorProvider>>,
}

impl StaticProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider.
    pub fn with_provider(mut self, provider: Arc<dyn DescriptorProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

impl ProviderRegistry for StaticProviderRegistry {
    fn providers(&self) -> MigrateResult<Vec<Arc<dyn DescriptorProvider>>> {
        Ok(self.providers.clone())
    }
}

/// Query every registered provider for the extension and union the results.
///
/// The union is deduplicated by identity, keeping the first occurrence in
/// provider order. A registry lookup failure is logged and yields an empty
/// result so healthy call sites keep working; an error from an individual
/// provider propagates.
pub async fn discover(
    registry: &dyn ProviderRegistry,
    extension: &ExtensionId,
) -> MigrateResult<Vec<MigrationDescriptor>> {
    let providers = match registry.providers() {
        Ok(providers) => providers,
        Err(e) => {
            error!("Failed to retrieve the list of migration descriptor providers: {e}");
            return Ok(Vec::new());
        }
    };

    let mut seen = HashSet::new();
    let mut discovered = Vec::new();
    for provider in providers {
        for descriptor in provider.migrations(extension).await? {
            if seen.insert(descriptor.identity()) {
                discovered.push(descriptor);
            }
        }
    }

    Ok(discovered)
}
