//! Upgrade-event glue: trigger migrations when an extension is upgraded.

use std::sync::Arc;

use tracing::{debug, error};
use vellum_schema::ExtensionId;

use crate::history::HistoryStore;
use crate::manager::MigrationManager;

/// Signal that an installed extension has been upgraded.
#[derive(Debug, Clone)]
pub struct ExtensionUpgradedEvent {
    /// The upgraded extension, with its new version.
    pub extension: ExtensionId,
}

impl ExtensionUpgradedEvent {
    /// Create a new upgrade event.
    pub fn new(extension: ExtensionId) -> Self {
        Self { extension }
    }
}

/// Applies pending migrations in reaction to extension upgrades.
///
/// Any migration error is logged and swallowed so that a failed migration
/// never blocks the upgrade that triggered it.
pub struct UpgradedExtensionListener<H: HistoryStore> {
    manager: Arc<MigrationManager<H>>,
}

impl<H: HistoryStore> UpgradedExtensionListener<H> {
    /// Create a listener over the given manager.
    pub fn new(manager: Arc<MigrationManager<H>>) -> Self {
        Self { manager }
    }

    /// Handle an upgrade event.
    pub async fn on_event(&self, event: &ExtensionUpgradedEvent) {
        match self.manager.has_available_migrations(&event.extension).await {
            Ok(true) => {
                if let Err(e) = self
                    .manager
                    .apply_migrations_for_version(&event.extension)
                    .await
                {
                    error!("Failed to apply extension migrations correctly: {e}");
                }
            }
            Ok(false) => {
                debug!(extension = %event.extension, "No migrations available after upgrade");
            }
            Err(e) => {
                error!("Failed to check for available migrations: {e}");
            }
        }
    }
}
