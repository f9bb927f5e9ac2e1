//! The migration manager facade.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};
use vellum_schema::{ExtensionId, MigrationDescriptor};

use crate::error::{MigrateResult, MigrationError};
use crate::executor::ExecutorRegistry;
use crate::graph::DependencyGraph;
use crate::history::{HistoryStore, available_migrations};
use crate::job::{
    BulkMigrationJob, BulkMigrationJobRequest, BulkMigrationJobStatus, JobDispatcher,
    MigrationJobRequest, MigrationJobStatus,
};
use crate::provider::{ProviderRegistry, discover};

/// Configuration for the migration manager.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Record a migration in the history store once it completes with a
    /// success status. Recording failures are logged, never escalated: the
    /// migration did run, and reporting its outcome takes precedence.
    pub record_history: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            record_history: true,
        }
    }
}

impl ManagerConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether successful migrations are recorded in the history store.
    pub fn record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }
}

/// Composes discovery, history gating, ordering and job execution into the
/// public migration API.
///
/// The `apply*` methods look synchronous to the caller even though each
/// migration runs as its own unit of work on the execution facility: they
/// submit and then block until the submitted job reaches a terminal state.
pub struct MigrationManager<H: HistoryStore> {
    config: ManagerConfig,
    registry: Arc<dyn ProviderRegistry>,
    history: H,
    dispatcher: JobDispatcher,
}

impl<H: HistoryStore> MigrationManager<H> {
    /// Create a new migration manager.
    pub fn new(
        config: ManagerConfig,
        registry: Arc<dyn ProviderRegistry>,
        history: H,
        executors: ExecutorRegistry,
    ) -> Self {
        Self {
            config,
            registry,
            history,
            dispatcher: JobDispatcher::new(executors),
        }
    }

    /// Whether the given extension has at least one unapplied migration.
    pub async fn has_available_migrations(&self, extension: &ExtensionId) -> MigrateResult<bool> {
        Ok(!self.get_available_migrations(extension).await?.is_empty())
    }

    /// The discovered migrations for the extension that have not yet been
    /// applied according to the history store.
    pub async fn get_available_migrations(
        &self,
        extension: &ExtensionId,
    ) -> MigrateResult<Vec<MigrationDescriptor>> {
        let discovered = discover(self.registry.as_ref(), extension).await?;
        let applied = self.history.applied_for_version(extension).await?;
        Ok(available_migrations(discovered, &applied))
    }

    /// Run a single migration and return its terminal job status.
    pub async fn apply_migration(
        &self,
        descriptor: &MigrationDescriptor,
    ) -> MigrateResult<MigrationJobStatus> {
        let job = self
            .dispatcher
            .submit(MigrationJobRequest::new(descriptor.clone()))?;
        let status = job.join().await?;

        if self.config.record_history
            && status
                .migration_status
                .as_ref()
                .is_some_and(|s| s.is_success())
        {
            self.record_applied(descriptor).await;
        }

        Ok(status)
    }

    /// Run a set of migrations as a bulk job and return its terminal status.
    ///
    /// Migrations run sequentially in the given order; one migration's
    /// failure does not abort the rest of the batch.
    pub async fn apply_migrations(
        &self,
        descriptors: Vec<MigrationDescriptor>,
    ) -> MigrateResult<BulkMigrationJobStatus> {
        let request = BulkMigrationJobRequest::new(descriptors);
        let descriptors = request.descriptors().to_vec();

        let job = BulkMigrationJob::new(self.dispatcher.clone());
        let handle = tokio::spawn(async move { job.run(request).await });
        let status = handle
            .await
            .map_err(|e| MigrationError::interrupted(e.to_string()))?;

        if self.config.record_history {
            for descriptor in &descriptors {
                let succeeded = status
                    .get(&descriptor.identity())
                    .is_some_and(|s| s.is_success());
                if succeeded {
                    self.record_applied(descriptor).await;
                }
            }
        }

        info!(
            completed = status.len(),
            requested = descriptors.len(),
            "Bulk migration finished"
        );
        Ok(status)
    }

    /// Run a set of migrations in an order satisfying the given dependency
    /// graph.
    ///
    /// Graph nodes outside the candidate set are dropped from the order;
    /// candidates the graph does not know run last, in candidate order.
    pub async fn apply_migrations_ordered(
        &self,
        descriptors: Vec<MigrationDescriptor>,
        graph: &DependencyGraph,
    ) -> MigrateResult<BulkMigrationJobStatus> {
        let candidates: HashSet<_> = descriptors.iter().map(|d| d.identity()).collect();

        let mut ordered: Vec<MigrationDescriptor> = graph
            .compute_order()?
            .into_iter()
            .filter(|descriptor| candidates.contains(&descriptor.identity()))
            .collect();

        for descriptor in descriptors {
            if !graph.contains(&descriptor.identity()) {
                ordered.push(descriptor);
            }
        }

        self.apply_migrations(ordered).await
    }

    /// Apply every available migration for the extension version.
    ///
    /// This is the entry point the upgrade-event listener uses once an
    /// extension has been upgraded.
    pub async fn apply_migrations_for_version(
        &self,
        extension: &ExtensionId,
    ) -> MigrateResult<BulkMigrationJobStatus> {
        let available = self.get_available_migrations(extension).await?;
        self.apply_migrations(available).await
    }

    async fn record_applied(&self, descriptor: &MigrationDescriptor) {
        if let Err(e) = self.history.add_applied(descriptor).await {
            warn!(
                migration = %descriptor.identity(),
                "Failed to record the applied migration in the history store: {e}"
            );
        }
    }
}
