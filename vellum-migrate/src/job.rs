//! Job-based migration execution, single and bulk.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error};
use vellum_schema::{IdentityToken, MigrationDescriptor, MigrationStatus};

use crate::error::{MigrateResult, MigrationError};
use crate::executor::ExecutorRegistry;

/// Lifecycle of a migration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// The job has been created but not yet submitted.
    Created,
    /// The job is running on the execution facility.
    Running,
    /// The job ran its migration to completion; the migration status says
    /// whether the migration itself succeeded.
    Finished,
    /// The job broke before producing a migration status.
    Failed,
}

/// Request to run exactly one migration.
#[derive(Debug, Clone)]
pub struct MigrationJobRequest {
    /// The migration to run.
    pub descriptor: MigrationDescriptor,
}

impl MigrationJobRequest {
    /// Create a request for the given migration.
    pub fn new(descriptor: MigrationDescriptor) -> Self {
        Self { descriptor }
    }
}

/// Terminal status of a single-migration job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationJobStatus {
    /// Lifecycle state the job ended in.
    pub state: JobState,
    /// The status reported by the executor, present once the job finished.
    pub migration_status: Option<MigrationStatus>,
}

/// Handle on a submitted migration job.
///
/// The job runs on its own task; [`join`](Self::join) blocks the caller until
/// it reaches a terminal state.
pub struct MigrationJob {
    identity: IdentityToken,
    handle: JoinHandle<MigrateResult<MigrationStatus>>,
}

impl MigrationJob {
    /// Identity of the migration this job runs.
    pub fn identity(&self) -> &IdentityToken {
        &self.identity
    }

    /// Wait for the job to reach a terminal state.
    ///
    /// Returns the finished status, or the error that failed the job: an
    /// unregistered executor kind, an executor error, or an interruption of
    /// the underlying task.
    pub async fn join(self) -> MigrateResult<MigrationJobStatus> {
        let migration_status = self
            .handle
            .await
            .map_err(|e| MigrationError::interrupted(e.to_string()))??;

        Ok(MigrationJobStatus {
            state: JobState::Finished,
            migration_status: Some(migration_status),
        })
    }
}

/// The job execution facility: submits each migration as its own unit of work.
#[derive(Clone)]
pub struct JobDispatcher {
    executors: Arc<ExecutorRegistry>,
}

impl JobDispatcher {
    /// Create a dispatcher over the given executor registry.
    pub fn new(executors: ExecutorRegistry) -> Self {
        Self {
            executors: Arc::new(executors),
        }
    }

    /// Submit a single-migration job.
    ///
    /// The executor for the descriptor's kind is resolved inside the job; a
    /// kind with no registered executor fails the job with a configuration
    /// error rather than a migration failure.
    pub fn submit(&self, request: MigrationJobRequest) -> MigrateResult<MigrationJob> {
        let identity = request.descriptor.identity();
        let executors = Arc::clone(&self.executors);

        let handle = tokio::spawn(async move {
            let descriptor = request.descriptor;
            let executor = executors
                .get(descriptor.kind())
                .ok_or(MigrationError::ExecutorNotRegistered {
                    kind: descriptor.kind(),
                })?;

            debug!(migration = %descriptor.identity(), "Running migration");
            executor.execute(&descriptor).await
        });

        Ok(MigrationJob { identity, handle })
    }
}

/// Request to run a set of migrations.
///
/// Descriptors are deduplicated by identity, keeping the first occurrence in
/// the given order.
#[derive(Debug, Clone)]
pub struct BulkMigrationJobRequest {
    descriptors: Vec<MigrationDescriptor>,
}

impl BulkMigrationJobRequest {
    /// Create a bulk request from the given descriptors.
    pub fn new(descriptors: Vec<MigrationDescriptor>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let descriptors = descriptors
            .into_iter()
            .filter(|descriptor| seen.insert(descriptor.identity()))
            .collect();
        Self { descriptors }
    }

    /// The migrations to run, in execution order.
    pub fn descriptors(&self) -> &[MigrationDescriptor] {
        &self.descriptors
    }
}

/// Accumulating status of a bulk migration job.
///
/// Maps each migration identity to the status its run reported. Entries are
/// added incrementally as migrations complete and never removed, so a clone
/// of this status held by an observer sees progress while the job runs.
///
/// A migration absent from the map did not complete (its job failed to launch
/// or to join); that is distinct from a recorded failure status, which means
/// the migration ran and reported failure.
#[derive(Clone, Default)]
pub struct BulkMigrationJobStatus {
    statuses: Arc<RwLock<IndexMap<IdentityToken, MigrationStatus>>>,
}

impl BulkMigrationJobStatus {
    fn new() -> Self {
        Self::default()
    }

    fn record(&self, identity: IdentityToken, status: MigrationStatus) {
        self.statuses.write().insert(identity, status);
    }

    /// The recorded status for a migration, if it completed.
    pub fn get(&self, identity: &IdentityToken) -> Option<MigrationStatus> {
        self.statuses.read().get(identity).cloned()
    }

    /// Snapshot of the identity-to-status map, in completion order.
    pub fn snapshot(&self) -> IndexMap<IdentityToken, MigrationStatus> {
        self.statuses.read().clone()
    }

    /// Number of migrations that have completed so far.
    pub fn len(&self) -> usize {
        self.statuses.read().len()
    }

    /// Whether no migration has completed yet.
    pub fn is_empty(&self) -> bool {
        self.statuses.read().is_empty()
    }
}

/// Runs a set of migrations by delegating each one to a single-migration job.
///
/// The loop is sequential by design: each sub-job is joined before the next
/// descriptor is submitted, preserving any ordering the caller baked into the
/// request. One migration's launch or join failure is logged and skipped; it
/// never aborts the rest of the batch.
pub struct BulkMigrationJob {
    dispatcher: JobDispatcher,
    status: BulkMigrationJobStatus,
}

impl BulkMigrationJob {
    /// Create a bulk job over the given dispatcher.
    pub fn new(dispatcher: JobDispatcher) -> Self {
        Self {
            dispatcher,
            status: BulkMigrationJobStatus::new(),
        }
    }

    /// A handle on this job's accumulating status, for progress observers.
    pub fn status(&self) -> BulkMigrationJobStatus {
        self.status.clone()
    }

    /// Run every migration in the request, sequentially.
    pub async fn run(&self, request: BulkMigrationJobRequest) -> BulkMigrationJobStatus {
        for descriptor in request.descriptors() {
            let identity = descriptor.identity();

            let job = match self
                .dispatcher
                .submit(MigrationJobRequest::new(descriptor.clone()))
            {
                Ok(job) => job,
                Err(e) => {
                    error!(migration = %identity, "Failed to submit the migration job: {e}");
                    continue;
                }
            };

            match job.join().await {
                Ok(job_status) => {
                    if let Some(migration_status) = job_status.migration_status {
                        self.status.record(identity, migration_status);
                    }
                }
                Err(e) => {
                    error!(migration = %identity, "An error occurred while running the migration: {e}");
                }
            }
        }

        self.status.clone()
    }
}
