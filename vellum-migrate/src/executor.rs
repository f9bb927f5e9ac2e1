//! Migration executors and their dispatch registry.

use std::collections::HashMap;
use std::sync::Arc;

use vellum_schema::{MigrationDescriptor, MigrationKind, MigrationStatus};

use crate::error::MigrateResult;

/// Performs the actual content mutation for one migration kind.
///
/// Executors report the migration outcome as a [`MigrationStatus`]; returning
/// an error means the executor itself broke, which is a different condition
/// from a migration that ran and reported failure.
#[async_trait::async_trait]
pub trait MigrationExecutor: Send + Sync {
    /// Run the migration described by the descriptor.
    async fn execute(&self, descriptor: &MigrationDescriptor) -> MigrateResult<MigrationStatus>;
}

/// Maps migration kinds to the executor that handles them.
///
/// Resolution happens at registration time against the kind tag; there is no
/// runtime type inspection. A kind with no registered executor surfaces as
/// [`MigrationError::ExecutorNotRegistered`](crate::MigrationError::ExecutorNotRegistered)
/// when a job tries to dispatch it.
#[derive(Default, Clone)]
pub struct ExecutorRegistry {
    executors: HashMap<MigrationKind, Arc<dyn MigrationExecutor>>,
}

impl ExecutorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the executor for a migration kind, replacing any previous one.
    pub fn register(&mut self, kind: MigrationKind, executor: Arc<dyn MigrationExecutor>) {
        self.executors.insert(kind, executor);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_executor(mut self, kind: MigrationKind, executor: Arc<dyn MigrationExecutor>) -> Self {
        self.register(kind, executor);
        self
    }

    /// The executor registered for a kind, if any.
    pub fn get(&self, kind: MigrationKind) -> Option<Arc<dyn MigrationExecutor>> {
        self.executors.get(&kind).cloned()
    }
}
