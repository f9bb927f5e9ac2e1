//! Error types for the migration engine.

use thiserror::Error;
use vellum_schema::{IdentityToken, MigrationKind};

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during migration orchestration.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// A descriptor provider failed while being queried.
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// The history store could not be read or written.
    #[error("History store error: {0}")]
    HistoryStore(String),

    /// The dependency graph contains a cycle.
    ///
    /// Carries the identities of the migrations that could not be ordered.
    #[error("Dependency cycle detected among {} migration(s)", remaining.len())]
    CycleDetected {
        /// Identities of the migrations left unordered.
        remaining: Vec<IdentityToken>,
    },

    /// No executor is registered for a migration kind.
    ///
    /// This is a configuration error, distinct from a migration that ran and
    /// reported a failure status.
    #[error("No executor registered for {} migrations", kind.name())]
    ExecutorNotRegistered {
        /// The migration kind that could not be dispatched.
        kind: MigrationKind,
    },

    /// A job could not be submitted to the execution facility.
    #[error("Failed to submit migration job: {0}")]
    Submission(String),

    /// A running job was interrupted before reaching a terminal state.
    #[error("Migration job was interrupted: {0}")]
    Interrupted(String),

    /// An executor raised an error while running a migration.
    #[error("Executor error: {0}")]
    Executor(String),

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Create a discovery error.
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a history store error.
    pub fn history_store(msg: impl Into<String>) -> Self {
        Self::HistoryStore(msg.into())
    }

    /// Create a submission error.
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    /// Create an interruption error.
    pub fn interrupted(msg: impl Into<String>) -> Self {
        Self::Interrupted(msg.into())
    }

    /// Create an executor error.
    pub fn executor(msg: impl Into<String>) -> Self {
        Self::Executor(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_schema::{ExtensionId, IdentityToken};

    #[test]
    fn test_cycle_display_counts_remaining() {
        let extension = ExtensionId::new("org.example.blog");
        let err = MigrationError::CycleDetected {
            remaining: vec![
                IdentityToken::derive(&extension, "a", ""),
                IdentityToken::derive(&extension, "b", ""),
            ],
        };
        assert!(err.to_string().contains("2 migration(s)"));
    }

    #[test]
    fn test_executor_not_registered_names_kind() {
        let err = MigrationError::ExecutorNotRegistered {
            kind: MigrationKind::Property,
        };
        assert!(err.to_string().contains("property"));
    }
}
