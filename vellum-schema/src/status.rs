//! Migration outcome statuses.

use serde::{Deserialize, Serialize};

/// The outcome kind of a single migration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// The migration was successful.
    Success,
    /// The migration ran but did not succeed.
    Failure,
}

/// The outcome of running one migration, reported by its executor.
///
/// A `Failure` status is not an error path: the job that produced it completed
/// normally, the migration logic itself is what did not succeed. Callers must
/// check the status, not just the absence of an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Whether the migration succeeded.
    pub kind: StatusKind,
    /// An explanatory message; may be empty.
    pub message: String,
}

impl MigrationStatus {
    /// A successful status with no message.
    pub fn success() -> Self {
        Self {
            kind: StatusKind::Success,
            message: String::new(),
        }
    }

    /// A successful status with an explanatory message.
    pub fn success_with(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    /// A failed status with an explanatory message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failure,
            message: message.into(),
        }
    }

    /// Whether this status reports a successful migration.
    pub fn is_success(&self) -> bool {
        self.kind == StatusKind::Success
    }
}
