//! Migration history tracking and the availability gate.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use vellum_schema::{ExtensionId, IdentityToken, MigrationDescriptor};

use crate::error::MigrateResult;

/// Store of which migrations have already been applied.
///
/// The engine treats the store's contents purely as opaque identity sets; how
/// and where they are persisted belongs to the embedding platform. Store
/// errors are hard failures: availability cannot be computed without history,
/// and assuming "nothing applied" would rerun migrations.
#[async_trait::async_trait]
pub trait HistoryStore: Send + Sync {
    /// Get the identities of migrations already applied for the given
    /// extension version.
    async fn applied_for_version(
        &self,
        extension: &ExtensionId,
    ) -> MigrateResult<HashSet<IdentityToken>>;

    /// Record a migration as applied for its extension version.
    async fn add_applied(&self, descriptor: &MigrationDescriptor) -> MigrateResult<()>;
}

/// Filter candidates down to the migrations not yet recorded as applied.
///
/// Pure set-difference by identity: candidate order is preserved and neither
/// input is mutated.
pub fn available_migrations(
    candidates: Vec<MigrationDescriptor>,
    applied: &HashSet<IdentityToken>,
) -> Vec<MigrationDescriptor> {
    candidates
        .into_iter()
        .filter(|candidate| !applied.contains(&candidate.identity()))
        .collect()
}

/// An in-process history store.
///
/// Useful for tests and for embedders that do not persist history in a wiki
/// document store. Applied identities are keyed by the extension's versioned
/// string form; an extension without a version has no history.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    applied: RwLock<HashMap<String, HashSet<IdentityToken>>>,
}

impl InMemoryHistoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn applied_for_version(
        &self,
        extension: &ExtensionId,
    ) -> MigrateResult<HashSet<IdentityToken>> {
        if extension.version.is_none() {
            return Ok(HashSet::new());
        }

        Ok(self
            .applied
            .read()
            .get(&extension.string_form())
            .cloned()
            .unwrap_or_default())
    }

    async fn add_applied(&self, descriptor: &MigrationDescriptor) -> MigrateResult<()> {
        self.applied
            .write()
            .entry(descriptor.extension.string_form())
            .or_default()
            .insert(descriptor.identity());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_schema::MigrationParameters;

    fn descriptor(name: &str) -> MigrationDescriptor {
        MigrationDescriptor::new(
            ExtensionId::new("org.example.blog").with_version("2.1"),
            name,
            format!("migration {name}"),
            MigrationParameters::Document {
                reference: format!("Blog.{name}"),
                delete_children: false,
            },
        )
    }

    #[test]
    fn test_gate_is_noop_with_empty_history() {
        let candidates = vec![descriptor("a"), descriptor("b")];
        let filtered = available_migrations(candidates.clone(), &HashSet::new());
        assert_eq!(filtered, candidates);
    }

    #[test]
    fn test_gate_excludes_exactly_the_applied() {
        let candidates = vec![descriptor("a"), descriptor("b"), descriptor("c")];
        let applied: HashSet<_> = [candidates[1].identity()].into();

        let filtered = available_migrations(candidates, &applied);
        let names: Vec<_> = filtered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_in_memory_store_roundtrip() {
        let store = InMemoryHistoryStore::new();
        let migration = descriptor("a");
        let extension = migration.extension.clone();

        assert!(store.applied_for_version(&extension).await.unwrap().is_empty());

        store.add_applied(&migration).await.unwrap();
        let applied = store.applied_for_version(&extension).await.unwrap();
        assert!(applied.contains(&migration.identity()));
        assert_eq!(applied.len(), 1);
    }

    #[tokio::test]
    async fn test_history_is_scoped_per_version() {
        let store = InMemoryHistoryStore::new();
        store.add_applied(&descriptor("a")).await.unwrap();

        let other_version = ExtensionId::new("org.example.blog").with_version("3.0");
        assert!(store.applied_for_version(&other_version).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unversioned_extension_has_no_history() {
        let store = InMemoryHistoryStore::new();
        store.add_applied(&descriptor("a")).await.unwrap();

        let unversioned = ExtensionId::new("org.example.blog");
        assert!(store.applied_for_version(&unversioned).await.unwrap().is_empty());
    }
}
