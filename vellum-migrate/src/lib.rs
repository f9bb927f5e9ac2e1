//! # vellum-migrate
//!
//! Migration orchestration engine for the Vellum extension migrator.
//!
//! When an installed wiki extension is upgraded, its pending structural
//! migrations are discovered, filtered against the history of what already
//! ran, optionally ordered along declared dependencies, and executed as jobs.
//! This crate provides:
//! - Discovery aggregation across pluggable descriptor providers
//! - The history gate that keeps applied migrations from running twice
//! - A dependency graph with topological ordering and cycle reporting
//! - The job pipeline (single migration and bulk, with per-item isolation)
//! - The migration manager facade and the upgrade-event listener
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │  Providers    │───▶│ History Gate │───▶│ Dependency Graph│
//! └───────────────┘    └──────────────┘    └─────────────────┘
//!                                                   │
//!                                                   ▼
//! ┌───────────────┐    ┌──────────────┐    ┌─────────────────┐
//! │ History Store │◀───│   Manager    │───▶│ Migration Jobs  │
//! └───────────────┘    └──────────────┘    └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vellum_migrate::{
//!     ExecutorRegistry, InMemoryHistoryStore, ManagerConfig, MigrationManager,
//!     StaticProviderRegistry,
//! };
//! use vellum_schema::{ExtensionId, MigrationKind};
//!
//! let registry = Arc::new(
//!     StaticProviderRegistry::new().with_provider(my_provider),
//! );
//! let executors = ExecutorRegistry::new()
//!     .with_executor(MigrationKind::Class, my_class_executor);
//!
//! let manager = MigrationManager::new(
//!     ManagerConfig::new(),
//!     registry,
//!     InMemoryHistoryStore::new(),
//!     executors,
//! );
//!
//! let extension = ExtensionId::new("org.example.blog").with_version("2.1");
//! let status = manager.apply_migrations_for_version(&extension).await?;
//! println!("{} migrations completed", status.len());
//! ```

pub mod error;
pub mod executor;
pub mod graph;
pub mod history;
pub mod job;
pub mod listener;
pub mod manager;
pub mod provider;

// Re-exports
pub use error::{MigrateResult, MigrationError};
pub use executor::{ExecutorRegistry, MigrationExecutor};
pub use graph::DependencyGraph;
pub use history::{HistoryStore, InMemoryHistoryStore, available_migrations};
pub use job::{
    BulkMigrationJob, BulkMigrationJobRequest, BulkMigrationJobStatus, JobDispatcher, JobState,
    MigrationJob, MigrationJobRequest, MigrationJobStatus,
};
pub use listener::{ExtensionUpgradedEvent, UpgradedExtensionListener};
pub use manager::{ManagerConfig, MigrationManager};
pub use provider::{DescriptorProvider, ProviderRegistry, StaticProviderRegistry, discover};
