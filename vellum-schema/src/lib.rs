//! # vellum-schema
//!
//! Migration descriptor model for the Vellum extension migrator.
//!
//! This crate provides:
//! - Extension identities (`ExtensionId`)
//! - Migration descriptors and their typed parameter bundles
//! - Content-derived identity tokens used for deduplication and history lookups
//! - Migration outcome statuses
//!
//! ## Example
//!
//! ```rust
//! use vellum_schema::{ExtensionId, MigrationDescriptor, MigrationParameters};
//!
//! let extension = ExtensionId::new("org.example.blog").with_version("2.1");
//!
//! let descriptor = MigrationDescriptor::new(
//!     extension,
//!     "migrate-article-class",
//!     "Move articles from BlogArticleClass to ArticleClass",
//!     MigrationParameters::Class {
//!         old_class: "Blog.BlogArticleClass".into(),
//!         new_class: "Blog.ArticleClass".into(),
//!         remove_old_class: true,
//!         remove_old_objects: false,
//!         properties_mapping: Default::default(),
//!     },
//! );
//!
//! // The identity is derived from the descriptor content, not object identity.
//! assert_eq!(descriptor.identity(), descriptor.clone().identity());
//! ```

pub mod descriptor;
pub mod extension;
pub mod identity;
pub mod status;

pub use descriptor::{MigrationDescriptor, MigrationKind, MigrationParameters};
pub use extension::ExtensionId;
pub use identity::IdentityToken;
pub use status::{MigrationStatus, StatusKind};
