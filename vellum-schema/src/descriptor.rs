//! Migration descriptors and their typed parameter bundles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extension::ExtensionId;
use crate::identity::IdentityToken;

/// The kinds of structural migration the platform ships.
///
/// Executors are registered against a kind, so dispatch is a table lookup
/// rather than a runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MigrationKind {
    /// Remap objects from one class to another.
    Class,
    /// Delete documents.
    Document,
    /// Convert a property from one type to another.
    Property,
}

impl MigrationKind {
    /// A short name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Document => "document",
            Self::Property => "property",
        }
    }
}

/// The typed parameter bundle of a migration, one variant per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MigrationParameters {
    /// Remap objects of `old_class` to `new_class`.
    Class {
        /// Reference to the class being migrated away from.
        old_class: String,
        /// Reference to the class being migrated to.
        new_class: String,
        /// Remove the old class once its objects have been remapped.
        remove_old_class: bool,
        /// Remove the old objects instead of carrying them over.
        remove_old_objects: bool,
        /// Property-name mapping from old class to new class.
        properties_mapping: BTreeMap<String, String>,
    },
    /// Delete the referenced document.
    Document {
        /// Reference to the document to delete.
        reference: String,
        /// Also delete child documents.
        delete_children: bool,
    },
    /// Convert a property of a class to a new type.
    Property {
        /// Reference to the class holding the property.
        class_reference: String,
        /// The property to convert.
        property_name: String,
        /// The current property type.
        old_type: String,
        /// The target property type.
        new_type: String,
    },
}

impl MigrationParameters {
    /// The migration kind this parameter bundle belongs to.
    pub fn kind(&self) -> MigrationKind {
        match self {
            Self::Class { .. } => MigrationKind::Class,
            Self::Document { .. } => MigrationKind::Document,
            Self::Property { .. } => MigrationKind::Property,
        }
    }
}

/// Describes one migration: which extension owns it, what it is called, what
/// it does, and the parameters its executor needs.
///
/// Descriptors are immutable value objects produced by descriptor providers
/// and live only for a single discovery/execution cycle.
///
/// The identity is derived from the extension, name and description only.
/// Two migrations that differ solely in their parameter payload share an
/// identity, so anything that changes a migration's semantics must be encoded
/// in its name or description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationDescriptor {
    /// The extension this migration belongs to.
    pub extension: ExtensionId,
    /// Human-readable migration name, expected (but not guaranteed) unique.
    pub name: String,
    /// What the migration does. Mixed into the identity as a safety net for
    /// name collisions.
    pub description: String,
    /// The typed parameter bundle for this migration's kind.
    pub parameters: MigrationParameters,
}

impl MigrationDescriptor {
    /// Create a new migration descriptor.
    pub fn new(
        extension: ExtensionId,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: MigrationParameters,
    ) -> Self {
        Self {
            extension,
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// The migration kind, derived from the parameter bundle.
    pub fn kind(&self) -> MigrationKind {
        self.parameters.kind()
    }

    /// Derive the stable identity token for this descriptor.
    pub fn identity(&self) -> IdentityToken {
        IdentityToken::derive(&self.extension, &self.name, &self.description)
    }
}
