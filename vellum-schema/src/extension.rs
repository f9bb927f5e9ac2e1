//! Extension identities.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies an installed extension, optionally pinned to a version.
///
/// The version matters for history lookups (applied migrations are recorded
/// per extension version) but not for discovery, which matches on the id only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionId {
    /// The extension identifier, e.g. `org.example.blog`.
    pub id: String,
    /// The extension version, if known.
    pub version: Option<String>,
}

impl ExtensionId {
    /// Create a new extension id without a version.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
        }
    }

    /// Pin this extension id to a version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The canonical string form: `id` alone, or `id/version`.
    ///
    /// This is the form mixed into migration identity tokens, so it must stay
    /// stable across releases.
    pub fn string_form(&self) -> String {
        match &self.version {
            Some(version) => format!("{}/{}", self.id, version),
            None => self.id.clone(),
        }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_form())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_form_without_version() {
        let extension = ExtensionId::new("org.example.blog");
        assert_eq!(extension.string_form(), "org.example.blog");
    }

    #[test]
    fn test_string_form_with_version() {
        let extension = ExtensionId::new("org.example.blog").with_version("2.1");
        assert_eq!(extension.string_form(), "org.example.blog/2.1");
    }

    #[test]
    fn test_display_matches_string_form() {
        let extension = ExtensionId::new("org.example.blog").with_version("2.1");
        assert_eq!(extension.to_string(), extension.string_form());
    }
}
