//! Content-derived migration identities.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::extension::ExtensionId;

/// A stable, content-derived identifier for a migration.
///
/// The token is the lowercase hex rendering of a SHA-256 digest over the
/// extension id, migration name and migration description. Two descriptors
/// built independently from the same fields always collide to the same token,
/// which is what lets the history store and the dependency graph deduplicate
/// migrations across processes and machines. A language-default hash would
/// not survive a process restart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Derive the identity token for the given descriptor fields.
    ///
    /// Fields are joined with NUL separators before hashing so that no two
    /// distinct field triples can produce the same byte stream.
    pub fn derive(extension: &ExtensionId, name: &str, description: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(extension.string_form().as_bytes());
        hasher.update([0u8]);
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
        hasher.update(description.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// The hex form of the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extension() -> ExtensionId {
        ExtensionId::new("org.example.blog").with_version("2.1")
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = IdentityToken::derive(&extension(), "rename-class", "Renames the article class");
        let b = IdentityToken::derive(&extension(), "rename-class", "Renames the article class");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_is_sensitive_to_every_field() {
        let base = IdentityToken::derive(&extension(), "rename-class", "desc");

        let other_extension = ExtensionId::new("org.example.forum").with_version("2.1");
        assert_ne!(base, IdentityToken::derive(&other_extension, "rename-class", "desc"));

        let other_version = ExtensionId::new("org.example.blog").with_version("3.0");
        assert_ne!(base, IdentityToken::derive(&other_version, "rename-class", "desc"));

        assert_ne!(base, IdentityToken::derive(&extension(), "drop-class", "desc"));
        assert_ne!(base, IdentityToken::derive(&extension(), "rename-class", "other desc"));
    }

    #[test]
    fn test_separator_prevents_field_bleed() {
        // "ab" + "c" must not collide with "a" + "bc".
        let a = IdentityToken::derive(&ExtensionId::new("x"), "ab", "c");
        let b = IdentityToken::derive(&ExtensionId::new("x"), "a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_is_hex_sha256() {
        let token = IdentityToken::derive(&extension(), "rename-class", "desc");
        assert_eq!(token.as_str().len(), 64);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
