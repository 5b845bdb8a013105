//! Content hashing for object-storage change detection.
//!
//! Local documents and bucket objects are compared by SHA256 digest, so a
//! push uploads only what changed and a pull downloads only what differs.

use sha2::{Digest, Sha256};

/// Compute the hex SHA256 digest of raw content.
#[must_use]
pub fn content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Check if content has changed relative to a stored copy.
///
/// Returns `true` if there is no stored hash (never uploaded) or the
/// hashes differ.
#[must_use]
pub fn has_changed(current_hash: &str, stored_hash: Option<&str>) -> bool {
    stored_hash.is_none_or(|h| h != current_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_deterministic() {
        let hash1 = content_hash(b"# Groceries");
        let hash2 = content_hash(b"# Groceries");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA256 produces 64 hex chars
    }

    #[test]
    fn test_content_hash_changes_with_content() {
        assert_ne!(content_hash(b"milk"), content_hash(b"milk\n"));
    }

    #[test]
    fn test_has_changed_no_stored_hash() {
        assert!(has_changed("abc123", None));
    }

    #[test]
    fn test_has_changed_different_hash() {
        assert!(has_changed("abc123", Some("xyz789")));
    }

    #[test]
    fn test_has_changed_same_hash() {
        assert!(!has_changed("abc123", Some("abc123")));
    }
}
