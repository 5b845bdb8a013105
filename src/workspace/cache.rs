//! Unsaved-content cache.
//!
//! Holds the latest in-memory edits for every document that has not been
//! written to the backing store yet. Reopening a document within the same
//! session returns the cached content instead of the on-disk copy.
//!
//! Every write gets a fresh revision number. A save captures the entry's
//! revision when it starts and evicts only if the entry still carries that
//! revision, so an edit made while the save was in flight survives.

use std::collections::HashMap;

use crate::model::DocumentBuffer;

/// Per-document store of unsaved edits, keyed by document path.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, DocumentBuffer>,
    next_revision: u64,
}

impl ContentCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the buffered content for `path`. Returns its revision.
    pub fn put(&mut self, path: &str, content: impl Into<String>) -> u64 {
        self.next_revision += 1;
        let revision = self.next_revision;
        self.entries.insert(
            path.to_string(),
            DocumentBuffer {
                path: path.to_string(),
                content: content.into(),
                revision,
            },
        );
        revision
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(|b| b.content.as_str())
    }

    #[must_use]
    pub fn revision(&self, path: &str) -> Option<u64> {
        self.entries.get(path).map(|b| b.revision)
    }

    /// Drop the entry for `path` unconditionally.
    pub fn delete(&mut self, path: &str) -> Option<DocumentBuffer> {
        self.entries.remove(path)
    }

    /// Drop the entry for `path` only if it is still at `revision`.
    ///
    /// Returns `true` if the entry was removed.
    pub fn evict_if_unchanged(&mut self, path: &str, revision: u64) -> bool {
        if self.revision(path) == Some(revision) {
            self.entries.remove(path);
            true
        } else {
            false
        }
    }

    /// Move the entry for `from` to `to`, keeping its revision.
    pub fn rename(&mut self, from: &str, to: &str) {
        if let Some(mut buffer) = self.entries.remove(from) {
            buffer.path = to.to_string();
            self.entries.insert(to.to_string(), buffer);
        }
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths with unsaved edits, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.entries.keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_is_upsert() {
        let mut cache = ContentCache::new();
        cache.put("note.md", "one");
        cache.put("note.md", "two");

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("note.md"), Some("two"));
        assert_eq!(cache.get("other.md"), None);
    }

    #[test]
    fn test_revisions_increase() {
        let mut cache = ContentCache::new();
        let r1 = cache.put("a.md", "x");
        let r2 = cache.put("b.md", "y");
        let r3 = cache.put("a.md", "z");
        assert!(r1 < r2 && r2 < r3);
        assert_eq!(cache.revision("a.md"), Some(r3));
    }

    #[test]
    fn test_evict_keeps_newer_edit() {
        let mut cache = ContentCache::new();
        let saved = cache.put("note.md", "saved content");
        cache.put("note.md", "typed during save");

        assert!(!cache.evict_if_unchanged("note.md", saved));
        assert_eq!(cache.get("note.md"), Some("typed during save"));

        let latest = cache.revision("note.md").unwrap();
        assert!(cache.evict_if_unchanged("note.md", latest));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_rename_moves_entry() {
        let mut cache = ContentCache::new();
        cache.put("old.md", "draft");
        cache.rename("old.md", "new.md");

        assert!(!cache.contains("old.md"));
        assert_eq!(cache.get("new.md"), Some("draft"));
        assert_eq!(cache.paths(), vec!["new.md".to_string()]);
    }

    #[test]
    fn test_delete() {
        let mut cache = ContentCache::new();
        cache.put("note.md", "x");
        let removed = cache.delete("note.md").unwrap();
        assert_eq!(removed.content, "x");
        assert!(cache.delete("note.md").is_none());
    }
}
