//! Document models.

use serde::{Deserialize, Serialize};

/// Unsaved content for one document.
///
/// `revision` increases on every write to the same path, so an eviction
/// can tell whether the buffer still holds the content that was saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBuffer {
    pub path: String,
    pub content: String,
    pub revision: u64,
}

/// The document currently shown in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenDocument {
    pub path: String,
    pub content: String,
    /// Content differs from what was last written to the backing store.
    pub dirty: bool,
}

/// One node of the workspace document hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    /// Path relative to the workspace root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: false,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn dir(path: impl Into<String>, children: Vec<TreeEntry>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            children,
        }
    }

    /// File name component of the path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of documents (files) under this entry, including itself.
    #[must_use]
    pub fn document_count(&self) -> usize {
        if self.is_dir {
            self.children.iter().map(Self::document_count).sum()
        } else {
            1
        }
    }

    /// Find the entry for `path` anywhere in `entries`.
    #[must_use]
    pub fn find<'a>(entries: &'a [TreeEntry], path: &str) -> Option<&'a TreeEntry> {
        entries.iter().find_map(|entry| {
            if entry.path == path {
                Some(entry)
            } else if entry.is_dir {
                Self::find(&entry.children, path)
            } else {
                None
            }
        })
    }
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// A new commit was recorded (and pushed, for commit-and-push).
    Committed { message: String },
    /// The working tree was clean.
    NothingToCommit,
}

impl CommitOutcome {
    /// Message reported when there was nothing to commit.
    pub const NOTHING_TO_COMMIT: &'static str = "Nothing to commit";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_entry_name_and_count() {
        let tree = TreeEntry::dir(
            "journal",
            vec![
                TreeEntry::file("journal/monday.md"),
                TreeEntry::dir("journal/old", vec![TreeEntry::file("journal/old/a.md")]),
            ],
        );
        assert_eq!(tree.name(), "journal");
        assert_eq!(tree.children[1].children[0].name(), "a.md");
        assert_eq!(tree.document_count(), 2);

        let roots = vec![tree, TreeEntry::file("todo.md")];
        assert!(TreeEntry::find(&roots, "journal/old/a.md").is_some());
        assert!(TreeEntry::find(&roots, "todo.md").is_some());
        assert!(TreeEntry::find(&roots, "journal/tuesday.md").is_none());
    }

    #[test]
    fn test_commit_outcome_tagging() {
        let json = serde_json::to_value(CommitOutcome::NothingToCommit).unwrap();
        assert_eq!(json["kind"], "nothing_to_commit");
    }
}
