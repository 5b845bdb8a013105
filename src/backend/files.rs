//! Document files on disk.
//!
//! Every backend keeps its working copy as plain files under a root
//! directory. This module owns that layout:
//! - Path validation (relative, no `..`, no hidden components)
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Tree listing that skips dot-directories such as `.git`
//!
//! Everything here is blocking; backends run it through [`super::blocking`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::{ApiError, ApiResult};
use crate::model::TreeEntry;

/// Plain-file document store rooted at a directory.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a workspace-relative document path to an absolute one.
    ///
    /// # Errors
    ///
    /// Rejects empty, absolute, parent-relative, and hidden paths.
    pub fn resolve(&self, rel: &str) -> ApiResult<PathBuf> {
        validate_document_path(rel)?;
        Ok(self.root.join(rel))
    }

    pub fn read(&self, rel: &str) -> ApiResult<String> {
        let path = self.resolve(rel)?;
        if !path.is_file() {
            return Err(ApiError::new(format!("Document not found: {rel}")));
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn write(&self, rel: &str, content: &str) -> ApiResult<()> {
        let path = self.resolve(rel)?;
        atomic_write(&path, content.as_bytes())?;
        Ok(())
    }

    pub fn delete(&self, rel: &str) -> ApiResult<()> {
        let path = self.resolve(rel)?;
        if !path.exists() {
            return Err(ApiError::new(format!("Document not found: {rel}")));
        }
        fs::remove_file(&path)?;
        prune_empty_parents(&self.root, &path);
        Ok(())
    }

    pub fn rename(&self, from: &str, to: &str) -> ApiResult<()> {
        let src = self.resolve(from)?;
        let dst = self.resolve(to)?;
        if !src.is_file() {
            return Err(ApiError::new(format!("Document not found: {from}")));
        }
        if dst.exists() {
            return Err(ApiError::new(format!("A document already exists at {to}")));
        }
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(&src, &dst)?;
        prune_empty_parents(&self.root, &src);
        Ok(())
    }

    /// Hierarchy of documents under the root, directories first, then by name.
    pub fn list_tree(&self) -> ApiResult<Vec<TreeEntry>> {
        if !self.root.is_dir() {
            return Err(ApiError::new(format!(
                "Workspace not found: {}",
                self.root.display()
            )));
        }
        Ok(walk_tree(&self.root, "")?)
    }

    /// Flat list of every document path, sorted.
    pub fn list_files(&self) -> ApiResult<Vec<String>> {
        let mut out = Vec::new();
        flatten(&self.list_tree()?, &mut out);
        out.sort();
        Ok(out)
    }
}

/// Check that a document path stays inside the workspace.
pub fn validate_document_path(rel: &str) -> ApiResult<()> {
    if rel.trim().is_empty() {
        return Err(ApiError::new("Document path is empty"));
    }
    let path = Path::new(rel);
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                if part.to_string_lossy().starts_with('.') {
                    return Err(ApiError::new(format!("Hidden paths are not documents: {rel}")));
                }
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ApiError::new(format!(
                    "Document path must stay inside the workspace: {rel}"
                )));
            }
        }
    }
    Ok(())
}

/// Write content to a file atomically.
///
/// 1. Writes content to a sibling temp file
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)
}

fn walk_tree(dir: &Path, prefix: &str) -> std::io::Result<Vec<TreeEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let rel = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };

        if entry.file_type()?.is_dir() {
            let children = walk_tree(&entry.path(), &rel)?;
            dirs.push(TreeEntry::dir(rel, children));
        } else {
            files.push(TreeEntry::file(rel));
        }
    }

    dirs.sort_by(|a, b| a.path.cmp(&b.path));
    files.sort_by(|a, b| a.path.cmp(&b.path));
    dirs.extend(files);
    Ok(dirs)
}

fn flatten(entries: &[TreeEntry], out: &mut Vec<String>) {
    for entry in entries {
        if entry.is_dir {
            flatten(&entry.children, out);
        } else {
            out.push(entry.path.clone());
        }
    }
}

/// Remove now-empty directories between `removed` and `root`.
fn prune_empty_parents(root: &Path, removed: &Path) {
    let mut dir = removed.parent();
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) {
            break;
        }
        // remove_dir fails on non-empty directories, which ends the walk
        if fs::remove_dir(current).is_err() {
            break;
        }
        dir = current.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_document_path() {
        assert!(validate_document_path("note.md").is_ok());
        assert!(validate_document_path("journal/2026/oct.md").is_ok());
        assert!(validate_document_path("").is_err());
        assert!(validate_document_path("../escape.md").is_err());
        assert!(validate_document_path("/etc/passwd").is_err());
        assert!(validate_document_path(".git/config").is_err());
    }

    #[test]
    fn test_write_read_roundtrip_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());

        store.write("journal/today.md", "# Today").unwrap();
        assert_eq!(store.read("journal/today.md").unwrap(), "# Today");

        let names: Vec<_> = fs::read_dir(temp.path().join("journal"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["today.md".to_string()]);
    }

    #[test]
    fn test_list_tree_skips_hidden_and_sorts_dirs_first() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());
        store.write("b.md", "b").unwrap();
        store.write("a/inner.md", "i").unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::write(temp.path().join(".git/HEAD"), "ref").unwrap();

        let tree = store.list_tree().unwrap();
        assert_eq!(tree.len(), 2);
        assert!(tree[0].is_dir);
        assert_eq!(tree[0].path, "a");
        assert_eq!(tree[0].children[0].path, "a/inner.md");
        assert_eq!(tree[1].path, "b.md");

        assert_eq!(store.list_files().unwrap(), vec!["a/inner.md", "b.md"]);
    }

    #[test]
    fn test_rename_and_delete_prune_empty_dirs() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());
        store.write("drafts/idea.md", "idea").unwrap();

        store.rename("drafts/idea.md", "ideas/idea.md").unwrap();
        assert!(!temp.path().join("drafts").exists());
        assert_eq!(store.read("ideas/idea.md").unwrap(), "idea");

        store.delete("ideas/idea.md").unwrap();
        assert!(!temp.path().join("ideas").exists());
        assert!(temp.path().exists());
    }

    #[test]
    fn test_rename_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::new(temp.path());
        store.write("a.md", "a").unwrap();
        store.write("b.md", "b").unwrap();

        let err = store.rename("a.md", "b.md").unwrap_err();
        assert!(err.message_or("").contains("already exists"));
        assert_eq!(store.read("b.md").unwrap(), "b");
    }
}
