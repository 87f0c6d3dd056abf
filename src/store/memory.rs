//! In-memory artifact store.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

use super::ArtifactStore;

/// Artifact store kept entirely in memory.
///
/// Directories are not stored; a directory exists when some file lies below it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files().len()
    }

    /// Check if the store holds no files.
    pub fn is_empty(&self) -> bool {
        self.files().is_empty()
    }

    /// All stored file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files().keys().cloned().collect()
    }

    /// Remove a file. Returns whether it existed.
    pub fn remove(&self, path: &Path) -> bool {
        self.files().remove(path).is_some()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ArtifactStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        let files = self.files();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::MissingArtifact(path.to_path_buf()))
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.files().insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>> {
        let files = self.files();
        let names: BTreeSet<String> = files
            .keys()
            .filter_map(|k| k.strip_prefix(dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directories_are_implied() {
        let store = MemoryStore::new();
        store
            .write(Path::new("docs/books/a/book_plan.json"), b"{}")
            .unwrap();

        assert!(store.exists(Path::new("docs/books/a")));
        assert!(store.exists(Path::new("docs")));
        assert!(!store.exists(Path::new("docs/books/b")));
    }

    #[test]
    fn test_list_immediate_children() {
        let store = MemoryStore::new();
        store.write(Path::new("books/b/viewer.html"), b"").unwrap();
        store.write(Path::new("books/a/pages/01.png"), b"").unwrap();
        store.write(Path::new("books/a/viewer.html"), b"").unwrap();
        store.write(Path::new("books/readme.txt"), b"").unwrap();

        assert_eq!(
            store.list(Path::new("books")).unwrap(),
            vec!["a".to_string(), "b".to_string(), "readme.txt".to_string()]
        );
        assert_eq!(
            store.list(Path::new("books/a")).unwrap(),
            vec!["pages".to_string(), "viewer.html".to_string()]
        );
    }

    #[test]
    fn test_overwrite_and_remove() {
        let store = MemoryStore::new();
        store.write(Path::new("x"), b"1").unwrap();
        store.write(Path::new("x"), b"2").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.read(Path::new("x")).unwrap(), b"2");

        assert!(store.remove(Path::new("x")));
        assert!(store.is_empty());
    }
}
