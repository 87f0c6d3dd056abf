//! Filesystem-backed artifact store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

use super::ArtifactStore;

/// Artifact store rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a store-relative path to an absolute one.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }
}

impl ArtifactStore for FsStore {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(self.resolve(path)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::MissingArtifact(path.to_path_buf()),
            _ => Error::Io(e),
        })
    }

    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, data)?;
        Ok(())
    }

    fn list(&self, dir: &Path) -> Result<Vec<String>> {
        let entries = match fs::read_dir(self.resolve(dir)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store
            .write(Path::new("docs/books/20240101_000000/viewer.html"), b"<html>")
            .unwrap();

        assert!(store.exists(Path::new("docs/books/20240101_000000")));
        assert_eq!(
            store
                .read(Path::new("docs/books/20240101_000000/viewer.html"))
                .unwrap(),
            b"<html>"
        );
    }

    #[test]
    fn test_read_missing_is_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        let err = store.read(Path::new("output/book.pdf")).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(p) if p == Path::new("output/book.pdf")));
    }

    #[test]
    fn test_list_sorted_and_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write(Path::new("pages/02.png"), b"b").unwrap();
        store.write(Path::new("pages/01.png"), b"a").unwrap();

        assert_eq!(
            store.list(Path::new("pages")).unwrap(),
            vec!["01.png".to_string(), "02.png".to_string()]
        );
        assert!(store.list(Path::new("nothing")).unwrap().is_empty());
    }
}
