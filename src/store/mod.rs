//! Artifact repository abstraction.
//!
//! Every stage reads and writes through an [`ArtifactStore`] so the publisher
//! and catalog builder can run against [`MemoryStore`] in tests and against
//! [`FsStore`] in production. Paths are relative to the store root.

mod fs;
mod memory;

pub use fs::FsStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use std::path::Path;

/// Storage for pipeline artifacts.
pub trait ArtifactStore: Send + Sync {
    /// Check whether a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Read a file.
    ///
    /// Returns [`Error::MissingArtifact`] when nothing is stored at `path`.
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a file, creating parent directories as needed.
    fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// List the names of the immediate children of `dir`, sorted.
    ///
    /// A missing directory lists as empty.
    fn list(&self, dir: &Path) -> Result<Vec<String>>;

    /// Read a UTF-8 text file.
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{}: {}", path.display(), e),
            ))
        })
    }

    /// Copy a file byte-for-byte.
    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let data = self.read(from)?;
        self.write(to, &data)
    }
}
