//! Blob persistence for the skill progression tree.
//!
//! The tree is persisted as one opaque JSON blob under a fixed logical key.
//! The file-backed store uses file locking and atomic replacement so a crash
//! mid-write never leaves a torn blob behind.

use crate::{Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Logical key the progression tree is stored under
pub const PROGRESSIONS_KEY: &str = "skillProgressions.v1";

/// Opaque key-value blob storage for a single logical key
pub trait BlobStore {
    /// Read the blob, `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<String>>;

    /// Replace the blob
    fn save(&mut self, blob: &str) -> Result<()>;
}

/// Stores the blob as `<dir>/<key>.json`
#[derive(Clone, Debug)]
pub struct FileBlobStore {
    path: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{}.json", key)),
        }
    }

    /// Store for the progression tree inside `dir`
    pub fn progressions(dir: impl AsRef<Path>) -> Self {
        Self::new(dir, PROGRESSIONS_KEY)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BlobStore for FileBlobStore {
    /// Load with a shared lock
    ///
    /// A blob that can't be opened or read is treated as absent and logged.
    fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            tracing::debug!("No blob at {:?}", self.path);
            return Ok(None);
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open blob {:?}: {}. Treating as empty.", self.path, e);
                return Ok(None);
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock blob {:?}: {}. Treating as empty.", self.path, e);
            return Ok(None);
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read blob {:?}: {}. Treating as empty.", self.path, e);
            return Ok(None);
        }

        file.unlock()?;
        tracing::debug!("Loaded {} bytes from {:?}", contents.len(), self.path);
        Ok(Some(contents))
    }

    /// Save atomically by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save(&mut self, blob: &str) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "blob path missing parent")
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(blob.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved blob to {:?}", self.path);
        Ok(())
    }
}

/// In-memory store, mainly for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryBlobStore {
    blob: Option<String>,
    saves: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            saves: 0,
        }
    }

    /// Number of times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.blob.clone())
    }

    fn save(&mut self, blob: &str) -> Result<()> {
        self.blob = Some(blob.to_string());
        self.saves += 1;
        Ok(())
    }
}
