//! On-disk archive cache
//!
//! One file per synset, `<root>/<synset>.tar`. Presence of the file is the
//! only validity check. Downloads stream into a temporary sibling that is
//! renamed into place once complete, so a reader never observes a partial
//! archive and concurrent writers of the same synset both leave a complete
//! file behind.

use crate::error::{ArchiveError, ArchiveResult};
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "tar";

/// Directory of downloaded synset archives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveCache {
    root: PathBuf,
}

impl ArchiveCache {
    /// Create cache rooted at `root`
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the archive for `synset`
    #[inline]
    #[must_use]
    pub fn archive_path(&self, synset: &str) -> PathBuf {
        self.root.join(format!("{synset}.{ARCHIVE_EXTENSION}"))
    }

    /// Check if the archive for `synset` is present
    #[inline]
    #[must_use]
    pub fn contains(&self, synset: &str) -> bool {
        self.archive_path(synset).is_file()
    }
}

/// blake3 digest of a stored archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveDigest([u8; 32]);

impl ArchiveDigest {
    /// Hash archive bytes
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Raw digest bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 8 bytes as hex, for logs
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ArchiveDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Archive being downloaded, not yet visible at its final path
///
/// Dropping it without [`commit`](Self::commit) removes the temporary file.
pub struct PartialArchive {
    file: NamedTempFile,
    destination: PathBuf,
    hasher: blake3::Hasher,
    len: u64,
}

impl PartialArchive {
    /// Start a download for `destination`, creating its directory if needed
    ///
    /// # Errors
    /// Returns [`ArchiveError::Io`] if the directory or temporary file cannot
    /// be created
    pub fn create(destination: &Path) -> ArchiveResult<Self> {
        let dir = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| ArchiveError::io_error(dir, e))?;
        let file = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| ArchiveError::io_error(dir, e))?;
        Ok(Self {
            file,
            destination: destination.to_path_buf(),
            hasher: blake3::Hasher::new(),
            len: 0,
        })
    }

    /// Append a chunk of the response body
    ///
    /// # Errors
    /// Returns the underlying write error
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk)?;
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Bytes written so far
    #[inline]
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Check if nothing has been written
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Final path of the archive
    #[inline]
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Flush to disk and rename into place, replacing any existing file
    ///
    /// # Errors
    /// Returns [`ArchiveError::Io`] if the sync or rename fails. On error no
    /// file is left at the destination.
    pub fn commit(self) -> ArchiveResult<(u64, ArchiveDigest)> {
        let Self {
            mut file,
            destination,
            hasher,
            len,
        } = self;
        file.flush()
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| ArchiveError::io_error(file.path(), e))?;
        file.persist(&destination)
            .map_err(|e| ArchiveError::io_error(&destination, e.error))?;
        Ok((len, ArchiveDigest(*hasher.finalize().as_bytes())))
    }
}
