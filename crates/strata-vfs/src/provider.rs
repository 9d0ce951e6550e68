//! Provider capability trait.
//!
//! Every backing store and every decorator implements [`Provider`]. All
//! operations take canonical [`VfsPath`]s; there is no handle state beyond
//! the byte streams returned by the open calls.

use std::collections::HashSet;
use std::io::{Read, Write};

use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;

/// Readable byte stream returned by [`Provider::open_read`].
pub type ReadStream = Box<dyn Read + Send>;

/// Writable byte stream returned by [`Provider::open_write`].
pub type WriteStream = Box<dyn Write + Send>;

/// Uniform capability interface over heterogeneous stores.
///
/// Decorators hold an inner `Arc<dyn Provider>` and compose by delegation.
pub trait Provider: Send + Sync {
    // ========================================================================
    // Reading
    // ========================================================================

    /// Direct children of a directory.
    ///
    /// Fails with [`VfsError::NotADirectory`] if `path` is a file path.
    /// Order is provider-defined.
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>>;

    /// Membership test. Never fails.
    fn exists(&self, path: &VfsPath) -> bool;

    /// Open a file for reading.
    ///
    /// Fails with [`VfsError::NotFound`] if absent and
    /// [`VfsError::IsADirectory`] for directory paths.
    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream>;

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create or truncate a file and open it for writing.
    fn open_write(&self, path: &VfsPath) -> VfsResult<WriteStream>;

    /// Create a directory.
    fn create_directory(&self, path: &VfsPath) -> VfsResult<()>;

    /// Delete a file or directory.
    fn delete(&self, path: &VfsPath) -> VfsResult<()>;

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Release provider-owned resources. Idempotent and best-effort: a
    /// failure is reported but teardown already done stays done.
    fn dispose(&self) -> VfsResult<()>;

    /// Returns true if mutating operations are refused.
    fn read_only(&self) -> bool;

    // ========================================================================
    // Convenience methods (default implementations)
    // ========================================================================

    /// Read a whole file into memory.
    fn read_all(&self, path: &VfsPath) -> VfsResult<Vec<u8>> {
        let mut stream = self.open_read(path)?;
        let mut data = Vec::new();
        stream.read_to_end(&mut data).map_err(VfsError::from_io)?;
        Ok(data)
    }

    /// Replace a file's contents.
    fn write_all(&self, path: &VfsPath, data: &[u8]) -> VfsResult<()> {
        let mut stream = self.open_write(path)?;
        stream.write_all(data).map_err(VfsError::from_io)?;
        stream.flush().map_err(VfsError::from_io)?;
        Ok(())
    }

    /// Every path below `path`, depth first.
    fn walk(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();
        let mut pending = vec![path.clone()];
        while let Some(dir) = pending.pop() {
            for child in self.list_children(&dir)? {
                if !seen.insert(child.clone()) {
                    continue;
                }
                if child.is_directory() {
                    pending.push(child.clone());
                }
                found.push(child);
            }
        }
        Ok(found)
    }
}

/// Reject a file path where a directory is required.
pub fn require_directory(path: &VfsPath) -> VfsResult<()> {
    if path.is_directory() {
        Ok(())
    } else {
        Err(VfsError::not_a_directory(path.to_string()))
    }
}

/// Reject a directory path where a file is required.
pub fn require_file(path: &VfsPath) -> VfsResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(VfsError::is_a_directory(path.to_string()))
    }
}
