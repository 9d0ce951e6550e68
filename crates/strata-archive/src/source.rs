//! Backing archive engines.

use std::io::Write;

use strata_vfs::{VfsError, VfsResult};

/// One record of an archive's catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Name as stored in the archive, native separators included.
    pub name: String,
    /// Entry is flagged as a directory.
    pub is_dir: bool,
    /// Uncompressed size in bytes.
    pub size: u64,
}

impl ArchiveEntry {
    /// A file entry.
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            size,
        }
    }

    /// A directory entry.
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            size: 0,
        }
    }
}

/// A pull-based extraction engine: list the catalogue, then decompress a
/// named entry into a sink.
///
/// A source that can [`fork`](Self::fork) gives every read stream an engine
/// of its own. One that cannot is shared, and its extractions run one at a
/// time.
pub trait ArchiveSource: Send {
    /// The full catalogue.
    fn entries(&mut self) -> VfsResult<Vec<ArchiveEntry>>;

    /// Decompress entry `name` (native spelling) into `sink`.
    fn extract(&mut self, name: &str, sink: &mut dyn Write) -> VfsResult<()>;

    /// Whether [`fork`](Self::fork) is supported.
    fn can_fork(&self) -> bool {
        false
    }

    /// An independent engine over the same archive.
    fn fork(&self) -> VfsResult<Box<dyn ArchiveSource>> {
        Err(VfsError::unsupported("archive source cannot be forked"))
    }

    /// Release the underlying handle.
    fn close(&mut self) -> VfsResult<()> {
        Ok(())
    }
}
