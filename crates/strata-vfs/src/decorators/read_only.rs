//! Read-only enforcement.

use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;
use crate::provider::{Provider, ReadStream, WriteStream};

/// Forwards reads to `inner` and refuses every mutation with
/// [`VfsError::ReadOnly`] without calling into `inner`.
pub struct ReadOnlyProvider {
    inner: Arc<dyn Provider>,
}

impl ReadOnlyProvider {
    /// Wrap `inner`.
    pub fn new(inner: Arc<dyn Provider>) -> Self {
        Self { inner }
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &Arc<dyn Provider> {
        &self.inner
    }
}

impl std::fmt::Debug for ReadOnlyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadOnlyProvider").finish_non_exhaustive()
    }
}

impl Provider for ReadOnlyProvider {
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        self.inner.list_children(path)
    }

    fn exists(&self, path: &VfsPath) -> bool {
        self.inner.exists(path)
    }

    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        self.inner.open_read(path)
    }

    fn open_write(&self, _path: &VfsPath) -> VfsResult<WriteStream> {
        Err(VfsError::ReadOnly)
    }

    fn create_directory(&self, _path: &VfsPath) -> VfsResult<()> {
        Err(VfsError::ReadOnly)
    }

    fn delete(&self, _path: &VfsPath) -> VfsResult<()> {
        Err(VfsError::ReadOnly)
    }

    fn dispose(&self) -> VfsResult<()> {
        self.inner.dispose()
    }

    fn read_only(&self) -> bool {
        true
    }
}
