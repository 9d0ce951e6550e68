//! Sub-tree rooting.

use std::sync::Arc;

use crate::error::VfsResult;
use crate::path::VfsPath;
use crate::provider::{Provider, ReadStream, WriteStream, require_directory};

/// Exposes the subtree of `inner` at `root` as a whole provider.
///
/// Incoming paths are rewritten to `root.append_path(path)`; paths coming
/// back from `list_children` are rewritten with `remove_parent(root)`, so
/// callers never see the inner provider's addressing.
///
/// Nesting is transparent: a `SubProvider` at `/b/` over a `SubProvider` at
/// `/a/` behaves like a single one at `/a/b/`.
pub struct SubProvider {
    inner: Arc<dyn Provider>,
    root: VfsPath,
}

impl SubProvider {
    /// Wrap `inner` so that `root` becomes `/`.
    ///
    /// `root` must be a directory path.
    pub fn new(inner: Arc<dyn Provider>, root: VfsPath) -> VfsResult<Self> {
        require_directory(&root)?;
        Ok(Self { inner, root })
    }

    /// The inner provider's path that this provider exposes as `/`.
    pub fn root(&self) -> &VfsPath {
        &self.root
    }

    /// The wrapped provider.
    pub fn inner(&self) -> &Arc<dyn Provider> {
        &self.inner
    }

    fn append_root(&self, path: &VfsPath) -> VfsResult<VfsPath> {
        Ok(self.root.append_path(path)?)
    }

    fn remove_root(&self, path: &VfsPath) -> VfsResult<VfsPath> {
        Ok(path.remove_parent(&self.root)?)
    }
}

impl std::fmt::Debug for SubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubProvider")
            .field("root", &self.root.to_string())
            .finish()
    }
}

impl Provider for SubProvider {
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        require_directory(path)?;
        self.inner
            .list_children(&self.append_root(path)?)?
            .iter()
            .map(|child| self.remove_root(child))
            .collect()
    }

    fn exists(&self, path: &VfsPath) -> bool {
        // The root is always a directory, so appending cannot fail.
        self.append_root(path)
            .is_ok_and(|full| self.inner.exists(&full))
    }

    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        self.inner.open_read(&self.append_root(path)?)
    }

    fn open_write(&self, path: &VfsPath) -> VfsResult<WriteStream> {
        self.inner.open_write(&self.append_root(path)?)
    }

    fn create_directory(&self, path: &VfsPath) -> VfsResult<()> {
        self.inner.create_directory(&self.append_root(path)?)
    }

    fn delete(&self, path: &VfsPath) -> VfsResult<()> {
        self.inner.delete(&self.append_root(path)?)
    }

    fn dispose(&self) -> VfsResult<()> {
        self.inner.dispose()
    }

    fn read_only(&self) -> bool {
        self.inner.read_only()
    }
}
