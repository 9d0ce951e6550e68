//! In-memory provider.
//!
//! Used for scratch space and testing. All data is ephemeral.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::io::{self, Cursor, Write};
use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;
use crate::provider::{Provider, ReadStream, WriteStream, require_directory, require_file};

type FileData = Arc<Mutex<Vec<u8>>>;

/// Entry in the memory filesystem.
#[derive(Debug, Clone)]
enum Entry {
    File(FileData),
    Directory,
}

/// In-memory provider with full mutation support.
///
/// Thread-safe via an internal `RwLock`. Writing a file creates any
/// missing ancestor directories. A name is either a file or a directory:
/// `/a` and `/a/` cannot both exist.
#[derive(Debug)]
pub struct MemoryProvider {
    entries: RwLock<HashMap<VfsPath, Entry>>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    /// Create an empty filesystem holding only the root directory.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Self::fresh()),
        }
    }

    fn fresh() -> HashMap<VfsPath, Entry> {
        let mut entries = HashMap::new();
        // Root directory always exists
        entries.insert(VfsPath::root(), Entry::Directory);
        entries
    }

    /// Number of entities, the root included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// The same name with the opposite directory flag (`/a` <-> `/a/`).
    fn counterpart(path: &VfsPath) -> Option<VfsPath> {
        if path.is_root() {
            return None;
        }
        let parent = path.parent().ok()?;
        let name = path.entity_name()?;
        if path.is_directory() {
            parent.append_file(name).ok()
        } else {
            parent.append_directory(name).ok()
        }
    }

    /// Ensure all ancestor directories exist.
    fn ensure_parents(entries: &mut HashMap<VfsPath, Entry>, path: &VfsPath) -> VfsResult<()> {
        let mut ancestors: Vec<_> = path.ancestors().collect();
        ancestors.reverse();
        for dir in ancestors {
            if let Some(file) = Self::counterpart(&dir) {
                if entries.contains_key(&file) {
                    return Err(VfsError::not_a_directory(file.to_string()));
                }
            }
            entries.entry(dir).or_insert(Entry::Directory);
        }
        Ok(())
    }
}

impl Provider for MemoryProvider {
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        require_directory(path)?;
        let entries = self.entries.read();
        if !entries.contains_key(path) {
            return Err(VfsError::not_found(path.to_string()));
        }

        let mut children: Vec<VfsPath> = entries
            .keys()
            .filter(|candidate| candidate.parent().is_ok_and(|parent| &parent == path))
            .cloned()
            .collect();

        // Sort for consistent ordering
        children.sort();
        Ok(children)
    }

    fn exists(&self, path: &VfsPath) -> bool {
        self.entries.read().contains_key(path)
    }

    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        require_file(path)?;
        let entries = self.entries.read();
        match entries.get(path) {
            Some(Entry::File(data)) => {
                let snapshot = data.lock().clone();
                Ok(Box::new(Cursor::new(snapshot)))
            }
            Some(Entry::Directory) => Err(VfsError::is_a_directory(path.to_string())),
            None => Err(VfsError::not_found(path.to_string())),
        }
    }

    fn open_write(&self, path: &VfsPath) -> VfsResult<WriteStream> {
        require_file(path)?;
        let mut entries = self.entries.write();

        if let Some(dir) = Self::counterpart(path) {
            if entries.contains_key(&dir) {
                return Err(VfsError::is_a_directory(dir.to_string()));
            }
        }

        // Ensure parent directories exist
        Self::ensure_parents(&mut entries, path)?;

        let data = match entries.get(path) {
            Some(Entry::File(data)) => {
                data.lock().clear();
                Arc::clone(data)
            }
            _ => {
                let data: FileData = Arc::new(Mutex::new(Vec::new()));
                entries.insert(path.clone(), Entry::File(Arc::clone(&data)));
                data
            }
        };

        tracing::trace!(path = %path, "opened memory file for writing");
        Ok(Box::new(MemoryFileWriter { data }))
    }

    fn create_directory(&self, path: &VfsPath) -> VfsResult<()> {
        require_directory(path)?;
        let mut entries = self.entries.write();

        // Check if a file holds this name
        if let Some(file) = Self::counterpart(path) {
            if entries.contains_key(&file) {
                return Err(VfsError::already_exists(file.to_string()));
            }
        }

        Self::ensure_parents(&mut entries, path)?;
        entries.entry(path.clone()).or_insert(Entry::Directory);
        Ok(())
    }

    fn delete(&self, path: &VfsPath) -> VfsResult<()> {
        if path.is_root() {
            return Err(VfsError::permission_denied("cannot remove root"));
        }

        let mut entries = self.entries.write();
        match entries.remove(path) {
            Some(Entry::File(_)) => Ok(()),
            Some(Entry::Directory) => {
                // Remove everything below the directory too
                entries.retain(|candidate, _| !path.is_parent_of(candidate));
                Ok(())
            }
            None => Err(VfsError::not_found(path.to_string())),
        }
    }

    fn dispose(&self) -> VfsResult<()> {
        let mut entries = self.entries.write();
        if entries.len() > 1 {
            tracing::debug!(entries = entries.len(), "disposing memory provider");
        }
        *entries = Self::fresh();
        Ok(())
    }

    fn read_only(&self) -> bool {
        false
    }
}

/// Writer that appends to a memory file's shared buffer.
struct MemoryFileWriter {
    data: FileData,
}

impl Write for MemoryFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
