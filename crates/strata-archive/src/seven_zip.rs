//! 7z archives via `sevenz-rust`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sevenz_rust::{Password, SevenZReader};
use strata_vfs::{VfsError, VfsResult};

use crate::source::{ArchiveEntry, ArchiveSource};

/// 7z catalogue and extractor over a file on disk.
///
/// Solid blocks decompress sequentially, so each extraction walks the
/// archive from the start until the requested entry has been copied.
/// Forks reopen the file.
pub struct SevenZSource {
    reader: SevenZReader<File>,
    path: PathBuf,
    password: Option<String>,
}

impl SevenZSource {
    /// Open a 7z file, decrypting with `password` when given.
    pub fn open_path(path: impl AsRef<Path>, password: Option<&str>) -> VfsResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            VfsError::archive(format!("failed to open 7z archive {}: {e}", path.display()))
        })?;
        let len = file.metadata()?.len();
        let secret = password.map(Password::from).unwrap_or_else(Password::empty);
        let reader = SevenZReader::new(file, len, secret).map_err(|e| {
            VfsError::archive(format!("failed to read 7z archive {}: {e}", path.display()))
        })?;
        Ok(Self {
            reader,
            path: path.to_path_buf(),
            password: password.map(str::to_string),
        })
    }
}

impl ArchiveSource for SevenZSource {
    fn entries(&mut self) -> VfsResult<Vec<ArchiveEntry>> {
        Ok(self
            .reader
            .archive()
            .files
            .iter()
            .map(|entry| ArchiveEntry {
                name: entry.name().to_string(),
                is_dir: entry.is_directory(),
                size: entry.size,
            })
            .collect())
    }

    fn extract(&mut self, name: &str, sink: &mut dyn Write) -> VfsResult<()> {
        let mut outcome: Option<VfsResult<()>> = None;

        self.reader
            .for_each_entries(|entry, data| {
                if entry.name() != name {
                    return Ok(true);
                }
                outcome = Some(if entry.is_directory() {
                    Err(VfsError::is_a_directory(name))
                } else {
                    io::copy(data, &mut *sink)
                        .map(|_| ())
                        .map_err(VfsError::from_io)
                });
                Ok(false)
            })
            .map_err(|e| VfsError::archive(format!("{name}: {e}")))?;

        outcome.unwrap_or_else(|| Err(VfsError::not_found(name)))
    }

    fn can_fork(&self) -> bool {
        true
    }

    fn fork(&self) -> VfsResult<Box<dyn ArchiveSource>> {
        Ok(Box::new(Self::open_path(&self.path, self.password.as_deref())?))
    }
}
