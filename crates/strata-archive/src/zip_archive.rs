//! Zip archives via the `zip` crate.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use std::sync::Arc;

use strata_vfs::{VfsError, VfsResult};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::source::{ArchiveEntry, ArchiveSource};

/// Produces a fresh archive handle for a fork.
type Reopen<R> = Arc<dyn Fn() -> VfsResult<ZipArchive<R>> + Send + Sync>;

/// Zip catalogue and extractor over any seekable reader.
///
/// Sources opened with [`open_path`](ZipSource::open_path) or
/// [`from_bytes`](ZipSource::from_bytes) can fork; one built from an
/// arbitrary reader with [`new`](ZipSource::new) cannot.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    password: Option<Vec<u8>>,
    reopen: Option<Reopen<R>>,
}

fn read_archive<R: Read + Seek>(reader: R) -> VfsResult<ZipArchive<R>> {
    ZipArchive::new(reader).map_err(|e| VfsError::archive(format!("failed to read zip archive: {e}")))
}

fn open_file(path: &Path) -> VfsResult<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| {
        VfsError::archive(format!("failed to open zip archive {}: {e}", path.display()))
    })?;
    read_archive(BufReader::new(file))
}

impl ZipSource<BufReader<File>> {
    /// Open a zip file on disk. Forks reopen the file.
    pub fn open_path(path: impl AsRef<Path>) -> VfsResult<Self> {
        let path = path.as_ref().to_path_buf();
        let archive = open_file(&path)?;
        let reopen: Reopen<BufReader<File>> = Arc::new(move || open_file(&path));
        Ok(Self {
            archive,
            password: None,
            reopen: Some(reopen),
        })
    }
}

impl ZipSource<Cursor<Arc<[u8]>>> {
    /// Read a zip held in memory. Forks share the bytes and the parsed
    /// central directory.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> VfsResult<Self> {
        let archive = read_archive(Cursor::new(bytes.into()))?;
        let template = archive.clone();
        let reopen: Reopen<Cursor<Arc<[u8]>>> = Arc::new(move || Ok(template.clone()));
        Ok(Self {
            archive,
            password: None,
            reopen: Some(reopen),
        })
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Read the central directory from `reader`.
    pub fn new(reader: R) -> VfsResult<Self> {
        Ok(Self {
            archive: read_archive(reader)?,
            password: None,
            reopen: None,
        })
    }

    /// Decrypt entries with `password`.
    pub fn with_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }
}

fn zip_error(name: &str, err: ZipError) -> VfsError {
    match err {
        ZipError::FileNotFound => VfsError::not_found(name),
        ZipError::Io(e) => VfsError::Io(e),
        other => VfsError::archive(format!("{name}: {other}")),
    }
}

impl<R: Read + Seek + Send + 'static> ArchiveSource for ZipSource<R> {
    fn entries(&mut self) -> VfsResult<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            // Raw access reads the header without decrypting.
            let file = self
                .archive
                .by_index_raw(i)
                .map_err(|e| zip_error(&format!("entry #{i}"), e))?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                is_dir: file.is_dir(),
                size: file.size(),
            });
        }
        Ok(entries)
    }

    fn extract(&mut self, name: &str, sink: &mut dyn Write) -> VfsResult<()> {
        let mut file = match &self.password {
            Some(password) => self.archive.by_name_decrypt(name, password),
            None => self.archive.by_name(name),
        }
        .map_err(|e| zip_error(name, e))?;

        if file.is_dir() {
            return Err(VfsError::is_a_directory(name));
        }
        io::copy(&mut file, sink).map_err(VfsError::from_io)?;
        Ok(())
    }

    fn can_fork(&self) -> bool {
        self.reopen.is_some()
    }

    fn fork(&self) -> VfsResult<Box<dyn ArchiveSource>> {
        let Some(reopen) = &self.reopen else {
            return Err(VfsError::unsupported("zip reader cannot be reopened"));
        };
        Ok(Box::new(ZipSource {
            archive: reopen()?,
            password: self.password.clone(),
            reopen: Some(Arc::clone(reopen)),
        }))
    }
}
