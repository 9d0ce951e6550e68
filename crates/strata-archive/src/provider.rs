//! Read-only provider over an archive catalogue.
//!
//! The catalogue is indexed once at open time. Every `open_read` spawns a
//! producer thread that extracts the entry into a bounded bridge while the
//! caller consumes the reader end. Each producer gets an engine of its own
//! when the source can fork.

use std::collections::HashMap;
use std::fmt;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;
use std::thread;

use indexmap::IndexSet;
use parking_lot::Mutex;
use strata_vfs::io::{BridgeHandle, BridgeState, BridgeWriter};
use strata_vfs::{
    BridgeConfig, Provider, ReadStream, SEPARATOR, VfsError, VfsPath, VfsResult, WriteStream,
    require_directory, require_file,
};
use tracing::{debug, info, warn};

use crate::config::ArchiveConfig;
use crate::seven_zip::SevenZSource;
use crate::source::{ArchiveEntry, ArchiveSource};
use crate::zip_archive::ZipSource;

const DISPOSED: &str = "archive provider disposed";

type SharedSource = Arc<Mutex<Option<Box<dyn ArchiveSource>>>>;

/// The engine a producer extracts with.
enum Engine {
    /// A fork used by this stream alone, closed when extraction ends.
    Owned(Box<dyn ArchiveSource>),
    /// The provider's own engine, locked for the whole extraction.
    Shared(SharedSource),
}

#[derive(Default)]
struct Streams {
    disposed: bool,
    handles: Vec<BridgeHandle>,
}

/// Archive-backed provider. Mutations fail with [`VfsError::Unsupported`].
///
/// Open streams are independent when the source can fork, so they may be
/// read in any order. A source that cannot fork is shared: extractions run
/// one at a time and a second reader's producer waits until the first entry
/// has been fully written.
pub struct ArchiveProvider {
    entities: IndexSet<VfsPath>,
    native_names: HashMap<VfsPath, String>,
    source: SharedSource,
    forkable: bool,
    stream: BridgeConfig,
    streams: Mutex<Streams>,
}

impl ArchiveProvider {
    /// Index `source` and take ownership of it.
    pub fn new(mut source: impl ArchiveSource + 'static, config: &ArchiveConfig) -> VfsResult<Self> {
        config.validate()?;
        let entries = source.entries()?;

        let mut entities = IndexSet::new();
        entities.insert(VfsPath::root());
        let mut native_names = HashMap::new();

        for entry in &entries {
            let path = match virtual_path(entry) {
                Ok(path) => path,
                Err(err) => {
                    warn!(entry = %entry.name, error = %err, "skipping archive entry");
                    continue;
                }
            };
            add_entity(&mut entities, &path);
            native_names.insert(path, entry.name.clone());
        }

        info!(
            entries = entries.len(),
            entities = entities.len(),
            "indexed archive"
        );

        let forkable = source.can_fork();
        let engine: Box<dyn ArchiveSource> = Box::new(source);
        Ok(Self {
            entities,
            native_names,
            source: Arc::new(Mutex::new(Some(engine))),
            forkable,
            stream: config.stream.clone(),
            streams: Mutex::new(Streams::default()),
        })
    }

    /// Open a zip file on disk.
    pub fn open_zip(path: impl AsRef<Path>, config: &ArchiveConfig) -> VfsResult<Self> {
        let mut source = ZipSource::open_path(path)?;
        if let Some(password) = &config.password {
            source = source.with_password(password.as_bytes());
        }
        Self::new(source, config)
    }

    /// Open a zip archive held in memory.
    pub fn open_zip_bytes(bytes: impl Into<Arc<[u8]>>, config: &ArchiveConfig) -> VfsResult<Self> {
        let mut source = ZipSource::from_bytes(bytes)?;
        if let Some(password) = &config.password {
            source = source.with_password(password.as_bytes());
        }
        Self::new(source, config)
    }

    /// Open a zip archive held by any seekable reader.
    ///
    /// The reader cannot be reopened, so every stream shares one engine.
    pub fn open_zip_reader<R>(reader: R, config: &ArchiveConfig) -> VfsResult<Self>
    where
        R: Read + Seek + Send + 'static,
    {
        let mut source = ZipSource::new(reader)?;
        if let Some(password) = &config.password {
            source = source.with_password(password.as_bytes());
        }
        Self::new(source, config)
    }

    /// Open a 7z file on disk.
    pub fn open_7z(path: impl AsRef<Path>, config: &ArchiveConfig) -> VfsResult<Self> {
        let source = SevenZSource::open_path(path, config.password.as_deref())?;
        Self::new(source, config)
    }

    /// Every indexed path in discovery order, the root first.
    pub fn entities(&self) -> impl Iterator<Item = &VfsPath> {
        self.entities.iter()
    }

    /// Number of indexed paths, the root included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when the archive contributed nothing beyond the root.
    pub fn is_empty(&self) -> bool {
        self.entities.len() == 1
    }

    /// Name of the entry as stored in the archive.
    pub fn native_name(&self, path: &VfsPath) -> Option<&str> {
        self.native_names.get(path).map(String::as_str)
    }

    /// Extraction streams still open.
    pub fn open_streams(&self) -> usize {
        self.streams
            .lock()
            .handles
            .iter()
            .filter(|h| h.is_open())
            .count()
    }
}

/// Map an archive record onto the virtual namespace.
///
/// Backslashes become `/`, leading separators are dropped and directory
/// records gain a trailing `/`.
pub fn virtual_path(entry: &ArchiveEntry) -> VfsResult<VfsPath> {
    let name = entry.name.replace('\\', "/");
    let name = name.trim_start_matches(SEPARATOR);
    let mut text = format!("{SEPARATOR}{name}");
    if entry.is_dir && !text.ends_with(SEPARATOR) {
        text.push(SEPARATOR);
    }
    Ok(VfsPath::parse(&text)?)
}

/// Insert `path` with every ancestor, outermost first.
fn add_entity(entities: &mut IndexSet<VfsPath>, path: &VfsPath) {
    let ancestors: Vec<VfsPath> = path.ancestors().collect();
    for ancestor in ancestors.into_iter().rev() {
        entities.insert(ancestor);
    }
    entities.insert(path.clone());
}

fn produce(engine: Engine, native: String, path: String, mut writer: BridgeWriter) {
    let span = tracing::debug_span!("extract", %path);
    let _enter = span.enter();

    let result = match engine {
        Engine::Owned(mut source) => {
            let result = source.extract(&native, &mut writer);
            if let Err(err) = source.close() {
                warn!(error = %err, "failed to close forked engine");
            }
            result
        }
        Engine::Shared(shared) => {
            let mut guard = shared.lock();
            let Some(source) = guard.as_mut() else {
                writer.fail(VfsError::other(DISPOSED));
                return;
            };
            source.extract(&native, &mut writer)
        }
    };

    match result {
        Ok(()) => {
            debug!("extraction complete");
            writer.finish();
        }
        Err(err) => {
            if writer.state() == BridgeState::Closed {
                debug!(error = %err, "extraction stopped, stream closed");
            } else {
                warn!(error = %err, "extraction failed");
            }
            writer.fail(err);
        }
    }
}

impl Provider for ArchiveProvider {
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        require_directory(path)?;
        if !self.entities.contains(path) {
            return Err(VfsError::not_found(path.to_string()));
        }
        Ok(self
            .entities
            .iter()
            .filter(|candidate| candidate.parent().is_ok_and(|parent| &parent == path))
            .cloned()
            .collect())
    }

    fn exists(&self, path: &VfsPath) -> bool {
        self.entities.contains(path)
    }

    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        require_file(path)?;
        let native = self
            .native_names
            .get(path)
            .ok_or_else(|| VfsError::not_found(path.to_string()))?
            .clone();

        let engine = if self.forkable {
            let guard = self.source.lock();
            let source = guard.as_ref().ok_or_else(|| VfsError::other(DISPOSED))?;
            Engine::Owned(source.fork()?)
        } else {
            Engine::Shared(Arc::clone(&self.source))
        };

        let (writer, reader) = {
            let mut streams = self.streams.lock();
            if streams.disposed {
                return Err(VfsError::other(DISPOSED));
            }
            let (writer, reader) = self.stream.channel();
            streams.handles.retain(BridgeHandle::is_open);
            streams.handles.push(writer.handle());
            (writer, reader)
        };

        let display = path.to_string();
        thread::Builder::new()
            .name("strata-extract".to_string())
            .spawn(move || produce(engine, native, display, writer))?;

        debug!(%path, "opened archive entry");
        Ok(Box::new(reader))
    }

    fn open_write(&self, _path: &VfsPath) -> VfsResult<WriteStream> {
        Err(VfsError::unsupported("archives are read-only"))
    }

    fn create_directory(&self, _path: &VfsPath) -> VfsResult<()> {
        Err(VfsError::unsupported("archives are read-only"))
    }

    fn delete(&self, _path: &VfsPath) -> VfsResult<()> {
        Err(VfsError::unsupported("archives are read-only"))
    }

    fn dispose(&self) -> VfsResult<()> {
        let handles = {
            let mut streams = self.streams.lock();
            if streams.disposed {
                return Ok(());
            }
            streams.disposed = true;
            std::mem::take(&mut streams.handles)
        };

        let aborted = handles
            .iter()
            .filter(|h| h.abort(VfsError::other(DISPOSED)))
            .count();
        if aborted > 0 {
            debug!(aborted, "aborted open extraction streams");
        }

        // Waits for an in-flight shared producer to notice the abort.
        let source = self.source.lock().take();
        match source {
            Some(mut engine) => engine.close().inspect_err(|err| {
                warn!(error = %err, "failed to close archive");
            }),
            None => Ok(()),
        }
    }

    fn read_only(&self) -> bool {
        true
    }
}

impl Drop for ArchiveProvider {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}

impl fmt::Debug for ArchiveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveProvider")
            .field("entities", &self.entities.len())
            .field("stream", &self.stream)
            .field("disposed", &self.streams.lock().disposed)
            .finish()
    }
}
