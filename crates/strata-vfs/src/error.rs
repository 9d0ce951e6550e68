//! Error types for every layer of the VFS core.
//!
//! Each layer gets its own enum so callers can match precisely:
//! [`PathError`] for path parsing and manipulation, [`RingError`] for the
//! non-blocking ring buffer, and [`VfsError`] for provider operations and
//! the streaming bridge.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Path-layer error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Text is not a canonical path (no leading `/`, empty segment, bad name).
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// The root has no parent.
    #[error("root path has no parent")]
    NoParent,

    /// The given prefix is not a leading directory of the path.
    #[error("{prefix} is not a parent of {path}")]
    NotAPrefix { prefix: String, path: String },

    /// Something was appended below a file path.
    #[error("not a directory: {0}")]
    NotADirectory(String),
}

impl PathError {
    /// Create a MalformedPath error.
    pub fn malformed(text: impl Into<String>) -> Self {
        Self::MalformedPath(text.into())
    }
}

/// Path result type.
pub type PathResult<T> = Result<T, PathError>;

/// Ring buffer error.
///
/// Only raised by the non-blocking buffer operations. The streaming bridge
/// waits instead of surfacing these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Buffer is full and overflow is disallowed.
    #[error("buffer is full")]
    BufferFull,

    /// Buffer holds no items.
    #[error("buffer is empty")]
    BufferEmpty,

    /// Requested capacity cannot hold the items currently stored.
    #[error("capacity {requested} is smaller than current size {size}")]
    CapacityTooSmall { requested: usize, size: usize },

    /// Fewer items are stored than were requested.
    #[error("requested {requested} items but only {size} are stored")]
    NotEnoughItems { requested: usize, size: usize },
}

/// Ring buffer result type.
pub type RingResult<T> = Result<T, RingError>;

/// Provider and streaming error.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Entity not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Entity already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Operation refused for this entity.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Provider is wrapped read-only.
    #[error("filesystem is read-only")]
    ReadOnly,

    /// Provider cannot perform this operation at all.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// Expected a directory.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// Expected a file.
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// Background producer failed while feeding a stream. Shared so every
    /// read after the fault reports the same cause.
    #[error("producer fault: {0}")]
    ProducerFault(#[source] Arc<VfsError>),

    /// Backing archive failed.
    #[error("archive error: {0}")]
    Archive(String),

    /// Configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Path-layer failure.
    #[error(transparent)]
    Path(#[from] PathError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl VfsError {
    /// Create a NotFound error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(path: impl Into<String>) -> Self {
        Self::AlreadyExists(path.into())
    }

    /// Create a PermissionDenied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an Unsupported error.
    pub fn unsupported(op: impl Into<String>) -> Self {
        Self::Unsupported(op.into())
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Wrap the failure that stopped a background producer.
    pub fn producer_fault(cause: VfsError) -> Self {
        Self::ProducerFault(Arc::new(cause))
    }

    /// The failure behind a [`VfsError::ProducerFault`].
    pub fn fault_cause(&self) -> Option<&VfsError> {
        match self {
            Self::ProducerFault(cause) => Some(cause),
            _ => None,
        }
    }

    /// Create an Archive error.
    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an Other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Recover a `VfsError` carried inside an `io::Error`.
    ///
    /// Streams report provider failures through `std::io`; this undoes the
    /// wrapping done by `From<VfsError> for io::Error` where possible.
    pub fn from_io(err: io::Error) -> Self {
        if err.get_ref().is_some_and(|inner| inner.is::<VfsError>()) {
            if let Some(inner) = err.into_inner() {
                if let Ok(vfs) = inner.downcast::<VfsError>() {
                    return *vfs;
                }
            }
            return Self::other("unrecoverable wrapped error");
        }
        Self::Io(err)
    }
}

/// Convert VfsError to std::io::Error for stream compatibility.
///
/// The `VfsError` is kept as the inner error so readers can downcast.
impl From<VfsError> for io::Error {
    fn from(e: VfsError) -> Self {
        let kind = match &e {
            VfsError::NotFound(_) => io::ErrorKind::NotFound,
            VfsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            VfsError::PermissionDenied(_) | VfsError::ReadOnly => io::ErrorKind::PermissionDenied,
            VfsError::Unsupported(_) => io::ErrorKind::Unsupported,
            VfsError::NotADirectory(_) => io::ErrorKind::NotADirectory,
            VfsError::IsADirectory(_) => io::ErrorKind::IsADirectory,
            VfsError::Path(_) | VfsError::InvalidConfig(_) => io::ErrorKind::InvalidInput,
            VfsError::Io(_) => return unwrap_io(e),
            VfsError::ProducerFault(_) | VfsError::Archive(_) | VfsError::Other(_) => {
                io::ErrorKind::Other
            }
        };
        io::Error::new(kind, e)
    }
}

fn unwrap_io(e: VfsError) -> io::Error {
    match e {
        VfsError::Io(inner) => inner,
        other => io::Error::other(other),
    }
}

/// VFS result type.
pub type VfsResult<T> = Result<T, VfsError>;
