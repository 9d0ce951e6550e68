//! # strata-vfs
//!
//! Uniform hierarchical addressing over heterogeneous stores.
//!
//! - [`VfsPath`] - Canonical, immutable paths (`/dir/`, `/dir/file`)
//! - [`Provider`] - Capability trait every store and decorator implements
//! - [`SubProvider`] / [`ReadOnlyProvider`] - Composition without touching
//!   the wrapped store
//! - [`MemoryProvider`] - In-memory store (scratch space, testing)
//! - [`io`] - The ring buffer and the blocking producer/consumer bridge that
//!   turns "extract into a sink" engines into readable streams
//!
//! ## Design Decisions
//!
//! - **Paths are values**: segments plus a directory flag, compared
//!   structurally. Nothing is normalized or resolved.
//! - **Delegation, not inheritance**: decorators hold an `Arc<dyn Provider>`.
//! - **Bounded streaming**: background producers write into a fixed-size
//!   buffer and block when it is full.

pub mod backends;
pub mod config;
pub mod decorators;
mod error;
pub mod io;
mod path;
mod provider;

pub use backends::MemoryProvider;
pub use config::{BridgeConfig, DEFAULT_BUFFER_CAPACITY};
pub use decorators::{ReadOnlyProvider, SubProvider};
pub use error::{PathError, PathResult, RingError, RingResult, VfsError, VfsResult};
pub use path::{SEPARATOR, VfsPath};
pub use provider::{Provider, ReadStream, WriteStream, require_directory, require_file};
