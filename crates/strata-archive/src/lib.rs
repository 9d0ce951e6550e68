//! # strata-archive
//!
//! Mount zip and 7z archives as read-only [`strata_vfs::Provider`]s.
//!
//! The catalogue is indexed once when the archive is opened; directories
//! implied by entry names are synthesized. Reading an entry spawns a
//! producer thread that extracts into a bounded bridge, so large entries
//! stream without being held in memory.
//!
//! ```no_run
//! use strata_archive::{ArchiveConfig, ArchiveProvider};
//! use strata_vfs::{Provider, VfsPath};
//!
//! # fn main() -> strata_vfs::VfsResult<()> {
//! let fs = ArchiveProvider::open_zip("bundle.zip", &ArchiveConfig::default())?;
//! let manifest = fs.read_all(&VfsPath::parse("/META-INF/manifest.txt")?)?;
//! # let _ = manifest;
//! # Ok(())
//! # }
//! ```

mod config;
mod provider;
mod seven_zip;
mod source;
mod zip_archive;

pub use config::ArchiveConfig;
pub use provider::{ArchiveProvider, virtual_path};
pub use seven_zip::SevenZSource;
pub use source::{ArchiveEntry, ArchiveSource};
pub use zip_archive::ZipSource;
