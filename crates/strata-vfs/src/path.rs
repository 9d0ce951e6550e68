//! Canonical hierarchical paths.
//!
//! A [`VfsPath`] is an immutable list of non-empty segments plus a directory
//! flag. Its textual form always starts with `/`; directories end with `/`,
//! files do not. The root is `/` alone.
//!
//! `.` and `..` are ordinary names here. Nothing is resolved, so every
//! provider and decorator sees exactly the same addressing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PathError, PathResult};

/// Separator between segments.
pub const SEPARATOR: char = '/';

/// Immutable, structurally validated path.
///
/// Equality, hashing and ordering are structural: same segments and same
/// directory flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VfsPath {
    segments: Vec<String>,
    directory: bool,
}

impl VfsPath {
    /// The root directory, `/`.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
            directory: true,
        }
    }

    /// Parse canonical text.
    ///
    /// Fails with [`PathError::MalformedPath`] when the text does not start
    /// with `/` or contains an empty segment (`//`).
    pub fn parse(text: &str) -> PathResult<Self> {
        let rest = text
            .strip_prefix(SEPARATOR)
            .ok_or_else(|| PathError::malformed(text))?;

        if rest.is_empty() {
            return Ok(Self::root());
        }

        let (body, directory) = match rest.strip_suffix(SEPARATOR) {
            Some(body) => (body, true),
            None => (rest, false),
        };

        let mut segments = Vec::new();
        for segment in body.split(SEPARATOR) {
            if segment.is_empty() {
                return Err(PathError::malformed(text));
            }
            segments.push(segment.to_string());
        }

        Ok(Self {
            segments,
            directory,
        })
    }

    /// Returns true for `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns true if this path names a directory (trailing `/`).
    pub fn is_directory(&self) -> bool {
        self.directory
    }

    /// Returns true if this path names a file.
    pub fn is_file(&self) -> bool {
        !self.directory
    }

    /// The segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Name of the entity this path points at (`None` for the root).
    pub fn entity_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Extension of a file name, without the dot.
    ///
    /// Directories and names without a dot (or with only a leading dot)
    /// have no extension.
    pub fn extension(&self) -> Option<&str> {
        if self.directory {
            return None;
        }
        let name = self.entity_name()?;
        match name.rfind('.') {
            Some(0) | None => None,
            Some(idx) => Some(&name[idx + 1..]),
        }
    }

    /// The directory containing this path.
    pub fn parent(&self) -> PathResult<Self> {
        if self.is_root() {
            return Err(PathError::NoParent);
        }
        Ok(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
            directory: true,
        })
    }

    /// Every ancestor directory, nearest first, ending with the root.
    pub fn ancestors(&self) -> impl Iterator<Item = VfsPath> + '_ {
        (0..self.segments.len()).rev().map(move |len| Self {
            segments: self.segments[..len].to_vec(),
            directory: true,
        })
    }

    /// True if `other` lies strictly below this directory.
    pub fn is_parent_of(&self, other: &VfsPath) -> bool {
        self.directory
            && other.segments.len() > self.segments.len()
            && other.segments.starts_with(&self.segments)
    }

    /// True if this path lies strictly below `other`.
    pub fn is_child_of(&self, other: &VfsPath) -> bool {
        other.is_parent_of(self)
    }

    /// Append a relative path to this directory.
    ///
    /// The result takes its directory flag from `relative`, so appending
    /// the root yields this directory unchanged.
    pub fn append_path(&self, relative: &VfsPath) -> PathResult<Self> {
        self.ensure_directory()?;
        let mut segments = Vec::with_capacity(self.segments.len() + relative.segments.len());
        segments.extend_from_slice(&self.segments);
        segments.extend_from_slice(&relative.segments);
        Ok(Self {
            segments,
            directory: relative.directory,
        })
    }

    /// Strip a leading directory, returning the remainder as a rooted path.
    ///
    /// `/a/b/`.remove_parent(`/a/`) is `/b/`; removing a path from itself
    /// yields the root.
    pub fn remove_parent(&self, prefix: &VfsPath) -> PathResult<Self> {
        let is_prefix = prefix.directory
            && (self.segments.len() > prefix.segments.len()
                || (self.directory && self.segments.len() == prefix.segments.len()))
            && self.segments.starts_with(&prefix.segments);
        if !is_prefix {
            return Err(PathError::NotAPrefix {
                prefix: prefix.to_string(),
                path: self.to_string(),
            });
        }
        Ok(Self {
            segments: self.segments[prefix.segments.len()..].to_vec(),
            directory: self.directory,
        })
    }

    /// Append a single directory segment.
    pub fn append_directory(&self, name: &str) -> PathResult<Self> {
        self.append_segment(name, true)
    }

    /// Append a single file segment.
    pub fn append_file(&self, name: &str) -> PathResult<Self> {
        self.append_segment(name, false)
    }

    fn append_segment(&self, name: &str, directory: bool) -> PathResult<Self> {
        self.ensure_directory()?;
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(PathError::malformed(name));
        }
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Ok(Self {
            segments,
            directory,
        })
    }

    fn ensure_directory(&self) -> PathResult<()> {
        if self.directory {
            Ok(())
        } else {
            Err(PathError::NotADirectory(self.to_string()))
        }
    }
}

impl Default for VfsPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        if self.directory {
            write!(f, "{SEPARATOR}")?;
        }
        Ok(())
    }
}

impl FromStr for VfsPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for VfsPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for VfsPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VfsPath> for String {
    fn from(path: VfsPath) -> Self {
        path.to_string()
    }
}
