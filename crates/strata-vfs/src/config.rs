//! Streaming configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! buffer_capacity = 131072
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{VfsError, VfsResult};
use crate::io::{BridgeReader, BridgeWriter, channel};

/// Default bridge buffer size (64 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Sizing for streaming bridges created by providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bytes buffered between producer and consumer before the producer
    /// blocks.
    pub buffer_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl BridgeConfig {
    /// Set the buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> VfsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| VfsError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants.
    pub fn validate(&self) -> VfsResult<()> {
        if self.buffer_capacity == 0 {
            return Err(VfsError::invalid_config("buffer_capacity must be at least 1"));
        }
        Ok(())
    }

    /// Create a bridge sized by this config.
    pub fn channel(&self) -> (BridgeWriter, BridgeReader) {
        channel(self.buffer_capacity)
    }
}
