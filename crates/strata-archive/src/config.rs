//! Archive provider configuration.
//!
//! ```toml
//! password = "hunter2"
//!
//! [stream]
//! buffer_capacity = 131072
//! ```

use serde::{Deserialize, Serialize};
use strata_vfs::{BridgeConfig, VfsError, VfsResult};

/// Settings applied when opening an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Decryption password for protected entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Sizing for the per-entry extraction bridge.
    pub stream: BridgeConfig,
}

impl ArchiveConfig {
    /// Decrypt entries with `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Size the extraction bridge of every stream to `capacity` bytes.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.stream = self.stream.with_buffer_capacity(capacity);
        self
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> VfsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| VfsError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject a zero-sized stream buffer or an empty password.
    pub fn validate(&self) -> VfsResult<()> {
        self.stream.validate()?;
        if self.password.as_deref() == Some("") {
            return Err(VfsError::invalid_config("password must not be empty"));
        }
        Ok(())
    }
}
