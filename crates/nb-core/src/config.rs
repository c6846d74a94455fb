//! Session configuration

use crate::error::{Result, SessionError};
use nb_codec::CodecOptions;
use nb_exec::CoordinatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a [`NotebookSession`](crate::NotebookSession)
///
/// ```toml
/// flush_on_switch = true
///
/// [codec]
/// indent = 1
/// recover_malformed_cells = true
///
/// [coordinator]
/// continue_after_error = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Codec options for load and save
    pub codec: CodecOptions,
    /// Execution coordinator behavior
    pub coordinator: CoordinatorConfig,
    /// Hand unsaved changes to the flush sink before switching documents
    pub flush_on_switch: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            codec: CodecOptions::default(),
            coordinator: CoordinatorConfig::default(),
            flush_on_switch: true,
        }
    }
}

impl SessionConfig {
    /// Create default config
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text; missing keys take their defaults
    ///
    /// # Errors
    /// Returns [`SessionError::Config`] on invalid TOML or mistyped keys
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// Returns [`SessionError::ConfigIo`] if the file cannot be read, otherwise
    /// as [`from_toml_str`](Self::from_toml_str)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded session config");
        Ok(config)
    }

    /// With codec options
    #[inline]
    #[must_use]
    pub fn with_codec(mut self, codec: CodecOptions) -> Self {
        self.codec = codec;
        self
    }

    /// With coordinator config
    #[inline]
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: CoordinatorConfig) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// With flush-on-switch behavior
    #[inline]
    #[must_use]
    pub fn with_flush_on_switch(mut self, value: bool) -> Self {
        self.flush_on_switch = value;
        self
    }
}
