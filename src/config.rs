//! # Config
//!
//! Addresses and catalog bounds the animation override needs, loaded from TOML.
//!
//! ```toml
//! override_patch = 0x14081e7a4
//! speed_hook = 0x140bd8c4c
//! action_timeline_rows = 7900
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::memory::Address;
use crate::patcher::PatchTarget;

/// Width of the override patch when the config doesn't say otherwise
pub const DEFAULT_PATCH_WIDTH: usize = 7;

/// Errors when loading an [`AnimationConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("failed to read config file {}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The config is not valid TOML or is missing fields
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The override patch must cover at least one byte
    #[error("patch_width must be greater than zero")]
    EmptyPatch,
    /// Without any action timeline rows no animation id could ever be written
    #[error("action_timeline_rows must be greater than zero")]
    NoActionTimelines,
}

/// Supplied addresses and bounds for the animation override
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationConfig {
    /// Start of the animation override patch
    pub override_patch: Address,
    /// Number of bytes covered by the override patch
    #[serde(default = "default_patch_width")]
    pub patch_width: usize,
    /// Start of the animation speed instruction slot neutralized while the override is enabled
    pub speed_hook: Address,
    /// Number of rows in the action timeline sheet
    pub action_timeline_rows: u32,
}

/// Serde default for [`AnimationConfig::patch_width`]
fn default_patch_width() -> usize {
    DEFAULT_PATCH_WIDTH
}

impl AnimationConfig {
    /// Parses and validates a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks the bounds that deserialization can't express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patch_width == 0 {
            return Err(ConfigError::EmptyPatch);
        }
        if self.action_timeline_rows == 0 {
            return Err(ConfigError::NoActionTimelines);
        }
        Ok(())
    }

    /// Location of the override patch
    pub fn override_target(&self) -> PatchTarget {
        PatchTarget::new(self.override_patch, self.patch_width)
    }
}
