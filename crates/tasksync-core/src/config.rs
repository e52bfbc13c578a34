//! Sync configuration loaded from `tasksync.toml`

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tasksync_content::DisplayConfig;

use crate::{Error, Result};

/// Default configuration file name
pub const CONFIG_FILE: &str = "tasksync.toml";

/// Thresholds for fuzzy identity matching
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Take a candidate immediately at or above this ratio
    #[serde(deserialize_with = "unit_ratio")]
    pub accept_ratio: f64,
    /// Otherwise take the best candidate at or above this ratio
    #[serde(deserialize_with = "unit_ratio")]
    pub min_ratio: f64,
    /// Skip candidates whose length differs from the query by more than
    /// this fraction of the query length
    #[serde(deserialize_with = "unit_ratio")]
    pub length_tolerance: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            accept_ratio: 0.90,
            min_ratio: 0.85,
            length_tolerance: 0.30,
        }
    }
}

fn unit_ratio<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    let clamped = if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 1.0) };
    if clamped != raw {
        tracing::warn!(value = raw, clamped, "match threshold out of range");
    }
    Ok(clamped)
}

/// Everything a sync cycle is configured with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub display: DisplayConfig,
    pub matching: MatchThresholds,
}

impl SyncConfig {
    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist, or a TOML error
    /// if it cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(Error::ConfigNotFound { path }) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }
}
