//! Merge configuration
//!
//! Loaded from an optional TOML file. Every field has a default, so an empty
//! file (or no file at all) is a valid configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::collection::FileCollection;
use crate::executor::LopdfExecutor;
use crate::output::{output_filename_or, DEFAULT_BASE_NAME};

/// Maximum accepted input size (100MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Base name used when the user gives none
    pub default_base_name: String,
    /// Compress streams in the merged output
    pub compress: bool,
    /// Inputs larger than this many bytes are skipped
    pub max_file_size: u64,
    /// Directory merged files are written to (current directory if unset)
    pub output_dir: Option<PathBuf>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_base_name: DEFAULT_BASE_NAME.to_string(),
            compress: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            output_dir: None,
        }
    }
}

impl MergeConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Empty collection honoring `max_file_size`
    pub fn new_collection(&self) -> FileCollection {
        FileCollection::with_max_file_size(self.max_file_size)
    }

    pub fn executor(&self) -> LopdfExecutor {
        LopdfExecutor::new().with_compression(self.compress)
    }

    /// File name for the merged output given the user's (possibly blank) name
    pub fn output_filename(&self, user_name: Option<&str>) -> String {
        output_filename_or(user_name, &self.default_base_name)
    }

    /// Full output path, placed in `output_dir` when one is configured
    pub fn output_path(&self, user_name: Option<&str>) -> PathBuf {
        let file_name = self.output_filename(user_name);
        match &self.output_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }
}
