//! Cache configuration and preset policies
//!
//! Provides `DiskCacheConfig` for configuring where the disk store lives,
//! how many bytes it may hold and when its journal gets compacted.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub mod validation;

pub use validation::{ConfigResult, ConfigValidator, ConfigurationError, Validator};

/// Default byte budget (10MB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Folder created under the system temp directory when no directory is configured
pub const DEFAULT_CACHE_FOLDER: &str = "netcache";

/// Redundant journal records tolerated before the journal is rewritten
pub const DEFAULT_COMPACTION_THRESHOLD: usize = 2000;

/// Disk cache configuration and limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiskCacheConfig {
    /// Directory holding the journal and entry files
    pub directory: PathBuf,
    /// Maximum total payload size in bytes
    pub max_size_bytes: u64,
    /// Version stamped into the journal; a mismatch on open discards the store
    pub app_version: u32,
    /// Redundant journal records tolerated before compaction
    pub compaction_threshold: usize,
}

impl Default for DiskCacheConfig {
    fn default() -> Self {
        Self {
            directory: std::env::temp_dir().join(DEFAULT_CACHE_FOLDER),
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            app_version: 1,
            compaction_threshold: DEFAULT_COMPACTION_THRESHOLD,
        }
    }
}

impl DiskCacheConfig {
    /// Default configuration rooted at `directory`
    #[must_use]
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Create a small-footprint configuration
    #[must_use]
    pub fn conservative(directory: impl Into<PathBuf>) -> Self {
        Self {
            max_size_bytes: 2 * 1024 * 1024, // 2MB
            ..Self::with_directory(directory)
        }
    }

    /// Create a large-footprint configuration
    #[must_use]
    pub fn aggressive(directory: impl Into<PathBuf>) -> Self {
        Self {
            max_size_bytes: 50 * 1024 * 1024, // 50MB
            ..Self::with_directory(directory)
        }
    }

    /// Cache directory
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl Validator for DiskCacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_directory(&self.directory, "directory")?;
        ConfigValidator::validate_size(self.max_size_bytes, "max_size_bytes")?;
        ConfigValidator::validate_range(
            self.compaction_threshold,
            1,
            usize::MAX,
            "compaction_threshold",
        )?;
        Ok(())
    }
}
