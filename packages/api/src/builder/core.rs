//! Core `NetworkCacheBuilder` structure and configuration methods

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use netcache_client::clock::Clock;
use netcache_client::config::DiskCacheConfig;
use serde_json::{Map, Value};

/// Fluent builder for [`DefaultNetworkCache`](netcache_client::cache::DefaultNetworkCache)
#[derive(Clone, Default)]
pub struct NetworkCacheBuilder {
    pub(crate) config: DiskCacheConfig,
    pub(crate) clock: Option<Arc<dyn Clock>>,
    pub(crate) debug_enabled: bool,
}

impl NetworkCacheBuilder {
    /// Create a builder with [`DiskCacheConfig::default`]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    #[must_use]
    pub fn from_config(config: DiskCacheConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Start from a JSON-encoded [`DiskCacheConfig`]; missing fields take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an object, names an unknown field, or holds a
    /// value of the wrong type.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(json)?;
        Ok(Self::from_config(serde_json::from_value(Value::Object(object))?))
    }

    /// Directory holding the journal and entry files
    #[must_use]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Maximum total payload size in bytes
    #[must_use]
    pub fn max_size_bytes(mut self, max_size_bytes: u64) -> Self {
        self.config.max_size_bytes = max_size_bytes;
        self
    }

    /// Bump to discard everything stored by earlier versions
    #[must_use]
    pub fn app_version(mut self, app_version: u32) -> Self {
        self.config.app_version = app_version;
        self
    }

    #[must_use]
    pub fn compaction_threshold(mut self, threshold: usize) -> Self {
        self.config.compaction_threshold = threshold;
        self
    }

    /// Use `clock` instead of the system clock
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Log the effective configuration when the cache is built
    #[must_use]
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Configuration the builder will open the store with
    #[must_use]
    pub fn config(&self) -> &DiskCacheConfig {
        &self.config
    }
}

impl fmt::Debug for NetworkCacheBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkCacheBuilder")
            .field("config", &self.config)
            .field("custom_clock", &self.clock.is_some())
            .field("debug_enabled", &self.debug_enabled)
            .finish()
    }
}
