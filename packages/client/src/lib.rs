//! # netcache client
//!
//! Disk-backed HTTP response cache driven by `Cache-Control` directives.
//!
//! ## Features
//!
//! - **Directive parsing** of `Cache-Control` headers into absolute expiry times
//! - **Journaled LRU store** bounded by total bytes, recoverable after a crash
//! - **Best-effort façade** that never fails: errors become misses or skipped writes
//! - **Injectable clock** for deterministic freshness checks
//!
//! ## Usage
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use netcache_client::prelude::*;
//!
//! let cache = DefaultNetworkCache::open(&DiskCacheConfig::with_directory("/tmp/netcache"))?;
//! let response = CachedResponse::new(200, Some("{}".to_owned()), HashMap::new())
//!     .with_header("Cache-Control", "public, max-age=300");
//!
//! cache.put("https://api.example.com/v1/config", response);
//! assert!(cache.get("https://api.example.com/v1/config").is_some());
//! # Ok::<(), netcache_client::StorageError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod cache;
pub mod clock;
pub mod config;
pub mod directive;
pub mod disk;
pub mod error;

// Prelude with canonical types
pub mod prelude;

pub use crate::prelude::*;
