//! Builder API modules
//!
//! - `core`: `NetworkCacheBuilder` and its configuration methods
//! - `methods`: terminal methods that open the store and assemble the cache

pub mod core;
pub mod methods;

pub use self::core::*;
