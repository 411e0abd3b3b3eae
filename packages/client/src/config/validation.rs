//! Configuration validation utilities
//!
//! Common validation helpers shared by the cache configuration types.

use std::path::Path;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid size value: {0}")]
    InvalidSize(String),

    #[error("Invalid cache directory: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),
}

/// Configuration validation trait
pub trait Validator {
    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` variant if any validation fails:
    /// - `InvalidSize` - if a byte budget is zero
    /// - `InvalidPath` - if the cache directory is empty or points at a file
    /// - `InvalidParameter` - if parameters are outside valid ranges
    fn validate(&self) -> ConfigResult<()>;
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a byte budget
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidSize` if the size is zero.
    pub fn validate_size(size: u64, name: &str) -> ConfigResult<()> {
        if size == 0 {
            return Err(ConfigurationError::InvalidSize(format!(
                "{name} cannot be zero"
            )));
        }

        Ok(())
    }

    /// Validate a cache directory path
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidPath` if:
    /// - The path is empty
    /// - The path exists but is not a directory
    pub fn validate_directory(path: &Path, name: &str) -> ConfigResult<()> {
        if path.as_os_str().is_empty() {
            return Err(ConfigurationError::InvalidPath(format!(
                "{name} cannot be empty"
            )));
        }

        if path.exists() && !path.is_dir() {
            return Err(ConfigurationError::InvalidPath(format!(
                "{name} exists and is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Validate numeric range
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` if the value is outside
    /// the specified range [min, max] (inclusive).
    pub fn validate_range<T>(value: T, min: T, max: T, name: &str) -> ConfigResult<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be between {min} and {max}, got {value}"
            )));
        }

        Ok(())
    }
}
