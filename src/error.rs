//! Error types for data structure and limiter operations.
//!
//! Missing data is an ordinary outcome here. Lookups return `Option`, membership and
//! removal return `bool`, and only operations whose contract names a failure (reading an
//! empty ring buffer, enqueueing into a full circular queue, updating an absent heap value)
//! return a [`PrimitiveError`]. Constructors validate their parameters up front and report
//! bad input as a [`ConfigError`].

use thiserror::Error;

/// Result type for primitive operations.
pub type Result<T> = std::result::Result<T, PrimitiveError>;

/// Main error type for primitive operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrimitiveError {
    /// Read, peek or dequeue on a structure with no data.
    #[error("structure is empty")]
    Empty,

    /// Update or delete on a value that is not present.
    #[error("value not found")]
    NotFound,

    /// Write rejected by a bounded structure that does not overwrite.
    #[error("structure is full (capacity {capacity})")]
    Full {
        /// Fixed capacity of the rejecting structure.
        capacity: usize,
    },

    /// The value is already present in a structure that requires uniqueness.
    #[error("value already present")]
    Duplicate,

    /// Invalid constructor parameters.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PrimitiveError {
    /// Check if this error reports missing data rather than a misuse.
    pub fn is_empty_or_missing(&self) -> bool {
        matches!(self, Self::Empty | Self::NotFound)
    }
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity, size or count parameter out of range.
    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    /// Period, window, timeout or TTL parameter out of range.
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    /// Threshold or rate parameter out of range.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),
}

/// Fail with [`ConfigError::InvalidCapacity`] when `value` is zero.
pub(crate) fn ensure_capacity<N: PartialEq + Default>(name: &str, value: N) -> Result<()> {
    if value == N::default() {
        return Err(ConfigError::InvalidCapacity(format!("{name} must be greater than 0")).into());
    }
    Ok(())
}

/// Fail with [`ConfigError::InvalidThreshold`] when `value` is zero.
pub(crate) fn ensure_threshold<N: PartialEq + Default>(name: &str, value: N) -> Result<()> {
    if value == N::default() {
        return Err(ConfigError::InvalidThreshold(format!("{name} must be greater than 0")).into());
    }
    Ok(())
}

/// Fail with [`ConfigError::InvalidPeriod`] when `value` is zero.
pub(crate) fn ensure_period(name: &str, value: std::time::Duration) -> Result<()> {
    if value.is_zero() {
        return Err(ConfigError::InvalidPeriod(format!("{name} must be non-zero")).into());
    }
    Ok(())
}

/// Unwrap a constructor result, panicking with the validation message.
///
/// Backs the panicking `new` constructors that mirror each fallible `try_new`.
pub(crate) fn or_panic<T>(result: Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}
