//! Error types for Ratewarden.

use thiserror::Error;

/// Raised when a controller or registry cannot be built from the given settings.
///
/// This is the only error a limiter can produce. Once constructed, admission
/// checks are infallible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The request quota was zero
    #[error("Configuration error: limit must be a positive integer")]
    ZeroLimit,

    /// The window length was zero
    #[error("Configuration error: window must be a positive duration")]
    ZeroWindow,

    /// The strategy name is neither `fixed` nor `sliding`
    #[error("Configuration error: unknown limiter strategy '{0}'")]
    UnknownStrategy(String),

    /// A limiter with this name is already registered
    #[error("Configuration error: limiter '{0}' is already registered")]
    DuplicateLimiter(String),

    /// Configuration text could not be deserialized
    #[error("Configuration error: {0}")]
    Parse(String),
}

/// Result type alias for Ratewarden operations.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
