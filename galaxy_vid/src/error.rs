//! Error types for the galaxy_vid resource layer
//!
//! This module defines the error types used throughout the crate: graphics
//! backend failures, invalid resource descriptions, shader diagnostics and
//! resource limits.

use std::fmt;

/// Result type for galaxy_vid operations
pub type Result<T> = std::result::Result<T, Error>;

/// galaxy_vid errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error reported by the graphics device
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown uniform, out-of-range slot, bad description, etc.)
    InvalidResource(String),

    /// Initialization failed (context, engine)
    InitializationFailed(String),

    /// Vertex attributes sharing one buffer disagree on their stride
    LayoutMismatch(String),

    /// Byte length does not match the declared dimensions or stride
    InvalidDataSize(String),

    /// Shader source rejected by the driver (carries the driver log)
    CompileFailure(String),

    /// Program link rejected by the driver (carries the driver log)
    LinkFailure(String),

    /// A fixed device limit was exceeded (texture units, quad indices)
    ResourceLimitExceeded(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::LayoutMismatch(msg) => write!(f, "Layout mismatch: {}", msg),
            Error::InvalidDataSize(msg) => write!(f, "Invalid data size: {}", msg),
            Error::CompileFailure(log) => write!(f, "Shader compile failure: {}", log),
            Error::LinkFailure(log) => write!(f, "Program link failure: {}", log),
            Error::ResourceLimitExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR and build the matching [`Error`]
///
/// Without a kind the error is an `Error::BackendError`. Prefix the source
/// with `@Kind` to build any message-carrying variant instead.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("galaxy_vid::Texture", "texture {} missing", id);
/// let err = engine_err!(@InvalidDataSize, "galaxy_vid::Texture", "{} bytes", len);
/// ```
#[macro_export]
macro_rules! engine_err {
    (@$kind:ident, $source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::vid::Error::$kind(message)
    }};
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::vid::Error::BackendError(message)
    }};
}

/// Log an ERROR and return early with the matching [`Error`]
///
/// Accepts the same forms as `engine_err!`.
#[macro_export]
macro_rules! engine_bail {
    (@$kind:ident, $source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!(@$kind, $source, $($arg)*))
    };
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
