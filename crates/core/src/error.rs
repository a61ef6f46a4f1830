//! Error types for canvas-nest.

use thiserror::Error;

/// Errors produced while attaching, configuring or snapshotting a nest.
///
/// The per-frame simulation never fails; only setup and host operations
/// return these.
#[derive(Debug, Error)]
pub enum NestError {
    /// Width or height was negative, not finite, or outside what the host
    /// or output format supports (raster hosts need at least 1x1).
    #[error("invalid dimensions: width and height must be finite, non-negative and supported by the host")]
    InvalidDimensions,

    /// A `"r,g,b"` color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A configuration value was outside its accepted range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The host surface refused an operation (overlay creation, context lookup).
    #[error("host error: {0}")]
    Host(String),

    /// Writing a snapshot failed.
    #[error("io error: {0}")]
    Io(String),
}
