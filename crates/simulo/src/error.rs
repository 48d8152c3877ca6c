//! # Runtime Error Types
//!
//! All errors that can stop the frame loop or fail runtime construction.

use simulo_core::SceneError;
use simulo_protocol::DecodeError;
use thiserror::Error;

/// Errors that can occur in the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The host sent an undecodable event span.
    #[error("event decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Game or behavior code misused the scene graph.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
