//! Error types raised by generation engines.

use thiserror::Error;

use crate::space::TileState;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that a generation engine can report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A cell coordinate outside the grid was addressed.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// A state was requested that the addressed cell can no longer take.
    #[error("state {state} is not possible at cell ({x}, {y})")]
    InvalidState { x: usize, y: usize, state: TileState },

    /// Serialized rule data could not be loaded.
    #[error("malformed rule data: {0}")]
    MalformedRules(#[from] serde_json::Error),

    /// Rule data parsed but describes an unusable ruleset.
    #[error("invalid ruleset: {message}")]
    InvalidRules { message: String },

    /// A sample image could not be decoded.
    #[error("invalid sample image: {message}")]
    InvalidImage { message: String },

    /// Extraction parameters do not fit the sample.
    #[error("invalid extraction options: {message}")]
    InvalidOptions { message: String },

    /// Grid dimensions are unusable (zero width or height).
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// One-time engine initialization failed.
    #[error("engine initialization failed: {message}")]
    Initialization { message: String },
}

impl EngineError {
    /// Create an invalid rules error.
    pub fn invalid_rules(message: impl Into<String>) -> Self {
        Self::InvalidRules {
            message: message.into(),
        }
    }

    /// Create an invalid image error.
    pub fn invalid_image(message: impl Into<String>) -> Self {
        Self::InvalidImage {
            message: message.into(),
        }
    }

    /// Create an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }
}
