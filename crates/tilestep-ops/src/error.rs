//! Error types for the session controller.

use thiserror::Error;
use tilestep_core::EngineError;

/// Result type for session operations.
pub type OpsResult<T> = Result<T, OpsError>;

/// Errors that can occur while serving requests.
///
/// Every variant is fatal for the execution context that raised it.
#[derive(Debug, Error)]
pub enum OpsError {
    /// The ruleset selector names neither a preset nor a registered custom rule.
    #[error("Unknown ruleset: '{name}'")]
    UnknownRuleset { name: String },

    /// A message did not match the request protocol.
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    /// The generation engine rejected an operation.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The worker task is gone.
    #[error("Session worker closed")]
    WorkerClosed,
}

impl OpsError {
    /// Create an unknown ruleset error.
    pub fn unknown_ruleset(name: impl Into<String>) -> Self {
        Self::UnknownRuleset { name: name.into() }
    }

    /// Create a protocol error.
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Stable machine-readable code, used in error frames.
    pub fn code(&self) -> &'static str {
        match self {
            OpsError::UnknownRuleset { .. } => "unknown_ruleset",
            OpsError::Protocol { .. } => "protocol_error",
            OpsError::Engine(_) => "engine_error",
            OpsError::Json(_) => "json_error",
            OpsError::Io(_) => "io_error",
            OpsError::Config(_) => "config_error",
            OpsError::WorkerClosed => "worker_closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(OpsError::unknown_ruleset("x").code(), "unknown_ruleset");
        assert_eq!(OpsError::protocol("bad").code(), "protocol_error");
        assert_eq!(OpsError::WorkerClosed.code(), "worker_closed");
    }

    #[test]
    fn messages_name_the_ruleset() {
        let err = OpsError::unknown_ruleset("village");
        assert_eq!(err.to_string(), "Unknown ruleset: 'village'");
    }
}
