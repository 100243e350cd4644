//! Responses produced by a session worker.

use serde::{Deserialize, Serialize};
use tilestep_core::TileState;

use crate::error::OpsError;
use crate::rules::CustomRuleBundle;

/// A rendered frame plus the history bookkeeping that goes with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedState {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Engine render output.
    pub rendered: String,
    /// Number of recorded history steps.
    pub history_len: usize,
    /// History step that was rendered; absent for live renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_position: Option<usize>,
    /// The seed the live handle was built with.
    pub seed: u64,
}

/// A response to one [`WorkerRequest`](crate::WorkerRequest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    /// Answer to reset, run, collapse, read_past and setCustomRules.
    StateUpdate { state: RenderedState },

    /// Answer to tick.
    ///
    /// `result` is absent when the step ended in a contradiction, or when a
    /// finished grid was just rebuilt.
    TickUpdate {
        state: RenderedState,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<bool>,
    },

    /// Answer to rule_check.
    RuleCheck {
        allowed: Vec<TileState>,
        state: RenderedState,
    },

    /// Answer to extract_rules.
    ExtractedRules { result: CustomRuleBundle },
}

impl WorkerResponse {
    /// The rendered state carried by the response, if any.
    pub fn state(&self) -> Option<&RenderedState> {
        match self {
            WorkerResponse::StateUpdate { state }
            | WorkerResponse::TickUpdate { state, .. }
            | WorkerResponse::RuleCheck { state, .. } => Some(state),
            WorkerResponse::ExtractedRules { .. } => None,
        }
    }
}

/// The last frame an owner sends before tearing a failed worker down.
///
/// ```json
/// {"type": "error", "code": "unknown_ruleset", "message": "Unknown ruleset: 'x'"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "error")]
pub struct ErrorFrame {
    pub code: String,
    pub message: String,
}

impl From<&OpsError> for ErrorFrame {
    fn from(error: &OpsError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RenderedState {
        RenderedState {
            width: 2,
            height: 2,
            rendered: "<svg></svg>".into(),
            history_len: 3,
            history_position: None,
            seed: 42,
        }
    }

    #[test]
    fn tick_update_omits_missing_result() {
        let json = serde_json::to_value(WorkerResponse::TickUpdate {
            state: state(),
            result: None,
        })
        .unwrap();
        assert_eq!(json["type"], "tick_update");
        assert!(json.get("result").is_none());
        assert!(json["state"].get("history_position").is_none());
        assert_eq!(json["state"]["seed"], 42);
    }

    #[test]
    fn rule_check_carries_allowed_states() {
        let json = serde_json::to_value(WorkerResponse::RuleCheck {
            allowed: vec![1],
            state: state(),
        })
        .unwrap();
        assert_eq!(json["type"], "rule_check");
        assert_eq!(json["allowed"], serde_json::json!([1]));
    }

    #[test]
    fn error_frame_is_tagged() {
        let frame = ErrorFrame::from(&OpsError::unknown_ruleset("moon"));
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "unknown_ruleset");
        assert_eq!(json["message"], "Unknown ruleset: 'moon'");
    }
}
