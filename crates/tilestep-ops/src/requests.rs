//! Requests accepted by a session worker.
//!
//! Every request except `extract_rules` carries the full [`SessionSettings`]
//! next to its own fields:
//!
//! ```json
//! {"type": "tick", "outputSize": 400, "dimensions": {"width": 20, "height": 20},
//!  "rules": "terrain", "seed": {"value": 42, "allowRandomization": true}}
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tilestep_core::{BacktrackVariant, Dimensions, Direction2D, ExtractionOptions, TileState};

use crate::error::{OpsError, OpsResult};
use crate::rules::{CustomRuleBundle, RulesetSelector};

/// Requested seed and whether the controller may replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub value: u64,
    #[serde(rename = "allowRandomization")]
    pub allow_randomization: bool,
}

impl Seed {
    /// A seed that is used as given.
    pub fn fixed(value: u64) -> Self {
        Self {
            value,
            allow_randomization: false,
        }
    }

    /// A seed the controller replaces with a random one.
    pub fn random() -> Self {
        Self {
            value: 0,
            allow_randomization: true,
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::random()
    }
}

/// Session parameters sent with every session request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Side length of the square render frame.
    #[serde(rename = "outputSize", default = "default_output_size")]
    pub output_size: usize,

    pub dimensions: Dimensions,

    pub rules: RulesetSelector,

    #[serde(default)]
    pub seed: Seed,

    /// Backtracking variant; absent means no backtracking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backtracker: Option<BacktrackVariant>,

    /// When present, replaces the session's custom rule registry.
    #[serde(rename = "customRules", default, skip_serializing_if = "Option::is_none")]
    pub custom_rules: Option<Vec<CustomRuleBundle>>,
}

fn default_output_size() -> usize {
    400
}

impl SessionSettings {
    pub fn new(dimensions: Dimensions, rules: impl Into<RulesetSelector>) -> Self {
        Self {
            output_size: default_output_size(),
            dimensions,
            rules: rules.into(),
            seed: Seed::default(),
            backtracker: None,
            custom_rules: None,
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_output_size(mut self, output_size: usize) -> Self {
        self.output_size = output_size;
        self
    }

    pub fn with_backtracker(mut self, variant: BacktrackVariant) -> Self {
        self.backtracker = Some(variant);
        self
    }

    pub fn with_custom_rules(mut self, bundles: Vec<CustomRuleBundle>) -> Self {
        self.custom_rules = Some(bundles);
        self
    }
}

/// A request to a session worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    /// Rebuild the session from the settings.
    Reset {
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// One solver step.
    Tick {
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Step until finished or out of budget.
    Run {
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Force one cell, optionally into a given state.
    Collapse {
        x: usize,
        y: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        state: Option<TileState>,
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Render the grid as of history step `t`.
    ReadPast {
        t: usize,
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Ask which `target` states may sit next to `from` in `direction`.
    RuleCheck {
        from: Vec<TileState>,
        target: Vec<TileState>,
        direction: Direction2D,
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Replace the custom rule registry with `settings.custom_rules`.
    #[serde(rename = "setCustomRules")]
    SetCustomRules {
        #[serde(flatten)]
        settings: SessionSettings,
    },

    /// Derive rules from an encoded sample image. Does not touch the session.
    ExtractRules {
        name: String,
        source: Vec<u8>,
        #[serde(default)]
        options: ExtractionOptions,
    },
}

impl WorkerRequest {
    /// Decode one request. Anything that does not match the protocol is a
    /// [`OpsError::Protocol`].
    pub fn from_json(text: &str) -> OpsResult<Self> {
        serde_json::from_str(text).map_err(|e| OpsError::protocol(e.to_string()))
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            WorkerRequest::Reset { .. } => RequestKind::Reset,
            WorkerRequest::Tick { .. } => RequestKind::Tick,
            WorkerRequest::Run { .. } => RequestKind::Run,
            WorkerRequest::Collapse { .. } => RequestKind::Collapse,
            WorkerRequest::ReadPast { .. } => RequestKind::ReadPast,
            WorkerRequest::RuleCheck { .. } => RequestKind::RuleCheck,
            WorkerRequest::SetCustomRules { .. } => RequestKind::SetCustomRules,
            WorkerRequest::ExtractRules { .. } => RequestKind::ExtractRules,
        }
    }

    /// Session settings of the request, `None` for `extract_rules`.
    pub fn settings(&self) -> Option<&SessionSettings> {
        match self {
            WorkerRequest::Reset { settings }
            | WorkerRequest::Tick { settings }
            | WorkerRequest::Run { settings }
            | WorkerRequest::Collapse { settings, .. }
            | WorkerRequest::ReadPast { settings, .. }
            | WorkerRequest::RuleCheck { settings, .. }
            | WorkerRequest::SetCustomRules { settings } => Some(settings),
            WorkerRequest::ExtractRules { .. } => None,
        }
    }
}

/// Request kinds, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Reset,
    Tick,
    Run,
    Collapse,
    ReadPast,
    RuleCheck,
    SetCustomRules,
    ExtractRules,
}

impl RequestKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Reset => "reset",
            RequestKind::Tick => "tick",
            RequestKind::Run => "run",
            RequestKind::Collapse => "collapse",
            RequestKind::ReadPast => "read_past",
            RequestKind::RuleCheck => "rule_check",
            RequestKind::SetCustomRules => "setCustomRules",
            RequestKind::ExtractRules => "extract_rules",
        }
    }

    /// Kinds that may move a finished grid forward, and so trigger the
    /// completion reset.
    pub fn advances_grid(&self) -> bool {
        matches!(
            self,
            RequestKind::Reset | RequestKind::Tick | RequestKind::Run | RequestKind::Collapse
        )
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
