//! Resolution & fallback engine.
//!
//! Computes the ordered candidate list for a request (explicit override,
//! stored preference, then the shared fallback order) and drives sequential
//! provider attempts until one succeeds or the list is exhausted, recording
//! telemetry for every attempt.

mod candidates;
mod engine;

use serde::{Deserialize, Serialize};

pub use candidates::{FallbackOrder, build_candidates};
pub use engine::{DispatchEngine, DispatchOutcome};

use crate::catalog::ModelId;

/// Context for one chat dispatch.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub user_id: String,
    pub agent_id: Option<String>,
    /// Explicit model override; a hard selection that bypasses preference
    /// and availability filtering at construction time.
    pub explicit_model: Option<ModelId>,
}

impl RequestContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            agent_id: None,
            explicit_model: None,
        }
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_model(mut self, model_id: impl Into<ModelId>) -> Self {
        self.explicit_model = Some(model_id.into());
        self
    }
}

/// Policy for explicit model requests that fail.
///
/// Explicit selection is a hard override, so the default is to stop after
/// its single attempt; `Fallthrough` continues down the fallback chain
/// instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplicitFailurePolicy {
    #[default]
    Stop,
    Fallthrough,
}
