//! Per (user, agent) model preferences.
//!
//! A preference binds a user (and optionally one agent persona) to a chosen
//! model identifier. The reserved default slot is used when no agent is
//! given and is distinct from every real agent id. Absence of a binding
//! means "no override; use the fallback order".

mod memory;

use async_trait::async_trait;

pub use memory::MemoryPreferenceStore;

use crate::Result;
use crate::catalog::ModelId;

/// Lookup key within one user's preferences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    /// Reserved slot used when no agent is specified.
    Default,
    Agent(String),
}

impl PreferenceKey {
    pub fn from_agent(agent_id: Option<&str>) -> Self {
        match agent_id {
            Some(agent) => Self::Agent(agent.to_string()),
            None => Self::Default,
        }
    }

    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::Agent(agent) => Some(agent),
        }
    }
}

impl std::fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Agent(agent) => f.write_str(agent),
        }
    }
}

/// Storage seam for preferences. The backing store owns durability and
/// last-write-wins semantics for concurrent writers to the same key.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Stored override for `(user, agent|default)`, if any.
    async fn get(&self, user_id: &str, agent_id: Option<&str>) -> Result<Option<ModelId>>;

    /// Upsert: replaces any existing binding for the same key.
    async fn set(&self, user_id: &str, agent_id: Option<&str>, model_id: ModelId) -> Result<()>;

    /// Delete the binding. Not an error when none existed.
    async fn clear(&self, user_id: &str, agent_id: Option<&str>) -> Result<()>;
}
