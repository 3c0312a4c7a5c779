use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::watch;

use super::{PreferenceKey, PreferenceStore};
use crate::catalog::ModelId;
use crate::{Error, Result};

/// In-memory preference store.
///
/// Reference implementation of the storage seam; production deployments
/// back the same trait with the relational store. Writers to the same key
/// are last-write-wins, matching the external store's consistency model.
#[derive(Debug)]
pub struct MemoryPreferenceStore {
    bindings: DashMap<(String, PreferenceKey), ModelId>,
    changes: watch::Sender<u64>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            bindings: DashMap::new(),
            changes,
        }
    }

    /// Change notifications: bumped on every successful mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn get(&self, user_id: &str, agent_id: Option<&str>) -> Result<Option<ModelId>> {
        let key = (user_id.to_string(), PreferenceKey::from_agent(agent_id));
        Ok(self.bindings.get(&key).map(|v| v.clone()))
    }

    async fn set(&self, user_id: &str, agent_id: Option<&str>, model_id: ModelId) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(Error::validation("userId must not be empty"));
        }
        let key = PreferenceKey::from_agent(agent_id);
        tracing::debug!(user = user_id, key = %key, model = %model_id, "preference set");
        self.bindings
            .insert((user_id.to_string(), key), model_id);
        self.notify();
        Ok(())
    }

    async fn clear(&self, user_id: &str, agent_id: Option<&str>) -> Result<()> {
        let key = (user_id.to_string(), PreferenceKey::from_agent(agent_id));
        if self.bindings.remove(&key).is_some() {
            tracing::debug!(user = user_id, key = %key.1, "preference cleared");
            self.notify();
        }
        Ok(())
    }
}
