use std::sync::Arc;

use crate::Result;
use crate::catalog::ModelId;
use crate::preferences::PreferenceStore;

/// Preference mutation surface, keyed on `(user, agent|default)`.
///
/// The caller supplies the user id from its authenticated session context;
/// row-level access control is the storage collaborator's concern.
#[derive(Clone)]
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub async fn preferred_model(
        &self,
        user_id: &str,
        agent_id: Option<&str>,
    ) -> Result<Option<ModelId>> {
        self.store.get(user_id, agent_id).await
    }

    pub async fn set_preferred_model(
        &self,
        user_id: &str,
        agent_id: Option<&str>,
        model_id: impl Into<ModelId>,
    ) -> Result<()> {
        self.store.set(user_id, agent_id, model_id.into()).await
    }

    pub async fn clear_preference(&self, user_id: &str, agent_id: Option<&str>) -> Result<()> {
        self.store.clear(user_id, agent_id).await
    }
}
