use serde::{Deserialize, Serialize};

use super::model::Model;

/// Typed catalog filter. All clauses are ANDed; the empty filter matches
/// every model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFilter {
    /// Exact match on provider name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Model must carry every listed tag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Equality on the recommended flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    /// Equality on the availability flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl CatalogFilter {
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn recommended(mut self, recommended: bool) -> Self {
        self.recommended = Some(recommended);
        self
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.provider.is_none()
            && self.tags.is_empty()
            && self.recommended.is_none()
            && self.available.is_none()
    }

    pub fn matches(&self, model: &Model) -> bool {
        if let Some(provider) = &self.provider
            && model.provider != *provider
        {
            return false;
        }
        if !self.tags.iter().all(|tag| model.has_tag(tag)) {
            return false;
        }
        if let Some(recommended) = self.recommended
            && model.recommended != recommended
        {
            return false;
        }
        if let Some(available) = self.available
            && model.available != available
        {
            return false;
        }
        true
    }
}
