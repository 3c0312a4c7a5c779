use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogFilter, Model, ModelCatalog, ProviderGroup, group_by_provider};

/// Catalog query parameters as received from the UI/API layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Comma-joined tag list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl CatalogQuery {
    pub fn into_filter(self) -> CatalogFilter {
        CatalogFilter {
            provider: self.provider,
            tags: self
                .tags
                .map(|joined| {
                    joined
                        .split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            recommended: self.recommended,
            available: self.available,
        }
    }
}

/// Catalog query response wire contract.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub models: Vec<Model>,
    pub recommended: Vec<Model>,
    pub grouped_by_provider: Vec<ProviderGroup>,
}

impl CatalogResponse {
    pub fn build(catalog: &ModelCatalog, query: CatalogQuery) -> Self {
        let models = catalog.list(&query.into_filter());
        let recommended = models.iter().filter(|m| m.recommended).cloned().collect();
        let grouped_by_provider = group_by_provider(&models);
        Self {
            models,
            recommended,
            grouped_by_provider,
        }
    }
}
