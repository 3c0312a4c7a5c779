use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::watch;

use super::filter::CatalogFilter;
use super::model::{Model, ModelId};

/// Shared, read-mostly catalog of known models.
///
/// Readers work on immutable snapshots; the external sync collaborator swaps
/// in a fresh snapshot via [`ModelCatalog::replace`]. Subscribers observe a
/// version bump on every swap.
#[derive(Debug)]
pub struct ModelCatalog {
    snapshot: RwLock<Arc<Vec<Model>>>,
    changes: watch::Sender<u64>,
}

impl ModelCatalog {
    pub fn new(models: Vec<Model>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            snapshot: RwLock::new(Arc::new(dedup_by_id(models))),
            changes,
        }
    }

    /// Swap in a refreshed catalog. Called by the sync collaborator; the
    /// refresh schedule is not this component's concern.
    pub fn replace(&self, models: Vec<Model>) {
        let models = Arc::new(dedup_by_id(models));
        let count = models.len();
        *self.snapshot.write().unwrap_or_else(|e| e.into_inner()) = models;
        self.changes.send_modify(|version| *version += 1);
        tracing::debug!(models = count, "catalog snapshot replaced");
    }

    /// Current immutable snapshot, in catalog order.
    pub fn snapshot(&self) -> Arc<Vec<Model>> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Models matching the filter, in catalog order.
    pub fn list(&self, filter: &CatalogFilter) -> Vec<Model> {
        self.snapshot()
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect()
    }

    pub fn by_id(&self, id: &str) -> Option<Model> {
        self.snapshot().iter().find(|m| m.id == id).cloned()
    }

    pub fn is_available(&self, id: &str) -> bool {
        self.snapshot().iter().any(|m| m.id == id && m.available)
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Change notifications: the watched value is a monotonically increasing
    /// snapshot version.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

/// Identifier uniqueness is a catalog invariant; when the sync feed repeats
/// an id, the last row wins.
fn dedup_by_id(models: Vec<Model>) -> Vec<Model> {
    let mut seen: HashSet<ModelId> = HashSet::with_capacity(models.len());
    let mut out: Vec<Model> = Vec::with_capacity(models.len());
    for model in models.into_iter().rev() {
        if seen.insert(model.id.clone()) {
            out.push(model);
        } else {
            tracing::warn!(model = %model.id, "duplicate catalog id dropped");
        }
    }
    out.reverse();
    out
}

/// One provider bucket from [`group_by_provider`].
#[derive(Debug, Clone, Serialize)]
pub struct ProviderGroup {
    pub provider: String,
    pub models: Vec<Model>,
}

/// Group an already-fetched set by provider name. Bucket order and model
/// order within a bucket follow the input (catalog) order.
pub fn group_by_provider(models: &[Model]) -> Vec<ProviderGroup> {
    let mut groups: Vec<ProviderGroup> = Vec::new();
    for model in models {
        match groups.iter_mut().find(|g| g.provider == model.provider) {
            Some(group) => group.models.push(model.clone()),
            None => groups.push(ProviderGroup {
                provider: model.provider.clone(),
                models: vec![model.clone()],
            }),
        }
    }
    groups
}

/// Point lookup over an already-fetched set.
pub fn find_by_id<'a>(models: &'a [Model], id: &str) -> Option<&'a Model> {
    models.iter().find(|m| m.id == id)
}

pub fn filter_by_provider<'a>(models: &'a [Model], provider: &str) -> Vec<&'a Model> {
    models.iter().filter(|m| m.provider == provider).collect()
}

pub fn filter_by_tag<'a>(models: &'a [Model], tag: &str) -> Vec<&'a Model> {
    models.iter().filter(|m| m.has_tag(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{Capabilities, Pricing};

    fn model(id: &str, provider: &str, available: bool) -> Model {
        Model {
            id: id.into(),
            provider: provider.into(),
            display_name: id.to_uppercase(),
            context_window: 128_000,
            pricing: Pricing::default(),
            capabilities: Capabilities::default(),
            available,
            recommended: false,
            tags: Default::default(),
        }
    }

    #[test]
    fn test_list_preserves_catalog_order() {
        let catalog = ModelCatalog::new(vec![
            model("m1", "openai", true),
            model("m2", "anthropic", false),
            model("m3", "openai", true),
        ]);

        let all = catalog.list(&CatalogFilter::default());
        let ids: Vec<_> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m2", "m3"]);

        let available = catalog.list(&CatalogFilter::default().available(true));
        let ids: Vec<_> = available.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m1", "m3"]);
    }

    #[test]
    fn test_unavailable_listed_but_not_available() {
        let catalog = ModelCatalog::new(vec![model("m2", "anthropic", false)]);
        assert!(catalog.by_id("m2").is_some());
        assert!(!catalog.is_available("m2"));
    }

    #[test]
    fn test_duplicate_ids_last_wins() {
        let mut newer = model("m1", "openai", true);
        newer.display_name = "Newer".into();
        let catalog = ModelCatalog::new(vec![model("m1", "openai", false), newer]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.by_id("m1").unwrap().display_name, "Newer");
        assert!(catalog.is_available("m1"));
    }

    #[test]
    fn test_replace_bumps_version() {
        let catalog = ModelCatalog::new(vec![model("m1", "openai", true)]);
        let rx = catalog.subscribe();
        assert_eq!(*rx.borrow(), 0);

        catalog.replace(vec![model("m1", "openai", false), model("m2", "openai", true)]);
        assert_eq!(*rx.borrow(), 1);
        assert!(!catalog.is_available("m1"));
    }

    #[test]
    fn test_group_by_provider_insertion_order() {
        let models = vec![
            model("m1", "openai", true),
            model("m2", "anthropic", true),
            model("m3", "openai", true),
        ];
        let groups = group_by_provider(&models);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].provider, "openai");
        assert_eq!(groups[0].models.len(), 2);
        assert_eq!(groups[1].provider, "anthropic");
    }

    #[test]
    fn test_slice_helpers() {
        let mut tagged = model("m2", "anthropic", true);
        tagged.tags.insert("legal".into());
        let models = vec![model("m1", "openai", true), tagged];

        assert!(find_by_id(&models, "m2").is_some());
        assert!(find_by_id(&models, "missing").is_none());
        assert_eq!(filter_by_provider(&models, "openai").len(), 1);
        assert_eq!(filter_by_tag(&models, "legal").len(), 1);
    }
}
