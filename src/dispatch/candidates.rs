use serde::{Deserialize, Serialize};

use super::RequestContext;
use crate::catalog::{Model, ModelId, find_by_id};

/// Fixed, globally shared retry precedence. The list index is the sole
/// tie-break; there is no scoring or latency-based reordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FallbackOrder(Vec<ModelId>);

impl FallbackOrder {
    pub fn new<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        Self(order.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelId> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<ModelId>> FromIterator<S> for FallbackOrder {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Construct the ordered candidate list for a request. Pure and
/// deterministic.
///
/// An explicit model is the sole candidate regardless of availability (the
/// flag may be stale; it still gets exactly one attempt at dispatch time).
/// Otherwise the stored preference leads when the catalog marks it
/// available, followed by the fallback order filtered to available models,
/// skipping anything already placed earlier.
pub fn build_candidates(
    ctx: &RequestContext,
    preference: Option<&str>,
    catalog: &[Model],
    order: &FallbackOrder,
) -> Vec<ModelId> {
    if let Some(explicit) = &ctx.explicit_model {
        return vec![explicit.clone()];
    }

    let mut candidates: Vec<ModelId> = Vec::new();
    if let Some(preferred) = preference
        && is_available(catalog, preferred)
    {
        candidates.push(preferred.to_string());
    }
    extend_with_fallback(&mut candidates, catalog, order);
    candidates
}

/// Append the availability-filtered fallback order, deduplicating against
/// models already in the list. Used both at construction time and when the
/// fallthrough policy extends past a failed explicit attempt.
pub(crate) fn extend_with_fallback(
    candidates: &mut Vec<ModelId>,
    catalog: &[Model],
    order: &FallbackOrder,
) {
    for model_id in order.iter() {
        if is_available(catalog, model_id) && !candidates.contains(model_id) {
            candidates.push(model_id.clone());
        }
    }
}

fn is_available(catalog: &[Model], id: &str) -> bool {
    find_by_id(catalog, id).map(|m| m.available).unwrap_or(false)
}
