//! Model catalog: known models, capability/availability metadata, and the
//! filtered query surface over them.
//!
//! The catalog is read-mostly: an external sync job pushes refreshed rows
//! through [`ModelCatalog::replace`]; everything else reads snapshots.

mod filter;
mod model;
mod store;

pub use filter::CatalogFilter;
pub use model::{Capabilities, Model, ModelId, Pricing};
pub use store::{
    ModelCatalog, ProviderGroup, filter_by_provider, filter_by_tag, find_by_id, group_by_provider,
};
