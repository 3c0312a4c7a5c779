//! External interfaces: the chat dispatch contract, the catalog query
//! surface, and the preference mutation surface consumed by the UI/API
//! layer.

mod catalog_query;
mod chat;
mod prefs;

pub use catalog_query::{CatalogQuery, CatalogResponse};
pub use chat::{ChatRequest, ChatResponse, ChatService};
pub use prefs::PreferenceService;
