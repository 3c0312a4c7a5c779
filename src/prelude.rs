//! Convenience re-exports for typical usage.
//!
//! ```rust
//! use edital_agent::prelude::*;
//! ```

pub use crate::auth::{Credential, SessionProvider, StaticSessionProvider};
pub use crate::catalog::{
    Capabilities, CatalogFilter, Model, ModelCatalog, ModelId, Pricing, ProviderGroup,
};
pub use crate::config::DispatchConfig;
pub use crate::dispatch::{
    DispatchEngine, DispatchOutcome, ExplicitFailurePolicy, FallbackOrder, RequestContext,
};
pub use crate::preferences::{MemoryPreferenceStore, PreferenceKey, PreferenceStore};
pub use crate::provider::{HttpModelProvider, ModelProvider, ProviderReply, ProviderRequest};
pub use crate::service::{
    CatalogQuery, CatalogResponse, ChatRequest, ChatResponse, ChatService, PreferenceService,
};
pub use crate::usage::{
    AttemptRecord, MemoryUsageLog, Period, UsageScope, UsageSink, UsageSummary,
};
pub use crate::{Error, Result};
