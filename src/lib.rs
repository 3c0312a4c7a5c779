//! # edital-agent
//!
//! Model resolution, fallback dispatch and usage accounting core for the
//! Editais AI assistant backend.
//!
//! Given a chat request for a user and an optional agent persona, this crate
//! resolves which provider model to invoke (explicit override, stored
//! preference, or the shared fallback order), drives sequential attempts
//! against an injected provider-call capability until one succeeds, and
//! records token/cost/latency telemetry for every attempt.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use edital_agent::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), edital_agent::Error> {
//!     let catalog = Arc::new(ModelCatalog::new(vec![]));
//!     let preferences = Arc::new(MemoryPreferenceStore::new());
//!     let usage = Arc::new(MemoryUsageLog::new());
//!     let sessions = Arc::new(StaticSessionProvider::new("service-token"));
//!     let provider = Arc::new(HttpModelProvider::new("https://llm-gateway.internal")?);
//!
//!     let config = DispatchConfig::default()
//!         .with_fallback_order(["gpt-4o", "claude-sonnet-4", "gemini-pro"]);
//!     let engine = DispatchEngine::new(catalog, preferences, provider, usage, config);
//!     let service = ChatService::new(engine, sessions);
//!
//!     let response = service
//!         .chat(ChatRequest {
//!             conversation_id: None,
//!             message: "Summarize tender 042/2026".into(),
//!             agent_id: Some("editais-analyst".into()),
//!             user_id: "user-17".into(),
//!             model_id: None,
//!         })
//!         .await?;
//!     println!("{} answered: {}", response.model_used, response.response);
//!     Ok(())
//! }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod auth;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod preferences;
pub mod prelude;
pub mod provider;
pub mod service;
pub mod usage;

pub use auth::{Credential, SessionProvider, StaticSessionProvider};
pub use catalog::{
    Capabilities, CatalogFilter, Model, ModelCatalog, ModelId, Pricing, ProviderGroup,
    filter_by_provider, filter_by_tag, find_by_id, group_by_provider,
};
pub use config::DispatchConfig;
pub use dispatch::{
    DispatchEngine, DispatchOutcome, ExplicitFailurePolicy, FallbackOrder, RequestContext,
    build_candidates,
};
pub use preferences::{MemoryPreferenceStore, PreferenceKey, PreferenceStore};
pub use provider::{HttpModelProvider, ModelProvider, ProviderReply, ProviderRequest};
pub use service::{
    CatalogQuery, CatalogResponse, ChatRequest, ChatResponse, ChatService, PreferenceService,
};
pub use usage::{AttemptRecord, MemoryUsageLog, Period, UsageScope, UsageSink, UsageSummary};

/// Error type for edital-agent operations.
///
/// Precondition failures (`Validation`, `NotAuthenticated`,
/// `NoAvailableModel`) are raised before any provider call is made;
/// `AllModelsFailed` is the only terminal failure that represents the
/// engine having tried its best.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Malformed request; rejected before any resolution work.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Missing or invalid bearer credential.
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    /// Candidate list was empty at construction; no provider calls made.
    #[error("No available model to serve this request")]
    NoAvailableModel,

    /// A single provider call failed.
    #[error("Provider error from {model}{}: {message}", status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Provider {
        model: String,
        message: String,
        status: Option<u16>,
    },

    /// A single provider call exceeded its timeout.
    #[error("Provider call to {model} timed out after {:.1}s", .elapsed.as_secs_f64())]
    ProviderTimeout {
        model: String,
        elapsed: std::time::Duration,
    },

    /// Every candidate was attempted and all failed.
    #[error("All {} candidate models failed", .attempts.len())]
    AllModelsFailed { attempts: Vec<FailedAttempt> },

    /// The calling context was cancelled between candidates.
    #[error("Dispatch cancelled before completion")]
    Cancelled,

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// One failed candidate within an [`Error::AllModelsFailed`] outcome.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FailedAttempt {
    pub model: String,
    pub reason: String,
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Error::NotAuthenticated(message.into())
    }

    pub fn provider(model: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            model: model.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Failure raised before any candidate was attempted.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::Validation(_) | Error::NotAuthenticated(_) | Error::NoAvailableModel
        )
    }

    /// Per-attempt failure that drives the fallback loop.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Error::Provider { .. } | Error::ProviderTimeout { .. } | Error::Network(_)
        )
    }

    /// Terminal "the system tried its best" outcome.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::AllModelsFailed { .. })
    }

    /// Models attempted before an exhausted outcome, in attempt order.
    pub fn attempted_models(&self) -> Option<Vec<&str>> {
        match self {
            Error::AllModelsFailed { attempts } => {
                Some(attempts.iter().map(|a| a.model.as_str()).collect())
            }
            _ => None,
        }
    }
}

/// Result alias for edital-agent operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert!(Error::validation("missing userId").is_precondition());
        assert!(Error::not_authenticated("no session").is_precondition());
        assert!(Error::NoAvailableModel.is_precondition());

        let provider = Error::provider("gpt-4o", "upstream 502");
        assert!(provider.is_provider_failure());
        assert!(!provider.is_precondition());

        let exhausted = Error::AllModelsFailed {
            attempts: vec![FailedAttempt {
                model: "gpt-4o".into(),
                reason: "timeout".into(),
            }],
        };
        assert!(exhausted.is_exhausted());
        assert_eq!(exhausted.attempted_models(), Some(vec!["gpt-4o"]));
    }

    #[test]
    fn test_provider_error_display() {
        let err = Error::Provider {
            model: "gpt-4o".into(),
            message: "bad gateway".into(),
            status: Some(502),
        };
        assert_eq!(
            err.to_string(),
            "Provider error from gpt-4o (HTTP 502): bad gateway"
        );
    }
}
