//! Provider-call capability: the seam between the dispatch engine and the
//! actual network call to a language-model provider.

mod http;

use async_trait::async_trait;
use uuid::Uuid;

pub use http::HttpModelProvider;

use crate::Result;
use crate::auth::Credential;
use crate::catalog::ModelId;

/// One provider invocation for one candidate model.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub model: ModelId,
    pub conversation_id: Uuid,
    pub message: String,
    pub credential: Credential,
}

/// Successful provider reply with token figures as reported upstream.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub text: String,
    pub tokens_input: u64,
    pub tokens_output: u64,
}

/// Injected provider-call capability.
///
/// Implementations map every upstream failure (transport, non-2xx,
/// malformed body) to [`crate::Error::Provider`] so the engine can treat
/// them uniformly as per-attempt failures.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    async fn invoke(&self, request: &ProviderRequest) -> Result<ProviderReply>;
}
