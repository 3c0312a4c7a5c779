use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::auth::SessionProvider;
use crate::catalog::ModelId;
use crate::dispatch::{DispatchEngine, RequestContext};
use crate::usage::{Period, UsageScope, UsageSummary};
use crate::{Error, Result};

/// Chat dispatch request as consumed from the UI/API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Absent for the first turn of a conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub user_id: String,
    /// Explicit model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<ModelId>,
}

/// Chat dispatch response wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Echo of the user message.
    pub message: String,
    pub response: String,
    pub model_used: ModelId,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cost_usd: Decimal,
    pub processing_time_ms: u64,
}

/// Front door for chat turns: validation, then authentication, then
/// resolution and dispatch.
pub struct ChatService {
    engine: DispatchEngine,
    sessions: Arc<dyn SessionProvider>,
}

impl ChatService {
    pub fn new(engine: DispatchEngine, sessions: Arc<dyn SessionProvider>) -> Self {
        Self { engine, sessions }
    }

    pub fn engine(&self) -> &DispatchEngine {
        &self.engine
    }

    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.chat_with_cancel(request, &CancellationToken::new())
            .await
    }

    /// Chat turn tied to the caller's cancellation context: the fallback
    /// loop stops before its next provider call once the token fires.
    pub async fn chat_with_cancel(
        &self,
        request: ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<ChatResponse> {
        validate(&request)?;

        // Hard precondition: no candidate is attempted without a session.
        let credential = self
            .sessions
            .bearer()
            .await
            .map_err(|err| match err {
                Error::NotAuthenticated(_) => err,
                other => Error::not_authenticated(other.to_string()),
            })?;

        let mut ctx = RequestContext::new(request.user_id.clone());
        if let Some(agent) = request.agent_id.clone() {
            ctx = ctx.with_agent(agent);
        }
        if let Some(model) = request.model_id.clone() {
            ctx = ctx.with_model(model);
        }

        let conversation_id = request.conversation_id.unwrap_or_else(Uuid::new_v4);
        let outcome = self
            .engine
            .dispatch(&ctx, conversation_id, &request.message, &credential, cancel)
            .await?;

        Ok(ChatResponse {
            message: request.message,
            response: outcome.text,
            model_used: outcome.model_used,
            tokens_input: outcome.tokens_input,
            tokens_output: outcome.tokens_output,
            cost_usd: outcome.cost_usd,
            processing_time_ms: outcome.elapsed.as_millis() as u64,
        })
    }

    /// Read-only usage summary for the reporting UI.
    pub async fn usage_summary(&self, period: Period, scope: &UsageScope) -> Result<UsageSummary> {
        self.engine.usage().summarize(period, scope).await
    }
}

fn validate(request: &ChatRequest) -> Result<()> {
    if request.user_id.trim().is_empty() {
        return Err(Error::validation("userId must not be empty"));
    }
    if request.message.trim().is_empty() {
        return Err(Error::validation("message must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rules() {
        let ok = ChatRequest {
            conversation_id: None,
            message: "hello".into(),
            agent_id: None,
            user_id: "u1".into(),
            model_id: None,
        };
        assert!(validate(&ok).is_ok());

        let no_user = ChatRequest {
            user_id: "  ".into(),
            ..ok.clone()
        };
        assert!(matches!(validate(&no_user), Err(Error::Validation(_))));

        let no_message = ChatRequest {
            message: String::new(),
            ..ok
        };
        assert!(matches!(validate(&no_message), Err(Error::Validation(_))));
    }
}
