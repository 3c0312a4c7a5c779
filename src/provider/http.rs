use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ModelProvider, ProviderReply, ProviderRequest};
use crate::{Error, Result};

/// JSON-over-HTTP provider adapter.
///
/// Posts the conversation payload to the gateway's `/v1/chat` endpoint with
/// the session bearer token. Timeouts are owned by the dispatch engine, not
/// by this client.
#[derive(Debug, Clone)]
pub struct HttpModelProvider {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    conversation_id: Uuid,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct WireReply {
    response: String,
    #[serde(default)]
    tokens_input: u64,
    #[serde(default)]
    tokens_output: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    error: String,
}

impl HttpModelProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { client, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat", self.base_url)
    }
}

#[async_trait]
impl ModelProvider for HttpModelProvider {
    fn name(&self) -> &str {
        "http-gateway"
    }

    async fn invoke(&self, request: &ProviderRequest) -> Result<ProviderReply> {
        let body = WireRequest {
            model: &request.model,
            conversation_id: request.conversation_id,
            message: &request.message,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(request.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Provider {
                model: request.model.clone(),
                message: format!("transport: {e}"),
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<WireError>()
                .await
                .map(|e| e.error)
                .unwrap_or_default();
            return Err(Error::Provider {
                model: request.model.clone(),
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
                status: Some(status.as_u16()),
            });
        }

        let reply: WireReply = response.json().await.map_err(|e| Error::Provider {
            model: request.model.clone(),
            message: format!("malformed response: {e}"),
            status: Some(status.as_u16()),
        })?;

        tracing::debug!(
            model = %request.model,
            tokens_input = reply.tokens_input,
            tokens_output = reply.tokens_output,
            "provider call succeeded"
        );

        Ok(ProviderReply {
            text: reply.response,
            tokens_input: reply.tokens_input,
            tokens_output: reply.tokens_output,
        })
    }
}
