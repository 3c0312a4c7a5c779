use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::candidates::{FallbackOrder, build_candidates, extend_with_fallback};
use super::{ExplicitFailurePolicy, RequestContext};
use crate::auth::Credential;
use crate::catalog::{Model, ModelCatalog, ModelId, Pricing, find_by_id};
use crate::config::DispatchConfig;
use crate::preferences::PreferenceStore;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::usage::{AttemptRecord, UsageSink};
use crate::{Error, FailedAttempt, Result};

/// Successful dispatch outcome: the reply plus the figures recorded for it.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub model_used: ModelId,
    pub text: String,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cost_usd: Decimal,
    pub elapsed: Duration,
}

/// Drives resolution and sequential fallback attempts for chat requests.
///
/// Candidates are strictly ordered by preference; a later candidate is
/// never tried before an earlier one has definitively failed, and never
/// concurrently with it.
pub struct DispatchEngine {
    catalog: Arc<ModelCatalog>,
    preferences: Arc<dyn PreferenceStore>,
    provider: Arc<dyn ModelProvider>,
    usage: Arc<dyn UsageSink>,
    config: DispatchConfig,
}

impl DispatchEngine {
    pub fn new(
        catalog: Arc<ModelCatalog>,
        preferences: Arc<dyn PreferenceStore>,
        provider: Arc<dyn ModelProvider>,
        usage: Arc<dyn UsageSink>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            catalog,
            preferences,
            provider,
            usage,
            config,
        }
    }

    pub fn catalog(&self) -> &Arc<ModelCatalog> {
        &self.catalog
    }

    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.preferences
    }

    pub fn usage(&self) -> &Arc<dyn UsageSink> {
        &self.usage
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Resolve the candidate list for a request without dispatching.
    pub async fn resolve_candidates(&self, ctx: &RequestContext) -> Vec<ModelId> {
        let snapshot = self.catalog.snapshot();
        let preference = self.lookup_preference(ctx).await;
        let order = self.fallback_order();
        build_candidates(ctx, preference.as_deref(), &snapshot, &order)
    }

    /// Dispatch one chat turn: resolve candidates, then try each in order
    /// until one succeeds or the list is exhausted.
    pub async fn dispatch(
        &self,
        ctx: &RequestContext,
        conversation_id: Uuid,
        message: &str,
        credential: &Credential,
        cancel: &CancellationToken,
    ) -> Result<DispatchOutcome> {
        let snapshot = self.catalog.snapshot();
        let preference = self.lookup_preference(ctx).await;
        let order = self.fallback_order();
        let mut queue = build_candidates(ctx, preference.as_deref(), &snapshot, &order);

        if queue.is_empty() {
            tracing::info!(user = %ctx.user_id, "no available model; nothing dispatched");
            return Err(Error::NoAvailableModel);
        }

        tracing::debug!(user = %ctx.user_id, candidates = ?queue, "candidate list resolved");

        let mut failures: Vec<FailedAttempt> = Vec::new();
        let mut index = 0;
        while index < queue.len() {
            // A client disconnect stops the loop before the next call; an
            // in-flight call is never interrupted here.
            if cancel.is_cancelled() {
                tracing::info!(user = %ctx.user_id, attempted = failures.len(), "dispatch cancelled");
                return Err(Error::Cancelled);
            }

            let model_id = queue[index].clone();
            let pricing = attempt_pricing(&snapshot, &model_id);
            let started = Instant::now();
            let result = self
                .attempt(&model_id, conversation_id, message, credential)
                .await;
            let elapsed = started.elapsed();

            match result {
                Ok((reply_text, tokens_input, tokens_output)) => {
                    let cost_usd = pricing.cost(tokens_input, tokens_output);
                    self.record(AttemptRecord {
                        conversation_id,
                        user_id: ctx.user_id.clone(),
                        agent_id: ctx.agent_id.clone(),
                        model_id: model_id.clone(),
                        success: true,
                        tokens_input,
                        tokens_output,
                        cost_usd,
                        elapsed_ms: elapsed.as_millis() as u64,
                        timestamp: Utc::now(),
                    })
                    .await;

                    tracing::info!(
                        user = %ctx.user_id,
                        model = %model_id,
                        attempt = index + 1,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "dispatch succeeded"
                    );
                    return Ok(DispatchOutcome {
                        model_used: model_id,
                        text: reply_text,
                        tokens_input,
                        tokens_output,
                        cost_usd,
                        elapsed,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        user = %ctx.user_id,
                        model = %model_id,
                        attempt = index + 1,
                        error = %err,
                        "attempt failed"
                    );
                    self.record(AttemptRecord {
                        conversation_id,
                        user_id: ctx.user_id.clone(),
                        agent_id: ctx.agent_id.clone(),
                        model_id: model_id.clone(),
                        success: false,
                        tokens_input: 0,
                        tokens_output: 0,
                        cost_usd: Decimal::ZERO,
                        elapsed_ms: elapsed.as_millis() as u64,
                        timestamp: Utc::now(),
                    })
                    .await;
                    failures.push(FailedAttempt {
                        model: model_id,
                        reason: err.to_string(),
                    });

                    // The failed explicit attempt may open the fallback
                    // chain, depending on policy.
                    if index == 0
                        && ctx.explicit_model.is_some()
                        && self.config.explicit_failure == ExplicitFailurePolicy::Fallthrough
                    {
                        extend_with_fallback(&mut queue, &snapshot, &order);
                    }
                }
            }
            index += 1;
        }

        Err(Error::AllModelsFailed { attempts: failures })
    }

    async fn attempt(
        &self,
        model_id: &str,
        conversation_id: Uuid,
        message: &str,
        credential: &Credential,
    ) -> Result<(String, u64, u64)> {
        let request = ProviderRequest {
            model: model_id.to_string(),
            conversation_id,
            message: message.to_string(),
            credential: credential.clone(),
        };

        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, self.provider.invoke(&request)).await {
            Ok(Ok(reply)) => Ok((reply.text, reply.tokens_input, reply.tokens_output)),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(Error::ProviderTimeout {
                model: model_id.to_string(),
                elapsed: timeout,
            }),
        }
    }

    /// Preference lookup failures degrade to the fallback order rather
    /// than failing the chat turn.
    async fn lookup_preference(&self, ctx: &RequestContext) -> Option<ModelId> {
        if ctx.explicit_model.is_some() {
            return None;
        }
        match self
            .preferences
            .get(&ctx.user_id, ctx.agent_id.as_deref())
            .await
        {
            Ok(preference) => preference,
            Err(err) => {
                tracing::warn!(user = %ctx.user_id, error = %err, "preference lookup failed");
                None
            }
        }
    }

    fn fallback_order(&self) -> FallbackOrder {
        FallbackOrder::new(self.config.fallback_order.iter().cloned())
    }

    /// Telemetry must never fail the caller's request.
    async fn record(&self, record: AttemptRecord) {
        if let Err(err) = self.usage.record(record).await {
            tracing::warn!(error = %err, "usage record dropped");
        }
    }
}

/// Pricing in effect at attempt time. Models unknown to the catalog (an
/// explicit override of an unlisted id) are priced at zero; the record
/// still carries token counts.
fn attempt_pricing(catalog: &[Model], model_id: &str) -> Pricing {
    match find_by_id(catalog, model_id) {
        Some(model) => model.pricing,
        None => {
            tracing::warn!(model = %model_id, "model missing from catalog; cost recorded as zero");
            Pricing::default()
        }
    }
}
