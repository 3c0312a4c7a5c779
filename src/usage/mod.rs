//! Usage accounting: immutable per-attempt records and recomputable period
//! summaries.
//!
//! Attempt records capture the pricing in effect at attempt time, so
//! historical summaries stay stable when catalog pricing later changes.
//! Summaries are never persisted truth; they are always re-derived by
//! folding records.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use memory::MemoryUsageLog;

use crate::Result;
use crate::catalog::ModelId;

/// One outcome of trying a specific model for a chat request. Immutable
/// once recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub conversation_id: Uuid,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    pub model_id: ModelId,
    pub success: bool,
    /// Zero on failure.
    pub tokens_input: u64,
    /// Zero on failure.
    pub tokens_output: u64,
    /// Priced at attempt time; zero on failure.
    pub cost_usd: Decimal,
    pub elapsed_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Reporting period, as a trailing window ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Day => now - Duration::days(1),
            Period::Week => now - Duration::weeks(1),
            Period::Month => now - Duration::days(30),
        }
    }
}

/// Optional narrowing of a summary to one user and/or one agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
}

impl UsageScope {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            agent_id: None,
        }
    }

    pub fn matches(&self, record: &AttemptRecord) -> bool {
        if let Some(user) = &self.user_id
            && record.user_id != *user
        {
            return false;
        }
        if let Some(agent) = &self.agent_id
            && record.agent_id.as_deref() != Some(agent.as_str())
        {
            return false;
        }
        true
    }
}

/// Derived aggregate over attempt records for one period and scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSummary {
    pub period: Period,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    /// Successful chat turns.
    pub messages: u64,
    pub failures: u64,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cost_usd: Decimal,
    pub by_model: Vec<ModelUsage>,
    pub by_agent: Vec<AgentUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelUsage {
    pub model_id: ModelId,
    pub messages: u64,
    pub failures: u64,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cost_usd: Decimal,
}

impl ModelUsage {
    fn empty(model_id: ModelId) -> Self {
        Self {
            model_id,
            messages: 0,
            failures: 0,
            tokens_input: 0,
            tokens_output: 0,
            cost_usd: Decimal::ZERO,
        }
    }

    fn fold(&mut self, record: &AttemptRecord) {
        if record.success {
            self.messages += 1;
        } else {
            self.failures += 1;
        }
        self.tokens_input += record.tokens_input;
        self.tokens_output += record.tokens_output;
        self.cost_usd += record.cost_usd;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentUsage {
    /// `None` is the default (no-agent) bucket.
    pub agent_id: Option<String>,
    pub messages: u64,
    pub failures: u64,
    pub tokens_input: u64,
    pub tokens_output: u64,
    pub cost_usd: Decimal,
}

impl AgentUsage {
    fn empty(agent_id: Option<String>) -> Self {
        Self {
            agent_id,
            messages: 0,
            failures: 0,
            tokens_input: 0,
            tokens_output: 0,
            cost_usd: Decimal::ZERO,
        }
    }

    fn fold(&mut self, record: &AttemptRecord) {
        if record.success {
            self.messages += 1;
        } else {
            self.failures += 1;
        }
        self.tokens_input += record.tokens_input;
        self.tokens_output += record.tokens_output;
        self.cost_usd += record.cost_usd;
    }
}

/// Telemetry sink for attempt records.
///
/// `record` failures must never fail the caller's chat turn; the engine
/// logs and swallows them.
#[async_trait]
pub trait UsageSink: Send + Sync {
    async fn record(&self, record: AttemptRecord) -> Result<()>;

    async fn summarize(&self, period: Period, scope: &UsageScope) -> Result<UsageSummary>;
}

/// Fold records into a summary. Pure; `now` is injected so summaries are
/// reproducible.
pub fn summarize_records(
    records: &[AttemptRecord],
    period: Period,
    scope: &UsageScope,
    now: DateTime<Utc>,
) -> UsageSummary {
    let from = period.cutoff(now);
    let mut summary = UsageSummary {
        period,
        from,
        to: now,
        messages: 0,
        failures: 0,
        tokens_input: 0,
        tokens_output: 0,
        cost_usd: Decimal::ZERO,
        by_model: Vec::new(),
        by_agent: Vec::new(),
    };

    for record in records {
        if record.timestamp < from || record.timestamp > now || !scope.matches(record) {
            continue;
        }

        if record.success {
            summary.messages += 1;
        } else {
            summary.failures += 1;
        }
        summary.tokens_input += record.tokens_input;
        summary.tokens_output += record.tokens_output;
        summary.cost_usd += record.cost_usd;

        if let Some(bucket) = summary
            .by_model
            .iter_mut()
            .find(|b| b.model_id == record.model_id)
        {
            bucket.fold(record);
        } else {
            let mut bucket = ModelUsage::empty(record.model_id.clone());
            bucket.fold(record);
            summary.by_model.push(bucket);
        }

        if let Some(bucket) = summary
            .by_agent
            .iter_mut()
            .find(|b| b.agent_id == record.agent_id)
        {
            bucket.fold(record);
        } else {
            let mut bucket = AgentUsage::empty(record.agent_id.clone());
            bucket.fold(record);
            summary.by_agent.push(bucket);
        }
    }

    summary
}
