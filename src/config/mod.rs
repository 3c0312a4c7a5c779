//! Dispatch configuration.
//!
//! Operators reorder the fallback list to change dispatch behavior without
//! code changes; the list is the sole tie-break between candidates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::ModelId;
use crate::dispatch::ExplicitFailurePolicy;
use crate::{Error, Result};

const DEFAULT_CALL_TIMEOUT_SECS: u64 = 60;

const ENV_CALL_TIMEOUT: &str = "EDITAL_AGENT_CALL_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Fixed, globally shared retry precedence. Models not listed are only
    /// reachable via explicit preference, never via fallback.
    #[serde(default)]
    pub fallback_order: Vec<ModelId>,

    /// Per-provider-call timeout; a timeout counts as a provider failure.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,

    /// Whether an explicit model request falls through to the fallback
    /// chain after failing.
    #[serde(default)]
    pub explicit_failure: ExplicitFailurePolicy,
}

fn default_call_timeout_secs() -> u64 {
    DEFAULT_CALL_TIMEOUT_SECS
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            fallback_order: Vec::new(),
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            explicit_failure: ExplicitFailurePolicy::default(),
        }
    }
}

impl DispatchConfig {
    pub fn with_fallback_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModelId>,
    {
        self.fallback_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_explicit_failure(mut self, policy: ExplicitFailurePolicy) -> Self {
        self.explicit_failure = policy;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Environment override for the call timeout, applied on top of the
    /// loaded config.
    pub fn apply_env(mut self) -> Self {
        if let Ok(raw) = std::env::var(ENV_CALL_TIMEOUT) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.call_timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_CALL_TIMEOUT}"),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_secs == 0 {
            return Err(Error::Config("call_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchConfig::default();
        assert!(config.fallback_order.is_empty());
        assert_eq!(config.call_timeout(), Duration::from_secs(60));
        assert_eq!(config.explicit_failure, ExplicitFailurePolicy::Stop);
    }

    #[test]
    fn test_from_json_with_defaults() {
        let config =
            DispatchConfig::from_json(r#"{"fallback_order": ["m1", "m2", "m3"]}"#).unwrap();
        assert_eq!(config.fallback_order, ["m1", "m2", "m3"]);
        assert_eq!(config.call_timeout_secs, 60);
    }

    #[test]
    fn test_from_json_rejects_zero_timeout() {
        let err = DispatchConfig::from_json(r#"{"call_timeout_secs": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_explicit_failure_policy_parses() {
        let config =
            DispatchConfig::from_json(r#"{"explicit_failure": "fallthrough"}"#).unwrap();
        assert_eq!(config.explicit_failure, ExplicitFailurePolicy::Fallthrough);
    }

    #[test]
    fn test_builder_chain() {
        let config = DispatchConfig::default()
            .with_fallback_order(["m1", "m2"])
            .with_call_timeout(Duration::from_secs(15))
            .with_explicit_failure(ExplicitFailurePolicy::Fallthrough);
        assert_eq!(config.fallback_order, ["m1", "m2"]);
        assert_eq!(config.call_timeout_secs, 15);
    }
}
