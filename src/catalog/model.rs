use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Stable model identifier, unique within the catalog.
pub type ModelId = String;

/// One provider + model pair as known to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub id: ModelId,
    pub provider: String,
    pub display_name: String,
    pub context_window: u64,
    pub pricing: Pricing,
    pub capabilities: Capabilities,
    /// Unavailable models are excluded from resolution but still listed.
    pub available: bool,
    #[serde(default)]
    pub recommended: bool,
    /// Free-form tags; order is irrelevant.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Model {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// Per-token unit pricing in USD.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_token: Decimal,
    pub output_per_token: Decimal,
}

impl Pricing {
    pub const fn new(input_per_token: Decimal, output_per_token: Decimal) -> Self {
        Self {
            input_per_token,
            output_per_token,
        }
    }

    /// Cost of one attempt at this pricing.
    pub fn cost(&self, tokens_input: u64, tokens_output: u64) -> Decimal {
        Decimal::from(tokens_input) * self.input_per_token
            + Decimal::from(tokens_output) * self.output_per_token
    }
}

/// Capability flags surfaced to catalog queries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub streaming: bool,
    pub structured_output: bool,
    pub vision: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pricing_cost() {
        let pricing = Pricing::new(dec!(0.001), dec!(0.002));
        assert_eq!(pricing.cost(120, 80), dec!(0.28));
    }

    #[test]
    fn test_pricing_cost_zero_tokens() {
        let pricing = Pricing::new(dec!(0.001), dec!(0.002));
        assert_eq!(pricing.cost(0, 0), Decimal::ZERO);
    }

    #[test]
    fn test_tags_are_a_set() {
        let model = Model {
            id: "gpt-4o".into(),
            provider: "openai".into(),
            display_name: "GPT-4o".into(),
            context_window: 128_000,
            pricing: Pricing::default(),
            capabilities: Capabilities::default(),
            available: true,
            recommended: false,
            tags: ["legal", "vision", "legal"].iter().map(|s| s.to_string()).collect(),
        };
        assert_eq!(model.tags.len(), 2);
        assert!(model.has_tag("legal"));
        assert!(!model.has_tag("audio"));
    }
}
