//! Human-readable risk reasons, evaluated independently of the classifier.

mod config;
mod rules;

pub use config::{ExplainerConfig, RecentPaymentRule};

use serde::{Deserialize, Serialize};

use super::domain::{FormVariant, RawInput};
use super::features::FeatureRecord;

/// Shown when no risk rule fires, so the list is never empty.
pub const FALLBACK_REASONS: [&str; 3] = [
    "Strong repayment history",
    "Healthy credit limit",
    "Consistent payments",
];

/// Ordered, capped list of human-readable risk reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonList {
    reasons: Vec<String>,
    fallback: bool,
}

impl ReasonList {
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// True when no rule fired and the positive fallback list was substituted.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.reasons
    }
}

/// Rule-based explainer evaluated independently of the classifier.
#[derive(Debug, Clone)]
pub struct Explainer {
    config: ExplainerConfig,
}

impl Explainer {
    pub fn new(config: ExplainerConfig) -> Self {
        Self { config }
    }

    pub fn for_variant(variant: FormVariant) -> Self {
        Self::new(ExplainerConfig::for_variant(variant))
    }

    pub fn config(&self) -> &ExplainerConfig {
        &self.config
    }

    pub fn explain(&self, input: &RawInput, record: &FeatureRecord) -> ReasonList {
        let mut reasons = rules::collect_reasons(input, record, &self.config);
        let fallback = reasons.is_empty();
        if fallback {
            reasons = FALLBACK_REASONS.iter().map(|r| r.to_string()).collect();
        }

        reasons.truncate(self.config.max_reasons.max(1));
        ReasonList { reasons, fallback }
    }
}
