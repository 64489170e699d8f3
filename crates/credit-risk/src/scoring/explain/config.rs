//! Per-variant thresholds and caps.

use serde::{Deserialize, Serialize};

use super::super::domain::FormVariant;

/// Thresholds and caps for the reason rules of one form variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainerConfig {
    pub max_reasons: usize,
    pub low_credit_limit: u32,
    pub recent_payment_rule: RecentPaymentRule,
    pub high_utilization_pct: f64,
    pub moderate_utilization_pct: f64,
    pub minimal_payment_ratio: f64,
}

/// The two forms judge "very low recent payments" differently and the rules are kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecentPaymentRule {
    /// Last two payments summed fall below the floor.
    CombinedLastTwo { floor: u32 },
    /// Last payment alone falls below the floor.
    LastMonth { floor: u32 },
}

impl ExplainerConfig {
    pub fn for_variant(variant: FormVariant) -> Self {
        match variant {
            FormVariant::Basic => Self {
                max_reasons: 4,
                recent_payment_rule: RecentPaymentRule::CombinedLastTwo { floor: 5_000 },
                ..Self::shared()
            },
            FormVariant::Extended => Self {
                max_reasons: 5,
                recent_payment_rule: RecentPaymentRule::LastMonth { floor: 2_500 },
                ..Self::shared()
            },
        }
    }

    fn shared() -> Self {
        Self {
            max_reasons: 5,
            low_credit_limit: 100_000,
            recent_payment_rule: RecentPaymentRule::LastMonth { floor: 2_500 },
            high_utilization_pct: 80.0,
            moderate_utilization_pct: 50.0,
            minimal_payment_ratio: 0.1,
        }
    }
}
