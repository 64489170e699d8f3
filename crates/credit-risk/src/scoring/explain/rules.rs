//! The ordered reason rules.

use super::super::domain::{RawInput, StatementMonth};
use super::super::features::{FeatureRecord, AVG_PAYMENT_RATIO, MAX_UTILIZATION};
use super::config::{ExplainerConfig, RecentPaymentRule};

/// Evaluates every rule in display order. Truncation happens in the caller.
pub(crate) fn collect_reasons(
    input: &RawInput,
    record: &FeatureRecord,
    config: &ExplainerConfig,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if let Some(months) = input.repayment(StatementMonth::September).months_late() {
        reasons.push(format!("Recent payment {months} month(s) late"));
    }
    if input.repayment(StatementMonth::August).is_late() {
        reasons.push("Payment delay 2 months ago".to_string());
    }
    if input.repayment(StatementMonth::July).is_late() {
        reasons.push("History of late payments".to_string());
    }

    if input.credit_limit < config.low_credit_limit {
        reasons.push("Low credit limit".to_string());
    }

    if recent_payments_low(input, config.recent_payment_rule) {
        reasons.push("Very low recent payments".to_string());
    }

    // Aggregate rules only apply when the layout derived them.
    if let Some(max_utilization) = record.get(MAX_UTILIZATION) {
        if max_utilization > config.high_utilization_pct {
            reasons.push(format!("High credit utilization ({max_utilization:.0}%)"));
        } else if max_utilization > config.moderate_utilization_pct {
            reasons.push(format!(
                "Moderate credit utilization ({max_utilization:.0}%)"
            ));
        }
    }

    if let Some(avg_ratio) = record.get(AVG_PAYMENT_RATIO) {
        if avg_ratio < config.minimal_payment_ratio {
            reasons.push("Minimal payment history".to_string());
        }
    }

    reasons
}

fn recent_payments_low(input: &RawInput, rule: RecentPaymentRule) -> bool {
    match rule {
        RecentPaymentRule::CombinedLastTwo { floor } => {
            let last = input.payment(StatementMonth::September).unwrap_or(0) as u64;
            let previous = input.payment(StatementMonth::August).unwrap_or(0) as u64;
            last + previous < floor as u64
        }
        RecentPaymentRule::LastMonth { floor } => input.latest_payment() < floor,
    }
}
