//! Utilization and payment ratio math behind the Extended aggregates.

use serde::{Deserialize, Serialize};

use super::backfill::StatementHistory;

/// Per-month utilization and payment ratios. Computed for every evaluation and then
/// reduced to [`RatioAggregates`]; the monthly values never reach the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRatios {
    pub utilization: Vec<f64>,
    pub payment_ratio: Vec<f64>,
}

/// Aggregates retained in the feature record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioAggregates {
    pub avg_utilization: f64,
    pub max_utilization: f64,
    pub avg_payment_ratio: f64,
    pub min_payment_ratio: f64,
}

impl MonthlyRatios {
    pub fn compute(credit_limit: u32, history: &StatementHistory) -> Self {
        let limit = credit_limit as f64;
        let utilization = history
            .bills
            .iter()
            .map(|bill| utilization(*bill, limit))
            .collect();
        let payment_ratio = history
            .payments
            .iter()
            .zip(&history.bills)
            .map(|(payment, bill)| payment_ratio(*payment, *bill))
            .collect();

        Self {
            utilization,
            payment_ratio,
        }
    }

    pub fn aggregates(&self) -> RatioAggregates {
        RatioAggregates {
            avg_utilization: mean(&self.utilization),
            max_utilization: extreme(&self.utilization, f64::max),
            avg_payment_ratio: mean(&self.payment_ratio),
            min_payment_ratio: extreme(&self.payment_ratio, f64::min),
        }
    }
}

/// Bill as a percentage of the credit limit. A zero limit reports zero utilization.
pub fn utilization(bill: f64, credit_limit: f64) -> f64 {
    if credit_limit <= 0.0 {
        return 0.0;
    }
    bill / credit_limit * 100.0
}

/// Share of the bill that was paid. Defined as zero for an empty bill.
pub fn payment_ratio(payment: f64, bill: f64) -> f64 {
    if bill == 0.0 {
        return 0.0;
    }
    payment / bill
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn extreme(values: &[f64], pick: fn(f64, f64) -> f64) -> f64 {
    values.iter().copied().reduce(pick).unwrap_or(0.0)
}
