//! Heuristic imputation for statement months the form does not collect.
//!
//! Older months are extrapolated from the most recent observation with fixed decay
//! multipliers. The numbers are an approximation carried over from the deployed model's
//! feature pipeline, not a statistical estimate, and must stay in lockstep with it.

use super::super::domain::{RawInput, StatementMonth};

/// Bill multipliers for one to five months before the most recent statement.
pub const BILL_DECAY: [f64; 5] = [0.95, 0.90, 0.85, 0.80, 0.75];

/// Payment multipliers for one to five months before the most recent statement.
pub const PAYMENT_DECAY: [f64; 5] = [0.9, 0.8, 0.7, 0.6, 0.5];

/// Lower bound applied to every backfilled payment.
pub const PAYMENT_FLOOR: f64 = 2000.0;

/// Bill and payment amounts for each month of the window, observed or synthesized.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementHistory {
    pub bills: Vec<f64>,
    pub payments: Vec<f64>,
}

impl StatementHistory {
    pub fn months(&self) -> usize {
        self.bills.len()
    }
}

pub(crate) fn statement_history(input: &RawInput, months: usize) -> StatementHistory {
    let latest_bill = input.latest_bill() as f64;
    let latest_payment = input.latest_payment() as f64;

    let mut bills = Vec::with_capacity(months);
    let mut payments = Vec::with_capacity(months);

    for month in StatementMonth::ALL.into_iter().take(months) {
        let bill = match input.bill(month) {
            Some(observed) => observed as f64,
            None => backfilled_bill(latest_bill, month.offset()),
        };
        let payment = match input.payment(month) {
            Some(observed) => observed as f64,
            None => backfilled_payment(latest_payment, month.offset()),
        };
        bills.push(bill);
        payments.push(payment);
    }

    StatementHistory { bills, payments }
}

fn backfilled_bill(latest: f64, months_back: usize) -> f64 {
    match months_back
        .checked_sub(1)
        .and_then(|index| BILL_DECAY.get(index))
    {
        Some(factor) => latest * factor,
        None => latest,
    }
}

fn backfilled_payment(latest: f64, months_back: usize) -> f64 {
    match months_back
        .checked_sub(1)
        .and_then(|index| PAYMENT_DECAY.get(index))
    {
        Some(factor) => (latest * factor).max(PAYMENT_FLOOR),
        None => latest,
    }
}
