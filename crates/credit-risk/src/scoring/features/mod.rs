//! Expansion of collected form fields into the single-row record the classifier scores.
//!
//! Column names and order must match the layout the model was trained on exactly. The
//! deriver is the only constructor of [`FeatureRecord`], so every record it hands out
//! carries the full schema of its [`FeatureLayout`].

mod backfill;
mod ratios;

pub use backfill::{StatementHistory, BILL_DECAY, PAYMENT_DECAY, PAYMENT_FLOOR};
pub use ratios::{payment_ratio, utilization, MonthlyRatios, RatioAggregates};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::domain::{FormVariant, RawInput, StatementMonth};

pub const LIMIT_BAL: &str = "LIMIT_BAL";
pub const SEX: &str = "SEX";
pub const EDUCATION: &str = "EDUCATION";
pub const MARRIAGE: &str = "MARRIAGE";
pub const AGE: &str = "AGE";
pub const AVG_UTILIZATION: &str = "avg_utilization";
pub const MAX_UTILIZATION: &str = "max_utilization";
pub const AVG_PAYMENT_RATIO: &str = "avg_payment_ratio";
pub const MIN_PAYMENT_RATIO: &str = "min_payment_ratio";

/// Number of statement months the training data covers.
pub const HISTORY_MONTHS: usize = 6;

/// Describes which columns a variant emits and which months may be synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureLayout {
    /// Repayment status columns; months beyond the observed codes default to on time.
    pub status_months: usize,
    /// Bill and payment columns per kind.
    pub statement_months: usize,
    /// Whether statement months missing from the input are backfilled.
    pub backfill: bool,
    /// Whether utilization and payment ratio aggregates are appended.
    pub aggregates: bool,
}

impl FeatureLayout {
    pub fn for_variant(variant: FormVariant) -> Self {
        match variant {
            FormVariant::Basic => Self {
                status_months: 3,
                statement_months: 2,
                backfill: false,
                aggregates: false,
            },
            FormVariant::Extended => Self {
                status_months: HISTORY_MONTHS,
                statement_months: HISTORY_MONTHS,
                backfill: true,
                aggregates: true,
            },
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = [LIMIT_BAL, SEX, EDUCATION, MARRIAGE, AGE]
            .iter()
            .map(|name| name.to_string())
            .collect();

        let months = || StatementMonth::ALL.into_iter();
        names.extend(months().take(self.status_months).map(StatementMonth::status_column));
        names.extend(months().take(self.statement_months).map(StatementMonth::bill_column));
        names.extend(
            months()
                .take(self.statement_months)
                .map(StatementMonth::payment_column),
        );

        if self.aggregates {
            names.extend(
                [
                    AVG_UTILIZATION,
                    MAX_UTILIZATION,
                    AVG_PAYMENT_RATIO,
                    MIN_PAYMENT_RATIO,
                ]
                .iter()
                .map(|name| name.to_string()),
            );
        }

        names
    }

    pub fn width(&self) -> usize {
        5 + self.status_months + 2 * self.statement_months + if self.aggregates { 4 } else { 0 }
    }
}

/// Ordered single-row record handed to the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    fields: Vec<(String, f64)>,
}

impl FeatureRecord {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.fields.iter().map(|(_, value)| *value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), *value))
    }

    fn push(&mut self, name: impl Into<String>, value: f64) {
        self.fields.push((name.into(), value));
    }
}

impl Serialize for FeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Schema-driven deriver shared by both form variants.
#[derive(Debug, Clone)]
pub struct FeatureDeriver {
    layout: FeatureLayout,
}

impl FeatureDeriver {
    pub fn new(layout: FeatureLayout) -> Self {
        Self { layout }
    }

    pub fn for_variant(variant: FormVariant) -> Self {
        Self::new(FeatureLayout::for_variant(variant))
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn derive(&self, input: &RawInput) -> FeatureRecord {
        let mut record = FeatureRecord {
            fields: Vec::with_capacity(self.layout.width()),
        };

        record.push(LIMIT_BAL, input.credit_limit as f64);
        record.push(SEX, input.gender.code() as f64);
        record.push(EDUCATION, input.education.code() as f64);
        record.push(MARRIAGE, input.marital_status.code() as f64);
        record.push(AGE, input.age as f64);

        for month in StatementMonth::ALL
            .into_iter()
            .take(self.layout.status_months)
        {
            record.push(month.status_column(), input.repayment(month).code() as f64);
        }

        let history = self.history(input);
        for (month, bill) in StatementMonth::ALL.into_iter().zip(&history.bills) {
            record.push(month.bill_column(), *bill);
        }
        for (month, payment) in StatementMonth::ALL.into_iter().zip(&history.payments) {
            record.push(month.payment_column(), *payment);
        }

        if self.layout.aggregates {
            let aggregates = MonthlyRatios::compute(input.credit_limit, &history).aggregates();
            record.push(AVG_UTILIZATION, aggregates.avg_utilization);
            record.push(MAX_UTILIZATION, aggregates.max_utilization);
            record.push(AVG_PAYMENT_RATIO, aggregates.avg_payment_ratio);
            record.push(MIN_PAYMENT_RATIO, aggregates.min_payment_ratio);
        }

        record
    }

    /// Statement amounts for the layout's window, backfilled where the layout allows it.
    pub fn history(&self, input: &RawInput) -> StatementHistory {
        if self.layout.backfill {
            return backfill::statement_history(input, self.layout.statement_months);
        }

        let observed = |amounts: &[u32]| -> Vec<f64> {
            (0..self.layout.statement_months)
                .map(|offset| amounts.get(offset).copied().unwrap_or(0) as f64)
                .collect()
        };
        StatementHistory {
            bills: observed(&input.bill_amounts),
            payments: observed(&input.payment_amounts),
        }
    }

    /// Intermediate per-month ratios behind the aggregates.
    pub fn monthly_ratios(&self, input: &RawInput) -> MonthlyRatios {
        MonthlyRatios::compute(input.credit_limit, &self.history(input))
    }
}
