use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::features::FeatureRecord;
use super::model::{Classifier, ModelError};

/// Probabilities below this are low risk.
pub const LOW_RISK_CEILING: f64 = 0.20;
/// Probabilities at or above this are high risk.
pub const HIGH_RISK_FLOOR: f64 = 0.50;

pub const MIN_PSEUDO_SCORE: u16 = 300;
pub const MAX_PSEUDO_SCORE: u16 = 850;

/// Discrete risk band derived from the default probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_probability(probability: f64) -> Self {
        if probability < LOW_RISK_CEILING {
            RiskTier::Low
        } else if probability < HIGH_RISK_FLOOR {
            RiskTier::Medium
        } else {
            RiskTier::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low Risk",
            RiskTier::Medium => "Medium Risk",
            RiskTier::High => "High Risk",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RiskTier::Low => "green",
            RiskTier::Medium => "orange",
            RiskTier::High => "red",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub probability: f64,
    pub pseudo_score: u16,
    pub risk_tier: RiskTier,
}

/// Display score in the familiar 300-850 range. Not a calibrated credit score.
pub fn pseudo_score(probability: f64) -> u16 {
    ((1.0 - probability) * 1000.0)
        .clamp(MIN_PSEUDO_SCORE as f64, MAX_PSEUDO_SCORE as f64)
        .round() as u16
}

/// Maps classifier output to the displayed score and tier.
#[derive(Clone)]
pub struct Scorer {
    classifier: Arc<dyn Classifier>,
}

impl Scorer {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    pub fn score(&self, record: &FeatureRecord) -> Result<ScoreResult, ModelError> {
        let probability = self.classifier.predict_proba(record)?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(ModelError::InvalidProbability(probability));
        }

        Ok(ScoreResult {
            probability,
            pseudo_score: pseudo_score(probability),
            risk_tier: RiskTier::from_probability(probability),
        })
    }
}
