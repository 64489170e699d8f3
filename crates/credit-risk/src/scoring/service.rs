use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use super::domain::{FormVariant, RawInput};
use super::explain::Explainer;
use super::features::{FeatureDeriver, FeatureRecord};
use super::intake::{FormDefinition, IntakeGuard, IntakeViolation};
use super::model::{Classifier, ModelError};
use super::scorer::{RiskTier, ScoreResult, Scorer};

/// Payload handed to the output surface for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub variant: FormVariant,
    pub probability: f64,
    pub pseudo_score: u16,
    pub risk_tier: RiskTier,
    pub risk_label: String,
    pub risk_color: String,
    pub reasons: Vec<String>,
    pub assessed_at: DateTime<Utc>,
}

impl AssessmentReport {
    pub fn score(&self) -> ScoreResult {
        ScoreResult {
            probability: self.probability,
            pseudo_score: self.pseudo_score,
            risk_tier: self.risk_tier,
        }
    }
}

/// Error raised by the assessment service. No partial report is produced.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Service composing intake validation, feature derivation, scoring and explanation.
pub struct RiskAssessmentService {
    variant: FormVariant,
    guard: IntakeGuard,
    deriver: FeatureDeriver,
    scorer: Scorer,
    explainer: Explainer,
}

impl RiskAssessmentService {
    pub fn new(classifier: Arc<dyn Classifier>, variant: FormVariant) -> Self {
        Self::with_explainer(classifier, variant, Explainer::for_variant(variant))
    }

    pub fn with_explainer(
        classifier: Arc<dyn Classifier>,
        variant: FormVariant,
        explainer: Explainer,
    ) -> Self {
        Self {
            variant,
            guard: IntakeGuard::for_variant(variant),
            deriver: FeatureDeriver::for_variant(variant),
            scorer: Scorer::new(classifier),
            explainer,
        }
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    pub fn form(&self) -> FormDefinition {
        FormDefinition::for_variant(self.variant)
    }

    /// Derived record for an admitted input, without scoring it.
    pub fn features(&self, input: RawInput) -> Result<FeatureRecord, AssessmentError> {
        let input = self.guard.admit(input)?;
        Ok(self.deriver.derive(&input))
    }

    /// Run one full evaluation: admit, derive, score, explain.
    pub fn assess(&self, input: RawInput) -> Result<AssessmentReport, AssessmentError> {
        let span = info_span!("assessment", variant = self.variant.label());
        let _entered = span.enter();

        let input = self.guard.admit(input).map_err(|violation| {
            warn!(%violation, "rejected assessment input");
            violation
        })?;

        let record = self.deriver.derive(&input);
        debug!(fields = record.len(), "derived feature record");

        let score = self.scorer.score(&record).map_err(|err| {
            warn!(error = %err, "classifier failed to score record");
            err
        })?;
        let reasons = self.explainer.explain(&input, &record);

        info!(
            probability = score.probability,
            pseudo_score = score.pseudo_score,
            tier = score.risk_tier.label(),
            fallback_reasons = reasons.is_fallback(),
            "assessment completed"
        );

        Ok(AssessmentReport {
            variant: self.variant,
            probability: score.probability,
            pseudo_score: score.pseudo_score,
            risk_tier: score.risk_tier,
            risk_label: score.risk_tier.label().to_string(),
            risk_color: score.risk_tier.color().to_string(),
            reasons: reasons.into_vec(),
            assessed_at: Utc::now(),
        })
    }
}
