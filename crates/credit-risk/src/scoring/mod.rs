//! Credit card default risk assessment.
//!
//! Inputs collected by the form are admitted by the intake guard, expanded into the
//! classifier's feature record, scored by an injected [`Classifier`], and explained by an
//! independent set of rules. Both form variants share this pipeline; the
//! [`FormVariant`] selects the schema.

pub mod batch;
pub mod domain;
pub mod explain;
pub mod features;
pub mod intake;
pub mod model;
pub mod router;
pub mod scorer;
pub mod service;

#[cfg(test)]
mod tests;

pub use batch::{BatchError, BatchSummary};
pub use domain::{
    Education, FormVariant, Gender, MaritalStatus, RawInput, RepaymentStatus, StatementMonth,
    UnknownCode,
};
pub use explain::{Explainer, ExplainerConfig, ReasonList, RecentPaymentRule, FALLBACK_REASONS};
pub use features::{FeatureDeriver, FeatureLayout, FeatureRecord, MonthlyRatios, RatioAggregates};
pub use intake::{default_input, FormDefinition, IntakeGuard, IntakeViolation};
pub use model::{Classifier, LogisticModel, ModelCell, ModelError, Standardization};
pub use router::assessment_router;
pub use scorer::{pseudo_score, RiskTier, ScoreResult, Scorer};
pub use service::{AssessmentError, AssessmentReport, RiskAssessmentService};
