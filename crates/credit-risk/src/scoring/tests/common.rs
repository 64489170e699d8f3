use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::{
    Education, FormVariant, Gender, MaritalStatus, RawInput, RepaymentStatus,
};
use crate::scoring::features::{FeatureDeriver, FeatureRecord};
use crate::scoring::model::{Classifier, ModelError};
use crate::scoring::{assessment_router, RiskAssessmentService};

/// Classifier stub returning a fixed probability and counting invocations.
#[derive(Default)]
pub(super) struct FixedProbability {
    probability: f64,
    calls: AtomicUsize,
}

impl FixedProbability {
    pub(super) fn new(probability: f64) -> Self {
        Self {
            probability,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for FixedProbability {
    fn predict_proba(&self, _record: &FeatureRecord) -> Result<f64, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.probability)
    }
}

/// Classifier stub that rejects every record as off-schema.
pub(super) struct SchemaMismatchClassifier;

impl Classifier for SchemaMismatchClassifier {
    fn predict_proba(&self, record: &FeatureRecord) -> Result<f64, ModelError> {
        Err(ModelError::SchemaMismatch {
            expected: vec!["LIMIT_BAL".to_string()],
            found: record.names().map(str::to_string).collect(),
        })
    }
}

/// Customer who pays on time, carries a modest balance and has a healthy limit.
pub(super) fn healthy_input() -> RawInput {
    RawInput {
        credit_limit: 200_000,
        age: 35,
        education: Education::University,
        marital_status: MaritalStatus::Single,
        gender: Gender::Female,
        repayment_status: vec![RepaymentStatus(0), RepaymentStatus(0), RepaymentStatus(0)],
        bill_amounts: vec![20_000],
        payment_amounts: vec![3_000],
    }
}

pub(super) fn healthy_basic_input() -> RawInput {
    RawInput {
        bill_amounts: vec![20_000, 19_000],
        payment_amounts: vec![3_000, 3_000],
        ..healthy_input()
    }
}

/// Customer with late payments, a low limit and a nearly maxed card.
pub(super) fn stressed_input() -> RawInput {
    RawInput {
        credit_limit: 50_000,
        age: 27,
        education: Education::HighSchool,
        marital_status: MaritalStatus::Single,
        gender: Gender::Male,
        repayment_status: vec![RepaymentStatus(2), RepaymentStatus(1), RepaymentStatus(1)],
        bill_amounts: vec![45_000],
        payment_amounts: vec![500],
    }
}

pub(super) fn derive(variant: FormVariant, input: &RawInput) -> FeatureRecord {
    FeatureDeriver::for_variant(variant).derive(input)
}

pub(super) fn service_with(probability: f64, variant: FormVariant) -> RiskAssessmentService {
    RiskAssessmentService::new(Arc::new(FixedProbability::new(probability)), variant)
}

pub(super) fn router_with(service: RiskAssessmentService) -> axum::Router {
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
