use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::RawInput;
use super::service::{AssessmentError, RiskAssessmentService};

/// Router builder exposing the assessment endpoints.
pub fn assessment_router(service: Arc<RiskAssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/risk/assessments", post(assess_handler))
        .route("/api/v1/risk/form", get(form_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<RiskAssessmentService>>,
    Json(input): Json<RawInput>,
) -> Response {
    match service.assess(input) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(AssessmentError::Intake(violation)) => {
            let payload = json!({
                "error": violation.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(AssessmentError::Model(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn form_handler(State(service): State<Arc<RiskAssessmentService>>) -> Response {
    (StatusCode::OK, Json(service.form())).into_response()
}
