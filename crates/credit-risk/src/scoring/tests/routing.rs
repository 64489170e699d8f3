use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::scoring::domain::FormVariant;
use crate::scoring::router::{assess_handler, form_handler};
use crate::scoring::RiskAssessmentService;

fn post_json(body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post("/api/v1/risk/assessments")
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn assess_handler_returns_report() {
    let service = Arc::new(service_with(0.3, FormVariant::Extended));

    let response = assess_handler(State(service), axum::Json(healthy_input())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    assert_eq!(payload["variant"], "extended");
    assert_eq!(payload["pseudo_score"], 700);
    assert_eq!(payload["risk_tier"], "medium");
    assert_eq!(payload["risk_label"], "Medium Risk");
    assert_eq!(payload["risk_color"], "orange");
    assert_eq!(payload["reasons"].as_array().map(Vec::len), Some(3));
    assert!(payload["assessed_at"].is_string());
}

#[tokio::test]
async fn assess_handler_returns_unprocessable_for_intake_violation() {
    let service = Arc::new(service_with(0.3, FormVariant::Extended));
    let mut input = healthy_input();
    input.bill_amounts = vec![900_000];

    let response = assess_handler(State(service), axum::Json(input)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let payload = read_json_body(response).await;
    assert_eq!(
        payload["error"],
        "bill_amounts[0] must be between 0 and 800000 (found 900000)"
    );
}

#[tokio::test]
async fn assess_handler_returns_internal_error_on_classifier_failure() {
    let service = Arc::new(RiskAssessmentService::new(
        Arc::new(SchemaMismatchClassifier),
        FormVariant::Extended,
    ));

    let response = assess_handler(State(service), axum::Json(healthy_input())).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .starts_with("feature schema mismatch"));
}

#[tokio::test]
async fn form_handler_serves_variant_form() {
    let service = Arc::new(service_with(0.3, FormVariant::Basic));

    let response = form_handler(State(service)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let payload = read_json_body(response).await;
    assert_eq!(payload["variant"], "basic");
    assert_eq!(payload["fields"].as_array().map(Vec::len), Some(12));
}

#[tokio::test]
async fn assessment_route_accepts_form_payloads() {
    let router = router_with(service_with(0.12, FormVariant::Extended));

    let response = router
        .oneshot(post_json(json!({
            "credit_limit": 200000,
            "age": 35,
            "education": 2,
            "marital_status": 2,
            "gender": 2,
            "repayment_status": [0, 0, 0],
            "bill_amounts": [20000],
            "payment_amounts": [3000]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["risk_tier"], "low");
    assert_eq!(payload["pseudo_score"], 850);
}

#[tokio::test]
async fn assessment_route_rejects_unknown_codes() {
    let router = router_with(service_with(0.12, FormVariant::Extended));

    let response = router
        .oneshot(post_json(json!({
            "credit_limit": 200000,
            "age": 35,
            "education": 9,
            "marital_status": 2,
            "gender": 2,
            "bill_amounts": [20000],
            "payment_amounts": [3000]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn form_route_is_mounted() {
    let router = router_with(service_with(0.12, FormVariant::Extended));

    let response = router
        .oneshot(
            axum::http::Request::get("/api/v1/risk/form")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["fields"][0]["name"], "credit_limit");
}
