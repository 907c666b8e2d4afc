use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::workflows::eligibility::evaluation::EvaluationConfig;
use crate::workflows::eligibility::router::eligibility_handler;
use crate::workflows::eligibility::service::EligibilityService;
use crate::workflows::fixture::InMemoryLedger;

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn eligibility_handler_returns_report() {
    let (service, _) = build_service();

    let response = eligibility_handler::<InMemoryLedger>(
        State(service),
        Path(SCHOLAR.to_string()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["result"]["score"], 825);
    assert_eq!(body["result"]["tier"], "excellent");
    assert_eq!(body["source"], "recomputed");
}

#[tokio::test]
async fn eligibility_route_rejects_malformed_subjects() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(get("/api/v1/eligibility/0x1234"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("invalid subject identifier"));
}

#[tokio::test]
async fn eligibility_route_reports_unavailable_ledger() {
    let (service, ledger) = build_service();
    ledger.set_online(false);
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(get(&format!("/api/v1/eligibility/{SCHOLAR}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = read_json_body(response).await;
    assert_eq!(body["error"], "unable to calculate score at this time");
}

#[tokio::test(start_paused = true)]
async fn eligibility_route_flags_slow_evaluations() {
    let service = Arc::new(EligibilityService::with_settings(
        Arc::new(SlowLedger::new(Duration::from_secs(60))),
        EvaluationConfig::default(),
        short_timeout_settings(Duration::from_secs(10)),
    ));
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(get(&format!("/api/v1/eligibility/{SCHOLAR}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "slow");
}

#[tokio::test]
async fn eligibility_route_serves_precomputed_scores() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(get(&format!("/api/v1/eligibility/{RANKED}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["source"], "precomputed");
    assert_eq!(body["breakdown"]["credentials_points"], 280);
    assert!(body.get("signals").is_none());
}

#[tokio::test]
async fn score_route_scores_supplied_signals() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/score",
            &json!({
                "profile_complete": true,
                "credential_count": 1,
                "admission_status": "verified",
                "has_any_credential": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["breakdown"]["academic_points"], 200);
    assert_eq!(body["result"]["score"], 770);
    assert_eq!(body["result"]["interest_rate_bps"], 500);
}

#[tokio::test]
async fn score_route_reads_negative_counts_as_zero() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(post_json(
            "/api/v1/score",
            &json!({
                "profile_complete": true,
                "credential_count": -2,
                "admission_status": "verified",
                "has_any_credential": false
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["breakdown"]["credentials_points"], 0);
    assert_eq!(body["breakdown"]["academic_points"], 0);
    assert_eq!(body["result"]["score"], 400);
    assert_eq!(body["result"]["is_eligible"], false);
}

#[tokio::test]
async fn loan_route_approves_within_limit() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/eligibility/{SCHOLAR}/loan"),
            &json!({ "amount": "12", "purpose": "Tuition", "repayment_months": 24 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"]["decision"], "approved");
    assert_eq!(body["tier"], "excellent");
}

#[tokio::test]
async fn loan_route_counters_oversized_requests() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/eligibility/{RANKED}/loan"),
            &json!({ "amount": 50, "purpose": "Tuition", "repayment_months": 12 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"]["decision"], "counter_offer");
    assert_eq!(body["decision"]["max_amount"], "10.5");
}

#[tokio::test]
async fn loan_route_rejects_invalid_requests() {
    let (service, _) = build_service();
    let router = eligibility_router_with_service(service);

    let response = router
        .oneshot(post_json(
            &format!("/api/v1/eligibility/{SCHOLAR}/loan"),
            &json!({ "amount": "0", "purpose": "Tuition", "repayment_months": 12 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
