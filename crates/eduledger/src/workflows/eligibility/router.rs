use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{AdmissionStatus, StudentSignals};
use super::ledger::LedgerClient;
use super::loan::{screen_loan_request, LoanRequest};
use super::service::{EligibilityService, EvaluationError};

/// Router builder exposing eligibility lookups, ad-hoc scoring, and loan screening.
pub fn eligibility_router<L>(service: Arc<EligibilityService<L>>) -> Router
where
    L: LedgerClient + 'static,
{
    Router::new()
        .route(
            "/api/v1/eligibility/:subject_id",
            get(eligibility_handler::<L>),
        )
        .route(
            "/api/v1/eligibility/:subject_id/loan",
            post(loan_handler::<L>),
        )
        .route("/api/v1/score", post(score_handler::<L>))
        .with_state(service)
}

pub(crate) async fn eligibility_handler<L>(
    State(service): State<Arc<EligibilityService<L>>>,
    Path(subject_id): Path<String>,
) -> Response
where
    L: LedgerClient + 'static,
{
    match service.evaluate(&subject_id).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(err) => error_response(err),
    }
}

/// Body of `POST /api/v1/score`. Counts arrive loosely typed; negatives read as zero.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub profile_complete: bool,
    #[serde(default)]
    pub credential_count: i64,
    #[serde(default)]
    pub admission_status: AdmissionStatus,
    #[serde(default)]
    pub has_any_credential: bool,
}

impl ScoreRequest {
    pub fn into_signals(self) -> StudentSignals {
        let signals = StudentSignals::from_raw(
            self.profile_complete,
            self.credential_count,
            self.admission_status,
        );
        StudentSignals {
            has_any_credential: signals.has_any_credential || self.has_any_credential,
            ..signals
        }
    }
}

pub(crate) async fn score_handler<L>(
    State(service): State<Arc<EligibilityService<L>>>,
    axum::Json(request): axum::Json<ScoreRequest>,
) -> Response
where
    L: LedgerClient + 'static,
{
    let outcome = service.score_signals(&request.into_signals());
    (StatusCode::OK, axum::Json(outcome)).into_response()
}

pub(crate) async fn loan_handler<L>(
    State(service): State<Arc<EligibilityService<L>>>,
    Path(subject_id): Path<String>,
    axum::Json(request): axum::Json<LoanRequest>,
) -> Response
where
    L: LedgerClient + 'static,
{
    if let Err(err) = request.validate() {
        let payload = json!({ "error": err.to_string() });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let report = match service.evaluate(&subject_id).await {
        Ok(report) => report,
        Err(err) => return error_response(err),
    };

    match screen_loan_request(&report, &request) {
        Ok(decision) => {
            let payload = json!({
                "subject": report.subject,
                "score": report.result.score,
                "tier": report.result.tier,
                "summary": decision.summary(&report.currency),
                "decision": decision,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(err: EvaluationError) -> Response {
    match err {
        EvaluationError::InvalidInput(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        EvaluationError::AdapterUnavailable(_) => {
            let payload = json!({
                "error": "unable to calculate score at this time",
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        EvaluationError::TimedOut { .. } => {
            let payload = json!({
                "error": err.to_string(),
                "status": "slow",
            });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
        EvaluationError::Phase(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
