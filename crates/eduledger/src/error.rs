use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::eligibility::EvaluationError;
use crate::workflows::fixture::FixtureError;
use crate::workflows::roster::RosterError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Failures surfaced by the binary: startup, I/O (including the listener), and evaluation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger fixture error: {0}")]
    Fixture(#[from] FixtureError),
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
    #[error("evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Roster(_) => StatusCode::BAD_REQUEST,
            AppError::Evaluation(err) => match err {
                EvaluationError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                EvaluationError::AdapterUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                EvaluationError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
                EvaluationError::Phase(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
