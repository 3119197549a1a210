// Response shaping for the lookup endpoint

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::lookup::{FailureDetail, FetchOutcome, ValidationError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleResponse {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<usize>,
    pub cached: bool,
    pub response_time: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureResponse {
    pub error: &'static str,
    /// Every strategy's reason, `name: reason; ...`
    pub details: String,
    pub failures: Vec<FailureDetail>,
    pub attempt: usize,
    pub response_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    pub response_time: String,
}

pub fn format_elapsed(ms: u64) -> String {
    format!("{}ms", ms)
}

pub fn validation_response(err: &ValidationError, elapsed_ms: u64) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
            response_time: format_elapsed(elapsed_ms),
        }),
    )
        .into_response()
}

/// 200 on success; on exhaustion 504 when timeouts dominate, otherwise 500
pub fn outcome_response(outcome: FetchOutcome, elapsed_ms: u64) -> Response {
    let timeout_dominant = outcome.timeout_dominant();

    match outcome {
        FetchOutcome::Success {
            title,
            strategy_used,
            attempts_made,
            from_cache,
            ..
        } => (
            StatusCode::OK,
            Json(TitleResponse {
                title,
                attempt: strategy_used.as_ref().map(|_| attempts_made),
                strategy: strategy_used,
                cached: from_cache,
                response_time: format_elapsed(elapsed_ms),
                status: "success",
            }),
        )
            .into_response(),
        FetchOutcome::Failure {
            attempts_made,
            failures,
            ..
        } => {
            let (status, error) = if timeout_dominant {
                (StatusCode::GATEWAY_TIMEOUT, "Timed out fetching title.")
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch title.")
            };

            let details = failures
                .iter()
                .map(|f| format!("{}: {}", f.strategy, f.reason()))
                .collect::<Vec<_>>()
                .join("; ");

            (
                status,
                Json(FailureResponse {
                    error,
                    details,
                    failures: failures.iter().map(|f| f.detail()).collect(),
                    attempt: attempts_made,
                    response_time: format_elapsed(elapsed_ms),
                }),
            )
                .into_response()
        }
    }
}
