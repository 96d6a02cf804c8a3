use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::TranscriptionEngine;
use crate::application::services::{ResultError, ResultReport, public_status_label};
use crate::domain::{JobId, Transcript};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ResultResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub transcript: Transcript,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct FailedResponse {
    pub status: &'static str,
    pub error: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Result fetch. Never blocks on an unfinished job: a non-terminal job gets
/// an explicit 202 "come back later", a completed one gets the persisted
/// transcript merged into the response. Repeated calls after completion
/// return the same payload.
#[tracing::instrument(skip(state))]
pub async fn result_handler<E>(
    State(state): State<AppState<E>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    E: TranscriptionEngine + ?Sized + 'static,
{
    let id = match JobId::parse(&job_id) {
        Ok(id) => id,
        Err(_) => return not_found(&job_id),
    };

    match state.status_service.result(id).await {
        Ok(ResultReport::Ready { transcript }) => (
            StatusCode::OK,
            Json(ResultResponse {
                status: "completed",
                transcript,
            }),
        )
            .into_response(),
        Ok(ResultReport::NotReady { status }) => (
            StatusCode::ACCEPTED,
            Json(PendingResponse {
                status: public_status_label(status),
            }),
        )
            .into_response(),
        Ok(ResultReport::Failed { error }) => (
            StatusCode::OK,
            Json(FailedResponse {
                status: "error",
                error,
            }),
        )
            .into_response(),
        Err(ResultError::NotFound(_)) => not_found(&job_id),
        Err(ResultError::Unreadable(detail)) => {
            // The job itself succeeded; only retrieval failed.
            tracing::error!(error = %detail, "Result retrieval failed for completed job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: detail }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job result");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch result: {}", e),
                }),
            )
                .into_response()
        }
    }
}

fn not_found(job_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Job not found: {}", job_id),
        }),
    )
        .into_response()
}
