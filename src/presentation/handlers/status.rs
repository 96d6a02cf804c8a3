use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::TranscriptionEngine;
use crate::application::services::{StatusError, public_status_label};
use crate::domain::{JobId, JobStatus, Transcript};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<StatusMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Transcript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct StatusMeta {
    pub filename: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Non-blocking lifecycle query: always answers from current knowledge,
/// even while the job is running.
#[tracing::instrument(skip(state))]
pub async fn status_handler<E>(
    State(state): State<AppState<E>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse
where
    E: TranscriptionEngine + ?Sized + 'static,
{
    // Ids are opaque to callers, so anything that doesn't parse is simply
    // an unknown job.
    let id = match JobId::parse(&job_id) {
        Ok(id) => id,
        Err(_) => return not_found(&job_id),
    };

    let report = match state.status_service.status(id).await {
        Ok(r) => r,
        Err(StatusError::NotFound(_)) => return not_found(&job_id),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to fetch job: {}", e),
                }),
            )
                .into_response();
        }
    };

    let job = report.job;
    let status = public_status_label(job.status);

    let response = match job.status {
        JobStatus::Queued => StatusResponse {
            status,
            meta: None,
            result: None,
            error: None,
        },
        JobStatus::Processing | JobStatus::Transcribing => StatusResponse {
            status,
            meta: Some(StatusMeta {
                filename: job.filename,
                updated_at: job.updated_at.to_rfc3339(),
            }),
            result: None,
            error: None,
        },
        JobStatus::Completed => StatusResponse {
            status,
            meta: None,
            result: report.transcript,
            error: None,
        },
        JobStatus::Failed => StatusResponse {
            status,
            meta: None,
            result: None,
            error: Some(
                job.error_message
                    .unwrap_or_else(|| "transcription failed".to_string()),
            ),
        },
    };

    (StatusCode::OK, Json(response)).into_response()
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
