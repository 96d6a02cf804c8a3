use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::ports::TranscriptionEngine;
use crate::application::services::SubmissionError;
use crate::presentation::state::AppState;

use super::upload::{UploadError, client_origin, read_named_field};

#[derive(Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Queue-backed submission: stages the upload, enqueues a job, and answers
/// with the job id without waiting for transcription. Multipart field
/// name: `audio`.
#[tracing::instrument(skip(state, headers, multipart))]
pub async fn submit_handler<E>(
    State(state): State<AppState<E>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    E: TranscriptionEngine + ?Sized + 'static,
{
    let upload = match read_named_field(&mut multipart, "audio").await {
        Ok(u) => u,
        Err(e @ UploadError::MissingField(_)) => {
            tracing::warn!("Submission with no audio field");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let origin = client_origin(&headers);

    match state
        .submission_service
        .submit(upload.data, &upload.filename, origin)
        .await
    {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id: job_id.to_string(),
            }),
        )
            .into_response(),
        Err(SubmissionError::QueueUnavailable) => {
            tracing::error!("Transcription queue unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "transcription queue unavailable".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to submit transcription job");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
