use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::Serialize;

use crate::application::ports::{CompletionAlert, TranscriptionEngine};
use crate::application::services::dispatch_alert;
use crate::presentation::state::AppState;

use super::upload::{UploadError, client_origin, read_named_field};

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub text: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Direct-serving transcription: blocks for the duration of the engine
/// call and answers with the text. Multipart field name: `file`.
#[tracing::instrument(skip(state, headers, multipart))]
pub async fn transcribe_handler<E>(
    State(state): State<AppState<E>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    E: TranscriptionEngine + ?Sized + 'static,
{
    let upload = match read_named_field(&mut multipart, "file").await {
        Ok(u) => u,
        Err(e @ UploadError::MissingField(_)) => {
            tracing::warn!("Transcribe request with no file");
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

    let started = Instant::now();
    tracing::info!(filename = %upload.filename, bytes = upload.data.len(), "Job started");

    let transcript =
        match tokio::time::timeout(state.engine_deadline, state.engine.transcribe(&upload.data))
            .await
        {
            Ok(Ok(t)) => t,
            Ok(Err(e)) => {
                tracing::error!(error = %e, filename = %upload.filename, "Transcription failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response();
            }
            Err(_) => {
                tracing::error!(
                    deadline_secs = state.engine_deadline.as_secs(),
                    filename = %upload.filename,
                    "Transcription deadline exceeded"
                );
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: format!(
                            "transcription deadline exceeded after {}s",
                            state.engine_deadline.as_secs()
                        ),
                    }),
                )
                    .into_response();
            }
        };

    let elapsed = started.elapsed();
    tracing::info!(
        filename = %upload.filename,
        elapsed_secs = elapsed.as_secs_f64(),
        "Job completed"
    );

    // Alert delivery happens off the request path; the response never waits
    // on the notification sink.
    if let Some(notifier) = &state.notifier {
        dispatch_alert(
            Arc::clone(notifier),
            CompletionAlert {
                job_id: None,
                filename: upload.filename,
                duration_secs: elapsed.as_secs_f64(),
                origin: client_origin(&headers),
                completed_at: Utc::now(),
            },
        );
    }

    (
        StatusCode::OK,
        Json(TranscribeResponse {
            text: transcript.text,
        }),
    )
        .into_response()
}
