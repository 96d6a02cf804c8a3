use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::TranscriptionEngine;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::config::ServingMode;
use crate::presentation::handlers::{
    health_handler, result_handler, status_handler, submit_handler, transcribe_handler,
};
use crate::presentation::state::AppState;

/// Builds the route table for the configured serving mode. Both modes share
/// `POST /transcribe`; only the queued surface exposes the polling
/// endpoints.
pub fn create_router<E>(state: AppState<E>, mode: ServingMode) -> Router
where
    E: TranscriptionEngine + ?Sized + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let router = match mode {
        ServingMode::Direct => Router::new()
            .route("/health", get(health_handler))
            .route("/transcribe", post(transcribe_handler::<E>)),
        ServingMode::Queued => Router::new()
            .route("/health", get(health_handler))
            .route("/transcribe", post(submit_handler::<E>))
            .route("/status/{job_id}", get(status_handler::<E>))
            .route("/result/{job_id}", get(result_handler::<E>)),
    };

    router
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
