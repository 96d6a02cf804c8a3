use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::JobId;

/// Out-of-band alert summarizing one finished transcription.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionAlert {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub filename: String,
    pub duration_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Delivery failures are the caller's to log and swallow: notification must
/// never affect the transcription outcome.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &CompletionAlert) -> Result<(), NotifierError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotifierError {
    #[error("delivery failed: {0}")]
    DeliveryFailed(String),
}
