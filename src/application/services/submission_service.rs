use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::application::ports::{ArtifactStore, ArtifactStoreError, JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus};

use super::TranscriptionMessage;

/// Accepts an upload, stages it, records the job, and enqueues it for a
/// worker. Returns the job id without waiting for transcription.
pub struct SubmissionService {
    artifact_store: Arc<dyn ArtifactStore>,
    job_store: Arc<dyn JobStore>,
    sender: mpsc::Sender<TranscriptionMessage>,
}

impl SubmissionService {
    pub fn new(
        artifact_store: Arc<dyn ArtifactStore>,
        job_store: Arc<dyn JobStore>,
        sender: mpsc::Sender<TranscriptionMessage>,
    ) -> Self {
        Self {
            artifact_store,
            job_store,
            sender,
        }
    }

    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    pub async fn submit(
        &self,
        data: Bytes,
        filename: &str,
        origin: Option<String>,
    ) -> Result<JobId, SubmissionError> {
        let job = Job::new(filename.to_string());
        let job_id = job.id;
        let staging_path = job.staging_path.clone();

        let content_length = data.len() as u64;
        let stream = futures::stream::once(async move { Ok::<_, std::io::Error>(data) });
        self.artifact_store
            .store(&staging_path, Box::pin(stream), Some(content_length))
            .await
            .map_err(SubmissionError::Staging)?;

        self.job_store
            .create(&job)
            .await
            .map_err(SubmissionError::JobStore)?;

        let msg = TranscriptionMessage {
            job_id,
            staging_path,
            filename: filename.to_string(),
            origin,
        };

        if self.sender.send(msg).await.is_err() {
            // The id has already been handed out via the job row, so it must
            // resolve to a terminal state rather than dangle in Queued.
            if let Err(e) = self
                .job_store
                .update_status(job_id, JobStatus::Failed, Some("transcription queue unavailable"))
                .await
            {
                tracing::error!(error = %e, job_id = %job_id, "Failed to mark orphaned job");
            }
            return Err(SubmissionError::QueueUnavailable);
        }

        tracing::info!(job_id = %job_id, filename = %filename, "Transcription job enqueued");

        Ok(job_id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("staging upload: {0}")]
    Staging(ArtifactStoreError),
    #[error("job store: {0}")]
    JobStore(JobStoreError),
    #[error("transcription queue unavailable")]
    QueueUnavailable,
}
