use std::sync::Arc;

use crate::application::ports::{ArtifactStore, JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus, Transcript};

/// Maps store-native states onto the public status vocabulary. Fine-grained
/// states keep their raw label so callers can observe progress; clients that
/// only understand the coarse vocabulary treat unknown labels as in-flight.
pub fn public_status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Queued => "queued",
        JobStatus::Processing => "processing",
        JobStatus::Transcribing => "transcribing",
        JobStatus::Completed => "completed",
        JobStatus::Failed => "error",
    }
}

/// Snapshot of a job's current state; `transcript` is populated only when
/// the job is completed and its result file is readable.
pub struct JobStatusReport {
    pub job: Job,
    pub transcript: Option<Transcript>,
}

/// Outcome of a result fetch. `NotReady` is a non-error answer: the caller
/// asked too early and should poll again.
#[derive(Debug)]
pub enum ResultReport {
    NotReady { status: JobStatus },
    Failed { error: String },
    Ready { transcript: Transcript },
}

/// Answers status and result queries from current knowledge, without ever
/// blocking on an in-flight job.
pub struct StatusService {
    job_store: Arc<dyn JobStore>,
    artifact_store: Arc<dyn ArtifactStore>,
}

impl StatusService {
    pub fn new(job_store: Arc<dyn JobStore>, artifact_store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            job_store,
            artifact_store,
        }
    }

    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn status(&self, id: JobId) -> Result<JobStatusReport, StatusError> {
        let job = self
            .job_store
            .get_by_id(id)
            .await
            .map_err(StatusError::Store)?
            .ok_or(StatusError::NotFound(id))?;

        let transcript = if job.status == JobStatus::Completed {
            match self.load_transcript(&job).await {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!(error = %e, job_id = %id, "Result unreadable during status fetch");
                    None
                }
            }
        } else {
            None
        };

        Ok(JobStatusReport { job, transcript })
    }

    #[tracing::instrument(skip(self), fields(job_id = %id))]
    pub async fn result(&self, id: JobId) -> Result<ResultReport, ResultError> {
        let job = self
            .job_store
            .get_by_id(id)
            .await
            .map_err(ResultError::Store)?
            .ok_or(ResultError::NotFound(id))?;

        match job.status {
            JobStatus::Completed => {
                let transcript = self
                    .load_transcript(&job)
                    .await
                    .map_err(ResultError::Unreadable)?;
                Ok(ResultReport::Ready { transcript })
            }
            JobStatus::Failed => Ok(ResultReport::Failed {
                error: job
                    .error_message
                    .unwrap_or_else(|| "transcription failed".to_string()),
            }),
            status => Ok(ResultReport::NotReady { status }),
        }
    }

    async fn load_transcript(&self, job: &Job) -> Result<Transcript, String> {
        let result_path = job
            .result_path
            .as_ref()
            .ok_or_else(|| "completed job has no result path".to_string())?;

        let bytes = self
            .artifact_store
            .fetch(result_path)
            .await
            .map_err(|e| format!("result file {}: {}", result_path, e))?;

        serde_json::from_slice(&bytes).map_err(|e| format!("result payload malformed: {}", e))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job store: {0}")]
    Store(JobStoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("job not found: {0}")]
    NotFound(JobId),
    #[error("job store: {0}")]
    Store(JobStoreError),
    #[error("result retrieval: {0}")]
    Unreadable(String),
}
