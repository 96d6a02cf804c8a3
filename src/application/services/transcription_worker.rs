use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::application::ports::{
    ArtifactStore, ArtifactStoreError, CompletionAlert, JobStore, JobStoreError, Notifier,
    TranscriptionEngine, TranscriptionError,
};
use crate::domain::{JobId, JobStatus, StoragePath, Transcript};

use super::dispatch_alert;

pub struct TranscriptionMessage {
    pub job_id: JobId,
    pub staging_path: StoragePath,
    pub filename: String,
    pub origin: Option<String>,
}

/// Pulls submitted jobs off the channel and runs them to a terminal state:
/// fetch staged audio, invoke the engine under a deadline, persist the
/// transcript, record the outcome, clean up the staging artifact.
///
/// Single-attempt semantics: a failed job keeps its error detail and is
/// never retried automatically.
pub struct TranscriptionWorker {
    receiver: mpsc::Receiver<TranscriptionMessage>,
    engine: Arc<dyn TranscriptionEngine>,
    job_store: Arc<dyn JobStore>,
    artifact_store: Arc<dyn ArtifactStore>,
    notifier: Option<Arc<dyn Notifier>>,
    deadline: Duration,
    delete_staging_after: bool,
}

impl TranscriptionWorker {
    pub fn new(
        receiver: mpsc::Receiver<TranscriptionMessage>,
        engine: Arc<dyn TranscriptionEngine>,
        job_store: Arc<dyn JobStore>,
        artifact_store: Arc<dyn ArtifactStore>,
        notifier: Option<Arc<dyn Notifier>>,
        deadline: Duration,
        delete_staging_after: bool,
    ) -> Self {
        Self {
            receiver,
            engine,
            job_store,
            artifact_store,
            notifier,
            deadline,
            delete_staging_after,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Transcription worker started");
        while let Some(msg) = self.receiver.recv().await {
            let span = tracing::info_span!(
                "transcription_job",
                job_id = %msg.job_id,
                filename = %msg.filename,
            );

            if let Err(e) = self.process_job(msg).instrument(span).await {
                tracing::error!(error = %e, "Transcription job failed");
            }
        }
        tracing::info!("Transcription worker stopped: channel closed");
    }

    async fn process_job(&self, msg: TranscriptionMessage) -> Result<(), TranscriptionWorkerError> {
        let job_id = msg.job_id;
        let started = Instant::now();

        self.update_status(job_id, JobStatus::Processing, None)
            .await?;

        let result = self.transcribe_staged(job_id, &msg.staging_path).await;

        match &result {
            Ok(_) => {
                tracing::info!(
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "Transcription completed"
                );
            }
            Err(e) => {
                let error_msg = e.to_string();
                self.update_status(job_id, JobStatus::Failed, Some(&error_msg))
                    .await?;
            }
        }

        if self.delete_staging_after {
            if let Err(e) = self.artifact_store.delete(&msg.staging_path).await {
                tracing::warn!(
                    error = %e,
                    path = %msg.staging_path,
                    "Failed to delete staging artifact"
                );
            }
        }

        if result.is_ok() {
            if let Some(notifier) = &self.notifier {
                dispatch_alert(
                    Arc::clone(notifier),
                    CompletionAlert {
                        job_id: Some(job_id),
                        filename: msg.filename,
                        duration_secs: started.elapsed().as_secs_f64(),
                        origin: msg.origin,
                        completed_at: Utc::now(),
                    },
                );
            }
        }

        result.map(|_| ())
    }

    async fn transcribe_staged(
        &self,
        job_id: JobId,
        staging_path: &StoragePath,
    ) -> Result<Transcript, TranscriptionWorkerError> {
        let audio = self
            .artifact_store
            .fetch(staging_path)
            .await
            .map_err(TranscriptionWorkerError::Artifact)?;

        self.update_status(job_id, JobStatus::Transcribing, None)
            .await?;

        // A hung engine call must not pin this worker forever; past the
        // deadline the job is failed and the worker moves on.
        let transcript = match tokio::time::timeout(self.deadline, self.engine.transcribe(&audio))
            .await
        {
            Ok(Ok(t)) => t,
            Ok(Err(e)) => return Err(TranscriptionWorkerError::Engine(e)),
            Err(_) => {
                return Err(TranscriptionWorkerError::DeadlineExceeded(
                    self.deadline.as_secs(),
                ));
            }
        };

        let result_path = StoragePath::result(job_id);
        let payload = serde_json::to_vec(&transcript)
            .map_err(|e| TranscriptionWorkerError::ResultPersist(e.to_string()))?;
        let content_length = payload.len() as u64;
        let stream = futures::stream::once(async move {
            Ok::<_, std::io::Error>(bytes::Bytes::from(payload))
        });

        self.artifact_store
            .store(&result_path, Box::pin(stream), Some(content_length))
            .await
            .map_err(TranscriptionWorkerError::Artifact)?;

        self.job_store
            .record_result(job_id, &result_path)
            .await
            .map_err(TranscriptionWorkerError::Store)?;

        Ok(transcript)
    }

    async fn update_status(
        &self,
        job_id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), TranscriptionWorkerError> {
        tracing::debug!(status = %status, "Job status transition");
        self.job_store
            .update_status(job_id, status, error_message)
            .await
            .map_err(TranscriptionWorkerError::Store)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionWorkerError {
    #[error("artifact store: {0}")]
    Artifact(ArtifactStoreError),
    #[error("job store: {0}")]
    Store(JobStoreError),
    #[error("transcription: {0}")]
    Engine(TranscriptionError),
    #[error("transcription deadline exceeded after {0}s")]
    DeadlineExceeded(u64),
    #[error("result serialization: {0}")]
    ResultPersist(String),
}
