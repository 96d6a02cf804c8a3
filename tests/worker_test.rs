use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};

use skald::application::ports::{
    ArtifactStore, CompletionAlert, JobStore, Notifier, NotifierError, TranscriptionEngine,
    TranscriptionError,
};
use skald::application::services::{TranscriptionMessage, TranscriptionWorker};
use skald::domain::{Job, JobId, JobStatus, Transcript};
use skald::infrastructure::persistence::MemoryJobStore;
use skald::infrastructure::storage::MemoryArtifactStore;

struct FixedEngine {
    text: &'static str,
}

#[async_trait::async_trait]
impl TranscriptionEngine for FixedEngine {
    async fn transcribe(&self, _audio: &[u8]) -> Result<Transcript, TranscriptionError> {
        Ok(Transcript::from_text(self.text))
    }
}

struct FailingEngine;

#[async_trait::async_trait]
impl TranscriptionEngine for FailingEngine {
    async fn transcribe(&self, _audio: &[u8]) -> Result<Transcript, TranscriptionError> {
        Err(TranscriptionError::DecodingFailed(
            "no audio samples decoded".to_string(),
        ))
    }
}

struct SlowEngine {
    delay: Duration,
}

#[async_trait::async_trait]
impl TranscriptionEngine for SlowEngine {
    async fn transcribe(&self, _audio: &[u8]) -> Result<Transcript, TranscriptionError> {
        tokio::time::sleep(self.delay).await;
        Ok(Transcript::from_text("too late"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<CompletionAlert>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, alert: &CompletionAlert) -> Result<(), NotifierError> {
        self.alerts.lock().await.push(alert.clone());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait::async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _alert: &CompletionAlert) -> Result<(), NotifierError> {
        Err(NotifierError::DeliveryFailed("sink offline".to_string()))
    }
}

struct Harness {
    job_store: Arc<MemoryJobStore>,
    artifact_store: Arc<MemoryArtifactStore>,
    sender: mpsc::Sender<TranscriptionMessage>,
}

fn spawn_worker(
    engine: Arc<dyn TranscriptionEngine>,
    notifier: Option<Arc<dyn Notifier>>,
    deadline: Duration,
    delete_staging_after: bool,
) -> Harness {
    let job_store = Arc::new(MemoryJobStore::new());
    let artifact_store = Arc::new(MemoryArtifactStore::new());
    let (sender, receiver) = mpsc::channel(8);

    let worker = TranscriptionWorker::new(
        receiver,
        engine,
        Arc::clone(&job_store) as Arc<dyn JobStore>,
        Arc::clone(&artifact_store) as Arc<dyn ArtifactStore>,
        notifier,
        deadline,
        delete_staging_after,
    );
    tokio::spawn(worker.run());

    Harness {
        job_store,
        artifact_store,
        sender,
    }
}

impl Harness {
    /// Stages the payload and enqueues a job, the way the submission
    /// service does.
    async fn enqueue(&self, filename: &str, data: &[u8]) -> JobId {
        let job = Job::new(filename.to_string());
        let payload = data.to_vec();
        let stream = futures::stream::once(async move {
            Ok::<_, std::io::Error>(bytes::Bytes::from(payload))
        });
        self.artifact_store
            .store(&job.staging_path, Box::pin(stream), Some(data.len() as u64))
            .await
            .unwrap();
        self.job_store.create(&job).await.unwrap();

        self.sender
            .send(TranscriptionMessage {
                job_id: job.id,
                staging_path: job.staging_path.clone(),
                filename: filename.to_string(),
                origin: None,
            })
            .await
            .unwrap();

        job.id
    }

    async fn wait_for_terminal(&self, id: JobId) -> Job {
        for _ in 0..200 {
            let job = self.job_store.get_by_id(id).await.unwrap().unwrap();
            if job.status.is_terminal() {
                return job;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job never reached a terminal state");
    }
}

#[tokio::test]
async fn given_successful_engine_when_job_runs_then_result_is_persisted() {
    let harness = spawn_worker(
        Arc::new(FixedEngine {
            text: "hello world",
        }),
        None,
        Duration::from_secs(5),
        true,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    let job = harness.wait_for_terminal(id).await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.error_message.is_none());

    let result_path = job.result_path.expect("completed job has a result path");
    let payload = harness.artifact_store.fetch(&result_path).await.unwrap();
    let transcript: Transcript = serde_json::from_slice(&payload).unwrap();
    assert_eq!(transcript.text, "hello world");
}

#[tokio::test]
async fn given_successful_job_when_configured_then_staging_artifact_is_deleted() {
    let harness = spawn_worker(
        Arc::new(FixedEngine { text: "hi" }),
        None,
        Duration::from_secs(5),
        true,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    let job = harness.wait_for_terminal(id).await;

    assert!(harness.artifact_store.fetch(&job.staging_path).await.is_err());
}

#[tokio::test]
async fn given_retention_disabled_when_job_completes_then_staging_artifact_remains() {
    let harness = spawn_worker(
        Arc::new(FixedEngine { text: "hi" }),
        None,
        Duration::from_secs(5),
        false,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    let job = harness.wait_for_terminal(id).await;

    let staged = harness.artifact_store.fetch(&job.staging_path).await.unwrap();
    assert_eq!(staged, b"fake-audio");
}

#[tokio::test]
async fn given_failing_engine_when_job_runs_then_failure_is_recorded() {
    let harness = spawn_worker(Arc::new(FailingEngine), None, Duration::from_secs(5), true);

    let id = harness.enqueue("empty.wav", b"").await;
    let job = harness.wait_for_terminal(id).await;

    assert_eq!(job.status, JobStatus::Failed);
    let message = job.error_message.expect("failed job carries its error");
    assert!(message.contains("no audio samples decoded"));
    assert!(job.result_path.is_none());

    // Failed uploads are cleaned up the same as successful ones.
    assert!(harness.artifact_store.fetch(&job.staging_path).await.is_err());
}

#[tokio::test]
async fn given_hung_engine_when_deadline_passes_then_job_is_failed() {
    let harness = spawn_worker(
        Arc::new(SlowEngine {
            delay: Duration::from_secs(30),
        }),
        None,
        Duration::from_millis(50),
        true,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    let job = harness.wait_for_terminal(id).await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(
        job.error_message
            .unwrap()
            .contains("deadline exceeded")
    );
}

#[tokio::test]
async fn given_completed_job_when_notifier_configured_then_one_alert_is_sent() {
    let notifier = Arc::new(RecordingNotifier::default());
    let harness = spawn_worker(
        Arc::new(FixedEngine { text: "hi" }),
        Some(Arc::clone(&notifier) as Arc<dyn Notifier>),
        Duration::from_secs(5),
        true,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    harness.wait_for_terminal(id).await;

    let mut delivered = Vec::new();
    for _ in 0..100 {
        delivered = notifier.alerts.lock().await.clone();
        if !delivered.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].filename, "clip.wav");
    assert_eq!(delivered[0].job_id, Some(id));
}

#[tokio::test]
async fn given_failing_notifier_when_job_completes_then_outcome_is_unaffected() {
    let harness = spawn_worker(
        Arc::new(FixedEngine { text: "hi" }),
        Some(Arc::new(FailingNotifier)),
        Duration::from_secs(5),
        true,
    );

    let id = harness.enqueue("clip.wav", b"fake-audio").await;
    let job = harness.wait_for_terminal(id).await;

    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_failing_engine_when_job_fails_then_no_alert_is_sent() {
    let notifier = Arc::new(RecordingNotifier::default());
    let harness = spawn_worker(
        Arc::new(FailingEngine),
        Some(Arc::clone(&notifier) as Arc<dyn Notifier>),
        Duration::from_secs(5),
        true,
    );

    let id = harness.enqueue("clip.wav", b"x").await;
    harness.wait_for_terminal(id).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(notifier.alerts.lock().await.is_empty());
}
