use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use skald::application::ports::{ArtifactStore, JobStore};
use skald::application::services::{
    ResultError, ResultReport, StatusService, SubmissionError, SubmissionService,
};
use skald::domain::{Job, JobStatus, StoragePath, Transcript};
use skald::infrastructure::persistence::MemoryJobStore;
use skald::infrastructure::storage::MemoryArtifactStore;

fn submission_harness() -> (
    Arc<MemoryJobStore>,
    Arc<MemoryArtifactStore>,
    SubmissionService,
    mpsc::Receiver<skald::application::services::TranscriptionMessage>,
) {
    let job_store = Arc::new(MemoryJobStore::new());
    let artifact_store = Arc::new(MemoryArtifactStore::new());
    let (sender, receiver) = mpsc::channel(8);
    let service = SubmissionService::new(
        Arc::clone(&artifact_store) as Arc<dyn ArtifactStore>,
        Arc::clone(&job_store) as Arc<dyn JobStore>,
        sender,
    );
    (job_store, artifact_store, service, receiver)
}

#[tokio::test]
async fn given_upload_when_submitted_then_job_is_created_queued() {
    let (job_store, _artifact_store, service, _receiver) = submission_harness();

    let id = service
        .submit(Bytes::from_static(b"fake-audio"), "clip.wav", None)
        .await
        .unwrap();

    let job = job_store.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Queued);
    assert_eq!(job.filename, "clip.wav");
}

#[tokio::test]
async fn given_upload_when_submitted_then_payload_is_staged_with_extension_suffix() {
    let (job_store, artifact_store, service, _receiver) = submission_harness();

    let id = service
        .submit(Bytes::from_static(b"fake-audio"), "talk.mp3", None)
        .await
        .unwrap();

    let job = job_store.get_by_id(id).await.unwrap().unwrap();
    assert!(job.staging_path.as_str().ends_with(".mp3"));

    let staged = artifact_store.fetch(&job.staging_path).await.unwrap();
    assert_eq!(staged, b"fake-audio");
}

#[tokio::test]
async fn given_filename_without_extension_when_submitted_then_wav_suffix_is_used() {
    let (job_store, _artifact_store, service, _receiver) = submission_harness();

    let id = service
        .submit(Bytes::from_static(b"fake-audio"), "recording", None)
        .await
        .unwrap();

    let job = job_store.get_by_id(id).await.unwrap().unwrap();
    assert!(job.staging_path.as_str().ends_with(".wav"));
}

#[tokio::test]
async fn given_submission_when_enqueued_then_message_references_staged_file() {
    let (_job_store, _artifact_store, service, mut receiver) = submission_harness();

    let id = service
        .submit(Bytes::from_static(b"fake-audio"), "clip.wav", Some("203.0.113.7".into()))
        .await
        .unwrap();

    let msg = receiver.recv().await.unwrap();
    assert_eq!(msg.job_id, id);
    assert_eq!(msg.filename, "clip.wav");
    assert_eq!(msg.origin.as_deref(), Some("203.0.113.7"));
}

#[tokio::test]
async fn given_closed_queue_when_submitted_then_job_is_marked_failed() {
    let (job_store, _artifact_store, service, receiver) = submission_harness();
    drop(receiver);

    let err = service
        .submit(Bytes::from_static(b"fake-audio"), "clip.wav", None)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::QueueUnavailable));

    // The handed-out id must still resolve, in a terminal state.
    let jobs = job_store.list_by_status(JobStatus::Failed).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert!(jobs[0].error_message.as_deref().unwrap().contains("queue"));
}

fn status_harness() -> (Arc<MemoryJobStore>, Arc<MemoryArtifactStore>, StatusService) {
    let job_store = Arc::new(MemoryJobStore::new());
    let artifact_store = Arc::new(MemoryArtifactStore::new());
    let service = StatusService::new(
        Arc::clone(&job_store) as Arc<dyn JobStore>,
        Arc::clone(&artifact_store) as Arc<dyn ArtifactStore>,
    );
    (job_store, artifact_store, service)
}

#[tokio::test]
async fn given_queued_job_when_result_requested_then_reports_not_ready() {
    let (job_store, _artifact_store, service) = status_harness();
    let job = Job::new("clip.wav".to_string());
    job_store.create(&job).await.unwrap();

    let report = service.result(job.id).await.unwrap();

    assert!(matches!(
        report,
        ResultReport::NotReady {
            status: JobStatus::Queued
        }
    ));
}

#[tokio::test]
async fn given_failed_job_when_result_requested_then_reports_failure() {
    let (job_store, _artifact_store, service) = status_harness();
    let job = Job::new("clip.wav".to_string());
    job_store.create(&job).await.unwrap();
    job_store
        .update_status(job.id, JobStatus::Failed, Some("decode error"))
        .await
        .unwrap();

    let report = service.result(job.id).await.unwrap();

    match report {
        ResultReport::Failed { error } => assert_eq!(error, "decode error"),
        _ => panic!("expected a failure report"),
    }
}

#[tokio::test]
async fn given_completed_job_when_result_file_missing_then_reports_unreadable() {
    let (job_store, _artifact_store, service) = status_harness();
    let job = Job::new("clip.wav".to_string());
    job_store.create(&job).await.unwrap();
    job_store
        .record_result(job.id, &StoragePath::result(job.id))
        .await
        .unwrap();

    let err = service.result(job.id).await.unwrap_err();
    assert!(matches!(err, ResultError::Unreadable(_)));

    // Retrieval failed, but the job's success is not lost.
    let report = service.status(job.id).await.unwrap();
    assert_eq!(report.job.status, JobStatus::Completed);
    assert!(report.transcript.is_none());
}

#[tokio::test]
async fn given_completed_job_when_result_readable_then_transcript_is_returned() {
    let (job_store, artifact_store, service) = status_harness();
    let job = Job::new("clip.wav".to_string());
    job_store.create(&job).await.unwrap();

    let result_path = StoragePath::result(job.id);
    let transcript = Transcript::from_text("hello world");
    let payload = serde_json::to_vec(&transcript).unwrap();
    let stream = futures::stream::once(async move {
        Ok::<_, std::io::Error>(Bytes::from(payload))
    });
    artifact_store
        .store(&result_path, Box::pin(stream), None)
        .await
        .unwrap();
    job_store.record_result(job.id, &result_path).await.unwrap();

    match service.result(job.id).await.unwrap() {
        ResultReport::Ready { transcript } => assert_eq!(transcript.text, "hello world"),
        _ => panic!("expected a ready report"),
    }
}
