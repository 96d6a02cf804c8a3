use bytes::Bytes;

use skald::application::ports::{ArtifactStore, ArtifactStoreError, JobStore, JobStoreError};
use skald::domain::{Job, JobId, JobStatus, StoragePath};
use skald::infrastructure::persistence::MemoryJobStore;
use skald::infrastructure::storage::{LocalArtifactStore, MemoryArtifactStore};

fn one_chunk(
    data: &'static [u8],
) -> futures::stream::BoxStream<'static, Result<Bytes, std::io::Error>> {
    Box::pin(futures::stream::once(async move {
        Ok(Bytes::from_static(data))
    }))
}

async fn exercise_store(store: &dyn ArtifactStore) {
    let path = StoragePath::staging(JobId::new(), ".wav");

    let written = store.store(&path, one_chunk(b"fake-audio"), None).await.unwrap();
    assert_eq!(written, 10);

    assert_eq!(store.head(&path).await.unwrap(), 10);
    assert_eq!(store.fetch(&path).await.unwrap(), b"fake-audio");

    store.delete(&path).await.unwrap();
    assert!(matches!(
        store.fetch(&path).await,
        Err(ArtifactStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_local_store_when_exercised_then_round_trips_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArtifactStore::new(dir.path().to_path_buf()).unwrap();

    exercise_store(&store).await;
}

#[tokio::test]
async fn given_memory_store_when_exercised_then_round_trips_artifacts() {
    let store = MemoryArtifactStore::new();

    exercise_store(&store).await;
}

#[tokio::test]
async fn given_local_store_when_staging_and_result_written_then_both_resolve() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalArtifactStore::new(dir.path().to_path_buf()).unwrap();
    let id = JobId::new();

    store
        .store(&StoragePath::staging(id, ".wav"), one_chunk(b"audio"), None)
        .await
        .unwrap();
    store
        .store(&StoragePath::result(id), one_chunk(b"{\"text\":\"hi\"}"), None)
        .await
        .unwrap();

    assert_eq!(store.fetch(&StoragePath::staging(id, ".wav")).await.unwrap(), b"audio");
    assert_eq!(
        store.fetch(&StoragePath::result(id)).await.unwrap(),
        b"{\"text\":\"hi\"}"
    );
}

#[tokio::test]
async fn given_job_when_created_then_get_returns_every_field() {
    let store = MemoryJobStore::new();
    let job = Job::new("clip.wav".to_string());
    store.create(&job).await.unwrap();

    let fetched = store.get_by_id(job.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, job.id);
    assert_eq!(fetched.filename, job.filename);
    assert_eq!(fetched.staging_path, job.staging_path);
    assert_eq!(fetched.status, JobStatus::Queued);
    assert_eq!(fetched.created_at, job.created_at);
}

#[tokio::test]
async fn given_unknown_id_when_fetched_then_returns_none() {
    let store = MemoryJobStore::new();

    assert!(store.get_by_id(JobId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn given_status_update_then_message_and_timestamp_change() {
    let store = MemoryJobStore::new();
    let job = Job::new("clip.wav".to_string());
    store.create(&job).await.unwrap();

    store
        .update_status(job.id, JobStatus::Failed, Some("decode error"))
        .await
        .unwrap();

    let fetched = store.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Failed);
    assert_eq!(fetched.error_message.as_deref(), Some("decode error"));
    assert!(fetched.updated_at >= fetched.created_at);
}

#[tokio::test]
async fn given_unknown_id_when_updated_then_returns_not_found() {
    let store = MemoryJobStore::new();

    let err = store
        .update_status(JobId::new(), JobStatus::Processing, None)
        .await
        .unwrap_err();

    assert!(matches!(err, JobStoreError::NotFound(_)));
}

#[tokio::test]
async fn given_recorded_result_then_job_completes_with_result_path() {
    let store = MemoryJobStore::new();
    let job = Job::new("clip.wav".to_string());
    store.create(&job).await.unwrap();
    store
        .update_status(job.id, JobStatus::Failed, Some("transient"))
        .await
        .unwrap();

    let result_path = StoragePath::result(job.id);
    store.record_result(job.id, &result_path).await.unwrap();

    let fetched = store.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Completed);
    assert_eq!(fetched.result_path, Some(result_path));
    assert!(fetched.error_message.is_none());
}

#[tokio::test]
async fn given_mixed_jobs_when_listed_by_status_then_only_matching_return() {
    let store = MemoryJobStore::new();

    let queued = Job::new("a.wav".to_string());
    store.create(&queued).await.unwrap();

    let failed = Job::new("b.wav".to_string());
    store.create(&failed).await.unwrap();
    store
        .update_status(failed.id, JobStatus::Failed, Some("boom"))
        .await
        .unwrap();

    let listed = store.list_by_status(JobStatus::Failed).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, failed.id);
}
