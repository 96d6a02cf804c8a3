use async_trait::async_trait;

use crate::domain::{Job, JobId, JobStatus, StoragePath};

/// Durable mapping from job id to lifecycle state and result location.
///
/// Every id handed to a caller must stay resolvable here until the store's
/// retention policy expires it.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), JobStoreError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, JobStoreError>;

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), JobStoreError>;

    /// Records the persisted result location and moves the job to
    /// `Completed` in one step, so a completed job always has a result path.
    async fn record_result(
        &self,
        id: JobId,
        result_path: &StoragePath,
    ) -> Result<(), JobStoreError>;

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, JobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("job not found: {0}")]
    NotFound(String),
}
