use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{JobStore, JobStoreError};
use crate::domain::{Job, JobId, JobStatus, StoragePath};

/// Postgres-backed job table for deployments where submission and workers
/// run in separate processes sharing one store.
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), JobStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| JobStoreError::ConnectionFailed(e.to_string()))
    }
}

fn row_to_job(row: &PgRow) -> Result<Job, JobStoreError> {
    let map_err = |e: sqlx::Error| JobStoreError::QueryFailed(e.to_string());

    let status: String = row.try_get("status").map_err(map_err)?;
    let status = status.parse::<JobStatus>().map_err(JobStoreError::QueryFailed)?;

    Ok(Job {
        id: JobId::from_uuid(row.try_get::<Uuid, _>("id").map_err(map_err)?),
        filename: row.try_get("filename").map_err(map_err)?,
        staging_path: StoragePath::from_raw(
            row.try_get::<String, _>("staging_path").map_err(map_err)?,
        ),
        result_path: row
            .try_get::<Option<String>, _>("result_path")
            .map_err(map_err)?
            .map(StoragePath::from_raw),
        status,
        error_message: row.try_get("error_message").map_err(map_err)?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(map_err)?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(map_err)?,
    })
}

#[async_trait]
impl JobStore for PgJobStore {
    #[instrument(skip(self, job), fields(job_id = %job.id))]
    async fn create(&self, job: &Job) -> Result<(), JobStoreError> {
        sqlx::query(
            r#"
            INSERT INTO transcription_jobs
                (id, filename, staging_path, result_path, status, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(&job.filename)
        .bind(job.staging_path.as_str())
        .bind(job.result_path.as_ref().map(|p| p.as_str().to_string()))
        .bind(job.status.as_str())
        .bind(&job.error_message)
        .bind(job.created_at)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, JobStoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, filename, staging_path, result_path, status, error_message, created_at, updated_at
            FROM transcription_jobs
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        row.as_ref().map(row_to_job).transpose()
    }

    #[instrument(skip(self, error_message), fields(job_id = %id, status = %status))]
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transcription_jobs
            SET status = $1, error_message = $2, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(status.as_str())
        .bind(error_message)
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::NotFound(id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(job_id = %id))]
    async fn record_result(
        &self,
        id: JobId,
        result_path: &StoragePath,
    ) -> Result<(), JobStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE transcription_jobs
            SET status = $1, result_path = $2, error_message = NULL, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(JobStatus::Completed.as_str())
        .bind(result_path.as_str())
        .bind(Utc::now())
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(JobStoreError::NotFound(id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(status = %status))]
    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>, JobStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, filename, staging_path, result_path, status, error_message, created_at, updated_at
            FROM transcription_jobs
            WHERE status = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| JobStoreError::QueryFailed(e.to_string()))?;

        rows.iter().map(row_to_job).collect()
    }
}
