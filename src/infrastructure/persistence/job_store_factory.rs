use std::sync::Arc;

use crate::application::ports::{JobStore, JobStoreError};
use crate::presentation::config::{JobStoreProviderSetting, JobStoreSettings};

use super::memory_job_store::MemoryJobStore;
use super::pg_job_store::PgJobStore;
use super::pg_pool::create_pool;

pub struct JobStoreFactory;

impl JobStoreFactory {
    pub async fn create(
        settings: &JobStoreSettings,
    ) -> Result<Arc<dyn JobStore>, JobStoreError> {
        match settings.provider {
            JobStoreProviderSetting::Memory => Ok(Arc::new(MemoryJobStore::new())),
            JobStoreProviderSetting::Postgres => {
                let url = settings.database_url.as_deref().ok_or_else(|| {
                    JobStoreError::ConnectionFailed("database_url required".into())
                })?;
                let pool = create_pool(url, settings.max_connections).await?;
                let store = PgJobStore::new(pool);
                store.migrate().await?;
                Ok(Arc::new(store))
            }
        }
    }
}
