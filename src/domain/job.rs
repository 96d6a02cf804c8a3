use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{JobStatus, StoragePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One transcription request tracked by identifier through its lifecycle.
///
/// The staging path is derived from the job id, so two jobs can never
/// collide on disk even when the same file is uploaded twice.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub filename: String,
    pub staging_path: StoragePath,
    pub result_path: Option<StoragePath>,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(filename: String) -> Self {
        let id = JobId::new();
        let suffix = StoragePath::suffix_for(&filename);
        let now = Utc::now();
        Self {
            id,
            filename,
            staging_path: StoragePath::staging(id, &suffix),
            result_path: None,
            status: JobStatus::Queued,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }
}
