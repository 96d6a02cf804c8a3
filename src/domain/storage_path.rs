use std::fmt;
use std::path::Path;

use super::JobId;

/// Location of an artifact (staged upload or persisted result) inside the
/// artifact store, relative to the store root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    /// Path of a staged upload: `staging/{job}{suffix}`.
    pub fn staging(job_id: JobId, suffix: &str) -> Self {
        Self(format!("staging/{}{}", job_id.as_uuid().simple(), suffix))
    }

    /// Path of a persisted transcription result: `results/{job}.json`.
    pub fn result(job_id: JobId) -> Self {
        Self(format!("results/{}.json", job_id.as_uuid().simple()))
    }

    /// Staging suffix for an uploaded filename. The extension decides the
    /// suffix; uploads without one fall back to `.wav`.
    pub fn suffix_for(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| ".wav".to_string())
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
