mod artifact_store;
mod job_store;
mod notifier;
mod transcription_engine;

pub use artifact_store::{ArtifactStore, ArtifactStoreError};
pub use job_store::{JobStore, JobStoreError};
pub use notifier::{CompletionAlert, Notifier, NotifierError};
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
