mod alerts;
mod status_service;
mod submission_service;
mod transcription_worker;

pub use alerts::dispatch_alert;
pub use status_service::{
    JobStatusReport, ResultError, ResultReport, StatusError, StatusService, public_status_label,
};
pub use submission_service::{SubmissionError, SubmissionService};
pub use transcription_worker::{TranscriptionMessage, TranscriptionWorker, TranscriptionWorkerError};
