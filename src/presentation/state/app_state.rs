use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{Notifier, TranscriptionEngine};
use crate::application::services::{StatusService, SubmissionService};

/// Everything a request handler can reach. The engine is generic so tests
/// plug in mocks; the services and notifier are shared behind `Arc`.
pub struct AppState<E: ?Sized>
where
    E: TranscriptionEngine,
{
    pub engine: Arc<E>,
    pub submission_service: Arc<SubmissionService>,
    pub status_service: Arc<StatusService>,
    pub notifier: Option<Arc<dyn Notifier>>,
    pub engine_deadline: Duration,
}

impl<E: ?Sized> Clone for AppState<E>
where
    E: TranscriptionEngine,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            submission_service: Arc::clone(&self.submission_service),
            status_service: Arc::clone(&self.status_service),
            notifier: self.notifier.clone(),
            engine_deadline: self.engine_deadline,
        }
    }
}
