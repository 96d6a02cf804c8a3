use std::sync::Arc;

use crate::application::ports::{CompletionAlert, Notifier};

/// Hands an alert to the notifier on a detached task. Delivery failures are
/// logged and swallowed: the transcription response must never wait on, or
/// fail because of, the notification sink.
pub fn dispatch_alert(notifier: Arc<dyn Notifier>, alert: CompletionAlert) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(&alert).await {
            tracing::warn!(
                error = %e,
                filename = %alert.filename,
                "Completion alert delivery failed"
            );
        }
    });
}
