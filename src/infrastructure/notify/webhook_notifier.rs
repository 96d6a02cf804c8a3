use async_trait::async_trait;

use crate::application::ports::{CompletionAlert, Notifier, NotifierError};

/// Delivers completion alerts as a JSON POST to a configured endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alert: &CompletionAlert) -> Result<(), NotifierError> {
        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|e| NotifierError::DeliveryFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifierError::DeliveryFailed(format!(
                "status {}",
                response.status()
            )));
        }

        tracing::debug!(
            filename = %alert.filename,
            url = %self.url,
            "Completion alert delivered"
        );

        Ok(())
    }
}
