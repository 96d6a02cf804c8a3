use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::domain::{Transcript, TranscriptSegment};

/// Client for an OpenAI-compatible `/audio/transcriptions` endpoint
/// (api.openai.com or a self-hosted faster-whisper server). Requests
/// verbose output so per-segment timing survives the round trip.
pub struct RemoteWhisperEngine {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    language: Option<String>,
}

impl RemoteWhisperEngine {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: String,
        language: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            api_key,
            model,
            language,
        }
    }
}

#[async_trait]
impl TranscriptionEngine for RemoteWhisperEngine {
    async fn transcribe(&self, audio_data: &[u8]) -> Result<Transcript, TranscriptionError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(audio_data.to_vec())
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("mime: {}", e)))?;

        let mut form = multipart::Form::new()
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .part("file", file_part);
        if let Some(language) = &self.language {
            form = form.text("language", language.clone());
        }

        tracing::debug!(model = %self.model, "Sending audio to remote Whisper API");

        let mut request = self.client.post(&url).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TranscriptionError::ApiRequestFailed(format!(
                "status {}: {}",
                status, body
            )));
        }

        let payload: VerboseTranscription = response
            .json()
            .await
            .map_err(|e| TranscriptionError::ApiRequestFailed(format!("body: {}", e)))?;

        tracing::info!(
            chars = payload.text.len(),
            segments = payload.segments.len(),
            "Remote Whisper transcription completed"
        );

        Ok(payload.into_transcript())
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    segments: Vec<VerboseSegment>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct VerboseSegment {
    start: f32,
    end: f32,
    text: String,
}

impl VerboseTranscription {
    fn into_transcript(self) -> Transcript {
        Transcript {
            text: self.text.trim().to_string(),
            segments: self
                .segments
                .into_iter()
                .enumerate()
                .map(|(index, s)| TranscriptSegment {
                    index,
                    start_secs: s.start,
                    end_secs: s.end,
                    text: s.text.trim().to_string(),
                })
                .collect(),
            language: self.language,
            duration_secs: self.duration,
        }
    }
}
