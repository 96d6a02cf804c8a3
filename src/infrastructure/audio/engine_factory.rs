use std::sync::Arc;

use crate::application::ports::{TranscriptionEngine, TranscriptionError};
use crate::presentation::config::{EngineProviderSetting, EngineSettings};

use super::candle_whisper_engine::CandleWhisperEngine;
use super::remote_whisper_engine::RemoteWhisperEngine;

/// Builds the one engine instance the whole process shares. The engine is
/// constructed here, once, and handed to the server and worker explicitly.
pub struct EngineFactory;

impl EngineFactory {
    pub fn create(
        settings: &EngineSettings,
    ) -> Result<Arc<dyn TranscriptionEngine>, TranscriptionError> {
        match settings.provider {
            EngineProviderSetting::Local => {
                let engine = CandleWhisperEngine::new(
                    &settings.model,
                    settings.language.clone(),
                    settings.vad_filter,
                )?;
                Ok(Arc::new(engine))
            }
            EngineProviderSetting::Remote => {
                let engine = RemoteWhisperEngine::new(
                    settings.base_url.clone(),
                    settings.api_key.clone(),
                    settings.model.clone(),
                    settings.language.clone(),
                );
                Ok(Arc::new(engine))
            }
        }
    }
}
