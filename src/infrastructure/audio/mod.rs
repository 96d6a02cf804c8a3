pub mod audio_decoder;
pub mod vad;

mod candle_whisper_engine;
mod engine_factory;
mod remote_whisper_engine;

pub use candle_whisper_engine::CandleWhisperEngine;
pub use engine_factory::EngineFactory;
pub use remote_whisper_engine::RemoteWhisperEngine;
