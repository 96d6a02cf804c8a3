//! Offline voice-activity filtering: strips long silent stretches from a
//! PCM buffer before it is chunked for inference, so the model never spends
//! a 30-second window on dead air.

/// RMS-windowed silence detection over a decoded buffer.
#[derive(Debug, Clone, Copy)]
pub struct VadConfig {
    /// RMS level below which a window counts as silence.
    pub silence_threshold: f32,
    /// Window length used for RMS measurement.
    pub window_ms: u32,
    /// Silent runs shorter than this are kept; longer runs are collapsed
    /// down to this much padding so word boundaries stay intact.
    pub min_silence_ms: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            silence_threshold: 0.01,
            window_ms: 30,
            min_silence_ms: 500,
        }
    }
}

/// Returns the input with every silent run longer than `min_silence_ms`
/// collapsed to that length. A buffer with no speech at all collapses to a
/// single padding run; speech-only buffers come back unchanged.
pub fn strip_silence(pcm: &[f32], sample_rate: u32, config: &VadConfig) -> Vec<f32> {
    let window = (sample_rate as usize * config.window_ms as usize) / 1000;
    if window == 0 || pcm.len() <= window {
        return pcm.to_vec();
    }

    let max_silent_windows = (config.min_silence_ms / config.window_ms).max(1) as usize;

    let mut out = Vec::with_capacity(pcm.len());
    let mut silent_run: usize = 0;

    for chunk in pcm.chunks(window) {
        if rms(chunk) < config.silence_threshold {
            silent_run += 1;
            if silent_run <= max_silent_windows {
                out.extend_from_slice(chunk);
            }
        } else {
            silent_run = 0;
            out.extend_from_slice(chunk);
        }
    }

    out
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
