//! Fixed-length windowing on top of any other source.
//!
//! The WAV is cut into back-to-back windows and each window is transcribed on
//! its own. A window the recognizer rejects is dropped; the rest still count.

use super::backend::{TranscriptSource, TranscriptionError, Utterance};
use super::wav_extract::{extract_segment, wav_duration_secs};
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;

pub struct FixedWindowSource {
    inner: Arc<dyn TranscriptSource>,
    window_ms: u64,
}

impl FixedWindowSource {
    pub fn new(inner: Arc<dyn TranscriptSource>, window_secs: f64) -> Self {
        Self {
            inner,
            window_ms: ((window_secs * 1000.0).round() as u64).max(1000),
        }
    }
}

impl TranscriptSource for FixedWindowSource {
    fn id(&self) -> &'static str {
        "fixed-window"
    }

    fn name(&self) -> &'static str {
        "Fixed windows"
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn transcribe(&self, audio_path: &Path) -> Result<Vec<Utterance>, TranscriptionError> {
        let total_secs = wav_duration_secs(audio_path).map_err(TranscriptionError::Failed)?;
        let total_ms = (total_secs * 1000.0).round() as u64;
        let scratch_dir = audio_path.parent().unwrap_or_else(|| Path::new("."));

        let mut utterances = Vec::new();
        let mut window_start = 0u64;
        let mut window_idx = 0usize;
        while window_start < total_ms {
            let window_end = (window_start + self.window_ms).min(total_ms);
            let chunk_path = scratch_dir.join(format!("chunk_{:04}.wav", window_idx));

            let result = extract_segment(audio_path, &chunk_path, window_start, window_end)
                .map_err(TranscriptionError::Failed)
                .and_then(|_| self.inner.transcribe(&chunk_path));
            let _ = std::fs::remove_file(&chunk_path);

            let offset = window_start as f64 / 1000.0;
            let window_secs = (window_end - window_start) as f64 / 1000.0;
            match result {
                Ok(found) => {
                    debug!(
                        "[transcribe] window {}: {} utterances at +{:.3}s",
                        window_idx,
                        found.len(),
                        offset
                    );
                    utterances.extend(found.into_iter().map(|u| Utterance {
                        start: offset + u.start.clamp(0.0, window_secs),
                        end: offset + u.end.clamp(0.0, window_secs),
                        text: u.text,
                    }));
                }
                Err(TranscriptionError::Failed(msg)) => {
                    warn!("[transcribe] window {}: dropped: {}", window_idx, msg);
                }
                Err(err @ TranscriptionError::Unavailable(_)) => return Err(err),
            }

            window_start = window_end;
            window_idx += 1;
        }

        Ok(utterances)
    }
}
