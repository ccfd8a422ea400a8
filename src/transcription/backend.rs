//! Transcript source trait and types.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// A raw recognizer result: an approximate time span plus its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    /// Recognizer missing, model missing, or service unreachable.
    #[error("transcription unavailable: {0}")]
    Unavailable(String),

    /// Recognizer ran but could not make sense of the audio.
    #[error("transcription failed: {0}")]
    Failed(String),
}

impl TranscriptionError {
    /// The bare message, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Unavailable(msg) | Self::Failed(msg) => msg,
        }
    }
}

/// Anything that can turn a 16 kHz mono WAV file into utterances.
///
/// Implementations are created once at startup and shared across requests.
pub trait TranscriptSource: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn is_available(&self) -> bool;
    fn transcribe(&self, audio_path: &Path) -> Result<Vec<Utterance>, TranscriptionError>;
}
