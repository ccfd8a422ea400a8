//! Pluggable transcript sources.

mod backend;
mod fixed_window;
mod model_download;
mod remote_api;
mod wav_extract;
mod whisper_cli;

pub use backend::{TranscriptSource, TranscriptionError, Utterance};
pub use fixed_window::FixedWindowSource;
pub use model_download::{download_model_with_progress, model_path, resolve_model_path};
pub use remote_api::{parse_verbose_json, RemoteApiBackend, RemoteTranscriptionConfig};
pub use wav_extract::{extract_segment, wav_duration_secs, write_wav_from_samples};
pub use whisper_cli::{parse_whisper_output, WhisperCliBackend};
