//! Subtitle cues: segmentation, fallback, and SRT/VTT serialization.

mod fallback;
mod segmenter;
mod srt;
mod timestamp;
mod vtt;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use fallback::{resolve, FALLBACK_CUE_SECONDS, NO_SPEECH_TEXT};
pub use segmenter::{segment, SegmentOptions};
pub use srt::{parse_srt, preview, serialize_srt, ParsedCue};
pub use timestamp::{format_srt_time, format_vtt_time, parse_timestamp};
pub use vtt::serialize_vtt;

/// One displayed subtitle unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: u32,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Write cues to a WebVTT file, replacing any previous document at `path`.
pub fn write_vtt(path: &Path, cues: &[Cue]) -> std::io::Result<()> {
    std::fs::write(path, serialize_vtt(cues))
}
