//! Audio extraction and subtitle burn-in through an external transcoder.

mod ffmpeg;
mod style;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use ffmpeg::{escape_filter_value, subtitles_filter, FfmpegTranscoder};
pub use style::{ass_colour, SubtitleStyle};

/// File name of the extracted audio inside the session directory.
pub const AUDIO_FILE: &str = "audio.wav";
/// File name of the burned-in output inside the session directory.
pub const CAPTIONED_VIDEO_FILE: &str = "final_captioned_video.mp4";

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("missing command `{0}` on PATH")]
    MissingBinary(String),

    #[error("`{command}` failed (status: {status:?}): {stderr}")]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("`{command}` did not produce {path}")]
    MissingOutput { command: String, path: PathBuf },

    #[error("invalid subtitle style: {0}")]
    InvalidStyle(String),

    #[error("could not start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// The two transcoder operations the caption pipeline depends on.
pub trait Transcoder: Send + Sync {
    /// Produce mono 16 kHz PCM audio from any video container, written into `out_dir`.
    fn extract_audio(&self, video_path: &Path, out_dir: &Path) -> Result<PathBuf, TranscodeError>;

    /// Composite the subtitle document onto the video, written into `out_dir`.
    fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style: &SubtitleStyle,
        out_dir: &Path,
    ) -> Result<PathBuf, TranscodeError>;
}
