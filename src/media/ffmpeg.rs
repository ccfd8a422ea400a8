//! ffmpeg-backed [`Transcoder`].

use super::{SubtitleStyle, TranscodeError, Transcoder, AUDIO_FILE, CAPTIONED_VIDEO_FILE};
use log::{debug, warn};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct FfmpegTranscoder {
    pub binary: String,
}

impl FfmpegTranscoder {
    pub fn new(binary: Option<String>) -> Self {
        Self {
            binary: binary.unwrap_or_else(|| "ffmpeg".to_string()),
        }
    }

    fn run(&self, args: Vec<OsString>, expected: &Path) -> Result<(), TranscodeError> {
        debug!("[ffmpeg] {} {:?}", self.binary, args);
        let output = Command::new(&self.binary)
            .args(["-hide_banner", "-loglevel", "error", "-nostdin", "-y"])
            .args(&args)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::MissingBinary(self.binary.clone())
                } else {
                    TranscodeError::Spawn {
                        command: self.binary.clone(),
                        source: e,
                    }
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("[ffmpeg] exit={:?} stderr={:?}", output.status.code(), stderr);
            return Err(TranscodeError::Failed {
                command: self.binary.clone(),
                status: output.status.code(),
                stderr,
            });
        }

        if !expected.exists() {
            return Err(TranscodeError::MissingOutput {
                command: self.binary.clone(),
                path: expected.to_path_buf(),
            });
        }
        Ok(())
    }
}

/// Escape a value for use inside an ffmpeg filtergraph.
///
/// Two levels apply: the filter option parser treats `\ ' :` as special, and the
/// filtergraph parser then treats `\ ' [ ] , ;` as special in the result.
pub fn escape_filter_value(value: &str) -> String {
    let mut option_level = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            option_level.push('\\');
        }
        option_level.push(c);
    }

    let mut graph_level = String::with_capacity(option_level.len() + 8);
    for c in option_level.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph_level.push('\\');
        }
        graph_level.push(c);
    }
    graph_level
}

/// `-vf` argument that renders `subtitle_path` with the given `force_style`.
pub fn subtitles_filter(subtitle_path: &Path, force_style: &str) -> String {
    format!(
        "subtitles=filename={}:force_style={}",
        escape_filter_value(&subtitle_path.to_string_lossy()),
        escape_filter_value(force_style)
    )
}

impl Transcoder for FfmpegTranscoder {
    fn extract_audio(&self, video_path: &Path, out_dir: &Path) -> Result<PathBuf, TranscodeError> {
        let audio_path = out_dir.join(AUDIO_FILE);
        let args: Vec<OsString> = vec![
            "-i".into(),
            video_path.as_os_str().to_os_string(),
            "-vn".into(),
            "-ac".into(),
            "1".into(),
            "-ar".into(),
            "16000".into(),
            "-c:a".into(),
            "pcm_s16le".into(),
            audio_path.as_os_str().to_os_string(),
        ];
        self.run(args, &audio_path)?;
        Ok(audio_path)
    }

    fn burn_subtitles(
        &self,
        video_path: &Path,
        subtitle_path: &Path,
        style: &SubtitleStyle,
        out_dir: &Path,
    ) -> Result<PathBuf, TranscodeError> {
        let output_path = out_dir.join(CAPTIONED_VIDEO_FILE);
        let force_style = style.force_style().map_err(TranscodeError::InvalidStyle)?;
        let args: Vec<OsString> = vec![
            "-i".into(),
            video_path.as_os_str().to_os_string(),
            "-vf".into(),
            subtitles_filter(subtitle_path, &force_style).into(),
            "-c:v".into(),
            "libx264".into(),
            "-c:a".into(),
            "aac".into(),
            output_path.as_os_str().to_os_string(),
        ];
        self.run(args, &output_path)?;
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_the_ffmpeg_manual_example() {
        let raw = "this is a 'string': may contain one, or more, special characters";
        assert_eq!(
            escape_filter_value(raw),
            r"this is a \\\'string\\\'\\: may contain one\, or more\, special characters"
        );
    }

    #[test]
    fn windows_paths_keep_their_drive_colon_and_backslashes() {
        assert_eq!(
            escape_filter_value(r"C:\videos\it's.srt"),
            r"C\\:\\\\videos\\\\it\\\'s.srt"
        );
    }

    #[test]
    fn plain_unix_path_is_untouched() {
        assert_eq!(
            escape_filter_value("/tmp/temp/abc/subtitles.srt"),
            "/tmp/temp/abc/subtitles.srt"
        );
    }

    #[test]
    fn filter_escapes_style_commas() {
        let filter = subtitles_filter(
            Path::new("/s/a:b.srt"),
            "Fontsize=24,PrimaryColour=&H00FFFFFF",
        );
        assert_eq!(
            filter,
            r"subtitles=filename=/s/a\\:b.srt:force_style=Fontsize=24\,PrimaryColour=&H00FFFFFF"
        );
    }

    #[test]
    fn missing_binary_is_a_transcode_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new(Some("autocaption-no-such-ffmpeg".into()));
        let err = transcoder
            .extract_audio(&dir.path().join("in.mp4"), dir.path())
            .unwrap_err();
        assert!(matches!(err, TranscodeError::MissingBinary(_)));
        assert!(!dir.path().join(AUDIO_FILE).exists());
    }
}
