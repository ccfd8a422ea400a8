//! Video in, subtitle document out.
//!
//! Transcription trouble never fails a request: it becomes a placeholder cue.
//! Transcoder trouble always does, and nothing is written in that case.

use crate::error::{CaptionError, CaptionResult};
use crate::media::{SubtitleStyle, Transcoder};
use crate::subtitle::{self, ParsedCue, SegmentOptions};
use crate::transcription::{wav_duration_secs, TranscriptSource, TranscriptionError};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SRT_FILE: &str = "subtitles.srt";
pub const VTT_FILE: &str = "subtitles.vtt";

/// Knobs for one caption generation.
#[derive(Debug, Clone, Copy)]
pub struct CaptionSettings {
    pub words_per_cue: usize,
    pub min_cue_duration: f64,
    pub preview_limit: usize,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            words_per_cue: 10,
            min_cue_duration: 0.1,
            preview_limit: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCaptions {
    pub subtitle_file: String,
    pub cue_count: usize,
    /// Set when the document holds a placeholder instead of recognized speech.
    pub transcription_error: Option<String>,
    pub preview: Vec<ParsedCue>,
}

/// Extract audio, transcribe, and write `subtitles.srt` / `subtitles.vtt` into `session_dir`.
pub fn generate_captions(
    transcoder: &dyn Transcoder,
    source: &dyn TranscriptSource,
    session_dir: &Path,
    video_path: &Path,
    settings: &CaptionSettings,
) -> CaptionResult<GeneratedCaptions> {
    let audio_path = transcoder.extract_audio(video_path, session_dir)?;
    let media_duration = match wav_duration_secs(&audio_path) {
        Ok(secs) => Some(secs),
        Err(e) => {
            warn!("[captions] cannot read duration of {}: {}", audio_path.display(), e);
            None
        }
    };

    let (utterances, failure) = match source.transcribe(&audio_path) {
        Ok(utterances) => (utterances, None),
        Err(TranscriptionError::Failed(msg)) => {
            warn!("[captions] {} could not understand the audio: {}", source.id(), msg);
            (Vec::new(), None)
        }
        Err(err @ TranscriptionError::Unavailable(_)) => {
            warn!("[captions] {} unavailable: {}", source.id(), err.message());
            (Vec::new(), Some(err))
        }
    };
    debug!(
        "[captions] {} utterances, media_duration={:?}",
        utterances.len(),
        media_duration
    );

    let options = SegmentOptions {
        words_per_cue: settings.words_per_cue,
        min_cue_duration: settings.min_cue_duration,
        media_duration,
    };
    let cues = subtitle::resolve(subtitle::segment(&utterances, &options), failure.as_ref());

    let srt_text = subtitle::serialize_srt(&cues);
    std::fs::write(session_dir.join(SRT_FILE), &srt_text)?;
    subtitle::write_vtt(&session_dir.join(VTT_FILE), &cues)?;
    info!(
        "[captions] wrote {} cue(s) to {}",
        cues.len(),
        session_dir.join(SRT_FILE).display()
    );

    Ok(GeneratedCaptions {
        subtitle_file: SRT_FILE.to_string(),
        cue_count: cues.len(),
        transcription_error: failure.map(|e| e.message().to_string()),
        preview: subtitle::preview(&srt_text, settings.preview_limit),
    })
}

/// Burn `subtitle_path` into `video_path`, writing the result into `session_dir`.
pub fn burn_captions(
    transcoder: &dyn Transcoder,
    session_dir: &Path,
    video_path: &Path,
    subtitle_path: &Path,
    style: &SubtitleStyle,
) -> CaptionResult<PathBuf> {
    style.force_style().map_err(CaptionError::InvalidRequest)?;
    let output = transcoder.burn_subtitles(video_path, subtitle_path, style, session_dir)?;
    info!("[captions] burned {} into {}", subtitle_path.display(), output.display());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{TranscodeError, AUDIO_FILE, CAPTIONED_VIDEO_FILE};
    use crate::transcription::{write_wav_from_samples, Utterance};
    use std::sync::Mutex;

    /// Writes a silent WAV of `secs` seconds, or fails like a missing ffmpeg.
    struct FakeTranscoder {
        secs: usize,
        broken: bool,
        burned_style: Mutex<Option<SubtitleStyle>>,
    }

    impl FakeTranscoder {
        fn new(secs: usize) -> Self {
            Self { secs, broken: false, burned_style: Mutex::new(None) }
        }
    }

    impl Transcoder for FakeTranscoder {
        fn extract_audio(&self, _video: &Path, out_dir: &Path) -> Result<PathBuf, TranscodeError> {
            if self.broken {
                return Err(TranscodeError::MissingBinary("ffmpeg".into()));
            }
            let path = out_dir.join(AUDIO_FILE);
            write_wav_from_samples(&path, &vec![0i16; 16000 * self.secs]).unwrap();
            Ok(path)
        }

        fn burn_subtitles(
            &self,
            _video: &Path,
            _subs: &Path,
            style: &SubtitleStyle,
            out_dir: &Path,
        ) -> Result<PathBuf, TranscodeError> {
            *self.burned_style.lock().unwrap() = Some(style.clone());
            let path = out_dir.join(CAPTIONED_VIDEO_FILE);
            std::fs::write(&path, b"video").unwrap();
            Ok(path)
        }
    }

    struct FakeSource(Result<Vec<Utterance>, TranscriptionError>);

    impl TranscriptSource for FakeSource {
        fn id(&self) -> &'static str {
            "fake"
        }
        fn name(&self) -> &'static str {
            "Fake"
        }
        fn is_available(&self) -> bool {
            true
        }
        fn transcribe(&self, _audio: &Path) -> Result<Vec<Utterance>, TranscriptionError> {
            self.0.clone()
        }
    }

    fn run(transcoder: &FakeTranscoder, source: FakeSource) -> (tempfile::TempDir, CaptionResult<GeneratedCaptions>) {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"fake video").unwrap();
        let result = generate_captions(transcoder, &source, dir.path(), &video, &CaptionSettings::default());
        (dir, result)
    }

    #[test]
    fn speech_becomes_srt_and_preview() {
        let source = FakeSource(Ok(vec![Utterance {
            start: 0.0,
            end: 3.0,
            text: "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda".into(),
        }]));
        let (dir, result) = run(&FakeTranscoder::new(4), source);
        let out = result.unwrap();

        assert_eq!(out.subtitle_file, SRT_FILE);
        assert_eq!(out.cue_count, 2);
        assert!(out.transcription_error.is_none());
        assert_eq!(out.preview.len(), 2);
        assert_eq!(out.preview[1].time_range, "00:00:02,727 --> 00:00:03,000");
        assert_eq!(out.preview[1].text, "lambda");

        let srt = std::fs::read_to_string(dir.path().join(SRT_FILE)).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,727\nalpha beta"));
        assert!(dir.path().join(VTT_FILE).exists());
    }

    #[test]
    fn silence_becomes_no_speech_notice() {
        let (dir, result) = run(&FakeTranscoder::new(2), FakeSource(Ok(Vec::new())));
        let out = result.unwrap();
        assert_eq!(out.cue_count, 1);
        let srt = std::fs::read_to_string(dir.path().join(SRT_FILE)).unwrap();
        assert_eq!(srt, "1\n00:00:00,000 --> 00:00:05,000\nNo speech detected in video\n\n");
    }

    #[test]
    fn unavailable_recognizer_becomes_error_cue() {
        let source = FakeSource(Err(TranscriptionError::Unavailable("whisper-cli is not installed".into())));
        let (_dir, result) = run(&FakeTranscoder::new(2), source);
        let out = result.unwrap();
        assert_eq!(out.transcription_error.as_deref(), Some("whisper-cli is not installed"));
        assert_eq!(out.preview[0].text, "Error generating captions: whisper-cli is not installed");
    }

    #[test]
    fn rejected_audio_is_treated_as_no_speech() {
        let source = FakeSource(Err(TranscriptionError::Failed("could not understand audio".into())));
        let (_dir, result) = run(&FakeTranscoder::new(2), source);
        let out = result.unwrap();
        assert!(out.transcription_error.is_none());
        assert_eq!(out.preview[0].text, "No speech detected in video");
    }

    #[test]
    fn transcode_failure_writes_nothing() {
        let mut transcoder = FakeTranscoder::new(2);
        transcoder.broken = true;
        let (dir, result) = run(&transcoder, FakeSource(Ok(Vec::new())));
        let err = result.unwrap_err();
        assert!(matches!(err, CaptionError::Transcode(_)));
        assert_eq!(err.kind(), "transcode_error");
        assert!(!dir.path().join(SRT_FILE).exists());
        assert!(!dir.path().join(VTT_FILE).exists());
    }

    #[test]
    fn new_transcription_overwrites_old_document() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"v").unwrap();
        std::fs::write(dir.path().join(SRT_FILE), "stale contents that are long\n").unwrap();
        let transcoder = FakeTranscoder::new(1);
        generate_captions(&transcoder, &FakeSource(Ok(Vec::new())), dir.path(), &video, &CaptionSettings::default())
            .unwrap();
        let srt = std::fs::read_to_string(dir.path().join(SRT_FILE)).unwrap();
        assert!(!srt.contains("stale"));
    }

    #[test]
    fn burn_validates_style_first() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FakeTranscoder::new(1);
        let bad = SubtitleStyle { font_size: 20, font_color: "plaid".into() };
        let err = burn_captions(&transcoder, dir.path(), Path::new("v.mp4"), Path::new("s.srt"), &bad)
            .unwrap_err();
        assert!(matches!(err, CaptionError::InvalidRequest(_)));
        assert!(transcoder.burned_style.lock().unwrap().is_none());

        let out = burn_captions(
            &transcoder,
            dir.path(),
            Path::new("v.mp4"),
            Path::new("s.srt"),
            &SubtitleStyle::default(),
        )
        .unwrap();
        assert_eq!(out, dir.path().join(CAPTIONED_VIDEO_FILE));
    }
}
