//! Whisper.cpp CLI sidecar backend.

use super::backend::{TranscriptSource, TranscriptionError, Utterance};
use crate::subtitle::parse_timestamp;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

pub struct WhisperCliBackend {
    pub model_path: PathBuf,
    pub binary_path: String,
    pub language_code: Option<String>,
}

impl WhisperCliBackend {
    pub fn new(model_path: PathBuf, binary_path: Option<String>, language_code: Option<String>) -> Self {
        Self {
            model_path,
            binary_path: binary_path.unwrap_or_else(|| "whisper-cli".to_string()),
            language_code,
        }
    }

    /// Run the binary and return its raw stdout.
    pub fn transcribe_file(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        if !self.model_path.exists() {
            return Err(TranscriptionError::Unavailable(format!(
                "Model not found: {}",
                self.model_path.display()
            )));
        }

        let mut command = Command::new(&self.binary_path);
        command.arg("-m").arg(&self.model_path).arg("-f").arg(audio_path);
        if let Some(ref code) = self.language_code {
            command.arg("-l").arg(code);
        }
        let output = command.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TranscriptionError::Unavailable(format!("{} is not installed", self.binary_path))
            } else {
                TranscriptionError::Unavailable(format!("Failed to run whisper: {}", e))
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                "[transcribe] whisper exit={:?} stderr={:?}",
                output.status.code(),
                stderr.chars().take(500).collect::<String>()
            );
            return Err(TranscriptionError::Failed(format!("Whisper failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Parse `[HH:MM:SS.mmm --> HH:MM:SS.mmm]  text` lines. Anything else is ignored.
pub fn parse_whisper_output(stdout: &str) -> Vec<Utterance> {
    stdout
        .lines()
        .filter_map(|line| {
            let t = line.trim();
            let rest = t.strip_prefix('[')?;
            let (range, text) = rest.split_once(']')?;
            let (start, end) = range.split_once("-->")?;
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            Some(Utterance {
                start: parse_timestamp(start)?,
                end: parse_timestamp(end)?,
                text: text.to_string(),
            })
        })
        .collect()
}

impl TranscriptSource for WhisperCliBackend {
    fn id(&self) -> &'static str {
        "whisper-cli"
    }

    fn name(&self) -> &'static str {
        "Whisper (CLI)"
    }

    fn is_available(&self) -> bool {
        self.model_path.exists()
    }

    fn transcribe(&self, audio_path: &Path) -> Result<Vec<Utterance>, TranscriptionError> {
        let stdout = self.transcribe_file(audio_path)?;
        let utterances = parse_whisper_output(&stdout);
        debug!(
            "[transcribe] whisper: stdout_len={}, utterances={}",
            stdout.len(),
            utterances.len()
        );
        Ok(utterances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamped_lines() {
        let stdout = "\n[00:00:00.000 --> 00:00:04.200]   Hello there, everyone.\n\
                      [00:00:04.200 --> 00:00:09.880]   Welcome back.\n\
                      [00:00:09.880 --> 00:00:10.000]  \n";
        let utterances = parse_whisper_output(stdout);
        assert_eq!(
            utterances,
            vec![
                Utterance { start: 0.0, end: 4.2, text: "Hello there, everyone.".into() },
                Utterance { start: 4.2, end: 9.88, text: "Welcome back.".into() },
            ]
        );
    }

    #[test]
    fn ignores_log_noise() {
        let stdout = "whisper_init_from_file: loading model\n[broken] nope\nplain text line\n";
        assert!(parse_whisper_output(stdout).is_empty());
    }

    #[test]
    fn missing_model_is_unavailable() {
        let backend = WhisperCliBackend::new(PathBuf::from("/definitely/not/here.bin"), None, None);
        assert!(!backend.is_available());
        let err = backend.transcribe(Path::new("audio.wav")).unwrap_err();
        assert!(matches!(err, TranscriptionError::Unavailable(_)));
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("ggml-base.bin");
        std::fs::write(&model, b"not really a model").unwrap();
        let backend = WhisperCliBackend::new(
            model,
            Some("autocaption-no-such-whisper-binary".into()),
            None,
        );
        let err = backend.transcribe(Path::new("audio.wav")).unwrap_err();
        assert!(matches!(err, TranscriptionError::Unavailable(_)));
    }
}
