//! OpenAI-compatible transcription API backend (Voxtral, open-asr-server, etc.)

use super::backend::{TranscriptSource, TranscriptionError, Utterance};
use super::wav_extract::wav_duration_secs;
use log::debug;
use std::path::Path;
use std::time::Duration;

/// Configuration for remote transcription API.
#[derive(Debug, Clone)]
pub struct RemoteTranscriptionConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl RemoteTranscriptionConfig {
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.trim().to_string(),
            model,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

pub struct RemoteApiBackend {
    config: RemoteTranscriptionConfig,
    client: reqwest::blocking::Client,
}

impl RemoteApiBackend {
    pub fn new(config: RemoteTranscriptionConfig) -> Result<Self, TranscriptionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| TranscriptionError::Unavailable(e.to_string()))?;
        Ok(Self { config, client })
    }
}

/// Read utterances out of a `verbose_json` transcription response.
///
/// Servers that only return `text` get a single utterance spanning `audio_secs`.
pub fn parse_verbose_json(json: &serde_json::Value, audio_secs: f64) -> Vec<Utterance> {
    if let Some(segments) = json.get("segments").and_then(|v| v.as_array()) {
        return segments
            .iter()
            .filter_map(|seg| {
                let start = seg.get("start")?.as_f64()?;
                let end = seg.get("end")?.as_f64()?;
                let text = seg.get("text")?.as_str()?.trim();
                if text.is_empty() {
                    return None;
                }
                Some(Utterance {
                    start,
                    end,
                    text: text.to_string(),
                })
            })
            .collect();
    }

    let text = json.get("text").and_then(|v| v.as_str()).unwrap_or("").trim();
    if text.is_empty() {
        return Vec::new();
    }
    vec![Utterance {
        start: 0.0,
        end: audio_secs,
        text: text.to_string(),
    }]
}

impl TranscriptSource for RemoteApiBackend {
    fn id(&self) -> &'static str {
        "remote-api"
    }

    fn name(&self) -> &'static str {
        "OpenAI-compatible API"
    }

    fn is_available(&self) -> bool {
        !self.config.base_url.is_empty() && !self.config.model.is_empty()
    }

    /// POSTs to base_url (full endpoint, e.g. http://localhost:8000/v1/audio/transcriptions).
    fn transcribe(&self, audio_path: &Path) -> Result<Vec<Utterance>, TranscriptionError> {
        if !self.is_available() {
            return Err(TranscriptionError::Unavailable(
                "Remote transcription URL or model not configured".into(),
            ));
        }

        let bytes = std::fs::read(audio_path).map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        let audio_secs = wav_duration_secs(audio_path).unwrap_or(0.0);
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav");

        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");

        let mut req = self.client.post(&self.config.base_url).multipart(form);
        if let Some(ref key) = self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .map_err(|e| TranscriptionError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let msg = format!("API error {}: {}", status, body);
            return Err(if status.is_server_error() {
                TranscriptionError::Unavailable(msg)
            } else {
                TranscriptionError::Failed(msg)
            });
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| TranscriptionError::Failed(e.to_string()))?;
        let utterances = parse_verbose_json(&json, audio_secs);
        debug!("[transcribe] remote: {} utterances", utterances.len());
        Ok(utterances)
    }
}
