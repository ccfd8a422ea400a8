//! Service settings: `settings.json` in the data directory, then env overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptionMode {
    #[default]
    WhisperCli,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub mode: TranscriptionMode,
    /// whisper.cpp binary; looked up on PATH when not absolute.
    pub whisper_binary: Option<String>,
    /// Known model name (e.g. "base") or a path to a ggml model file.
    pub model: String,
    pub language: Option<String>,
    /// Fetch the model from Hugging Face at startup when it is missing.
    pub auto_download: bool,
    pub remote_base_url: Option<String>,
    pub remote_model: Option<String>,
    pub remote_api_key: Option<String>,
    /// Transcribe in back-to-back windows of this many seconds instead of one pass.
    pub chunk_secs: Option<f64>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            mode: TranscriptionMode::WhisperCli,
            whisper_binary: None,
            model: "base".to_string(),
            language: None,
            auto_download: true,
            remote_base_url: None,
            remote_model: None,
            remote_api_key: None,
            chunk_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub allowed_origins: Vec<String>,
    pub log_level: String,
    pub session_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub words_per_cue: usize,
    pub min_cue_duration_ms: u64,
    pub preview_limit: usize,
    pub max_upload_bytes: usize,
    pub ffmpeg_binary: Option<String>,
    pub transcription: TranscriptionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            log_level: "debug".to_string(),
            session_ttl_secs: 30 * 60,
            sweep_interval_secs: 30 * 60,
            words_per_cue: 10,
            min_cue_duration_ms: 100,
            preview_limit: 50,
            max_upload_bytes: 1024 * 1024 * 1024,
            ffmpeg_binary: None,
            transcription: TranscriptionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path` when it exists, otherwise defaults; env vars win either way.
    pub fn load(path: &Path) -> Result<Self, String> {
        let mut config = if path.exists() {
            let json = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
            serde_json::from_str(&json).map_err(|e| format!("{}: {}", path.display(), e))?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `AUTOCAPTION_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(bind) = get("AUTOCAPTION_BIND") {
            self.bind = bind;
        }
        if let Some(level) = get("AUTOCAPTION_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(model) = get("AUTOCAPTION_MODEL") {
            self.transcription.model = model;
        }
        if let Some(url) = get("AUTOCAPTION_REMOTE_URL") {
            self.transcription.remote_base_url = Some(url);
            self.transcription.mode = TranscriptionMode::Remote;
        }
        if let Some(model) = get("AUTOCAPTION_REMOTE_MODEL") {
            self.transcription.remote_model = Some(model);
        }
        if let Some(key) = get("AUTOCAPTION_REMOTE_API_KEY") {
            self.transcription.remote_api_key = Some(key);
        }
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Debug)
    }
}
