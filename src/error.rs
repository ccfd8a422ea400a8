use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use thiserror::Error;

use crate::media::TranscodeError;

pub type CaptionResult<T> = Result<T, CaptionError>;

/// Request-level failures. Transcription problems never show up here: they are
/// turned into placeholder captions before a request can fail on them.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("{0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl CaptionError {
    /// Stable machine-readable classification for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transcode(_) => "transcode_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Io(e) if e.kind() == std::io::ErrorKind::NotFound => "not_found",
            Self::Io(_) => "io_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            "not_found" => StatusCode::NOT_FOUND,
            "invalid_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CaptionError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("[http] {}: {}", self.kind(), self);
        } else {
            log::debug!("[http] {}: {}", self.kind(), self);
        }
        let body = serde_json::json!({
            "status": "error",
            "kind": self.kind(),
            "detail": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
