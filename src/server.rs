//! HTTP surface: upload, caption generation, burn-in, download.

use crate::captions::{self, CaptionSettings};
use crate::error::{CaptionError, CaptionResult};
use crate::media::{SubtitleStyle, Transcoder};
use crate::session::SessionStore;
use crate::transcription::TranscriptSource;
use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, Query, Request, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use http::{header, HeaderMap, HeaderValue};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tower::ServiceExt;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::services::ServeFile;

/// Shared, read-only service state. The transcript source is built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    pub transcoder: Arc<dyn Transcoder>,
    pub source: Arc<dyn TranscriptSource>,
    pub settings: CaptionSettings,
}

pub fn router(state: AppState, allowed_origins: &[String], max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_video))
        .route("/generate-captions", post(generate_captions))
        .route("/generate-captioned-video", post(generate_captioned_video))
        .route("/download", get(download))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors_layer(allowed_origins))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.iter().any(|o| o.trim() == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o.trim()).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required_header(headers: &HeaderMap, name: &str) -> CaptionResult<String> {
    header_value(headers, name)
        .ok_or_else(|| CaptionError::InvalidRequest(format!("Missing header {}", name)))
}

/// Run blocking pipeline work off the async workers.
async fn blocking<T, F>(f: F) -> CaptionResult<T>
where
    F: FnOnce() -> CaptionResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| CaptionError::Io(std::io::Error::other(e)))?
}

/// Extension of the uploaded name (with the dot), or `.mp4` when absent or odd.
fn upload_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_else(|| ".mp4".to_string())
}

/// Stream one multipart field into `path`, returning the byte count.
async fn save_field(field: &mut Field<'_>, path: &Path) -> CaptionResult<usize> {
    let mut out = tokio::fs::File::create(path).await?;
    let mut written = 0usize;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| CaptionError::InvalidRequest(e.body_text()))?
    {
        out.write_all(&chunk).await?;
        written += chunk.len();
    }
    out.flush().await?;
    Ok(written)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Backend is running" }))
}

async fn upload_video(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> CaptionResult<Json<serde_json::Value>> {
    let session_id = required_header(&headers, "x-session-id")?;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| CaptionError::InvalidRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let is_video = field
            .content_type()
            .map_or(false, |ct| ct.starts_with("video/"));
        if !is_video {
            return Err(CaptionError::InvalidRequest("Only video files are allowed.".into()));
        }

        let dir = state.store.session_dir(&session_id)?;
        let video_id = uuid::Uuid::new_v4().to_string();
        let filename = format!("{}{}", video_id, upload_extension(field.file_name()));
        let path = dir.join(&filename);

        let written = match save_field(&mut field, &path).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(rm) = tokio::fs::remove_file(&path).await {
                    warn!("[upload] could not remove partial {}: {}", path.display(), rm);
                }
                return Err(e);
            }
        };
        info!("[upload] session={} stored {} ({} bytes)", session_id, filename, written);

        return Ok(Json(json!({
            "status": "ok",
            "message": "Video uploaded successfully.",
            "video_id": video_id,
            "filename": filename,
        })));
    }

    Err(CaptionError::InvalidRequest("Missing multipart field \"file\".".into()))
}

async fn generate_captions(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> CaptionResult<Json<serde_json::Value>> {
    let session_id = required_header(&headers, "x-session-id")?;
    let video_filename = required_header(&headers, "x-video-filename")?;
    let video_path = state.store.existing_file(&session_id, &video_filename, "Video")?;
    let session_dir = state.store.session_dir(&session_id)?;
    debug!("[captions] session={} video={}", session_id, video_filename);

    let AppState { transcoder, source, settings, .. } = state;
    let generated = blocking(move || {
        captions::generate_captions(&*transcoder, &*source, &session_dir, &video_path, &settings)
    })
    .await?;

    Ok(Json(json!({
        "status": "ok",
        "message": "Subtitles generated successfully.",
        "subtitle_file": generated.subtitle_file,
        "cue_count": generated.cue_count,
        "transcription_error": generated.transcription_error,
        "preview": generated.preview,
    })))
}

async fn generate_captioned_video(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> CaptionResult<Json<serde_json::Value>> {
    let session_id = required_header(&headers, "x-session-id")?;
    let video_filename = required_header(&headers, "x-video-filename")?;
    let subtitle_filename = required_header(&headers, "x-subtitle-filename")?;

    let mut style = SubtitleStyle::default();
    if let Some(size) = header_value(&headers, "x-font-size") {
        style.font_size = size
            .parse()
            .ok()
            .filter(|s| (1..=500).contains(s))
            .ok_or_else(|| CaptionError::InvalidRequest(format!("Invalid font size: {}", size)))?;
    }
    if let Some(color) = header_value(&headers, "x-font-color") {
        style.font_color = color;
    }

    let video_path = state.store.existing_file(&session_id, &video_filename, "Video")?;
    let subtitle_path = state
        .store
        .existing_file(&session_id, &subtitle_filename, "Subtitle file")?;
    let session_dir = state.store.session_dir(&session_id)?;

    let transcoder = state.transcoder;
    let output = blocking(move || {
        captions::burn_captions(&*transcoder, &session_dir, &video_path, &subtitle_path, &style)
    })
    .await?;
    let output_file = output
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Json(json!({
        "status": "ok",
        "message": "Captioned video generated successfully.",
        "output_file": output_file,
    })))
}

#[derive(Debug, Deserialize)]
struct DownloadParams {
    session_id: String,
    filename: String,
}

async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
    req: Request,
) -> CaptionResult<Response> {
    let path = state
        .store
        .existing_file(&params.session_id, &params.filename, "File")?;

    let response = match ServeFile::new(&path).oneshot(req).await {
        Ok(res) => res,
        Err(never) => match never {},
    };
    let mut response = response.map(axum::body::Body::new);

    let disposition = format!("attachment; filename=\"{}\"", params.filename.replace('"', "_"));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_falls_back_to_mp4() {
        assert_eq!(upload_extension(Some("holiday.MOV")), ".mov");
        assert_eq!(upload_extension(Some("clip.webm")), ".webm");
        assert_eq!(upload_extension(Some("noext")), ".mp4");
        assert_eq!(upload_extension(Some("weird.m p4")), ".mp4");
        assert_eq!(upload_extension(None), ".mp4");
    }

    #[test]
    fn headers_are_trimmed_and_required() {
        let mut headers = HeaderMap::new();
        headers.insert("x-session-id", HeaderValue::from_static("  abc  "));
        headers.insert("x-video-filename", HeaderValue::from_static(""));
        assert_eq!(required_header(&headers, "x-session-id").unwrap(), "abc");
        assert!(required_header(&headers, "x-video-filename").is_err());
        assert!(required_header(&headers, "x-missing").is_err());
    }
}
