//! ggml whisper models: the known catalogue, local lookup, and first-run fetch.

use std::io::Write;
use std::path::{Path, PathBuf};

/// Model source: (model_id, hf_filename). All come from ggerganov/whisper.cpp.
pub const MODEL_SOURCES: &[(&str, &str)] = &[
    ("tiny.en", "ggml-tiny.en.bin"),
    ("tiny", "ggml-tiny.bin"),
    ("base.en", "ggml-base.en.bin"),
    ("base", "ggml-base.bin"),
    ("small.en", "ggml-small.en.bin"),
    ("small", "ggml-small.bin"),
    ("medium.en", "ggml-medium.en.bin"),
    ("medium", "ggml-medium.bin"),
    ("large-v3", "ggml-large-v3.bin"),
    ("large-v3-turbo", "ggml-large-v3-turbo.bin"),
];

const HF_REPO: &str = "ggerganov/whisper.cpp";

fn model_file_name(model_name: &str) -> Result<&'static str, String> {
    MODEL_SOURCES
        .iter()
        .find(|(id, _)| *id == model_name)
        .map(|(_, file)| *file)
        .ok_or_else(|| {
            let known: Vec<&str> = MODEL_SOURCES.iter().map(|(id, _)| *id).collect();
            format!("Unknown model: {} (known: {})", model_name, known.join(", "))
        })
}

/// Where a model lives (or would live) inside `models_dir`.
///
/// Names that are not in [`MODEL_SOURCES`] are taken as a file path.
pub fn model_path(models_dir: &Path, model_name: &str) -> PathBuf {
    match model_file_name(model_name) {
        Ok(file) => models_dir.join(file),
        Err(_) => PathBuf::from(model_name),
    }
}

/// [`model_path`], but only when the file is actually there.
pub fn resolve_model_path(models_dir: &Path, model_name: &str) -> Option<PathBuf> {
    let path = model_path(models_dir, model_name);
    path.exists().then_some(path)
}

/// Fetch `model_name` into `models_dir`, reporting `(received, content_length)` as bytes arrive.
/// Returns immediately when the file is already present.
pub async fn download_model_with_progress<F>(
    models_dir: &Path,
    model_name: &str,
    mut on_progress: F,
) -> Result<PathBuf, String>
where
    F: FnMut(u64, Option<u64>) + Send,
{
    use futures_util::StreamExt;

    let file_name = model_file_name(model_name)?;
    let target = models_dir.join(file_name);
    if target.exists() {
        return Ok(target);
    }

    let url = format!("https://huggingface.co/{}/resolve/main/{}", HF_REPO, file_name);
    let response = reqwest::get(&url)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| format!("fetching {}: {}", url, e))?;

    std::fs::create_dir_all(models_dir).map_err(|e| e.to_string())?;
    // renamed into place only once complete
    let partial = target.with_extension("bin.part");
    let expected = response.content_length();
    let mut body = response.bytes_stream();
    let mut out = std::fs::File::create(&partial).map_err(|e| e.to_string())?;
    let mut received = 0u64;

    while let Some(piece) = body.next().await {
        let piece = piece.map_err(|e| format!("reading {}: {}", url, e))?;
        out.write_all(&piece).map_err(|e| e.to_string())?;
        received += piece.len() as u64;
        on_progress(received, expected);
    }
    out.flush().map_err(|e| e.to_string())?;
    std::fs::rename(&partial, &target).map_err(|e| e.to_string())?;

    Ok(target)
}
