pub mod captions;
pub mod config;
pub mod error;
pub mod media;
pub mod paths;
pub mod server;
pub mod session;
pub mod subtitle;
pub mod transcription;

use captions::CaptionSettings;
use config::{AppConfig, TranscriptionMode};
use log::{debug, error, info, warn};
use media::FfmpegTranscoder;
use server::AppState;
use session::{spawn_sweeper, SessionStore};
use std::path::Path;
use std::sync::Arc;
use transcription::{
    download_model_with_progress, model_path, resolve_model_path, FixedWindowSource,
    RemoteApiBackend, RemoteTranscriptionConfig, TranscriptSource, WhisperCliBackend,
};

fn init_logger(data_dir: &Path, level: log::LevelFilter) -> Result<std::path::PathBuf, fern::InitError> {
    let log_file = paths::log_file_path(data_dir)
        .unwrap_or_else(|_| std::path::PathBuf::from(".").join("autocaption.log"));

    let format = |out: fern::FormatCallback<'_>, message: &std::fmt::Arguments<'_>, record: &log::Record| {
        out.finish(format_args!(
            "[{}][{}][{}][{:?}] {}",
            chrono::Local::now().format("%Y-%m-%d"),
            chrono::Local::now().format("%H:%M:%S"),
            record.target(),
            record.level(),
            message
        ))
    };

    fern::Dispatch::new()
        .format(format)
        .level(level)
        .level_for("hyper", log::LevelFilter::Info)
        .level_for("reqwest", log::LevelFilter::Info)
        .chain(std::io::stdout())
        .chain(fern::log_file(&log_file)?)
        .apply()?;

    Ok(log_file)
}

/// Make sure the whisper model exists, downloading it when allowed.
/// Failure only means the source will report itself unavailable later.
fn ensure_model(rt: &tokio::runtime::Runtime, config: &AppConfig, models_dir: &Path) -> std::path::PathBuf {
    let settings = &config.transcription;
    if let Some(found) = resolve_model_path(models_dir, &settings.model) {
        debug!("[model] using {}", found.display());
        return found;
    }
    let path = model_path(models_dir, &settings.model);
    if !settings.auto_download {
        return path;
    }

    info!("[model] {} missing, downloading into {}", settings.model, models_dir.display());
    let mut last_pct = 0u64;
    let result = rt.block_on(download_model_with_progress(models_dir, &settings.model, |done, total| {
        if let Some(total) = total.filter(|t| *t > 0) {
            let pct = done * 100 / total;
            if pct >= last_pct + 10 {
                last_pct = pct;
                info!("[model] {}%", pct);
            }
        }
    }));
    match result {
        Ok(p) => {
            info!("[model] ready at {}", p.display());
            p
        }
        Err(e) => {
            warn!("[model] download failed: {}", e);
            path
        }
    }
}

/// Build the process-wide transcript source from config.
fn build_source(
    rt: &tokio::runtime::Runtime,
    config: &AppConfig,
    models_dir: &Path,
) -> Result<Arc<dyn TranscriptSource>, String> {
    let settings = &config.transcription;
    let base: Arc<dyn TranscriptSource> = match settings.mode {
        TranscriptionMode::WhisperCli => Arc::new(WhisperCliBackend::new(
            ensure_model(rt, config, models_dir),
            settings.whisper_binary.clone(),
            settings.language.clone(),
        )),
        TranscriptionMode::Remote => {
            let remote = RemoteTranscriptionConfig::new(
                settings.remote_base_url.clone().unwrap_or_default(),
                settings.remote_model.clone().unwrap_or_default(),
                settings.remote_api_key.clone(),
            );
            Arc::new(RemoteApiBackend::new(remote).map_err(|e| e.to_string())?)
        }
    };

    let source: Arc<dyn TranscriptSource> = match settings.chunk_secs {
        Some(secs) if secs > 0.0 => Arc::new(FixedWindowSource::new(base, secs)),
        _ => base,
    };
    if !source.is_available() {
        warn!(
            "[transcribe] {} is not available; captions will carry an error notice",
            source.name()
        );
    }
    Ok(source)
}

fn serve(config: AppConfig, data_dir: &Path) -> Result<(), String> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;

    let sessions_dir = paths::sessions_dir(data_dir)?;
    let models_dir = paths::models_dir(data_dir)?;
    let store = Arc::new(SessionStore::new(&sessions_dir).map_err(|e| e.to_string())?);
    // Built outside the runtime: the remote backend owns a blocking HTTP client.
    let source = build_source(&rt, &config, &models_dir)?;

    let state = AppState {
        store: store.clone(),
        transcoder: Arc::new(FfmpegTranscoder::new(config.ffmpeg_binary.clone())),
        source: source.clone(),
        settings: CaptionSettings {
            words_per_cue: config.words_per_cue.max(1),
            min_cue_duration: config.min_cue_duration_ms as f64 / 1000.0,
            preview_limit: config.preview_limit,
        },
    };
    let app = server::router(state, &config.allowed_origins, config.max_upload_bytes);

    let result: Result<(), String> = rt.block_on(async {
        let listener = tokio::net::TcpListener::bind(&config.bind)
            .await
            .map_err(|e| format!("bind {}: {}", config.bind, e))?;
        info!(
            "[autocaption] listening on {} (sessions in {}, source {})",
            config.bind,
            sessions_dir.display(),
            source.id()
        );
        let sweeper = spawn_sweeper(store, config.session_ttl(), config.sweep_interval());

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("[autocaption] shutting down");
            })
            .await
            .map_err(|e| e.to_string());
        sweeper.abort();
        served
    });

    drop(rt);
    drop(source);
    result
}

pub fn run() {
    let data_dir = paths::app_data_dir();
    let settings_path = paths::settings_path(&data_dir);
    let (config, config_err) = match AppConfig::load(&settings_path) {
        Ok(c) => (c, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    let _log_path = init_logger(&data_dir, config.log_level_filter()).ok();
    if let Some(e) = config_err {
        warn!("[config] ignoring {}: {}", settings_path.display(), e);
    }

    if let Err(e) = serve(config, &data_dir) {
        error!("[autocaption] {}", e);
        std::process::exit(1);
    }
}
