//! Path utilities for the app data, sessions, models, and log directories.

use std::path::{Path, PathBuf};

/// Get the app data directory (`AUTOCAPTION_DATA_DIR`, else e.g. ~/.local/share/autocaption).
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("AUTOCAPTION_DATA_DIR").filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join("autocaption"))
        .unwrap_or_else(|| PathBuf::from(".").join("autocaption-data"))
}

/// Get the sessions directory, creating it if necessary.
pub fn sessions_dir(data_dir: &Path) -> Result<PathBuf, String> {
    let dir = data_dir.join("temp");
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir)
}

/// Get the models directory, creating it if necessary.
pub fn models_dir(data_dir: &Path) -> Result<PathBuf, String> {
    let dir = data_dir.join("models");
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir)
}

/// Get the path to the settings file.
pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// Get the log file path (e.g. ~/.local/share/autocaption/logs/autocaption.log).
pub fn log_file_path(data_dir: &Path) -> Result<PathBuf, String> {
    let dir = data_dir.join("logs");
    std::fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir.join("autocaption.log"))
}
