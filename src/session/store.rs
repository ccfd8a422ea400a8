//! Session directories: one isolated folder per caller-supplied session id.

use crate::error::{CaptionError, CaptionResult};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_SESSION_ID_LEN: usize = 128;

pub struct SessionStore {
    root: PathBuf,
}

/// Make a session id safe to use as a single directory name.
pub fn sanitize_session_id(session_id: &str) -> CaptionResult<String> {
    let safe: String = session_id
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .take(MAX_SESSION_ID_LEN)
        .collect();
    if safe.is_empty() || safe.chars().all(|c| c == '.') {
        return Err(CaptionError::InvalidRequest(format!(
            "Unusable session id: {:?}",
            session_id
        )));
    }
    Ok(safe)
}

/// Reject anything that is not a bare file name.
fn check_file_name(filename: &str) -> CaptionResult<&str> {
    let name = filename.trim();
    let bare = Path::new(name)
        .file_name()
        .map_or(false, |f| f == std::ffi::OsStr::new(name));
    if name.is_empty() || !bare || name.contains(['/', '\\']) {
        return Err(CaptionError::InvalidRequest(format!(
            "Invalid file name: {:?}",
            filename
        )));
    }
    Ok(name)
}

impl SessionStore {
    pub fn new(root: impl Into<PathBuf>) -> CaptionResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for `session_id`, created on first use.
    pub fn session_dir(&self, session_id: &str) -> CaptionResult<PathBuf> {
        let dir = self.root.join(sanitize_session_id(session_id)?);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path for `filename` inside the session, whether or not it exists yet.
    pub fn file_path(&self, session_id: &str, filename: &str) -> CaptionResult<PathBuf> {
        let name = check_file_name(filename)?;
        Ok(self.session_dir(session_id)?.join(name))
    }

    /// Path of an existing file inside the session; `what` names it in the not-found message.
    pub fn existing_file(&self, session_id: &str, filename: &str, what: &str) -> CaptionResult<PathBuf> {
        let path = self.file_path(session_id, filename)?;
        if !path.is_file() {
            return Err(CaptionError::NotFound(format!("{} not found for this session.", what)));
        }
        Ok(path)
    }

    /// Delete session directories last modified more than `ttl` ago.
    pub fn purge_expired(&self, ttl: Duration) -> CaptionResult<u32> {
        self.purge_expired_at(Utc::now(), ttl)
    }

    /// [`purge_expired`](Self::purge_expired) against an explicit clock.
    ///
    /// Directories can vanish under us (a concurrent purge, or a request
    /// cleaning up); those are skipped rather than reported.
    pub fn purge_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> CaptionResult<u32> {
        if !self.root.exists() {
            return Ok(0);
        }
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero());
        let cutoff = now - ttl;
        let mut purged = 0u32;

        for entry in std::fs::read_dir(&self.root)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("[sweep] unreadable entry in {}: {}", self.root.display(), e);
                    continue;
                }
            };
            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| {
                if m.is_dir() {
                    m.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(t)) => DateTime::<Utc>::from(t),
                Ok(None) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!("[sweep] cannot stat {}: {}", path.display(), e);
                    continue;
                }
            };
            if modified >= cutoff {
                continue;
            }
            match std::fs::remove_dir_all(&path) {
                Ok(()) => {
                    debug!("[sweep] removed {}", path.display());
                    purged += 1;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("[sweep] failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(purged)
    }
}
