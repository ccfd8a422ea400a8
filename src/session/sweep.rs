//! Background expiry of stale session directories.
//!
//! The sweep looks only at directory modification times and takes no locks.
//! A request whose session disappears mid-flight sees an ordinary not-found.

use super::SessionStore;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Run [`SessionStore::purge_expired`] every `interval` until the runtime shuts down.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    ttl: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let store = store.clone();
            match tokio::task::spawn_blocking(move || store.purge_expired(ttl)).await {
                Ok(Ok(0)) => debug!("[sweep] nothing expired"),
                Ok(Ok(n)) => info!("[sweep] removed {} expired session(s)", n),
                Ok(Err(e)) => warn!("[sweep] failed: {}", e),
                Err(e) => warn!("[sweep] task panicked: {}", e),
            }
        }
    })
}
