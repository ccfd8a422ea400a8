//! Per-session storage and its expiry sweep.

mod store;
mod sweep;

pub use store::{sanitize_session_id, SessionStore};
pub use sweep::spawn_sweeper;
