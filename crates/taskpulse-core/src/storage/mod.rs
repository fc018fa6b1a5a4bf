mod config;
pub mod database;
mod memory;
pub mod migrations;
mod sink;

pub use config::{Config, NotificationsConfig, TimerConfig, UserConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use sink::{BackgroundPersister, DiscardSink, InlinePersister, SessionSink};

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::DatabaseError;
use crate::timer::Session;

/// Durable home of finalized focus sessions.
pub trait SessionStore: Send {
    /// Write a finalized session. Writing the same id twice replaces it.
    fn persist(&self, session: &Session) -> Result<(), DatabaseError>;

    /// Every session owned by `user_id`, most recent first.
    fn load_history(&self, user_id: &str) -> Result<Vec<Session>, DatabaseError>;
}

impl<S: SessionStore + Sync + ?Sized> SessionStore for Arc<S> {
    fn persist(&self, session: &Session) -> Result<(), DatabaseError> {
        (**self).persist(session)
    }

    fn load_history(&self, user_id: &str) -> Result<Vec<Session>, DatabaseError> {
        (**self).load_history(user_id)
    }
}

/// Returns the TaskPulse data directory.
///
/// `TASKPULSE_DATA_DIR` wins when set. Otherwise `~/.config/taskpulse[-dev]/`,
/// with `TASKPULSE_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("TASKPULSE_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TASKPULSE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("taskpulse-dev")
            } else {
                base_dir.join("taskpulse")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
