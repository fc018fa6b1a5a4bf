use std::sync::Mutex;

use super::SessionStore;
use crate::error::DatabaseError;
use crate::timer::Session;

/// Session store backed by a vector. Useful for tests and embedding hosts
/// that bring their own durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<Vec<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sessions(sessions: Vec<Session>) -> Self {
        Self {
            sessions: Mutex::new(sessions),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn sessions(&self) -> Vec<Session> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn persist(&self, session: &Session) -> Result<(), DatabaseError> {
        let mut sessions = self.lock();
        match sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        Ok(())
    }

    fn load_history(&self, user_id: &str) -> Result<Vec<Session>, DatabaseError> {
        let mut out: Vec<Session> = self
            .lock()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(out)
    }
}
