//! Hand-off points between the timer engine and a session store.
//!
//! The engine calls [`SessionSink::submit`] from its tick path and never
//! looks at the outcome. Each sink decides how (and whether) the write
//! happens; failures end up in the log, not in the caller.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::SessionStore;
use crate::timer::Session;

pub trait SessionSink: Send {
    /// Accept a finalized session. Must not block on I/O for long and must
    /// not fail from the caller's point of view.
    fn submit(&self, session: Session);
}

/// Drops every session. The engine default when no store is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl SessionSink for DiscardSink {
    fn submit(&self, session: Session) {
        debug!(session_id = %session.id, "no session store configured; session not persisted");
    }
}

/// Writes synchronously on the caller's thread.
///
/// Suited to short-lived hosts such as a one-shot CLI command, where the
/// process would exit before a background write could finish.
#[derive(Debug)]
pub struct InlinePersister<S> {
    store: S,
}

impl<S: SessionStore> InlinePersister<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: SessionStore> SessionSink for InlinePersister<S> {
    fn submit(&self, session: Session) {
        match self.store.persist(&session) {
            Ok(()) => debug!(session_id = %session.id, "session persisted"),
            Err(e) => warn!(session_id = %session.id, error = %e, "failed to persist focus session"),
        }
    }
}

/// Forwards sessions to a blocking worker that owns the store.
///
/// Submitting only enqueues on an unbounded channel, so the tick path never
/// waits on storage. Dropping the persister closes the channel; the worker
/// drains what is left and its join handle resolves to the number of
/// sessions written.
#[derive(Debug, Clone)]
pub struct BackgroundPersister {
    tx: mpsc::UnboundedSender<Session>,
}

impl BackgroundPersister {
    /// Start the worker on tokio's blocking pool.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn<S>(store: S) -> (Self, JoinHandle<usize>)
    where
        S: SessionStore + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Session>();
        let handle = tokio::task::spawn_blocking(move || {
            let mut written = 0usize;
            while let Some(session) = rx.blocking_recv() {
                match store.persist(&session) {
                    Ok(()) => {
                        written += 1;
                        debug!(session_id = %session.id, "session persisted");
                    }
                    Err(e) => {
                        warn!(session_id = %session.id, error = %e, "failed to persist focus session");
                    }
                }
            }
            written
        });
        (Self { tx }, handle)
    }
}

impl SessionSink for BackgroundPersister {
    fn submit(&self, session: Session) {
        if let Err(mpsc::error::SendError(session)) = self.tx.send(session) {
            warn!(session_id = %session.id, "persistence worker stopped; session dropped");
        }
    }
}

impl<T: SessionSink + Sync + ?Sized> SessionSink for std::sync::Arc<T> {
    fn submit(&self, session: Session) {
        (**self).submit(session)
    }
}
