//! Timer engine implementation.
//!
//! The timer engine is a one-second countdown state machine. It does not use
//! internal threads or timers - the caller is responsible for calling `tick()`
//! once per second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^________|__________|      (reset)
//! ```
//!
//! Orthogonally the engine is in `Focus` or `Break` mode. Only focus
//! intervals produce [`Session`] records; break intervals are never stored.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(TimerDurations::default())
//!     .with_sink(InlinePersister::new(Database::open()?));
//! engine.start();
//! // Once per second:
//! if let Some(event) = engine.tick() { /* interval boundary */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::collaborators::{
    Clock, IdGenerator, NotificationSink, SilentNotifier, SystemClock, UuidGenerator,
};
use super::session::Session;
use super::state::{Mode, Phase, TimerDurations, TimerState};
use crate::error::ValidationError;
use crate::events::{Event, TransitionReason};
use crate::stats::FocusStats;
use crate::storage::{DiscardSink, SessionSink, SessionStore};

/// Serializable engine state for hosts that do not live between ticks.
///
/// History is not included; it is reloaded from the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerCheckpoint {
    pub state: TimerState,
    #[serde(default)]
    pub pending: Option<Session>,
}

/// Read-only view of the engine, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub is_active: bool,
    pub is_paused: bool,
    pub remaining_seconds: u64,
    pub progress_percent: f64,
    pub focus_seconds: u64,
    pub break_seconds: u64,
    pub pending_session_id: Option<String>,
    pub stats: FocusStats,
    pub at: DateTime<Utc>,
}

/// Core timer engine.
///
/// Owns the countdown, the single pending-session slot and the in-memory
/// session history. Finalized sessions are handed to a [`SessionSink`] and
/// never awaited.
pub struct TimerEngine {
    state: TimerState,
    pending: Option<Session>,
    history: Vec<Session>,
    user_id: String,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    notifier: Box<dyn NotificationSink>,
    sink: Box<dyn SessionSink>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("history_len", &self.history.len())
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an idle engine in focus mode with a full countdown.
    ///
    /// Uses the system clock, UUID ids, no notifications and no storage until
    /// the `with_*` builders replace them.
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            state: TimerState::new(durations),
            pending: None,
            history: Vec::new(),
            user_id: "local".to_string(),
            clock: Box::new(SystemClock),
            ids: Box::new(UuidGenerator),
            notifier: Box::new(SilentNotifier),
            sink: Box::new(DiscardSink),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn with_notifier(mut self, notifier: impl NotificationSink + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_sink(mut self, sink: impl SessionSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_history(mut self, history: Vec<Session>) -> Self {
        self.history = history;
        self
    }

    /// Load the user's history from `store`, replacing what the engine holds.
    ///
    /// A failing store is logged and leaves the engine with empty history;
    /// the timer stays usable either way. Returns the number of sessions loaded.
    pub fn seed_history(&mut self, store: &dyn SessionStore) -> usize {
        match store.load_history(&self.user_id) {
            Ok(sessions) => {
                self.history = sessions;
                self.history.len()
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "failed to load focus session history");
                self.history.clear();
                0
            }
        }
    }

    /// Reinstate state saved by [`TimerEngine::checkpoint`].
    ///
    /// The engine's history and collaborators are kept.
    pub fn restore(&mut self, checkpoint: TimerCheckpoint) {
        self.state = checkpoint.state;
        self.state.clamp_remaining();
        if self.state.remaining_seconds == 0 {
            self.state.remaining_seconds = self.state.current_duration();
        }
        self.pending = match checkpoint.pending {
            Some(p) if self.state.mode == Mode::Focus && p.is_pending() => Some(p),
            Some(p) => {
                warn!(session_id = %p.id, "dropping pending session that does not match timer state");
                None
            }
            None => None,
        };
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn durations(&self) -> TimerDurations {
        self.state.durations
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 0.0 ..= 100.0 progress within the current interval.
    pub fn progress_percent(&self) -> f64 {
        self.state.progress_percent()
    }

    pub fn pending_session(&self) -> Option<&Session> {
        self.pending.as_ref()
    }

    /// Sessions loaded at start-up plus those finalized since.
    pub fn history(&self) -> &[Session] {
        &self.history
    }

    pub fn stats(&self) -> FocusStats {
        FocusStats::from_sessions(&self.history, self.clock.now())
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.state.mode,
            phase: self.state.phase(),
            is_active: self.state.is_active,
            is_paused: self.state.is_paused,
            remaining_seconds: self.state.remaining_seconds,
            progress_percent: self.state.progress_percent(),
            focus_seconds: self.state.durations.focus_seconds(),
            break_seconds: self.state.durations.break_seconds(),
            pending_session_id: self.pending.as_ref().map(|s| s.id.clone()),
            stats: self.stats(),
            at: self.now_utc(),
        }
    }

    pub fn checkpoint(&self) -> TimerCheckpoint {
        TimerCheckpoint {
            state: self.state,
            pending: self.pending.clone(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Activate the countdown. In focus mode this opens a pending session
    /// unless one is already open.
    ///
    /// Returns `None` when the timer was already running and nothing changed.
    pub fn start(&mut self) -> Option<Event> {
        let was_running = self.state.phase() == Phase::Running;

        let opened = if self.state.mode == Mode::Focus && self.pending.is_none() {
            let session = self.open_pending();
            let id = session.id.clone();
            self.pending = Some(session);
            Some(id)
        } else {
            None
        };

        self.state.is_active = true;
        self.state.is_paused = false;

        if was_running && opened.is_none() {
            return None;
        }
        debug!(mode = ?self.state.mode, session_id = ?opened, "timer started");
        Some(Event::TimerStarted {
            mode: self.state.mode,
            remaining_seconds: self.state.remaining_seconds,
            session_id: opened,
            at: self.now_utc(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state.phase() != Phase::Running {
            return None;
        }
        self.state.is_paused = true;
        Some(Event::TimerPaused {
            remaining_seconds: self.state.remaining_seconds,
            at: self.now_utc(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state.phase() != Phase::Paused {
            return None;
        }
        self.state.is_paused = false;
        Some(Event::TimerResumed {
            remaining_seconds: self.state.remaining_seconds,
            at: self.now_utc(),
        })
    }

    /// Back to idle focus with a full countdown. A pending session is
    /// discarded without being persisted.
    pub fn reset(&mut self) -> Option<Event> {
        let discarded = self.pending.take().map(|s| s.id);
        if let Some(id) = &discarded {
            debug!(session_id = %id, "pending focus session discarded");
        }
        self.state = TimerState::new(self.state.durations);
        Some(Event::TimerReset {
            discarded_session: discarded,
            at: self.now_utc(),
        })
    }

    /// End the current interval early and start a break.
    ///
    /// In focus mode the pending session is finalized with the time actually
    /// spent. Active/paused flags are left alone.
    pub fn skip_to_break(&mut self) -> Option<Event> {
        let from = self.state.mode;
        let session = if from == Mode::Focus {
            let elapsed = self.state.elapsed_seconds();
            self.finalize_pending(elapsed)
        } else {
            None
        };

        self.state.enter_mode(Mode::Break);
        if let Some(s) = &session {
            self.record(s.clone());
        }
        Some(Event::ModeChanged {
            from,
            to: Mode::Break,
            reason: TransitionReason::Skipped,
            session,
            at: self.now_utc(),
        })
    }

    /// Jump to a fresh focus countdown. Any pending session is left as is.
    pub fn skip_to_focus(&mut self) -> Option<Event> {
        let from = self.state.mode;
        self.state.enter_mode(Mode::Focus);
        Some(Event::ModeChanged {
            from,
            to: Mode::Focus,
            reason: TransitionReason::Skipped,
            session: None,
            at: self.now_utc(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// A no-op unless running. Returns `Some(Event::ModeChanged)` when the
    /// interval ran out; the notifier has been fired by then.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state.phase() != Phase::Running {
            return None;
        }
        if self.state.remaining_seconds > 1 {
            self.state.remaining_seconds -= 1;
            return None;
        }

        let from = self.state.mode;
        let to = from.opposite();
        let session = if from == Mode::Focus {
            let full = self.state.durations.focus_seconds();
            self.finalize_pending(full)
        } else {
            None
        };

        self.state.enter_mode(to);
        let event = Event::ModeChanged {
            from,
            to,
            reason: TransitionReason::Completed,
            session: session.clone(),
            at: self.now_utc(),
        };

        if let Err(e) = self.notifier.notify(&event) {
            warn!(error = %e, "interval notification failed");
        }
        if let Some(s) = session {
            self.record(s);
        }
        debug!(?from, ?to, "interval completed");
        Some(event)
    }

    /// Change both interval lengths at once.
    ///
    /// # Errors
    /// Rejects a zero duration; the previous durations stay in effect.
    pub fn set_durations(
        &mut self,
        focus_seconds: u64,
        break_seconds: u64,
    ) -> Result<Option<Event>, ValidationError> {
        let durations = TimerDurations::new(focus_seconds, break_seconds)?;
        Ok(self.apply_durations(durations))
    }

    /// # Errors
    /// Rejects zero; the previous duration stays in effect.
    pub fn set_focus_duration(&mut self, secs: u64) -> Result<Option<Event>, ValidationError> {
        let mut durations = self.state.durations;
        durations.set_focus_seconds(secs)?;
        Ok(self.apply_durations(durations))
    }

    /// # Errors
    /// Rejects zero; the previous duration stays in effect.
    pub fn set_break_duration(&mut self, secs: u64) -> Result<Option<Event>, ValidationError> {
        let mut durations = self.state.durations;
        durations.set_break_seconds(secs)?;
        Ok(self.apply_durations(durations))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply_durations(&mut self, durations: TimerDurations) -> Option<Event> {
        self.state.durations = durations;
        if self.state.phase() == Phase::Idle {
            self.state.remaining_seconds = self.state.current_duration();
        } else {
            self.state.clamp_remaining();
        }
        Some(Event::DurationsChanged {
            focus_seconds: durations.focus_seconds(),
            break_seconds: durations.break_seconds(),
            remaining_seconds: self.state.remaining_seconds,
            at: self.now_utc(),
        })
    }

    fn open_pending(&self) -> Session {
        Session::pending(self.ids.fresh_id(), self.user_id.clone(), self.now_utc())
    }

    fn finalize_pending(&mut self, duration_seconds: u64) -> Option<Session> {
        let now = self.now_utc();
        self.pending
            .take()
            .map(|pending| pending.finalize(duration_seconds, now))
    }

    fn record(&mut self, session: Session) {
        self.history.push(session.clone());
        self.sink.submit(session);
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}
