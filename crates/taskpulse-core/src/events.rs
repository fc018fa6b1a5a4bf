use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Mode, Session};

/// Why the engine moved from one mode to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionReason {
    /// The countdown reached zero.
    Completed,
    /// The caller skipped ahead.
    Skipped,
}

/// Every state change of the timer produces an Event.
/// Hosts print or forward them; notification sinks receive boundary events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: Mode,
        remaining_seconds: u64,
        /// Set when this start opened a new pending session.
        session_id: Option<String>,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        /// Id of the pending session that was thrown away, if any.
        discarded_session: Option<String>,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: Mode,
        to: Mode,
        reason: TransitionReason,
        /// The focus session finalized by this transition.
        session: Option<Session>,
        at: DateTime<Utc>,
    },
    DurationsChanged {
        focus_seconds: u64,
        break_seconds: u64,
        remaining_seconds: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ModeChanged { at, .. }
            | Event::DurationsChanged { at, .. } => *at,
        }
    }

    /// The session finalized by this event, if any.
    pub fn finalized_session(&self) -> Option<&Session> {
        match self {
            Event::ModeChanged { session, .. } => session.as_ref(),
            _ => None,
        }
    }
}
