//! # TaskPulse Core Library
//!
//! Focus/break countdown timer and session accounting for the TaskPulse
//! task manager. The `taskpulse` CLI is a thin host over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a caller-driven state machine; the host invokes
//!   `tick()` once per second while the timer runs
//! - **Storage**: SQLite session history, a kv checkpoint table and TOML
//!   configuration
//! - **Statistics**: focus totals from session history, productivity
//!   figures from task records
//! - **Achievements**: a rule table evaluated over task records
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`Database`]: Session persistence
//! - [`Config`]: Application configuration management
//! - [`AchievementTracker`]: Achievement progress and unlocks

pub mod achievements;
pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod task;
pub mod timer;

pub use achievements::{AchievementStatus, AchievementTracker, Evaluation};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, TransitionReason};
pub use stats::{DailyFocus, FocusStats, ProductivityStats};
pub use storage::{
    BackgroundPersister, Config, Database, InlinePersister, MemoryStore, SessionSink,
    SessionStore,
};
pub use task::{Task, TaskPriority, TaskStatus};
pub use timer::{
    Mode, Phase, Session, TimerCheckpoint, TimerDurations, TimerEngine, TimerSnapshot,
    TimerState,
};
