//! Statistics module for TaskPulse
//!
//! Everything here is derived on demand: focus statistics from session
//! history and productivity figures from task records.

mod focus;
mod productivity;

pub use focus::{daily_breakdown, DailyFocus, FocusStats};
pub use productivity::ProductivityStats;
