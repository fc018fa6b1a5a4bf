use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_FOCUS_SECONDS: u64 = 25 * 60;
pub const DEFAULT_BREAK_SECONDS: u64 = 5 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn opposite(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }
}

/// Control phase, derived from the `is_active` / `is_paused` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Configured interval lengths, in seconds. Both are always non-zero,
/// including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDurations")]
pub struct TimerDurations {
    focus_seconds: u64,
    break_seconds: u64,
}

impl TimerDurations {
    /// # Errors
    /// Returns a validation error if either duration is zero.
    pub fn new(focus_seconds: u64, break_seconds: u64) -> Result<Self, ValidationError> {
        Ok(Self {
            focus_seconds: validate("focus_seconds", focus_seconds)?,
            break_seconds: validate("break_seconds", break_seconds)?,
        })
    }

    pub fn focus_seconds(&self) -> u64 {
        self.focus_seconds
    }

    pub fn break_seconds(&self) -> u64 {
        self.break_seconds
    }

    pub fn for_mode(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus_seconds,
            Mode::Break => self.break_seconds,
        }
    }

    /// # Errors
    /// Rejects zero and leaves the current value untouched.
    pub fn set_focus_seconds(&mut self, secs: u64) -> Result<(), ValidationError> {
        self.focus_seconds = validate("focus_seconds", secs)?;
        Ok(())
    }

    /// # Errors
    /// Rejects zero and leaves the current value untouched.
    pub fn set_break_seconds(&mut self, secs: u64) -> Result<(), ValidationError> {
        self.break_seconds = validate("break_seconds", secs)?;
        Ok(())
    }
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            focus_seconds: DEFAULT_FOCUS_SECONDS,
            break_seconds: DEFAULT_BREAK_SECONDS,
        }
    }
}

#[derive(Deserialize)]
struct RawDurations {
    focus_seconds: u64,
    break_seconds: u64,
}

impl TryFrom<RawDurations> for TimerDurations {
    type Error = ValidationError;

    fn try_from(raw: RawDurations) -> Result<Self, Self::Error> {
        Self::new(raw.focus_seconds, raw.break_seconds)
    }
}

fn validate(field: &str, secs: u64) -> Result<u64, ValidationError> {
    if secs == 0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            message: "duration must be greater than zero".to_string(),
        });
    }
    Ok(secs)
}

/// Process-local countdown state.
///
/// `remaining_seconds` never exceeds the duration of the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: Mode,
    pub is_active: bool,
    pub is_paused: bool,
    pub remaining_seconds: u64,
    pub durations: TimerDurations,
}

impl TimerState {
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            mode: Mode::Focus,
            is_active: false,
            is_paused: false,
            remaining_seconds: durations.focus_seconds(),
            durations,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.is_active, self.is_paused) {
            (false, _) => Phase::Idle,
            (true, false) => Phase::Running,
            (true, true) => Phase::Paused,
        }
    }

    pub fn current_duration(&self) -> u64 {
        self.durations.for_mode(self.mode)
    }

    /// Switch to `mode` and refill the countdown.
    pub fn enter_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.remaining_seconds = self.durations.for_mode(mode);
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.current_duration().saturating_sub(self.remaining_seconds)
    }

    /// 0.0 ..= 100.0 progress through the current interval.
    pub fn progress_percent(&self) -> f64 {
        let total = self.current_duration();
        if total == 0 {
            return 0.0;
        }
        self.elapsed_seconds() as f64 / total as f64 * 100.0
    }

    /// Re-establish `remaining_seconds <= current_duration()`.
    pub(crate) fn clamp_remaining(&mut self) {
        self.remaining_seconds = self.remaining_seconds.min(self.current_duration());
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_25_and_5_minutes() {
        let d = TimerDurations::default();
        assert_eq!(d.focus_seconds(), 1500);
        assert_eq!(d.break_seconds(), 300);
    }

    #[test]
    fn zero_duration_rejected_and_previous_kept() {
        assert!(TimerDurations::new(0, 300).is_err());
        assert!(TimerDurations::new(1500, 0).is_err());

        let mut d = TimerDurations::default();
        assert!(d.set_focus_seconds(0).is_err());
        assert_eq!(d.focus_seconds(), 1500);
        assert!(d.set_break_seconds(0).is_err());
        assert_eq!(d.break_seconds(), 300);
    }

    #[test]
    fn deserializing_zero_duration_fails() {
        let ok: TimerDurations =
            serde_json::from_str(r#"{"focus_seconds":60,"break_seconds":30}"#).unwrap();
        assert_eq!(ok.for_mode(Mode::Break), 30);
        assert!(
            serde_json::from_str::<TimerDurations>(r#"{"focus_seconds":0,"break_seconds":30}"#)
                .is_err()
        );
    }

    #[test]
    fn initial_state_is_idle_focus_full() {
        let s = TimerState::default();
        assert_eq!(s.mode, Mode::Focus);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.remaining_seconds, 1500);
        assert_eq!(s.progress_percent(), 0.0);
    }

    #[test]
    fn phase_follows_flags() {
        let mut s = TimerState::default();
        s.is_active = true;
        assert_eq!(s.phase(), Phase::Running);
        s.is_paused = true;
        assert_eq!(s.phase(), Phase::Paused);
        s.is_active = false;
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut s = TimerState::new(TimerDurations::new(100, 20).unwrap());
        s.remaining_seconds = 25;
        assert!((s.progress_percent() - 75.0).abs() < f64::EPSILON);

        s.enter_mode(Mode::Break);
        assert_eq!(s.remaining_seconds, 20);
        assert_eq!(s.progress_percent(), 0.0);
    }
}
