//! Collaborators the timer engine depends on but does not own.
//!
//! Wall time, identifier generation and the "time's up" side effect are all
//! injected so a host (or a test) can substitute its own.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Local};

use crate::error::CoreError;
use crate::events::Event;

/// Source of local wall time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Produces identifiers unique within a user's session history.
pub trait IdGenerator: Send + Sync {
    fn fresh_id(&self) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn fresh_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn fresh_id(&self) -> String {
        self()
    }
}

/// Side effect fired when an interval runs out.
///
/// Implementations should return quickly; the engine logs and drops any error.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: &Event) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl NotificationSink for SilentNotifier {
    fn notify(&self, _event: &Event) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Rings the terminal bell on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl NotificationSink for TerminalBell {
    fn notify(&self, _event: &Event) -> Result<(), CoreError> {
        let mut stderr = std::io::stderr();
        stderr.write_all(b"\x07")?;
        stderr.flush()?;
        Ok(())
    }
}

/// Spawns a sound player command and does not wait for it.
///
/// The command line is split on whitespace; the first word is the program.
#[derive(Debug, Clone)]
pub struct SoundCommand {
    command: String,
}

impl SoundCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl NotificationSink for SoundCommand {
    fn notify(&self, _event: &Event) -> Result<(), CoreError> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| CoreError::Notification("sound command is empty".into()))?;
        Command::new(program)
            .args(parts)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| CoreError::Notification(format!("failed to run '{program}': {e}")))?;
        Ok(())
    }
}

/// Fans one notification out to several sinks; the first failure is reported
/// after every sink has been tried.
#[derive(Default)]
pub struct NotifierChain {
    sinks: Vec<Box<dyn NotificationSink>>,
}

impl NotifierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, sink: impl NotificationSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for NotifierChain {
    fn notify(&self, event: &Event) -> Result<(), CoreError> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.notify(event) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn reset_event() -> Event {
        Event::TimerReset {
            discarded_session: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn manual_clock_advances() {
        let start = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2026, 3, 1, 8, 0, 0)
            .unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::minutes(25));
        assert_eq!(clock.now(), start + Duration::minutes(25));
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let ids = UuidGenerator;
        assert_ne!(ids.fresh_id(), ids.fresh_id());
    }

    #[test]
    fn closures_generate_ids() {
        let counter = AtomicUsize::new(0);
        let ids = move || format!("s{}", counter.fetch_add(1, Ordering::SeqCst));
        assert_eq!(ids.fresh_id(), "s0");
        assert_eq!(ids.fresh_id(), "s1");
    }

    #[test]
    fn empty_sound_command_is_an_error() {
        let sink = SoundCommand::new("   ");
        assert!(sink.notify(&reset_event()).is_err());
    }

    struct Counting(Arc<AtomicUsize>, bool);

    impl NotificationSink for Counting {
        fn notify(&self, _event: &Event) -> Result<(), CoreError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            if self.1 {
                Err(CoreError::Notification("boom".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn chain_tries_every_sink() {
        let hits = Arc::new(AtomicUsize::new(0));
        let chain = NotifierChain::new()
            .push(Counting(hits.clone(), true))
            .push(Counting(hits.clone(), false));
        assert!(chain.notify(&reset_event()).is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
