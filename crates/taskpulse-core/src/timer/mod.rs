mod collaborators;
mod engine;
mod session;
mod state;

pub use collaborators::{
    Clock, IdGenerator, ManualClock, NotificationSink, NotifierChain, SilentNotifier,
    SoundCommand, SystemClock, TerminalBell, UuidGenerator,
};
pub use engine::{TimerCheckpoint, TimerEngine, TimerSnapshot};
pub use session::Session;
pub use state::{
    Mode, Phase, TimerDurations, TimerState, DEFAULT_BREAK_SECONDS, DEFAULT_FOCUS_SECONDS,
};
