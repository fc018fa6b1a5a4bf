use std::time::Duration;

use clap::Subcommand;
use serde_json::json;
use taskpulse_core::storage::{BackgroundPersister, InlinePersister, SessionSink};
use taskpulse_core::{Config, Database, Event, Phase, TimerCheckpoint, TimerEngine};
use tracing::{debug, info, warn};

use super::{print_json, CliResult};

const ENGINE_KEY: &str = "timer_checkpoint";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the countdown
    Start,
    /// Pause a running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Back to an idle focus interval, discarding the open session
    Reset,
    /// End the current interval and start a break
    SkipBreak,
    /// Jump to a fresh focus interval
    SkipFocus,
    /// Print current timer state as JSON
    Status,
    /// Advance the countdown by whole seconds without waiting
    Tick {
        #[arg(long, default_value_t = 1)]
        count: u64,
    },
    /// Drive the timer in real time until Ctrl-C
    Run {
        /// Stop after this many interval boundaries
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Change interval lengths (seconds); also saved to the config file
    Durations {
        #[arg(long)]
        focus: Option<u64>,
        #[arg(long = "break")]
        break_seconds: Option<u64>,
    },
}

/// Build an engine from configuration and the saved checkpoint.
///
/// History is read through `db`; finalized sessions go to `sink`.
fn load_engine(
    config: &Config,
    db: &Database,
    sink: impl SessionSink + 'static,
) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let mut engine = TimerEngine::new(config.durations()?)
        .with_user(config.user.id.clone())
        .with_notifier(config.notifier())
        .with_sink(sink);
    let loaded = engine.seed_history(db);
    debug!(sessions = loaded, "history loaded");

    match db.kv_get(ENGINE_KEY) {
        Ok(Some(json)) => match serde_json::from_str::<TimerCheckpoint>(&json) {
            Ok(checkpoint) => engine.restore(checkpoint),
            Err(e) => warn!(error = %e, "ignoring unreadable timer checkpoint"),
        },
        Ok(None) => {}
        Err(e) => warn!(error = %e, "failed to read timer checkpoint"),
    }

    // The config file wins over durations saved in the checkpoint.
    let configured = config.durations()?;
    if engine.durations() != configured {
        engine.set_durations(configured.focus_seconds(), configured.break_seconds())?;
    }
    Ok(engine)
}

fn save_engine(db: &Database, engine: &TimerEngine) -> CliResult {
    let json = serde_json::to_string(&engine.checkpoint())?;
    db.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

fn print_outcome(engine: &TimerEngine, event: Option<Event>) -> CliResult {
    match event {
        Some(event) => print_json(&event),
        None => print_json(&engine.snapshot()),
    }
}

/// Load the engine, apply `step`, then save the checkpoint.
fn with_engine(
    config: &Config,
    db: &Database,
    step: impl FnOnce(&mut TimerEngine) -> CliResult,
) -> CliResult {
    let mut engine = load_engine(config, db, InlinePersister::new(Database::open()?))?;
    step(&mut engine)?;
    save_engine(db, &engine)
}

fn command(
    config: &Config,
    db: &Database,
    op: impl FnOnce(&mut TimerEngine) -> Option<Event>,
) -> CliResult {
    with_engine(config, db, |engine| {
        let event = op(engine);
        print_outcome(engine, event)
    })
}

pub fn run(action: TimerAction) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        TimerAction::Start => command(&config, &db, TimerEngine::start),
        TimerAction::Pause => command(&config, &db, TimerEngine::pause),
        TimerAction::Resume => command(&config, &db, TimerEngine::resume),
        TimerAction::Reset => command(&config, &db, TimerEngine::reset),
        TimerAction::SkipBreak => command(&config, &db, TimerEngine::skip_to_break),
        TimerAction::SkipFocus => command(&config, &db, TimerEngine::skip_to_focus),
        TimerAction::Status => with_engine(&config, &db, |engine| print_json(&engine.snapshot())),
        TimerAction::Tick { count } => with_engine(&config, &db, |engine| {
            let events: Vec<Event> = (0..count).filter_map(|_| engine.tick()).collect();
            print_json(&json!({
                "events": events,
                "snapshot": engine.snapshot(),
            }))
        }),
        TimerAction::Run { cycles } => run_live(&config, db, cycles),
        TimerAction::Durations {
            focus,
            break_seconds,
        } => {
            if focus.is_none() && break_seconds.is_none() {
                return Err("nothing to change: pass --focus and/or --break".into());
            }
            let mut updated = config.clone();
            with_engine(&config, &db, |engine| {
                let mut event = None;
                if let Some(secs) = focus {
                    event = engine.set_focus_duration(secs)?;
                    updated.timer.focus_seconds = secs;
                }
                if let Some(secs) = break_seconds {
                    event = engine.set_break_duration(secs)?;
                    updated.timer.break_seconds = secs;
                }
                updated.save()?;
                print_outcome(engine, event)
            })
        }
    }
}

/// Tick once per second while running. Sessions are written by a blocking
/// worker so the ticker never waits on SQLite.
fn run_live(config: &Config, db: Database, cycles: Option<u32>) -> CliResult {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let (persister, worker) = BackgroundPersister::spawn(Database::open()?);
        let mut engine = load_engine(config, &db, persister)?;

        // Also opens a session when a focus interval is running untracked.
        if let Some(event) = engine.start() {
            print_json(&event)?;
        }

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick completes immediately.
        interval.tick().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut boundaries = 0u32;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if engine.phase() != Phase::Running {
                        continue;
                    }
                    if let Some(event) = engine.tick() {
                        print_json(&event)?;
                        boundaries += 1;
                        if cycles.is_some_and(|n| boundaries >= n) {
                            break;
                        }
                    }
                }
                _ = &mut ctrl_c => {
                    info!("interrupted");
                    break;
                }
            }
        }

        save_engine(&db, &engine)?;
        print_json(&engine.snapshot())?;

        // Dropping the engine releases the last sender; the worker drains and exits.
        drop(engine);
        match worker.await {
            Ok(written) => debug!(written, "session writer finished"),
            Err(e) => warn!(error = %e, "session writer failed"),
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
