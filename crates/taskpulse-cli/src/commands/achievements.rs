use std::path::PathBuf;

use chrono::Local;
use clap::Args;
use taskpulse_core::{AchievementTracker, Database};
use tracing::warn;

use super::tasks::read_tasks;
use super::{print_json, CliResult};

const EARNED_KEY: &str = "achievements_earned";

#[derive(Args)]
pub struct AchievementsArgs {
    /// JSON array of tasks as exported by the app
    #[arg(long)]
    file: PathBuf,
}

/// Evaluate achievements; `newly_earned` is relative to the previous run.
pub fn run(args: AchievementsArgs) -> CliResult {
    let tasks = read_tasks(&args.file)?;
    let db = Database::open()?;

    let previous: Vec<String> = match db.kv_get(EARNED_KEY)? {
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable achievement record");
            Vec::new()
        }),
        None => Vec::new(),
    };

    let mut tracker = AchievementTracker::new().with_earned(previous);
    let evaluation = tracker.evaluate(&tasks, &Local);

    let earned: Vec<&str> = tracker.earned_ids().collect();
    db.kv_set(EARNED_KEY, &serde_json::to_string(&earned)?)?;

    print_json(&evaluation)
}
