use chrono::Local;
use clap::Subcommand;
use serde_json::json;
use taskpulse_core::stats::daily_breakdown;
use taskpulse_core::{Config, Database, FocusStats, SessionStore};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's focus stats
    Today,
    /// All-time focus stats
    All,
    /// Per-day totals for the last seven days
    Week,
}

pub fn run(action: StatsAction) -> CliResult {
    let config = Config::load()?;
    let db = Database::open()?;
    let sessions = db.load_history(&config.user.id)?;
    let now = Local::now().fixed_offset();

    match action {
        StatsAction::Today => {
            let stats = FocusStats::from_sessions(&sessions, now);
            print_json(&json!({
                "date": now.date_naive(),
                "completed": stats.today_completed,
            }))?;
        }
        StatsAction::All => {
            print_json(&FocusStats::from_sessions(&sessions, now))?;
        }
        StatsAction::Week => {
            print_json(&daily_breakdown(&sessions, now, 7))?;
        }
    }
    Ok(())
}
