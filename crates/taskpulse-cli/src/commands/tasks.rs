use std::path::{Path, PathBuf};

use chrono::Local;
use clap::Subcommand;
use taskpulse_core::task::parse_tasks;
use taskpulse_core::{ProductivityStats, Task};

use super::{print_json, CliResult};

#[derive(Subcommand)]
pub enum TasksAction {
    /// Productivity figures for an exported task list
    Stats {
        /// JSON array of tasks as exported by the app
        #[arg(long)]
        file: PathBuf,
    },
}

/// Read an exported task list. Shared with the achievements command.
pub(crate) fn read_tasks(path: &Path) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let tasks = parse_tasks(&json).map_err(|e| format!("invalid task file {}: {e}", path.display()))?;
    Ok(tasks)
}

pub fn run(action: TasksAction) -> CliResult {
    match action {
        TasksAction::Stats { file } => {
            let tasks = read_tasks(&file)?;
            let today = Local::now().date_naive();
            print_json(&ProductivityStats::from_tasks(&tasks, today, &Local))?;
        }
    }
    Ok(())
}
