use chrono::{Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskPriority, TaskStatus};

/// Dashboard figures over a task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductivityStats {
    pub total: u64,
    pub todo: u64,
    pub in_progress: u64,
    pub completed: u64,
    /// Rounded percentage of tasks completed; 0 for an empty list.
    pub completion_rate: u32,
    /// Completed tasks created within the last seven local days, today included.
    pub completed_last_7_days: u64,
    /// High-priority tasks not yet completed.
    pub pending_high_priority: u64,
    /// Rounded mean of `estimated_duration` over tasks that have one; 0 if none.
    pub avg_estimated_minutes: u32,
    pub estimated_tasks: u64,
}

impl ProductivityStats {
    /// `today` and `tz` define the seven-day window.
    pub fn from_tasks<Tz: TimeZone>(tasks: &[Task], today: NaiveDate, tz: &Tz) -> Self {
        let mut stats = Self {
            total: tasks.len() as u64,
            ..Self::default()
        };
        let window_start = today - Duration::days(6);
        let mut estimate_sum: u64 = 0;

        for task in tasks {
            match task.status {
                TaskStatus::Todo => stats.todo += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => {
                    stats.completed += 1;
                    let created = task.created_at.with_timezone(tz).date_naive();
                    if created >= window_start && created <= today {
                        stats.completed_last_7_days += 1;
                    }
                }
            }
            if task.priority == TaskPriority::High && !task.is_completed() {
                stats.pending_high_priority += 1;
            }
            if let Some(est) = task.estimated_duration.filter(|m| *m > 0) {
                estimate_sum += u64::from(est);
                stats.estimated_tasks += 1;
            }
        }

        if stats.total > 0 {
            stats.completion_rate =
                (stats.completed as f64 / stats.total as f64 * 100.0).round() as u32;
        }
        if stats.estimated_tasks > 0 {
            stats.avg_estimated_minutes =
                (estimate_sum as f64 / stats.estimated_tasks as f64).round() as u32;
        }
        stats
    }
}
