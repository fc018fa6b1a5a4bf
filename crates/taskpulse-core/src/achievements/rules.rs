use std::collections::BTreeSet;

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskPriority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Milestone,
    Completion,
    Priority,
    Quality,
    Streak,
}

/// What a rule counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "metric", rename_all = "snake_case")]
pub enum Metric {
    TasksCreated,
    TasksCompleted,
    HighPriorityCompleted,
    /// Completed tasks whose assistant score is strictly above `threshold`.
    HighScoreCompleted { threshold: f64 },
    /// Longest run of consecutive days with at least one task created.
    ConsecutiveDays,
}

impl Metric {
    pub fn measure<Tz: TimeZone>(&self, tasks: &[Task], tz: &Tz) -> u32 {
        match *self {
            Metric::TasksCreated => tasks.len() as u32,
            Metric::TasksCompleted => count(tasks, |t| t.is_completed()),
            Metric::HighPriorityCompleted => {
                count(tasks, |t| t.is_completed() && t.priority == TaskPriority::High)
            }
            Metric::HighScoreCompleted { threshold } => count(tasks, |t| {
                t.is_completed() && t.ai_priority_score.unwrap_or(0.0) > threshold
            }),
            Metric::ConsecutiveDays => consecutive_days(tasks, tz),
        }
    }
}

fn count(tasks: &[Task], pred: impl Fn(&Task) -> bool) -> u32 {
    tasks.iter().filter(|t| pred(t)).count() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRule {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: AchievementKind,
    pub points: u32,
    pub target: u32,
    #[serde(flatten)]
    pub metric: Metric,
}

impl AchievementRule {
    pub fn new(
        id: &str,
        title: &str,
        description: &str,
        kind: AchievementKind,
        points: u32,
        target: u32,
        metric: Metric,
    ) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            kind,
            points,
            target,
            metric,
        }
    }
}

/// The built-in achievement table.
pub fn default_rules() -> Vec<AchievementRule> {
    use AchievementKind::*;
    vec![
        AchievementRule::new(
            "first-task",
            "Getting Started",
            "Create your first task",
            Milestone,
            10,
            1,
            Metric::TasksCreated,
        ),
        AchievementRule::new(
            "task-master",
            "Task Master",
            "Create 10 tasks",
            Milestone,
            50,
            10,
            Metric::TasksCreated,
        ),
        AchievementRule::new(
            "completion-champion",
            "Completion Champion",
            "Complete 5 tasks",
            Completion,
            30,
            5,
            Metric::TasksCompleted,
        ),
        AchievementRule::new(
            "weekly-warrior",
            "Weekly Warrior",
            "Complete 20 tasks",
            Completion,
            100,
            20,
            Metric::TasksCompleted,
        ),
        AchievementRule::new(
            "priority-pro",
            "Priority Pro",
            "Complete 3 high-priority tasks",
            Priority,
            40,
            3,
            Metric::HighPriorityCompleted,
        ),
        AchievementRule::new(
            "consistency-king",
            "Consistency King",
            "Create tasks for 7 consecutive days",
            Streak,
            75,
            7,
            Metric::ConsecutiveDays,
        ),
        AchievementRule::new(
            "productivity-legend",
            "Productivity Legend",
            "Complete 50 tasks",
            Completion,
            100,
            50,
            Metric::TasksCompleted,
        ),
        AchievementRule::new(
            "perfectionist",
            "Perfectionist",
            "Complete 10 tasks with AI priority score > 0.8",
            Quality,
            75,
            10,
            Metric::HighScoreCompleted { threshold: 0.8 },
        ),
    ]
}

/// Longest run of consecutive local calendar days on which at least one
/// task was created.
pub fn consecutive_days<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = tasks
        .iter()
        .map(|t| t.created_at.with_timezone(tz).date_naive())
        .collect();

    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in days {
        run = match prev {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}
