//! Achievement evaluation over a task list.
//!
//! Rules are declarative ([`AchievementRule`]); the tracker recomputes all
//! of them on each call and remembers which ones were earned last time so
//! it can report newly unlocked achievements.

mod rules;

use std::collections::BTreeSet;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::task::Task;

pub use rules::{consecutive_days, default_rules, AchievementKind, AchievementRule, Metric};

/// One rule's result for a given task list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStatus {
    pub id: String,
    pub title: String,
    pub description: String,
    pub kind: AchievementKind,
    pub points: u32,
    /// Capped at `target`.
    pub progress: u32,
    pub target: u32,
    pub earned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub achievements: Vec<AchievementStatus>,
    pub total_points: u32,
    pub earned_count: usize,
    /// Earned now but not at the previous evaluation.
    pub newly_earned: Vec<AchievementStatus>,
}

#[derive(Debug, Clone)]
pub struct AchievementTracker {
    rules: Vec<AchievementRule>,
    previously_earned: BTreeSet<String>,
}

impl AchievementTracker {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    pub fn with_rules(rules: Vec<AchievementRule>) -> Self {
        Self {
            rules,
            previously_earned: BTreeSet::new(),
        }
    }

    pub fn rules(&self) -> &[AchievementRule] {
        &self.rules
    }

    /// Seed the earned set, e.g. from a previous run, so those achievements
    /// are not reported as new.
    pub fn with_earned<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.previously_earned = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn earned_ids(&self) -> impl Iterator<Item = &str> {
        self.previously_earned.iter().map(String::as_str)
    }

    /// Recompute every rule against `tasks`. Calendar days are taken in `tz`.
    pub fn evaluate<Tz: TimeZone>(&mut self, tasks: &[Task], tz: &Tz) -> Evaluation {
        let achievements: Vec<AchievementStatus> = self
            .rules
            .iter()
            .map(|rule| {
                let measured = rule.metric.measure(tasks, tz);
                AchievementStatus {
                    id: rule.id.clone(),
                    title: rule.title.clone(),
                    description: rule.description.clone(),
                    kind: rule.kind,
                    points: rule.points,
                    progress: measured.min(rule.target),
                    target: rule.target,
                    earned: measured >= rule.target,
                }
            })
            .collect();

        let newly_earned: Vec<AchievementStatus> = achievements
            .iter()
            .filter(|a| a.earned && !self.previously_earned.contains(&a.id))
            .cloned()
            .collect();

        for a in &newly_earned {
            tracing::info!(achievement = %a.id, points = a.points, "achievement unlocked");
        }

        self.previously_earned = achievements
            .iter()
            .filter(|a| a.earned)
            .map(|a| a.id.clone())
            .collect();

        let earned_count = self.previously_earned.len();
        let total_points = achievements
            .iter()
            .filter(|a| a.earned)
            .map(|a| a.points)
            .sum();

        Evaluation {
            achievements,
            total_points,
            earned_count,
            newly_earned,
        }
    }
}

impl Default for AchievementTracker {
    fn default() -> Self {
        Self::new()
    }
}
