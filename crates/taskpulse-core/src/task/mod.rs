//! Task records as the application stores them.
//!
//! TaskPulse does not create or edit tasks; it reads them to compute
//! productivity statistics and achievements. Field names follow the
//! application's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Minutes.
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    /// Minutes.
    #[serde(default)]
    pub actual_duration: Option<u32>,
    /// 0.0 ..= 1.0 score assigned by the prioritization assistant.
    #[serde(default)]
    pub ai_priority_score: Option<f64>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Read a JSON array of tasks.
///
/// # Errors
/// Returns the parse error when the input is not a task array.
pub fn parse_tasks(json: &str) -> Result<Vec<Task>, serde_json::Error> {
    serde_json::from_str(json)
}
