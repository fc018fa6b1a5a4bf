use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One focus interval.
///
/// Lives in memory with `completed == false` while its interval runs and is
/// handed to storage only once finalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    /// 0 while pending.
    pub duration_seconds: u64,
    pub completed: bool,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn pending(id: String, user_id: String, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            started_at,
            duration_seconds: 0,
            completed: false,
            ended_at: None,
        }
    }

    /// Consume the pending record and produce its finalized form.
    pub fn finalize(mut self, duration_seconds: u64, ended_at: DateTime<Utc>) -> Self {
        self.duration_seconds = duration_seconds;
        self.completed = true;
        self.ended_at = Some(ended_at);
        self
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_marks_completed_and_keeps_start() {
        let start = Utc::now();
        let session = Session::pending("a".into(), "u".into(), start);
        assert!(session.is_pending());

        let end = start + chrono::Duration::seconds(90);
        let done = session.finalize(90, end);
        assert!(done.completed);
        assert_eq!(done.duration_seconds, 90);
        assert_eq!(done.started_at, start);
        assert_eq!(done.ended_at, Some(end));
    }

    #[test]
    fn missing_ended_at_deserializes_as_none() {
        let json = r#"{
            "id": "x",
            "user_id": "u",
            "started_at": "2026-01-01T09:00:00Z",
            "duration_seconds": 1500,
            "completed": true
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.ended_at, None);
    }
}
