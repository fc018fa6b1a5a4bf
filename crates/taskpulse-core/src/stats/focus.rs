use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::timer::Session;

/// Aggregates over completed focus sessions. Never stored; recomputed from
/// history on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStats {
    /// Completed sessions started on the local calendar day of `now`.
    pub today_completed: u64,
    pub total_completed: u64,
    pub total_focus_seconds: u64,
}

impl FocusStats {
    /// `now` supplies both the current day and the timezone that defines
    /// its midnight-to-midnight boundary.
    pub fn from_sessions(sessions: &[Session], now: DateTime<FixedOffset>) -> Self {
        let today = now.date_naive();
        let mut stats = Self::default();
        for session in sessions.iter().filter(|s| s.completed) {
            stats.total_completed += 1;
            stats.total_focus_seconds += session.duration_seconds;
            if local_day(session, &now) == today {
                stats.today_completed += 1;
            }
        }
        stats
    }
}

/// One local calendar day of focus activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: NaiveDate,
    pub completed: u64,
    pub focus_seconds: u64,
}

/// Per-day totals for the `days` local days ending today, oldest first.
/// Days without sessions are included with zero totals.
pub fn daily_breakdown(
    sessions: &[Session],
    now: DateTime<FixedOffset>,
    days: u32,
) -> Vec<DailyFocus> {
    let today = now.date_naive();
    let mut out: Vec<DailyFocus> = (0..days as i64)
        .rev()
        .map(|back| DailyFocus {
            date: today - Duration::days(back),
            completed: 0,
            focus_seconds: 0,
        })
        .collect();

    let Some(first) = out.first().map(|d| d.date) else {
        return out;
    };

    for session in sessions.iter().filter(|s| s.completed) {
        let day = local_day(session, &now);
        if day < first || day > today {
            continue;
        }
        let idx = (day - first).num_days() as usize;
        if let Some(slot) = out.get_mut(idx) {
            slot.completed += 1;
            slot.focus_seconds += session.duration_seconds;
        }
    }
    out
}

fn local_day(session: &Session, now: &DateTime<FixedOffset>) -> NaiveDate {
    session.started_at.with_timezone(&now.timezone()).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tz() -> FixedOffset {
        // UTC-5
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn session_at(id: &str, started: DateTime<Utc>, secs: u64, completed: bool) -> Session {
        let s = Session::pending(id.into(), "u".into(), started);
        if completed {
            s.finalize(secs, started)
        } else {
            s
        }
    }

    #[test]
    fn counts_only_completed() {
        let now = tz().with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let started = now.with_timezone(&Utc) - Duration::hours(1);
        let sessions = vec![
            session_at("a", started, 1500, true),
            session_at("b", started, 0, false),
            session_at("c", started, 600, true),
        ];
        let stats = FocusStats::from_sessions(&sessions, now);
        assert_eq!(stats.total_completed, 2);
        assert_eq!(stats.today_completed, 2);
        assert_eq!(stats.total_focus_seconds, 2100);
    }

    #[test]
    fn today_uses_local_midnight() {
        // 00:30 local on May 10 is 05:30 UTC; 23:30 local on May 9 is 04:30 UTC May 10.
        let now = tz().with_ymd_and_hms(2026, 5, 10, 0, 30, 0).unwrap();
        let today_session = Utc.with_ymd_and_hms(2026, 5, 10, 5, 10, 0).unwrap();
        let yesterday_session = Utc.with_ymd_and_hms(2026, 5, 10, 4, 30, 0).unwrap();
        let sessions = vec![
            session_at("today", today_session, 1500, true),
            session_at("yesterday", yesterday_session, 1500, true),
        ];
        let stats = FocusStats::from_sessions(&sessions, now);
        assert_eq!(stats.today_completed, 1);
        assert_eq!(stats.total_completed, 2);
    }

    #[test]
    fn empty_history_is_zero() {
        let now = tz().with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(FocusStats::from_sessions(&[], now), FocusStats::default());
    }

    #[test]
    fn breakdown_fills_gaps_oldest_first() {
        let now = tz().with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        let two_days_ago = (now - Duration::days(2)).with_timezone(&Utc);
        let long_ago = (now - Duration::days(30)).with_timezone(&Utc);
        let sessions = vec![
            session_at("a", now.with_timezone(&Utc), 1500, true),
            session_at("b", two_days_ago, 900, true),
            session_at("c", two_days_ago, 900, true),
            session_at("d", long_ago, 1500, true),
        ];

        let days = daily_breakdown(&sessions, now, 3);
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 5, 8).unwrap());
        assert_eq!(days[0].completed, 2);
        assert_eq!(days[0].focus_seconds, 1800);
        assert_eq!(days[1].completed, 0);
        assert_eq!(days[2].completed, 1);
    }

    #[test]
    fn breakdown_of_zero_days_is_empty() {
        let now = tz().with_ymd_and_hms(2026, 5, 10, 12, 0, 0).unwrap();
        assert!(daily_breakdown(&[], now, 0).is_empty());
    }
}
