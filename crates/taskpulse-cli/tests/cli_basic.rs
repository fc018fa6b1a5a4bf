//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_taskpulse"))
        .args(args)
        .env("TASKPULSE_DATA_DIR", data_dir)
        .env("TASKPULSE_LOG", "off")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

fn quiet_short_timer(dir: &Path) {
    run_cli(dir, &["config", "set", "notifications.enabled", "false"]);
    run_json(dir, &["timer", "durations", "--focus", "3", "--break", "2"]);
}

#[test]
fn test_timer_status_when_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["mode"], "focus");
    assert_eq!(status["phase"], "idle");
    assert_eq!(status["remaining_seconds"], 1500);
}

#[test]
fn test_timer_start_opens_session() {
    let dir = tempfile::tempdir().unwrap();
    let event = run_json(dir.path(), &["timer", "start"]);
    assert_eq!(event["type"], "timer_started");
    assert!(event["session_id"].is_string());

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["phase"], "running");
    assert_eq!(status["pending_session_id"], event["session_id"]);
}

#[test]
fn test_timer_pause_and_resume() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["timer", "start"]);
    let paused = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(paused["type"], "timer_paused");

    let ticked = run_json(dir.path(), &["timer", "tick", "--count", "5"]);
    assert_eq!(ticked["snapshot"]["remaining_seconds"], 1500);

    let resumed = run_json(dir.path(), &["timer", "resume"]);
    assert_eq!(resumed["type"], "timer_resumed");
}

#[test]
fn test_full_focus_interval_is_recorded() {
    let dir = tempfile::tempdir().unwrap();
    quiet_short_timer(dir.path());
    run_json(dir.path(), &["timer", "start"]);

    let ticked = run_json(dir.path(), &["timer", "tick", "--count", "3"]);
    let events = ticked["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "mode_changed");
    assert_eq!(events[0]["to"], "break");
    assert_eq!(events[0]["session"]["duration_seconds"], 3);
    assert_eq!(ticked["snapshot"]["mode"], "break");

    let all = run_json(dir.path(), &["stats", "all"]);
    assert_eq!(all["total_completed"], 1);
    assert_eq!(all["total_focus_seconds"], 3);

    let today = run_json(dir.path(), &["stats", "today"]);
    assert_eq!(today["completed"], 1);

    let week = run_json(dir.path(), &["stats", "week"]);
    assert_eq!(week.as_array().unwrap().len(), 7);
    assert_eq!(week[6]["completed"], 1);
}

#[test]
fn test_timer_run_stops_after_cycles() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "notifications.enabled", "false"]);
    run_json(dir.path(), &["timer", "durations", "--focus", "1", "--break", "1"]);

    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "run", "--cycles", "1"]);
    assert_eq!(code, 0, "{stderr}");

    // Pretty-printed documents follow each other on stdout.
    let docs: Vec<Value> = serde_json::Deserializer::from_str(&stdout)
        .into_iter::<Value>()
        .collect::<Result<_, _>>()
        .unwrap();
    let changes: Vec<&Value> = docs
        .iter()
        .filter(|d| d["type"] == "mode_changed")
        .collect();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0]["to"], "break");

    let snapshot = docs.last().unwrap();
    assert_eq!(snapshot["mode"], "break");

    let all = run_json(dir.path(), &["stats", "all"]);
    assert_eq!(all["total_completed"], 1);
    assert_eq!(all["total_focus_seconds"], 1);
}

#[test]
fn test_reset_discards_session() {
    let dir = tempfile::tempdir().unwrap();
    quiet_short_timer(dir.path());
    let started = run_json(dir.path(), &["timer", "start"]);
    run_json(dir.path(), &["timer", "tick"]);

    let reset = run_json(dir.path(), &["timer", "reset"]);
    assert_eq!(reset["type"], "timer_reset");
    assert_eq!(reset["discarded_session"], started["session_id"]);

    let all = run_json(dir.path(), &["stats", "all"]);
    assert_eq!(all["total_completed"], 0);
}

#[test]
fn test_skip_break_records_elapsed() {
    let dir = tempfile::tempdir().unwrap();
    quiet_short_timer(dir.path());
    run_json(dir.path(), &["timer", "start"]);
    run_json(dir.path(), &["timer", "tick", "--count", "2"]);

    let skipped = run_json(dir.path(), &["timer", "skip-break"]);
    assert_eq!(skipped["reason"], "skipped");
    assert_eq!(skipped["session"]["duration_seconds"], 2);

    let back = run_json(dir.path(), &["timer", "skip-focus"]);
    assert_eq!(back["to"], "focus");
}

#[test]
fn test_zero_duration_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "durations", "--focus", "0"]);
    assert_eq!(code, 1);
    assert!(stderr.starts_with("error:"), "{stderr}");

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["focus_seconds"], 1500);
}

#[test]
fn test_config_get_set_list() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.focus_seconds"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1500");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "user.id", "alice"]);
    assert_eq!(code, 0);
    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["user"]["id"], "alice");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "ui.dark_mode"]);
    assert_eq!(code, 1);
}

#[test]
fn test_config_get_unset_optional_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["config", "get", "notifications.sound_command"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
    assert!(stderr.contains("unset"), "{stderr}");
}

#[test]
fn test_config_reset() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "timer.break_seconds", "60"]);
    let (_, _, code) = run_cli(dir.path(), &["config", "reset"]);
    assert_eq!(code, 0);
    let list = run_json(dir.path(), &["config", "list"]);
    assert_eq!(list["timer"]["break_seconds"], 300);
}

const TASKS: &str = r#"[
    {"id":"1","title":"a","priority":"high","status":"completed","createdAt":"2026-01-05T09:00:00Z"},
    {"id":"2","title":"b","priority":"low","status":"todo","createdAt":"2026-01-06T09:00:00Z","estimatedDuration":20}
]"#;

#[test]
fn test_tasks_stats() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tasks.json");
    std::fs::write(&file, TASKS).unwrap();

    let stats = run_json(dir.path(), &["tasks", "stats", "--file", file.to_str().unwrap()]);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["completion_rate"], 50);
    assert_eq!(stats["avg_estimated_minutes"], 20);
}

#[test]
fn test_achievements_reports_new_once() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("tasks.json");
    std::fs::write(&file, TASKS).unwrap();
    let path = file.to_str().unwrap();

    let first = run_json(dir.path(), &["achievements", "--file", path]);
    assert_eq!(first["newly_earned"][0]["id"], "first-task");
    assert_eq!(first["total_points"], 10);

    let second = run_json(dir.path(), &["achievements", "--file", path]);
    assert_eq!(second["newly_earned"].as_array().unwrap().len(), 0);
    assert_eq!(second["earned_count"], 1);
}

#[test]
fn test_missing_task_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["tasks", "stats", "--file", "/nonexistent/tasks.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("cannot read"));
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("taskpulse"));
}
