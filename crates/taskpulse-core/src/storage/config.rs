//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Focus and break interval lengths
//! - Notification preferences
//! - The user whose sessions are tracked
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{
    NotifierChain, SoundCommand, TerminalBell, TimerDurations,
    DEFAULT_BREAK_SECONDS, DEFAULT_FOCUS_SECONDS,
};

/// Interval lengths in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_focus_seconds")]
    pub focus_seconds: u64,
    #[serde(default = "default_break_seconds")]
    pub break_seconds: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub bell: bool,
    /// Command run (without waiting) when an interval ends, e.g.
    /// `paplay /usr/share/sounds/freedesktop/stereo/complete.oga`.
    #[serde(default)]
    pub sound_command: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub user: UserConfig,
}

fn default_focus_seconds() -> u64 {
    DEFAULT_FOCUS_SECONDS
}
fn default_break_seconds() -> u64 {
    DEFAULT_BREAK_SECONDS
}
fn default_true() -> bool {
    true
}
fn default_user_id() -> String {
    "local".into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_seconds: default_focus_seconds(),
            break_seconds: default_break_seconds(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
            sound_command: None,
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a non-negative integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    // Optional strings are stored as null until first set.
                    serde_json::Value::Null | serde_json::Value::String(_) => {
                        if value.is_empty() {
                            serde_json::Value::Null
                        } else {
                            serde_json::Value::String(value.into())
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let mut cfg: Config = toml::from_str(&content)?;
                cfg.sanitize();
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            // Unset optional values read the same as missing keys.
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// The configuration is left unchanged when the key is unknown, the
    /// value does not parse, or the result would be invalid (for example a
    /// zero duration).
    ///
    /// # Errors
    /// Returns the reason the value was rejected.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.durations().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value is rejected,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// # Errors
    /// Returns a validation error when a configured duration is zero.
    pub fn durations(&self) -> Result<TimerDurations, crate::error::ValidationError> {
        TimerDurations::new(self.timer.focus_seconds, self.timer.break_seconds)
    }

    /// Build the notifier described by the `notifications` section.
    pub fn notifier(&self) -> NotifierChain {
        let mut chain = NotifierChain::new();
        if !self.notifications.enabled {
            return chain;
        }
        if self.notifications.bell {
            chain = chain.push(TerminalBell);
        }
        if let Some(cmd) = self
            .notifications
            .sound_command
            .as_deref()
            .filter(|c| !c.trim().is_empty())
        {
            chain = chain.push(SoundCommand::new(cmd));
        }
        chain
    }

    /// Replace invalid durations (hand-edited files) with defaults.
    fn sanitize(&mut self) {
        if self.timer.focus_seconds == 0 {
            warn!("timer.focus_seconds must be positive; using default");
            self.timer.focus_seconds = default_focus_seconds();
        }
        if self.timer.break_seconds == 0 {
            warn!("timer.break_seconds must be positive; using default");
            self.timer.break_seconds = default_break_seconds();
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "failed to load config; using defaults");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.timer.focus_seconds, 1500);
        assert_eq!(parsed.timer.break_seconds, 300);
        assert_eq!(parsed.user.id, "local");
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.focus_seconds").as_deref(), Some("1500"));
        assert_eq!(cfg.get("notifications.bell").as_deref(), Some("true"));
        assert_eq!(cfg.get("user.id").as_deref(), Some("local"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_number() {
        let mut cfg = Config::default();
        cfg.apply("timer.focus_seconds", "3000").unwrap();
        assert_eq!(cfg.timer.focus_seconds, 3000);
    }

    #[test]
    fn apply_sets_optional_string() {
        let mut cfg = Config::default();
        cfg.apply("notifications.sound_command", "aplay ding.wav")
            .unwrap();
        assert_eq!(
            cfg.notifications.sound_command.as_deref(),
            Some("aplay ding.wav")
        );
        cfg.apply("notifications.sound_command", "").unwrap();
        assert!(cfg.notifications.sound_command.is_none());
    }

    #[test]
    fn get_unset_optional_is_none() {
        let mut cfg = Config::default();
        assert!(cfg.get("notifications.sound_command").is_none());
        cfg.apply("notifications.sound_command", "paplay done.oga").unwrap();
        assert_eq!(
            cfg.get("notifications.sound_command").as_deref(),
            Some("paplay done.oga")
        );
    }

    #[test]
    fn apply_rejects_zero_duration_and_keeps_previous() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.break_seconds", "0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(cfg.timer.break_seconds, 300);
    }

    #[test]
    fn apply_rejects_negative_duration() {
        let mut cfg = Config::default();
        assert!(cfg.apply("timer.focus_seconds", "-5").is_err());
        assert_eq!(cfg.timer.focus_seconds, 1500);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("timer.nonexistent", "1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn apply_rejects_invalid_bool() {
        let mut cfg = Config::default();
        assert!(cfg.apply("notifications.bell", "loud").is_err());
        assert!(cfg.notifications.bell);
    }

    #[test]
    fn load_from_missing_file_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.focus_seconds, 1500);
        assert!(path.exists());
    }

    #[test]
    fn load_from_replaces_zero_durations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\nfocus_seconds = 0\nbreak_seconds = 120\n").unwrap();
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.timer.focus_seconds, 1500);
        assert_eq!(cfg.timer.break_seconds, 120);
    }

    #[test]
    fn load_from_rejects_malformed_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer\nfocus_seconds = ").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }

    #[test]
    fn disabled_notifications_build_empty_chain() {
        let mut cfg = Config::default();
        assert!(!cfg.notifier().is_empty());
        cfg.notifications.enabled = false;
        assert!(cfg.notifier().is_empty());
    }
}
