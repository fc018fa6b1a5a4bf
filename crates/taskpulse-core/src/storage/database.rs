//! SQLite-based session storage.
//!
//! Provides persistent storage for:
//! - Finalized focus sessions
//! - Key-value store for application state (timer checkpoints)

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, migrations, SessionStore};
use crate::error::DatabaseError;
use crate::timer::Session;

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/taskpulse.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("taskpulse.db"))
    }

    /// Open (or create) a database file at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        migrations::migrate(&self.conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Insert a finalized session, replacing any row with the same id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_session(&self, session: &Session) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions
                (id, user_id, started_at, duration_seconds, completed, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.user_id,
                session.started_at.to_rfc3339(),
                session.duration_seconds as i64,
                session.completed,
                session.ended_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// All sessions for a user, most recent start first.
    ///
    /// # Errors
    /// Returns an error if the query fails or a stored timestamp is malformed.
    pub fn list_sessions(&self, user_id: &str) -> Result<Vec<Session>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, started_at, duration_seconds, completed, ended_at
             FROM sessions
             WHERE user_id = ?1
             ORDER BY started_at DESC",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut sessions = Vec::new();
        for row in rows {
            let (id, user_id, started_at, duration, completed, ended_at) = row?;
            sessions.push(Session {
                id,
                user_id,
                started_at: parse_timestamp(&started_at)?,
                duration_seconds: duration.max(0) as u64,
                completed,
                ended_at: ended_at.as_deref().map(parse_timestamp).transpose()?,
            });
        }
        Ok(sessions)
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove a key from the kv store.
    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl SessionStore for Database {
    fn persist(&self, session: &Session) -> Result<(), DatabaseError> {
        self.record_session(session)
    }

    fn load_history(&self, user_id: &str) -> Result<Vec<Session>, DatabaseError> {
        self.list_sessions(user_id)
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::QueryFailed(format!("bad timestamp '{raw}': {e}")))
}
