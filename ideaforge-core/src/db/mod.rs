//! SQLite implementation of the persistence ports.
//!
//! One `Database` handle is shared by every stage; it serialises access to a
//! single connection behind a mutex. Timestamps are stored as fixed-width
//! RFC 3339 strings (microsecond precision) so text ordering matches time
//! ordering, with `rowid` breaking ties between rows written in the same tick.

mod action_plans;
mod architectures;
mod dev_modules;
mod ideas;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, Connection};
use thiserror::Error;
use uuid::Uuid;

use schema::{SCHEMA, SCHEMA_VERSION};

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DbError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

        tracing::info!("Database opened at {:?}", db_path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens the database in the platform data directory.
    pub fn open_default() -> Result<Self, DbError> {
        Self::open(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, DbError> {
        let dirs = directories::ProjectDirs::from("dev", "ideaforge", "ideaforge")
            .ok_or_else(|| DbError::NotFound("home directory".to_string()))?;
        Ok(dirs.data_dir().join("ideaforge.db"))
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn migrate(&self) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute_batch(SCHEMA)?;

            let current_version: i32 = conn.query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )?;

            if current_version < SCHEMA_VERSION {
                tracing::info!(
                    "Migrating database from version {} to {}",
                    current_version,
                    SCHEMA_VERSION
                );
                conn.execute(
                    "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
                    [SCHEMA_VERSION],
                )?;
            }
            Ok(())
        })
    }

    pub fn schema_version(&self) -> Result<i32, DbError> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )?)
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self.conn.lock().map_err(|e| DbError::Lock(e.to_string()))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut Connection) -> Result<T, DbError>,
    {
        let mut conn = self.conn.lock().map_err(|e| DbError::Lock(e.to_string()))?;
        f(&mut conn)
    }
}

pub(crate) fn encode_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_time(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_uuid(idx: usize, s: String) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    s: String,
) -> rusqlite::Result<T> {
    serde_json::from_str(&s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn decode_enum<T>(idx: usize, s: String, parse: fn(&str) -> Option<T>) -> rusqlite::Result<T> {
    parse(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown value '{}'", s).into(),
        )
    })
}

/// Classifies constraint failures on insert: a duplicate becomes `Conflict`,
/// a dangling parent reference becomes `NotFound`.
pub(crate) fn classify_write(err: rusqlite::Error, entity: &str, parent: &str) -> DbError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return DbError::Conflict(format!("{} already exists", entity));
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return DbError::NotFound(parent.to_string());
            }
            _ => {}
        }
    }
    DbError::Sqlite(err)
}
