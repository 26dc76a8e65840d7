//! SQLite storage for league data.
//!
//! Storage primitives (point lookups, scans, inserts, patches, deletes) are
//! free functions over a [`Connection`], grouped by table family. Engines call
//! them inside [`Database::transact`], so every engine operation commits as a
//! single unit of work or not at all.

mod schema;

pub mod advantages;
pub mod draft;
pub mod events;
pub mod evolution;
pub mod roster;
pub mod seasons;
pub mod weekly;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, Transaction};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LeagueError, LeagueResult};

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        tracing::debug!("Opened database at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    /// Run `f` inside one transaction. Any error drops the transaction, which
    /// rolls back every write `f` made.
    pub fn transact<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> LeagueResult<T>,
    ) -> LeagueResult<T> {
        let mut conn = self.conn.lock().map_err(|_| LeagueError::LockPoisoned)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run read-only queries against the shared connection.
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> LeagueResult<T>) -> LeagueResult<T> {
        let conn = self.conn.lock().map_err(|_| LeagueError::LockPoisoned)?;
        f(&conn)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// Platform data directory location of the league database.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "draftleague")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("draftleague.db"))
}

/// Which weeks a week-scoped delete touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekScope {
    All,
    Exactly(u32),
    From(u32),
}

impl WeekScope {
    pub fn contains(&self, week: u32) -> bool {
        match self {
            Self::All => true,
            Self::Exactly(w) => week == *w,
            Self::From(w) => week >= *w,
        }
    }

    fn clause(&self, column: &str) -> (String, Option<u32>) {
        match self {
            Self::All => (String::new(), None),
            Self::Exactly(week) => (format!(" AND {column} = ?2"), Some(*week)),
            Self::From(week) => (format!(" AND {column} >= ?2"), Some(*week)),
        }
    }
}

/// Delete a season's rows from `table`, optionally restricted by `week_column`.
///
/// `table` and `week_column` are compile-time names, never user input.
pub(crate) fn delete_scoped(
    conn: &Connection,
    table: &'static str,
    week_column: &'static str,
    season_id: Uuid,
    scope: WeekScope,
) -> LeagueResult<usize> {
    let (clause, week) = scope.clause(week_column);
    let sql = format!("DELETE FROM {table} WHERE season_id = ?1{clause}");
    let rows = match week {
        Some(week) => conn.execute(&sql, (season_id.to_string(), week))?,
        None => conn.execute(&sql, [season_id.to_string()])?,
    };
    Ok(rows)
}

pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}

pub(crate) fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

pub(crate) fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Decode a JSON text column inside a row mapper.
pub(crate) fn parse_json<T: DeserializeOwned>(idx: usize, raw: String) -> rusqlite::Result<T> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transact_rolls_back_on_error() {
        let db = Database::open_memory().unwrap();
        db.migrate().unwrap();

        let result: LeagueResult<()> = db.transact(|tx| {
            tx.execute(
                "INSERT INTO leagues (id, name, commissioner_id, created_at) VALUES (?, ?, ?, ?)",
                (Uuid::new_v4().to_string(), "Doomed", Uuid::new_v4().to_string(), now()),
            )?;
            Err(LeagueError::InvalidTransition("boom".to_string()))
        });
        assert!(result.is_err());

        let count: i64 = db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM leagues", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn week_scope_builds_expected_clause() {
        assert_eq!(WeekScope::All.clause("week"), (String::new(), None));
        assert_eq!(
            WeekScope::From(3).clause("earned_week"),
            (" AND earned_week >= ?2".to_string(), Some(3))
        );
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("league.db");

        {
            let db = Database::open(path.clone()).unwrap();
            db.migrate().unwrap();
            db.transact(|tx| {
                tx.execute(
                    "INSERT INTO leagues (id, name, commissioner_id, created_at) VALUES (?, ?, ?, ?)",
                    (Uuid::new_v4().to_string(), "Kept", Uuid::new_v4().to_string(), now()),
                )?;
                Ok(())
            })
            .unwrap();
        }

        let db = Database::open(path).unwrap();
        db.migrate().unwrap();
        let count: i64 = db
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM leagues", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 1);
    }
}
