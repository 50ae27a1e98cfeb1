//! SQLite-backed relational store.
//!
//! A single [`Store`] owns the connection for the lifetime of a command.
//! Callers borrow it for reads and open one transaction per unit of work.

pub mod queries;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, Transaction};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::MatchId;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database file not found: {0}")]
    MissingDatabase(PathBuf),
}

/// Row counts for every table in the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub matches: i64,
    pub players: i64,
    pub player_match_stats: i64,
    pub processed_files: i64,
}

impl TableCounts {
    /// Sum across all tables.
    pub fn total(&self) -> i64 {
        self.matches + self.players + self.player_match_stats + self.processed_files
    }
}

/// Handle to the match database.
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open the database at `path`, creating the file and schema if it does
    /// not exist yet.
    pub fn connect(path: &Path) -> Result<Self, StoreError> {
        let existed = path.exists();
        if !existed {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self::from_connection(Connection::open(path)?, Some(path.to_path_buf()))?;
        if !existed {
            info!("Creating new database at {:?}", path);
            store.ensure_schema()?;
        }
        Ok(store)
    }

    /// Open a database that must already exist.
    pub fn open_existing(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::MissingDatabase(path.to_path_buf()));
        }
        Self::from_connection(Connection::open(path)?, Some(path.to_path_buf()))
    }

    /// Open a schema-initialized in-memory database.
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self::from_connection(Connection::open_in_memory()?, None)?;
        store.ensure_schema()?;
        Ok(store)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, path })
    }

    /// Create all tables if absent. Safe to call on every startup.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        schema::create_tables(&self.conn)?;
        debug!("Schema ensured");
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Borrow the underlying connection for reads.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction. Dropping it without commit rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>, StoreError> {
        Ok(self.conn.transaction()?)
    }

    /// Whether a match with this identifier is already stored.
    pub fn match_exists(&self, match_id: &MatchId) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM matches WHERE match_id = ?1",
                [match_id.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Row counts for all tables.
    pub fn table_counts(&self) -> Result<TableCounts, StoreError> {
        let count = |table: &str| -> Result<i64, StoreError> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
        };

        Ok(TableCounts {
            matches: count("matches")?,
            players: count("players")?,
            player_match_stats: count("player_match_stats")?,
            processed_files: count("processed_files")?,
        })
    }

    /// Names of all user tables, sorted.
    pub fn table_names(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    /// Delete every row from every table in one transaction.
    ///
    /// Returns the row counts afterwards, which are all zero on success.
    pub fn clear_all(&mut self) -> Result<TableCounts, StoreError> {
        let tx = self.conn.transaction()?;
        for table in schema::TABLES {
            let deleted = tx.execute(&format!("DELETE FROM {}", table), [])?;
            info!("Deleted {} rows from {}", deleted, table);
        }
        tx.commit()?;
        self.table_counts()
    }
}
