//! Incremental match importer.
//!
//! Scans a directory of match files and loads each one exactly once:
//! 1. Fingerprint the file bytes
//! 2. Skip files whose name and fingerprint are already recorded
//! 3. Decode the JSON document
//! 4. Stop if the match is already stored
//! 5. Validate the match and write the match, its players and their stat lines in one transaction
//! 6. Record the fingerprint once the match is stored
//!
//! A failing file is rolled back, counted, and retried on the next run.

pub mod bookkeeping;
pub mod fingerprint;

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Transaction};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{MatchFile, MatchId};
use crate::storage::schema::{DEFAULT_CLUSTER, DEFAULT_GAME_MODE, DEFAULT_LOBBY_TYPE};
use crate::storage::{Store, StoreError};

/// Default extension of match files.
pub const DEFAULT_EXTENSION: &str = "json";

/// Errors that can occur while importing.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed match file {file}: {reason}")]
    MalformedInput { file: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Match data directory not found: {0}")]
    MissingDirectory(PathBuf),
}

impl From<rusqlite::Error> for ImportError {
    fn from(e: rusqlite::Error) -> Self {
        ImportError::Storage(StoreError::Sqlite(e))
    }
}

/// Outcome of importing a single file that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The match and all of its stat lines were written.
    Imported { match_id: MatchId, players: usize },

    /// A match with this identifier was already stored; nothing was written.
    AlreadyPresent { match_id: MatchId },
}

/// Counts for one `import_all` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files with the match extension found in the directory
    pub found: usize,
    pub imported: usize,
    pub already_present: usize,

    /// Files whose name and fingerprint were already recorded
    pub skipped: usize,
    pub failed: usize,

    /// One line per failed file
    pub failures: Vec<String>,
}

impl ImportSummary {
    /// Files handled successfully this run, including already-present matches.
    pub fn processed(&self) -> usize {
        self.imported + self.already_present
    }
}

/// Imports match files into a [`Store`].
pub struct Importer<'a> {
    store: &'a mut Store,
    extension: String,
}

impl<'a> Importer<'a> {
    pub fn new(store: &'a mut Store) -> Self {
        Self {
            store,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Builder method to set the match file extension (without the dot).
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// Import every new or changed match file in `dir`.
    ///
    /// Only a missing directory or an unusable schema aborts the run. Errors
    /// for individual files are counted in the summary.
    pub fn import_all(&mut self, dir: &Path) -> Result<ImportSummary, ImportError> {
        if !dir.is_dir() {
            return Err(ImportError::MissingDirectory(dir.to_path_buf()));
        }
        self.store.ensure_schema()?;

        let MatchListing { files, unreadable } = self.list_match_files(dir)?;
        let mut summary = ImportSummary {
            found: files.len() + unreadable.len(),
            failed: unreadable.len(),
            failures: unreadable,
            ..Default::default()
        };

        if summary.found == 0 {
            info!("No .{} files found in {:?}", self.extension, dir);
            return Ok(summary);
        }
        info!("Found {} .{} files in {:?}", files.len(), self.extension, dir);

        for path in &files {
            let file_name = display_name(path);
            match self.import_if_due(path, &file_name) {
                Ok(None) => {
                    debug!("Skipping {} (already processed)", file_name);
                    summary.skipped += 1;
                }
                Ok(Some(ImportOutcome::Imported { .. })) => summary.imported += 1,
                Ok(Some(ImportOutcome::AlreadyPresent { .. })) => summary.already_present += 1,
                Err(e) => {
                    warn!("Failed to process {}: {}", file_name, e);
                    summary.failed += 1;
                    summary.failures.push(format!("{}: {}", file_name, e));
                }
            }
        }

        info!(
            "Import finished: {} imported, {} already present, {} skipped, {} failed",
            summary.imported, summary.already_present, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Run the change check for one file and import it when due.
    ///
    /// Returns `Ok(None)` when the file is unchanged since it was recorded.
    fn import_if_due(
        &mut self,
        path: &Path,
        file_name: &str,
    ) -> Result<Option<ImportOutcome>, ImportError> {
        let digest = fingerprint::fingerprint_file(path)?;
        if !bookkeeping::is_new_or_changed(self.store.conn(), file_name, &digest)? {
            return Ok(None);
        }

        info!("Processing {}", file_name);
        let outcome = self.import_one(path)?;
        bookkeeping::mark_processed(self.store.conn(), file_name, &digest)?;
        Ok(Some(outcome))
    }

    /// Import one match file in a single transaction.
    ///
    /// On error nothing from this file is left in the store.
    pub fn import_one(&mut self, path: &Path) -> Result<ImportOutcome, ImportError> {
        let file_name = display_name(path);
        let match_id = MatchId::from_file_name(path).ok_or_else(|| ImportError::MalformedInput {
            file: file_name.clone(),
            reason: "file name has no usable stem".to_string(),
        })?;

        let bytes = fs::read(path)?;
        let document = decode_document(&file_name, &bytes)?;

        if self.store.match_exists(&match_id)? {
            warn!("Match {} already exists in database, skipping", match_id);
            return Ok(ImportOutcome::AlreadyPresent { match_id });
        }

        let parsed = validate_match(&file_name, document)?;

        let started_at = Utc::now().timestamp();
        let tx = self.store.transaction()?;
        write_match(&tx, &match_id, &parsed, started_at)?;
        tx.commit()?;

        info!(
            "Imported match {} from {} (winner: {}, players: {})",
            match_id,
            file_name,
            parsed.winning_team,
            parsed.players.len()
        );
        Ok(ImportOutcome::Imported {
            match_id,
            players: parsed.players.len(),
        })
    }

    /// Regular files in `dir` with the match extension, sorted by name.
    ///
    /// Only failing to open `dir` itself is an error.
    fn list_match_files(&self, dir: &Path) -> Result<MatchListing, ImportError> {
        let entries = fs::read_dir(dir)?.map(|entry| entry.map(|e| e.path()));
        Ok(self.filter_entries(entries))
    }

    fn filter_entries(
        &self,
        entries: impl IntoIterator<Item = io::Result<PathBuf>>,
    ) -> MatchListing {
        let extension = OsStr::new(&self.extension);
        let mut listing = MatchListing::default();

        for entry in entries {
            match entry {
                Ok(path) => {
                    if path.extension() == Some(extension) && path.is_file() {
                        listing.files.push(path);
                    }
                }
                Err(e) => {
                    warn!("Unreadable directory entry: {}", e);
                    listing.unreadable.push(format!("<unreadable entry>: {}", e));
                }
            }
        }
        listing.files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        listing
    }
}

/// Match files found in a directory.
#[derive(Debug, Default)]
struct MatchListing {
    files: Vec<PathBuf>,

    /// One line per entry that could not be read
    unreadable: Vec<String>,
}

fn malformed(file_name: &str, reason: impl Into<String>) -> ImportError {
    ImportError::MalformedInput {
        file: file_name.to_string(),
        reason: reason.into(),
    }
}

/// Parse and validate the bytes of a match file.
pub fn parse_match(file_name: &str, bytes: &[u8]) -> Result<MatchFile, ImportError> {
    let document = decode_document(file_name, bytes)?;
    validate_match(file_name, document)
}

/// Decode the bytes of a match file as JSON without checking its fields.
pub fn decode_document(file_name: &str, bytes: &[u8]) -> Result<serde_json::Value, ImportError> {
    serde_json::from_slice(bytes).map_err(|e| malformed(file_name, e.to_string()))
}

/// Check a decoded document against the match file format.
pub fn validate_match(
    file_name: &str,
    document: serde_json::Value,
) -> Result<MatchFile, ImportError> {
    let parsed =
        MatchFile::from_value(document).map_err(|e| malformed(file_name, e.to_string()))?;

    if parsed.players.is_empty() {
        return Err(malformed(file_name, "match has no players"));
    }
    if let Some(idx) = parsed
        .players
        .iter()
        .position(|p| p.player_name.trim().is_empty())
    {
        return Err(malformed(
            file_name,
            format!("player {} has an empty player_name", idx),
        ));
    }

    Ok(parsed)
}

/// Insert the match row, any new players and one stat line per player.
fn write_match(
    tx: &Transaction<'_>,
    match_id: &MatchId,
    file: &MatchFile,
    started_at: i64,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO matches (
             match_id, description, start_time, duration, radiant_win,
             game_mode, lobby_type, cluster
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            match_id.as_str(),
            file.description_or_default(),
            started_at,
            0i64,
            file.radiant_win(),
            DEFAULT_GAME_MODE,
            DEFAULT_LOBBY_TYPE,
            DEFAULT_CLUSTER,
        ],
    )?;

    let mut add_player = tx.prepare("INSERT OR IGNORE INTO players (personaname) VALUES (?1)")?;
    let mut add_stat = tx.prepare(
        "INSERT INTO player_match_stats (
             match_id, player_name, hero, team, kills, deaths, assists,
             gold, net_worth, items, abilities, win
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;

    for player in &file.players {
        add_player.execute([player.player_name.as_str()])?;
        add_stat.execute(params![
            match_id.as_str(),
            player.player_name,
            player.hero,
            player.team,
            player.kills,
            player.deaths,
            player.assists,
            0i64,
            player.net_worth,
            "",
            "",
            player.winner,
        ])?;
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
