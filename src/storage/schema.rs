//! SQLite schema shared by the importer and the dashboard.
//!
//! Column names are a contract: the dashboard queries them by name.

use rusqlite::Connection;

/// Default game mode code written for imported matches (All Pick).
pub const DEFAULT_GAME_MODE: i64 = 22;

/// Default lobby type code written for imported matches.
pub const DEFAULT_LOBBY_TYPE: i64 = 0;

/// Default cluster code written for imported matches.
pub const DEFAULT_CLUSTER: i64 = 0;

/// Tables in deletion order (children before parents).
pub const TABLES: [&str; 4] = [
    "player_match_stats",
    "matches",
    "players",
    "processed_files",
];

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS matches (
    match_id TEXT PRIMARY KEY,
    description TEXT,
    start_time INTEGER,
    duration INTEGER,
    radiant_win BOOLEAN,
    game_mode INTEGER,
    lobby_type INTEGER,
    cluster INTEGER,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS players (
    account_id INTEGER PRIMARY KEY,
    personaname TEXT NOT NULL UNIQUE,
    avatar TEXT,
    last_updated TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS player_match_stats (
    match_id TEXT NOT NULL,
    player_name TEXT NOT NULL,
    hero TEXT,
    team TEXT,
    kills INTEGER,
    deaths INTEGER,
    assists INTEGER,
    gold INTEGER,
    net_worth INTEGER,
    items TEXT,
    abilities TEXT,
    win BOOLEAN,
    PRIMARY KEY (match_id, player_name),
    FOREIGN KEY (match_id) REFERENCES matches(match_id)
);

CREATE TABLE IF NOT EXISTS processed_files (
    file_name TEXT PRIMARY KEY,
    file_hash TEXT NOT NULL,
    processed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Create all four tables if they are absent. Never drops or alters data.
pub fn create_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
