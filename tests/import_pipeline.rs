use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use dotabowl::ingest::bookkeeping;
use dotabowl::ingest::{ImportError, ImportSummary, Importer};
use dotabowl::storage::{queries, Store, TableCounts};
use dotabowl::MatchId;

const MATCH_001: &str = r#"{
    "winning_team": "Radiant",
    "description": "Dotabowl opener",
    "players": [
        {"player_name": "Alice", "hero": "Axe", "team": "Radiant",
         "kills": 10, "deaths": 2, "assists": 7, "net_worth": 21000, "winner": true},
        {"player_name": "Bob", "hero": "Lion", "team": "Dire",
         "kills": 1, "deaths": 9, "assists": 4, "net_worth": 8000, "winner": false}
    ]
}"#;

const MATCH_002: &str = r#"{
    "winning_team": "dire",
    "players": [
        {"player_name": "Alice", "hero": "Pudge", "team": "Dire",
         "kills": 4, "deaths": 4, "assists": 12, "net_worth": 15000, "winner": true},
        {"player_name": "Carol", "hero": "Zeus", "team": "Radiant",
         "kills": 6, "deaths": 5, "assists": 2, "net_worth": 13000, "winner": false}
    ]
}"#;

const MISSING_NET_WORTH: &str = r#"{
    "winning_team": "Radiant",
    "players": [
        {"player_name": "Dave", "hero": "Sven", "team": "Radiant",
         "kills": 3, "deaths": 1, "assists": 1, "net_worth": 9000, "winner": true},
        {"player_name": "Erin", "hero": "Lina", "team": "Dire",
         "kills": 2, "deaths": 3, "assists": 4, "winner": false}
    ]
}"#;

struct Fixture {
    _root: TempDir,
    match_dir: std::path::PathBuf,
    db_path: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let match_dir = root.path().join("match_data");
        std::fs::create_dir_all(&match_dir).unwrap();
        let db_path = root.path().join("data").join("db").join("dota_ai.db");
        Self {
            _root: root,
            match_dir,
            db_path,
        }
    }

    fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.match_dir.join(name), contents).unwrap();
    }

    fn run(&self) -> ImportSummary {
        let mut store = Store::connect(&self.db_path).unwrap();
        Importer::new(&mut store).import_all(&self.match_dir).unwrap()
    }

    fn store(&self) -> Store {
        Store::open_existing(&self.db_path).unwrap()
    }
}

/// Full dump of the business tables, used to compare store contents.
fn snapshot(store: &Store) -> Vec<String> {
    let conn = store.conn();
    let mut rows = Vec::new();
    for sql in [
        "SELECT match_id || '|' || description || '|' || start_time || '|' || radiant_win FROM matches ORDER BY match_id",
        "SELECT account_id || '|' || personaname FROM players ORDER BY account_id",
        "SELECT match_id || '|' || player_name || '|' || kills || '|' || win FROM player_match_stats ORDER BY match_id, player_name",
        "SELECT file_name || '|' || file_hash || '|' || processed_at FROM processed_files ORDER BY file_name",
    ] {
        let mut stmt = conn.prepare(sql).unwrap();
        let values: Vec<String> = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        rows.extend(values);
    }
    rows
}

fn count_for_match(store: &Store, table: &str, match_id: &str) -> i64 {
    store
        .conn()
        .query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE match_id = ?1", table),
            [match_id],
            |row| row.get(0),
        )
        .unwrap()
}

fn digest_of(path: &Path) -> String {
    dotabowl::ingest::fingerprint::fingerprint_file(path).unwrap()
}

#[test]
fn test_end_to_end_single_match() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);

    let summary = fx.run();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.failed, 0);

    let store = fx.store();
    let matches = queries::list_matches(store.conn()).unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].match_id, "match_001");
    assert!(matches[0].radiant_win);
    assert_eq!(matches[0].description, "Dotabowl opener");

    let counts = store.table_counts().unwrap();
    assert_eq!(
        counts,
        TableCounts {
            matches: 1,
            players: 2,
            player_match_stats: 2,
            processed_files: 1,
        }
    );

    let alice = queries::player_stats(store.conn(), "Alice").unwrap();
    let bob = queries::player_stats(store.conn(), "Bob").unwrap();
    assert!(alice[0].win);
    assert!(!bob[0].win);
    assert_eq!(bob[0].team, "Dire");

    assert_eq!(
        bookkeeping::processed_digest(store.conn(), "match_001.json")
            .unwrap()
            .as_deref(),
        Some(digest_of(&fx.match_dir.join("match_001.json")).as_str())
    );
    drop(store);

    let second = fx.run();
    assert_eq!(second.imported, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(fx.store().table_counts().unwrap(), counts);
}

#[test]
fn test_second_run_is_idempotent() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.write("match_002.json", MATCH_002);

    let first = fx.run();
    assert_eq!(first.imported, 2);
    let before = snapshot(&fx.store());

    let second = fx.run();
    assert_eq!(second.processed(), 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(snapshot(&fx.store()), before);
}

#[test]
fn test_changed_file_with_existing_match_is_already_present() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.run();
    let before = snapshot(&fx.store());

    // Same name, different bytes: reprocessed, but the match row is immutable.
    fx.write("match_001.json", &MATCH_001.replace("\"kills\": 10", "\"kills\": 99"));
    let summary = fx.run();
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.imported, 0);
    assert_eq!(summary.already_present, 1);

    let store = fx.store();
    let alice = queries::player_stats(store.conn(), "Alice").unwrap();
    assert_eq!(alice[0].kills, 10);
    assert_eq!(store.table_counts().unwrap().player_match_stats, 2);

    // The new fingerprint is recorded, so the next run skips it.
    assert_eq!(
        bookkeeping::processed_digest(store.conn(), "match_001.json")
            .unwrap()
            .as_deref(),
        Some(digest_of(&fx.match_dir.join("match_001.json")).as_str())
    );
    assert_ne!(snapshot(&store), before);
    drop(store);

    assert_eq!(fx.run().skipped, 1);
}

#[test]
fn test_stored_match_with_missing_field_is_already_present() {
    let fx = Fixture::new();
    fx.write("m1.json", MATCH_001);
    assert_eq!(fx.run().imported, 1);

    // Still valid JSON, but one participant lost a required field.
    fx.write("m1.json", &MATCH_001.replace(", \"net_worth\": 8000", ""));
    let second = fx.run();
    assert_eq!(second.already_present, 1);
    assert_eq!(second.failed, 0);

    let store = fx.store();
    assert_eq!(
        bookkeeping::processed_digest(store.conn(), "m1.json")
            .unwrap()
            .as_deref(),
        Some(digest_of(&fx.match_dir.join("m1.json")).as_str())
    );
    assert_eq!(count_for_match(&store, "player_match_stats", "m1"), 2);
    drop(store);

    let third = fx.run();
    assert_eq!(third.skipped, 1);
    assert_eq!(third.failed, 0);
}

#[test]
fn test_renamed_identical_file_is_processed_again() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.run();

    fx.write("match_001_copy.json", MATCH_001);
    let summary = fx.run();
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.imported, 1);

    let store = fx.store();
    assert!(store.match_exists(&MatchId::from("match_001_copy")).unwrap());
    // players are shared by name
    assert_eq!(store.table_counts().unwrap().players, 2);
}

#[test]
fn test_failed_file_leaves_no_partial_rows() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.write("match_bad.json", MISSING_NET_WORTH);

    let summary = fx.run();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].starts_with("match_bad.json"));

    let store = fx.store();
    assert_eq!(count_for_match(&store, "matches", "match_bad"), 0);
    assert_eq!(count_for_match(&store, "player_match_stats", "match_bad"), 0);
    assert_eq!(
        bookkeeping::processed_digest(store.conn(), "match_bad.json").unwrap(),
        None
    );
    assert!(queries::player_stats(store.conn(), "Dave").unwrap().is_empty());
}

#[test]
fn test_failed_file_is_retried_until_fixed() {
    let fx = Fixture::new();
    fx.write("match_003.json", "{ this is not json");

    assert_eq!(fx.run().failed, 1);
    // unchanged bad file is retried, not skipped
    let again = fx.run();
    assert_eq!(again.failed, 1);
    assert_eq!(again.skipped, 0);

    fx.write("match_003.json", MATCH_002);
    let fixed = fx.run();
    assert_eq!(fixed.imported, 1);
    assert_eq!(fixed.failed, 0);
    assert!(fx
        .store()
        .match_exists(&MatchId::from("match_003"))
        .unwrap());
}

#[test]
fn test_mid_transaction_failure_rolls_back() {
    let fx = Fixture::new();
    // Duplicate participant violates the (match_id, player_name) key after
    // the match row and first stat line have been written.
    let duplicated = MATCH_001.replace("\"Bob\"", "\"Alice\"");
    fx.write("match_dup.json", &duplicated);

    let summary = fx.run();
    assert_eq!(summary.failed, 1);

    let store = fx.store();
    assert_eq!(count_for_match(&store, "matches", "match_dup"), 0);
    assert_eq!(count_for_match(&store, "player_match_stats", "match_dup"), 0);
    assert_eq!(store.table_counts().unwrap().players, 0);
}

#[test]
fn test_same_player_across_matches() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.write("match_002.json", MATCH_002);
    fx.run();

    let store = fx.store();
    let alice_rows: i64 = store
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM players WHERE personaname = 'Alice'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(alice_rows, 1);
    assert_eq!(store.table_counts().unwrap().players, 3);
    assert_eq!(queries::player_stats(store.conn(), "Alice").unwrap().len(), 2);

    let summaries = queries::player_summaries(store.conn()).unwrap();
    assert_eq!(summaries[0].player, "Alice");
    assert_eq!(summaries[0].matches, 2);
    assert_eq!(summaries[0].wins, 2);
}

#[test]
fn test_lowercase_dire_winner() {
    let fx = Fixture::new();
    fx.write("match_002.json", MATCH_002);
    fx.run();

    let matches = queries::list_matches(fx.store().conn()).unwrap();
    assert!(!matches[0].radiant_win);
    assert_eq!(matches[0].description, "");
}

#[test]
fn test_non_matching_files_and_subdirectories_ignored() {
    let fx = Fixture::new();
    fx.write("README.md", "not a match");
    std::fs::create_dir_all(fx.match_dir.join("archive")).unwrap();
    std::fs::write(fx.match_dir.join("archive").join("old.json"), MATCH_001).unwrap();

    let summary = fx.run();
    assert_eq!(summary, ImportSummary::default());
    assert_eq!(fx.store().table_counts().unwrap().total(), 0);
}

#[test]
fn test_missing_directory_is_fatal() {
    let fx = Fixture::new();
    let mut store = Store::connect(&fx.db_path).unwrap();

    let err = Importer::new(&mut store)
        .import_all(&fx.match_dir.join("does_not_exist"))
        .unwrap_err();
    assert!(matches!(err, ImportError::MissingDirectory(_)));
    assert_eq!(store.table_counts().unwrap().total(), 0);
}

#[test]
fn test_clear_all_then_reimport() {
    let fx = Fixture::new();
    fx.write("match_001.json", MATCH_001);
    fx.run();

    let mut store = fx.store();
    assert_eq!(store.clear_all().unwrap().total(), 0);
    drop(store);

    // bookkeeping was wiped too, so everything is imported again
    let summary = fx.run();
    assert_eq!(summary.imported, 1);
}
