//! # Dotabowl
//!
//! Incremental importer for per-match Dota result files with a read-only
//! analytics dashboard over the resulting SQLite database.
//!
//! ## Architecture
//!
//! - **models**: Match file format, identifiers and dashboard rows
//! - **storage**: SQLite schema, store handle and read queries
//! - **ingest**: Fingerprinting, bookkeeping and the transactional importer
//! - **calculate**: Derived per-player metrics
//! - **api**: REST API endpoints for the dashboard
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod ingest;
pub mod models;
pub mod storage;

pub use models::*;

/// Whether an interactive confirmation answer means "yes".
///
/// Accepts `y` and `yes` in any case; everything else, including an empty
/// answer, is a refusal.
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
