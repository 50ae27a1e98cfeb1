//! Core data models for the importer and dashboard.

mod ids;
mod match_file;
mod stats;

pub use ids::*;
pub use match_file::*;
pub use stats::*;
