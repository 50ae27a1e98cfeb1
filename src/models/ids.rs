//! Match identifiers derived from source file names.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Identifier of a match, taken from the stem of its source file name.
///
/// `match_001.json` becomes `match_001`. Only the last extension is
/// stripped, so `final.v2.json` becomes `final.v2`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    /// Create a MatchId from an already-derived identifier.
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Derive a MatchId from a file name or path.
    ///
    /// Returns `None` when the path has no usable UTF-8 stem.
    pub fn from_file_name(path: impl AsRef<Path>) -> Option<Self> {
        let stem = path.as_ref().file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_string()))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatchId({})", self.0)
    }
}

impl From<&str> for MatchId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
