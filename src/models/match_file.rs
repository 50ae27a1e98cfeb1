//! Match file input format.
//!
//! One JSON document per match:
//!
//! ```json
//! { "winning_team": "Radiant", "description": "Game 1",
//!   "players": [ { "player_name": "Alice", "hero": "Axe", "team": "Radiant",
//!                  "kills": 10, "deaths": 2, "assists": 7,
//!                  "net_worth": 21000, "winner": true } ] }
//! ```
//!
//! Unknown keys are ignored so exporters can add fields freely.

use serde::{Deserialize, Serialize};

/// A parsed match file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFile {
    /// Winning side. Compared case-insensitively against "radiant".
    pub winning_team: String,

    /// Free-text description of the match
    #[serde(default)]
    pub description: Option<String>,

    /// One record per participating player
    pub players: Vec<ParticipantRecord>,
}

impl MatchFile {
    /// Parse a match file from raw bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Convert an already decoded JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether the Radiant side won.
    pub fn radiant_win(&self) -> bool {
        self.winning_team.trim().eq_ignore_ascii_case("radiant")
    }

    /// Description, or an empty string when the file has none.
    pub fn description_or_default(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// One player's statistics line within a match file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub player_name: String,
    pub hero: String,
    pub team: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub net_worth: i64,

    /// Whether this player's team won
    pub winner: bool,
}
