//! Rows read back from the store for the dashboard.

use serde::{Deserialize, Serialize};

/// A stored match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub match_id: String,
    pub description: String,

    /// Start time in epoch seconds
    pub start_time: i64,

    /// Duration in seconds (0 when unknown)
    pub duration: i64,
    pub radiant_win: bool,
    pub game_mode: i64,
    pub lobby_type: i64,
    pub cluster: i64,
    pub created_at: String,
}

impl MatchRow {
    /// Label of the winning side.
    pub fn winner(&self) -> &'static str {
        if self.radiant_win {
            "Radiant"
        } else {
            "Dire"
        }
    }
}

/// One player's line in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchStat {
    pub match_id: String,
    pub player_name: String,
    pub hero: String,
    pub team: String,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub gold: i64,
    pub net_worth: i64,
    pub items: String,
    pub abilities: String,
    pub win: bool,
}

/// Totals per player across all matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player: String,
    pub matches: i64,
    pub wins: i64,
    pub kills: i64,
    pub deaths: i64,
    pub assists: i64,
    pub net_worth: i64,
}

/// Averages per team label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPerformance {
    pub team: String,
    pub games: i64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub avg_net_worth: f64,

    /// Percentage of rows with `win` set (0.0 to 100.0)
    pub win_rate: f64,
}

/// Per-player breakdown with averages and the raw match lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub player: String,
    pub total_games: u32,
    pub win_rate: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    pub matches: Vec<PlayerMatchStat>,
}
