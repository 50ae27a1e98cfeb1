//! Statistics calculation for the dashboard.
//!
//! Computes derived per-player metrics from stored stat lines:
//! - Win rate as a percentage
//! - Average kills/deaths/assists

use crate::models::{PlayerDetail, PlayerMatchStat};

/// Win rate in percent (0.0 to 100.0).
pub fn calculate_win_rate(wins: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        wins as f64 / games as f64 * 100.0
    }
}

/// Mean of `values`, 0.0 when empty.
pub fn mean(values: impl IntoIterator<Item = i64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Build the detail view for one player from their stat lines.
///
/// Returns `None` when the player has no recorded matches.
pub fn player_detail(player: &str, matches: Vec<PlayerMatchStat>) -> Option<PlayerDetail> {
    if matches.is_empty() {
        return None;
    }

    let total_games = matches.len() as u32;
    let wins = matches.iter().filter(|m| m.win).count() as u32;

    Some(PlayerDetail {
        player: player.to_string(),
        total_games,
        win_rate: calculate_win_rate(wins, total_games),
        avg_kills: mean(matches.iter().map(|m| m.kills)),
        avg_deaths: mean(matches.iter().map(|m| m.deaths)),
        avg_assists: mean(matches.iter().map(|m| m.assists)),
        matches,
    })
}
