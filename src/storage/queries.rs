//! Read-only aggregate queries backing the dashboard.

use rusqlite::{Connection, Row};

use crate::models::{MatchRow, PlayerMatchStat, PlayerSummary, TeamPerformance};

/// All matches, most recently created first.
pub fn list_matches(conn: &Connection) -> rusqlite::Result<Vec<MatchRow>> {
    let mut stmt = conn.prepare(
        "SELECT match_id, description, start_time, duration, radiant_win,
                game_mode, lobby_type, cluster, created_at
         FROM matches
         ORDER BY created_at DESC, match_id DESC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(MatchRow {
            match_id: row.get(0)?,
            description: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            start_time: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
            duration: row.get::<_, Option<i64>>(3)?.unwrap_or_default(),
            radiant_win: row.get::<_, Option<bool>>(4)?.unwrap_or_default(),
            game_mode: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
            lobby_type: row.get::<_, Option<i64>>(6)?.unwrap_or_default(),
            cluster: row.get::<_, Option<i64>>(7)?.unwrap_or_default(),
            created_at: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        })
    })?;
    let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(collected)
}

/// Totals per player, most matches first.
pub fn player_summaries(conn: &Connection) -> rusqlite::Result<Vec<PlayerSummary>> {
    let mut stmt = conn.prepare(
        "SELECT player_name,
                COUNT(match_id),
                COALESCE(SUM(win), 0),
                COALESCE(SUM(kills), 0),
                COALESCE(SUM(deaths), 0),
                COALESCE(SUM(assists), 0),
                COALESCE(SUM(net_worth), 0)
         FROM player_match_stats
         GROUP BY player_name
         ORDER BY COUNT(match_id) DESC, player_name ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PlayerSummary {
            player: row.get(0)?,
            matches: row.get(1)?,
            wins: row.get(2)?,
            kills: row.get(3)?,
            deaths: row.get(4)?,
            assists: row.get(5)?,
            net_worth: row.get(6)?,
        })
    })?;
    let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(collected)
}

/// Averages per team label, ordered by team.
pub fn team_performance(conn: &Connection) -> rusqlite::Result<Vec<TeamPerformance>> {
    let mut stmt = conn.prepare(
        "SELECT team,
                COUNT(*),
                COALESCE(AVG(kills), 0.0),
                COALESCE(AVG(deaths), 0.0),
                COALESCE(AVG(assists), 0.0),
                COALESCE(AVG(net_worth), 0.0),
                COALESCE(AVG(win), 0.0) * 100.0
         FROM player_match_stats
         GROUP BY team
         ORDER BY team ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(TeamPerformance {
            team: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
            games: row.get(1)?,
            avg_kills: row.get(2)?,
            avg_deaths: row.get(3)?,
            avg_assists: row.get(4)?,
            avg_net_worth: row.get(5)?,
            win_rate: row.get(6)?,
        })
    })?;
    let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(collected)
}

/// Every stat line for one player, ordered by match.
pub fn player_stats(
    conn: &Connection,
    player_name: &str,
) -> rusqlite::Result<Vec<PlayerMatchStat>> {
    let mut stmt = conn.prepare(
        "SELECT match_id, player_name, hero, team, kills, deaths, assists,
                gold, net_worth, items, abilities, win
         FROM player_match_stats
         WHERE player_name = ?1
         ORDER BY match_id ASC",
    )?;

    let rows = stmt.query_map([player_name], stat_from_row)?;
    let collected = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(collected)
}

fn stat_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerMatchStat> {
    Ok(PlayerMatchStat {
        match_id: row.get(0)?,
        player_name: row.get(1)?,
        hero: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        team: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        kills: row.get::<_, Option<i64>>(4)?.unwrap_or_default(),
        deaths: row.get::<_, Option<i64>>(5)?.unwrap_or_default(),
        assists: row.get::<_, Option<i64>>(6)?.unwrap_or_default(),
        gold: row.get::<_, Option<i64>>(7)?.unwrap_or_default(),
        net_worth: row.get::<_, Option<i64>>(8)?.unwrap_or_default(),
        items: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        abilities: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
        win: row.get::<_, Option<bool>>(11)?.unwrap_or_default(),
    })
}
