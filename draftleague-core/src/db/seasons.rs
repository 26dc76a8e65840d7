use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_json, parse_uuid};
use crate::config::SeasonConfig;
use crate::error::LeagueResult;
use crate::models::*;

// ============================================================
// Leagues
// ============================================================

pub fn insert_league(conn: &Connection, input: CreateLeagueInput) -> LeagueResult<League> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO leagues (id, name, commissioner_id, created_at) VALUES (?, ?, ?, ?)",
        (
            id.to_string(),
            &input.name,
            input.commissioner_id.to_string(),
            &created_at,
        ),
    )?;

    Ok(League {
        id,
        name: input.name,
        commissioner_id: input.commissioner_id,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_league(conn: &Connection, id: Uuid) -> LeagueResult<Option<League>> {
    let league = conn
        .query_row(
            "SELECT id, name, commissioner_id, created_at FROM leagues WHERE id = ?",
            [id.to_string()],
            |row| {
                Ok(League {
                    id: parse_uuid(row.get(0)?),
                    name: row.get(1)?,
                    commissioner_id: parse_uuid(row.get(2)?),
                    created_at: parse_datetime(row.get(3)?),
                })
            },
        )
        .optional()?;
    Ok(league)
}

// ============================================================
// Seasons
// ============================================================

const SEASON_COLUMNS: &str =
    "id, league_id, name, status, current_week, current_phase, config, created_at, updated_at";

fn season_from_row(row: &Row<'_>) -> rusqlite::Result<Season> {
    Ok(Season {
        id: parse_uuid(row.get(0)?),
        league_id: parse_uuid(row.get(1)?),
        name: row.get(2)?,
        status: SeasonStatus::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(SeasonStatus::Preseason),
        current_week: row.get(4)?,
        current_phase: SeasonPhase::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(SeasonPhase::Setup),
        config: parse_json(6, row.get(6)?)?,
        created_at: parse_datetime(row.get(7)?),
        updated_at: parse_datetime(row.get(8)?),
    })
}

pub fn insert_season(
    conn: &Connection,
    league_id: Uuid,
    name: &str,
    config: SeasonConfig,
) -> LeagueResult<Season> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO seasons (id, league_id, name, status, current_week, current_phase, config, created_at, updated_at)
         VALUES (?, ?, ?, ?, 0, ?, ?, ?, ?)",
        (
            id.to_string(),
            league_id.to_string(),
            name,
            SeasonStatus::Preseason.as_str(),
            SeasonPhase::Setup.as_str(),
            serde_json::to_string(&config)?,
            &created_at,
            &created_at,
        ),
    )?;

    let created = parse_datetime(created_at);
    Ok(Season {
        id,
        league_id,
        name: name.to_string(),
        status: SeasonStatus::Preseason,
        current_week: 0,
        current_phase: SeasonPhase::Setup,
        config,
        created_at: created,
        updated_at: created,
    })
}

pub fn get_season(conn: &Connection, id: Uuid) -> LeagueResult<Option<Season>> {
    let season = conn
        .query_row(
            &format!("SELECT {SEASON_COLUMNS} FROM seasons WHERE id = ?"),
            [id.to_string()],
            season_from_row,
        )
        .optional()?;
    Ok(season)
}

pub fn list_seasons(conn: &Connection, league_id: Uuid) -> LeagueResult<Vec<Season>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SEASON_COLUMNS} FROM seasons WHERE league_id = ? ORDER BY created_at"
    ))?;
    let seasons = stmt
        .query_map([league_id.to_string()], season_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(seasons)
}

/// Patch the phase ledger position of a season.
pub fn patch_position(
    conn: &Connection,
    id: Uuid,
    phase: SeasonPhase,
    week: u32,
    status: SeasonStatus,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE seasons SET current_phase = ?, current_week = ?, status = ?, updated_at = ? WHERE id = ?",
        (phase.as_str(), week, status.as_str(), now(), id.to_string()),
    )?;
    Ok(())
}

pub fn patch_config(conn: &Connection, id: Uuid, config: &SeasonConfig) -> LeagueResult<()> {
    conn.execute(
        "UPDATE seasons SET config = ?, updated_at = ? WHERE id = ?",
        (serde_json::to_string(config)?, now(), id.to_string()),
    )?;
    Ok(())
}

// ============================================================
// Season players
// ============================================================

const PLAYER_COLUMNS: &str =
    "id, season_id, user_id, display_name, draft_position, total_points, created_at";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<SeasonPlayer> {
    Ok(SeasonPlayer {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        user_id: parse_uuid(row.get(2)?),
        display_name: row.get(3)?,
        draft_position: row.get(4)?,
        total_points: row.get(5)?,
        created_at: parse_datetime(row.get(6)?),
    })
}

pub fn insert_player(
    conn: &Connection,
    season_id: Uuid,
    input: AddSeasonPlayerInput,
) -> LeagueResult<SeasonPlayer> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO season_players (id, season_id, user_id, display_name, total_points, created_at)
         VALUES (?, ?, ?, ?, 0, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            input.user_id.to_string(),
            &input.display_name,
            &created_at,
        ),
    )?;

    Ok(SeasonPlayer {
        id,
        season_id,
        user_id: input.user_id,
        display_name: input.display_name,
        draft_position: None,
        total_points: 0,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_player(conn: &Connection, id: Uuid) -> LeagueResult<Option<SeasonPlayer>> {
    let player = conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM season_players WHERE id = ?"),
            [id.to_string()],
            player_from_row,
        )
        .optional()?;
    Ok(player)
}

pub fn find_player_by_user(
    conn: &Connection,
    season_id: Uuid,
    user_id: Uuid,
) -> LeagueResult<Option<SeasonPlayer>> {
    let player = conn
        .query_row(
            &format!("SELECT {PLAYER_COLUMNS} FROM season_players WHERE season_id = ? AND user_id = ?"),
            (season_id.to_string(), user_id.to_string()),
            player_from_row,
        )
        .optional()?;
    Ok(player)
}

/// Players in enrollment order.
pub fn list_players(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<SeasonPlayer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM season_players WHERE season_id = ? ORDER BY created_at, rowid"
    ))?;
    let players = stmt
        .query_map([season_id.to_string()], player_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(players)
}

/// Players best-first: most points, then earliest draft position.
pub fn standings(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<SeasonPlayer>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PLAYER_COLUMNS} FROM season_players WHERE season_id = ?
         ORDER BY total_points DESC, draft_position IS NULL, draft_position, created_at, rowid"
    ))?;
    let players = stmt
        .query_map([season_id.to_string()], player_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(players)
}

pub fn set_draft_position(
    conn: &Connection,
    player_id: Uuid,
    position: Option<u32>,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE season_players SET draft_position = ? WHERE id = ?",
        (position, player_id.to_string()),
    )?;
    Ok(())
}

pub fn clear_draft_positions(conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
    let rows = conn.execute(
        "UPDATE season_players SET draft_position = NULL WHERE season_id = ?",
        [season_id.to_string()],
    )?;
    Ok(rows)
}

pub fn add_points(conn: &Connection, player_id: Uuid, points: i64) -> LeagueResult<()> {
    conn.execute(
        "UPDATE season_players SET total_points = total_points + ? WHERE id = ?",
        (points, player_id.to_string()),
    )?;
    Ok(())
}

/// Rebuild every player's total from the weekly results that remain.
pub fn recompute_total_points(conn: &Connection, season_id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE season_players SET total_points = COALESCE(
             (SELECT SUM(points) FROM weekly_results r WHERE r.player_id = season_players.id),
             0)
         WHERE season_id = ?",
        [season_id.to_string()],
    )?;
    Ok(())
}
