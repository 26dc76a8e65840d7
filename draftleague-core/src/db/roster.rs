use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

// ============================================================
// Roster entries
// ============================================================

/// Fields of a roster entry supplied by the engines.
#[derive(Debug, Clone)]
pub struct NewRosterEntry {
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub artist_id: Uuid,
    pub prompt_id: Option<Uuid>,
    pub acquired_via: AcquiredVia,
    pub acquired_at_week: u32,
    pub acquired_at_round: u32,
    pub pool_entry_id: Option<Uuid>,
}

const ENTRY_COLUMNS: &str = "e.id, e.season_id, e.player_id, e.artist_id, e.prompt_id, e.status, e.acquired_via, \
     e.acquired_at_week, e.acquired_at_round, e.pool_entry_id, e.cut_at_week, e.created_at";

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<RosterEntry> {
    Ok(RosterEntry {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        player_id: parse_uuid(row.get(2)?),
        artist_id: parse_uuid(row.get(3)?),
        prompt_id: row.get::<_, Option<String>>(4)?.map(parse_uuid),
        status: RosterStatus::from_str(&row.get::<_, String>(5)?).unwrap_or(RosterStatus::Active),
        acquired_via: AcquiredVia::from_str(&row.get::<_, String>(6)?)
            .unwrap_or(AcquiredVia::Draft),
        acquired_at_week: row.get(7)?,
        acquired_at_round: row.get(8)?,
        pool_entry_id: row.get::<_, Option<String>>(9)?.map(parse_uuid),
        cut_at_week: row.get(10)?,
        created_at: parse_datetime(row.get(11)?),
    })
}

pub fn insert_entry(conn: &Connection, input: NewRosterEntry) -> LeagueResult<RosterEntry> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO roster_entries (id, season_id, player_id, artist_id, prompt_id, status, acquired_via,
                                     acquired_at_week, acquired_at_round, pool_entry_id, created_at)
         VALUES (?, ?, ?, ?, ?, 'active', ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.season_id.to_string(),
            input.player_id.to_string(),
            input.artist_id.to_string(),
            input.prompt_id.map(|u| u.to_string()),
            input.acquired_via.as_str(),
            input.acquired_at_week,
            input.acquired_at_round,
            input.pool_entry_id.map(|u| u.to_string()),
            &created_at,
        ),
    )?;

    Ok(RosterEntry {
        id,
        season_id: input.season_id,
        player_id: input.player_id,
        artist_id: input.artist_id,
        prompt_id: input.prompt_id,
        status: RosterStatus::Active,
        acquired_via: input.acquired_via,
        acquired_at_week: input.acquired_at_week,
        acquired_at_round: input.acquired_at_round,
        pool_entry_id: input.pool_entry_id,
        cut_at_week: None,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_entry(conn: &Connection, id: Uuid) -> LeagueResult<Option<RosterEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM roster_entries e WHERE e.id = ?"),
            [id.to_string()],
            entry_from_row,
        )
        .optional()?;
    Ok(entry)
}

/// Every roster entry of the season, oldest first.
pub fn list_entries(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<RosterEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM roster_entries e WHERE e.season_id = ? ORDER BY e.created_at, e.rowid"
    ))?;
    let entries = stmt
        .query_map([season_id.to_string()], entry_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

/// A player's roster with artist names, optionally filtered by status.
pub fn list_roster(
    conn: &Connection,
    player_id: Uuid,
    status: Option<RosterStatus>,
) -> LeagueResult<Vec<RosterSlot>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS}, a.name FROM roster_entries e
         JOIN artists a ON a.id = e.artist_id
         WHERE e.player_id = ?1 AND (?2 IS NULL OR e.status = ?2)
         ORDER BY e.acquired_at_week, e.acquired_at_round, e.rowid"
    ))?;
    let slots = stmt
        .query_map(
            (player_id.to_string(), status.map(|s| s.as_str())),
            |row| {
                Ok(RosterSlot {
                    entry: entry_from_row(row)?,
                    artist_name: row.get(12)?,
                })
            },
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(slots)
}

/// Whether an artist with this name (case-insensitive) sits on an active roster.
pub fn artist_name_is_active(conn: &Connection, season_id: Uuid, name: &str) -> LeagueResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM roster_entries e JOIN artists a ON a.id = e.artist_id
         WHERE e.season_id = ? AND e.status = 'active' AND lower(a.name) = lower(?)",
        (season_id.to_string(), name.trim()),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn mark_cut(conn: &Connection, id: Uuid, week: u32) -> LeagueResult<()> {
    conn.execute(
        "UPDATE roster_entries SET status = 'cut', cut_at_week = ? WHERE id = ?",
        (week, id.to_string()),
    )?;
    Ok(())
}

pub fn restore_active(conn: &Connection, id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE roster_entries SET status = 'active', cut_at_week = NULL WHERE id = ?",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn delete_entry(conn: &Connection, id: Uuid) -> LeagueResult<bool> {
    let rows = conn.execute("DELETE FROM roster_entries WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

// ============================================================
// Pool entries
// ============================================================

const POOL_COLUMNS: &str = "id, season_id, artist_id, roster_entry_id, cut_by_player_id, cut_at_week, status, \
     drafted_by_player_id, drafted_at_week, created_at";

fn pool_from_row(row: &Row<'_>) -> rusqlite::Result<PoolEntry> {
    Ok(PoolEntry {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        artist_id: parse_uuid(row.get(2)?),
        roster_entry_id: parse_uuid(row.get(3)?),
        cut_by_player_id: parse_uuid(row.get(4)?),
        cut_at_week: row.get(5)?,
        status: PoolStatus::from_str(&row.get::<_, String>(6)?).unwrap_or(PoolStatus::Available),
        drafted_by_player_id: row.get::<_, Option<String>>(7)?.map(parse_uuid),
        drafted_at_week: row.get(8)?,
        created_at: parse_datetime(row.get(9)?),
    })
}

pub fn insert_pool_entry(
    conn: &Connection,
    entry: &RosterEntry,
    week: u32,
) -> LeagueResult<PoolEntry> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO pool_entries (id, season_id, artist_id, roster_entry_id, cut_by_player_id, cut_at_week, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, 'available', ?)",
        (
            id.to_string(),
            entry.season_id.to_string(),
            entry.artist_id.to_string(),
            entry.id.to_string(),
            entry.player_id.to_string(),
            week,
            &created_at,
        ),
    )?;
    Ok(PoolEntry {
        id,
        season_id: entry.season_id,
        artist_id: entry.artist_id,
        roster_entry_id: entry.id,
        cut_by_player_id: entry.player_id,
        cut_at_week: week,
        status: PoolStatus::Available,
        drafted_by_player_id: None,
        drafted_at_week: None,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_pool_entry(conn: &Connection, id: Uuid) -> LeagueResult<Option<PoolEntry>> {
    let entry = conn
        .query_row(
            &format!("SELECT {POOL_COLUMNS} FROM pool_entries WHERE id = ?"),
            [id.to_string()],
            pool_from_row,
        )
        .optional()?;
    Ok(entry)
}

pub fn list_pool(
    conn: &Connection,
    season_id: Uuid,
    status: Option<PoolStatus>,
) -> LeagueResult<Vec<PoolEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {POOL_COLUMNS} FROM pool_entries
         WHERE season_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY created_at, rowid"
    ))?;
    let entries = stmt
        .query_map(
            (season_id.to_string(), status.map(|s| s.as_str())),
            pool_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn count_available_pool(conn: &Connection, season_id: Uuid) -> LeagueResult<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM pool_entries WHERE season_id = ? AND status = 'available'",
        [season_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Whether an available pool artist carries this name (case-insensitive).
pub fn artist_name_in_pool(conn: &Connection, season_id: Uuid, name: &str) -> LeagueResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pool_entries p JOIN artists a ON a.id = p.artist_id
         WHERE p.season_id = ? AND p.status = 'available' AND lower(a.name) = lower(?)",
        (season_id.to_string(), name.trim()),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn mark_pool_drafted(
    conn: &Connection,
    id: Uuid,
    player_id: Uuid,
    week: u32,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE pool_entries SET status = 'drafted', drafted_by_player_id = ?, drafted_at_week = ? WHERE id = ?",
        (player_id.to_string(), week, id.to_string()),
    )?;
    Ok(())
}

pub fn mark_pool_available(conn: &Connection, id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE pool_entries SET status = 'available', drafted_by_player_id = NULL, drafted_at_week = NULL WHERE id = ?",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn delete_pool_entry(conn: &Connection, id: Uuid) -> LeagueResult<bool> {
    let rows = conn.execute("DELETE FROM pool_entries WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}
