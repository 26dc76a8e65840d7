use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_json, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

// ============================================================
// Draft state
// ============================================================

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<DraftState> {
    Ok(DraftState {
        season_id: parse_uuid(row.get(0)?),
        current_round: row.get(1)?,
        current_picker_index: row.get::<_, i64>(2)? as usize,
        draft_order: parse_json(3, row.get(3)?)?,
        is_complete: row.get::<_, i32>(4)? != 0,
        created_at: parse_datetime(row.get(5)?),
        updated_at: parse_datetime(row.get(6)?),
    })
}

pub fn get_state(conn: &Connection, season_id: Uuid) -> LeagueResult<Option<DraftState>> {
    let state = conn
        .query_row(
            "SELECT season_id, current_round, current_picker_index, draft_order, is_complete, created_at, updated_at
             FROM draft_states WHERE season_id = ?",
            [season_id.to_string()],
            state_from_row,
        )
        .optional()?;
    Ok(state)
}

/// Create (or replace) the draft state at round 1, first picker.
pub fn insert_state(
    conn: &Connection,
    season_id: Uuid,
    draft_order: Vec<Uuid>,
) -> LeagueResult<DraftState> {
    let created_at = now();
    conn.execute(
        "INSERT OR REPLACE INTO draft_states (season_id, current_round, current_picker_index, draft_order, is_complete, created_at, updated_at)
         VALUES (?, 1, 0, ?, 0, ?, ?)",
        (
            season_id.to_string(),
            serde_json::to_string(&draft_order)?,
            &created_at,
            &created_at,
        ),
    )?;

    let created = parse_datetime(created_at);
    Ok(DraftState {
        season_id,
        current_round: 1,
        current_picker_index: 0,
        draft_order,
        is_complete: false,
        created_at: created,
        updated_at: created,
    })
}

pub fn patch_cursor(
    conn: &Connection,
    season_id: Uuid,
    round: u32,
    picker_index: usize,
    is_complete: bool,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE draft_states SET current_round = ?, current_picker_index = ?, is_complete = ?, updated_at = ?
         WHERE season_id = ?",
        (
            round,
            picker_index as i64,
            is_complete,
            now(),
            season_id.to_string(),
        ),
    )?;
    Ok(())
}

pub fn delete_state(conn: &Connection, season_id: Uuid) -> LeagueResult<bool> {
    let rows = conn.execute(
        "DELETE FROM draft_states WHERE season_id = ?",
        [season_id.to_string()],
    )?;
    Ok(rows > 0)
}

// ============================================================
// Categories & prompts
// ============================================================

pub fn insert_category(
    conn: &Connection,
    season_id: Uuid,
    input: CreateCategoryInput,
) -> LeagueResult<DraftCategory> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO draft_categories (id, season_id, name, created_at) VALUES (?, ?, ?, ?)",
        (id.to_string(), season_id.to_string(), &input.name, &created_at),
    )?;
    Ok(DraftCategory {
        id,
        season_id,
        name: input.name,
        created_at: parse_datetime(created_at),
    })
}

pub fn list_categories(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<DraftCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, name, created_at FROM draft_categories WHERE season_id = ? ORDER BY name",
    )?;
    let categories = stmt
        .query_map([season_id.to_string()], |row| {
            Ok(DraftCategory {
                id: parse_uuid(row.get(0)?),
                season_id: parse_uuid(row.get(1)?),
                name: row.get(2)?,
                created_at: parse_datetime(row.get(3)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

pub fn category_exists(conn: &Connection, season_id: Uuid, id: Uuid) -> LeagueResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM draft_categories WHERE id = ? AND season_id = ?",
        (id.to_string(), season_id.to_string()),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

const PROMPT_COLUMNS: &str =
    "id, season_id, category_id, text, status, selected_by_player_id, selected_at_round, created_at";

fn prompt_from_row(row: &Row<'_>) -> rusqlite::Result<DraftPrompt> {
    Ok(DraftPrompt {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        category_id: parse_uuid(row.get(2)?),
        text: row.get(3)?,
        status: PromptStatus::from_str(&row.get::<_, String>(4)?).unwrap_or(PromptStatus::Open),
        selected_by_player_id: row.get::<_, Option<String>>(5)?.map(parse_uuid),
        selected_at_round: row.get(6)?,
        created_at: parse_datetime(row.get(7)?),
    })
}

pub fn insert_prompt(
    conn: &Connection,
    season_id: Uuid,
    input: CreatePromptInput,
) -> LeagueResult<DraftPrompt> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO draft_prompts (id, season_id, category_id, text, status, created_at)
         VALUES (?, ?, ?, ?, 'open', ?)",
        (
            id.to_string(),
            season_id.to_string(),
            input.category_id.to_string(),
            &input.text,
            &created_at,
        ),
    )?;
    Ok(DraftPrompt {
        id,
        season_id,
        category_id: input.category_id,
        text: input.text,
        status: PromptStatus::Open,
        selected_by_player_id: None,
        selected_at_round: None,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_prompt(conn: &Connection, id: Uuid) -> LeagueResult<Option<DraftPrompt>> {
    let prompt = conn
        .query_row(
            &format!("SELECT {PROMPT_COLUMNS} FROM draft_prompts WHERE id = ?"),
            [id.to_string()],
            prompt_from_row,
        )
        .optional()?;
    Ok(prompt)
}

pub fn list_prompts(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<DraftPrompt>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROMPT_COLUMNS} FROM draft_prompts WHERE season_id = ? ORDER BY created_at, rowid"
    ))?;
    let prompts = stmt
        .query_map([season_id.to_string()], prompt_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(prompts)
}

/// The prompt currently selected for `round`, if any.
pub fn selected_prompt_for_round(
    conn: &Connection,
    season_id: Uuid,
    round: u32,
) -> LeagueResult<Option<DraftPrompt>> {
    let prompt = conn
        .query_row(
            &format!(
                "SELECT {PROMPT_COLUMNS} FROM draft_prompts
                 WHERE season_id = ? AND status = 'selected' AND selected_at_round = ?
                 ORDER BY rowid LIMIT 1"
            ),
            (season_id.to_string(), round),
            prompt_from_row,
        )
        .optional()?;
    Ok(prompt)
}

pub fn mark_prompt_selected(
    conn: &Connection,
    id: Uuid,
    player_id: Uuid,
    round: u32,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE draft_prompts SET status = 'selected', selected_by_player_id = ?, selected_at_round = ? WHERE id = ?",
        (player_id.to_string(), round, id.to_string()),
    )?;
    Ok(())
}

/// Retire a prompt, clearing its selector and round.
pub fn retire_prompt(conn: &Connection, id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE draft_prompts SET status = 'retired', selected_by_player_id = NULL, selected_at_round = NULL WHERE id = ?",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn reopen_prompt(conn: &Connection, id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE draft_prompts SET status = 'open', selected_by_player_id = NULL, selected_at_round = NULL WHERE id = ?",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn reopen_all_prompts(conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
    let rows = conn.execute(
        "UPDATE draft_prompts SET status = 'open', selected_by_player_id = NULL, selected_at_round = NULL
         WHERE season_id = ?",
        [season_id.to_string()],
    )?;
    Ok(rows)
}

// ============================================================
// Artists
// ============================================================

fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        name: row.get(2)?,
        created_at: parse_datetime(row.get(3)?),
    })
}

pub fn insert_artist(conn: &Connection, season_id: Uuid, name: &str) -> LeagueResult<Artist> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO artists (id, season_id, name, created_at) VALUES (?, ?, ?, ?)",
        (id.to_string(), season_id.to_string(), name, &created_at),
    )?;
    Ok(Artist {
        id,
        season_id,
        name: name.to_string(),
        created_at: parse_datetime(created_at),
    })
}

pub fn get_artist(conn: &Connection, id: Uuid) -> LeagueResult<Option<Artist>> {
    let artist = conn
        .query_row(
            "SELECT id, season_id, name, created_at FROM artists WHERE id = ?",
            [id.to_string()],
            artist_from_row,
        )
        .optional()?;
    Ok(artist)
}

/// Case-insensitive lookup of an existing artist row.
pub fn find_artist_by_name(
    conn: &Connection,
    season_id: Uuid,
    name: &str,
) -> LeagueResult<Option<Artist>> {
    let artist = conn
        .query_row(
            "SELECT id, season_id, name, created_at FROM artists
             WHERE season_id = ? AND lower(name) = lower(?) ORDER BY rowid LIMIT 1",
            (season_id.to_string(), name),
            artist_from_row,
        )
        .optional()?;
    Ok(artist)
}

pub fn delete_artist(conn: &Connection, id: Uuid) -> LeagueResult<bool> {
    let rows = conn.execute("DELETE FROM artists WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

/// Delete artists that no roster entry or pool entry references any more.
pub fn delete_orphan_artists(conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
    let rows = conn.execute(
        "DELETE FROM artists WHERE season_id = ?1
           AND id NOT IN (SELECT artist_id FROM roster_entries WHERE season_id = ?1)
           AND id NOT IN (SELECT artist_id FROM pool_entries WHERE season_id = ?1)",
        [season_id.to_string()],
    )?;
    Ok(rows)
}

// ============================================================
// Picks
// ============================================================

pub fn insert_pick(
    conn: &Connection,
    season_id: Uuid,
    round: u32,
    player_id: Uuid,
    prompt_id: Uuid,
    artist_id: Uuid,
    roster_entry_id: Uuid,
) -> LeagueResult<DraftPick> {
    let id = Uuid::new_v4();
    let created_at = now();
    let pick_number = count_picks(conn, season_id)? + 1;
    conn.execute(
        "INSERT INTO draft_picks (id, season_id, round, pick_number, player_id, prompt_id, artist_id, roster_entry_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            round,
            pick_number,
            player_id.to_string(),
            prompt_id.to_string(),
            artist_id.to_string(),
            roster_entry_id.to_string(),
            &created_at,
        ),
    )?;
    Ok(DraftPick {
        id,
        season_id,
        round,
        pick_number,
        player_id,
        prompt_id,
        artist_id,
        roster_entry_id,
        created_at: parse_datetime(created_at),
    })
}

pub fn list_picks(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<DraftPick>> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, round, pick_number, player_id, prompt_id, artist_id, roster_entry_id, created_at
         FROM draft_picks WHERE season_id = ? ORDER BY pick_number",
    )?;
    let picks = stmt
        .query_map([season_id.to_string()], |row| {
            Ok(DraftPick {
                id: parse_uuid(row.get(0)?),
                season_id: parse_uuid(row.get(1)?),
                round: row.get(2)?,
                pick_number: row.get(3)?,
                player_id: parse_uuid(row.get(4)?),
                prompt_id: parse_uuid(row.get(5)?),
                artist_id: parse_uuid(row.get(6)?),
                roster_entry_id: parse_uuid(row.get(7)?),
                created_at: parse_datetime(row.get(8)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(picks)
}

pub fn count_picks(conn: &Connection, season_id: Uuid) -> LeagueResult<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draft_picks WHERE season_id = ?",
        [season_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_picks_in_round(conn: &Connection, season_id: Uuid, round: u32) -> LeagueResult<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM draft_picks WHERE season_id = ? AND round = ?",
        (season_id.to_string(), round),
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn delete_picks(conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
    let rows = conn.execute(
        "DELETE FROM draft_picks WHERE season_id = ?",
        [season_id.to_string()],
    )?;
    Ok(rows)
}
