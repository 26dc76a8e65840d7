use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_json, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

const STATE_COLUMNS: &str = "id, season_id, week, current_phase, settings, progress, prompt_picker_id, \
     selected_prompt_id, redraft_order, pool_draft_order, redraft_round, redraft_picker_index, \
     pool_draft_index, created_at, updated_at";

fn state_from_row(row: &Row<'_>) -> rusqlite::Result<RosterEvolutionState> {
    Ok(RosterEvolutionState {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        week: row.get(2)?,
        current_phase: EvolutionPhase::from_str(&row.get::<_, String>(3)?)
            .unwrap_or(EvolutionPhase::SelfCut),
        settings: parse_json(4, row.get(4)?)?,
        progress: parse_json(5, row.get(5)?)?,
        prompt_picker_id: parse_uuid(row.get(6)?),
        selected_prompt_id: row.get::<_, Option<String>>(7)?.map(parse_uuid),
        redraft_order: parse_json(8, row.get(8)?)?,
        pool_draft_order: parse_json(9, row.get(9)?)?,
        redraft_round: row.get(10)?,
        redraft_picker_index: row.get::<_, i64>(11)? as usize,
        pool_draft_index: row.get::<_, i64>(12)? as usize,
        created_at: parse_datetime(row.get(13)?),
        updated_at: parse_datetime(row.get(14)?),
    })
}

pub fn get_state(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Option<RosterEvolutionState>> {
    let state = conn
        .query_row(
            &format!("SELECT {STATE_COLUMNS} FROM roster_evolution_states WHERE season_id = ? AND week = ?"),
            (season_id.to_string(), week),
            state_from_row,
        )
        .optional()?;
    Ok(state)
}

pub fn list_states(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<RosterEvolutionState>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {STATE_COLUMNS} FROM roster_evolution_states WHERE season_id = ? ORDER BY week"
    ))?;
    let states = stmt
        .query_map([season_id.to_string()], state_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(states)
}

pub fn insert_state(conn: &Connection, state: &RosterEvolutionState) -> LeagueResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO roster_evolution_states ({STATE_COLUMNS})
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ),
        (
            state.id.to_string(),
            state.season_id.to_string(),
            state.week,
            state.current_phase.as_str(),
            serde_json::to_string(&state.settings)?,
            serde_json::to_string(&state.progress)?,
            state.prompt_picker_id.to_string(),
            state.selected_prompt_id.map(|u| u.to_string()),
            serde_json::to_string(&state.redraft_order)?,
            serde_json::to_string(&state.pool_draft_order)?,
            state.redraft_round,
            state.redraft_picker_index as i64,
            state.pool_draft_index as i64,
            state.created_at.to_rfc3339(),
            state.updated_at.to_rfc3339(),
        ),
    )?;
    Ok(())
}

/// Write back every mutable field of the state.
pub fn save_state(conn: &Connection, state: &RosterEvolutionState) -> LeagueResult<()> {
    conn.execute(
        "UPDATE roster_evolution_states SET current_phase = ?, progress = ?, prompt_picker_id = ?,
             selected_prompt_id = ?, redraft_order = ?, pool_draft_order = ?, redraft_round = ?,
             redraft_picker_index = ?, pool_draft_index = ?, updated_at = ?
         WHERE id = ?",
        (
            state.current_phase.as_str(),
            serde_json::to_string(&state.progress)?,
            state.prompt_picker_id.to_string(),
            state.selected_prompt_id.map(|u| u.to_string()),
            serde_json::to_string(&state.redraft_order)?,
            serde_json::to_string(&state.pool_draft_order)?,
            state.redraft_round,
            state.redraft_picker_index as i64,
            state.pool_draft_index as i64,
            now(),
            state.id.to_string(),
        ),
    )?;
    Ok(())
}
