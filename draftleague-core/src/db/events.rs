use rusqlite::Connection;
use uuid::Uuid;

use super::{now, parse_datetime, parse_json, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

pub fn insert_event(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    phase: SeasonPhase,
    event_type: EventType,
    payload: &serde_json::Value,
    actor_id: Option<Uuid>,
) -> LeagueResult<Uuid> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO event_log (id, season_id, week, phase, event_type, payload, actor_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            phase.as_str(),
            event_type.as_str(),
            serde_json::to_string(payload)?,
            actor_id.map(|u| u.to_string()),
            now(),
        ),
    )?;
    Ok(id)
}

/// A season's events, newest first, optionally limited to one week.
pub fn list_events(
    conn: &Connection,
    season_id: Uuid,
    week: Option<u32>,
) -> LeagueResult<Vec<EventEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, week, phase, event_type, payload, actor_id, created_at
         FROM event_log WHERE season_id = ?1 AND (?2 IS NULL OR week = ?2)
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let events = stmt
        .query_map((season_id.to_string(), week), |row| {
            Ok(EventEntry {
                id: parse_uuid(row.get(0)?),
                season_id: parse_uuid(row.get(1)?),
                week: row.get(2)?,
                phase: SeasonPhase::from_str(&row.get::<_, String>(3)?)
                    .unwrap_or(SeasonPhase::Setup),
                event_type: EventType::from_str(&row.get::<_, String>(4)?)
                    .unwrap_or(EventType::PhaseAdvanced),
                payload: parse_json(5, row.get(5)?)?,
                actor_id: row.get::<_, Option<String>>(6)?.map(parse_uuid),
                created_at: parse_datetime(row.get(7)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(events)
}

/// Delete a week's events of the given types.
pub fn delete_week_events(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    types: &[EventType],
) -> LeagueResult<usize> {
    let mut deleted = 0;
    for event_type in types {
        deleted += conn.execute(
            "DELETE FROM event_log WHERE season_id = ? AND week = ? AND event_type = ?",
            (season_id.to_string(), week, event_type.as_str()),
        )?;
    }
    Ok(deleted)
}
