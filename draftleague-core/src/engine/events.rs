use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, Database};
use crate::error::LeagueResult;
use crate::models::*;

/// Best-effort append to the event log. A failed write is logged and never
/// fails the caller's operation.
pub fn record(
    conn: &Connection,
    season: &Season,
    event_type: EventType,
    payload: serde_json::Value,
    actor_id: Option<Uuid>,
) {
    if let Err(e) = db::events::insert_event(
        conn,
        season.id,
        season.current_week,
        season.current_phase,
        event_type,
        &payload,
        actor_id,
    ) {
        tracing::warn!(
            season = %season.id,
            event = event_type.as_str(),
            "Failed to record event: {}",
            e
        );
    }
}

/// A season's events, newest first.
pub fn list(db: &Database, season_id: Uuid, week: Option<u32>) -> LeagueResult<Vec<EventEntry>> {
    db.read(|conn| db::events::list_events(conn, season_id, week))
}
