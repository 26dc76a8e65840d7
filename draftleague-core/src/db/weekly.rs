use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_json, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

// ============================================================
// Challenges
// ============================================================

pub fn insert_challenge(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    challenge: &str,
    selected_by: Uuid,
) -> LeagueResult<ChallengeSelection> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO challenge_selections (id, season_id, week, challenge, selected_by, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            challenge,
            selected_by.to_string(),
            &created_at,
        ),
    )?;
    Ok(ChallengeSelection {
        id,
        season_id,
        week,
        challenge: challenge.to_string(),
        selected_by,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_challenge(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Option<ChallengeSelection>> {
    let selection = conn
        .query_row(
            "SELECT id, season_id, week, challenge, selected_by, created_at
             FROM challenge_selections WHERE season_id = ? AND week = ?",
            (season_id.to_string(), week),
            |row| {
                Ok(ChallengeSelection {
                    id: parse_uuid(row.get(0)?),
                    season_id: parse_uuid(row.get(1)?),
                    week: row.get(2)?,
                    challenge: row.get(3)?,
                    selected_by: parse_uuid(row.get(4)?),
                    created_at: parse_datetime(row.get(5)?),
                })
            },
        )
        .optional()?;
    Ok(selection)
}

pub fn insert_reveal(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    revealed_by: Uuid,
) -> LeagueResult<ChallengeReveal> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO challenge_reveals (id, season_id, week, revealed_by, created_at) VALUES (?, ?, ?, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            revealed_by.to_string(),
            &created_at,
        ),
    )?;
    Ok(ChallengeReveal {
        id,
        season_id,
        week,
        revealed_by,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_reveal(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Option<ChallengeReveal>> {
    let reveal = conn
        .query_row(
            "SELECT id, season_id, week, revealed_by, created_at
             FROM challenge_reveals WHERE season_id = ? AND week = ?",
            (season_id.to_string(), week),
            |row| {
                Ok(ChallengeReveal {
                    id: parse_uuid(row.get(0)?),
                    season_id: parse_uuid(row.get(1)?),
                    week: row.get(2)?,
                    revealed_by: parse_uuid(row.get(3)?),
                    created_at: parse_datetime(row.get(4)?),
                })
            },
        )
        .optional()?;
    Ok(reveal)
}

// ============================================================
// Submissions
// ============================================================

/// Insert or replace a player's submission for a week.
pub fn upsert_submission(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    player_id: Uuid,
    tracks: Vec<serde_json::Value>,
) -> LeagueResult<Submission> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO submissions (id, season_id, week, player_id, tracks, created_at)
         VALUES (?, ?, ?, ?, ?, ?)
         ON CONFLICT (season_id, week, player_id)
         DO UPDATE SET tracks = excluded.tracks, created_at = excluded.created_at",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            player_id.to_string(),
            serde_json::to_string(&tracks)?,
            &created_at,
        ),
    )?;
    let stored_id: String = conn.query_row(
        "SELECT id FROM submissions WHERE season_id = ? AND week = ? AND player_id = ?",
        (season_id.to_string(), week, player_id.to_string()),
        |row| row.get(0),
    )?;
    Ok(Submission {
        id: parse_uuid(stored_id),
        season_id,
        week,
        player_id,
        tracks,
        created_at: parse_datetime(created_at),
    })
}

pub fn list_submissions(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Vec<Submission>> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, week, player_id, tracks, created_at
         FROM submissions WHERE season_id = ? AND week = ? ORDER BY created_at, rowid",
    )?;
    let submissions = stmt
        .query_map((season_id.to_string(), week), |row| {
            Ok(Submission {
                id: parse_uuid(row.get(0)?),
                season_id: parse_uuid(row.get(1)?),
                week: row.get(2)?,
                player_id: parse_uuid(row.get(3)?),
                tracks: parse_json(4, row.get(4)?)?,
                created_at: parse_datetime(row.get(5)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(submissions)
}

// ============================================================
// Presentation
// ============================================================

fn presentation_from_row(row: &Row<'_>) -> rusqlite::Result<PresentationState> {
    Ok(PresentationState {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        week: row.get(2)?,
        presenter_order: parse_json(3, row.get(3)?)?,
        current_index: row.get::<_, i64>(4)? as usize,
        is_complete: row.get(5)?,
        created_at: parse_datetime(row.get(6)?),
    })
}

pub fn insert_presentation(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    presenter_order: Vec<Uuid>,
) -> LeagueResult<PresentationState> {
    let id = Uuid::new_v4();
    let created_at = now();
    let is_complete = presenter_order.is_empty();
    conn.execute(
        "INSERT INTO presentation_states (id, season_id, week, presenter_order, current_index, is_complete, created_at)
         VALUES (?, ?, ?, ?, 0, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            serde_json::to_string(&presenter_order)?,
            is_complete,
            &created_at,
        ),
    )?;
    Ok(PresentationState {
        id,
        season_id,
        week,
        presenter_order,
        current_index: 0,
        is_complete,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_presentation(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Option<PresentationState>> {
    let state = conn
        .query_row(
            "SELECT id, season_id, week, presenter_order, current_index, is_complete, created_at
             FROM presentation_states WHERE season_id = ? AND week = ?",
            (season_id.to_string(), week),
            presentation_from_row,
        )
        .optional()?;
    Ok(state)
}

pub fn patch_presentation_cursor(
    conn: &Connection,
    id: Uuid,
    current_index: usize,
    is_complete: bool,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE presentation_states SET current_index = ?, is_complete = ? WHERE id = ?",
        (current_index as i64, is_complete, id.to_string()),
    )?;
    Ok(())
}

// ============================================================
// Voting
// ============================================================

pub fn insert_voting_session(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    categories: Vec<String>,
) -> LeagueResult<VotingSession> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO voting_sessions (id, season_id, week, categories, is_closed, created_at)
         VALUES (?, ?, ?, ?, 0, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            serde_json::to_string(&categories)?,
            &created_at,
        ),
    )?;
    Ok(VotingSession {
        id,
        season_id,
        week,
        categories,
        is_closed: false,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_voting_session(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Option<VotingSession>> {
    let session = conn
        .query_row(
            "SELECT id, season_id, week, categories, is_closed, created_at
             FROM voting_sessions WHERE season_id = ? AND week = ?",
            (season_id.to_string(), week),
            |row| {
                Ok(VotingSession {
                    id: parse_uuid(row.get(0)?),
                    season_id: parse_uuid(row.get(1)?),
                    week: row.get(2)?,
                    categories: parse_json(3, row.get(3)?)?,
                    is_closed: row.get(4)?,
                    created_at: parse_datetime(row.get(5)?),
                })
            },
        )
        .optional()?;
    Ok(session)
}

pub fn close_voting_session(conn: &Connection, id: Uuid) -> LeagueResult<()> {
    conn.execute(
        "UPDATE voting_sessions SET is_closed = 1 WHERE id = ?",
        [id.to_string()],
    )?;
    Ok(())
}

pub fn insert_vote(
    conn: &Connection,
    session: &VotingSession,
    voter_id: Uuid,
    category: &str,
    nominee_id: Uuid,
) -> LeagueResult<Vote> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO votes (id, session_id, season_id, week, voter_id, category, nominee_id, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            session.id.to_string(),
            session.season_id.to_string(),
            session.week,
            voter_id.to_string(),
            category,
            nominee_id.to_string(),
            &created_at,
        ),
    )?;
    Ok(Vote {
        id,
        session_id: session.id,
        season_id: session.season_id,
        week: session.week,
        voter_id,
        category: category.to_string(),
        nominee_id,
        created_at: parse_datetime(created_at),
    })
}

pub fn has_voted(
    conn: &Connection,
    session_id: Uuid,
    voter_id: Uuid,
    category: &str,
) -> LeagueResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM votes WHERE session_id = ? AND voter_id = ? AND category = ?",
        (session_id.to_string(), voter_id.to_string(), category),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn list_votes(conn: &Connection, session_id: Uuid) -> LeagueResult<Vec<Vote>> {
    let mut stmt = conn.prepare(
        "SELECT id, session_id, season_id, week, voter_id, category, nominee_id, created_at
         FROM votes WHERE session_id = ? ORDER BY created_at, rowid",
    )?;
    let votes = stmt
        .query_map([session_id.to_string()], |row| {
            Ok(Vote {
                id: parse_uuid(row.get(0)?),
                session_id: parse_uuid(row.get(1)?),
                season_id: parse_uuid(row.get(2)?),
                week: row.get(3)?,
                voter_id: parse_uuid(row.get(4)?),
                category: row.get(5)?,
                nominee_id: parse_uuid(row.get(6)?),
                created_at: parse_datetime(row.get(7)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(votes)
}

// ============================================================
// Results
// ============================================================

pub fn insert_result(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
    player_id: Uuid,
    points: i64,
    placement: u32,
) -> LeagueResult<WeeklyResult> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO weekly_results (id, season_id, week, player_id, points, placement, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            season_id.to_string(),
            week,
            player_id.to_string(),
            points,
            placement,
            &created_at,
        ),
    )?;
    Ok(WeeklyResult {
        id,
        season_id,
        week,
        player_id,
        points,
        placement,
        created_at: parse_datetime(created_at),
    })
}

pub fn list_results(
    conn: &Connection,
    season_id: Uuid,
    week: u32,
) -> LeagueResult<Vec<WeeklyResult>> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, week, player_id, points, placement, created_at
         FROM weekly_results WHERE season_id = ? AND week = ? ORDER BY placement, rowid",
    )?;
    let results = stmt
        .query_map((season_id.to_string(), week), |row| {
            Ok(WeeklyResult {
                id: parse_uuid(row.get(0)?),
                season_id: parse_uuid(row.get(1)?),
                week: row.get(2)?,
                player_id: parse_uuid(row.get(3)?),
                points: row.get(4)?,
                placement: row.get(5)?,
                created_at: parse_datetime(row.get(6)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(results)
}
