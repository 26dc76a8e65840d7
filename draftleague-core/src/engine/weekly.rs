//! The weekly cycle: challenge, submissions, presentation, voting and results.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::db::{self, Database};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::{advantage, phase, SeasonContext};

/// Outcome of [`finalize_week`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekSummary {
    pub week: u32,
    pub results: Vec<WeeklyResult>,
    pub awards: Vec<AdvantageAward>,
}

pub fn select_challenge(
    db: &Database,
    season_id: Uuid,
    challenge: &str,
    actor_id: Uuid,
) -> LeagueResult<ChallengeSelection> {
    let challenge = challenge.trim();
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "select the challenge")?;
        ctx.require_phase(SeasonPhase::ChallengeSelection)?;
        if challenge.is_empty() {
            return Err(LeagueError::InvalidTransition(
                "challenge must not be empty".to_string(),
            ));
        }
        if db::weekly::get_challenge(tx, season_id, ctx.week())?.is_some() {
            return Err(LeagueError::AlreadyExists(format!(
                "week {} already has a challenge",
                ctx.week()
            )));
        }
        let selection = db::weekly::insert_challenge(tx, season_id, ctx.week(), challenge, actor_id)?;
        ctx.record(
            tx,
            EventType::ChallengeSelected,
            json!({ "challenge": selection.challenge }),
            Some(actor_id),
        );
        Ok(selection)
    })
}

/// Reveal the week's challenge and open submissions.
pub fn reveal_challenge(
    db: &Database,
    season_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<ChallengeReveal> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "reveal the challenge")?;
        ctx.require_phase(SeasonPhase::ChallengeSelection)?;
        let week = ctx.week();
        let selection = db::weekly::get_challenge(tx, season_id, week)?.ok_or_else(|| {
            LeagueError::InvalidTransition(format!("week {week} has no challenge yet"))
        })?;
        if db::weekly::get_reveal(tx, season_id, week)?.is_some() {
            return Err(LeagueError::AlreadyExists(format!(
                "week {week} challenge is already revealed"
            )));
        }
        let reveal = db::weekly::insert_reveal(tx, season_id, week, actor_id)?;
        ctx.record(
            tx,
            EventType::ChallengeRevealed,
            json!({ "challenge": selection.challenge }),
            Some(actor_id),
        );
        phase::transition(tx, &mut ctx, SeasonPhase::Submission, Some(actor_id))?;
        Ok(reveal)
    })
}

/// Store a player's tracks for the week. Resubmitting replaces them.
pub fn submit_tracks(
    db: &Database,
    season_id: Uuid,
    player_id: Uuid,
    tracks: Vec<serde_json::Value>,
    actor_id: Uuid,
) -> LeagueResult<Submission> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_phase(SeasonPhase::Submission)?;
        let player = ctx.player(tx, player_id)?;
        if !ctx.acts_for(tx, actor_id, player.id)? {
            return Err(LeagueError::Unauthorized(
                "only the player or the commissioner may submit".to_string(),
            ));
        }
        let submission = db::weekly::upsert_submission(tx, season_id, ctx.week(), player.id, tracks)?;
        ctx.record(
            tx,
            EventType::TracksSubmitted,
            json!({ "player_id": player.id, "tracks": submission.tracks.len() }),
            Some(actor_id),
        );
        Ok(submission)
    })
}

pub fn list_submissions(db: &Database, season_id: Uuid, week: u32) -> LeagueResult<Vec<Submission>> {
    db.read(|conn| db::weekly::list_submissions(conn, season_id, week))
}

/// Presentation cursor for the current week; created on entering
/// `Presentation`. Last place presents first.
pub(crate) fn open_presentation(
    conn: &Connection,
    ctx: &SeasonContext,
) -> LeagueResult<PresentationState> {
    if let Some(state) = db::weekly::get_presentation(conn, ctx.season_id(), ctx.week())? {
        return Ok(state);
    }
    let mut order: Vec<Uuid> = db::seasons::standings(conn, ctx.season_id())?
        .into_iter()
        .map(|p| p.id)
        .collect();
    order.reverse();
    db::weekly::insert_presentation(conn, ctx.season_id(), ctx.week(), order)
}

pub fn presentation(db: &Database, season_id: Uuid, week: u32) -> LeagueResult<PresentationState> {
    db.read(|conn| {
        db::weekly::get_presentation(conn, season_id, week)?
            .ok_or_else(|| LeagueError::not_found("presentation", format!("week {week}")))
    })
}

/// Move on to the next presenter.
pub fn advance_presenter(
    db: &Database,
    season_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<PresentationState> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "advance the presentation")?;
        ctx.require_phase(SeasonPhase::Presentation)?;
        let mut state = db::weekly::get_presentation(tx, season_id, ctx.week())?
            .ok_or_else(|| LeagueError::not_found("presentation", format!("week {}", ctx.week())))?;
        if state.is_complete {
            return Err(LeagueError::InvalidTransition(
                "every player has presented".to_string(),
            ));
        }
        let presented = state.current_presenter();
        state.current_index += 1;
        state.is_complete = state.current_index >= state.presenter_order.len();
        db::weekly::patch_presentation_cursor(tx, state.id, state.current_index, state.is_complete)?;
        ctx.record(
            tx,
            EventType::PresenterAdvanced,
            json!({ "presented": presented, "next": state.current_presenter() }),
            Some(actor_id),
        );
        Ok(state)
    })
}

/// Voting session for the current week; created on entering `Voting`.
pub(crate) fn open_voting(conn: &Connection, ctx: &SeasonContext) -> LeagueResult<VotingSession> {
    if let Some(session) = db::weekly::get_voting_session(conn, ctx.season_id(), ctx.week())? {
        return Ok(session);
    }
    db::weekly::insert_voting_session(
        conn,
        ctx.season_id(),
        ctx.week(),
        ctx.season.config.voting_categories.clone(),
    )
}

pub fn voting_session(db: &Database, season_id: Uuid, week: u32) -> LeagueResult<VotingSession> {
    db.read(|conn| {
        db::weekly::get_voting_session(conn, season_id, week)?
            .ok_or_else(|| LeagueError::not_found("voting session", format!("week {week}")))
    })
}

pub fn cast_vote(
    db: &Database,
    season_id: Uuid,
    voter_id: Uuid,
    category: &str,
    nominee_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<Vote> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_phase(SeasonPhase::Voting)?;
        let voter = ctx.player(tx, voter_id)?;
        if !ctx.acts_for(tx, actor_id, voter.id)? {
            return Err(LeagueError::Unauthorized(
                "players vote for themselves only".to_string(),
            ));
        }
        let nominee = ctx.player(tx, nominee_id)?;
        let session = db::weekly::get_voting_session(tx, season_id, ctx.week())?
            .ok_or_else(|| LeagueError::not_found("voting session", format!("week {}", ctx.week())))?;
        if session.is_closed {
            return Err(LeagueError::InvalidTransition("voting is closed".to_string()));
        }
        if !session.categories.iter().any(|c| c == category) {
            return Err(LeagueError::not_found("voting category", category));
        }
        if voter.id == nominee.id {
            return Err(LeagueError::InvalidTransition(
                "players cannot vote for themselves".to_string(),
            ));
        }
        if db::weekly::has_voted(tx, session.id, voter.id, category)? {
            return Err(LeagueError::AlreadyExists(format!(
                "{} already voted in {category}",
                voter.display_name
            )));
        }
        let vote = db::weekly::insert_vote(tx, &session, voter.id, category, nominee.id)?;
        ctx.record(
            tx,
            EventType::VoteCast,
            json!({ "category": category, "voter_id": voter.id }),
            Some(actor_id),
        );
        Ok(vote)
    })
}

/// Rank players by points with competition ranking: ties share a placement
/// and the next placement skips ("1224"). `players` must already be in
/// tie-break order.
pub fn rank(players: &[Uuid], points: &BTreeMap<Uuid, i64>) -> Vec<(Uuid, i64, u32)> {
    let mut scored: Vec<(Uuid, i64)> = players
        .iter()
        .map(|p| (*p, points.get(p).copied().unwrap_or(0)))
        .collect();
    // Stable sort keeps the tie-break order among equal scores.
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .iter()
        .map(|(player, pts)| {
            let better = scored.iter().filter(|(_, other)| other > pts).count();
            (*player, *pts, better as u32 + 1)
        })
        .collect()
}

/// Tally votes into results, award advantages, close voting and end the week.
pub fn finalize_week(db: &Database, season_id: Uuid, actor_id: Uuid) -> LeagueResult<WeekSummary> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "finalize the week")?;
        ctx.require_phase(SeasonPhase::Voting)?;
        let week = ctx.week();
        let session = db::weekly::get_voting_session(tx, season_id, week)?
            .ok_or_else(|| LeagueError::not_found("voting session", format!("week {week}")))?;
        if session.is_closed || !db::weekly::list_results(tx, season_id, week)?.is_empty() {
            return Err(LeagueError::AlreadyExists(format!(
                "week {week} is already finalized"
            )));
        }

        let mut points: BTreeMap<Uuid, i64> = BTreeMap::new();
        for vote in db::weekly::list_votes(tx, session.id)? {
            *points.entry(vote.nominee_id).or_insert(0) += 1;
        }
        let order: Vec<Uuid> = db::seasons::standings(tx, season_id)?
            .into_iter()
            .map(|p| p.id)
            .collect();

        let mut results = Vec::new();
        for (player_id, pts, placement) in rank(&order, &points) {
            results.push(db::weekly::insert_result(tx, season_id, week, player_id, pts, placement)?);
            db::seasons::add_points(tx, player_id, pts)?;
        }
        let awards = advantage::issue_awards_in(tx, &ctx, week, Some(actor_id))?;
        db::weekly::close_voting_session(tx, session.id)?;

        tracing::info!(season = %season_id, week, "Week finalized with {} results", results.len());
        ctx.record(
            tx,
            EventType::WeekFinalized,
            json!({ "week": week, "results": results.len(), "awards": awards.len() }),
            Some(actor_id),
        );
        phase::transition(tx, &mut ctx, SeasonPhase::WeekEnd, Some(actor_id))?;
        Ok(WeekSummary {
            week,
            results,
            awards,
        })
    })
}

pub fn results(db: &Database, season_id: Uuid, week: u32) -> LeagueResult<Vec<WeeklyResult>> {
    db.read(|conn| db::weekly::list_results(conn, season_id, week))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_share_a_placement() {
        let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let points = BTreeMap::from([(a, 5), (b, 3), (c, 3), (d, 1)]);
        let ranked = rank(&[d, c, b, a], &points);
        let placements: Vec<(Uuid, u32)> = ranked.iter().map(|(p, _, place)| (*p, *place)).collect();
        assert_eq!(placements, vec![(a, 1), (c, 2), (b, 2), (d, 4)]);
    }

    #[test]
    fn players_without_votes_score_zero() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let ranked = rank(&[a, b], &BTreeMap::from([(b, 2)]));
        assert_eq!(ranked, vec![(b, 2, 1), (a, 0, 2)]);
    }
}
