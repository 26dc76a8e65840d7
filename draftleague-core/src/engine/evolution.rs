//! Per-week roster evolution.
//!
//! `SelfCut -> PromptSelection -> Redraft -> (PoolDraft) -> Complete`. Phases
//! with nothing to do (zero cuts, zero redrafts, an empty pool) are skipped.
//! Orders are reverse standings: last place cuts, picks and drafts first.

use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

use crate::db::roster::NewRosterEntry;
use crate::db::{self, Database};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::turn_order::{SnakeTurn, TurnAdvance};
use super::{phase, SeasonContext};

/// Reverse standings: last place first.
fn reverse_standings(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<Uuid>> {
    let mut order: Vec<Uuid> = db::seasons::standings(conn, season_id)?
        .into_iter()
        .map(|p| p.id)
        .collect();
    order.reverse();
    Ok(order)
}

fn load_state(conn: &Connection, ctx: &SeasonContext) -> LeagueResult<RosterEvolutionState> {
    ctx.require_phase(SeasonPhase::RosterEvolution)?;
    db::evolution::get_state(conn, ctx.season_id(), ctx.week())?
        .ok_or_else(|| LeagueError::not_found("roster evolution", format!("week {}", ctx.week())))
}

fn require_sub_phase(state: &RosterEvolutionState, expected: EvolutionPhase) -> LeagueResult<()> {
    if state.current_phase == expected {
        return Ok(());
    }
    Err(LeagueError::InvalidTransition(format!(
        "roster evolution is in {}, expected {}",
        state.current_phase.as_str(),
        expected.as_str()
    )))
}

/// Enter `next`, skipping a pool draft with nothing in the pool and
/// finishing the week when `Complete` is reached.
fn enter(
    conn: &Connection,
    ctx: &SeasonContext,
    state: &mut RosterEvolutionState,
    next: EvolutionPhase,
    actor_id: Uuid,
) -> LeagueResult<()> {
    let next = match next {
        EvolutionPhase::PoolDraft
            if db::roster::count_available_pool(conn, ctx.season_id())? == 0 =>
        {
            EvolutionPhase::Complete
        }
        other => other,
    };
    state.current_phase = next;
    match next {
        EvolutionPhase::Redraft => {
            state.redraft_round = 1;
            state.redraft_picker_index = SnakeTurn::first_picker(state.redraft_order.len(), 1);
        }
        EvolutionPhase::PoolDraft => state.pool_draft_index = 0,
        EvolutionPhase::Complete => {
            if let Some(prompt_id) = state.selected_prompt_id {
                db::draft::retire_prompt(conn, prompt_id)?;
            }
            tracing::info!(season = %ctx.season_id(), week = state.week, "Roster evolution complete");
            ctx.record(
                conn,
                EventType::EvolutionCompleted,
                json!({ "week": state.week, "progress": state.progress }),
                Some(actor_id),
            );
        }
        EvolutionPhase::SelfCut | EvolutionPhase::PromptSelection => {}
    }
    Ok(())
}

fn save(conn: &Connection, state: &mut RosterEvolutionState) -> LeagueResult<()> {
    state.updated_at = Utc::now();
    db::evolution::save_state(conn, state)
}

/// Create the evolution state for the current week. Idempotent.
pub fn initialize(
    db: &Database,
    season_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<RosterEvolutionState> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "start a roster evolution")?;
        ctx.require_phase(SeasonPhase::RosterEvolution)?;
        let week = ctx.week();
        if let Some(state) = db::evolution::get_state(tx, season_id, week)? {
            return Ok(state);
        }
        let settings = ctx.season.config.evolution_for_week(week).ok_or_else(|| {
            LeagueError::InvalidTransition(format!("week {week} has no roster evolution"))
        })?;

        let order = reverse_standings(tx, season_id)?;
        let prompt_picker_id = *order
            .first()
            .ok_or_else(|| LeagueError::InvalidTransition("season has no players".to_string()))?;
        let now = Utc::now();
        let mut state = RosterEvolutionState {
            id: Uuid::new_v4(),
            season_id,
            week,
            current_phase: EvolutionPhase::SelfCut,
            settings,
            progress: EvolutionProgress::default(),
            prompt_picker_id,
            selected_prompt_id: None,
            redraft_order: order.clone(),
            pool_draft_order: order,
            redraft_round: 1,
            redraft_picker_index: 0,
            pool_draft_index: 0,
            created_at: now,
            updated_at: now,
        };
        db::evolution::insert_state(tx, &state)?;
        ctx.record(
            tx,
            EventType::EvolutionStarted,
            json!({ "week": week, "week_type": settings.week_type, "settings": settings }),
            Some(actor_id),
        );
        enter(tx, &ctx, &mut state, EvolutionPhase::initial(&settings), actor_id)?;
        save(tx, &mut state)?;
        tracing::info!(season = %season_id, week, "Roster evolution started in {}", state.current_phase.as_str());
        Ok(state)
    })
}

pub fn get_state(db: &Database, season_id: Uuid, week: u32) -> LeagueResult<RosterEvolutionState> {
    db.read(|conn| {
        db::evolution::get_state(conn, season_id, week)?
            .ok_or_else(|| LeagueError::not_found("roster evolution", format!("week {week}")))
    })
}

/// Cut one of a player's active artists into the pool.
pub fn cut(
    db: &Database,
    season_id: Uuid,
    roster_entry_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<PoolEntry> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let mut state = load_state(tx, &ctx)?;
        require_sub_phase(&state, EvolutionPhase::SelfCut)?;

        let entry = db::roster::get_entry(tx, roster_entry_id)?
            .filter(|e| e.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("roster entry", roster_entry_id))?;
        if !ctx.acts_for(tx, actor_id, entry.player_id)? {
            return Err(LeagueError::Unauthorized(
                "only the roster owner or the commissioner may cut".to_string(),
            ));
        }
        if entry.status != RosterStatus::Active {
            return Err(LeagueError::InvalidTransition(format!(
                "roster entry {} is {}",
                entry.id,
                entry.status.as_str()
            )));
        }
        let quota = state.settings.self_cut_count;
        if state.progress.cuts_of(entry.player_id) >= quota {
            return Err(LeagueError::CapacityExceeded(format!(
                "player {} already cut {quota} artists",
                entry.player_id
            )));
        }

        db::roster::mark_cut(tx, entry.id, ctx.week())?;
        let pool_entry = db::roster::insert_pool_entry(tx, &entry, ctx.week())?;
        *state.progress.cuts.entry(entry.player_id).or_insert(0) += 1;
        ctx.record(
            tx,
            EventType::ArtistCut,
            json!({ "player_id": entry.player_id, "roster_entry_id": entry.id, "pool_entry_id": pool_entry.id }),
            Some(actor_id),
        );

        let everyone_done = state
            .redraft_order
            .iter()
            .all(|p| state.progress.cuts_of(*p) >= quota);
        if everyone_done {
            let next = EvolutionPhase::after_self_cut(&state.settings);
            enter(tx, &ctx, &mut state, next, actor_id)?;
        }
        save(tx, &mut state)?;
        Ok(pool_entry)
    })
}

/// The last-place player picks the redraft prompt.
pub fn select_prompt(
    db: &Database,
    season_id: Uuid,
    prompt_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<RosterEvolutionState> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let mut state = load_state(tx, &ctx)?;
        require_sub_phase(&state, EvolutionPhase::PromptSelection)?;
        if !ctx.acts_for(tx, actor_id, state.prompt_picker_id)? {
            return Err(LeagueError::WrongTurn(format!(
                "player {} picks the redraft prompt",
                state.prompt_picker_id
            )));
        }
        let prompt = db::draft::get_prompt(tx, prompt_id)?
            .filter(|p| p.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("prompt", prompt_id))?;
        if prompt.status != PromptStatus::Open {
            return Err(LeagueError::PromptUnavailable(format!(
                "prompt {} is {}",
                prompt.id,
                prompt.status.as_str()
            )));
        }

        // Round 0 marks prompts played outside the main draft.
        db::draft::mark_prompt_selected(tx, prompt.id, state.prompt_picker_id, 0)?;
        state.selected_prompt_id = Some(prompt.id);
        ctx.record(
            tx,
            EventType::EvolutionPromptSelected,
            json!({ "prompt_id": prompt.id, "player_id": state.prompt_picker_id }),
            Some(actor_id),
        );
        enter(tx, &ctx, &mut state, EvolutionPhase::Redraft, actor_id)?;
        save(tx, &mut state)?;
        Ok(state)
    })
}

/// Add a brand-new artist to the current redraft picker's roster.
pub fn redraft(
    db: &Database,
    season_id: Uuid,
    artist_name: &str,
    actor_id: Uuid,
) -> LeagueResult<RosterEntry> {
    let artist_name = artist_name.trim();
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let mut state = load_state(tx, &ctx)?;
        require_sub_phase(&state, EvolutionPhase::Redraft)?;
        let picker_id = state
            .current_redraft_picker()
            .ok_or_else(|| LeagueError::InvalidTransition("redraft order is empty".to_string()))?;
        if !ctx.acts_for(tx, actor_id, picker_id)? {
            return Err(LeagueError::WrongTurn(format!(
                "redraft round {} is waiting on player {picker_id}",
                state.redraft_round
            )));
        }
        if artist_name.is_empty() {
            return Err(LeagueError::InvalidTransition(
                "artist name must not be empty".to_string(),
            ));
        }
        if db::roster::artist_name_is_active(tx, season_id, artist_name)?
            || db::roster::artist_name_in_pool(tx, season_id, artist_name)?
        {
            return Err(LeagueError::DuplicateArtist(artist_name.to_string()));
        }

        let artist = db::draft::insert_artist(tx, season_id, artist_name)?;
        let entry = db::roster::insert_entry(
            tx,
            NewRosterEntry {
                season_id,
                player_id: picker_id,
                artist_id: artist.id,
                prompt_id: state.selected_prompt_id,
                acquired_via: AcquiredVia::Pool,
                acquired_at_week: ctx.week(),
                acquired_at_round: state.redraft_round,
                pool_entry_id: None,
            },
        )?;
        *state.progress.redrafts.entry(picker_id).or_insert(0) += 1;
        ctx.record(
            tx,
            EventType::ArtistRedrafted,
            json!({ "player_id": picker_id, "artist": artist.name, "round": state.redraft_round }),
            Some(actor_id),
        );

        let cursor = SnakeTurn {
            players: state.redraft_order.len(),
            rounds: state.settings.redraft_count,
            round: state.redraft_round,
            cursor: state.redraft_picker_index,
        };
        match cursor.advance() {
            TurnAdvance::SameRound(next) | TurnAdvance::NextRound(next) => {
                state.redraft_round = next.round;
                state.redraft_picker_index = next.cursor;
            }
            TurnAdvance::Complete => {
                let next = EvolutionPhase::after_redraft(&state.settings);
                enter(tx, &ctx, &mut state, next, actor_id)?;
            }
        }
        save(tx, &mut state)?;
        Ok(entry)
    })
}

/// Claim an AVAILABLE pool entry for the current pool-draft picker.
///
/// The commissioner may pick on a player's behalf; the roster credit always
/// goes to the player whose turn it is.
pub fn pool_draft(
    db: &Database,
    season_id: Uuid,
    pool_entry_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<RosterEntry> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let mut state = load_state(tx, &ctx)?;
        require_sub_phase(&state, EvolutionPhase::PoolDraft)?;
        let picker_id = state
            .current_pool_picker()
            .ok_or_else(|| LeagueError::InvalidTransition("pool draft order is exhausted".to_string()))?;
        if !ctx.acts_for(tx, actor_id, picker_id)? {
            return Err(LeagueError::WrongTurn(format!(
                "pool draft is waiting on player {picker_id}"
            )));
        }
        let pool_entry = db::roster::get_pool_entry(tx, pool_entry_id)?
            .filter(|p| p.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("pool entry", pool_entry_id))?;
        if pool_entry.status != PoolStatus::Available {
            return Err(LeagueError::InvalidTransition(format!(
                "pool entry {} is {}",
                pool_entry.id,
                pool_entry.status.as_str()
            )));
        }

        db::roster::mark_pool_drafted(tx, pool_entry.id, picker_id, ctx.week())?;
        let entry = db::roster::insert_entry(
            tx,
            NewRosterEntry {
                season_id,
                player_id: picker_id,
                artist_id: pool_entry.artist_id,
                prompt_id: None,
                acquired_via: AcquiredVia::Pool,
                acquired_at_week: ctx.week(),
                acquired_at_round: state.pool_draft_index as u32 + 1,
                pool_entry_id: Some(pool_entry.id),
            },
        )?;
        *state.progress.pool_picks.entry(picker_id).or_insert(0) += 1;
        ctx.record(
            tx,
            EventType::PoolArtistDrafted,
            json!({ "player_id": picker_id, "pool_entry_id": pool_entry.id, "roster_entry_id": entry.id }),
            Some(actor_id),
        );

        state.pool_draft_index += 1;
        let exhausted = state.pool_draft_index >= state.pool_draft_order.len()
            || db::roster::count_available_pool(tx, season_id)? == 0;
        if exhausted {
            enter(tx, &ctx, &mut state, EvolutionPhase::Complete, actor_id)?;
        }
        save(tx, &mut state)?;
        Ok(entry)
    })
}

/// Close a completed evolution and open the next week.
pub fn complete_roster_evolution(
    db: &Database,
    season_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<Season> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "complete a roster evolution")?;
        let state = load_state(tx, &ctx)?;
        require_sub_phase(&state, EvolutionPhase::Complete)?;
        if ctx.week() >= ctx.season.config.total_weeks {
            return Err(LeagueError::InvalidTransition(format!(
                "week {} is the final week",
                ctx.week()
            )));
        }
        phase::open_next_week(tx, &mut ctx, Some(actor_id))?;
        Ok(ctx.season)
    })
}

/// Undo everything the evolution of `week` did and return it to its first
/// sub-phase. Only valid while the season is still in that evolution.
pub fn rollback(
    db: &Database,
    season_id: Uuid,
    week: u32,
    actor_id: Uuid,
) -> LeagueResult<RosterEvolutionState> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "roll back a roster evolution")?;
        ctx.require_phase(SeasonPhase::RosterEvolution)?;
        if ctx.week() != week {
            return Err(LeagueError::InvalidTransition(format!(
                "season is in week {}, not {week}",
                ctx.week()
            )));
        }
        let mut state = db::evolution::get_state(tx, season_id, week)?
            .ok_or_else(|| LeagueError::not_found("roster evolution", format!("week {week}")))?;

        let (released, restored) = undo_roster_changes(tx, season_id, week)?;
        if let Some(prompt_id) = state.selected_prompt_id.take() {
            db::draft::reopen_prompt(tx, prompt_id)?;
        }

        let order = reverse_standings(tx, season_id)?;
        state.prompt_picker_id = order.first().copied().unwrap_or(state.prompt_picker_id);
        state.redraft_order = order.clone();
        state.pool_draft_order = order;
        state.progress = EvolutionProgress::default();
        state.redraft_round = 1;
        state.redraft_picker_index = 0;
        state.pool_draft_index = 0;
        state.current_phase = EvolutionPhase::initial(&state.settings);
        save(tx, &mut state)?;

        let evolution_events: Vec<EventType> = EventType::ALL
            .into_iter()
            .filter(EventType::is_evolution)
            .collect();
        db::events::delete_week_events(tx, season_id, week, &evolution_events)?;

        tracing::info!(season = %season_id, week, released, restored, "Roster evolution rolled back");
        ctx.record(
            tx,
            EventType::EvolutionRolledBack,
            json!({ "week": week, "entries_removed": released, "entries_restored": restored }),
            Some(actor_id),
        );
        Ok(state)
    })
}

/// Revert roster changes made in weeks `>= from_week`: unprotected entries
/// acquired then are removed (their pool entries become AVAILABLE again,
/// redraft artists are dropped) and entries cut then are restored.
///
/// Returns `(entries removed, entries restored)`.
pub(crate) fn undo_roster_changes(
    conn: &Connection,
    season_id: Uuid,
    from_week: u32,
) -> LeagueResult<(usize, usize)> {
    let entries = db::roster::list_entries(conn, season_id)?;

    let mut removed = 0;
    for entry in entries
        .iter()
        .filter(|e| e.acquired_at_week >= from_week && !e.is_rollback_protected())
    {
        db::roster::delete_entry(conn, entry.id)?;
        match entry.pool_entry_id {
            Some(pool_entry_id) => db::roster::mark_pool_available(conn, pool_entry_id)?,
            // Redrafts always minted their own artist.
            None => {
                db::draft::delete_artist(conn, entry.artist_id)?;
            }
        }
        removed += 1;
    }

    let mut restored = 0;
    for pool_entry in db::roster::list_pool(conn, season_id, None)?
        .into_iter()
        .filter(|p| p.cut_at_week >= from_week)
    {
        db::roster::restore_active(conn, pool_entry.roster_entry_id)?;
        db::roster::delete_pool_entry(conn, pool_entry.id)?;
        restored += 1;
    }
    Ok((removed, restored))
}
