//! The snake draft that fills the initial rosters.

use rand::seq::SliceRandom;
use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

use crate::db::roster::NewRosterEntry;
use crate::db::{self, Database, WeekScope};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::turn_order::{SnakeTurn, TurnAdvance};
use super::{phase, SeasonContext};

/// Start the draft with a random order. Idempotent: an existing draft state
/// is returned unchanged.
pub fn initialize(db: &Database, season_id: Uuid, actor_id: Uuid) -> LeagueResult<DraftState> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "initialize the draft")?;
        if let Some(state) = db::draft::get_state(tx, season_id)? {
            return Ok(state);
        }
        if ctx.phase() > SeasonPhase::Drafting {
            return Err(LeagueError::InvalidTransition(format!(
                "cannot start a draft in phase {}",
                ctx.phase()
            )));
        }
        let players = db::seasons::list_players(tx, season_id)?;
        if players.is_empty() {
            return Err(LeagueError::InvalidTransition(
                "a draft needs at least one player".to_string(),
            ));
        }

        let mut order: Vec<Uuid> = players.iter().map(|p| p.id).collect();
        order.shuffle(&mut rand::rng());
        assign_positions(tx, &order)?;
        let state = db::draft::insert_state(tx, season_id, order)?;

        if ctx.phase() == SeasonPhase::Setup {
            phase::transition(tx, &mut ctx, SeasonPhase::Drafting, Some(actor_id))?;
        }
        tracing::info!(season = %season_id, players = state.draft_order.len(), "Draft initialized");
        ctx.record(
            tx,
            EventType::DraftInitialized,
            json!({ "draft_order": state.draft_order }),
            Some(actor_id),
        );
        Ok(state)
    })
}

fn assign_positions(conn: &Connection, order: &[Uuid]) -> LeagueResult<()> {
    for (i, player_id) in order.iter().enumerate() {
        db::seasons::set_draft_position(conn, *player_id, Some(i as u32 + 1))?;
    }
    Ok(())
}

/// Validated view of a running draft.
struct Turn {
    state: DraftState,
    picker_id: Uuid,
}

fn current_turn(conn: &Connection, ctx: &SeasonContext, actor_id: Uuid) -> LeagueResult<Turn> {
    ctx.require_phase(SeasonPhase::Drafting)?;
    let state = db::draft::get_state(conn, ctx.season_id())?
        .ok_or_else(|| LeagueError::not_found("draft state", ctx.season_id()))?;
    let picker_id = state
        .current_picker()
        .ok_or_else(|| LeagueError::InvalidTransition("the draft is complete".to_string()))?;
    if !ctx.acts_for(conn, actor_id, picker_id)? {
        tracing::debug!(season = %ctx.season_id(), actor = %actor_id, "rejected out-of-turn draft action");
        return Err(LeagueError::WrongTurn(format!(
            "round {} is waiting on player {}",
            state.current_round, picker_id
        )));
    }
    Ok(Turn { state, picker_id })
}

/// Pick the prompt for the current round.
pub fn select_prompt(
    db: &Database,
    season_id: Uuid,
    prompt_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<DraftPrompt> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let turn = current_turn(tx, &ctx, actor_id)?;
        let round = turn.state.current_round;

        let prompt = db::draft::get_prompt(tx, prompt_id)?
            .filter(|p| p.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("prompt", prompt_id))?;
        if let Some(existing) = db::draft::selected_prompt_for_round(tx, season_id, round)? {
            return Err(LeagueError::PromptUnavailable(format!(
                "round {round} already plays prompt {}",
                existing.id
            )));
        }
        if prompt.status != PromptStatus::Open {
            return Err(LeagueError::PromptUnavailable(format!(
                "prompt {} is {}",
                prompt.id,
                prompt.status.as_str()
            )));
        }

        db::draft::mark_prompt_selected(tx, prompt.id, turn.picker_id, round)?;
        ctx.record(
            tx,
            EventType::DraftPromptSelected,
            json!({ "prompt_id": prompt.id, "round": round, "player_id": turn.picker_id }),
            Some(actor_id),
        );
        Ok(DraftPrompt {
            status: PromptStatus::Selected,
            selected_by_player_id: Some(turn.picker_id),
            selected_at_round: Some(round),
            ..prompt
        })
    })
}

/// Draft an artist for the current picker under the round's prompt.
pub fn draft_artist(
    db: &Database,
    season_id: Uuid,
    prompt_id: Uuid,
    artist_name: &str,
    actor_id: Uuid,
) -> LeagueResult<DraftPick> {
    let artist_name = artist_name.trim();
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        let turn = current_turn(tx, &ctx, actor_id)?;
        let state = &turn.state;
        let round = state.current_round;

        let prompt = db::draft::get_prompt(tx, prompt_id)?
            .filter(|p| p.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("prompt", prompt_id))?;
        if prompt.status != PromptStatus::Selected || prompt.selected_at_round != Some(round) {
            return Err(LeagueError::PromptUnavailable(format!(
                "prompt {} is not in play for round {round}",
                prompt.id
            )));
        }
        if artist_name.is_empty() {
            return Err(LeagueError::InvalidTransition(
                "artist name must not be empty".to_string(),
            ));
        }
        if db::roster::artist_name_is_active(tx, season_id, artist_name)? {
            return Err(LeagueError::DuplicateArtist(artist_name.to_string()));
        }

        let artist = match db::draft::find_artist_by_name(tx, season_id, artist_name)? {
            Some(artist) => artist,
            None => db::draft::insert_artist(tx, season_id, artist_name)?,
        };
        let entry = db::roster::insert_entry(
            tx,
            NewRosterEntry {
                season_id,
                player_id: turn.picker_id,
                artist_id: artist.id,
                prompt_id: Some(prompt.id),
                acquired_via: AcquiredVia::Draft,
                acquired_at_week: 0,
                acquired_at_round: round,
                pool_entry_id: None,
            },
        )?;
        let pick = db::draft::insert_pick(
            tx,
            season_id,
            round,
            turn.picker_id,
            prompt.id,
            artist.id,
            entry.id,
        )?;
        ctx.record(
            tx,
            EventType::ArtistDrafted,
            json!({
                "round": round,
                "pick_number": pick.pick_number,
                "player_id": turn.picker_id,
                "artist": artist.name,
            }),
            Some(actor_id),
        );

        let players = state.draft_order.len();
        if db::draft::count_picks_in_round(tx, season_id, round)? as usize >= players {
            db::draft::retire_prompt(tx, prompt.id)?;
            ctx.record(
                tx,
                EventType::DraftRoundCompleted,
                json!({ "round": round, "prompt_id": prompt.id }),
                Some(actor_id),
            );
        }

        let cursor = SnakeTurn {
            players,
            rounds: DRAFT_ROUNDS,
            round,
            cursor: state.current_picker_index,
        };
        match cursor.advance() {
            TurnAdvance::SameRound(next) => {
                db::draft::patch_cursor(tx, season_id, next.round, next.cursor, false)?;
            }
            TurnAdvance::NextRound(next) => {
                db::draft::patch_cursor(tx, season_id, next.round, next.cursor, false)?;
                tracing::info!(season = %season_id, "Draft advanced to round {}", next.round);
            }
            TurnAdvance::Complete => {
                db::draft::patch_cursor(tx, season_id, round, state.current_picker_index, true)?;
                tracing::info!(season = %season_id, "Draft complete");
                ctx.record(
                    tx,
                    EventType::DraftCompleted,
                    json!({ "picks": pick.pick_number }),
                    Some(actor_id),
                );
                phase::transition(tx, &mut ctx, SeasonPhase::AdvantageSelection, Some(actor_id))?;
            }
        }
        Ok(pick)
    })
}

/// Wipe the draft and start again at round 1.
pub fn reset(
    db: &Database,
    season_id: Uuid,
    keep_order: bool,
    actor_id: Uuid,
) -> LeagueResult<DraftState> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "reset the draft")?;
        if !matches!(
            ctx.phase(),
            SeasonPhase::Drafting | SeasonPhase::AdvantageSelection
        ) {
            return Err(LeagueError::InvalidTransition(format!(
                "cannot reset the draft in phase {}",
                ctx.phase()
            )));
        }
        let existing = db::draft::get_state(tx, season_id)?
            .ok_or_else(|| LeagueError::not_found("draft state", season_id))?;

        let order = if keep_order {
            existing.draft_order
        } else {
            let mut order = existing.draft_order;
            order.shuffle(&mut rand::rng());
            order
        };

        let picks = db::draft::delete_picks(tx, season_id)?;
        db::delete_scoped(tx, "roster_entries", "acquired_at_week", season_id, WeekScope::All)?;
        db::delete_scoped(tx, "pool_entries", "cut_at_week", season_id, WeekScope::All)?;
        db::draft::delete_orphan_artists(tx, season_id)?;
        db::draft::reopen_all_prompts(tx, season_id)?;
        // Starting picks were made in the old selection order.
        let starting = db::advantages::delete_inventory_by_origin(tx, season_id, InventoryOrigin::Starting)?;
        if !keep_order {
            assign_positions(tx, &order)?;
        }
        let state = db::draft::insert_state(tx, season_id, order)?;
        ctx.set_position(tx, SeasonPhase::Drafting, 0, SeasonStatus::Preseason)?;

        tracing::info!(
            season = %season_id,
            keep_order,
            "Draft reset, {} picks and {} starting advantages removed",
            picks,
            starting
        );
        ctx.record(
            tx,
            EventType::DraftReset,
            json!({ "keep_order": keep_order, "picks_removed": picks, "starting_removed": starting }),
            Some(actor_id),
        );
        Ok(state)
    })
}

pub fn board(db: &Database, season_id: Uuid) -> LeagueResult<DraftBoard> {
    db.read(|conn| {
        let state = db::draft::get_state(conn, season_id)?
            .ok_or_else(|| LeagueError::not_found("draft state", season_id))?;
        let round_prompt = if state.is_complete {
            None
        } else {
            db::draft::selected_prompt_for_round(conn, season_id, state.current_round)?
        };
        let picks = db::draft::list_picks(conn, season_id)?;
        Ok(DraftBoard {
            current_picker_id: state.current_picker(),
            state,
            round_prompt,
            picks,
        })
    })
}
