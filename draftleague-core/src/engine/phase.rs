//! The phase ledger.
//!
//! Phases form a fixed total order (see [`SeasonPhase`]). `advance` only
//! moves forward; the weekly loop re-enters `ChallengeSelection` through
//! [`start_week`] and [`evolution::complete_roster_evolution`](super::evolution::complete_roster_evolution),
//! which bump `current_week` and are not subject to the order check.

use rusqlite::Connection;
use serde_json::json;
use uuid::Uuid;

use crate::db::{self, Database};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::{weekly, SeasonContext};

/// Parse a phase name, failing with `InvalidPhase` for unknown names.
pub fn parse_phase(name: &str) -> LeagueResult<SeasonPhase> {
    SeasonPhase::from_str(name).ok_or_else(|| LeagueError::InvalidPhase(name.to_string()))
}

/// Check that `target` strictly follows `current`.
pub fn ensure_forward(current: SeasonPhase, target: SeasonPhase) -> LeagueResult<()> {
    if target.order() <= current.order() {
        return Err(LeagueError::NotForward {
            from: current.to_string(),
            to: target.to_string(),
        });
    }
    Ok(())
}

/// Commissioner-driven forward move of the season phase.
pub fn advance(db: &Database, season_id: Uuid, target: &str, actor_id: Uuid) -> LeagueResult<Season> {
    let target = parse_phase(target)?;
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "advance the season phase")?;
        transition(tx, &mut ctx, target, Some(actor_id))?;
        Ok(ctx.season)
    })
}

/// Forward move used by the engines themselves (draft completion, reveals,
/// finalization). Runs the entry hooks of the target phase.
pub(crate) fn transition(
    conn: &Connection,
    ctx: &mut SeasonContext,
    target: SeasonPhase,
    actor_id: Option<Uuid>,
) -> LeagueResult<()> {
    let from = ctx.phase();
    ensure_forward(from, target)?;
    guard_target(ctx, target)?;

    let status = match target {
        SeasonPhase::SeasonComplete => SeasonStatus::Completed,
        _ => ctx.season.status,
    };
    ctx.set_position(conn, target, ctx.week(), status)?;
    on_enter(conn, ctx, target, actor_id)?;

    tracing::info!(season = %ctx.season_id(), week = ctx.week(), "Phase advanced {} -> {}", from, target);
    ctx.record(
        conn,
        EventType::PhaseAdvanced,
        json!({ "from": from, "to": target }),
        actor_id,
    );
    Ok(())
}

/// Targets that only make sense in a particular week.
fn guard_target(ctx: &SeasonContext, target: SeasonPhase) -> LeagueResult<()> {
    let week = ctx.week();
    match target {
        SeasonPhase::RosterEvolution if ctx.season.config.evolution_for_week(week).is_none() => {
            Err(LeagueError::InvalidTransition(format!(
                "week {week} has no roster evolution"
            )))
        }
        SeasonPhase::SeasonComplete => {
            if ctx.phase() != SeasonPhase::WeekEnd {
                return Err(LeagueError::InvalidTransition(format!(
                    "the season can only complete from week_end, not {}",
                    ctx.phase()
                )));
            }
            let total_weeks = ctx.season.config.total_weeks;
            if week < total_weeks {
                return Err(LeagueError::InvalidTransition(format!(
                    "season has {total_weeks} weeks, currently in week {week}"
                )));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn on_enter(
    conn: &Connection,
    ctx: &SeasonContext,
    phase: SeasonPhase,
    actor_id: Option<Uuid>,
) -> LeagueResult<()> {
    match phase {
        SeasonPhase::Presentation => weekly::open_presentation(conn, ctx).map(|_| ()),
        SeasonPhase::Voting => weekly::open_voting(conn, ctx).map(|_| ()),
        SeasonPhase::SeasonComplete => {
            let expired = db::advantages::expire_available(conn, ctx.season_id())?;
            ctx.record(
                conn,
                EventType::SeasonCompleted,
                json!({ "expired_advantages": expired }),
                actor_id,
            );
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Open the next week: from `Ready` (before week 1) or from `WeekEnd`.
pub fn start_week(db: &Database, season_id: Uuid, actor_id: Uuid) -> LeagueResult<Season> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "start a week")?;

        let week = ctx.week();
        match ctx.phase() {
            SeasonPhase::Ready if week == 0 => {}
            SeasonPhase::WeekEnd => {
                if ctx.season.config.evolution_for_week(week).is_some() {
                    return Err(LeagueError::InvalidTransition(format!(
                        "week {week} ends with a roster evolution"
                    )));
                }
            }
            phase => {
                return Err(LeagueError::InvalidTransition(format!(
                    "cannot start a week from phase {phase}"
                )));
            }
        }
        if week >= ctx.season.config.total_weeks {
            return Err(LeagueError::InvalidTransition(format!(
                "week {week} is the final week"
            )));
        }

        open_next_week(tx, &mut ctx, Some(actor_id))?;
        Ok(ctx.season)
    })
}

/// Bump the week counter and reset the ledger to `ChallengeSelection`.
pub(crate) fn open_next_week(
    conn: &Connection,
    ctx: &mut SeasonContext,
    actor_id: Option<Uuid>,
) -> LeagueResult<()> {
    let week = ctx.week() + 1;
    ctx.set_position(
        conn,
        SeasonPhase::ChallengeSelection,
        week,
        SeasonStatus::InProgress,
    )?;
    tracing::info!(season = %ctx.season_id(), "Week {} started", week);
    ctx.record(conn, EventType::WeekStarted, json!({ "week": week }), actor_id);
    Ok(())
}

/// Close the season after the final week. Unplayed advantages expire.
pub fn complete_season(db: &Database, season_id: Uuid, actor_id: Uuid) -> LeagueResult<Season> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "complete the season")?;
        ctx.require_phase(SeasonPhase::WeekEnd)?;
        transition(tx, &mut ctx, SeasonPhase::SeasonComplete, Some(actor_id))?;
        Ok(ctx.season)
    })
}
