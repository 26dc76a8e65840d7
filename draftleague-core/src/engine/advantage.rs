//! Advantage awards, cooldowns and selection.
//!
//! Awards are issued as pending slots of a given tier; a concrete advantage
//! code is chosen later, which creates the matching inventory item.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::config::AwardConfig;
use crate::db::advantages::{NewAward, NewInventory};
use crate::db::{self, Database};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::SeasonContext;

// ============================================================
// Pure rules
// ============================================================

/// Categories each player swept, keyed by player.
///
/// A sweep is a nominee receiving a vote from every eligible voter in a
/// category. Self-votes are not allowed, so that is `total_players - 1`.
pub fn detect_sweeps(
    votes: &[Vote],
    categories: &[String],
    total_players: usize,
) -> BTreeMap<Uuid, Vec<String>> {
    let mut sweeps: BTreeMap<Uuid, Vec<String>> = BTreeMap::new();
    if total_players < 2 {
        return sweeps;
    }
    let needed = total_players - 1;
    for category in categories {
        let mut tally: BTreeMap<Uuid, usize> = BTreeMap::new();
        for vote in votes.iter().filter(|v| &v.category == category) {
            *tally.entry(vote.nominee_id).or_insert(0) += 1;
        }
        for (nominee, count) in tally {
            if count == needed {
                sweeps.entry(nominee).or_default().push(category.clone());
            }
        }
    }
    sweeps
}

/// Last week in which an award earned in `week` is still on cooldown.
pub fn cooldown_floor(config: &AwardConfig, week: u32, tier: u8) -> u32 {
    week + config.cooldown_for_tier(tier)
}

/// An award slot to be issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedAward {
    pub player_id: Uuid,
    pub tier: u8,
    pub source: AwardSource,
    pub reason: String,
}

/// Award slots for one week from sweeps and placements.
pub fn plan_awards(
    config: &AwardConfig,
    sweeps: &BTreeMap<Uuid, Vec<String>>,
    placements: &[(Uuid, u32)],
) -> Vec<PlannedAward> {
    let mut planned = Vec::new();

    for (player_id, categories) in sweeps {
        let earned = if config.sweeps_stack {
            categories.len()
        } else {
            categories.len().min(1)
        };
        let count = earned.min(config.max_sweep_advantages_per_week as usize);
        for category in categories.iter().take(count) {
            planned.push(PlannedAward {
                player_id: *player_id,
                tier: config.sweep_tier,
                source: AwardSource::Sweep,
                reason: format!("sweep:{category}"),
            });
        }
    }

    for (player_id, placement) in placements {
        if let Some(award) = config.placement_award(*placement) {
            for _ in 0..award.count {
                planned.push(PlannedAward {
                    player_id: *player_id,
                    tier: award.tier,
                    source: AwardSource::Placement,
                    reason: format!("placement:{placement}"),
                });
            }
        }
    }
    planned
}

// ============================================================
// Issuance
// ============================================================

/// Issue the awards of `week`. A week that already has awards returns them
/// unchanged.
pub fn issue_week_awards(
    db: &Database,
    season_id: Uuid,
    week: u32,
    actor_id: Uuid,
) -> LeagueResult<Vec<AdvantageAward>> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "issue advantages")?;
        issue_awards_in(tx, &ctx, week, Some(actor_id))
    })
}

pub(crate) fn issue_awards_in(
    conn: &Connection,
    ctx: &SeasonContext,
    week: u32,
    actor_id: Option<Uuid>,
) -> LeagueResult<Vec<AdvantageAward>> {
    let season_id = ctx.season_id();
    let existing = db::advantages::list_awards(conn, season_id, Some(week))?;
    if !existing.is_empty() {
        return Ok(existing);
    }

    let results = db::weekly::list_results(conn, season_id, week)?;
    if results.is_empty() {
        return Err(LeagueError::InvalidTransition(format!(
            "week {week} has no results yet"
        )));
    }
    let session = db::weekly::get_voting_session(conn, season_id, week)?
        .ok_or_else(|| LeagueError::not_found("voting session", format!("week {week}")))?;
    let votes = db::weekly::list_votes(conn, session.id)?;
    let total_players = db::seasons::list_players(conn, season_id)?.len();

    let config = &ctx.season.config.awards;
    let sweeps = detect_sweeps(&votes, &session.categories, total_players);
    let placements: Vec<(Uuid, u32)> = results.iter().map(|r| (r.player_id, r.placement)).collect();

    let mut awards = Vec::new();
    for planned in plan_awards(config, &sweeps, &placements) {
        awards.push(db::advantages::insert_award(
            conn,
            NewAward {
                season_id,
                player_id: planned.player_id,
                tier: planned.tier,
                awarded_via: planned.source,
                reason: planned.reason,
                earned_week: week,
                can_use_after_week: cooldown_floor(config, week, planned.tier),
            },
        )?);
    }

    tracing::info!(season = %season_id, week, "Issued {} advantage awards", awards.len());
    ctx.record(
        conn,
        EventType::AdvantagesAwarded,
        json!({ "week": week, "awards": awards.len(), "sweeps": sweeps }),
        actor_id,
    );
    Ok(awards)
}

/// Delete a week's unselected awards so issuance can run again.
pub fn revoke_week_awards(
    db: &Database,
    season_id: Uuid,
    week: u32,
    actor_id: Uuid,
) -> LeagueResult<usize> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "revoke advantages")?;
        let revoked = db::advantages::delete_pending_awards(tx, season_id, week)?;
        ctx.record(
            tx,
            EventType::AwardsRevoked,
            json!({ "week": week, "revoked": revoked }),
            Some(actor_id),
        );
        Ok(revoked)
    })
}

// ============================================================
// Selection
// ============================================================

fn catalog_entry(conn: &Connection, code: &str) -> LeagueResult<Advantage> {
    db::advantages::get_advantage(conn, code)?
        .ok_or_else(|| LeagueError::not_found("advantage", code))
}

fn ensure_not_held(conn: &Connection, player_id: Uuid, code: &str) -> LeagueResult<()> {
    if db::advantages::holds_code(conn, player_id, code)? {
        return Err(LeagueError::AlreadyExists(format!(
            "player {player_id} already holds {code}"
        )));
    }
    Ok(())
}

/// Fill a pending award slot with a concrete advantage code.
pub fn select_award_code(
    db: &Database,
    season_id: Uuid,
    award_id: Uuid,
    code: &str,
    actor_id: Uuid,
) -> LeagueResult<PlayerInventory> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "assign advantages")?;
        let award = db::advantages::get_award(tx, award_id)?
            .filter(|a| a.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("advantage award", award_id))?;
        if !award.slot.is_pending() {
            return Err(LeagueError::AlreadyExists(format!(
                "award {} already holds {}",
                award.id,
                award.slot.code().unwrap_or_default()
            )));
        }
        let advantage = catalog_entry(tx, code)?;
        if advantage.tier != award.tier {
            return Err(LeagueError::InvalidTransition(format!(
                "{} is tier {}, the award is tier {}",
                advantage.code, advantage.tier, award.tier
            )));
        }
        ensure_not_held(tx, award.player_id, &advantage.code)?;
        let cap = ctx.season.config.awards.held_cap_for_tier(award.tier);
        let held = db::advantages::count_held_in_tier(tx, award.player_id, award.tier, None)?;
        if held >= cap {
            return Err(LeagueError::CapacityExceeded(format!(
                "player {} already holds {held} tier {} advantages (cap {cap})",
                award.player_id, award.tier
            )));
        }

        let item = db::advantages::insert_inventory(
            tx,
            NewInventory {
                season_id,
                player_id: award.player_id,
                advantage_code: advantage.code.clone(),
                tier: award.tier,
                origin: InventoryOrigin::Award,
                award_id: Some(award.id),
                earned_week: award.earned_week,
                can_use_after_week: award.can_use_after_week,
            },
        )?;
        db::advantages::set_award_slot(tx, award.id, Some((&advantage.code, item.id)))?;
        ctx.record(
            tx,
            EventType::AdvantageSelected,
            json!({ "award_id": award.id, "player_id": award.player_id, "code": advantage.code }),
            Some(actor_id),
        );
        Ok(item)
    })
}

/// Put a selected award back to pending and drop its inventory item.
pub fn undo_selection(
    db: &Database,
    season_id: Uuid,
    award_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<AdvantageAward> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "undo advantage selections")?;
        let award = db::advantages::get_award(tx, award_id)?
            .filter(|a| a.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("advantage award", award_id))?;
        let AwardSlot::Selected { code, inventory_id } = award.slot.clone() else {
            return Err(LeagueError::InvalidTransition(format!(
                "award {} has no selection",
                award.id
            )));
        };
        if let Some(item) = db::advantages::get_inventory(tx, inventory_id)? {
            if item.status == InventoryStatus::Played {
                return Err(LeagueError::InvalidTransition(format!(
                    "{code} was already played in week {}",
                    item.played_week.unwrap_or_default()
                )));
            }
            db::advantages::delete_inventory(tx, item.id)?;
        }
        db::advantages::set_award_slot(tx, award.id, None)?;
        ctx.record(
            tx,
            EventType::AdvantageSelectionUndone,
            json!({ "award_id": award.id, "code": code }),
            Some(actor_id),
        );
        Ok(AdvantageAward {
            slot: AwardSlot::Pending,
            ..award
        })
    })
}

/// The player whose turn it is to pick starting advantages: reverse draft
/// order, first player whose quota is not yet full.
pub fn starting_selector(db: &Database, season_id: Uuid) -> LeagueResult<Option<SeasonPlayer>> {
    db.read(|conn| {
        let ctx = SeasonContext::load(conn, season_id)?;
        current_starting_selector(conn, &ctx)
    })
}

fn current_starting_selector(
    conn: &Connection,
    ctx: &SeasonContext,
) -> LeagueResult<Option<SeasonPlayer>> {
    let quota = ctx.season.config.starting_advantages.total();
    let mut players = db::seasons::list_players(conn, ctx.season_id())?;
    players.sort_by_key(|p| std::cmp::Reverse(p.draft_position));
    for player in players {
        if db::advantages::count_by_origin(conn, player.id, InventoryOrigin::Starting)? < quota {
            return Ok(Some(player));
        }
    }
    Ok(None)
}

/// Pick a starting advantage for a player during advantage selection.
///
/// Players pick for themselves on their turn; the commissioner may pick for
/// anyone.
pub fn select_starting_advantage(
    db: &Database,
    season_id: Uuid,
    player_id: Uuid,
    code: &str,
    actor_id: Uuid,
) -> LeagueResult<PlayerInventory> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_phase(SeasonPhase::AdvantageSelection)?;
        let player = ctx.player(tx, player_id)?;
        if !ctx.is_authority(actor_id) {
            let on_turn = current_starting_selector(tx, &ctx)?;
            let acting = ctx.player_of_actor(tx, actor_id)?;
            match (on_turn, acting) {
                (Some(turn), Some(me)) if turn.id == me.id && me.id == player.id => {}
                (turn, _) => {
                    return Err(LeagueError::WrongTurn(match turn {
                        Some(turn) => format!("{} is selecting starting advantages", turn.display_name),
                        None => "starting advantage selection is finished".to_string(),
                    }));
                }
            }
        }

        let advantage = catalog_entry(tx, code)?;
        let cap = ctx.season.config.starting_advantages.cap_for_tier(advantage.tier);
        let held = db::advantages::count_held_in_tier(
            tx,
            player.id,
            advantage.tier,
            Some(InventoryOrigin::Starting),
        )?;
        if held >= cap {
            return Err(LeagueError::CapacityExceeded(format!(
                "{} already holds {held} tier {} starting advantages (cap {cap})",
                player.display_name, advantage.tier
            )));
        }
        ensure_not_held(tx, player.id, &advantage.code)?;

        let item = db::advantages::insert_inventory(
            tx,
            NewInventory {
                season_id,
                player_id: player.id,
                advantage_code: advantage.code.clone(),
                tier: advantage.tier,
                origin: InventoryOrigin::Starting,
                award_id: None,
                earned_week: 0,
                can_use_after_week: 0,
            },
        )?;
        ctx.record(
            tx,
            EventType::AdvantageSelected,
            json!({ "player_id": player.id, "code": advantage.code, "origin": "starting" }),
            Some(actor_id),
        );
        Ok(item)
    })
}

/// Delete every starting advantage so preseason selection can be redone.
pub fn reset_starting_advantages(
    db: &Database,
    season_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<usize> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "reset starting advantages")?;
        if ctx.season.status != SeasonStatus::Preseason {
            return Err(LeagueError::InvalidTransition(
                "starting advantages can only be reset before the season starts".to_string(),
            ));
        }
        let removed =
            db::advantages::delete_inventory_by_origin(tx, season_id, InventoryOrigin::Starting)?;
        tracing::info!(season = %season_id, "Reset {} starting advantages", removed);
        ctx.record(
            tx,
            EventType::StartingAdvantagesReset,
            json!({ "removed": removed }),
            Some(actor_id),
        );
        Ok(removed)
    })
}

/// Spend an inventory item. Fails while the item is on cooldown.
pub fn play(
    db: &Database,
    season_id: Uuid,
    inventory_id: Uuid,
    actor_id: Uuid,
) -> LeagueResult<PlayerInventory> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        let item = db::advantages::get_inventory(tx, inventory_id)?
            .filter(|i| i.season_id == season_id)
            .ok_or_else(|| LeagueError::not_found("inventory item", inventory_id))?;
        if !ctx.acts_for(tx, actor_id, item.player_id)? {
            return Err(LeagueError::Unauthorized(
                "only the holder or the commissioner may play an advantage".to_string(),
            ));
        }
        if ctx.season.status != SeasonStatus::InProgress {
            return Err(LeagueError::InvalidTransition(
                "advantages can only be played during the season".to_string(),
            ));
        }
        if item.status != InventoryStatus::Available {
            return Err(LeagueError::InvalidTransition(format!(
                "{} is {}",
                item.advantage_code,
                item.status.as_str()
            )));
        }
        let week = ctx.week();
        if week <= item.can_use_after_week {
            return Err(LeagueError::CapacityExceeded(format!(
                "{} is on cooldown until after week {}",
                item.advantage_code, item.can_use_after_week
            )));
        }

        db::advantages::set_inventory_status(tx, item.id, InventoryStatus::Played, Some(week))?;
        ctx.record(
            tx,
            EventType::AdvantagePlayed,
            json!({ "inventory_id": item.id, "player_id": item.player_id, "code": item.advantage_code }),
            Some(actor_id),
        );
        Ok(PlayerInventory {
            status: InventoryStatus::Played,
            played_week: Some(week),
            ..item
        })
    })
}

// ============================================================
// Catalogue & reads
// ============================================================

pub fn register_advantage(db: &Database, input: CreateAdvantageInput) -> LeagueResult<Advantage> {
    if !(1..=3).contains(&input.tier) {
        return Err(LeagueError::InvalidTransition(format!(
            "tier must be 1, 2 or 3, got {}",
            input.tier
        )));
    }
    db.transact(|tx| {
        if db::advantages::get_advantage(tx, &input.code)?.is_some() {
            return Err(LeagueError::AlreadyExists(format!("advantage {}", input.code)));
        }
        db::advantages::insert_advantage(tx, input)
    })
}

pub fn catalog(db: &Database) -> LeagueResult<Vec<Advantage>> {
    db.read(db::advantages::list_advantages)
}

pub fn list_awards(
    db: &Database,
    season_id: Uuid,
    week: Option<u32>,
) -> LeagueResult<Vec<AdvantageAward>> {
    db.read(|conn| db::advantages::list_awards(conn, season_id, week))
}

pub fn list_inventory(
    db: &Database,
    season_id: Uuid,
    player_id: Option<Uuid>,
) -> LeagueResult<Vec<PlayerInventory>> {
    db.read(|conn| db::advantages::list_inventory(conn, season_id, player_id))
}
