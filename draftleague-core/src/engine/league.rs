//! League and season setup, plus the read models around them.

use uuid::Uuid;

use crate::db::{self, Database};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::SeasonContext;

pub fn create_league(db: &Database, input: CreateLeagueInput) -> LeagueResult<League> {
    if input.name.trim().is_empty() {
        return Err(LeagueError::InvalidTransition(
            "league name must not be empty".to_string(),
        ));
    }
    let league = db.transact(|tx| db::seasons::insert_league(tx, input))?;
    tracing::info!(league = %league.id, "Created league {}", league.name);
    Ok(league)
}

pub fn get_league(db: &Database, league_id: Uuid) -> LeagueResult<League> {
    db.read(|conn| {
        db::seasons::get_league(conn, league_id)?
            .ok_or_else(|| LeagueError::not_found("league", league_id))
    })
}

pub fn create_season(
    db: &Database,
    league_id: Uuid,
    input: CreateSeasonInput,
    actor_id: Uuid,
) -> LeagueResult<Season> {
    db.transact(|tx| {
        let league = db::seasons::get_league(tx, league_id)?
            .ok_or_else(|| LeagueError::not_found("league", league_id))?;
        if league.commissioner_id != actor_id {
            return Err(LeagueError::Unauthorized(
                "only the commissioner may create a season".to_string(),
            ));
        }
        let config = input.config.unwrap_or_default();
        let season = db::seasons::insert_season(tx, league.id, &input.name, config)?;
        tracing::info!(season = %season.id, league = %league.id, "Created season {}", season.name);
        Ok(season)
    })
}

pub fn list_seasons(db: &Database, league_id: Uuid) -> LeagueResult<Vec<Season>> {
    db.read(|conn| db::seasons::list_seasons(conn, league_id))
}

/// A season with its commissioner and current standings.
pub fn overview(db: &Database, season_id: Uuid) -> LeagueResult<SeasonOverview> {
    db.read(|conn| {
        let ctx = SeasonContext::load(conn, season_id)?;
        let standings = db::seasons::standings(conn, season_id)?;
        Ok(SeasonOverview {
            commissioner_id: ctx.league.commissioner_id,
            season: ctx.season,
            standings,
        })
    })
}

/// Enroll a league member. Only possible before the draft starts.
pub fn add_player(
    db: &Database,
    season_id: Uuid,
    input: AddSeasonPlayerInput,
    actor_id: Uuid,
) -> LeagueResult<SeasonPlayer> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "enroll players")?;
        ctx.require_phase(SeasonPhase::Setup)?;
        if db::seasons::find_player_by_user(tx, season_id, input.user_id)?.is_some() {
            return Err(LeagueError::AlreadyExists(format!(
                "user {} already plays in this season",
                input.user_id
            )));
        }
        db::seasons::insert_player(tx, season_id, input)
    })
}

pub fn list_players(db: &Database, season_id: Uuid) -> LeagueResult<Vec<SeasonPlayer>> {
    db.read(|conn| db::seasons::list_players(conn, season_id))
}

/// Players ordered by points, ties broken by draft position.
pub fn standings(db: &Database, season_id: Uuid) -> LeagueResult<Vec<SeasonPlayer>> {
    db.read(|conn| db::seasons::standings(conn, season_id))
}

pub fn add_category(
    db: &Database,
    season_id: Uuid,
    input: CreateCategoryInput,
    actor_id: Uuid,
) -> LeagueResult<DraftCategory> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "add prompt categories")?;
        db::draft::insert_category(tx, season_id, input)
    })
}

pub fn add_prompt(
    db: &Database,
    season_id: Uuid,
    input: CreatePromptInput,
    actor_id: Uuid,
) -> LeagueResult<DraftPrompt> {
    db.transact(|tx| {
        let ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "add prompts")?;
        if !db::draft::category_exists(tx, season_id, input.category_id)? {
            return Err(LeagueError::not_found("prompt category", input.category_id));
        }
        db::draft::insert_prompt(tx, season_id, input)
    })
}

pub fn list_categories(db: &Database, season_id: Uuid) -> LeagueResult<Vec<DraftCategory>> {
    db.read(|conn| db::draft::list_categories(conn, season_id))
}

pub fn list_prompts(db: &Database, season_id: Uuid) -> LeagueResult<Vec<DraftPrompt>> {
    db.read(|conn| db::draft::list_prompts(conn, season_id))
}

/// A player's roster, optionally filtered by status.
pub fn roster(
    db: &Database,
    season_id: Uuid,
    player_id: Uuid,
    status: Option<RosterStatus>,
) -> LeagueResult<Vec<RosterSlot>> {
    db.read(|conn| {
        let ctx = SeasonContext::load(conn, season_id)?;
        ctx.player(conn, player_id)?;
        db::roster::list_roster(conn, player_id, status)
    })
}

pub fn pool(db: &Database, season_id: Uuid, status: Option<PoolStatus>) -> LeagueResult<Vec<PoolEntry>> {
    db.read(|conn| db::roster::list_pool(conn, season_id, status))
}
