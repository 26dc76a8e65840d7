use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::{created, league_error, ApiResult, Created};
use crate::api::types::{Acting, ActorRequest, AdvancePhase, PoolQuery, RosterQuery, WeekQuery};
use crate::db::Database;
use crate::engine::{events, league, phase};
use crate::models::*;

// ============================================================
// Leagues & Seasons
// ============================================================

pub async fn create_league(
    State(db): State<Database>,
    Json(input): Json<CreateLeagueInput>,
) -> Created<League> {
    league::create_league(&db, input)
        .map(created)
        .map_err(league_error)
}

pub async fn get_league(State(db): State<Database>, Path(id): Path<Uuid>) -> ApiResult<League> {
    league::get_league(&db, id).map(Json).map_err(league_error)
}

pub async fn list_seasons(
    State(db): State<Database>,
    Path(league_id): Path<Uuid>,
) -> ApiResult<Vec<Season>> {
    league::list_seasons(&db, league_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn create_season(
    State(db): State<Database>,
    Path(league_id): Path<Uuid>,
    Json(body): Json<Acting<CreateSeasonInput>>,
) -> Created<Season> {
    league::create_season(&db, league_id, body.input, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn get_season(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> ApiResult<SeasonOverview> {
    league::overview(&db, id).map(Json).map_err(league_error)
}

// ============================================================
// Players
// ============================================================

pub async fn add_player(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<AddSeasonPlayerInput>>,
) -> Created<SeasonPlayer> {
    league::add_player(&db, season_id, body.input, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn list_players(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Vec<SeasonPlayer>> {
    league::list_players(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn standings(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Vec<SeasonPlayer>> {
    league::standings(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_roster(
    State(db): State<Database>,
    Path((season_id, player_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<RosterQuery>,
) -> ApiResult<Vec<RosterSlot>> {
    league::roster(&db, season_id, player_id, query.status)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_pool(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Query(query): Query<PoolQuery>,
) -> ApiResult<Vec<PoolEntry>> {
    league::pool(&db, season_id, query.status)
        .map(Json)
        .map_err(league_error)
}

// ============================================================
// Prompts
// ============================================================

pub async fn add_category(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<CreateCategoryInput>>,
) -> Created<DraftCategory> {
    league::add_category(&db, season_id, body.input, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn list_categories(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Vec<DraftCategory>> {
    league::list_categories(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn add_prompt(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<CreatePromptInput>>,
) -> Created<DraftPrompt> {
    league::add_prompt(&db, season_id, body.input, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn list_prompts(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Vec<DraftPrompt>> {
    league::list_prompts(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

// ============================================================
// Phase ledger
// ============================================================

pub async fn advance_phase(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<AdvancePhase>>,
) -> ApiResult<Season> {
    phase::advance(&db, season_id, &body.input.target, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn start_week(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<Season> {
    phase::start_week(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn complete_season(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<Season> {
    phase::complete_season(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn list_events(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<EventEntry>> {
    events::list(&db, season_id, query.week)
        .map(Json)
        .map_err(league_error)
}
