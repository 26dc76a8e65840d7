use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{created, league_error, ApiResult, Created};
use crate::api::types::{Acting, ActorRequest, CutArtist, PoolPick, PromptChoice, RedraftArtist};
use crate::db::Database;
use crate::engine::evolution;
use crate::models::*;

pub async fn initialize_evolution(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<RosterEvolutionState> {
    evolution::initialize(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_evolution(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
) -> ApiResult<RosterEvolutionState> {
    evolution::get_state(&db, season_id, week)
        .map(Json)
        .map_err(league_error)
}

pub async fn cut_artist(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<CutArtist>>,
) -> Created<PoolEntry> {
    evolution::cut(&db, season_id, body.input.roster_entry_id, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn select_evolution_prompt(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<PromptChoice>>,
) -> ApiResult<RosterEvolutionState> {
    evolution::select_prompt(&db, season_id, body.input.prompt_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn redraft_artist(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<RedraftArtist>>,
) -> Created<RosterEntry> {
    evolution::redraft(&db, season_id, &body.input.artist_name, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn pool_draft(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<PoolPick>>,
) -> Created<RosterEntry> {
    evolution::pool_draft(&db, season_id, body.input.pool_entry_id, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn complete_evolution(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<Season> {
    evolution::complete_roster_evolution(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn rollback_evolution(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<RosterEvolutionState> {
    evolution::rollback(&db, season_id, week, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}
