use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::{created, league_error, ApiResult, Created};
use crate::api::types::{Acting, ActorRequest, AwardCode, InventoryQuery, StartingPick, WeekQuery};
use crate::db::Database;
use crate::engine::advantage;
use crate::models::*;

// ============================================================
// Catalogue
// ============================================================

pub async fn list_catalog(State(db): State<Database>) -> ApiResult<Vec<Advantage>> {
    advantage::catalog(&db).map(Json).map_err(league_error)
}

pub async fn register_advantage(
    State(db): State<Database>,
    Json(input): Json<CreateAdvantageInput>,
) -> Created<Advantage> {
    advantage::register_advantage(&db, input)
        .map(created)
        .map_err(league_error)
}

// ============================================================
// Awards
// ============================================================

pub async fn list_awards(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Query(query): Query<WeekQuery>,
) -> ApiResult<Vec<AdvantageAward>> {
    advantage::list_awards(&db, season_id, query.week)
        .map(Json)
        .map_err(league_error)
}

pub async fn issue_awards(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<Vec<AdvantageAward>> {
    advantage::issue_week_awards(&db, season_id, week, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn revoke_awards(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<serde_json::Value> {
    advantage::revoke_week_awards(&db, season_id, week, body.requesting_actor_id)
        .map(|revoked| Json(serde_json::json!({ "revoked": revoked })))
        .map_err(league_error)
}

pub async fn select_award_code(
    State(db): State<Database>,
    Path((season_id, award_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<Acting<AwardCode>>,
) -> Created<PlayerInventory> {
    advantage::select_award_code(&db, season_id, award_id, &body.input.code, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn undo_award_selection(
    State(db): State<Database>,
    Path((season_id, award_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<AdvantageAward> {
    advantage::undo_selection(&db, season_id, award_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

// ============================================================
// Starting advantages
// ============================================================

pub async fn starting_selector(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Option<SeasonPlayer>> {
    advantage::starting_selector(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn select_starting_advantage(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<StartingPick>>,
) -> Created<PlayerInventory> {
    advantage::select_starting_advantage(
        &db,
        season_id,
        body.input.player_id,
        &body.input.code,
        body.requesting_actor_id,
    )
    .map(created)
    .map_err(league_error)
}

pub async fn reset_starting_advantages(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<serde_json::Value> {
    advantage::reset_starting_advantages(&db, season_id, body.requesting_actor_id)
        .map(|removed| Json(serde_json::json!({ "removed": removed })))
        .map_err(league_error)
}

// ============================================================
// Inventory
// ============================================================

pub async fn list_inventory(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Query(query): Query<InventoryQuery>,
) -> ApiResult<Vec<PlayerInventory>> {
    advantage::list_inventory(&db, season_id, query.player_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn play_advantage(
    State(db): State<Database>,
    Path((season_id, inventory_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<PlayerInventory> {
    advantage::play(&db, season_id, inventory_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}
