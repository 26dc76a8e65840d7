use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{created, league_error, ApiResult, Created};
use crate::api::types::{Acting, ActorRequest, DraftArtist, PromptChoice, ResetDraft};
use crate::db::Database;
use crate::engine::draft;
use crate::models::*;

pub async fn initialize_draft(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<DraftState> {
    draft::initialize(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_draft_board(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<DraftBoard> {
    draft::board(&db, season_id).map(Json).map_err(league_error)
}

pub async fn select_draft_prompt(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<PromptChoice>>,
) -> ApiResult<DraftPrompt> {
    draft::select_prompt(&db, season_id, body.input.prompt_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn draft_artist(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<DraftArtist>>,
) -> Created<DraftPick> {
    draft::draft_artist(
        &db,
        season_id,
        body.input.prompt_id,
        &body.input.artist_name,
        body.requesting_actor_id,
    )
    .map(created)
    .map_err(league_error)
}

pub async fn reset_draft(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<ResetDraft>>,
) -> ApiResult<DraftState> {
    draft::reset(&db, season_id, body.input.keep_order, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}
