use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{league_error, ApiResult};
use crate::api::types::ActorRequest;
use crate::db::Database;
use crate::engine::checkpoint::{self, CheckpointInfo, RollbackReport};

pub async fn list_checkpoints(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
) -> ApiResult<Vec<CheckpointInfo>> {
    checkpoint::list_checkpoints(&db, season_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn rollback_to_checkpoint(
    State(db): State<Database>,
    Path((season_id, checkpoint_id)): Path<(Uuid, String)>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<RollbackReport> {
    tracing::info!(season = %season_id, checkpoint = %checkpoint_id, "Rollback requested");
    checkpoint::rollback_to_checkpoint(&db, season_id, &checkpoint_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}
