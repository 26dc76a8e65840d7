use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::{created, league_error, ApiResult, Created};
use crate::api::types::{Acting, ActorRequest, Ballot, ChallengeChoice, TrackSubmission};
use crate::db::Database;
use crate::engine::weekly::{self, WeekSummary};
use crate::models::*;

pub async fn select_challenge(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<ChallengeChoice>>,
) -> Created<ChallengeSelection> {
    weekly::select_challenge(&db, season_id, &body.input.challenge, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn reveal_challenge(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<ChallengeReveal> {
    weekly::reveal_challenge(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn submit_tracks(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<TrackSubmission>>,
) -> ApiResult<Submission> {
    let TrackSubmission { player_id, tracks } = body.input;
    weekly::submit_tracks(&db, season_id, player_id, tracks, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn list_submissions(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
) -> ApiResult<Vec<Submission>> {
    weekly::list_submissions(&db, season_id, week)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_presentation(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
) -> ApiResult<PresentationState> {
    weekly::presentation(&db, season_id, week)
        .map(Json)
        .map_err(league_error)
}

pub async fn advance_presenter(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<PresentationState> {
    weekly::advance_presenter(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_voting_session(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
) -> ApiResult<VotingSession> {
    weekly::voting_session(&db, season_id, week)
        .map(Json)
        .map_err(league_error)
}

pub async fn cast_vote(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<Acting<Ballot>>,
) -> Created<Vote> {
    let Ballot {
        voter_id,
        category,
        nominee_id,
    } = body.input;
    weekly::cast_vote(&db, season_id, voter_id, &category, nominee_id, body.requesting_actor_id)
        .map(created)
        .map_err(league_error)
}

pub async fn finalize_week(
    State(db): State<Database>,
    Path(season_id): Path<Uuid>,
    Json(body): Json<ActorRequest>,
) -> ApiResult<WeekSummary> {
    weekly::finalize_week(&db, season_id, body.requesting_actor_id)
        .map(Json)
        .map_err(league_error)
}

pub async fn get_results(
    State(db): State<Database>,
    Path((season_id, week)): Path<(Uuid, u32)>,
) -> ApiResult<Vec<WeeklyResult>> {
    weekly::results(&db, season_id, week)
        .map(Json)
        .map_err(league_error)
}
