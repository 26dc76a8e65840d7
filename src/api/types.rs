//! Request bodies and query strings of the HTTP API.
//!
//! Every mutating request names the acting user in `requesting_actor_id`;
//! the engines authorize against it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{PoolStatus, RosterStatus};

/// A mutating request with no payload beyond the actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRequest {
    pub requesting_actor_id: Uuid,
}

/// A payload `T` sent on behalf of `requesting_actor_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acting<T> {
    pub requesting_actor_id: Uuid,
    #[serde(flatten)]
    pub input: T,
}

impl<T> Acting<T> {
    pub fn new(requesting_actor_id: Uuid, input: T) -> Self {
        Self {
            requesting_actor_id,
            input,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancePhase {
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptChoice {
    pub prompt_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftArtist {
    pub prompt_id: Uuid,
    pub artist_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetDraft {
    #[serde(default)]
    pub keep_order: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CutArtist {
    pub roster_entry_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedraftArtist {
    pub artist_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolPick {
    pub pool_entry_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardCode {
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingPick {
    pub player_id: Uuid,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeChoice {
    pub challenge: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackSubmission {
    pub player_id: Uuid,
    pub tracks: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    pub voter_id: Uuid,
    pub category: String,
    pub nominee_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekQuery {
    pub week: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterQuery {
    pub status: Option<RosterStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolQuery {
    pub status: Option<PoolStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryQuery {
    pub player_id: Option<Uuid>,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error kind, e.g. `wrong_turn`.
    pub error: String,
    pub message: String,
}
