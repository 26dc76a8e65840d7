use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The challenge chosen for a week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeSelection {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub challenge: String,
    pub selected_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Marks the week's challenge as revealed to the players.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeReveal {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub revealed_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A player's submitted tracks for a week.
///
/// `tracks` comes pre-validated from the content service and is stored as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub player_id: Uuid,
    pub tracks: Vec<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Cursor over the week's presenters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationState {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub presenter_order: Vec<Uuid>,
    pub current_index: usize,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
}

impl PresentationState {
    pub fn current_presenter(&self) -> Option<Uuid> {
        if self.is_complete {
            return None;
        }
        self.presenter_order.get(self.current_index).copied()
    }
}

/// The week's award voting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSession {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub categories: Vec<String>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
}

/// One voter's pick in one category. Self-votes are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: Uuid,
    pub session_id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub voter_id: Uuid,
    pub category: String,
    pub nominee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A player's points and placement for a finalized week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyResult {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub player_id: Uuid,
    pub points: i64,
    /// Competition ranking: tied players share a placement.
    pub placement: u32,
    pub created_at: DateTime<Utc>,
}
