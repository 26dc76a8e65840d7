use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SeasonPhase;

/// An immutable season log entry, stamped with the week and phase the season
/// was in when it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEntry {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub phase: SeasonPhase,
    pub event_type: EventType,
    pub payload: serde_json::Value,
    pub actor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    PhaseAdvanced,
    WeekStarted,
    SeasonCompleted,
    DraftInitialized,
    DraftPromptSelected,
    ArtistDrafted,
    DraftRoundCompleted,
    DraftCompleted,
    DraftReset,
    EvolutionStarted,
    ArtistCut,
    EvolutionPromptSelected,
    ArtistRedrafted,
    PoolArtistDrafted,
    EvolutionCompleted,
    EvolutionRolledBack,
    AdvantagesAwarded,
    AdvantageSelected,
    AdvantageSelectionUndone,
    AdvantagePlayed,
    AwardsRevoked,
    StartingAdvantagesReset,
    ChallengeSelected,
    ChallengeRevealed,
    TracksSubmitted,
    PresenterAdvanced,
    VoteCast,
    WeekFinalized,
    CheckpointRollback,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseAdvanced => "PHASE_ADVANCED",
            Self::WeekStarted => "WEEK_STARTED",
            Self::SeasonCompleted => "SEASON_COMPLETED",
            Self::DraftInitialized => "DRAFT_INITIALIZED",
            Self::DraftPromptSelected => "DRAFT_PROMPT_SELECTED",
            Self::ArtistDrafted => "ARTIST_DRAFTED",
            Self::DraftRoundCompleted => "DRAFT_ROUND_COMPLETED",
            Self::DraftCompleted => "DRAFT_COMPLETED",
            Self::DraftReset => "DRAFT_RESET",
            Self::EvolutionStarted => "EVOLUTION_STARTED",
            Self::ArtistCut => "ARTIST_CUT",
            Self::EvolutionPromptSelected => "EVOLUTION_PROMPT_SELECTED",
            Self::ArtistRedrafted => "ARTIST_REDRAFTED",
            Self::PoolArtistDrafted => "POOL_ARTIST_DRAFTED",
            Self::EvolutionCompleted => "EVOLUTION_COMPLETED",
            Self::EvolutionRolledBack => "EVOLUTION_ROLLED_BACK",
            Self::AdvantagesAwarded => "ADVANTAGES_AWARDED",
            Self::AdvantageSelected => "ADVANTAGE_SELECTED",
            Self::AdvantageSelectionUndone => "ADVANTAGE_SELECTION_UNDONE",
            Self::AdvantagePlayed => "ADVANTAGE_PLAYED",
            Self::AwardsRevoked => "AWARDS_REVOKED",
            Self::StartingAdvantagesReset => "STARTING_ADVANTAGES_RESET",
            Self::ChallengeSelected => "CHALLENGE_SELECTED",
            Self::ChallengeRevealed => "CHALLENGE_REVEALED",
            Self::TracksSubmitted => "TRACKS_SUBMITTED",
            Self::PresenterAdvanced => "PRESENTER_ADVANCED",
            Self::VoteCast => "VOTE_CAST",
            Self::WeekFinalized => "WEEK_FINALIZED",
            Self::CheckpointRollback => "CHECKPOINT_ROLLBACK",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub const ALL: [EventType; 29] = [
        Self::PhaseAdvanced,
        Self::WeekStarted,
        Self::SeasonCompleted,
        Self::DraftInitialized,
        Self::DraftPromptSelected,
        Self::ArtistDrafted,
        Self::DraftRoundCompleted,
        Self::DraftCompleted,
        Self::DraftReset,
        Self::EvolutionStarted,
        Self::ArtistCut,
        Self::EvolutionPromptSelected,
        Self::ArtistRedrafted,
        Self::PoolArtistDrafted,
        Self::EvolutionCompleted,
        Self::EvolutionRolledBack,
        Self::AdvantagesAwarded,
        Self::AdvantageSelected,
        Self::AdvantageSelectionUndone,
        Self::AdvantagePlayed,
        Self::AwardsRevoked,
        Self::StartingAdvantagesReset,
        Self::ChallengeSelected,
        Self::ChallengeRevealed,
        Self::TracksSubmitted,
        Self::PresenterAdvanced,
        Self::VoteCast,
        Self::WeekFinalized,
        Self::CheckpointRollback,
    ];

    /// Events written by the roster-evolution engine; an evolution rollback
    /// removes these for its week.
    pub fn is_evolution(&self) -> bool {
        matches!(
            self,
            Self::EvolutionStarted
                | Self::ArtistCut
                | Self::EvolutionPromptSelected
                | Self::ArtistRedrafted
                | Self::PoolArtistDrafted
                | Self::EvolutionCompleted
        )
    }
}
