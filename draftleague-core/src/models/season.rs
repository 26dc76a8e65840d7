use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SeasonConfig;

/// A league groups the seasons played by the same members.
///
/// The commissioner is the league authority: the only actor allowed to move
/// the season forward, roll it back, or act on behalf of another player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct League {
    pub id: Uuid,
    pub name: String,
    pub commissioner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A single multi-week season of a league.
///
/// `current_phase` only ever moves forward through [`SeasonPhase::order`],
/// except for the week loop (which cycles back to `ChallengeSelection` while
/// bumping `current_week`) and explicit checkpoint rollbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: Uuid,
    pub league_id: Uuid,
    pub name: String,
    pub status: SeasonStatus,
    pub current_week: u32,
    pub current_phase: SeasonPhase,
    pub config: SeasonConfig,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Preseason,
    InProgress,
    Completed,
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preseason => "preseason",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "preseason" => Some(Self::Preseason),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// The season phase set, in its fixed total order.
///
/// `Ord` follows declaration order, so `a < b` means `a` comes first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPhase {
    Setup,
    Drafting,
    AdvantageSelection,
    Ready,
    ChallengeSelection,
    Submission,
    Presentation,
    Voting,
    WeekEnd,
    RosterEvolution,
    SeasonComplete,
}

impl SeasonPhase {
    pub const ALL: [SeasonPhase; 11] = [
        Self::Setup,
        Self::Drafting,
        Self::AdvantageSelection,
        Self::Ready,
        Self::ChallengeSelection,
        Self::Submission,
        Self::Presentation,
        Self::Voting,
        Self::WeekEnd,
        Self::RosterEvolution,
        Self::SeasonComplete,
    ];

    /// Position of the phase in the total order.
    pub fn order(&self) -> u8 {
        *self as u8
    }

    /// Phases belonging to the weekly loop.
    pub fn is_weekly(&self) -> bool {
        matches!(
            self,
            Self::ChallengeSelection
                | Self::Submission
                | Self::Presentation
                | Self::Voting
                | Self::WeekEnd
                | Self::RosterEvolution
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Drafting => "drafting",
            Self::AdvantageSelection => "advantage_selection",
            Self::Ready => "ready",
            Self::ChallengeSelection => "challenge_selection",
            Self::Submission => "submission",
            Self::Presentation => "presentation",
            Self::Voting => "voting",
            Self::WeekEnd => "week_end",
            Self::RosterEvolution => "roster_evolution",
            Self::SeasonComplete => "season_complete",
        }
    }

    /// Accepts both the stored form (`week_end`) and the shouting form (`WEEK_END`).
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == normalized)
    }
}

impl std::fmt::Display for SeasonPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A league member's participation in one season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonPlayer {
    pub id: Uuid,
    pub season_id: Uuid,
    /// The member's account id; this is what `requesting_actor_id` is compared against.
    pub user_id: Uuid,
    pub display_name: String,
    /// 1-based slot in the draft order, assigned when the draft is initialized.
    pub draft_position: Option<u32>,
    pub total_points: i64,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a league.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLeagueInput {
    pub name: String,
    pub commissioner_id: Uuid,
}

/// Input for creating a season. The config falls back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSeasonInput {
    pub name: String,
    #[serde(default)]
    pub config: Option<SeasonConfig>,
}

/// Input for enrolling a league member in a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddSeasonPlayerInput {
    pub user_id: Uuid,
    pub display_name: String,
}

/// A season together with its players in standings order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonOverview {
    #[serde(flatten)]
    pub season: Season,
    pub commissioner_id: Uuid,
    pub standings: Vec<SeasonPlayer>,
}
