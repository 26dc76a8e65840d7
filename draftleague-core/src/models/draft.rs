use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of rounds in the main draft.
pub const DRAFT_ROUNDS: u32 = 8;

/// The singleton snake-draft cursor of a season.
///
/// `draft_order` is a permutation of season player ids fixed when the draft
/// is initialized; `current_picker_index` indexes into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftState {
    pub season_id: Uuid,
    pub current_round: u32,
    pub current_picker_index: usize,
    pub draft_order: Vec<Uuid>,
    pub is_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftState {
    /// The season player whose turn it is, if the draft is still running.
    pub fn current_picker(&self) -> Option<Uuid> {
        if self.is_complete {
            return None;
        }
        self.draft_order.get(self.current_picker_index).copied()
    }
}

/// A grouping of prompts (e.g. "Decades", "Genres").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftCategory {
    pub id: Uuid,
    pub season_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A prompt that justifies draft picks for one round.
///
/// Prompts cycle `Open → Selected → Retired` once per usable lifetime; the
/// selector and round are cleared again on retirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPrompt {
    pub id: Uuid,
    pub season_id: Uuid,
    pub category_id: Uuid,
    pub text: String,
    pub status: PromptStatus,
    pub selected_by_player_id: Option<Uuid>,
    pub selected_at_round: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PromptStatus {
    Open,
    Selected,
    Retired,
}

impl PromptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Selected => "selected",
            Self::Retired => "retired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "open" => Some(Self::Open),
            "selected" => Some(Self::Selected),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

/// An artist known to the season. Names are not unique: redrafts always
/// create a fresh row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: Uuid,
    pub season_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A recorded pick of the main draft. Never touched by in-season rollbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftPick {
    pub id: Uuid,
    pub season_id: Uuid,
    pub round: u32,
    /// 1-based overall pick number.
    pub pick_number: u32,
    pub player_id: Uuid,
    pub prompt_id: Uuid,
    pub artist_id: Uuid,
    pub roster_entry_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a prompt category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
}

/// Input for adding a prompt to a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromptInput {
    pub category_id: Uuid,
    pub text: String,
}

/// Read model of the draft for a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftBoard {
    pub state: DraftState,
    pub current_picker_id: Option<Uuid>,
    /// The prompt selected for the current round, once chosen.
    pub round_prompt: Option<DraftPrompt>,
    pub picks: Vec<DraftPick>,
}
