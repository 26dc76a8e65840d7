use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flavour of a roster-evolution week.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeekType {
    /// Rosters grow: redraft only.
    Growth,
    /// Rosters churn: cut, redraft, then draft from the pool.
    Chaos,
}

impl WeekType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Chaos => "chaos",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "growth" => Some(Self::Growth),
            "chaos" => Some(Self::Chaos),
            _ => None,
        }
    }
}

/// Sub-phases of a roster-evolution week, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionPhase {
    SelfCut,
    PromptSelection,
    Redraft,
    PoolDraft,
    Complete,
}

impl EvolutionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfCut => "self_cut",
            Self::PromptSelection => "prompt_selection",
            Self::Redraft => "redraft",
            Self::PoolDraft => "pool_draft",
            Self::Complete => "complete",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "self_cut" => Some(Self::SelfCut),
            "prompt_selection" => Some(Self::PromptSelection),
            "redraft" => Some(Self::Redraft),
            "pool_draft" => Some(Self::PoolDraft),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    /// First sub-phase for a week with the given settings.
    pub fn initial(settings: &EvolutionSettings) -> Self {
        if settings.self_cut_count > 0 {
            Self::SelfCut
        } else {
            Self::after_self_cut(settings)
        }
    }

    /// Sub-phase that follows a satisfied self-cut quota.
    pub fn after_self_cut(settings: &EvolutionSettings) -> Self {
        if settings.redraft_count > 0 {
            Self::PromptSelection
        } else {
            Self::after_redraft(settings)
        }
    }

    /// Sub-phase that follows a finished redraft.
    pub fn after_redraft(settings: &EvolutionSettings) -> Self {
        if settings.pool_draft {
            Self::PoolDraft
        } else {
            Self::Complete
        }
    }
}

/// Resolved per-week evolution settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvolutionSettings {
    pub week_type: WeekType,
    pub self_cut_count: u32,
    pub redraft_count: u32,
    pub pool_draft: bool,
}

/// Per-player progress counters of the current evolution week.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvolutionProgress {
    pub cuts: BTreeMap<Uuid, u32>,
    pub redrafts: BTreeMap<Uuid, u32>,
    pub pool_picks: BTreeMap<Uuid, u32>,
}

impl EvolutionProgress {
    pub fn cuts_of(&self, player_id: Uuid) -> u32 {
        self.cuts.get(&player_id).copied().unwrap_or(0)
    }

    pub fn redrafts_of(&self, player_id: Uuid) -> u32 {
        self.redrafts.get(&player_id).copied().unwrap_or(0)
    }
}

/// The roster-evolution sub-state machine for one (season, week).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEvolutionState {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u32,
    pub current_phase: EvolutionPhase,
    pub settings: EvolutionSettings,
    pub progress: EvolutionProgress,
    /// The last-place player, who picks the redraft prompt.
    pub prompt_picker_id: Uuid,
    pub selected_prompt_id: Option<Uuid>,
    /// Reverse standings: last place first.
    pub redraft_order: Vec<Uuid>,
    pub pool_draft_order: Vec<Uuid>,
    pub redraft_round: u32,
    pub redraft_picker_index: usize,
    pub pool_draft_index: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RosterEvolutionState {
    pub fn current_redraft_picker(&self) -> Option<Uuid> {
        if self.current_phase != EvolutionPhase::Redraft {
            return None;
        }
        self.redraft_order.get(self.redraft_picker_index).copied()
    }

    pub fn current_pool_picker(&self) -> Option<Uuid> {
        if self.current_phase != EvolutionPhase::PoolDraft {
            return None;
        }
        self.pool_draft_order.get(self.pool_draft_index).copied()
    }
}
