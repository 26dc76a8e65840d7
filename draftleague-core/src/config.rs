//! Per-season rules.
//!
//! A [`SeasonConfig`] is stored as JSON on the season row. Every field has a
//! default so a season can be created with `{}` and tuned later.

use serde::{Deserialize, Serialize};

use crate::models::{EvolutionSettings, WeekType};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeasonConfig {
    pub roster_size: u32,
    pub total_weeks: u32,
    pub starting_advantages: StartingAdvantageConfig,
    pub awards: AwardConfig,
    pub voting_categories: Vec<String>,
    pub evolution_weeks: Vec<EvolutionWeekConfig>,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            roster_size: 8,
            total_weeks: 10,
            starting_advantages: StartingAdvantageConfig::default(),
            awards: AwardConfig::default(),
            voting_categories: vec![
                "best_overall".to_string(),
                "most_creative".to_string(),
                "best_theme_fit".to_string(),
            ],
            evolution_weeks: Vec::new(),
        }
    }
}

impl SeasonConfig {
    /// Evolution settings for `week`, if that week ends with a roster evolution.
    pub fn evolution_for_week(&self, week: u32) -> Option<EvolutionSettings> {
        self.evolution_weeks
            .iter()
            .find(|w| w.week == week)
            .map(EvolutionWeekConfig::resolve)
    }
}

/// Number of starting advantages each player selects, per tier.
///
/// The counts double as the per-tier cap on starting selections.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StartingAdvantageConfig {
    pub tier1_count: u32,
    pub tier2_count: u32,
    pub tier3_count: u32,
}

impl Default for StartingAdvantageConfig {
    fn default() -> Self {
        Self {
            tier1_count: 1,
            tier2_count: 1,
            tier3_count: 0,
        }
    }
}

impl StartingAdvantageConfig {
    pub fn cap_for_tier(&self, tier: u8) -> u32 {
        match tier {
            1 => self.tier1_count,
            2 => self.tier2_count,
            3 => self.tier3_count,
            _ => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.tier1_count + self.tier2_count + self.tier3_count
    }
}

/// Weekly advantage issuance rules.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AwardConfig {
    /// Whether several sweeps in one week earn several awards.
    pub sweeps_stack: bool,
    /// Sweep awards one player may earn in a single week. Each sweeping
    /// player has their own cap; there is no league-wide total.
    pub max_sweep_advantages_per_week: u32,
    pub sweep_tier: u8,
    pub placement_awards: Vec<PlacementAward>,
    /// Weeks of cooldown indexed by `tier - 1`.
    pub cooldown_by_tier: [u32; 3],
    /// Cap on AVAILABLE inventory per tier when selecting award codes,
    /// indexed by `tier - 1`.
    pub max_held_per_tier: [u32; 3],
}

impl Default for AwardConfig {
    fn default() -> Self {
        Self {
            sweeps_stack: false,
            max_sweep_advantages_per_week: 1,
            sweep_tier: 2,
            placement_awards: vec![
                PlacementAward {
                    placement: 1,
                    count: 1,
                    tier: 2,
                },
                PlacementAward {
                    placement: 2,
                    count: 1,
                    tier: 1,
                },
                PlacementAward {
                    placement: 3,
                    count: 1,
                    tier: 1,
                },
            ],
            cooldown_by_tier: [0, 1, 1],
            max_held_per_tier: [3, 2, 1],
        }
    }
}

impl AwardConfig {
    pub fn cooldown_for_tier(&self, tier: u8) -> u32 {
        tier_index(tier)
            .map(|i| self.cooldown_by_tier[i])
            .unwrap_or(0)
    }

    pub fn held_cap_for_tier(&self, tier: u8) -> u32 {
        tier_index(tier)
            .map(|i| self.max_held_per_tier[i])
            .unwrap_or(0)
    }

    pub fn placement_award(&self, placement: u32) -> Option<&PlacementAward> {
        self.placement_awards
            .iter()
            .find(|p| p.placement == placement && p.count > 0)
    }
}

fn tier_index(tier: u8) -> Option<usize> {
    match tier {
        1..=3 => Some(usize::from(tier) - 1),
        _ => None,
    }
}

/// Awards issued for finishing a week at `placement` (1..=4).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlacementAward {
    pub placement: u32,
    pub count: u32,
    pub tier: u8,
}

/// A week that ends with a roster evolution. Unset counts fall back to the
/// defaults of the week type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvolutionWeekConfig {
    pub week: u32,
    pub week_type: WeekType,
    #[serde(default)]
    pub self_cut_count: Option<u32>,
    #[serde(default)]
    pub redraft_count: Option<u32>,
    #[serde(default)]
    pub pool_draft: Option<bool>,
}

impl EvolutionWeekConfig {
    pub fn resolve(&self) -> EvolutionSettings {
        let (cuts, redrafts, pool) = match self.week_type {
            WeekType::Growth => (0, 1, false),
            WeekType::Chaos => (1, 1, true),
        };
        EvolutionSettings {
            week_type: self.week_type,
            self_cut_count: self.self_cut_count.unwrap_or(cuts),
            redraft_count: self.redraft_count.unwrap_or(redrafts),
            pool_draft: self.pool_draft.unwrap_or(pool),
        }
    }
}
