use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalogue advantage that players can select into their inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advantage {
    pub code: String,
    pub name: String,
    /// 1, 2 or 3; higher tiers are stronger.
    pub tier: u8,
    pub description: Option<String>,
}

/// Input for registering a catalogue advantage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAdvantageInput {
    pub code: String,
    pub name: String,
    pub tier: u8,
    pub description: Option<String>,
}

/// How an award was earned.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AwardSource {
    Placement,
    Sweep,
}

impl AwardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placement => "placement",
            Self::Sweep => "sweep",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "placement" => Some(Self::Placement),
            "sweep" => Some(Self::Sweep),
            _ => None,
        }
    }
}

/// The concrete content of an award slot.
///
/// Awards are issued before their holder picks a code; the slot stays
/// `Pending` until a selection is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AwardSlot {
    Pending,
    Selected { code: String, inventory_id: Uuid },
}

impl AwardSlot {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Selected { code, .. } => Some(code),
        }
    }
}

/// One earned advantage slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvantageAward {
    pub id: Uuid,
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub tier: u8,
    pub awarded_via: AwardSource,
    /// Sweep category or placement ("placement:1") that earned the award.
    pub reason: String,
    pub earned_week: u32,
    /// Cooldown floor: the award is usable once `current_week > can_use_after_week`.
    pub can_use_after_week: u32,
    pub slot: AwardSlot,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Available,
    Played,
    Expired,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Played => "played",
            Self::Expired => "expired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "played" => Some(Self::Played),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

/// Where an inventory item came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InventoryOrigin {
    /// Chosen during the preseason advantage selection.
    Starting,
    /// Selected into an [`AdvantageAward`] slot.
    Award,
}

impl InventoryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Award => "award",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "starting" => Some(Self::Starting),
            "award" => Some(Self::Award),
            _ => None,
        }
    }
}

/// A concrete advantage held by a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInventory {
    pub id: Uuid,
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub advantage_code: String,
    pub tier: u8,
    pub origin: InventoryOrigin,
    pub award_id: Option<Uuid>,
    pub status: InventoryStatus,
    pub earned_week: u32,
    pub can_use_after_week: u32,
    pub played_week: Option<u32>,
    pub created_at: DateTime<Utc>,
}
