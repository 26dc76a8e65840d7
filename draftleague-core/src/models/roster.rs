use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Links a season player to an artist.
///
/// Entries acquired through the main draft (`acquired_via == Draft`) or in
/// week 0 are protected: in-season rollbacks never delete them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: Uuid,
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub artist_id: Uuid,
    /// The prompt that justified the pick; absent for pool-draft pickups.
    pub prompt_id: Option<Uuid>,
    pub status: RosterStatus,
    pub acquired_via: AcquiredVia,
    pub acquired_at_week: u32,
    pub acquired_at_round: u32,
    /// Set when the entry was claimed from the pool.
    pub pool_entry_id: Option<Uuid>,
    /// Week in which the entry was cut, while `status == Cut`.
    pub cut_at_week: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl RosterEntry {
    /// Whether checkpoint rollbacks must leave this entry in place.
    pub fn is_rollback_protected(&self) -> bool {
        self.acquired_via == AcquiredVia::Draft || self.acquired_at_week == 0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RosterStatus {
    Active,
    Cut,
    Benched,
}

impl RosterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Cut => "cut",
            Self::Benched => "benched",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "cut" => Some(Self::Cut),
            "benched" => Some(Self::Benched),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AcquiredVia {
    Draft,
    Pool,
    Traded,
}

impl AcquiredVia {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pool => "pool",
            Self::Traded => "traded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "pool" => Some(Self::Pool),
            "traded" => Some(Self::Traded),
            _ => None,
        }
    }
}

/// An artist cut from a roster and made available to others.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolEntry {
    pub id: Uuid,
    pub season_id: Uuid,
    pub artist_id: Uuid,
    /// The roster entry that was cut to create this pool entry.
    pub roster_entry_id: Uuid,
    pub cut_by_player_id: Uuid,
    pub cut_at_week: u32,
    pub status: PoolStatus,
    pub drafted_by_player_id: Option<Uuid>,
    pub drafted_at_week: Option<u32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolStatus {
    Available,
    Drafted,
    Banished,
}

impl PoolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Drafted => "drafted",
            Self::Banished => "banished",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "drafted" => Some(Self::Drafted),
            "banished" => Some(Self::Banished),
            _ => None,
        }
    }
}

/// A roster entry joined with its artist name, for roster listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSlot {
    #[serde(flatten)]
    pub entry: RosterEntry,
    pub artist_name: String,
}
