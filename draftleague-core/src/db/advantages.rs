use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use super::{now, parse_datetime, parse_uuid};
use crate::error::LeagueResult;
use crate::models::*;

// ============================================================
// Catalogue
// ============================================================

pub fn insert_advantage(conn: &Connection, input: CreateAdvantageInput) -> LeagueResult<Advantage> {
    conn.execute(
        "INSERT INTO advantages (code, name, tier, description) VALUES (?, ?, ?, ?)",
        (&input.code, &input.name, input.tier, &input.description),
    )?;
    Ok(Advantage {
        code: input.code,
        name: input.name,
        tier: input.tier,
        description: input.description,
    })
}

pub fn get_advantage(conn: &Connection, code: &str) -> LeagueResult<Option<Advantage>> {
    let advantage = conn
        .query_row(
            "SELECT code, name, tier, description FROM advantages WHERE code = ?",
            [code],
            |row| {
                Ok(Advantage {
                    code: row.get(0)?,
                    name: row.get(1)?,
                    tier: row.get(2)?,
                    description: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(advantage)
}

pub fn list_advantages(conn: &Connection) -> LeagueResult<Vec<Advantage>> {
    let mut stmt =
        conn.prepare("SELECT code, name, tier, description FROM advantages ORDER BY tier, code")?;
    let advantages = stmt
        .query_map([], |row| {
            Ok(Advantage {
                code: row.get(0)?,
                name: row.get(1)?,
                tier: row.get(2)?,
                description: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(advantages)
}

// ============================================================
// Awards
// ============================================================

/// Fields of a freshly issued award slot.
#[derive(Debug, Clone)]
pub struct NewAward {
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub tier: u8,
    pub awarded_via: AwardSource,
    pub reason: String,
    pub earned_week: u32,
    pub can_use_after_week: u32,
}

const AWARD_COLUMNS: &str = "id, season_id, player_id, tier, awarded_via, reason, earned_week, \
     can_use_after_week, advantage_code, inventory_id, created_at";

fn award_from_row(row: &Row<'_>) -> rusqlite::Result<AdvantageAward> {
    let code: Option<String> = row.get(8)?;
    let inventory_id: Option<String> = row.get(9)?;
    let slot = match (code, inventory_id) {
        (Some(code), Some(inventory_id)) => AwardSlot::Selected {
            code,
            inventory_id: parse_uuid(inventory_id),
        },
        _ => AwardSlot::Pending,
    };
    Ok(AdvantageAward {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        player_id: parse_uuid(row.get(2)?),
        tier: row.get(3)?,
        awarded_via: AwardSource::from_str(&row.get::<_, String>(4)?)
            .unwrap_or(AwardSource::Placement),
        reason: row.get(5)?,
        earned_week: row.get(6)?,
        can_use_after_week: row.get(7)?,
        slot,
        created_at: parse_datetime(row.get(10)?),
    })
}

pub fn insert_award(conn: &Connection, input: NewAward) -> LeagueResult<AdvantageAward> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO advantage_awards (id, season_id, player_id, tier, awarded_via, reason, earned_week,
                                       can_use_after_week, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        (
            id.to_string(),
            input.season_id.to_string(),
            input.player_id.to_string(),
            input.tier,
            input.awarded_via.as_str(),
            &input.reason,
            input.earned_week,
            input.can_use_after_week,
            &created_at,
        ),
    )?;
    Ok(AdvantageAward {
        id,
        season_id: input.season_id,
        player_id: input.player_id,
        tier: input.tier,
        awarded_via: input.awarded_via,
        reason: input.reason,
        earned_week: input.earned_week,
        can_use_after_week: input.can_use_after_week,
        slot: AwardSlot::Pending,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_award(conn: &Connection, id: Uuid) -> LeagueResult<Option<AdvantageAward>> {
    let award = conn
        .query_row(
            &format!("SELECT {AWARD_COLUMNS} FROM advantage_awards WHERE id = ?"),
            [id.to_string()],
            award_from_row,
        )
        .optional()?;
    Ok(award)
}

pub fn list_awards(
    conn: &Connection,
    season_id: Uuid,
    week: Option<u32>,
) -> LeagueResult<Vec<AdvantageAward>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AWARD_COLUMNS} FROM advantage_awards
         WHERE season_id = ?1 AND (?2 IS NULL OR earned_week = ?2)
         ORDER BY earned_week, created_at, rowid"
    ))?;
    let awards = stmt
        .query_map((season_id.to_string(), week), award_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(awards)
}

/// Patch the slot of an award: `None` puts it back to pending.
pub fn set_award_slot(
    conn: &Connection,
    id: Uuid,
    selection: Option<(&str, Uuid)>,
) -> LeagueResult<()> {
    let (code, inventory_id) = match selection {
        Some((code, inventory_id)) => (Some(code.to_string()), Some(inventory_id.to_string())),
        None => (None, None),
    };
    conn.execute(
        "UPDATE advantage_awards SET advantage_code = ?, inventory_id = ? WHERE id = ?",
        (code, inventory_id, id.to_string()),
    )?;
    Ok(())
}

pub fn delete_pending_awards(conn: &Connection, season_id: Uuid, week: u32) -> LeagueResult<usize> {
    let rows = conn.execute(
        "DELETE FROM advantage_awards WHERE season_id = ? AND earned_week = ? AND advantage_code IS NULL",
        (season_id.to_string(), week),
    )?;
    Ok(rows)
}

// ============================================================
// Inventory
// ============================================================

/// Fields of a new inventory item.
#[derive(Debug, Clone)]
pub struct NewInventory {
    pub season_id: Uuid,
    pub player_id: Uuid,
    pub advantage_code: String,
    pub tier: u8,
    pub origin: InventoryOrigin,
    pub award_id: Option<Uuid>,
    pub earned_week: u32,
    pub can_use_after_week: u32,
}

const INVENTORY_COLUMNS: &str = "id, season_id, player_id, advantage_code, tier, origin, award_id, status, \
     earned_week, can_use_after_week, played_week, created_at";

fn inventory_from_row(row: &Row<'_>) -> rusqlite::Result<PlayerInventory> {
    Ok(PlayerInventory {
        id: parse_uuid(row.get(0)?),
        season_id: parse_uuid(row.get(1)?),
        player_id: parse_uuid(row.get(2)?),
        advantage_code: row.get(3)?,
        tier: row.get(4)?,
        origin: InventoryOrigin::from_str(&row.get::<_, String>(5)?)
            .unwrap_or(InventoryOrigin::Award),
        award_id: row.get::<_, Option<String>>(6)?.map(parse_uuid),
        status: InventoryStatus::from_str(&row.get::<_, String>(7)?)
            .unwrap_or(InventoryStatus::Available),
        earned_week: row.get(8)?,
        can_use_after_week: row.get(9)?,
        played_week: row.get(10)?,
        created_at: parse_datetime(row.get(11)?),
    })
}

pub fn insert_inventory(conn: &Connection, input: NewInventory) -> LeagueResult<PlayerInventory> {
    let id = Uuid::new_v4();
    let created_at = now();
    conn.execute(
        "INSERT INTO player_inventory (id, season_id, player_id, advantage_code, tier, origin, award_id, status,
                                       earned_week, can_use_after_week, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, 'available', ?, ?, ?)",
        (
            id.to_string(),
            input.season_id.to_string(),
            input.player_id.to_string(),
            &input.advantage_code,
            input.tier,
            input.origin.as_str(),
            input.award_id.map(|u| u.to_string()),
            input.earned_week,
            input.can_use_after_week,
            &created_at,
        ),
    )?;
    Ok(PlayerInventory {
        id,
        season_id: input.season_id,
        player_id: input.player_id,
        advantage_code: input.advantage_code,
        tier: input.tier,
        origin: input.origin,
        award_id: input.award_id,
        status: InventoryStatus::Available,
        earned_week: input.earned_week,
        can_use_after_week: input.can_use_after_week,
        played_week: None,
        created_at: parse_datetime(created_at),
    })
}

pub fn get_inventory(conn: &Connection, id: Uuid) -> LeagueResult<Option<PlayerInventory>> {
    let item = conn
        .query_row(
            &format!("SELECT {INVENTORY_COLUMNS} FROM player_inventory WHERE id = ?"),
            [id.to_string()],
            inventory_from_row,
        )
        .optional()?;
    Ok(item)
}

pub fn list_inventory(
    conn: &Connection,
    season_id: Uuid,
    player_id: Option<Uuid>,
) -> LeagueResult<Vec<PlayerInventory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INVENTORY_COLUMNS} FROM player_inventory
         WHERE season_id = ?1 AND (?2 IS NULL OR player_id = ?2)
         ORDER BY created_at, rowid"
    ))?;
    let items = stmt
        .query_map(
            (season_id.to_string(), player_id.map(|u| u.to_string())),
            inventory_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(items)
}

pub fn patch_inventory_code(
    conn: &Connection,
    id: Uuid,
    code: &str,
    tier: u8,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE player_inventory SET advantage_code = ?, tier = ? WHERE id = ?",
        (code, tier, id.to_string()),
    )?;
    Ok(())
}

pub fn set_inventory_status(
    conn: &Connection,
    id: Uuid,
    status: InventoryStatus,
    played_week: Option<u32>,
) -> LeagueResult<()> {
    conn.execute(
        "UPDATE player_inventory SET status = ?, played_week = ? WHERE id = ?",
        (status.as_str(), played_week, id.to_string()),
    )?;
    Ok(())
}

pub fn delete_inventory(conn: &Connection, id: Uuid) -> LeagueResult<bool> {
    let rows = conn.execute("DELETE FROM player_inventory WHERE id = ?", [id.to_string()])?;
    Ok(rows > 0)
}

pub fn delete_inventory_by_origin(
    conn: &Connection,
    season_id: Uuid,
    origin: InventoryOrigin,
) -> LeagueResult<usize> {
    let rows = conn.execute(
        "DELETE FROM player_inventory WHERE season_id = ? AND origin = ?",
        (season_id.to_string(), origin.as_str()),
    )?;
    Ok(rows)
}

/// Number of AVAILABLE items a player holds in `tier`, optionally by origin.
pub fn count_held_in_tier(
    conn: &Connection,
    player_id: Uuid,
    tier: u8,
    origin: Option<InventoryOrigin>,
) -> LeagueResult<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM player_inventory
         WHERE player_id = ?1 AND tier = ?2 AND status = 'available' AND (?3 IS NULL OR origin = ?3)",
        (player_id.to_string(), tier, origin.map(|o| o.as_str())),
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn count_by_origin(
    conn: &Connection,
    player_id: Uuid,
    origin: InventoryOrigin,
) -> LeagueResult<u32> {
    let count: u32 = conn.query_row(
        "SELECT COUNT(*) FROM player_inventory WHERE player_id = ? AND origin = ?",
        (player_id.to_string(), origin.as_str()),
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Whether the player holds `code` as an AVAILABLE item.
pub fn holds_code(conn: &Connection, player_id: Uuid, code: &str) -> LeagueResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM player_inventory WHERE player_id = ? AND advantage_code = ? AND status = 'available'",
        (player_id.to_string(), code),
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn expire_available(conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
    let rows = conn.execute(
        "UPDATE player_inventory SET status = 'expired' WHERE season_id = ? AND status = 'available'",
        [season_id.to_string()],
    )?;
    Ok(rows)
}

/// Put items played in `week` or later back to AVAILABLE.
pub fn unplay_from_week(conn: &Connection, season_id: Uuid, week: u32) -> LeagueResult<usize> {
    let rows = conn.execute(
        "UPDATE player_inventory SET status = 'available', played_week = NULL
         WHERE season_id = ? AND status = 'played' AND played_week >= ?",
        (season_id.to_string(), week),
    )?;
    Ok(rows)
}
