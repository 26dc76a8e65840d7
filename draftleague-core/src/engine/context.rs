use rusqlite::Connection;
use uuid::Uuid;

use crate::db::seasons;
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::events;

/// The season document shared by every engine, loaded once per operation.
///
/// Engines read the ledger position from here and move it only through
/// [`SeasonContext::set_position`], which keeps the in-memory copy and the
/// stored row in step for the rest of the transaction.
#[derive(Debug, Clone)]
pub struct SeasonContext {
    pub season: Season,
    pub league: League,
}

impl SeasonContext {
    pub fn load(conn: &Connection, season_id: Uuid) -> LeagueResult<Self> {
        let season = seasons::get_season(conn, season_id)?
            .ok_or_else(|| LeagueError::not_found("season", season_id))?;
        let league = seasons::get_league(conn, season.league_id)?
            .ok_or_else(|| LeagueError::not_found("league", season.league_id))?;
        Ok(Self { season, league })
    }

    pub fn season_id(&self) -> Uuid {
        self.season.id
    }

    pub fn phase(&self) -> SeasonPhase {
        self.season.current_phase
    }

    pub fn week(&self) -> u32 {
        self.season.current_week
    }

    pub fn is_authority(&self, actor_id: Uuid) -> bool {
        self.league.commissioner_id == actor_id
    }

    pub fn require_authority(&self, actor_id: Uuid, action: &str) -> LeagueResult<()> {
        if self.is_authority(actor_id) {
            return Ok(());
        }
        tracing::debug!(season = %self.season.id, actor = %actor_id, "rejected {action}: not the commissioner");
        Err(LeagueError::Unauthorized(format!(
            "only the commissioner may {action}"
        )))
    }

    pub fn require_phase(&self, phase: SeasonPhase) -> LeagueResult<()> {
        if self.season.current_phase == phase {
            return Ok(());
        }
        Err(LeagueError::InvalidTransition(format!(
            "season is in phase {}, expected {}",
            self.season.current_phase, phase
        )))
    }

    /// Load a player and check it belongs to this season.
    pub fn player(&self, conn: &Connection, player_id: Uuid) -> LeagueResult<SeasonPlayer> {
        seasons::get_player(conn, player_id)?
            .filter(|p| p.season_id == self.season.id)
            .ok_or_else(|| LeagueError::not_found("season player", player_id))
    }

    /// The season player an actor plays as, if any.
    pub fn player_of_actor(
        &self,
        conn: &Connection,
        actor_id: Uuid,
    ) -> LeagueResult<Option<SeasonPlayer>> {
        seasons::find_player_by_user(conn, self.season.id, actor_id)
    }

    /// Whether `actor_id` may act for `player_id`: the player's own account
    /// or the commissioner.
    pub fn acts_for(&self, conn: &Connection, actor_id: Uuid, player_id: Uuid) -> LeagueResult<bool> {
        if self.is_authority(actor_id) {
            return Ok(true);
        }
        Ok(self
            .player_of_actor(conn, actor_id)?
            .is_some_and(|p| p.id == player_id))
    }

    /// Move the ledger without the forward check. Used by the ledger itself,
    /// week loops and rollbacks.
    pub fn set_position(
        &mut self,
        conn: &Connection,
        phase: SeasonPhase,
        week: u32,
        status: SeasonStatus,
    ) -> LeagueResult<()> {
        seasons::patch_position(conn, self.season.id, phase, week, status)?;
        self.season.current_phase = phase;
        self.season.current_week = week;
        self.season.status = status;
        Ok(())
    }

    /// Append to the event log, stamped with the current week and phase.
    pub fn record(
        &self,
        conn: &Connection,
        event_type: EventType,
        payload: serde_json::Value,
        actor_id: Option<Uuid>,
    ) {
        events::record(conn, &self.season, event_type, payload, actor_id);
    }
}
