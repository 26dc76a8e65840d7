//! Checkpoint rollback.
//!
//! A checkpoint names a ledger position `(phase, week, status)`. Rolling back
//! runs the checkpoint's ordered list of [`CompensatingAction`]s and then
//! moves the season to the target position. Each action is idempotent, so a
//! plan can be re-applied safely.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::db::{self, Database, WeekScope};
use crate::error::{LeagueError, LeagueResult};
use crate::models::*;

use super::{evolution, SeasonContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkpoint {
    Preseason,
    Draft,
    AdvantageSelection,
    Week(u32),
    WeekPresentation(u32),
}

/// Ledger position a checkpoint restores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointTarget {
    pub phase: SeasonPhase,
    pub week: u32,
    pub status: SeasonStatus,
}

/// A checkpoint as listed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointInfo {
    pub id: String,
    #[serde(flatten)]
    pub target: CheckpointTarget,
}

impl Checkpoint {
    /// Parse `PRESEASON`, `DRAFT`, `ADVANTAGE_SELECTION`, `WEEK_<n>` or
    /// `WEEK_<n>_PRESENTATION` (case-insensitive).
    pub fn parse(id: &str) -> Option<Self> {
        let id = id.trim().to_ascii_uppercase();
        match id.as_str() {
            "PRESEASON" => return Some(Self::Preseason),
            "DRAFT" => return Some(Self::Draft),
            "ADVANTAGE_SELECTION" => return Some(Self::AdvantageSelection),
            _ => {}
        }
        let rest = id.strip_prefix("WEEK_")?;
        match rest.strip_suffix("_PRESENTATION") {
            Some(week) => week.parse::<u32>().ok().filter(|w| *w > 0).map(Self::WeekPresentation),
            None => rest.parse::<u32>().ok().filter(|w| *w > 0).map(Self::Week),
        }
    }

    pub fn id(&self) -> String {
        match self {
            Self::Preseason => "PRESEASON".to_string(),
            Self::Draft => "DRAFT".to_string(),
            Self::AdvantageSelection => "ADVANTAGE_SELECTION".to_string(),
            Self::Week(week) => format!("WEEK_{week}"),
            Self::WeekPresentation(week) => format!("WEEK_{week}_PRESENTATION"),
        }
    }

    pub fn target(&self) -> CheckpointTarget {
        let (phase, week, status) = match *self {
            Self::Preseason => (SeasonPhase::Setup, 0, SeasonStatus::Preseason),
            Self::Draft => (SeasonPhase::Drafting, 0, SeasonStatus::Preseason),
            Self::AdvantageSelection => {
                (SeasonPhase::AdvantageSelection, 0, SeasonStatus::Preseason)
            }
            Self::Week(week) => (SeasonPhase::ChallengeSelection, week, SeasonStatus::InProgress),
            Self::WeekPresentation(week) => {
                (SeasonPhase::Presentation, week, SeasonStatus::InProgress)
            }
        };
        CheckpointTarget {
            phase,
            week,
            status,
        }
    }

    /// The week a dynamic checkpoint refers to.
    pub fn week(&self) -> Option<u32> {
        match self {
            Self::Week(week) | Self::WeekPresentation(week) => Some(*week),
            _ => None,
        }
    }

    pub fn info(&self) -> CheckpointInfo {
        CheckpointInfo {
            id: self.id(),
            target: self.target(),
        }
    }
}

/// One idempotent cleanup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompensatingAction {
    ClearDraftPositions,
    DeleteDraft,
    /// Recreate the draft state at round 1 from stored draft positions.
    ReinitializeDraft,
    /// Every roster entry, pool entry and artist of the season.
    DeleteRosters,
    ReopenPrompts,
    /// Evolution states of the scope; their prompts go back to OPEN.
    DeleteEvolutions(WeekScope),
    /// Undo roster changes from this week on, keeping protected entries.
    RevertRosterChanges(u32),
    DeleteChallenges(WeekScope),
    DeleteSubmissions(WeekScope),
    DeletePresentations(WeekScope),
    ResetPresentation(u32),
    DeleteVoting(WeekScope),
    DeleteResults(WeekScope),
    DeleteAwards(WeekScope),
    DeleteInventory(WeekScope),
    RestorePlayedInventory(u32),
    RecomputePoints,
}

/// Ordered compensating actions for a checkpoint.
pub fn plan(checkpoint: Checkpoint) -> Vec<CompensatingAction> {
    use CompensatingAction::*;
    use WeekScope::{All, From};

    let wipe_season = [
        DeleteDraft,
        DeleteRosters,
        ReopenPrompts,
        DeleteEvolutions(All),
        DeleteInventory(All),
        DeleteAwards(All),
        DeleteChallenges(All),
        DeleteSubmissions(All),
        DeletePresentations(All),
        DeleteVoting(All),
        DeleteResults(All),
        RecomputePoints,
    ];

    match checkpoint {
        Checkpoint::Preseason => {
            let mut actions = vec![ClearDraftPositions];
            actions.extend(wipe_season);
            actions
        }
        Checkpoint::Draft => {
            let mut actions = wipe_season.to_vec();
            actions.push(ReinitializeDraft);
            actions
        }
        // Keeps the draft; unwinds every played week.
        Checkpoint::AdvantageSelection => vec![
            DeleteChallenges(All),
            DeleteSubmissions(All),
            DeletePresentations(All),
            DeleteVoting(All),
            DeleteResults(All),
            DeleteAwards(All),
            DeleteInventory(All),
            RevertRosterChanges(1),
            DeleteEvolutions(All),
            RecomputePoints,
        ],
        Checkpoint::Week(n) => vec![
            DeleteChallenges(From(n)),
            DeleteSubmissions(From(n)),
            DeletePresentations(From(n)),
            DeleteVoting(From(n)),
            DeleteResults(From(n)),
            DeleteAwards(From(n)),
            DeleteInventory(From(n)),
            RestorePlayedInventory(n),
            RevertRosterChanges(n),
            DeleteEvolutions(From(n)),
            RecomputePoints,
        ],
        Checkpoint::WeekPresentation(n) => vec![
            DeleteChallenges(From(n + 1)),
            DeleteSubmissions(From(n + 1)),
            DeletePresentations(From(n + 1)),
            ResetPresentation(n),
            DeleteVoting(From(n)),
            DeleteResults(From(n)),
            DeleteAwards(From(n)),
            DeleteInventory(From(n)),
            RestorePlayedInventory(n + 1),
            RevertRosterChanges(n),
            DeleteEvolutions(From(n)),
            RecomputePoints,
        ],
    }
}

impl CompensatingAction {
    /// Apply the action; returns the number of rows touched.
    pub fn apply(&self, conn: &Connection, season_id: Uuid) -> LeagueResult<usize> {
        use CompensatingAction::*;
        match *self {
            ClearDraftPositions => db::seasons::clear_draft_positions(conn, season_id),
            DeleteDraft => {
                let picks = db::draft::delete_picks(conn, season_id)?;
                let state = db::draft::delete_state(conn, season_id)?;
                Ok(picks + usize::from(state))
            }
            ReinitializeDraft => {
                let order = positioned_order(conn, season_id)?;
                db::draft::insert_state(conn, season_id, order)?;
                Ok(1)
            }
            DeleteRosters => {
                let entries = db::delete_scoped(conn, "roster_entries", "acquired_at_week", season_id, WeekScope::All)?;
                let pool = db::delete_scoped(conn, "pool_entries", "cut_at_week", season_id, WeekScope::All)?;
                let artists = db::draft::delete_orphan_artists(conn, season_id)?;
                Ok(entries + pool + artists)
            }
            ReopenPrompts => db::draft::reopen_all_prompts(conn, season_id),
            DeleteEvolutions(scope) => {
                for state in db::evolution::list_states(conn, season_id)?
                    .into_iter()
                    .filter(|s| scope.contains(s.week))
                {
                    if let Some(prompt_id) = state.selected_prompt_id {
                        db::draft::reopen_prompt(conn, prompt_id)?;
                    }
                }
                db::delete_scoped(conn, "roster_evolution_states", "week", season_id, scope)
            }
            RevertRosterChanges(week) => {
                let (removed, restored) = evolution::undo_roster_changes(conn, season_id, week)?;
                db::draft::delete_orphan_artists(conn, season_id)?;
                Ok(removed + restored)
            }
            DeleteChallenges(scope) => {
                let reveals = db::delete_scoped(conn, "challenge_reveals", "week", season_id, scope)?;
                let selections = db::delete_scoped(conn, "challenge_selections", "week", season_id, scope)?;
                Ok(reveals + selections)
            }
            DeleteSubmissions(scope) => db::delete_scoped(conn, "submissions", "week", season_id, scope),
            DeletePresentations(scope) => {
                db::delete_scoped(conn, "presentation_states", "week", season_id, scope)
            }
            ResetPresentation(week) => match db::weekly::get_presentation(conn, season_id, week)? {
                Some(state) => {
                    let complete = state.presenter_order.is_empty();
                    db::weekly::patch_presentation_cursor(conn, state.id, 0, complete)?;
                    Ok(1)
                }
                None => Ok(0),
            },
            DeleteVoting(scope) => {
                let votes = db::delete_scoped(conn, "votes", "week", season_id, scope)?;
                let sessions = db::delete_scoped(conn, "voting_sessions", "week", season_id, scope)?;
                Ok(votes + sessions)
            }
            DeleteResults(scope) => db::delete_scoped(conn, "weekly_results", "week", season_id, scope),
            DeleteAwards(scope) => {
                db::delete_scoped(conn, "advantage_awards", "earned_week", season_id, scope)
            }
            DeleteInventory(scope) => {
                db::delete_scoped(conn, "player_inventory", "earned_week", season_id, scope)
            }
            RestorePlayedInventory(week) => db::advantages::unplay_from_week(conn, season_id, week),
            RecomputePoints => {
                db::seasons::recompute_total_points(conn, season_id)?;
                Ok(0)
            }
        }
    }
}

/// Players with a stored draft position, in draft order.
fn positioned_order(conn: &Connection, season_id: Uuid) -> LeagueResult<Vec<Uuid>> {
    let mut players: Vec<SeasonPlayer> = db::seasons::list_players(conn, season_id)?
        .into_iter()
        .filter(|p| p.draft_position.is_some())
        .collect();
    players.sort_by_key(|p| p.draft_position);
    Ok(players.into_iter().map(|p| p.id).collect())
}

/// Checkpoints reachable from the season's current position.
pub fn available(season: &Season) -> Vec<Checkpoint> {
    let mut checkpoints = vec![
        Checkpoint::Preseason,
        Checkpoint::Draft,
        Checkpoint::AdvantageSelection,
    ];
    for week in 1..=season.current_week {
        checkpoints.push(Checkpoint::Week(week));
        checkpoints.push(Checkpoint::WeekPresentation(week));
    }
    checkpoints
}

pub fn list_checkpoints(db: &Database, season_id: Uuid) -> LeagueResult<Vec<CheckpointInfo>> {
    db.read(|conn| {
        let ctx = SeasonContext::load(conn, season_id)?;
        Ok(available(&ctx.season).iter().map(Checkpoint::info).collect())
    })
}

/// Outcome of a rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackReport {
    pub checkpoint: String,
    pub from: CheckpointTarget,
    pub to: CheckpointTarget,
    pub actions: Vec<CompensatingAction>,
    pub rows_affected: usize,
    pub season: Season,
}

pub fn rollback_to_checkpoint(
    db: &Database,
    season_id: Uuid,
    checkpoint_id: &str,
    actor_id: Uuid,
) -> LeagueResult<RollbackReport> {
    db.transact(|tx| {
        let mut ctx = SeasonContext::load(tx, season_id)?;
        ctx.require_authority(actor_id, "roll back the season")?;
        let checkpoint = Checkpoint::parse(checkpoint_id).ok_or_else(|| {
            LeagueError::InvalidTransition(format!("unknown checkpoint {checkpoint_id}"))
        })?;
        if let Some(week) = checkpoint.week() {
            if week > ctx.week() {
                return Err(LeagueError::InvalidTransition(format!(
                    "cannot roll forward to week {week} from week {}",
                    ctx.week()
                )));
            }
        }
        if checkpoint == Checkpoint::Draft && positioned_order(tx, season_id)?.is_empty() {
            return Err(LeagueError::InvalidTransition(
                "no draft order has been assigned yet".to_string(),
            ));
        }

        let from = CheckpointTarget {
            phase: ctx.phase(),
            week: ctx.week(),
            status: ctx.season.status,
        };
        let to = checkpoint.target();
        let actions = plan(checkpoint);
        let mut rows_affected = 0;
        for action in &actions {
            rows_affected += action.apply(tx, season_id)?;
        }
        ctx.set_position(tx, to.phase, to.week, to.status)?;

        tracing::info!(
            season = %season_id,
            checkpoint = %checkpoint.id(),
            "Rolled back from {} week {} to {} week {} ({} rows)",
            from.phase,
            from.week,
            to.phase,
            to.week,
            rows_affected
        );
        ctx.record(
            tx,
            EventType::CheckpointRollback,
            json!({ "checkpoint": checkpoint.id(), "from": from, "to": to, "rows_affected": rows_affected }),
            Some(actor_id),
        );
        Ok(RollbackReport {
            checkpoint: checkpoint.id(),
            from,
            to,
            actions,
            rows_affected,
            season: ctx.season,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use CompensatingAction::*;

    #[test]
    fn parses_static_and_dynamic_ids() {
        assert_eq!(Checkpoint::parse("PRESEASON"), Some(Checkpoint::Preseason));
        assert_eq!(Checkpoint::parse("draft"), Some(Checkpoint::Draft));
        assert_eq!(Checkpoint::parse("WEEK_3"), Some(Checkpoint::Week(3)));
        assert_eq!(
            Checkpoint::parse("WEEK_12_PRESENTATION"),
            Some(Checkpoint::WeekPresentation(12))
        );
        assert_eq!(Checkpoint::parse("WEEK_0"), None);
        assert_eq!(Checkpoint::parse("WEEK_X"), None);
        assert_eq!(Checkpoint::parse("MIDSEASON"), None);
    }

    #[test]
    fn id_round_trips_through_parse() {
        for checkpoint in [
            Checkpoint::Preseason,
            Checkpoint::AdvantageSelection,
            Checkpoint::Week(4),
            Checkpoint::WeekPresentation(2),
        ] {
            assert_eq!(Checkpoint::parse(&checkpoint.id()), Some(checkpoint));
        }
    }

    #[test]
    fn targets_match_checkpoint_families() {
        let week = Checkpoint::Week(3).target();
        assert_eq!(week.phase, SeasonPhase::ChallengeSelection);
        assert_eq!(week.week, 3);
        assert_eq!(week.status, SeasonStatus::InProgress);

        let draft = Checkpoint::Draft.target();
        assert_eq!((draft.phase, draft.week), (SeasonPhase::Drafting, 0));
        assert_eq!(
            Checkpoint::WeekPresentation(2).target().phase,
            SeasonPhase::Presentation
        );
    }

    #[test]
    fn only_preseason_clears_draft_positions() {
        assert!(plan(Checkpoint::Preseason).contains(&ClearDraftPositions));
        assert!(!plan(Checkpoint::Draft).contains(&ClearDraftPositions));
        assert_eq!(plan(Checkpoint::Draft).last(), Some(&ReinitializeDraft));
    }

    #[test]
    fn in_season_plans_never_wipe_rosters_or_draft() {
        for checkpoint in [
            Checkpoint::AdvantageSelection,
            Checkpoint::Week(1),
            Checkpoint::Week(3),
            Checkpoint::WeekPresentation(2),
        ] {
            let actions = plan(checkpoint);
            assert!(!actions.contains(&DeleteRosters), "{checkpoint:?}");
            assert!(!actions.contains(&DeleteDraft), "{checkpoint:?}");
        }
    }

    #[test]
    fn advantage_selection_unwinds_every_week() {
        let actions = plan(Checkpoint::AdvantageSelection);
        for action in [
            DeleteResults(WeekScope::All),
            DeleteVoting(WeekScope::All),
            DeleteAwards(WeekScope::All),
            DeleteEvolutions(WeekScope::All),
            RevertRosterChanges(1),
        ] {
            assert!(actions.contains(&action), "{action:?}");
        }
        assert_eq!(actions.last(), Some(&RecomputePoints));
    }

    #[test]
    fn presentation_checkpoint_keeps_its_week_submissions() {
        let actions = plan(Checkpoint::WeekPresentation(2));
        assert!(actions.contains(&DeleteSubmissions(WeekScope::From(3))));
        assert!(actions.contains(&ResetPresentation(2)));
        assert!(actions.contains(&DeleteVoting(WeekScope::From(2))));
    }

    #[test]
    fn listing_grows_with_the_week() {
        let season = Season {
            id: Uuid::new_v4(),
            league_id: Uuid::new_v4(),
            name: "S1".to_string(),
            status: SeasonStatus::InProgress,
            current_week: 2,
            current_phase: SeasonPhase::Voting,
            config: Default::default(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let ids: Vec<String> = available(&season).iter().map(Checkpoint::id).collect();
        assert_eq!(
            ids,
            vec![
                "PRESEASON",
                "DRAFT",
                "ADVANTAGE_SELECTION",
                "WEEK_1",
                "WEEK_1_PRESENTATION",
                "WEEK_2",
                "WEEK_2_PRESENTATION",
            ]
        );
    }
}
