//! Domain models for the draft league.
//!
//! # Core Concepts
//!
//! ## Season scaffolding
//!
//! - [`League`]: owns seasons and names the commissioner (the league authority).
//! - [`Season`]: carries the phase ledger position (`current_phase`, `current_week`).
//! - [`SeasonPlayer`]: one per league member per season, with draft position and points.
//!
//! ## Rosters
//!
//! - [`DraftState`], [`DraftPrompt`], [`DraftPick`]: the snake draft.
//! - [`Artist`], [`RosterEntry`], [`PoolEntry`]: who holds which artist.
//! - [`RosterEvolutionState`]: the per-week cut/redraft/pool-draft sub-state machine.
//!
//! ## Advantages
//!
//! - [`AdvantageAward`]: an earned slot whose concrete code may still be pending.
//! - [`PlayerInventory`]: a concrete advantage a player holds.
//!
//! ## Weekly cycle and audit
//!
//! - [`ChallengeSelection`], [`Submission`], [`VotingSession`], [`WeeklyResult`], ...
//! - [`EventEntry`]: append-only season event log.

mod advantage;
mod draft;
mod event;
mod evolution;
mod roster;
mod season;
mod weekly;

pub use advantage::*;
pub use draft::*;
pub use event::*;
pub use evolution::*;
pub use roster::*;
pub use season::*;
pub use weekly::*;
