//! Core of the draft league server.
//!
//! The season is driven by a stack of commissioner-gated state machines:
//!
//! - [`engine::phase`]: the season phase ledger (total order, forward only).
//! - [`engine::draft`]: the snake draft that builds the initial rosters.
//! - [`engine::evolution`]: per-week roster evolution (cuts, redrafts, pool draft).
//! - [`engine::advantage`]: weekly advantage awards and their selection.
//! - [`engine::checkpoint`]: rollback of the whole season to a named checkpoint.
//!
//! Every engine operation runs as one transaction against [`db::Database`].

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod models;

pub use error::{LeagueError, LeagueResult};
