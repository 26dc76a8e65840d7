//! Draft league server: HTTP API, client and configuration around the
//! season engines of [`draftleague_core`].

pub mod api;
pub mod client;
pub mod config;

pub use draftleague_core::{db, engine, models, LeagueError, LeagueResult};
