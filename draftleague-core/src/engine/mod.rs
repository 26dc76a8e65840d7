//! Season progression engines.
//!
//! Every public operation takes the [`Database`](crate::db::Database), the
//! season it acts on and the `requesting_actor_id` of the caller. It opens one
//! transaction, loads a [`SeasonContext`], validates everything it needs and
//! only then writes. Phase changes go through [`phase`] so the ledger stays
//! the single place that moves a season.

pub mod advantage;
pub mod checkpoint;
pub mod context;
pub mod draft;
pub mod events;
pub mod evolution;
pub mod league;
pub mod phase;
pub mod turn_order;
pub mod weekly;

pub use context::SeasonContext;
pub use turn_order::{Direction, SnakeTurn, TurnAdvance};
