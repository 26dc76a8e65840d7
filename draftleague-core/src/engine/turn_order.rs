//! Snake turn order as a pure value.
//!
//! Rounds come in pairs (1-2, 3-4, ...). The odd round of pair `p` runs
//! forward from picker `p mod N`; the even round runs backward, starting with
//! whoever picked last in the forward pass. For N = 4:
//!
//! ```text
//! round 1: 0 1 2 3
//! round 2: 3 2 1 0
//! round 3: 1 2 3 0
//! round 4: 0 3 2 1
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn of_round(round: u32) -> Self {
        if round % 2 == 1 {
            Self::Forward
        } else {
            Self::Backward
        }
    }
}

/// Cursor of a snake draft over `players` pickers and `rounds` rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeTurn {
    pub players: usize,
    pub rounds: u32,
    pub round: u32,
    pub cursor: usize,
}

/// Outcome of moving past the current pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAdvance {
    /// Another pick in the same round.
    SameRound(SnakeTurn),
    /// The round is finished and the next one starts.
    NextRound(SnakeTurn),
    /// The last pick of the last round was made.
    Complete,
}

impl SnakeTurn {
    /// Cursor at the first pick of round 1.
    pub fn start(players: usize, rounds: u32) -> Self {
        Self {
            players,
            rounds,
            round: 1,
            cursor: Self::first_picker(players, 1),
        }
    }

    /// Index of the first picker of `round`.
    pub fn first_picker(players: usize, round: u32) -> usize {
        if players == 0 {
            return 0;
        }
        let pair = ((round.max(1) - 1) / 2) as usize;
        match Direction::of_round(round) {
            Direction::Forward => pair % players,
            // The forward pass of this pair ended one seat before its start.
            Direction::Backward => (pair + players - 1) % players,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::of_round(self.round)
    }

    /// Zero-based number of picks already made in the current round.
    pub fn position_in_round(&self) -> usize {
        let n = self.players;
        if n == 0 {
            return 0;
        }
        let first = Self::first_picker(n, self.round);
        match self.direction() {
            Direction::Forward => (self.cursor + n - first) % n,
            Direction::Backward => (first + n - self.cursor) % n,
        }
    }

    pub fn is_last_pick_of_round(&self) -> bool {
        self.players > 0 && self.position_in_round() + 1 == self.players
    }

    /// Move past the pick at the current cursor.
    pub fn advance(&self) -> TurnAdvance {
        let n = self.players;
        if n == 0 {
            return TurnAdvance::Complete;
        }
        if !self.is_last_pick_of_round() {
            let cursor = match self.direction() {
                Direction::Forward => (self.cursor + 1) % n,
                Direction::Backward => (self.cursor + n - 1) % n,
            };
            return TurnAdvance::SameRound(Self { cursor, ..*self });
        }
        if self.round >= self.rounds {
            return TurnAdvance::Complete;
        }
        let round = self.round + 1;
        TurnAdvance::NextRound(Self {
            round,
            cursor: Self::first_picker(n, round),
            ..*self
        })
    }

    /// Every `(round, cursor)` of a full draft, in order.
    pub fn sequence(players: usize, rounds: u32) -> Vec<(u32, usize)> {
        let mut picks = Vec::new();
        if players == 0 || rounds == 0 {
            return picks;
        }
        let mut turn = Self::start(players, rounds);
        loop {
            picks.push((turn.round, turn.cursor));
            match turn.advance() {
                TurnAdvance::SameRound(next) | TurnAdvance::NextRound(next) => turn = next,
                TurnAdvance::Complete => break,
            }
        }
        picks
    }
}
