//! Phase resolver.
//!
//! A player's phase is never stored. It is recomputed from the reserve and
//! on-board counts every time it is needed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::PlayerState;

/// Movement phase of a single player.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Pieces remain in reserve; any empty position may be filled.
    Placing,
    /// More than three pieces on the board; slides along lines only.
    Moving,
    /// Down to three pieces; may jump to any empty position.
    Flying,
}

impl Phase {
    /// Resolve the phase from raw counts.
    ///
    /// Fewer than three pieces with an empty reserve also resolves to
    /// `Flying`; that state only exists once the game is over.
    #[inline]
    pub fn of(reserve: u8, on_board: u8) -> Phase {
        if reserve > 0 {
            Phase::Placing
        } else if on_board > 3 {
            Phase::Moving
        } else {
            Phase::Flying
        }
    }

    /// Phase of a player's current counts.
    #[inline]
    pub fn of_player(state: &PlayerState) -> Phase {
        Phase::of(state.reserve(), state.on_board())
    }

    /// Whether pieces already on the board are the ones that move.
    #[inline]
    pub fn moves_pieces(self) -> bool {
        !matches!(self, Phase::Placing)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Placing => "placing",
            Phase::Moving => "moving",
            Phase::Flying => "flying",
        })
    }
}
