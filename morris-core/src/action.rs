//! Actions a player can take and the transitions they produce.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Player, Pos};

/// A complete player decision.
///
/// `Move` covers both sliding and flying; which one applies depends on the
/// mover's phase. Interactive play reaches the same rules through
/// [`Game::click`](crate::Game::click), which splits a move into a selection
/// and a destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Put a reserve piece on an empty position.
    Place { at: Pos },
    /// Move an own piece from one position to another.
    Move { from: Pos, to: Pos },
    /// Capture an opponent piece after forming a mill.
    Remove { at: Pos },
    /// Give up a capture that has no legal target.
    Pass,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Place { at } => write!(f, "{at}"),
            Action::Move { from, to } => write!(f, "{from}-{to}"),
            Action::Remove { at } => write!(f, "x{at}"),
            Action::Pass => f.write_str("pass"),
        }
    }
}

/// What an accepted operation did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Placed { at: Pos, mill: bool },
    Selected { at: Pos },
    /// An own piece that cannot move was clicked; the old selection is gone.
    Deselected,
    Moved { from: Pos, to: Pos, mill: bool },
    Captured { victim: Player, at: Pos },
    /// The victim had nothing capturable; the turn passed without a capture.
    CaptureSkipped { victim: Player },
}

impl Transition {
    /// Whether this transition opened a pending removal.
    pub fn formed_mill(&self) -> bool {
        matches!(
            self,
            Transition::Placed { mill: true, .. } | Transition::Moved { mill: true, .. }
        )
    }
}
