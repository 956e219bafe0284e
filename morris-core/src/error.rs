//! Error types for the rule engine.
//!
//! A [`MoveError`] is a rejection, not a fault: the operation that returned
//! it left the game untouched. Interactive callers go through
//! [`Game::click`](crate::Game::click), which logs and otherwise ignores them.

use crate::{Phase, Player, Pos};

/// Reasons an operation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The pointer event did not resolve to a position.
    #[error("no position was hit")]
    Miss,

    #[error("position index {0} is off the board")]
    OffBoard(u8),

    #[error("the game is over")]
    GameOver,

    /// A capture is owed before anything else may happen.
    #[error("{0} must remove a piece first")]
    RemovalPending(Player),

    #[error("no removal is pending")]
    NoRemovalPending,

    #[error("not allowed while {player} is {phase}")]
    WrongPhase { player: Player, phase: Phase },

    #[error("{0} is occupied")]
    Occupied(Pos),

    #[error("{0} does not hold a piece of the player to move")]
    NotOwnPiece(Pos),

    /// Moving phase only: the piece has no empty neighbour.
    #[error("the piece on {0} has no free neighbour")]
    Blocked(Pos),

    #[error("no piece is selected")]
    NothingSelected,

    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: Pos, to: Pos },

    #[error("{0} is not a legal capture target")]
    NotRemovable(Pos),

    #[error("{0} is not the player whose piece must be removed")]
    WrongVictim(Player),

    #[error("a capture is available, passing is not allowed")]
    CaptureAvailable,
}

/// Errors building a game from an explicit position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("position index {0} is off the board")]
    OffBoard(u8),

    #[error("{0} is listed more than once")]
    Duplicate(Pos),

    #[error("{player} has {reserve} in reserve and {on_board} on the board, more than {max}")]
    TooManyPieces {
        player: Player,
        reserve: u8,
        on_board: u8,
        max: u8,
    },
}

/// A raw player index outside 0..=1 reached an adapter boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid player index {0}, expected 0 (white) or 1 (black)")]
pub struct InvalidPlayer(pub u8);

/// A label that is not one of the letters A-X.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown position label {0:?}")]
pub struct ParsePosError(pub String);
