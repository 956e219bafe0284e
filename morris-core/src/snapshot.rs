//! Read-only view of a game for rendering.

use serde::Serialize;

use crate::{Game, Occupant, Phase, Player, Pos};

/// Per-player counters as a renderer needs them.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct PlayerView {
    pub player: Player,
    pub reserve: u8,
    pub on_board: u8,
    pub phase: Phase,
}

/// Everything a presentation layer draws, in one serializable value.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Snapshot {
    /// Occupant of each position, indexed A=0 .. X=23.
    pub board: [Occupant; Pos::COUNT],
    pub players: [PlayerView; 2],
    pub turn: Player,
    pub pending_removal: Option<Player>,
    /// Empty while a removal is pending means the next click passes.
    pub removal_targets: Vec<Pos>,
    pub selected: Option<Pos>,
    pub move_targets: Vec<Pos>,
    pub game_over: bool,
    pub winner: Option<Player>,
    pub status: String,
}

impl From<&Game> for Snapshot {
    fn from(game: &Game) -> Self {
        let view = |player: Player| {
            let state = game.player(player);
            PlayerView {
                player,
                reserve: state.reserve(),
                on_board: state.on_board(),
                phase: state.phase(),
            }
        };

        Snapshot {
            board: game.board().occupants(),
            players: [view(Player::White), view(Player::Black)],
            turn: game.turn(),
            pending_removal: game.pending_removal(),
            removal_targets: game.removal_targets().iter().collect(),
            selected: game.selected(),
            move_targets: game.move_targets().iter().collect(),
            game_over: game.is_over(),
            winner: game.winner(),
            status: status_line(game),
        }
    }
}

fn status_line(game: &Game) -> String {
    if let Some(winner) = game.winner() {
        return format!("GAME OVER, {winner} wins");
    }
    match game.pending_removal() {
        Some(remover) if game.removal_targets().is_empty() => {
            format!("{remover} has no piece to capture, click to continue")
        }
        Some(remover) => format!("{remover} must remove a {} piece", remover.opponent()),
        None => format!("{}'s turn", game.turn()),
    }
}

impl Game {
    /// Capture the current state for display.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from(self)
    }
}
