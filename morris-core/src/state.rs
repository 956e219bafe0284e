//! Per-player bookkeeping and the mill detector.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Board, Mill, MillSet, Phase, Player, Pos, PosSet, PIECES_PER_PLAYER};

/// Counters and capture bookkeeping for one player.
///
/// Invariants maintained by the rule engine:
/// - `reserve + on_board <= 9`
/// - `removable` only holds positions occupied by this player
/// - `removable` and the positions of `active_mills` are disjoint
/// - every mill in `active_mills` is fully occupied by this player
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct PlayerState {
    pub(crate) reserve: u8,
    pub(crate) on_board: u8,
    pub(crate) removable: PosSet,
    pub(crate) active_mills: MillSet,
}

impl PlayerState {
    /// Start of game: full reserve, nothing on the board.
    pub fn new() -> PlayerState {
        PlayerState {
            reserve: PIECES_PER_PLAYER,
            on_board: 0,
            removable: PosSet::EMPTY,
            active_mills: MillSet::EMPTY,
        }
    }

    /// Pieces not yet placed.
    pub fn reserve(&self) -> u8 {
        self.reserve
    }

    /// Pieces currently on the board.
    pub fn on_board(&self) -> u8 {
        self.on_board
    }

    /// Own pieces the opponent may capture.
    pub fn removable(&self) -> PosSet {
        self.removable
    }

    /// Mills already credited to this player.
    pub fn active_mills(&self) -> MillSet {
        self.active_mills
    }

    pub fn phase(&self) -> Phase {
        Phase::of_player(self)
    }

    /// Positions protected by a credited mill.
    pub fn protected(&self) -> PosSet {
        self.active_mills.positions()
    }

    /// Credit every mill of `player` that is formed on `board` but not yet
    /// active. Pieces of a newly credited mill leave the removable set.
    ///
    /// Returns the newly formed mills; an already active mill never shows up
    /// here again until it has been broken.
    pub(crate) fn credit_new_mills(&mut self, board: &Board, player: Player) -> MillSet {
        let fresh = board.formed_mills(player).without(self.active_mills);
        for mill in fresh.iter() {
            self.active_mills.insert(mill);
            self.removable = self.removable.without(mill.mask());
            debug!(%player, mill = ?mill.positions(), "mill credited");
        }
        fresh
    }

    /// Break every active mill through `pos` because its piece is leaving.
    ///
    /// The other pieces of the broken mills become removable again unless a
    /// remaining active mill still covers them. `pos` itself is not re-added.
    pub(crate) fn break_mills_at(&mut self, pos: Pos) -> MillSet {
        let broken = self.active_mills.intersect(Mill::through(pos));
        if broken.is_empty() {
            return broken;
        }
        self.active_mills = self.active_mills.without(broken);
        let freed = broken
            .positions()
            .without(PosSet::single(pos))
            .without(self.protected());
        self.removable = self.removable.union(freed);
        broken
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Why the game ended.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossReason {
    /// Reserve exhausted with fewer than three pieces on the board.
    TooFewPieces,
    /// In the moving phase with no legal slide on the player's turn.
    Blocked,
}

/// Terminal state of a game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Finish {
    pub loser: Player,
    pub reason: LossReason,
}

impl Finish {
    pub fn winner(&self) -> Player {
        self.loser.opponent()
    }
}
