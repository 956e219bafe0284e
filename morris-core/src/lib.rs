//! Nine Men's Morris rule engine with bit-based board representation.
//!
//! # Board Key
//!
//! ```text
//! A-----------B-----------C
//! |           |           |
//! |   D-------E-------F   |
//! |   |       |       |   |
//! |   |   G---H---I   |   |
//! |   |   |       |   |   |
//! J---K---L       M---N---O
//! |   |   |       |   |   |
//! |   |   P---Q---R   |   |
//! |   |       |       |   |
//! |   S-------T-------U   |
//! |           |           |
//! V-----------W-----------X
//! ```
//!
//! # Set Encoding
//!
//! ```text
//! PosSet  (u32): bit i set = position i occupied/contained (A=0 .. X=23)
//! MillSet (u16): bit m set = mill m contained (see board::MILLS)
//! ```
//!
//! The engine never holds pixel coordinates. A presentation layer resolves a
//! pointer event to a [`Pos`] (or `None` for a miss), feeds it to
//! [`Game::click`], and redraws from [`Game::snapshot`].

pub mod action;
pub mod board;
pub mod error;
pub mod game;
pub mod phase;
pub mod rules;
pub mod snapshot;
pub mod state;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use action::{Action, Transition};
pub use board::{Board, Mill, MillSet, ADJACENCY, MILLS};
pub use error::{InvalidPlayer, MoveError, ParsePosError, SetupError};
pub use game::{Game, Setup};
pub use phase::Phase;
pub use rules::{RuleSet, PIECES_PER_PLAYER};
pub use snapshot::{PlayerView, Snapshot};
pub use state::{Finish, LossReason, PlayerState};

/// Player identifier. White moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    /// Both players in turn order.
    pub const BOTH: [Player; 2] = [Player::White, Player::Black];

    /// Get the opponent player.
    #[inline]
    pub fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Index into per-player arrays (0 or 1).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::White => "White",
            Player::Black => "Black",
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = InvalidPlayer;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Player::White),
            1 => Ok(Player::Black),
            other => Err(InvalidPlayer(other)),
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Content of a single board position.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Occupant {
    #[default]
    Empty = 0,
    White = 1,
    Black = 2,
}

impl Occupant {
    /// The owning player, if any.
    #[inline]
    pub fn player(self) -> Option<Player> {
        match self {
            Occupant::Empty => None,
            Occupant::White => Some(Player::White),
            Occupant::Black => Some(Player::Black),
        }
    }
}

impl From<Player> for Occupant {
    fn from(player: Player) -> Self {
        match player {
            Player::White => Occupant::White,
            Player::Black => Occupant::Black,
        }
    }
}

/// Position on the board (0-23, lettered A-X).
///
/// The inner index is public so adapters can build positions cheaply, which
/// means an out-of-range value is representable. Every rule operation
/// rejects those with [`MoveError::OffBoard`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos(pub u8);

impl Pos {
    /// Number of positions on the board.
    pub const COUNT: usize = 24;

    pub const A: Pos = Pos(0);
    pub const B: Pos = Pos(1);
    pub const C: Pos = Pos(2);
    pub const D: Pos = Pos(3);
    pub const E: Pos = Pos(4);
    pub const F: Pos = Pos(5);
    pub const G: Pos = Pos(6);
    pub const H: Pos = Pos(7);
    pub const I: Pos = Pos(8);
    pub const J: Pos = Pos(9);
    pub const K: Pos = Pos(10);
    pub const L: Pos = Pos(11);
    pub const M: Pos = Pos(12);
    pub const N: Pos = Pos(13);
    pub const O: Pos = Pos(14);
    pub const P: Pos = Pos(15);
    pub const Q: Pos = Pos(16);
    pub const R: Pos = Pos(17);
    pub const S: Pos = Pos(18);
    pub const T: Pos = Pos(19);
    pub const U: Pos = Pos(20);
    pub const V: Pos = Pos(21);
    pub const W: Pos = Pos(22);
    pub const X: Pos = Pos(23);

    /// Check if this is a valid position (0-23).
    #[inline]
    pub const fn is_valid(self) -> bool {
        (self.0 as usize) < Self::COUNT
    }

    /// Single-bit mask for this position. Zero for invalid positions.
    #[inline]
    pub const fn bit(self) -> u32 {
        if self.is_valid() {
            1 << self.0
        } else {
            0
        }
    }

    /// Letter label (A-X). Invalid positions render as '?'.
    pub fn letter(self) -> char {
        if self.is_valid() {
            (b'A' + self.0) as char
        } else {
            '?'
        }
    }

    /// Parse a single letter, case insensitive.
    pub fn from_letter(c: char) -> Option<Pos> {
        let upper = c.to_ascii_uppercase();
        if upper.is_ascii_uppercase() && upper <= 'X' {
            Some(Pos(upper as u8 - b'A'))
        } else {
            None
        }
    }

    /// Iterate over all 24 positions.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..Self::COUNT as u8).map(Pos)
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Pos({})", self.letter())
        } else {
            write!(f, "Pos(#{})", self.0)
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Pos {
    type Err = ParsePosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Pos::from_letter(c).ok_or_else(|| ParsePosError(trimmed.to_string())),
            _ => Err(ParsePosError(trimmed.to_string())),
        }
    }
}

impl Serialize for Pos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.letter())
    }
}

impl<'de> Deserialize<'de> for Pos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Set of positions packed into the low 24 bits of a u32.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PosSet(pub u32);

impl PosSet {
    pub const EMPTY: PosSet = PosSet(0);
    pub const FULL: PosSet = PosSet((1 << Pos::COUNT) - 1);

    #[inline]
    pub const fn single(pos: Pos) -> PosSet {
        PosSet(pos.bit())
    }

    #[inline]
    pub const fn contains(self, pos: Pos) -> bool {
        pos.is_valid() && self.0 & pos.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, pos: Pos) {
        self.0 |= pos.bit();
    }

    #[inline]
    pub fn remove(&mut self, pos: Pos) {
        self.0 &= !pos.bit();
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn union(self, other: PosSet) -> PosSet {
        PosSet(self.0 | other.0)
    }

    #[inline]
    pub const fn intersect(self, other: PosSet) -> PosSet {
        PosSet(self.0 & other.0)
    }

    #[inline]
    pub const fn without(self, other: PosSet) -> PosSet {
        PosSet(self.0 & !other.0)
    }

    /// Positions on the board not in this set.
    #[inline]
    pub const fn complement(self) -> PosSet {
        PosSet(!self.0 & Self::FULL.0)
    }

    #[inline]
    pub const fn is_subset(self, other: PosSet) -> bool {
        self.0 & !other.0 == 0
    }

    /// Iterate over contained positions in index order.
    pub fn iter(self) -> impl Iterator<Item = Pos> {
        let mut bits = self.0 & Self::FULL.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let idx = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(Pos(idx))
        })
    }
}

impl FromIterator<Pos> for PosSet {
    fn from_iter<T: IntoIterator<Item = Pos>>(iter: T) -> Self {
        let mut set = PosSet::EMPTY;
        for pos in iter {
            set.insert(pos);
        }
        set
    }
}

impl fmt::Debug for PosSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letters: String = self.iter().map(Pos::letter).collect();
        write!(f, "PosSet({letters})")
    }
}
