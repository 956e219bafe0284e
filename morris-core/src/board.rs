//! Board graph and occupancy.
//!
//! The 24 positions, their adjacency, and the 16 mills are fixed `const`
//! tables. Lookup masks are derived from them at compile time so the hot
//! checks (free neighbour, mill formed) are single AND/compare operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Occupant, Player, Pos, PosSet};

/// Neighbours reachable by a single slide, indexed by position.
pub const ADJACENCY: [&[Pos]; Pos::COUNT] = [
    &[Pos::J, Pos::B],                 // A
    &[Pos::A, Pos::E, Pos::C],         // B
    &[Pos::B, Pos::O],                 // C
    &[Pos::K, Pos::E],                 // D
    &[Pos::H, Pos::D, Pos::B, Pos::F], // E
    &[Pos::E, Pos::N],                 // F
    &[Pos::L, Pos::H],                 // G
    &[Pos::G, Pos::E, Pos::I],         // H
    &[Pos::M, Pos::H],                 // I
    &[Pos::V, Pos::A, Pos::K],         // J
    &[Pos::S, Pos::J, Pos::D, Pos::L], // K
    &[Pos::P, Pos::K, Pos::G],         // L
    &[Pos::R, Pos::I, Pos::N],         // M
    &[Pos::U, Pos::M, Pos::F, Pos::O], // N
    &[Pos::X, Pos::N, Pos::C],         // O
    &[Pos::L, Pos::Q],                 // P
    &[Pos::T, Pos::P, Pos::R],         // Q
    &[Pos::Q, Pos::M],                 // R
    &[Pos::K, Pos::T],                 // S
    &[Pos::W, Pos::S, Pos::Q, Pos::U], // T
    &[Pos::T, Pos::N],                 // U
    &[Pos::J, Pos::W],                 // V
    &[Pos::V, Pos::T, Pos::X],         // W
    &[Pos::W, Pos::O],                 // X
];

/// The 16 mills: 8 square edges (rows) followed by 8 spokes (columns).
pub const MILLS: [[Pos; 3]; Mill::COUNT] = [
    [Pos::A, Pos::B, Pos::C],
    [Pos::D, Pos::E, Pos::F],
    [Pos::G, Pos::H, Pos::I],
    [Pos::J, Pos::K, Pos::L],
    [Pos::M, Pos::N, Pos::O],
    [Pos::P, Pos::Q, Pos::R],
    [Pos::S, Pos::T, Pos::U],
    [Pos::V, Pos::W, Pos::X],
    [Pos::A, Pos::J, Pos::V],
    [Pos::D, Pos::K, Pos::S],
    [Pos::G, Pos::L, Pos::P],
    [Pos::B, Pos::E, Pos::H],
    [Pos::Q, Pos::T, Pos::W],
    [Pos::I, Pos::M, Pos::R],
    [Pos::F, Pos::N, Pos::U],
    [Pos::C, Pos::O, Pos::X],
];

const NEIGHBOR_MASKS: [u32; Pos::COUNT] = {
    let mut masks = [0u32; Pos::COUNT];
    let mut i = 0;
    while i < Pos::COUNT {
        let adj = ADJACENCY[i];
        let mut j = 0;
        while j < adj.len() {
            masks[i] |= 1 << adj[j].0;
            j += 1;
        }
        i += 1;
    }
    masks
};

const MILL_MASKS: [u32; Mill::COUNT] = {
    let mut masks = [0u32; Mill::COUNT];
    let mut m = 0;
    while m < Mill::COUNT {
        let mut k = 0;
        while k < 3 {
            masks[m] |= 1 << MILLS[m][k].0;
            k += 1;
        }
        m += 1;
    }
    masks
};

/// Mills through each position (every position lies on exactly two).
const MILLS_THROUGH: [u16; Pos::COUNT] = {
    let mut through = [0u16; Pos::COUNT];
    let mut m = 0;
    while m < Mill::COUNT {
        let mut k = 0;
        while k < 3 {
            through[MILLS[m][k].0 as usize] |= 1 << m;
            k += 1;
        }
        m += 1;
    }
    through
};

/// Index into [`MILLS`] (0-15).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Mill(pub u8);

impl Mill {
    pub const COUNT: usize = 16;

    /// Iterate over all 16 mills.
    pub fn all() -> impl Iterator<Item = Mill> {
        (0..Self::COUNT as u8).map(Mill)
    }

    pub fn positions(self) -> [Pos; 3] {
        MILLS[self.0 as usize]
    }

    #[inline]
    pub fn mask(self) -> PosSet {
        PosSet(MILL_MASKS[self.0 as usize])
    }

    /// Mills that contain `pos`.
    #[inline]
    pub fn through(pos: Pos) -> MillSet {
        if pos.is_valid() {
            MillSet(MILLS_THROUGH[pos.0 as usize])
        } else {
            MillSet::EMPTY
        }
    }
}

/// Set of mills packed into a u16.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MillSet(pub u16);

impl MillSet {
    pub const EMPTY: MillSet = MillSet(0);

    #[inline]
    pub const fn contains(self, mill: Mill) -> bool {
        (mill.0 as usize) < Mill::COUNT && self.0 & (1 << mill.0) != 0
    }

    #[inline]
    pub fn insert(&mut self, mill: Mill) {
        self.0 |= 1 << mill.0;
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub const fn intersect(self, other: MillSet) -> MillSet {
        MillSet(self.0 & other.0)
    }

    #[inline]
    pub const fn without(self, other: MillSet) -> MillSet {
        MillSet(self.0 & !other.0)
    }

    #[inline]
    pub const fn union(self, other: MillSet) -> MillSet {
        MillSet(self.0 | other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Mill> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let idx = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(Mill(idx))
        })
    }

    /// Every position covered by at least one mill in the set.
    pub fn positions(self) -> PosSet {
        self.iter().fold(PosSet::EMPTY, |acc, mill| acc.union(mill.mask()))
    }
}

impl fmt::Debug for MillSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|m| m.0)).finish()
    }
}

/// Board occupancy - one position set per player.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Board {
    pieces: [PosSet; 2],
}

impl Board {
    /// Create an empty board.
    #[inline]
    pub fn new() -> Board {
        Board::default()
    }

    /// Positions held by `player`.
    #[inline]
    pub fn pieces(&self, player: Player) -> PosSet {
        self.pieces[player.index()]
    }

    #[inline]
    pub fn occupied(&self) -> PosSet {
        self.pieces[0].union(self.pieces[1])
    }

    /// Empty positions.
    #[inline]
    pub fn vacant(&self) -> PosSet {
        self.occupied().complement()
    }

    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        pos.is_valid() && !self.occupied().contains(pos)
    }

    pub fn owner(&self, pos: Pos) -> Option<Player> {
        Player::BOTH
            .into_iter()
            .find(|&player| self.pieces(player).contains(pos))
    }

    pub fn occupant(&self, pos: Pos) -> Occupant {
        self.owner(pos).map_or(Occupant::Empty, Occupant::from)
    }

    /// All 24 occupants in position order.
    pub fn occupants(&self) -> [Occupant; Pos::COUNT] {
        let mut cells = [Occupant::Empty; Pos::COUNT];
        for pos in Pos::all() {
            cells[pos.0 as usize] = self.occupant(pos);
        }
        cells
    }

    // ========== Piece Operations ==========

    /// Put a piece of `player` on `pos`.
    /// Does NOT validate - caller must ensure the position is empty.
    #[inline]
    pub fn place(&mut self, pos: Pos, player: Player) {
        debug_assert!(self.is_empty(pos), "placing on occupied {pos}");
        self.pieces[player.index()].insert(pos);
    }

    /// Remove whatever piece is on `pos`.
    #[inline]
    pub fn clear(&mut self, pos: Pos) {
        self.pieces[0].remove(pos);
        self.pieces[1].remove(pos);
    }

    /// Move a piece of `player` from `from` to `to`.
    /// Does NOT validate adjacency or occupancy.
    #[inline]
    pub fn relocate(&mut self, from: Pos, to: Pos, player: Player) {
        let set = &mut self.pieces[player.index()];
        set.remove(from);
        set.insert(to);
    }

    // ========== Graph Queries ==========

    /// Slide neighbours of `pos` in table order.
    pub fn neighbors(pos: Pos) -> &'static [Pos] {
        if pos.is_valid() {
            ADJACENCY[pos.0 as usize]
        } else {
            &[]
        }
    }

    #[inline]
    pub fn neighbor_set(pos: Pos) -> PosSet {
        if pos.is_valid() {
            PosSet(NEIGHBOR_MASKS[pos.0 as usize])
        } else {
            PosSet::EMPTY
        }
    }

    #[inline]
    pub fn is_adjacent(a: Pos, b: Pos) -> bool {
        Self::neighbor_set(a).contains(b)
    }

    /// Empty neighbours of `pos`.
    #[inline]
    pub fn free_neighbors(&self, pos: Pos) -> PosSet {
        Self::neighbor_set(pos).intersect(self.vacant())
    }

    /// Whether the piece on `pos` could slide somewhere.
    #[inline]
    pub fn can_slide_from(&self, pos: Pos) -> bool {
        !self.free_neighbors(pos).is_empty()
    }

    /// Whether any piece of `player` has an empty neighbour.
    pub fn has_any_slide(&self, player: Player) -> bool {
        self.pieces(player).iter().any(|pos| self.can_slide_from(pos))
    }

    // ========== Mill Detection ==========

    /// Every mill fully occupied by `player`.
    pub fn formed_mills(&self, player: Player) -> MillSet {
        let pieces = self.pieces(player);
        let mut formed = MillSet::EMPTY;
        for mill in Mill::all() {
            if mill.mask().is_subset(pieces) {
                formed.insert(mill);
            }
        }
        formed
    }
}
