//! Rule engine.
//!
//! [`Game`] owns the whole game state and is `Copy`: every operation either
//! applies fully and returns a [`Transition`], or returns a [`MoveError`]
//! and leaves the state exactly as it was.
//!
//! The turn is suspended while a removal is pending. Terminal conditions are
//! re-evaluated after every accepted transition, so a player who starts a
//! turn in the moving phase with every piece boxed in has already lost
//! before any input arrives.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{
    Action, Board, Finish, LossReason, MoveError, Phase, Player, PlayerState, Pos, PosSet,
    RuleSet, SetupError, Transition, PIECES_PER_PLAYER,
};

/// Explicit starting position for [`Game::from_position`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setup {
    pub white: Vec<Pos>,
    pub black: Vec<Pos>,
    /// Pieces still in reserve, indexed by player.
    pub reserves: [u8; 2],
    pub to_move: Player,
}

/// Complete game state plus the rules that govern it.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Game {
    board: Board,
    players: [PlayerState; 2],
    turn: Player,
    pending_removal: Option<Player>,
    selected: Option<Pos>,
    finish: Option<Finish>,
    rules: RuleSet,
}

impl Game {
    /// Empty board, full reserves, White to move.
    pub fn new() -> Game {
        Game::with_rules(RuleSet::default())
    }

    pub fn with_rules(rules: RuleSet) -> Game {
        Game {
            board: Board::new(),
            players: [PlayerState::new(); 2],
            turn: Player::White,
            pending_removal: None,
            selected: None,
            finish: None,
            rules,
        }
    }

    /// Build a game from explicit occupancy.
    ///
    /// Mills already standing on the board count as credited, so their
    /// pieces start out protected. Terminal conditions are checked
    /// immediately.
    pub fn from_position(setup: &Setup, rules: RuleSet) -> Result<Game, SetupError> {
        let mut game = Game::with_rules(rules);
        game.turn = setup.to_move;

        for (player, positions) in [(Player::White, &setup.white), (Player::Black, &setup.black)] {
            for &pos in positions {
                if !pos.is_valid() {
                    return Err(SetupError::OffBoard(pos.0));
                }
                if !game.board.is_empty(pos) {
                    return Err(SetupError::Duplicate(pos));
                }
                game.board.place(pos, player);
            }

            let reserve = setup.reserves[player.index()];
            let on_board = positions.len() as u8;
            if positions.len() > usize::from(PIECES_PER_PLAYER)
                || reserve.saturating_add(on_board) > PIECES_PER_PLAYER
            {
                return Err(SetupError::TooManyPieces {
                    player,
                    reserve,
                    on_board,
                    max: PIECES_PER_PLAYER,
                });
            }

            let state = &mut game.players[player.index()];
            state.reserve = reserve;
            state.on_board = on_board;
            state.removable = game.board.pieces(player);
            state.credit_new_mills(&game.board, player);
        }

        game.settle();
        Ok(game)
    }

    // ========== Accessors ==========

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, player: Player) -> &PlayerState {
        &self.players[player.index()]
    }

    /// Player whose turn it is (frozen while a removal is pending).
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Player who owes a capture, if any.
    pub fn pending_removal(&self) -> Option<Player> {
        self.pending_removal
    }

    /// Player expected to provide the next input.
    pub fn actor(&self) -> Player {
        self.pending_removal.unwrap_or(self.turn)
    }

    pub fn selected(&self) -> Option<Pos> {
        self.selected
    }

    pub fn rules(&self) -> RuleSet {
        self.rules
    }

    pub fn finish(&self) -> Option<Finish> {
        self.finish
    }

    pub fn is_over(&self) -> bool {
        self.finish.is_some()
    }

    pub fn winner(&self) -> Option<Player> {
        self.finish.map(|finish| finish.winner())
    }

    /// Current phase of `player`, derived from their counts.
    pub fn phase(&self, player: Player) -> Phase {
        self.player(player).phase()
    }

    /// Positions the pending remover may capture. Empty when no removal is
    /// pending, and also when the victim has nothing capturable (the next
    /// removal input is then a pass).
    pub fn removal_targets(&self) -> PosSet {
        let Some(remover) = self.pending_removal else {
            return PosSet::EMPTY;
        };
        let victim = remover.opponent();
        let removable = self.player(victim).removable();
        if removable.is_empty() && self.rules.capture_from_full_mills {
            self.board.pieces(victim)
        } else {
            removable
        }
    }

    /// Destinations for the selected piece.
    pub fn move_targets(&self) -> PosSet {
        match (self.selected, self.phase(self.turn)) {
            (Some(from), Phase::Moving) => self.board.free_neighbors(from),
            (Some(_), Phase::Flying) => self.board.vacant(),
            _ => PosSet::EMPTY,
        }
    }

    /// True iff some piece of `player` has an empty neighbour.
    ///
    /// Only meaningful for the moving phase; flying players are never blocked.
    pub fn has_any_legal_slide(&self, player: Player) -> bool {
        self.board.has_any_slide(player)
    }

    // ========== Rule Operations ==========

    /// Place a reserve piece on an empty position.
    #[instrument(level = "debug", skip(self), fields(player = %self.turn))]
    pub fn place(&mut self, pos: Pos) -> Result<Transition, MoveError> {
        check_pos(pos)?;
        self.ensure_turn_open()?;
        let player = self.turn;
        let phase = self.phase(player);
        if phase != Phase::Placing {
            return Err(MoveError::WrongPhase { player, phase });
        }
        if !self.board.is_empty(pos) {
            return Err(MoveError::Occupied(pos));
        }

        self.board.place(pos, player);
        let state = &mut self.players[player.index()];
        state.reserve -= 1;
        state.on_board += 1;
        state.removable.insert(pos);

        let mill = self.resolve_mills(player);
        self.settle();
        Ok(Transition::Placed { at: pos, mill })
    }

    /// Mark one of the mover's pieces as the source of the next move.
    ///
    /// Picking an own piece that cannot slide clears any current selection.
    #[instrument(level = "debug", skip(self), fields(player = %self.turn))]
    pub fn select_for_move(&mut self, pos: Pos) -> Result<Transition, MoveError> {
        check_pos(pos)?;
        self.ensure_turn_open()?;
        let player = self.turn;
        let phase = self.phase(player);
        if !phase.moves_pieces() {
            return Err(MoveError::WrongPhase { player, phase });
        }
        if self.board.owner(pos) != Some(player) {
            return Err(MoveError::NotOwnPiece(pos));
        }
        if phase == Phase::Moving && !self.board.can_slide_from(pos) {
            if self.selected.take().is_some() {
                return Ok(Transition::Deselected);
            }
            return Err(MoveError::Blocked(pos));
        }

        self.selected = Some(pos);
        Ok(Transition::Selected { at: pos })
    }

    /// Move the selected piece to `to`.
    #[instrument(level = "debug", skip(self), fields(player = %self.turn, from = ?self.selected))]
    pub fn move_to(&mut self, to: Pos) -> Result<Transition, MoveError> {
        check_pos(to)?;
        self.ensure_turn_open()?;
        let player = self.turn;
        let phase = self.phase(player);
        if !phase.moves_pieces() {
            return Err(MoveError::WrongPhase { player, phase });
        }
        let from = self.selected.ok_or(MoveError::NothingSelected)?;
        if self.board.owner(from) != Some(player) {
            return Err(MoveError::NotOwnPiece(from));
        }
        if !self.board.is_empty(to) {
            return Err(MoveError::Occupied(to));
        }
        if phase == Phase::Moving && !Board::is_adjacent(from, to) {
            return Err(MoveError::NotAdjacent { from, to });
        }

        self.board.relocate(from, to, player);
        self.selected = None;

        let state = &mut self.players[player.index()];
        if !state.removable.contains(from) {
            let broken = state.break_mills_at(from);
            debug!(%player, broken = ?broken, "mill opened");
        }
        state.removable.remove(from);
        state.removable.insert(to);

        let mill = self.resolve_mills(player);
        self.settle();
        Ok(Transition::Moved { from, to, mill })
    }

    /// Capture `victim`'s piece on `pos` to settle a pending removal.
    ///
    /// If the victim has nothing capturable the capture is skipped and the
    /// turn passes, whatever `pos` is.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_piece(&mut self, victim: Player, pos: Pos) -> Result<Transition, MoveError> {
        check_pos(pos)?;
        if self.finish.is_some() {
            return Err(MoveError::GameOver);
        }
        let remover = self.pending_removal.ok_or(MoveError::NoRemovalPending)?;
        if victim != remover.opponent() {
            return Err(MoveError::WrongVictim(victim));
        }

        let targets = self.removal_targets();
        if targets.is_empty() {
            return Ok(self.skip_capture(victim));
        }
        if !targets.contains(pos) {
            return Err(MoveError::NotRemovable(pos));
        }

        let state = &mut self.players[victim.index()];
        if !state.removable.contains(pos) {
            // Only reachable with capture_from_full_mills.
            state.break_mills_at(pos);
        }
        state.removable.remove(pos);
        state.on_board -= 1;
        self.board.clear(pos);
        info!(%remover, %victim, at = %pos, "piece captured");

        self.pending_removal = None;
        self.advance_turn();
        self.settle();
        Ok(Transition::Captured { victim, at: pos })
    }

    /// Explicitly give up a capture that has no legal target.
    pub fn pass(&mut self) -> Result<Transition, MoveError> {
        if self.finish.is_some() {
            return Err(MoveError::GameOver);
        }
        let remover = self.pending_removal.ok_or(MoveError::NoRemovalPending)?;
        if !self.removal_targets().is_empty() {
            return Err(MoveError::CaptureAvailable);
        }
        Ok(self.skip_capture(remover.opponent()))
    }

    // ========== Entry Points ==========

    /// Handle one resolved pointer event.
    ///
    /// Routes to the operation the current state calls for. Rejections are
    /// logged at debug level and returned; the state is unchanged by them.
    #[instrument(level = "debug", skip(self), fields(actor = %self.actor()))]
    pub fn click(&mut self, pos: Option<Pos>) -> Result<Transition, MoveError> {
        let result = self.dispatch(pos);
        if let Err(err) = &result {
            debug!(%err, "click ignored");
        }
        result
    }

    /// Value form of [`Game::click`]: the state after one pointer event.
    pub fn step(mut self, pos: Option<Pos>) -> Game {
        let _ = self.click(pos);
        self
    }

    fn dispatch(&mut self, pos: Option<Pos>) -> Result<Transition, MoveError> {
        let pos = pos.ok_or(MoveError::Miss)?;
        if self.finish.is_some() {
            return Err(MoveError::GameOver);
        }
        if let Some(remover) = self.pending_removal {
            return self.remove_piece(remover.opponent(), pos);
        }
        match self.phase(self.turn) {
            Phase::Placing => self.place(pos),
            Phase::Moving | Phase::Flying => {
                if self.selected.is_none() || self.board.owner(pos) == Some(self.turn) {
                    self.select_for_move(pos)
                } else {
                    self.move_to(pos)
                }
            }
        }
    }

    /// Apply a complete action atomically.
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&mut self, action: Action) -> Result<Transition, MoveError> {
        match action {
            Action::Place { at } => self.place(at),
            Action::Move { from, to } => {
                let mut next = *self;
                match next.select_for_move(from)? {
                    Transition::Selected { .. } => {}
                    _ => return Err(MoveError::Blocked(from)),
                }
                let transition = next.move_to(to)?;
                *self = next;
                Ok(transition)
            }
            Action::Remove { at } => {
                let remover = self.pending_removal.ok_or(MoveError::NoRemovalPending)?;
                if self.removal_targets().is_empty() {
                    return Err(MoveError::NotRemovable(at));
                }
                self.remove_piece(remover.opponent(), at)
            }
            Action::Pass => self.pass(),
        }
    }

    /// Every action [`Game::apply`] would accept right now.
    pub fn legal_actions(&self) -> Vec<Action> {
        if self.finish.is_some() {
            return Vec::new();
        }
        if self.pending_removal.is_some() {
            let targets = self.removal_targets();
            if targets.is_empty() {
                return vec![Action::Pass];
            }
            return targets.iter().map(|at| Action::Remove { at }).collect();
        }

        let player = self.turn;
        let vacant = self.board.vacant();
        let pieces = self.board.pieces(player);
        match self.phase(player) {
            Phase::Placing => vacant.iter().map(|at| Action::Place { at }).collect(),
            Phase::Moving => pieces
                .iter()
                .flat_map(|from| {
                    self.board
                        .free_neighbors(from)
                        .iter()
                        .map(move |to| Action::Move { from, to })
                })
                .collect(),
            Phase::Flying => pieces
                .iter()
                .flat_map(|from| vacant.iter().map(move |to| Action::Move { from, to }))
                .collect(),
        }
    }

    // ========== Internal Transitions ==========

    fn ensure_turn_open(&self) -> Result<(), MoveError> {
        if self.finish.is_some() {
            return Err(MoveError::GameOver);
        }
        if let Some(remover) = self.pending_removal {
            return Err(MoveError::RemovalPending(remover));
        }
        Ok(())
    }

    /// Run the mill detector for the mover and branch on the result.
    fn resolve_mills(&mut self, player: Player) -> bool {
        let fresh = self.players[player.index()].credit_new_mills(&self.board, player);
        if fresh.is_empty() {
            self.advance_turn();
            false
        } else {
            info!(%player, mills = fresh.len(), "mill formed, removal pending");
            self.pending_removal = Some(player);
            true
        }
    }

    fn skip_capture(&mut self, victim: Player) -> Transition {
        info!(%victim, "nothing capturable, capture skipped");
        self.pending_removal = None;
        self.advance_turn();
        self.settle();
        Transition::CaptureSkipped { victim }
    }

    fn advance_turn(&mut self) {
        self.turn = self.turn.opponent();
        self.selected = None;
    }

    /// Evaluate terminal conditions.
    fn settle(&mut self) {
        if self.finish.is_some() {
            return;
        }
        for player in Player::BOTH {
            let state = self.player(player);
            if state.reserve == 0 && state.on_board < 3 {
                self.end(player, LossReason::TooFewPieces);
                return;
            }
        }
        if self.pending_removal.is_none()
            && self.phase(self.turn) == Phase::Moving
            && !self.has_any_legal_slide(self.turn)
        {
            self.end(self.turn, LossReason::Blocked);
        }
    }

    fn end(&mut self, loser: Player, reason: LossReason) {
        info!(%loser, ?reason, "game over");
        self.finish = Some(Finish { loser, reason });
        self.selected = None;
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

fn check_pos(pos: Pos) -> Result<(), MoveError> {
    if pos.is_valid() {
        Ok(())
    } else {
        Err(MoveError::OffBoard(pos.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(game: &mut Game, labels: &str) {
        for label in labels.split_whitespace() {
            let pos: Pos = label.parse().unwrap();
            game.click(Some(pos))
                .unwrap_or_else(|err| panic!("click {label} rejected: {err}"));
        }
    }

    fn setup(white: &[Pos], black: &[Pos], reserves: [u8; 2], to_move: Player) -> Game {
        Game::from_position(
            &Setup {
                white: white.to_vec(),
                black: black.to_vec(),
                reserves,
                to_move,
            },
            RuleSet::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_game() {
        let game = Game::new();
        assert_eq!(game.turn(), Player::White);
        assert_eq!(game.pending_removal(), None);
        assert_eq!(game.selected(), None);
        assert!(!game.is_over());
        for player in Player::BOTH {
            assert_eq!(game.player(player).reserve(), 9);
            assert_eq!(game.player(player).on_board(), 0);
        }
        assert_eq!(game.board().occupied(), PosSet::EMPTY);
    }

    #[test]
    fn test_place_alternates_turns() {
        let mut game = Game::new();
        assert_eq!(
            game.place(Pos::E),
            Ok(Transition::Placed { at: Pos::E, mill: false })
        );
        assert_eq!(game.turn(), Player::Black);
        game.place(Pos::B).unwrap();
        assert_eq!(game.turn(), Player::White);
        assert_eq!(game.board().owner(Pos::E), Some(Player::White));
        assert_eq!(game.board().owner(Pos::B), Some(Player::Black));
        assert_eq!(game.player(Player::White).reserve(), 8);
        assert_eq!(game.player(Player::Black).reserve(), 8);
        assert_eq!(game.player(Player::White).removable(), PosSet::single(Pos::E));
    }

    #[test]
    fn test_place_on_occupied_is_rejected() {
        let mut game = Game::new();
        game.place(Pos::E).unwrap();
        let before = game;
        assert_eq!(game.place(Pos::E), Err(MoveError::Occupied(Pos::E)));
        assert_eq!(game, before);
    }

    #[test]
    fn test_off_board_position_rejected() {
        let mut game = Game::new();
        assert_eq!(game.place(Pos(24)), Err(MoveError::OffBoard(24)));
        assert_eq!(game.click(Some(Pos(99))), Err(MoveError::OffBoard(99)));
        assert_eq!(game, Game::new());
    }

    #[test]
    fn test_miss_is_rejected() {
        let mut game = Game::new();
        assert_eq!(game.click(None), Err(MoveError::Miss));
        assert_eq!(game.step(None), Game::new());
    }

    #[test]
    fn test_mill_sets_pending_removal() {
        let mut game = Game::new();
        play(&mut game, "A X B W");
        assert_eq!(
            game.click(Some(Pos::C)),
            Ok(Transition::Placed { at: Pos::C, mill: true })
        );
        assert_eq!(game.pending_removal(), Some(Player::White));
        assert_eq!(game.turn(), Player::White);
        assert_eq!(game.actor(), Player::White);
        assert!(game.player(Player::White).removable().is_empty());
        assert_eq!(
            game.removal_targets(),
            [Pos::W, Pos::X].into_iter().collect::<PosSet>()
        );

        // Placing is frozen until the capture happens.
        assert_eq!(
            game.place(Pos::D),
            Err(MoveError::RemovalPending(Player::White))
        );
    }

    #[test]
    fn test_capture_passes_turn() {
        let mut game = Game::new();
        play(&mut game, "A X B W C");
        assert_eq!(
            game.click(Some(Pos::X)),
            Ok(Transition::Captured {
                victim: Player::Black,
                at: Pos::X
            })
        );
        assert_eq!(game.pending_removal(), None);
        assert_eq!(game.turn(), Player::Black);
        assert_eq!(game.player(Player::Black).on_board(), 1);
        assert_eq!(game.player(Player::Black).reserve(), 7);
        // Still placing, so fewer than three on the board is fine.
        assert!(!game.is_over());
    }

    #[test]
    fn test_cannot_capture_own_or_empty() {
        let mut game = Game::new();
        play(&mut game, "A X B W C");
        let before = game;
        assert_eq!(game.click(Some(Pos::A)), Err(MoveError::NotRemovable(Pos::A)));
        assert_eq!(game.click(Some(Pos::E)), Err(MoveError::NotRemovable(Pos::E)));
        assert_eq!(
            game.remove_piece(Player::White, Pos::A),
            Err(MoveError::WrongVictim(Player::White))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_remove_without_pending() {
        let mut game = Game::new();
        assert_eq!(
            game.remove_piece(Player::Black, Pos::A),
            Err(MoveError::NoRemovalPending)
        );
        assert_eq!(game.pass(), Err(MoveError::NoRemovalPending));
    }

    #[test]
    fn test_mill_protected_piece_not_capturable() {
        let mut game = Game::new();
        // Black builds V W X, White builds A B C; Black's mill stays protected.
        play(&mut game, "D V E W K X");
        assert_eq!(game.pending_removal(), Some(Player::Black));
        play(&mut game, "K");
        assert_eq!(game.player(Player::White).on_board(), 2);
        assert_eq!(game.turn(), Player::White);
        play(&mut game, "A J B S C");
        assert_eq!(game.pending_removal(), Some(Player::White));
        assert_eq!(
            game.removal_targets(),
            [Pos::J, Pos::S].into_iter().collect::<PosSet>()
        );
        assert_eq!(game.click(Some(Pos::W)), Err(MoveError::NotRemovable(Pos::W)));
    }

    #[test]
    fn test_capture_skipped_when_all_protected() {
        // Black's only pieces form a mill; White completes a mill.
        let mut game = setup(
            &[Pos::A, Pos::B],
            &[Pos::V, Pos::W, Pos::X],
            [5, 5],
            Player::White,
        );
        assert!(game.player(Player::Black).removable().is_empty());
        game.place(Pos::C).unwrap();
        assert_eq!(game.removal_targets(), PosSet::EMPTY);
        assert_eq!(game.legal_actions(), vec![Action::Pass]);

        assert_eq!(
            game.click(Some(Pos::E)),
            Ok(Transition::CaptureSkipped {
                victim: Player::Black
            })
        );
        assert_eq!(game.turn(), Player::Black);
        assert_eq!(game.pending_removal(), None);
        assert_eq!(game.player(Player::Black).on_board(), 3);
    }

    #[test]
    fn test_tournament_rule_captures_from_mill() {
        let mut game = Game::from_position(
            &Setup {
                white: vec![Pos::A, Pos::B],
                black: vec![Pos::V, Pos::W, Pos::X, Pos::T],
                reserves: [5, 5],
                to_move: Player::White,
            },
            RuleSet::tournament(),
        )
        .unwrap();
        // T is protected by nothing, so the normal rule still applies.
        game.place(Pos::C).unwrap();
        assert_eq!(game.removal_targets(), PosSet::single(Pos::T));
        game.click(Some(Pos::T)).unwrap();

        let mut game = Game::from_position(
            &Setup {
                white: vec![Pos::A, Pos::B],
                black: vec![Pos::V, Pos::W, Pos::X],
                reserves: [5, 5],
                to_move: Player::White,
            },
            RuleSet::tournament(),
        )
        .unwrap();
        game.place(Pos::C).unwrap();
        assert_eq!(game.removal_targets().len(), 3);
        assert_eq!(game.pass(), Err(MoveError::CaptureAvailable));
        game.click(Some(Pos::W)).unwrap();

        let black = game.player(Player::Black);
        assert!(black.active_mills().is_empty());
        assert_eq!(
            black.removable(),
            [Pos::V, Pos::X].into_iter().collect::<PosSet>()
        );
    }

    #[test]
    fn test_select_and_slide() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        assert_eq!(game.phase(Player::White), Phase::Moving);
        assert_eq!(
            game.click(Some(Pos::A)),
            Ok(Transition::Selected { at: Pos::A })
        );
        assert_eq!(game.move_targets(), PosSet::single(Pos::J));

        let before = game;
        assert_eq!(
            game.click(Some(Pos::C)),
            Err(MoveError::NotAdjacent {
                from: Pos::A,
                to: Pos::C
            })
        );
        assert_eq!(game, before);

        assert_eq!(
            game.click(Some(Pos::J)),
            Ok(Transition::Moved {
                from: Pos::A,
                to: Pos::J,
                mill: false
            })
        );
        assert_eq!(game.selected(), None);
        assert_eq!(game.turn(), Player::Black);
        assert!(game.player(Player::White).removable().contains(Pos::J));
        assert!(!game.player(Player::White).removable().contains(Pos::A));
    }

    #[test]
    fn test_reselect_switches_piece() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        play(&mut game, "A K");
        assert_eq!(game.selected(), Some(Pos::K));
    }

    #[test]
    fn test_blocked_piece_clears_selection() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::J, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        // A is boxed in by B and J.
        assert_eq!(game.click(Some(Pos::A)), Err(MoveError::Blocked(Pos::A)));
        play(&mut game, "E");
        assert_eq!(game.click(Some(Pos::A)), Ok(Transition::Deselected));
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_click_opponent_piece_without_selection() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        assert_eq!(game.click(Some(Pos::B)), Err(MoveError::NotOwnPiece(Pos::B)));
        assert_eq!(game.click(Some(Pos::C)), Err(MoveError::NotOwnPiece(Pos::C)));
    }

    #[test]
    fn test_flying_moves_anywhere() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        assert_eq!(game.phase(Player::White), Phase::Flying);
        play(&mut game, "A");
        assert_eq!(game.move_targets(), game.board().vacant());
        play(&mut game, "X");
        assert_eq!(game.board().owner(Pos::X), Some(Player::White));
    }

    #[test]
    fn test_slide_into_mill_triggers_capture() {
        let mut game = setup(
            &[Pos::A, Pos::B, Pos::O, Pos::K],
            &[Pos::Q, Pos::T, Pos::W, Pos::S],
            [0, 0],
            Player::White,
        );
        play(&mut game, "O");
        assert_eq!(
            game.click(Some(Pos::C)),
            Ok(Transition::Moved {
                from: Pos::O,
                to: Pos::C,
                mill: true
            })
        );
        assert_eq!(game.pending_removal(), Some(Player::White));
        assert_eq!(
            game.player(Player::White).removable(),
            PosSet::single(Pos::K)
        );
    }

    #[test]
    fn test_open_and_close_mill_recaptures() {
        let mut game = setup(
            &[Pos::A, Pos::B, Pos::C, Pos::K],
            &[Pos::Q, Pos::T, Pos::W, Pos::S, Pos::R],
            [0, 0],
            Player::White,
        );
        assert!(game.player(Player::White).removable().contains(Pos::K));
        assert_eq!(game.player(Player::White).active_mills().len(), 1);

        // Open the mill: C leaves, A and B become capturable again.
        play(&mut game, "C O");
        let white = game.player(Player::White);
        assert!(white.active_mills().is_empty());
        assert_eq!(
            white.removable(),
            [Pos::A, Pos::B, Pos::K, Pos::O].into_iter().collect::<PosSet>()
        );

        play(&mut game, "R M");
        // Closing it again is a fresh completion.
        play(&mut game, "O");
        assert!(game.click(Some(Pos::C)).unwrap().formed_mill());
    }

    #[test]
    fn test_held_mill_does_not_retrigger() {
        let mut game = setup(
            &[Pos::A, Pos::B, Pos::C, Pos::K],
            &[Pos::Q, Pos::T, Pos::W, Pos::S, Pos::R],
            [0, 0],
            Player::White,
        );
        // Moving a piece outside the mill leaves it credited and silent.
        play(&mut game, "K L");
        assert_eq!(game.pending_removal(), None);
        assert_eq!(game.turn(), Player::Black);
        assert_eq!(game.player(Player::White).active_mills().len(), 1);
    }

    #[test]
    fn test_game_over_below_three() {
        let mut game = setup(
            &[Pos::A, Pos::B, Pos::E],
            &[Pos::V, Pos::W, Pos::Q],
            [0, 0],
            Player::White,
        );
        play(&mut game, "E C");
        assert_eq!(game.pending_removal(), Some(Player::White));
        play(&mut game, "Q");
        assert_eq!(game.player(Player::Black).on_board(), 2);
        assert!(game.is_over());
        assert_eq!(
            game.finish(),
            Some(Finish {
                loser: Player::Black,
                reason: LossReason::TooFewPieces
            })
        );
        assert_eq!(game.winner(), Some(Player::White));

        let before = game;
        assert_eq!(game.click(Some(Pos::V)), Err(MoveError::GameOver));
        assert_eq!(game.place(Pos::D), Err(MoveError::GameOver));
        assert_eq!(game.move_to(Pos::D), Err(MoveError::GameOver));
        assert_eq!(game, before);
        assert!(game.legal_actions().is_empty());
    }

    #[test]
    fn test_blocked_player_loses_at_turn_start() {
        // Black's four pieces on A, C, V, X are boxed in by White.
        let game = setup(
            &[Pos::B, Pos::J, Pos::O, Pos::W, Pos::E],
            &[Pos::A, Pos::C, Pos::V, Pos::X],
            [0, 0],
            Player::Black,
        );
        assert_eq!(
            game.finish(),
            Some(Finish {
                loser: Player::Black,
                reason: LossReason::Blocked
            })
        );
    }

    #[test]
    fn test_block_detected_after_opponent_move() {
        let mut game = setup(
            &[Pos::B, Pos::J, Pos::O, Pos::T],
            &[Pos::A, Pos::C, Pos::V, Pos::X],
            [0, 0],
            Player::White,
        );
        assert!(!game.is_over());
        // T slides to W, sealing X and V.
        play(&mut game, "T W");
        assert_eq!(game.turn(), Player::Black);
        assert_eq!(game.winner(), Some(Player::White));
    }

    #[test]
    fn test_legal_actions_placing() {
        let game = Game::new();
        let actions = game.legal_actions();
        assert_eq!(actions.len(), 24);
        assert!(actions.contains(&Action::Place { at: Pos::E }));
    }

    #[test]
    fn test_legal_actions_moving() {
        let game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        let actions = game.legal_actions();
        // A: J; E: H D F; K: S J D L; N: U M F O
        assert_eq!(actions.len(), 12);
        assert!(actions.contains(&Action::Move {
            from: Pos::A,
            to: Pos::J
        }));
        for action in actions {
            let mut copy = game;
            assert!(copy.apply(action).is_ok(), "{action} should apply");
        }
    }

    #[test]
    fn test_apply_move_is_atomic() {
        let mut game = setup(
            &[Pos::A, Pos::E, Pos::K, Pos::N],
            &[Pos::B, Pos::Q, Pos::T, Pos::W],
            [0, 0],
            Player::White,
        );
        let before = game;
        assert_eq!(
            game.apply(Action::Move {
                from: Pos::A,
                to: Pos::V
            }),
            Err(MoveError::NotAdjacent {
                from: Pos::A,
                to: Pos::V
            })
        );
        assert_eq!(game, before);
    }

    #[test]
    fn test_setup_validation() {
        let overlap = Setup {
            white: vec![Pos::A],
            black: vec![Pos::A],
            reserves: [0, 0],
            to_move: Player::White,
        };
        assert_eq!(
            Game::from_position(&overlap, RuleSet::default()),
            Err(SetupError::Duplicate(Pos::A))
        );

        let too_many = Setup {
            white: vec![Pos::A, Pos::B],
            black: vec![],
            reserves: [8, 9],
            to_move: Player::White,
        };
        assert!(matches!(
            Game::from_position(&too_many, RuleSet::default()),
            Err(SetupError::TooManyPieces {
                player: Player::White,
                ..
            })
        ));

        let off_board = Setup {
            white: vec![Pos(30)],
            black: vec![],
            reserves: [8, 9],
            to_move: Player::White,
        };
        assert_eq!(
            Game::from_position(&off_board, RuleSet::default()),
            Err(SetupError::OffBoard(30))
        );
    }

    #[test]
    fn test_setup_credits_standing_mills() {
        let game = setup(
            &[Pos::A, Pos::B, Pos::C, Pos::E],
            &[Pos::V, Pos::Q, Pos::T, Pos::U],
            [0, 0],
            Player::White,
        );
        let white = game.player(Player::White);
        assert_eq!(white.active_mills().len(), 1);
        assert_eq!(white.removable(), PosSet::single(Pos::E));
        assert_eq!(game.pending_removal(), None);
    }
}
