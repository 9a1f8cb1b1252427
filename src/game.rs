// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Turn management for a single game of chess.
//!
//! A [`Match`] owns the current [`Position`] and nothing else. Every move is computed by [`step`], a pure function
//! from a position and a requested move to the next position and a [`MoveOutcome`]; the match only ever replaces its
//! position wholesale with the result of a successful step. A rejected move therefore leaves the match exactly as it
//! was.

use thiserror::Error;

use crate::{
    board::PieceId,
    core::*,
    events::{CaptureEvent, MatchEvent, MatchEventKind, MoveEvent, PromotionEvent, WinEvent},
    position::Position,
};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] SquareParseError),
    #[error("there is no piece on {0}")]
    EmptySource(Square),
    #[error("the piece on {0} is not yours")]
    WrongOwner(Square),
    #[error("there are no possible moves for the piece on {0}")]
    NoLegalMoves(Square),
    #[error("the piece on {0} can't move to {1}")]
    IllegalTarget(Square, Square),
    #[error("you can't put yourself in check")]
    SelfCheckRejected,
    #[error("there is no piece to be promoted")]
    NothingToPromote,
    #[error("the game is over")]
    GameOver,
}

/// The result of a committed move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub source: Square,
    pub target: Square,
    /// The piece that moved, as it stood before moving.
    pub piece: Piece,
    pub captured: Option<Piece>,
    /// The piece a pawn was promoted to on this move.
    pub promoted: Option<Piece>,
    pub check: bool,
    pub checkmate: bool,
    pub events: Vec<MatchEventKind>,
}

/// The result of swapping a pending promotion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromotionOutcome {
    pub piece: Piece,
    pub check: bool,
    pub checkmate: bool,
    pub events: Vec<MatchEventKind>,
}

fn to_square(coord: Coordinate) -> Square {
    Square::from_coordinate(coord).expect("coordinate off an 8x8 board")
}

fn source_piece(pos: &Position, source: Square) -> Result<(PieceId, Piece), MatchError> {
    let id = pos
        .id_at(source.to_coordinate())
        .ok_or(MatchError::EmptySource(source))?;
    let piece = *pos.piece(id);
    if piece.color != pos.side_to_move() {
        return Err(MatchError::WrongOwner(source));
    }

    Ok((id, piece))
}

/// Validates a piece selection the way a move would: the piece must exist, belong to the side to move and have at
/// least one pseudo-legal destination. Returns its pseudo-legal destinations.
pub fn possible_moves(pos: &Position, source: Square) -> Result<MoveGrid, MatchError> {
    let (id, _) = source_piece(pos, source)?;
    let moves = pos.possible_moves(id);
    if moves.is_empty() {
        return Err(MatchError::NoLegalMoves(source));
    }

    Ok(moves)
}

/// Computes the position that results from moving the piece on `source` to `target`, without touching `pos`.
///
/// A pawn reaching the last row is promoted to `promotion`, or to a queen if no choice is given. A choice that a pawn
/// can't be promoted to leaves the pawn in place, still pending promotion.
pub fn step(
    pos: &Position,
    source: Square,
    target: Square,
    promotion: Option<PieceKind>,
) -> Result<(Position, MoveOutcome), MatchError> {
    if pos.checkmate() {
        return Err(MatchError::GameOver);
    }

    let moves = possible_moves(pos, source)?;
    let (_, piece) = source_piece(pos, source)?;
    let (from, to) = (source.to_coordinate(), target.to_coordinate());
    if !moves.contains(to) {
        return Err(MatchError::IllegalTarget(source, target));
    }

    let mover = piece.color;
    let (mut next, applied) = pos.speculate(from, to);
    if next.is_check(mover) {
        tracing::debug!(%source, %target, "move rejected, it exposes the {} king", mover);
        return Err(MatchError::SelfCheckRejected);
    }

    tracing::debug!(%source, %target, "applied {}", piece);
    let mut events: Vec<MatchEventKind> = vec![MoveEvent {
        player: mover,
        piece: piece.kind,
        source,
        target,
    }
    .into()];

    let captured = applied.captured.map(|id| *next.piece(id));
    if let (Some(victim), Some(at)) = (captured, applied.captured_at) {
        tracing::info!(position = %to_square(at), "{} captures {}", mover, victim);
        events.push(
            CaptureEvent {
                player: mover,
                piece: victim.kind,
                position: to_square(at),
            }
            .into(),
        );
    }

    next.set_pending_promotion(None);
    let mut promoted = None;
    let last_row = mover.toggle().back_row(next.board().rows());
    if piece.kind == PieceKind::Pawn && to.row == last_row {
        next.set_pending_promotion(Some(applied.piece));
        let kind = promotion.unwrap_or(PieceKind::Queen);
        if let Some(id) = next.promote(applied.piece, kind) {
            let new_piece = *next.piece(id);
            tracing::info!(position = %target, "{} pawn promoted to {}", mover, kind);
            events.push(
                PromotionEvent {
                    player: mover,
                    kind,
                    position: target,
                }
                .into(),
            );
            promoted = Some(new_piece);
        }
    }

    next.conclude(mover, &applied);
    if next.checkmate() {
        tracing::info!("checkmate, {} wins", mover);
        events.push(WinEvent { player: mover }.into());
    } else if next.check() {
        tracing::info!("{} is in check", mover.toggle());
    }

    let outcome = MoveOutcome {
        source,
        target,
        piece,
        captured,
        promoted,
        check: next.check(),
        checkmate: next.checkmate(),
        events,
    };

    Ok((next, outcome))
}

/// A single game of chess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    position: Position,
}

impl Match {
    /// Starts a new game from the standard starting position.
    pub fn new() -> Match {
        Match::from_position(Position::from_start_position())
    }

    pub fn from_position(position: Position) -> Match {
        Match { position }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn into_position(self) -> Position {
        self.position
    }

    pub fn turn(&self) -> u32 {
        self.position.turn()
    }

    pub fn current_player(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn check(&self) -> bool {
        self.position.check()
    }

    pub fn checkmate(&self) -> bool {
        self.position.checkmate()
    }

    /// The side that delivered checkmate, if the game is over.
    pub fn winner(&self) -> Option<Color> {
        if self.position.checkmate() {
            Some(self.position.side_to_move())
        } else {
            None
        }
    }

    /// Every square of the board, row by row from the eighth rank down, as seen by a renderer.
    pub fn pieces(&self) -> Vec<Vec<Option<Piece>>> {
        let board = self.position.board();
        (0..board.rows())
            .map(|row| {
                (0..board.columns())
                    .map(|column| board.occupant_at(Coordinate::new(row, column)).copied())
                    .collect()
            })
            .collect()
    }

    /// Captured pieces of both colors, in order of capture.
    pub fn captured_pieces(&self) -> Vec<Piece> {
        self.position
            .captured()
            .iter()
            .map(|&id| *self.position.piece(id))
            .collect()
    }

    pub fn last_captured(&self) -> Option<Piece> {
        self.position
            .captured()
            .last()
            .map(|&id| *self.position.piece(id))
    }

    /// The square of the pawn that may be captured en passant on this turn.
    pub fn en_passant_vulnerable(&self) -> Option<Square> {
        self.position
            .en_passant_vulnerable()
            .and_then(|id| self.position.board().position(id))
            .map(to_square)
    }

    /// The piece produced by a promotion on the last move, which `replace_promoted_piece` may still swap.
    pub fn promoted(&self) -> Option<Piece> {
        self.position
            .pending_promotion()
            .map(|id| *self.position.piece(id))
    }

    pub fn possible_moves(&self, source: Square) -> Result<MoveGrid, MatchError> {
        possible_moves(&self.position, source)
    }

    /// Like `possible_moves`, without the destinations that would leave the mover's king attacked.
    pub fn legal_moves(&self, source: Square) -> Result<MoveGrid, MatchError> {
        possible_moves(&self.position, source)?;
        let id = self
            .position
            .id_at(source.to_coordinate())
            .ok_or(MatchError::EmptySource(source))?;
        Ok(self.position.legal_moves(id))
    }

    pub fn perform_move(
        &mut self,
        source: Square,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, MatchError> {
        let (next, outcome) = step(&self.position, source, target, promotion)?;
        self.position = next;
        Ok(outcome)
    }

    /// Parses both squares from algebraic notation and performs the move.
    pub fn perform_algebraic(
        &mut self,
        source: &str,
        target: &str,
        promotion: Option<PieceKind>,
    ) -> Result<MoveOutcome, MatchError> {
        let source = source.parse::<Square>()?;
        let target = target.parse::<Square>()?;
        self.perform_move(source, target, promotion)
    }

    /// Swaps the piece promoted on the last move for one of another kind. Kinds a pawn can't be promoted to leave the
    /// pending piece untouched. Check and checkmate are derived again against the new piece.
    pub fn replace_promoted_piece(&mut self, kind: PieceKind) -> Result<PromotionOutcome, MatchError> {
        let pending = self
            .position
            .pending_promotion()
            .ok_or(MatchError::NothingToPromote)?;
        let current = *self.position.piece(pending);
        if !kind.is_promotion_target() {
            return Ok(PromotionOutcome {
                piece: current,
                check: self.check(),
                checkmate: self.checkmate(),
                events: Vec::new(),
            });
        }

        let mover = current.color;
        let mut next = self.position.clone();
        let coord = next
            .board()
            .position(pending)
            .expect("pending promotion off the board");
        next.reopen(mover);
        let id = next
            .promote(pending, kind)
            .expect("promotion target was checked");
        next.conclude_turn(mover);

        let position = to_square(coord);
        tracing::info!(%position, "{} promotion replaced with {}", mover, kind);
        let mut events: Vec<MatchEventKind> = vec![PromotionEvent {
            player: mover,
            kind,
            position,
        }
        .into()];
        if next.checkmate() {
            events.push(WinEvent { player: mover }.into());
        }

        let outcome = PromotionOutcome {
            piece: *next.piece(id),
            check: next.check(),
            checkmate: next.checkmate(),
            events,
        };
        self.position = next;
        Ok(outcome)
    }
}

impl Default for Match {
    fn default() -> Self {
        Match::new()
    }
}

/// Stamps a batch of event kinds with the current time and, if given, the match they belong to.
pub fn timestamped(kinds: &[MatchEventKind], match_id: Option<u64>) -> Vec<MatchEvent> {
    kinds
        .iter()
        .cloned()
        .map(|kind| {
            let event = MatchEvent::now(kind);
            match match_id {
                Some(id) => event.with_match_id(id),
                None => event,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    mod lifecycle {
        use crate::{core::*, game::Match};

        #[test]
        fn new_match() {
            let game = Match::new();
            assert_eq!(Color::White, game.current_player());
            assert_eq!(1, game.turn());
            assert!(!game.check());
            assert!(!game.checkmate());
            assert_eq!(None, game.winner());
            for color in colors() {
                let count = game
                    .pieces()
                    .iter()
                    .flatten()
                    .flatten()
                    .filter(|piece| piece.color == color)
                    .count();
                assert_eq!(16, count);
            }
        }

        #[test]
        fn turns_alternate() {
            let mut game = Match::new();
            game.perform_move(E2, E4, None).unwrap();
            assert_eq!(Color::Black, game.current_player());
            assert_eq!(2, game.turn());
            game.perform_move(E7, E5, None).unwrap();
            assert_eq!(Color::White, game.current_player());
            assert_eq!(3, game.turn());
        }

        #[test]
        fn scholars_mate() {
            let mut game = Match::new();
            for (source, target) in [
                ("e2", "e4"),
                ("e7", "e5"),
                ("f1", "c4"),
                ("b8", "c6"),
                ("d1", "h5"),
                ("g8", "f6"),
            ] {
                game.perform_algebraic(source, target, None).unwrap();
            }

            let outcome = game.perform_algebraic("h5", "f7", None).unwrap();
            assert!(outcome.check);
            assert!(outcome.checkmate);
            assert_eq!(Some(PieceKind::Pawn), outcome.captured.map(|p| p.kind));
            assert!(game.checkmate());
            assert_eq!(Color::White, game.current_player());
            assert_eq!(Some(Color::White), game.winner());
            assert_eq!(7, game.turn());
        }

        #[test]
        fn fools_mate() {
            let mut game = Match::new();
            game.perform_move(F2, F3, None).unwrap();
            game.perform_move(E7, E5, None).unwrap();
            game.perform_move(G2, G4, None).unwrap();
            let outcome = game.perform_move(D8, H4, None).unwrap();
            assert!(outcome.checkmate);
            assert_eq!(Color::Black, game.current_player());
            assert_eq!(4, game.turn());
        }

        #[test]
        fn no_moves_after_checkmate() {
            let mut game = Match::new();
            game.perform_move(F2, F3, None).unwrap();
            game.perform_move(E7, E5, None).unwrap();
            game.perform_move(G2, G4, None).unwrap();
            game.perform_move(D8, H4, None).unwrap();
            let before = game.clone();
            assert_eq!(
                crate::game::MatchError::GameOver,
                game.perform_move(A2, A3, None).unwrap_err()
            );
            assert_eq!(before, game);
        }

        #[test]
        fn check_is_reported() {
            let mut game = Match::new();
            game.perform_move(E2, E4, None).unwrap();
            game.perform_move(F7, F6, None).unwrap();
            let outcome = game.perform_move(D1, H5, None).unwrap();
            assert!(outcome.check);
            assert!(!outcome.checkmate);
            assert!(game.check());
            assert_eq!(Color::Black, game.current_player());
        }
    }

    mod errors {
        use crate::{
            core::*,
            game::{Match, MatchError},
            position::Position,
        };

        #[test]
        fn invalid_coordinate() {
            let mut game = Match::new();
            let err = game.perform_algebraic("i2", "e4", None).unwrap_err();
            assert!(matches!(err, MatchError::InvalidCoordinate(_)));
            let err = game.perform_algebraic("e2", "e9", None).unwrap_err();
            assert!(matches!(err, MatchError::InvalidCoordinate(_)));
        }

        #[test]
        fn empty_source() {
            let mut game = Match::new();
            assert_eq!(
                MatchError::EmptySource(E4),
                game.perform_move(E4, E5, None).unwrap_err()
            );
            assert_eq!(
                MatchError::EmptySource(E4),
                game.possible_moves(E4).unwrap_err()
            );
        }

        #[test]
        fn wrong_owner() {
            let mut game = Match::new();
            assert_eq!(
                MatchError::WrongOwner(E7),
                game.perform_move(E7, E5, None).unwrap_err()
            );
        }

        #[test]
        fn no_legal_moves() {
            let game = Match::new();
            assert_eq!(MatchError::NoLegalMoves(A1), game.possible_moves(A1).unwrap_err());
            assert_eq!(MatchError::NoLegalMoves(D1), game.legal_moves(D1).unwrap_err());
        }

        #[test]
        fn illegal_target() {
            let mut game = Match::new();
            assert_eq!(
                MatchError::IllegalTarget(E2, E5),
                game.perform_move(E2, E5, None).unwrap_err()
            );
            assert_eq!(Color::White, game.current_player());
        }

        #[test]
        fn self_check_leaves_match_untouched() {
            // The bishop on e3 is pinned against the king by the rook on e8.
            let pos = Position::from_fen("k3r3/8/8/8/8/4B3/4K3/8 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let before = game.clone();
            assert_eq!(
                MatchError::SelfCheckRejected,
                game.perform_move(E3, D4, None).unwrap_err()
            );
            assert_eq!(before, game);
            assert!(game.possible_moves(E3).unwrap().contains(D4.to_coordinate()));
            assert!(!game.legal_moves(E3).unwrap().contains(D4.to_coordinate()));
        }

        #[test]
        fn self_check_with_capture_restores_everything() {
            // Capturing the knight on b5 would expose the king on e1 to the rook on e8.
            let pos = Position::from_fen("4r1k1/8/8/1n6/8/8/4B3/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let before = game.clone();
            let err = game.perform_move(E2, B5, None).unwrap_err();
            assert_eq!(MatchError::SelfCheckRejected, err);
            assert_eq!(before, game);
            assert!(game.captured_pieces().is_empty());
            assert_eq!(
                PieceKind::Knight,
                game.position().piece_at(B5).unwrap().kind
            );
            assert!(!game.position().piece_at(E2).unwrap().has_moved());
        }

        #[test]
        fn nothing_to_promote() {
            let mut game = Match::new();
            assert_eq!(
                MatchError::NothingToPromote,
                game.replace_promoted_piece(PieceKind::Queen).unwrap_err()
            );
        }
    }

    mod special {
        use crate::{core::*, game::Match, position::Position};

        #[test]
        fn en_passant() {
            let pos = Position::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(D7, D5, None).unwrap();
            assert_eq!(Some(D5), game.en_passant_vulnerable());
            assert!(game.possible_moves(E5).unwrap().contains(D6.to_coordinate()));

            let outcome = game.perform_move(E5, D6, None).unwrap();
            let captured = outcome.captured.unwrap();
            assert_eq!(PieceKind::Pawn, captured.kind);
            assert_eq!(Color::Black, captured.color);
            assert!(game.position().piece_at(D5).is_none());
            assert_eq!(Color::White, game.position().piece_at(D6).unwrap().color);
            assert_eq!(Some(captured), game.last_captured());
            assert_eq!(None, game.en_passant_vulnerable());
        }

        #[test]
        fn en_passant_capture_escapes_check() {
            // b7-b5 checks the king on a4; a3, b3 and b4 are covered and b5 is defended.
            let pos = Position::from_fen("7k/1p6/2pb4/P7/K7/7r/8/8 b - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let outcome = game.perform_move(B7, B5, None).unwrap();
            assert!(outcome.check);
            assert!(!outcome.checkmate);
            assert!(!game.checkmate());

            let escapes = game.legal_moves(A5).unwrap();
            assert!(escapes.contains(B6.to_coordinate()));
            assert!(game.legal_moves(A4).unwrap().is_empty());

            let outcome = game.perform_move(A5, B6, None).unwrap();
            assert_eq!(PieceKind::Pawn, outcome.captured.unwrap().kind);
            assert!(game.position().piece_at(B5).is_none());
            assert!(!game.position().is_check(Color::White));
        }

        #[test]
        fn en_passant_expires() {
            let pos = Position::from_fen("4k3/3p3p/8/4P3/8/8/P7/4K3 b - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(D7, D5, None).unwrap();
            game.perform_move(A2, A3, None).unwrap();
            game.perform_move(H7, H6, None).unwrap();
            assert!(!game.possible_moves(E5).unwrap().contains(D6.to_coordinate()));
        }

        #[test]
        fn castle_short() {
            let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            assert!(game.possible_moves(E1).unwrap().contains(G1.to_coordinate()));
            game.perform_move(E1, G1, None).unwrap();
            let rook = game.position().piece_at(F1).unwrap();
            assert_eq!(PieceKind::Rook, rook.kind);
            assert_eq!(1, rook.move_count);
            assert!(game.position().piece_at(H1).is_none());
        }

        #[test]
        fn castle_long() {
            let pos = Position::from_fen("r3k3/8/8/8/8/8/8/4K3 b q - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(E8, C8, None).unwrap();
            assert_eq!(PieceKind::Rook, game.position().piece_at(D8).unwrap().kind);
            assert_eq!(PieceKind::King, game.position().piece_at(C8).unwrap().kind);
        }

        #[test]
        fn no_castle_after_king_moved() {
            let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(E1, E2, None).unwrap();
            game.perform_move(E8, E7, None).unwrap();
            game.perform_move(E2, E1, None).unwrap();
            game.perform_move(E7, E8, None).unwrap();
            assert_eq!(0, game.position().piece_at(H1).unwrap().move_count);
            assert!(!game.possible_moves(E1).unwrap().contains(G1.to_coordinate()));
        }

        #[test]
        fn promotion_to_rook() {
            let pos = Position::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let pawn = game.position().id_at(A7.to_coordinate()).unwrap();
            let outcome = game.perform_move(A7, A8, Some(PieceKind::Rook)).unwrap();
            let rook = outcome.promoted.unwrap();
            assert_eq!(PieceKind::Rook, rook.kind);
            assert_eq!(Color::White, rook.color);
            assert_eq!(Some(rook), game.position().piece_at(A8));
            assert_eq!(Some(rook), game.promoted());
            assert_eq!(None, game.position().board().position(pawn));
            assert!(!game.position().captured().contains(&pawn));
            assert!(outcome.check);
        }

        #[test]
        fn promotion_defaults_to_queen() {
            let pos = Position::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(A7, A8, None).unwrap();
            assert_eq!(PieceKind::Queen, game.position().piece_at(A8).unwrap().kind);
        }

        #[test]
        fn replace_promoted_piece() {
            let pos = Position::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            game.perform_move(A7, A8, None).unwrap();
            assert!(game.check());
            assert_eq!(2, game.turn());

            let outcome = game.replace_promoted_piece(PieceKind::Knight).unwrap();
            assert_eq!(PieceKind::Knight, outcome.piece.kind);
            assert!(!outcome.check);
            assert!(!game.check());
            assert_eq!(Color::Black, game.current_player());
            assert_eq!(2, game.turn());
            assert_eq!(Some(outcome.piece), game.promoted());

            // Not a promotion target: nothing changes.
            let outcome = game.replace_promoted_piece(PieceKind::King).unwrap();
            assert_eq!(PieceKind::Knight, outcome.piece.kind);

            game.perform_move(H8, G7, None).unwrap();
            assert_eq!(None, game.promoted());
        }

        #[test]
        fn promotion_to_invalid_kind_leaves_pawn() {
            let pos = Position::from_fen("7k/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let outcome = game.perform_move(A7, A8, Some(PieceKind::King)).unwrap();
            assert_eq!(None, outcome.promoted);
            assert_eq!(PieceKind::Pawn, game.position().piece_at(A8).unwrap().kind);
            game.replace_promoted_piece(PieceKind::Bishop).unwrap();
            assert_eq!(PieceKind::Bishop, game.position().piece_at(A8).unwrap().kind);
        }

        #[test]
        fn promotion_that_mates() {
            let pos = Position::from_fen("k7/2P5/1K6/8/8/8/8/8 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let outcome = game.perform_move(C7, C8, None).unwrap();
            assert!(outcome.checkmate);
            assert_eq!(Some(Color::White), game.winner());

            // A knight on c8 gives no check at all.
            let outcome = game.replace_promoted_piece(PieceKind::Knight).unwrap();
            assert!(!outcome.checkmate);
            assert!(!game.checkmate());
            assert_eq!(Color::Black, game.current_player());
        }
    }

    mod events {
        use crate::{
            core::*,
            events::{CaptureEvent, MatchEventKind, MoveEvent, WinEvent},
            game::{self, Match},
            position::Position,
        };

        #[test]
        fn timestamped_carries_match_id() {
            let mut game = Match::new();
            let outcome = game.perform_move(E2, E4, None).unwrap();
            let tagged = game::timestamped(&outcome.events, Some(12));
            assert_eq!(outcome.events.len(), tagged.len());
            assert!(tagged.iter().all(|event| event.match_id == Some(12)));
            assert!(game::timestamped(&outcome.events, None)
                .iter()
                .all(|event| event.match_id.is_none()));
        }

        #[test]
        fn move_and_capture() {
            let pos = Position::from_fen("4k3/8/8/8/5p2/4P3/8/4K3 w - - 0 1").unwrap();
            let mut game = Match::from_position(pos);
            let outcome = game.perform_move(E3, F4, None).unwrap();
            assert_eq!(
                vec![
                    MatchEventKind::Move(MoveEvent {
                        player: Color::White,
                        piece: PieceKind::Pawn,
                        source: E3,
                        target: F4,
                    }),
                    MatchEventKind::Capture(CaptureEvent {
                        player: Color::White,
                        piece: PieceKind::Pawn,
                        position: F4,
                    }),
                ],
                outcome.events
            );
        }

        #[test]
        fn win() {
            let mut game = Match::new();
            game.perform_move(F2, F3, None).unwrap();
            game.perform_move(E7, E5, None).unwrap();
            game.perform_move(G2, G4, None).unwrap();
            let outcome = game.perform_move(D8, H4, None).unwrap();
            assert_eq!(
                Some(&MatchEventKind::Win(WinEvent {
                    player: Color::Black
                })),
                outcome.events.last()
            );
        }
    }

    mod playouts {
        use proptest::prelude::*;
        use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

        use crate::{
            core::*,
            game::{Match, MatchError},
            position::Position,
        };

        /// Every legal move of the side to move, as square pairs.
        fn legal_moves(game: &Match) -> Vec<(Square, Square)> {
            let pos = game.position();
            let mut moves = Vec::new();
            for (id, coord, _) in pos.pieces(pos.side_to_move()) {
                let source = Square::from_coordinate(coord).unwrap();
                for target in pos.legal_moves(id).iter() {
                    moves.push((source, Square::from_coordinate(target).unwrap()));
                }
            }

            moves
        }

        fn check_invariants(game: &Match) {
            let pos = game.position();
            pos.validate().unwrap();
            let on_board = game.pieces().iter().flatten().flatten().count();
            assert_eq!(32, on_board + game.captured_pieces().len());
            assert_eq!(pos.check(), pos.checked_side().map_or(false, |c| pos.is_check(c)));
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            #[test]
            fn random_playout(seed in any::<u64>()) {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut game = Match::new();
                for _ in 0..60 {
                    check_invariants(&game);
                    let moves = legal_moves(&game);
                    if game.checkmate() {
                        prop_assert!(moves.is_empty() || game.winner().is_some());
                        break;
                    }

                    let &(source, target) = match moves.choose(&mut rng) {
                        Some(mov) => mov,
                        None => break,
                    };

                    let before = game.clone();
                    let outcome = game.perform_move(source, target, None);
                    prop_assert!(outcome.is_ok(), "{} -> {} rejected in\n{}", source, target, before.position());

                    let restored = Position::from_fen(game.position().as_fen()).unwrap();
                    prop_assert_eq!(restored.as_fen(), game.position().as_fen());
                }
            }

            #[test]
            fn pseudo_legal_but_illegal_moves_are_rejected(seed in any::<u64>()) {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut game = Match::new();
                for _ in 0..40 {
                    if game.checkmate() {
                        break;
                    }

                    let pos = game.position().clone();
                    for (id, coord, _) in pos.pieces(pos.side_to_move()) {
                        let legal = pos.legal_moves(id);
                        for target in pos.possible_moves(id).iter() {
                            if legal.contains(target) {
                                continue;
                            }

                            let mut attempt = game.clone();
                            let err = attempt
                                .perform_move(
                                    Square::from_coordinate(coord).unwrap(),
                                    Square::from_coordinate(target).unwrap(),
                                    None,
                                )
                                .unwrap_err();
                            prop_assert_eq!(MatchError::SelfCheckRejected, err);
                            prop_assert_eq!(&attempt, &game);
                        }
                    }

                    let moves = legal_moves(&game);
                    let &(source, target) = match moves.choose(&mut rng) {
                        Some(mov) => mov,
                        None => break,
                    };
                    game.perform_move(source, target, None).unwrap();
                }
            }
        }
    }
}
