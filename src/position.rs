// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    board::{Board, PieceId},
    core::{self, *},
    movegen,
};

/// A position, representing a chess match that has progressed up to this point. A Position owns the board, every
/// piece ever created for the match (on the board, captured, or retired by promotion) and all of the match-wide
/// flags that move generation and turn management consult.
///
/// Positions are cheap to clone. Legality testing and the checkmate search work by applying candidate moves to a
/// clone and discarding it, so the position a caller holds is never mutated speculatively.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// The grid, and the arena of every piece of the match.
    board: Board<Piece>,
    /// Captured pieces, in order of capture.
    captured: Vec<PieceId>,
    /// Color whose turn it is to move. After checkmate this stays the color that delivered mate.
    side_to_move: Color,
    /// Half-move counter, starting at 1.
    turn: u32,
    /// Whether the side that is to respond to the last move is in check.
    check: bool,
    /// Terminal flag; once set no further moves are accepted.
    checkmate: bool,
    /// The pawn that double-stepped on the last move, if any.
    en_passant_vulnerable: Option<PieceId>,
    /// The piece produced by a promotion on the last move, until the next move is made.
    pending_promotion: Option<PieceId>,
}

/// The record of one application of a move to a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub piece: PieceId,
    pub source: Coordinate,
    pub target: Coordinate,
    pub captured: Option<PieceId>,
    /// The cell the captured piece stood on. Differs from `target` only for en-passant captures.
    pub captured_at: Option<Coordinate>,
    /// Source and destination of the rook, if this move castled.
    pub castle: Option<(Coordinate, Coordinate)>,
    pub double_step: bool,
}

impl Position {
    pub fn board(&self) -> &Board<Piece> {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn check(&self) -> bool {
        self.check
    }

    pub fn checkmate(&self) -> bool {
        self.checkmate
    }

    /// The color whose king the check flag refers to, if the flag is set.
    pub fn checked_side(&self) -> Option<Color> {
        if !self.check {
            return None;
        }

        // Checkmate leaves the side to move on the winner.
        if self.checkmate {
            Some(self.side_to_move.toggle())
        } else {
            Some(self.side_to_move)
        }
    }

    pub fn en_passant_vulnerable(&self) -> Option<PieceId> {
        self.en_passant_vulnerable
    }

    pub fn pending_promotion(&self) -> Option<PieceId> {
        self.pending_promotion
    }

    pub fn captured(&self) -> &[PieceId] {
        &self.captured
    }

    pub fn piece(&self, id: PieceId) -> &Piece {
        self.board.get(id)
    }

    pub fn id_at(&self, coord: Coordinate) -> Option<PieceId> {
        self.board.piece(coord).ok().flatten()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.occupant_at(square.to_coordinate()).copied()
    }

    /// Every on-board piece of the given color.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (PieceId, Coordinate, &Piece)> + '_ {
        self.board
            .occupants()
            .filter(move |(_, _, piece)| piece.color == color)
    }

    pub fn king(&self, color: Color) -> Option<Coordinate> {
        self.pieces(color)
            .find(|(_, _, piece)| piece.kind == PieceKind::King)
            .map(|(_, coord, _)| coord)
    }

    /// Pseudo-legal destinations of the given piece.
    pub fn possible_moves(&self, id: PieceId) -> MoveGrid {
        movegen::generate_moves(self, id)
    }
}

impl Position {
    /// Creates a position with an empty 8x8 board and White to move.
    pub fn new() -> Position {
        Position {
            board: Board::new(BOARD_SIZE, BOARD_SIZE).expect("8x8 is a valid board"),
            captured: Vec::new(),
            side_to_move: Color::White,
            turn: 1,
            check: false,
            checkmate: false,
            en_passant_vulnerable: None,
            pending_promotion: None,
        }
    }

    /// Creates the standard starting position.
    pub fn from_start_position() -> Position {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut pos = Position::new();
        let rows = pos.board.rows();
        for color in core::colors() {
            for (column, &kind) in BACK_RANK.iter().enumerate() {
                pos.add_piece(
                    Coordinate::new(color.back_row(rows), column as u8),
                    Piece::new(kind, color),
                )
                .expect("start position double-add piece?");
                pos.add_piece(
                    Coordinate::new(color.pawn_row(rows), column as u8),
                    Piece::new(PieceKind::Pawn, color),
                )
                .expect("start position double-add piece?");
            }
        }

        pos
    }

    /// Registers a new piece and places it on the given cell.
    pub fn add_piece(&mut self, coord: Coordinate, piece: Piece) -> Result<PieceId, crate::board::BoardError> {
        if self.board.is_occupied(coord) {
            return Err(crate::board::BoardError::OccupiedCell(coord));
        }

        if !self.board.position_exists(coord) {
            return Err(crate::board::BoardError::OutOfBounds(coord));
        }

        let id = self.board.insert(piece);
        self.board.place_piece(id, coord)?;
        Ok(id)
    }
}

//
// Move application, check detection and the checkmate search.
//
// Everything in this block operates on a position the caller owns outright. Callers that need to test a move without
// committing it clone the position first; see `speculate`.
//

impl Position {
    /// Applies a move whose pseudo-legality has already been established: captures whatever stands on the target (or,
    /// for en-passant, beside the source), moves the piece, relocates the rook of a castle and bumps move counters.
    ///
    /// Turn state (side to move, check flags, en-passant marker) is left untouched.
    pub fn apply_move(&mut self, source: Coordinate, target: Coordinate) -> AppliedMove {
        let id = self
            .board
            .remove_piece(source)
            .expect("invalid move: source off the board")
            .expect("invalid move: no piece at source square");
        let mut captured = self
            .board
            .remove_piece(target)
            .expect("invalid move: target off the board");
        let mut captured_at = captured.map(|_| target);

        self.board
            .place_piece(id, target)
            .expect("invalid move: piece at target square");
        let piece = {
            let piece = self.board.get_mut(id);
            piece.move_count += 1;
            *piece
        };

        let mut castle = None;
        if piece.kind == PieceKind::King {
            let span = target.column as i16 - source.column as i16;
            if span.abs() == 2 {
                // Castles are encoded as a two-cell king move; the rook is found three columns to the short side or
                // four to the long side, and lands on the cell the king passed over.
                let (rook_offset, landing_offset) = if span > 0 { (3, 1) } else { (-4, -1) };
                let rook_source = source
                    .offset(0, rook_offset)
                    .expect("invalid move: castle without rook");
                let rook_target = source
                    .offset(0, landing_offset)
                    .expect("invalid move: castle without rook");
                let rook = self
                    .board
                    .remove_piece(rook_source)
                    .expect("invalid move: castle rook off the board")
                    .expect("invalid move: castle without rook");
                self.board
                    .place_piece(rook, rook_target)
                    .expect("invalid move: piece at rook target square");
                self.board.get_mut(rook).move_count += 1;
                castle = Some((rook_source, rook_target));
            }
        }

        if piece.kind == PieceKind::Pawn && source.column != target.column && captured.is_none() {
            // A diagonal pawn move onto an empty cell is an en-passant capture. The captured pawn stands beside the
            // source, not on the target.
            let beside = Coordinate::new(source.row, target.column);
            captured = self
                .board
                .remove_piece(beside)
                .expect("invalid move: en-passant victim off the board");
            captured_at = captured.map(|_| beside);
        }

        if let Some(victim) = captured {
            self.captured.push(victim);
        }

        let double_step = piece.kind == PieceKind::Pawn
            && (target.row as i16 - source.row as i16).abs() == 2;

        AppliedMove {
            piece: id,
            source,
            target,
            captured,
            captured_at,
            castle,
            double_step,
        }
    }

    /// Clones this position and applies the given move to the clone.
    pub fn speculate(&self, source: Coordinate, target: Coordinate) -> (Position, AppliedMove) {
        let mut next = self.clone();
        let applied = next.apply_move(source, target);
        (next, applied)
    }

    /// Returns true if any on-board piece of `attacker` has the given cell among its pseudo-legal destinations.
    pub fn is_attacked_by(&self, attacker: Color, target: Coordinate) -> bool {
        self.pieces(attacker)
            .any(|(id, _, _)| self.possible_moves(id).contains(target))
    }

    /// Returns true if the king of the given color is attacked. Panics if that color has no king, which would mean
    /// the position was corrupted.
    pub fn is_check(&self, us: Color) -> bool {
        let king = self
            .king(us)
            .unwrap_or_else(|| panic!("no {} king on the board", us));
        self.is_attacked_by(us.toggle(), king)
    }

    /// Legality test for a move that is already known to be pseudo-legal: the move is legal iff applying it does not
    /// leave the mover's king attacked.
    pub fn is_legal_given_pseudolegal(&self, source: Coordinate, target: Coordinate) -> bool {
        let us = match self.board.occupant_at(source) {
            Some(piece) => piece.color,
            None => return false,
        };

        let (next, _) = self.speculate(source, target);
        !next.is_check(us)
    }

    /// Legal destinations of the given piece: its pseudo-legal destinations minus those that would expose its king.
    pub fn legal_moves(&self, id: PieceId) -> MoveGrid {
        let mut moves = self.possible_moves(id);
        if let Some(source) = self.board.position(id) {
            let candidates: Vec<_> = moves.iter().collect();
            for target in candidates {
                if !self.is_legal_given_pseudolegal(source, target) {
                    moves.remove(target);
                }
            }
        }

        moves
    }

    /// Returns true if any piece of the given color has a move that leaves its king unattacked. This is an exhaustive
    /// search over every pseudo-legal move of every piece, each tried on a discarded clone.
    pub fn has_legal_move(&self, us: Color) -> bool {
        self.pieces(us).any(|(id, source, _)| {
            self.possible_moves(id)
                .iter()
                .any(|target| self.is_legal_given_pseudolegal(source, target))
        })
    }

    /// Returns true if the given color is in check and no move of theirs escapes it.
    pub fn is_checkmate(&self, us: Color) -> bool {
        self.is_check(us) && !self.has_legal_move(us)
    }

    /// Replaces the given piece with a freshly created piece of another kind on the same cell. The old piece is retired:
    /// it is neither on the board nor among the captured pieces. Returns None, changing nothing, if `kind` is not a
    /// piece a pawn may be promoted to.
    pub fn promote(&mut self, id: PieceId, kind: PieceKind) -> Option<PieceId> {
        if !kind.is_promotion_target() {
            return None;
        }

        let coord = self.board.position(id)?;
        let old = *self.board.get(id);
        self.board
            .remove_piece(coord)
            .expect("promoted piece off the board");
        let replacement = self.board.insert(Piece {
            kind,
            color: old.color,
            move_count: old.move_count,
        });
        self.board
            .place_piece(replacement, coord)
            .expect("promotion cell was just vacated");
        if self.pending_promotion == Some(id) {
            self.pending_promotion = Some(replacement);
        }

        Some(replacement)
    }

    pub(crate) fn set_pending_promotion(&mut self, id: Option<PieceId>) {
        self.pending_promotion = id;
    }

    /// Finishes a move made by `mover`: records the en-passant marker, derives the opponent's check and checkmate
    /// flags and, unless the game is over, hands the turn to the opponent.
    pub(crate) fn conclude(&mut self, mover: Color, applied: &AppliedMove) {
        self.en_passant_vulnerable = if applied.double_step {
            Some(applied.piece)
        } else {
            None
        };

        self.conclude_turn(mover);
    }

    /// The part of `conclude` that does not depend on the move itself.
    pub(crate) fn conclude_turn(&mut self, mover: Color) {
        let opponent = mover.toggle();
        self.side_to_move = opponent;
        self.check = self.is_check(opponent);
        self.checkmate = self.check && !self.has_legal_move(opponent);
        if self.checkmate {
            self.side_to_move = mover;
        } else {
            self.turn += 1;
        }
    }

    /// Undoes the turn hand-off performed by `conclude`, so that the last move can be concluded again after its
    /// promoted piece has been swapped.
    pub(crate) fn reopen(&mut self, mover: Color) {
        if !self.checkmate {
            self.turn -= 1;
        }

        self.side_to_move = mover;
        self.check = false;
        self.checkmate = false;
    }
}

/// Checks the invariants a position must satisfy before the engine can operate on it.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error(transparent)]
    Board(#[from] crate::board::BoardError),
    #[error("board must be 8x8, got {0}x{1}")]
    NotChessBoard(u8, u8),
    #[error("expected exactly one {0} king, found {1}")]
    KingCount(Color, usize),
    #[error("piece {0} is both on the board and captured")]
    CapturedOnBoard(PieceId),
    #[error("piece {0} is captured twice")]
    CapturedTwice(PieceId),
    #[error("piece {0} is not on the board")]
    NotOnBoard(PieceId),
    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),
    #[error("en-passant piece {0} is not a pawn")]
    EnPassantNotPawn(PieceId),
    #[error("turn counter must start at 1")]
    InvalidTurn,
    #[error("{0} is in check, but it is not {0}'s turn")]
    OpponentInCheck(Color),
}

impl Position {
    pub fn validate(&self) -> Result<(), PositionError> {
        self.board.validate()?;
        if self.board.rows() != BOARD_SIZE || self.board.columns() != BOARD_SIZE {
            return Err(PositionError::NotChessBoard(
                self.board.rows(),
                self.board.columns(),
            ));
        }

        for color in core::colors() {
            let kings = self
                .pieces(color)
                .filter(|(_, _, piece)| piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(PositionError::KingCount(color, kings));
            }
        }

        let mut seen = vec![false; self.board.arena_len()];
        for &id in &self.captured {
            let flag = seen
                .get_mut(id.as_usize())
                .ok_or(PositionError::UnknownPiece(id))?;
            if *flag {
                return Err(PositionError::CapturedTwice(id));
            }

            *flag = true;
            if self.board.position(id).is_some() {
                return Err(PositionError::CapturedOnBoard(id));
            }
        }

        for id in self.pending_promotion.iter().chain(&self.en_passant_vulnerable) {
            if id.as_usize() >= self.board.arena_len() {
                return Err(PositionError::UnknownPiece(*id));
            }

            if self.board.position(*id).is_none() {
                return Err(PositionError::NotOnBoard(*id));
            }
        }

        if let Some(id) = self.en_passant_vulnerable {
            if self.board.get(id).kind != PieceKind::Pawn {
                return Err(PositionError::EnPassantNotPawn(id));
            }
        }

        if self.turn == 0 {
            return Err(PositionError::InvalidTurn);
        }

        // Outside of checkmate, the side that just moved can't have left its king attacked.
        let waiting = self.side_to_move.toggle();
        if !self.checkmate && self.is_check(waiting) {
            return Err(PositionError::OpponentInCheck(waiting));
        }

        Ok(())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::from_start_position()
    }
}

//
// FEN parsing and generation.
//
// FEN does not record move counters, so they are inferred: pawns off their start rank and kings or rooks whose castle
// right is absent are treated as having moved once. The en-passant square designates the pawn standing in front of
// it as the one vulnerable to en-passant capture.
//

/// Possible errors that can arise when parsing a FEN string into a `Position`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("unexpected EOF while reading")]
    UnexpectedEnd,
    #[error("invalid digit")]
    InvalidDigit,
    #[error("file does not sum to 8")]
    FileDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error("invalid castle")]
    InvalidCastle,
    #[error("invalid en-passant")]
    InvalidEnPassant,
    #[error("invalid halfmove")]
    InvalidHalfmove,
    #[error("invalid fullmove")]
    InvalidFullmove,
    #[error("expected exactly one {0} king, found {1}")]
    KingCount(Color, usize),
    #[error("{0} is in check, but it is not {0}'s turn")]
    OpponentInCheck(Color),
}

#[derive(Default)]
struct CastleRights {
    white_kingside: bool,
    white_queenside: bool,
    black_kingside: bool,
    black_queenside: bool,
}

impl CastleRights {
    fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }
}

fn king_start(color: Color) -> Square {
    match color {
        Color::White => E1,
        Color::Black => E8,
    }
}

fn kingside_rook(color: Color) -> Square {
    match color {
        Color::White => H1,
        Color::Black => H8,
    }
}

fn queenside_rook(color: Color) -> Square {
    match color {
        Color::White => A1,
        Color::Black => A8,
    }
}

impl Position {
    /// Constructs a new position from a FEN representation of a board position.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Position, FenParseError> {
        let mut fields = fen.as_ref().split_whitespace();
        let mut next_field = || fields.next().ok_or(FenParseError::UnexpectedEnd);

        let mut pos = Position::new();
        let placement = next_field()?;
        let mut rows = placement.split('/');
        for row in 0..BOARD_SIZE {
            let text = rows.next().ok_or(FenParseError::UnexpectedEnd)?;
            let mut column = 0u8;
            for c in text.chars() {
                // digits 1 through 8 indicate empty squares.
                if let Some(value) = c.to_digit(10) {
                    if !(1..=8).contains(&value) {
                        return Err(FenParseError::InvalidDigit);
                    }

                    column += value as u8;
                    if column > BOARD_SIZE {
                        return Err(FenParseError::FileDoesNotSumToEight);
                    }

                    continue;
                }

                // if it's not a digit, it represents a piece.
                let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                if column >= BOARD_SIZE {
                    return Err(FenParseError::FileDoesNotSumToEight);
                }

                pos.add_piece(Coordinate::new(row, column), piece)
                    .expect("FEN double-add piece?");
                column += 1;
            }

            if column != BOARD_SIZE {
                return Err(FenParseError::FileDoesNotSumToEight);
            }
        }

        if let Some(extra) = rows.next() {
            return Err(FenParseError::UnexpectedChar(
                extra.chars().next().unwrap_or('/'),
            ));
        }

        let side = match next_field()? {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(FenParseError::InvalidSideToMove),
        };

        let mut rights = CastleRights::default();
        let castle = next_field()?;
        if castle != "-" {
            for c in castle.chars() {
                match c {
                    'K' => rights.white_kingside = true,
                    'Q' => rights.white_queenside = true,
                    'k' => rights.black_kingside = true,
                    'q' => rights.black_queenside = true,
                    _ => return Err(FenParseError::InvalidCastle),
                }
            }
        }

        let en_passant = match next_field()? {
            "-" => None,
            text => Some(
                text.parse::<Square>()
                    .map_err(|_| FenParseError::InvalidEnPassant)?,
            ),
        };

        next_field()?
            .parse::<u16>()
            .map_err(|_| FenParseError::InvalidHalfmove)?;
        let fullmove = next_field()?
            .parse::<u16>()
            .map_err(|_| FenParseError::InvalidFullmove)?;

        for color in core::colors() {
            let kings = pos
                .pieces(color)
                .filter(|(_, _, piece)| piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(FenParseError::KingCount(color, kings));
            }
        }

        pos.infer_move_counts(&rights);
        pos.side_to_move = side;
        pos.turn = (fullmove.max(1) as u32 - 1) * 2 + 1 + (side == Color::Black) as u32;
        if let Some(square) = en_passant {
            pos.en_passant_vulnerable = Some(pos.en_passant_victim(square, side)?);
        }

        if pos.is_check(side.toggle()) {
            return Err(FenParseError::OpponentInCheck(side.toggle()));
        }

        pos.check = pos.is_check(side);
        pos.checkmate = pos.check && !pos.has_legal_move(side);
        if pos.checkmate {
            pos.side_to_move = side.toggle();
            pos.turn = pos.turn.saturating_sub(1).max(1);
        }

        Ok(pos)
    }

    fn infer_move_counts(&mut self, rights: &CastleRights) {
        let rows = self.board.rows();
        let placed: Vec<_> = self
            .board
            .occupants()
            .map(|(id, coord, piece)| (id, coord, *piece))
            .collect();
        for (id, coord, piece) in placed {
            let color = piece.color;
            let at = |square: Square| coord == square.to_coordinate();
            let unmoved = match piece.kind {
                PieceKind::Pawn => coord.row == color.pawn_row(rows),
                PieceKind::King => {
                    at(king_start(color)) && (rights.kingside(color) || rights.queenside(color))
                }
                PieceKind::Rook => {
                    (at(kingside_rook(color)) && rights.kingside(color))
                        || (at(queenside_rook(color)) && rights.queenside(color))
                }
                _ => true,
            };

            if !unmoved {
                self.board.get_mut(id).move_count = 1;
            }
        }
    }

    /// Finds the pawn that a FEN en-passant square refers to: the opponent pawn directly in front of it from the
    /// capturing side's point of view.
    fn en_passant_victim(&self, square: Square, side: Color) -> Result<PieceId, FenParseError> {
        let victim_color = side.toggle();
        let coord = square
            .to_coordinate()
            .offset(victim_color.forward(), 0)
            .ok_or(FenParseError::InvalidEnPassant)?;
        let id = self.id_at(coord).ok_or(FenParseError::InvalidEnPassant)?;
        let piece = self.board.get(id);
        if piece.kind != PieceKind::Pawn || piece.color != victim_color {
            return Err(FenParseError::InvalidEnPassant);
        }

        Ok(id)
    }

    fn can_castle(&self, color: Color, rook_square: Square) -> bool {
        let unmoved = |square: Square, kind: PieceKind| {
            self.board
                .occupant_at(square.to_coordinate())
                .map_or(false, |piece| {
                    piece.kind == kind && piece.color == color && !piece.has_moved()
                })
        };

        unmoved(king_start(color), PieceKind::King) && unmoved(rook_square, PieceKind::Rook)
    }

    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for row in 0..self.board.rows() {
            let mut empty_squares = 0;
            for column in 0..self.board.columns() {
                if let Some(piece) = self.board.occupant_at(Coordinate::new(row, column)) {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
            }

            if row + 1 != self.board.rows() {
                buf.push('/');
            }
        }

        // A mated position is written with the mated side to move, as FEN expects.
        let (side, turn) = if self.checkmate {
            (self.side_to_move.toggle(), self.turn + 1)
        } else {
            (self.side_to_move, self.turn)
        };

        buf.push(' ');
        match side {
            Color::White => buf.push('w'),
            Color::Black => buf.push('b'),
        }

        buf.push(' ');
        let castles = [
            ('K', Color::White, kingside_rook(Color::White)),
            ('Q', Color::White, queenside_rook(Color::White)),
            ('k', Color::Black, kingside_rook(Color::Black)),
            ('q', Color::Black, queenside_rook(Color::Black)),
        ];
        let mut any_castle = false;
        for (c, color, rook) in castles {
            if self.can_castle(color, rook) {
                buf.push(c);
                any_castle = true;
            }
        }

        if !any_castle {
            buf.push('-');
        }

        buf.push(' ');
        let ep_square = self.en_passant_vulnerable.and_then(|id| {
            let coord = self.board.position(id)?;
            let behind = coord.offset(-self.board.get(id).color.forward(), 0)?;
            Square::from_coordinate(behind).ok()
        });
        if let Some(ep_square) = ep_square {
            write!(&mut buf, "{}", ep_square).unwrap();
        } else {
            buf.push('-');
        }

        write!(&mut buf, " 0 {}", (turn - 1) / 2 + 1).unwrap();
        buf
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rows = self.board.rows();
        for row in 0..rows {
            for column in 0..self.board.columns() {
                if let Some(piece) = self.board.occupant_at(Coordinate::new(row, column)) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", rows - row)?;
        }

        for _ in 0..self.board.columns() {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for column in 0..self.board.columns() {
            write!(f, " {} ", (b'a' + column) as char)?;
        }

        writeln!(f)?;
        Ok(())
    }
}
