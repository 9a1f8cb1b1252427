// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pseudo-legal move generation. Every routine here marks the cells a piece could move to according to its movement
//! pattern, without asking whether the move would leave the mover's own king attacked; that question is answered by
//! [`Position`] through speculative application.

use crate::board::{Board, PieceId};
use crate::core::*;
use crate::Position;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Returns true iff the cell holds a piece whose color is not `us`.
pub fn is_there_opponent_piece(board: &Board<Piece>, coord: Coordinate, us: Color) -> bool {
    board
        .occupant_at(coord)
        .map_or(false, |piece| piece.color != us)
}

fn can_land(board: &Board<Piece>, coord: Coordinate, us: Color) -> bool {
    board.position_exists(coord)
        && (!board.is_occupied(coord) || is_there_opponent_piece(board, coord, us))
}

/// Marks every cell along each direction up to and including the first occupied cell, which is only marked if it
/// holds an opponent.
pub fn generate_sliding_moves(
    board: &Board<Piece>,
    from: Coordinate,
    us: Color,
    directions: &[Direction],
    moves: &mut MoveGrid,
) {
    for &dir in directions {
        let mut cursor = from.towards(dir);
        while let Some(cell) = cursor {
            if !board.position_exists(cell) {
                break;
            }

            if board.is_occupied(cell) {
                if is_there_opponent_piece(board, cell, us) {
                    moves.insert(cell);
                }

                break;
            }

            moves.insert(cell);
            cursor = cell.towards(dir);
        }
    }
}

/// Marks each cell at a fixed offset that is empty or holds an opponent.
pub fn generate_stepping_moves(
    board: &Board<Piece>,
    from: Coordinate,
    us: Color,
    offsets: &[(i8, i8)],
    moves: &mut MoveGrid,
) {
    for &(rows, columns) in offsets {
        if let Some(cell) = from.offset(rows, columns) {
            if can_land(board, cell, us) {
                moves.insert(cell);
            }
        }
    }
}

pub fn generate_pawn_moves(pos: &Position, from: Coordinate, pawn: &Piece, moves: &mut MoveGrid) {
    let board = pos.board();
    let us = pawn.color;
    let up = us.forward();
    let is_empty = |cell: Coordinate| board.position_exists(cell) && !board.is_occupied(cell);

    // Single and double pushes. The double push needs both cells clear and an unmoved pawn on its start row.
    if let Some(single) = from.offset(up, 0) {
        if is_empty(single) {
            moves.insert(single);
            let on_start_row = from.row == us.pawn_row(board.rows());
            if on_start_row && !pawn.has_moved() {
                if let Some(double) = single.offset(up, 0) {
                    if is_empty(double) {
                        moves.insert(double);
                    }
                }
            }
        }
    }

    // Ordinary diagonal captures.
    for side in [-1, 1] {
        if let Some(cell) = from.offset(up, side) {
            if board.position_exists(cell) && is_there_opponent_piece(board, cell, us) {
                moves.insert(cell);
            }
        }
    }

    // En-passant: the pawn beside us must be the one that just double-stepped.
    let vulnerable = match pos.en_passant_vulnerable() {
        Some(id) => id,
        None => return,
    };

    if from.row as i16 != en_passant_row(us, board.rows()) {
        return;
    }

    for side in [-1, 1] {
        let beside = match from.offset(0, side) {
            Some(cell) if board.position_exists(cell) => cell,
            _ => continue,
        };

        let holds_vulnerable = matches!(board.piece(beside), Ok(Some(id)) if id == vulnerable);
        if holds_vulnerable && is_there_opponent_piece(board, beside, us) {
            if let Some(behind) = beside.offset(up, 0) {
                moves.insert(behind);
            }
        }
    }
}

/// The row a pawn of the given color must stand on to capture en-passant: three rows ahead of its start row.
fn en_passant_row(us: Color, rows: u8) -> i16 {
    us.pawn_row(rows) as i16 + 3 * us.forward() as i16
}

pub fn generate_king_moves(pos: &Position, from: Coordinate, king: &Piece, moves: &mut MoveGrid) {
    let board = pos.board();
    let mut offsets = [(0, 0); 8];
    for (slot, dir) in offsets.iter_mut().zip(ALL_DIRECTIONS) {
        *slot = dir.as_vector();
    }

    generate_stepping_moves(board, from, king.color, &offsets, moves);
    if king.has_moved() || pos.checked_side() == Some(king.color) {
        return;
    }

    // Only the emptiness of the cells between king and rook is verified here. Whether the king passes through an
    // attacked cell is not checked.
    let castle_rook = |columns: i8| -> bool {
        from.offset(0, columns)
            .and_then(|cell| board.occupant_at(cell))
            .map_or(false, |rook| {
                rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved()
            })
    };
    let clear = |range: &[i8]| -> bool {
        range.iter().all(|&columns| {
            from.offset(0, columns)
                .map_or(false, |cell| board.position_exists(cell) && !board.is_occupied(cell))
        })
    };

    // Short castle, toward the rook three columns away.
    if castle_rook(3) && clear(&[1, 2]) {
        if let Some(target) = from.offset(0, 2) {
            moves.insert(target);
        }
    }

    // Long castle, toward the rook four columns away.
    if castle_rook(-4) && clear(&[-1, -2, -3]) {
        if let Some(target) = from.offset(0, -2) {
            moves.insert(target);
        }
    }
}

/// Generates the pseudo-legal destinations of the piece with the given id. A piece that is not on the board has no
/// destinations.
pub fn generate_moves(pos: &Position, id: PieceId) -> MoveGrid {
    let board = pos.board();
    let mut moves = MoveGrid::empty(board.rows(), board.columns());
    let from = match board.position(id) {
        Some(coord) => coord,
        None => return moves,
    };

    let piece = board.get(id);
    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(pos, from, piece, &mut moves),
        PieceKind::Knight => {
            generate_stepping_moves(board, from, piece.color, &KNIGHT_OFFSETS, &mut moves)
        }
        PieceKind::Bishop => {
            generate_sliding_moves(board, from, piece.color, &DIAGONAL, &mut moves)
        }
        PieceKind::Rook => {
            generate_sliding_moves(board, from, piece.color, &ORTHOGONAL, &mut moves)
        }
        PieceKind::Queen => {
            generate_sliding_moves(board, from, piece.color, &ALL_DIRECTIONS, &mut moves)
        }
        PieceKind::King => generate_king_moves(pos, from, piece, &mut moves),
    }

    moves
}
