// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A rectangular grid of cells, each holding at most one occupant.
//!
//! The board knows nothing about chess. It owns every occupant ever registered with it in an arena indexed by
//! [`PieceId`]; cells store ids rather than occupants, and the board keeps each occupant's recorded position in sync
//! with the cell that holds it. An occupant that is not on any cell (captured, or retired by a promotion) keeps its
//! id and its arena slot for as long as the board lives.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::Coordinate;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("a board needs at least one row and one column, got {0}x{1}")]
    InvalidDimensions(u8, u8),
    #[error("position {0} is not on the board")]
    OutOfBounds(Coordinate),
    #[error("there is already a piece on position {0}")]
    OccupiedCell(Coordinate),
    #[error("piece {0} is already placed on the board")]
    AlreadyPlaced(PieceId),
    #[error("no piece with id {0}")]
    UnknownPiece(PieceId),
    #[error("cell {0} and the piece it holds disagree on its position")]
    Desynchronized(Coordinate),
}

/// A stable handle to an occupant of a [`Board`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u16);

impl PieceId {
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct Slot<T> {
    occupant: T,
    position: Option<Coordinate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board<T> {
    rows: u8,
    columns: u8,
    cells: Vec<Option<PieceId>>,
    arena: Vec<Slot<T>>,
}

impl<T> Board<T> {
    pub fn new(rows: u8, columns: u8) -> Result<Board<T>, BoardError> {
        if rows == 0 || columns == 0 {
            return Err(BoardError::InvalidDimensions(rows, columns));
        }

        Ok(Board {
            rows,
            columns,
            cells: vec![None; rows as usize * columns as usize],
            arena: Vec::new(),
        })
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    pub fn position_exists(&self, coord: Coordinate) -> bool {
        coord.row < self.rows && coord.column < self.columns
    }

    fn index(&self, coord: Coordinate) -> Result<usize, BoardError> {
        if !self.position_exists(coord) {
            return Err(BoardError::OutOfBounds(coord));
        }

        Ok(coord.row as usize * self.columns as usize + coord.column as usize)
    }

    fn slot(&self, id: PieceId) -> Result<&Slot<T>, BoardError> {
        self.arena
            .get(id.as_usize())
            .ok_or(BoardError::UnknownPiece(id))
    }

    /// Returns the id of the occupant of the given cell, if any.
    pub fn piece(&self, coord: Coordinate) -> Result<Option<PieceId>, BoardError> {
        let idx = self.index(coord)?;
        Ok(self.cells[idx])
    }

    /// Returns the occupant of the given cell. Cells off the board are treated as empty.
    pub fn occupant_at(&self, coord: Coordinate) -> Option<&T> {
        match self.piece(coord) {
            Ok(Some(id)) => Some(self.get(id)),
            _ => None,
        }
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        matches!(self.piece(coord), Ok(Some(_)))
    }

    /// Registers a new occupant with this board without placing it anywhere.
    pub fn insert(&mut self, occupant: T) -> PieceId {
        let id = PieceId(self.arena.len() as u16);
        self.arena.push(Slot {
            occupant,
            position: None,
        });
        id
    }

    /// Returns the occupant with the given id. Panics if the id was not issued by this board.
    pub fn get(&self, id: PieceId) -> &T {
        &self.arena[id.as_usize()].occupant
    }

    pub fn get_mut(&mut self, id: PieceId) -> &mut T {
        &mut self.arena[id.as_usize()].occupant
    }

    /// Returns the cell the given occupant stands on, or None if it is off the board.
    pub fn position(&self, id: PieceId) -> Option<Coordinate> {
        self.arena
            .get(id.as_usize())
            .and_then(|slot| slot.position)
    }

    pub fn place_piece(&mut self, id: PieceId, coord: Coordinate) -> Result<(), BoardError> {
        let idx = self.index(coord)?;
        if self.slot(id)?.position.is_some() {
            return Err(BoardError::AlreadyPlaced(id));
        }

        if self.cells[idx].is_some() {
            return Err(BoardError::OccupiedCell(coord));
        }

        self.cells[idx] = Some(id);
        self.arena[id.as_usize()].position = Some(coord);
        Ok(())
    }

    /// Clears the given cell, returning the id of whatever stood there.
    pub fn remove_piece(&mut self, coord: Coordinate) -> Result<Option<PieceId>, BoardError> {
        let idx = self.index(coord)?;
        let removed = self.cells[idx].take();
        if let Some(id) = removed {
            self.arena[id.as_usize()].position = None;
        }

        Ok(removed)
    }

    /// Iterates over every occupant currently on the board, in row-major order of their cells.
    pub fn occupants(&self) -> impl Iterator<Item = (PieceId, Coordinate, &T)> + '_ {
        let columns = self.columns as usize;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(idx, cell)| {
                cell.map(|id| {
                    let coord = Coordinate::new((idx / columns) as u8, (idx % columns) as u8);
                    (id, coord, self.get(id))
                })
            })
    }

    /// Number of occupants ever registered, placed or not.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    /// Checks that every cell and every arena slot agree on where each occupant stands.
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(BoardError::InvalidDimensions(self.rows, self.columns));
        }

        if self.cells.len() != self.rows as usize * self.columns as usize {
            return Err(BoardError::InvalidDimensions(self.rows, self.columns));
        }

        let columns = self.columns as usize;
        for (idx, cell) in self.cells.iter().enumerate() {
            let coord = Coordinate::new((idx / columns) as u8, (idx % columns) as u8);
            if let Some(id) = *cell {
                if self.slot(id)?.position != Some(coord) {
                    return Err(BoardError::Desynchronized(coord));
                }
            }
        }

        for (i, slot) in self.arena.iter().enumerate() {
            if let Some(coord) = slot.position {
                if self.piece(coord)? != Some(PieceId(i as u16)) {
                    return Err(BoardError::Desynchronized(coord));
                }
            }
        }

        Ok(())
    }
}
