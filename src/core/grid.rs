// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use super::Coordinate;

/// A boolean grid with the dimensions of a board, marking the cells a piece could move to.
///
/// The API mirrors a set of coordinates: cells are inserted, removed and tested for membership, and iterating a
/// MoveGrid yields the marked coordinates in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveGrid {
    rows: u8,
    columns: u8,
    cells: Vec<bool>,
}

impl MoveGrid {
    /// Creates a new grid with no cells marked.
    pub fn empty(rows: u8, columns: u8) -> MoveGrid {
        MoveGrid {
            rows,
            columns,
            cells: vec![false; rows as usize * columns as usize],
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn columns(&self) -> u8 {
        self.columns
    }

    fn index(&self, coord: Coordinate) -> Option<usize> {
        if coord.row < self.rows && coord.column < self.columns {
            Some(coord.row as usize * self.columns as usize + coord.column as usize)
        } else {
            None
        }
    }

    /// Tests whether the given cell is marked. Cells outside of the grid are never marked.
    pub fn contains(&self, coord: Coordinate) -> bool {
        self.index(coord).map_or(false, |idx| self.cells[idx])
    }

    /// Marks a cell. Out-of-bounds coordinates are ignored.
    pub fn insert(&mut self, coord: Coordinate) {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = true;
        }
    }

    pub fn remove(&mut self, coord: Coordinate) {
        if let Some(idx) = self.index(coord) {
            self.cells[idx] = false;
        }
    }

    pub fn len(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&cell| cell)
    }

    pub fn iter(&self) -> MoveGridIterator<'_> {
        MoveGridIterator {
            grid: self,
            next: 0,
        }
    }
}

pub struct MoveGridIterator<'a> {
    grid: &'a MoveGrid,
    next: usize,
}

impl<'a> Iterator for MoveGridIterator<'a> {
    type Item = Coordinate;

    fn next(&mut self) -> Option<Coordinate> {
        let columns = self.grid.columns as usize;
        while self.next < self.grid.cells.len() {
            let idx = self.next;
            self.next += 1;
            if self.grid.cells[idx] {
                return Some(Coordinate::new(
                    (idx / columns) as u8,
                    (idx % columns) as u8,
                ));
            }
        }

        None
    }
}

impl<'a> IntoIterator for &'a MoveGrid {
    type Item = Coordinate;
    type IntoIter = MoveGridIterator<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for MoveGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for column in 0..self.columns {
                if self.contains(Coordinate::new(row, column)) {
                    write!(f, " X ")?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f)?;
        }

        Ok(())
    }
}
