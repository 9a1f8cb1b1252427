// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A raw, zero-based cell on a board grid. Row 0 is the top of the board.
///
/// Coordinates carry no bounds of their own; whether one is valid depends on the board it is used with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub row: u8,
    pub column: u8,
}

impl Coordinate {
    pub const fn new(row: u8, column: u8) -> Coordinate {
        Coordinate { row, column }
    }

    /// Returns the coordinate displaced by the given row and column deltas, or None if it would have a negative
    /// component (or overflow).
    pub fn offset(self, rows: i8, columns: i8) -> Option<Coordinate> {
        let row = self.row as i16 + rows as i16;
        let column = self.column as i16 + columns as i16;
        if !(0..=u8::MAX as i16).contains(&row) || !(0..=u8::MAX as i16).contains(&column) {
            return None;
        }

        Some(Coordinate::new(row as u8, column as u8))
    }

    pub fn towards(self, dir: Direction) -> Option<Coordinate> {
        let (rows, columns) = dir.as_vector();
        self.offset(rows, columns)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// A compass direction on the grid. North points toward row 0.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Returns this direction as a (row, column) delta.
    pub const fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

pub const ORTHOGONAL: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

pub const DIAGONAL: [Direction; 4] = [
    Direction::NorthWest,
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::SouthEast,
];

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];
