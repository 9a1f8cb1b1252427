// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `knightfall` chess rules engine.
//!
//! `knightfall` validates and applies moves for a two-player game of chess: per-piece move generation, turn
//! management, check and checkmate detection, castling, en-passant and promotion. Rendering, input handling and
//! storage are left to the caller; the engine hands out plain values describing the board and every move it commits.

pub mod board;
pub mod core;
pub mod events;
pub mod game;
pub mod movegen;
pub mod position;
pub mod snapshot;

pub use game::{Match, MatchError, MoveOutcome};
pub use position::Position;
