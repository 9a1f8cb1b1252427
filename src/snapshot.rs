// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Saving and restoring a match in progress.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    game::Match,
    position::{Position, PositionError},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}, expected {}", SNAPSHOT_VERSION)]
    Version(u32),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("inconsistent snapshot: {0}")]
    Inconsistent(#[from] PositionError),
}

/// The complete state of a match: board, every piece with its color and move counter, side to move, check flags,
/// the en-passant marker and any pending promotion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub position: Position,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Snapshot, SnapshotError> {
        Ok(serde_json::from_str(text)?)
    }
}

impl Match {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            position: self.position().clone(),
        }
    }

    pub fn restore(snapshot: Snapshot) -> Result<Match, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }

        snapshot.position.validate()?;
        Ok(Match::from_position(snapshot.position))
    }
}
