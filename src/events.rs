// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Discrete records of what happened during a match. The engine produces them as part of every committed move; what
//! happens to them afterwards is up to an [`EventSink`].

use std::{io::Write, time::SystemTime};

use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Color, PieceKind, Square};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub timestamp: SystemTime,
    /// Identifies the match when several share one sink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_id: Option<u64>,
    pub kind: MatchEventKind,
}

impl MatchEvent {
    pub fn now<T: Into<MatchEventKind>>(kind: T) -> MatchEvent {
        MatchEvent {
            timestamp: SystemTime::now(),
            match_id: None,
            kind: kind.into(),
        }
    }

    pub fn with_match_id(self, match_id: u64) -> MatchEvent {
        MatchEvent {
            match_id: Some(match_id),
            ..self
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, From)]
pub enum MatchEventKind {
    Move(MoveEvent),
    Capture(CaptureEvent),
    Promotion(PromotionEvent),
    Win(WinEvent),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEvent {
    pub player: Color,
    pub piece: PieceKind,
    pub source: Square,
    pub target: Square,
}

/// `player` is the side that made the capture; `piece` is the captured piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureEvent {
    pub player: Color,
    pub piece: PieceKind,
    pub position: Square,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionEvent {
    pub player: Color,
    pub kind: PieceKind,
    pub position: Square,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinEvent {
    pub player: Color,
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to write event: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A destination for match events.
pub trait EventSink {
    fn record(&mut self, event: &MatchEvent) -> Result<(), EventError>;

    fn record_all(&mut self, events: &[MatchEvent]) -> Result<(), EventError> {
        for event in events {
            self.record(event)?;
        }

        Ok(())
    }
}

impl EventSink for Vec<MatchEvent> {
    fn record(&mut self, event: &MatchEvent) -> Result<(), EventError> {
        self.push(event.clone());
        Ok(())
    }
}

/// Writes events as JSON, one per line.
pub struct EventLog<W: Write> {
    writer: W,
}

impl<W: Write> EventLog<W> {
    pub fn new(writer: W) -> EventLog<W> {
        EventLog { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for EventLog<W> {
    fn record(&mut self, event: &MatchEvent) -> Result<(), EventError> {
        serde_json::to_writer(&mut self.writer, event)?;
        writeln!(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
