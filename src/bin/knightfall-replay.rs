// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter},
    path::PathBuf,
};

use anyhow::Context;
use knightfall::{
    core::{PieceKind, Square},
    events::{EventLog, EventSink},
    game::{self, Match},
    snapshot::Snapshot,
};
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

/// Replays a list of moves, one per line ("e2 e4", or "a7 a8 n" to promote), and prints the resulting position.
#[derive(Debug, StructOpt)]
struct Options {
    /// File of moves to replay.
    #[structopt(name = "MOVES_FILE")]
    moves: PathBuf,

    /// Start from a saved match instead of the starting position.
    #[structopt(long)]
    snapshot: Option<PathBuf>,

    /// Save the match here once all moves are replayed.
    #[structopt(long)]
    save: Option<PathBuf>,

    /// Write match events here as JSON lines.
    #[structopt(long)]
    event_log: Option<PathBuf>,

    /// Tag every logged event with this match id.
    #[structopt(long)]
    match_id: Option<u64>,

    /// Continue with this many random legal moves after the replay.
    #[structopt(long, default_value = "0")]
    random_plies: u32,

    /// Seed for the random continuation.
    #[structopt(long, default_value = "0")]
    seed: u64,
}

fn parse_line(line: &str) -> anyhow::Result<Option<(Square, Square, Option<PieceKind>)>> {
    let mut words = line.split_whitespace();
    let source = match words.next() {
        Some(word) if !word.starts_with('#') => word.parse::<Square>()?,
        _ => return Ok(None),
    };

    let target = words
        .next()
        .with_context(|| format!("missing target square in {:?}", line))?
        .parse::<Square>()?;
    let promotion = match words.next() {
        Some(word) => {
            let c = word.chars().next().unwrap_or(' ');
            Some(PieceKind::try_from(c).map_err(|_| anyhow::anyhow!("unknown piece {:?}", word))?)
        }
        None => None,
    };

    Ok(Some((source, target, promotion)))
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::INFO)
        .with_env_filter(EnvFilter::from_env("KNIGHTFALL_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Options::from_args();
    let mut game = match &args.snapshot {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            Match::restore(Snapshot::from_json(&text)?)?
        }
        None => Match::new(),
    };

    let mut sink: Option<Box<dyn EventSink>> = match &args.event_log {
        Some(path) => Some(Box::new(EventLog::new(BufWriter::new(File::create(path)?)))),
        None => None,
    };

    let reader = BufReader::new(File::open(&args.moves)?);
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let (source, target, promotion) = match parse_line(&line)? {
            Some(mov) => mov,
            None => continue,
        };

        let outcome = game
            .perform_move(source, target, promotion)
            .with_context(|| format!("line {}: {} {}", number + 1, source, target))?;
        if let Some(sink) = sink.as_mut() {
            sink.record_all(&game::timestamped(&outcome.events, args.match_id))?;
        }
    }

    let mut rng = SmallRng::seed_from_u64(args.seed);
    for _ in 0..args.random_plies {
        if game.checkmate() {
            break;
        }

        let pos = game.position();
        let mut moves = Vec::new();
        for (id, coord, _) in pos.pieces(pos.side_to_move()) {
            for target in pos.legal_moves(id).iter() {
                moves.push((Square::from_coordinate(coord)?, Square::from_coordinate(target)?));
            }
        }

        let &(source, target) = match moves.choose(&mut rng) {
            Some(mov) => mov,
            None => break,
        };

        let outcome = game.perform_move(source, target, None)?;
        println!("{} {}", source, target);
        if let Some(sink) = sink.as_mut() {
            sink.record_all(&game::timestamped(&outcome.events, args.match_id))?;
        }
    }

    println!("{}", game.position());
    println!("{}", game.position().as_fen());
    if let Some(winner) = game.winner() {
        println!("checkmate, {} wins", winner);
    } else if game.check() {
        println!("{} is in check", game.current_player());
    }

    if let Some(path) = &args.save {
        fs::write(path, game.snapshot().to_json()?)?;
    }

    Ok(())
}
