use structopt::StructOpt;

use knightfall::core::Square;
use knightfall::Position;

/// Prints the destinations of a single piece.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Square of the piece to move, e.g. "e2".
    #[structopt(name = "SQUARE")]
    square: Square,

    /// Leave out moves that would expose the mover's king.
    #[structopt(long)]
    legal: bool,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();
    let pos = Position::from_fen(&ops.fen)?;
    let id = pos
        .id_at(ops.square.to_coordinate())
        .ok_or_else(|| anyhow::anyhow!("there is no piece on {}", ops.square))?;
    let moves = if ops.legal {
        pos.legal_moves(id)
    } else {
        pos.possible_moves(id)
    };

    println!("{}", pos);
    println!("{}", moves);
    for coord in &moves {
        println!("{}", Square::from_coordinate(coord)?);
    }

    Ok(())
}
