// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use knightfall::core::{self, Color};
use knightfall::Position;

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("quiet-move-speculate", |b| {
        let pos = Position::from_fen("4k3/8/4b3/8/2B5/8/8/4K3 w - - 0 1").unwrap();
        b.iter(|| {
            black_box(&pos).speculate(core::C4.to_coordinate(), core::D5.to_coordinate());
        });
    });

    c.bench_function("kiwipete-legal-moves", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
        )
        .unwrap();
        b.iter(|| {
            let pos = black_box(&pos);
            for (id, _, _) in pos.pieces(Color::Black) {
                black_box(pos.legal_moves(id));
            }
        });
    });

    c.bench_function("kiwipete-has-legal-move", |b| {
        let pos = Position::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
        )
        .unwrap();
        b.iter(|| black_box(&pos).has_legal_move(black_box(Color::Black)));
    });

    c.bench_function("back-rank-checkmate", |b| {
        let pos = Position::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
        b.iter(|| black_box(&pos).is_checkmate(black_box(Color::Black)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
