use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::fmt::Write;

use pipesheet_eval::Engine;
use pipesheet_parse::parse_document;

/// A document shaped like real input: a copy chain in column A, raw price
/// lists in column B, and a running sum over split prices in column C.
fn sample_document(rows: usize) -> String {
    let mut doc = String::from("!id |!prices |!total\n");
    doc.push_str("=incFrom(1) |10.5,20.25,30.75 |=sum(spread(split(B2, \",\")))\n");
    for row in 3..=rows {
        let _ = writeln!(
            doc,
            "=^^ |{row}.5,{row}.25,0.125 |=C^+sum(spread(split(B{row}, \",\")))"
        );
    }
    doc
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for n in [50usize, 200, 1000] {
        let doc = sample_document(n);
        let grid = parse_document(&doc).unwrap();
        let engine = Engine::default();

        group.bench_with_input(BenchmarkId::new("parse", n), &doc, |b, doc| {
            b.iter(|| parse_document(black_box(doc)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("evaluate", n), &grid, |b, grid| {
            b.iter(|| engine.evaluate(black_box(grid)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("end_to_end", n), &doc, |b, doc| {
            b.iter(|| {
                let grid = parse_document(black_box(doc)).unwrap();
                engine.evaluate(&grid).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
