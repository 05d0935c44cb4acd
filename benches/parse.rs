// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! Parse and evaluation benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    let simple = "cube(10);";
    group.bench_with_input(BenchmarkId::new("simple_cube", ""), &simple, |b, source| {
        b.iter(|| ascad::parse("bench", black_box(source)).unwrap());
    });

    let complex = r#"
as tower(size, count) {
  for(i, 0, count, 1) {
    translate(0, 0, i) {
      cube(size);
    }
  }
}
subtract {
  tower(20, 10);
  translate(10, 10, 10) {
    sphere(15);
  }
}
"#;
    group.bench_with_input(BenchmarkId::new("complex", ""), &complex, |b, source| {
        b.iter(|| ascad::parse("bench", black_box(source)).unwrap());
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");

    let looped = "for(i, 0, 100, 1) {\n  translate(i, 0, 0) {\n    cube(1);\n  }\n}";
    let syntaxes = ascad::parse("bench", looped).unwrap();
    group.bench_function("loop_100", |b| {
        let evaluator = ascad::Evaluator::new();
        b.iter(|| evaluator.evaluate(black_box(&syntaxes)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_evaluate);
criterion_main!(benches);
