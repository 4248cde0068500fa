use criterion::{criterion_group, criterion_main, Criterion};
use plasma::{lexer, parser::parse_program, util::intern::Interner, Options};
use std::hint::black_box;

static INPUT: &str = include_str!("../data/big.pls");

fn parser(input: &str) {
    let tokens = lexer::lex(input).unwrap();
    let program = parse_program(&tokens, &mut Interner::with_capacity(64)).unwrap();
    _ = black_box(program);
}

fn criterion_benchmark(c: &mut Criterion) {
    let options = Options::default();

    c.bench_function("parser", |b| b.iter(|| parser(black_box(INPUT))));
    c.bench_function("compile", |b| {
        b.iter(|| {
            let python = plasma::compile(black_box(INPUT), &options).unwrap();
            black_box(python);
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
