use criterion::{criterion_group, criterion_main, Criterion};
use plasma::{
    lexer,
    token::{Token, TokenKind},
    util::BreakableIteratorExt,
};
use std::hint::black_box;

static INPUT: &str = include_str!("../data/big.pls");

fn lexer_eager(input: &str) {
    let tokens = lexer::lex(input).unwrap();
    black_box(tokens.len());
}

fn lexer_incremental(input: &str) {
    let mut i = 0;
    for token in lexer::Lexer::new(input).up_to(Token::is_terminal) {
        if matches!(token.kind, TokenKind::Indent | TokenKind::Dedent) {
            continue;
        }
        i += 1;
    }
    black_box(i);
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("eager", |b| b.iter(|| lexer_eager(black_box(INPUT))));
    c.bench_function("incremental", |b| {
        b.iter(|| lexer_incremental(black_box(INPUT)));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
