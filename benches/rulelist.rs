//! Matching benchmarks
//!
//! 1. Primitives - literal, unicode literal, range
//! 2. Combinators - alternation, concatenation, repetition
//! 3. Rule lists - the ABNF definition grammar matched against the bundled
//!    grammar files, with and without the node cache
//!
//! Run with: cargo bench --bench rulelist

use abnf_engine::prelude::*;
use abnf_engine::rules::definition;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

const CORE_GRAMMAR: &[u8] = include_bytes!("../grammars/core.abnf");
const ABNF_GRAMMAR: &[u8] = include_bytes!("../grammars/abnf.abnf");

// ============================================================================
// Primitives
// ============================================================================

fn bench_primitives(c: &mut Criterion) {
    let mut group = c.benchmark_group("primitives");
    let engine = Engine::new();

    let op = literal("z", b"z");
    group.bench_function("literal", |b| {
        b.iter(|| engine.parse(&op, black_box(b"zzz")))
    });

    let op = literal("м", "м".as_bytes());
    group.bench_function("literal_unicode", |b| {
        b.iter(|| engine.parse(&op, black_box("мир".as_bytes())))
    });

    let op = literal_cs("Z", b"Z");
    group.bench_function("literal_cs", |b| {
        b.iter(|| engine.parse(&op, black_box(b"ZZZ")))
    });

    let op = range("%x61-7A", b"a", b"z");
    group.bench_function("range", |b| {
        b.iter(|| engine.parse(&op, black_box(b"zzz")))
    });

    group.finish();
}

// ============================================================================
// Combinators
// ============================================================================

fn bench_combinators(c: &mut Criterion) {
    let mut group = c.benchmark_group("combinators");
    let engine = Engine::new();

    let op = alt(
        "\"a\" / \"b\" / \"c\"",
        vec![literal("a", b"a"), literal("b", b"b"), literal("c", b"c")],
    );
    let inputs: [&[u8]; 3] = [b"a", b"b", b"c"];
    for input in inputs {
        group.bench_with_input(
            BenchmarkId::new("alt", String::from_utf8_lossy(input)),
            input,
            |b, _| b.iter(|| engine.parse(&op, black_box(input))),
        );
    }

    let op = concat(
        "\"ab\" \"c\"",
        vec![literal("ab", b"ab"), literal("c", b"c")],
    );
    group.bench_function("concat", |b| {
        b.iter(|| engine.parse(&op, black_box(b"abc")))
    });

    let op = repeat_0_inf("*\"a\"", literal("a", b"a"));
    let inputs: [&[u8]; 3] = [b"", b"a", b"aaa"];
    for input in inputs {
        group.bench_with_input(
            BenchmarkId::new("repeat_0_inf", input.len()),
            input,
            |b, _| b.iter(|| engine.parse(&op, black_box(input))),
        );
    }

    group.finish();
}

// ============================================================================
// Rule Lists
// ============================================================================

fn bench_rulelist(c: &mut Criterion) {
    let mut group = c.benchmark_group("rulelist");
    let rulelist = &definition::rules().rulelist;

    for (name, input) in [("core", CORE_GRAMMAR), ("abnf", ABNF_GRAMMAR)] {
        group.throughput(Throughput::Bytes(input.len() as u64));

        let plain = Engine::new();
        group.bench_with_input(BenchmarkId::new("uncached", name), input, |b, _| {
            b.iter(|| plain.parse_best(rulelist, black_box(input)))
        });

        let cached = Engine::new();
        cached.enable_cache(1 << 14);
        group.bench_with_input(BenchmarkId::new("cached", name), input, |b, _| {
            b.iter(|| cached.parse_best(rulelist, black_box(input)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_primitives, bench_combinators, bench_rulelist);
criterion_main!(benches);
