//! Benchmarks for scoring and recommendation sweeps.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use tagscope::genre::GenrePairMatrix;
use tagscope::index::CompatibilityIndex;
use tagscope::recommend::recommend;
use tagscope::score::ScoreEngine;
use tagscope::variables::GameVariables;

const PREFIXES: [&str; 6] = ["PROTAGONIST", "ANTAGONIST", "THEME", "EVENTS", "FINALE", "SETTING"];

/// A dense-ish synthetic matrix: `tags` keys, each with edges to about half the others.
fn synthetic_matrix(tags: usize, seed: u64) -> (Vec<String>, Value) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let keys: Vec<String> = (0..tags)
        .map(|i| format!("{}_TAG{i}", PREFIXES[i % PREFIXES.len()]))
        .collect();

    let mut rows = Map::new();
    for a in &keys {
        let mut row = Map::new();
        for b in &keys {
            if a != b && rng.gen_bool(0.5) {
                let score: f64 = rng.gen_range(1.0..5.0);
                row.insert(b.clone(), Value::from(score));
            }
        }
        rows.insert(a.clone(), Value::Object(row));
    }
    (keys, Value::Object(rows))
}

fn bench_build(c: &mut Criterion) {
    let (_, raw) = synthetic_matrix(200, 7);
    c.bench_function("build_index_200", |bench| {
        bench.iter(|| black_box(CompatibilityIndex::build(&raw)))
    });
}

fn bench_score(c: &mut Criterion) {
    let (keys, raw) = synthetic_matrix(200, 7);
    let index = CompatibilityIndex::build(&raw);
    let genres = GenrePairMatrix::new();
    let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
    let selection: Vec<&str> = keys.iter().take(8).map(String::as_str).collect();

    c.bench_function("score_8_tags", |bench| {
        bench.iter(|| black_box(engine.score(&selection)))
    });
}

fn bench_recommend(c: &mut Criterion) {
    let (keys, raw) = synthetic_matrix(200, 7);
    let index = CompatibilityIndex::build(&raw);
    let genres = GenrePairMatrix::new();
    let engine = ScoreEngine::new(&index, &genres, GameVariables::default());
    let selection: Vec<&str> = keys.iter().take(6).map(String::as_str).collect();
    let pool = index.tags();

    c.bench_function("recommend_6_over_200", |bench| {
        bench.iter(|| black_box(recommend(&engine, &selection, &pool)))
    });
}

criterion_group!(benches, bench_build, bench_score, bench_recommend);
criterion_main!(benches);
