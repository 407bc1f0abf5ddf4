//! Benchmarks for feature building and crop ranking
//!
//! Run with: cargo bench --package pipeline

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use crop_model::parse_classifier;
use pipeline::{CropRanker, FeatureBuilder};
use serde_json::json;
use soil_data::FEATURE_COLUMNS;

/// 22-class Gaussian naive Bayes, the size of a typical crop dataset model
fn load_ranker() -> CropRanker {
    let n_classes = 22;
    let classes: Vec<String> = (0..n_classes).map(|i| format!("crop{}", i)).collect();
    let theta: Vec<Vec<f64>> = (0..n_classes)
        .map(|i| {
            let i = i as f64;
            vec![10.0 + 5.0 * i, 20.0 + 3.0 * i, 15.0 + 4.0 * i, 25.0, 70.0, 6.5, 100.0 + 20.0 * i]
        })
        .collect();

    let artifact = json!({
        "feature_names": FEATURE_COLUMNS,
        "classes": classes,
        "model": {
            "kind": "gaussian_nb",
            "class_prior": vec![1.0 / n_classes as f64; n_classes],
            "theta": theta,
            "var": vec![vec![100.0, 50.0, 40.0, 9.0, 100.0, 0.5, 2500.0]; n_classes],
        }
    });

    let load = parse_classifier(&artifact.to_string(), &FEATURE_COLUMNS)
        .expect("Failed to parse benchmark artifact");
    CropRanker::from_load(&load)
}

fn bench_build_features(c: &mut Criterion) {
    let builder = FeatureBuilder::default();
    let raw = json!({ "n": "90", "p": 40, "k": 40, "ph": 6.5, "location": "Nashik" });

    c.bench_function("feature_builder_build", |b| {
        b.iter(|| {
            let features = builder.build(black_box(&raw)).unwrap();
            black_box(features)
        })
    });
}

fn bench_rank_classifier(c: &mut Criterion) {
    let ranker = load_ranker();
    let features = FeatureBuilder::default()
        .build(&json!({ "n": 90, "p": 40, "k": 40, "ph": 6.5 }))
        .unwrap();

    c.bench_function("crop_ranker_rank", |b| {
        b.iter(|| {
            let ranking = ranker.rank(black_box(&features));
            black_box(ranking)
        })
    });
}

criterion_group!(benches, bench_build_features, bench_rank_classifier);
criterion_main!(benches);
