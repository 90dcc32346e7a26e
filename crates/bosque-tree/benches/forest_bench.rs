//! Criterion benchmarks for bosque-tree: induction, ensemble training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use bosque_tree::{CrossValidation, Dataset, DecisionTreeConfig, RandomForestConfig};

fn make_classification(n_rows: usize, n_numeric: usize, n_classes: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let levels = ["a", "b", "c", "d"];
    let mut records = Vec::with_capacity(n_rows);
    for i in 0..n_rows {
        let class = i % n_classes;
        let mut row: Vec<String> = (0..n_numeric)
            .map(|f| {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                (base + rng.r#gen::<f64>() * 0.5).to_string()
            })
            .collect();
        row.push(levels[rng.gen_range(0..levels.len())].to_string());
        row.push(format!("c{class}"));
        records.push(row);
    }
    let mut header: Vec<String> = (0..n_numeric).map(|f| format!("f{f}")).collect();
    header.push("level".to_string());
    header.push("class".to_string());
    Dataset::from_records(header, records, "class").unwrap()
}

fn bench_single_tree(c: &mut Criterion) {
    let ds = make_classification(500, 20, 5, 42);
    let cfg = DecisionTreeConfig::new().with_seed(42);

    c.bench_function("tree_fit_500x21_5class", |b| {
        b.iter(|| cfg.fit(&ds).unwrap());
    });
}

fn bench_forest_train(c: &mut Criterion) {
    let ds = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50).unwrap().with_seed(42);

    c.bench_function("forest_train_500x21_5class_50trees", |b| {
        b.iter(|| cfg.fit(&ds).unwrap());
    });
}

fn bench_forest_predict_batch(c: &mut Criterion) {
    let ds = make_classification(500, 20, 5, 42);
    let forest = RandomForestConfig::new(50).unwrap().with_seed(42).fit(&ds).unwrap();
    let rows: Vec<usize> = (0..ds.n_rows()).collect();

    c.bench_function("forest_predict_batch_500x21_50trees", |b| {
        b.iter(|| forest.predict_batch(&ds, &rows));
    });
}

fn bench_cross_validation(c: &mut Criterion) {
    let ds = make_classification(200, 10, 3, 42);
    let cfg = RandomForestConfig::new(10).unwrap().with_seed(42);
    let cv = CrossValidation::new(10).unwrap();

    c.bench_function("cv_10fold_200x11_10trees", |b| {
        b.iter(|| cv.evaluate(&cfg, &ds).unwrap());
    });
}

criterion_group!(
    benches,
    bench_single_tree,
    bench_forest_train,
    bench_forest_predict_batch,
    bench_cross_validation
);
criterion_main!(benches);
