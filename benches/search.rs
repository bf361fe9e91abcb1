use ann_index::kdtree::{
    AnnIndex, KDTree, KDTreeBuilder, PointSet, QueryOptions, ShrinkRule, SplitRule,
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIMENSION: usize = 4;

fn generate_points(n: usize, seed: u64) -> PointSet<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let coords = (0..n * DIMENSION)
        .map(|_| rng.gen_range(-1.0..1.0))
        .collect();
    PointSet::try_new(DIMENSION, coords).unwrap()
}

fn build(
    points: &PointSet<f64>,
    split_rule: SplitRule,
    shrink_rule: Option<ShrinkRule>,
) -> KDTree<f64> {
    let mut builder = KDTreeBuilder::from_point_set(points.clone())
        .bucket_size(8)
        .split_rule(split_rule);
    if let Some(rule) = shrink_rule {
        builder = builder.shrink_rule(rule);
    }
    builder.finish().unwrap()
}

fn construction(c: &mut Criterion) {
    let points = generate_points(20_000, 42);
    let mut group = c.benchmark_group("construction");
    for split_rule in SplitRule::ALL {
        group.bench_with_input(
            BenchmarkId::new("kd", split_rule),
            &split_rule,
            |b, &split_rule| b.iter(|| build(&points, split_rule, None)),
        );
    }
    for shrink_rule in [ShrinkRule::Simple, ShrinkRule::Centroid] {
        group.bench_with_input(
            BenchmarkId::new("bd", shrink_rule),
            &shrink_rule,
            |b, &shrink_rule| {
                b.iter(|| build(&points, SplitRule::SlidingMidpoint, Some(shrink_rule)))
            },
        );
    }
    group.finish();
}

fn queries(c: &mut Criterion) {
    let points = generate_points(20_000, 42);
    let queries = generate_points(100, 7);
    let kd_tree = build(&points, SplitRule::SlidingMidpoint, None);
    let bd_tree = build(&points, SplitRule::SlidingMidpoint, Some(ShrinkRule::Simple));

    let mut group = c.benchmark_group("queries");
    for eps in [0.0, 0.5] {
        let options = QueryOptions::with_eps(eps);
        for (name, tree) in [("kd", &kd_tree), ("bd", &bd_tree)] {
            group.bench_with_input(BenchmarkId::new(format!("search {name}"), eps), &eps, |b, _| {
                b.iter(|| {
                    for query in queries.iter() {
                        tree.search(query, 10, &options).unwrap();
                    }
                })
            });
            group.bench_with_input(
                BenchmarkId::new(format!("priority search {name}"), eps),
                &eps,
                |b, _| {
                    b.iter(|| {
                        for query in queries.iter() {
                            tree.priority_search(query, 10, &options).unwrap();
                        }
                    })
                },
            );
        }
    }

    let options = QueryOptions::default();
    group.bench_function("fixed radius search kd", |b| {
        b.iter(|| {
            for query in queries.iter() {
                kd_tree.fixed_radius_search(query, 0.05, 10, &options).unwrap();
            }
        })
    });
    group.finish();
}

criterion_group!(benches, construction, queries);
criterion_main!(benches);
