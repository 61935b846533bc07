// Build and query benchmarks for the similarity engine
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kindred_core::{Catalog, Engine, ProductRecord};

const ADJECTIVES: &[&str] = &[
    "red", "blue", "green", "wireless", "portable", "ceramic", "cotton", "leather", "steel",
    "wooden", "vintage", "compact",
];
const NOUNS: &[&str] = &[
    "shirt", "speaker", "mug", "lamp", "chair", "headphones", "backpack", "watch", "kettle",
    "jacket", "desk", "blender",
];
const CATEGORIES: &[&str] = &["Apparel", "Electronics", "Kitchen", "Home", "Outdoor"];

fn generate_catalog(size: usize) -> Catalog {
    let records = (0..size)
        .map(|i| {
            let adjective = ADJECTIVES[i % ADJECTIVES.len()];
            let noun = NOUNS[(i / ADJECTIVES.len()) % NOUNS.len()];
            let category = CATEGORIES[i % CATEGORIES.len()];
            ProductRecord::new(
                format!("p{}", i),
                format!("{} {}", adjective, noun),
                category,
                format!(
                    "A {} {} from series {} with {} finish",
                    adjective,
                    noun,
                    i % 37,
                    ADJECTIVES[(i * 7) % ADJECTIVES.len()]
                ),
            )
        })
        .collect();
    Catalog::from_records(records).unwrap()
}

fn benchmark_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [100, 1000, 3000].iter() {
        group.bench_with_input(BenchmarkId::new("engine", size), size, |b, &size| {
            b.iter_batched(
                || generate_catalog(size),
                |catalog| black_box(Engine::build(catalog).unwrap()),
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let engine = Engine::build(generate_catalog(3000)).unwrap();

    for k in [1, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::new("top_k", k), k, |b, &k| {
            b.iter(|| black_box(engine.recommend(black_box("p1234"), k).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_build, benchmark_recommend);
criterion_main!(benches);
