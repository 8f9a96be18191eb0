// Ranking benchmarks for hybridrec
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hybridrec::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DIM: usize = 250;

fn generate_embeddings(rng: &mut StdRng, items: u64) -> EmbeddingTable {
    EmbeddingTable::from_records((0..items).map(|item_id| EmbeddingRecord {
        item_id,
        vector: Vector::new((0..DIM).map(|_| rng.random_range(-1.0f32..1.0)).collect()),
    }))
    .expect("generated embeddings share one dimension")
}

fn generate_interactions(
    rng: &mut StdRng,
    users: u64,
    items: u64,
    clicks: usize,
) -> InteractionStore {
    InteractionStore::from_pairs(
        (0..clicks).map(|_| (rng.random_range(0..users), rng.random_range(0..items))),
    )
}

fn benchmark_recommend(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommend");
    let model = |user: UserId, item: ItemId| -> f32 { ((user ^ item) % 100) as f32 / 20.0 };

    for items in [1_000u64, 10_000].iter() {
        let mut rng = StdRng::seed_from_u64(7);
        let embeddings = generate_embeddings(&mut rng, *items);
        let interactions = generate_interactions(&mut rng, 1_000, *items, 50_000);
        let recommender = Recommender::new(&interactions, &embeddings, &model);

        group.bench_with_input(BenchmarkId::new("warm_user", items), items, |b, _| {
            b.iter(|| black_box(recommender.recommend(black_box(17), 5)));
        });
        group.bench_with_input(BenchmarkId::new("cold_start", items), items, |b, _| {
            b.iter(|| black_box(recommender.recommend(black_box(u64::MAX), 5)));
        });
    }

    group.finish();
}

fn benchmark_cosine(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(11);
    let a: Vec<f32> = (0..DIM).map(|_| rng.random_range(-1.0f32..1.0)).collect();
    let b: Vec<f32> = (0..DIM).map(|_| rng.random_range(-1.0f32..1.0)).collect();
    let (va, vb) = (Vector::new(a), Vector::new(b));

    c.bench_function("cosine_similarity_250d", |bench| {
        bench.iter(|| black_box(va.cosine_similarity(black_box(&vb))));
    });
}

criterion_group!(benches, benchmark_recommend, benchmark_cosine);
criterion_main!(benches);
