use criterion::*;
use std::hint::black_box;

mod common;
use common::*;

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    for &agents in &[AGENTS_SMALL, AGENTS_MED] {
        group.throughput(Throughput::Elements(agents as u64));
        group.bench_with_input(BenchmarkId::new("spawn_3_components", agents), &agents, |b, &n| {
            b.iter_batched(
                || {
                    let mut ecs = reactive_ecs::ECSManager::new();
                    let kinds = define_kinds(&mut ecs).unwrap();
                    (ecs, kinds)
                },
                |(mut ecs, kinds)| {
                    let entities = populate(&mut ecs, &kinds, n).unwrap();
                    black_box(entities);
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.bench_function("delete_entities_10k", |b| {
        b.iter_batched(
            || {
                let mut ecs = reactive_ecs::ECSManager::new();
                let kinds = define_kinds(&mut ecs).unwrap();
                let entities = populate(&mut ecs, &kinds, AGENTS_MED).unwrap();
                (ecs, entities)
            },
            |(mut ecs, entities)| {
                for e in entities {
                    ecs.delete_entity(e).unwrap();
                }
                black_box(ecs.entity_count());
            },
            BatchSize::LargeInput,
        )
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark);
criterion_main!(benches);
