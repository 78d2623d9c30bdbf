use criterion::*;
use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use reactive_ecs::engine::manager::ECSManager;

mod common;
use common::*;

fn dispatch_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    // attribute writes with 1, 4 and 16 watchers on the kind
    for &watchers in &[1usize, 4, 16] {
        group.bench_with_input(BenchmarkId::new("update_watched_attr", watchers), &watchers, |b, &w| {
            let (mut ecs, kinds) = setup_world(AGENTS_SMALL).unwrap();
            let hits = Rc::new(Cell::new(0u64));
            for i in 0..w {
                let hits = Rc::clone(&hits);
                let s = ecs
                    .define_system(format!("watch_{i}"), i as i64, move |_ecs: &mut ECSManager| {
                        hits.set(hits.get() + 1);
                        Ok(())
                    })
                    .unwrap();
                ecs.trigger_when_changed(s, kinds.wealth, "value").unwrap();
            }
            let targets: Vec<_> = ecs.instances_of(kinds.wealth).unwrap().collect();
            let mut value = 0i64;

            b.iter(|| {
                value += 1;
                for c in &targets {
                    ecs.update(*c, "value", value).unwrap();
                }
                black_box(hits.get());
            })
        });
    }

    group.bench_function("update_unwatched_attr", |b| {
        let (mut ecs, kinds) = setup_world(AGENTS_SMALL).unwrap();
        let targets: Vec<_> = ecs.instances_of(kinds.position).unwrap().collect();
        let mut value = 0.0f64;

        b.iter(|| {
            value += 1.0;
            for c in &targets {
                ecs.update(*c, "x", value).unwrap();
            }
        })
    });

    group.bench_function("add_remove_with_triggers", |b| {
        let (mut ecs, kinds) = setup_world(AGENTS_SMALL).unwrap();
        let on_add = ecs.define_system("on_add", 1, |_ecs: &mut ECSManager| Ok(())).unwrap();
        let on_remove = ecs.define_system("on_remove", 1, |_ecs: &mut ECSManager| Ok(())).unwrap();
        ecs.trigger_when_added(on_add, kinds.productivity).unwrap();
        ecs.trigger_when_removed(on_remove, kinds.productivity).unwrap();

        let entities: Vec<_> = ecs.entities().collect();
        let boosts: Vec<_> = (0..entities.len())
            .map(|_| ecs.instantiate(kinds.productivity).unwrap())
            .collect();

        b.iter(|| {
            for (e, c) in entities.iter().zip(&boosts) {
                ecs.add(*e, &[*c]).unwrap();
            }
            for (e, c) in entities.iter().zip(&boosts) {
                ecs.remove(*e, &[*c]).unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(benches, dispatch_benchmark);
criterion_main!(benches);
