use criterion::*;
use std::hint::black_box;

use reactive_ecs::engine::manager::ECSManager;

mod common;
use common::*;

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    group.bench_function("tick_2_systems_10k", |b| {
        let (mut ecs, kinds) = setup_world(AGENTS_MED).unwrap();

        // System 1: wealth += productivity
        let production = ecs
            .define_system("production", 10, move |ecs: &mut ECSManager| {
                ecs.group_each(&[kinds.wealth, kinds.productivity], |ecs, row| {
                    let rate = ecs.attribute(row.components[1], "rate")?.as_float().unwrap_or(0.0);
                    let value = ecs.attribute(row.components[0], "value")?.as_float().unwrap_or(0.0);
                    ecs.update(row.components[0], "value", value + rate)?;
                    Ok(())
                })
            })
            .unwrap();

        // System 2: wealth *= 0.99
        let decay = ecs
            .define_system("decay", 0, move |ecs: &mut ECSManager| {
                let wealth: Vec<_> = ecs.instances_of(kinds.wealth)?.collect();
                for c in wealth {
                    let value = ecs.attribute(c, "value")?.as_float().unwrap_or(0.0);
                    ecs.update(c, "value", value * 0.99)?;
                }
                Ok(())
            })
            .unwrap();

        let scene = ecs.define_scene("economy", 0).unwrap();
        ecs.add_to_scene(scene, &[decay, production]).unwrap();
        ecs.stage_add(&[scene]).unwrap();

        b.iter(|| {
            ecs.call_stage().unwrap();
            black_box(ecs.stage().ticks());
        })
    });

    group.bench_function("stage_refresh_64_scenes", |b| {
        let mut ecs = ECSManager::new();
        let mut scenes = Vec::new();
        for i in 0..64i64 {
            let scene = ecs.define_scene(format!("scene_{i}"), i).unwrap();
            let system = ecs
                .define_system(format!("system_{i}"), i, |_ecs: &mut ECSManager| Ok(()))
                .unwrap();
            ecs.add_to_scene(scene, &[system]).unwrap();
            scenes.push(scene);
        }
        ecs.stage_add(&scenes).unwrap();
        let mut p = 0i64;

        b.iter(|| {
            p = (p + 7) % 64;
            ecs.set_scene_priority(scenes[0], p).unwrap();
            black_box(ecs.stage().schedule().len());
        })
    });

    group.finish();
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
