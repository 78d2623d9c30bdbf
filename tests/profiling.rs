#![cfg(feature = "profiling")]

mod common;

use std::fs;

use reactive_ecs::engine::error::ECSResult;
use reactive_ecs::engine::manager::ECSManager;
use reactive_ecs::profiler;

use common::*;

#[test]
fn trace_file_records_engine_spans() -> ECSResult<()> {
    init_tracing();
    let path = std::env::temp_dir()
        .join(format!("reactive_ecs_{}", std::process::id()))
        .join("trace.json");
    profiler::init(&path);

    let mut ecs = ECSManager::new();
    let health = define_health(&mut ecs)?;
    let log = call_log();
    let tick = recording_system(&mut ecs, &log, "tick", 0)?;
    let scene = ecs.define_scene("say \"hi\"", 0)?;
    ecs.add_to_scene(scene, &[tick])?;
    ecs.stage_add(&[scene])?;
    ecs.trigger_when_added(tick, health)?;

    let hp = ecs.instantiate(health)?;
    ecs.spawn(&[hp])?;
    ecs.call_scene(scene)?;
    ecs.call_stage()?;
    profiler::shutdown();

    assert_eq!(calls(&log), vec!["tick"; 3]);

    let trace = fs::read_to_string(&path).map_err(|e| {
        reactive_ecs::ECSError::system_failed("trace", e.to_string())
    })?;
    let _ = fs::remove_file(&path);

    assert!(trace.starts_with("{\"traceEvents\":["));
    assert!(trace.ends_with("]}"));
    for name in [
        "ECSManager::dispatch",
        "ECSManager::call_system",
        "ECSManager::call_scene",
        "ECSManager::call_stage",
    ] {
        assert!(trace.contains(&format!("\"name\":\"{name}\"")), "missing span {name}");
    }
    assert!(trace.contains(r#""scene":"say \"hi\"""#));
    assert!(trace.contains("\"tick\":0"));
    Ok(())
}

#[test]
fn spans_without_init_are_dropped() {
    let guard = profiler::span("unrecorded").arg("n", profiler::Arg::U64(1));
    drop(guard);
    profiler::shutdown();
}
