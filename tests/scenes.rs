mod common;

use reactive_ecs::engine::config::{ECSConfig, StageDedup};
use reactive_ecs::engine::error::{ECSError, ECSResult};
use reactive_ecs::engine::manager::ECSManager;
use reactive_ecs::engine::order::{Order, Sortable};

use common::*;

#[test]
fn scene_sorts_members_by_descending_priority() -> ECSResult<()> {
    init_tracing();
    let mut ecs = ECSManager::new();
    let log = call_log();
    let p1 = recording_system(&mut ecs, &log, "p1", 1)?;
    let p50 = recording_system(&mut ecs, &log, "p50", 50)?;
    let p7 = recording_system(&mut ecs, &log, "p7", 7)?;

    let scene = ecs.define_scene("main", 0)?;
    ecs.add_to_scene(scene, &[p1, p50, p7])?;
    assert_eq!(ecs.scene(scene)?.systems(), &[p50, p7, p1]);

    ecs.call_scene(scene)?;
    assert_eq!(calls(&log), vec!["p50", "p7", "p1"]);
    Ok(())
}

#[test]
fn equal_priorities_keep_joining_order() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 3)?;
    let b = recording_system(&mut ecs, &log, "b", 3)?;
    let c = recording_system(&mut ecs, &log, "c", 3)?;

    let scene = ecs.define_scene("ties", 0)?;
    ecs.add_to_scene(scene, &[b])?;
    ecs.add_to_scene(scene, &[c, a])?;
    assert_eq!(ecs.scene(scene)?.systems(), &[b, c, a]);
    Ok(())
}

#[test]
fn priority_round_trip_restores_joining_order() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 3)?;
    let b = recording_system(&mut ecs, &log, "b", 3)?;
    let c = recording_system(&mut ecs, &log, "c", 3)?;

    let scene = ecs.define_scene("ties", 0)?;
    ecs.add_to_scene(scene, &[a, b, c])?;
    ecs.stage_add(&[scene])?;

    ecs.set_priority(a, 1)?;
    assert_eq!(ecs.scene(scene)?.systems(), &[b, c, a]);

    ecs.set_priority(a, 3)?;
    assert_eq!(ecs.scene(scene)?.systems(), &[a, b, c]);
    assert_eq!(ecs.stage().schedule(), &[a, b, c]);

    ecs.call_scene(scene)?;
    assert_eq!(calls(&log), vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn scene_priority_round_trip_restores_staging_order() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let x = recording_system(&mut ecs, &log, "x", 0)?;
    let y = recording_system(&mut ecs, &log, "y", 0)?;

    let s1 = ecs.define_scene("s1", 0)?;
    let s2 = ecs.define_scene("s2", 0)?;
    ecs.add_to_scene(s1, &[x])?;
    ecs.add_to_scene(s2, &[y])?;
    ecs.stage_add(&[s1, s2])?;

    ecs.set_scene_priority(s1, -1)?;
    assert_eq!(ecs.stage().scenes(), &[s2, s1]);

    ecs.set_scene_priority(s1, 0)?;
    assert_eq!(ecs.stage().scenes(), &[s1, s2]);

    ecs.call_stage()?;
    assert_eq!(calls(&log), vec!["x", "y"]);
    Ok(())
}

#[test]
fn restaging_keeps_first_staging_position() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let s1 = ecs.define_scene("s1", 0)?;
    let s2 = ecs.define_scene("s2", 0)?;
    let s3 = ecs.define_scene("s3", 0)?;

    ecs.stage_add(&[s1, s2])?;
    ecs.stage_add(&[s3, s1])?;
    assert_eq!(ecs.stage().scenes(), &[s1, s2, s3]);

    ecs.stage_remove(&[s2])?;
    assert_eq!(ecs.stage().scenes(), &[s1, s3]);
    assert!(!ecs.stage().contains(s2));
    Ok(())
}

#[test]
fn priority_change_resorts_every_scene() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 10)?;
    let b = recording_system(&mut ecs, &log, "b", 5)?;

    let one = ecs.define_scene("one", 0)?;
    let two = ecs.define_scene("two", 0)?;
    ecs.add_to_scene(one, &[a, b])?;
    ecs.add_to_scene(two, &[b, a])?;

    ecs.set_priority(b, 20)?;
    assert_eq!(ecs.scene(one)?.systems(), &[b, a]);
    assert_eq!(ecs.scene(two)?.systems(), &[b, a]);
    assert_eq!(ecs.priority_of(b)?, 20);
    assert_eq!(ecs.scenes_of(b)?, vec![one, two]);
    Ok(())
}

#[test]
fn scene_membership_is_mirrored() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 0)?;
    let b = recording_system(&mut ecs, &log, "b", 0)?;
    let scene = ecs.define_scene("s", 0)?;

    ecs.add_to_scene(scene, &[a, b, a])?;
    assert_eq!(ecs.scene(scene)?.systems().len(), 2);

    ecs.remove_from_scene(scene, &[a])?;
    assert!(ecs.scenes_of(a)?.is_empty());
    assert_eq!(ecs.scene(scene)?.systems(), &[b]);

    ecs.clear_scene(scene)?;
    assert!(ecs.scenes_of(b)?.is_empty());
    assert!(ecs.scene(scene)?.systems().is_empty());
    Ok(())
}

#[test]
fn duplicate_names_are_rejected() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    recording_system(&mut ecs, &log, "dup", 0)?;
    ecs.define_scene("dup", 0)?;

    assert_eq!(
        recording_system(&mut ecs, &log, "dup", 1),
        Err(ECSError::DuplicateName { registry: "system", name: "dup".into() })
    );
    assert_eq!(
        ecs.define_scene("dup", 1),
        Err(ECSError::DuplicateName { registry: "scene", name: "dup".into() })
    );
    assert!(ecs.scene_named("dup").is_some());
    Ok(())
}

#[test]
fn stage_runs_shared_system_once() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let x = recording_system(&mut ecs, &log, "x", 3)?;
    let y = recording_system(&mut ecs, &log, "y", 1)?;

    let scene_a = ecs.define_scene("a", 1)?;
    let scene_b = ecs.define_scene("b", 2)?;
    ecs.add_to_scene(scene_a, &[x])?;
    ecs.add_to_scene(scene_b, &[x, y])?;
    ecs.stage_add(&[scene_a, scene_b])?;

    assert_eq!(ecs.stage().scenes(), &[scene_b, scene_a]);
    assert_eq!(ecs.stage().schedule(), &[x, y]);

    ecs.call_stage()?;
    assert_eq!(calls(&log), vec!["x", "y"]);
    assert_eq!(ecs.stage().ticks(), 1);
    Ok(())
}

#[test]
fn per_scene_policy_repeats_shared_system() -> ECSResult<()> {
    let mut ecs = ECSManager::with_config(ECSConfig::new().with_stage_dedup(StageDedup::PerScene));
    let log = call_log();
    let x = recording_system(&mut ecs, &log, "x", 3)?;
    let y = recording_system(&mut ecs, &log, "y", 1)?;

    let scene_a = ecs.define_scene("a", 1)?;
    let scene_b = ecs.define_scene("b", 2)?;
    ecs.add_to_scene(scene_a, &[x])?;
    ecs.add_to_scene(scene_b, &[x, y])?;
    ecs.stage_add(&[scene_a, scene_b])?;

    ecs.call_stage()?;
    assert_eq!(calls(&log), vec!["x", "y", "x"]);
    Ok(())
}

#[test]
fn stage_follows_later_scene_and_priority_changes() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 1)?;
    let b = recording_system(&mut ecs, &log, "b", 2)?;
    let c = recording_system(&mut ecs, &log, "c", 0)?;

    let early = ecs.define_scene("early", 10)?;
    let late = ecs.define_scene("late", 0)?;
    ecs.stage_add(&[late, early])?;

    ecs.add_to_scene(early, &[a, b])?;
    ecs.add_to_scene(late, &[c])?;
    assert_eq!(ecs.stage().schedule(), &[b, a, c]);

    ecs.set_priority(a, 5)?;
    assert_eq!(ecs.stage().schedule(), &[a, b, c]);

    ecs.set_scene_priority(late, 20)?;
    assert_eq!(ecs.stage().schedule(), &[c, a, b]);

    ecs.remove_from_scene(early, &[b])?;
    assert_eq!(ecs.stage().schedule(), &[c, a]);

    ecs.delete_system(c)?;
    assert_eq!(ecs.stage().schedule(), &[a]);

    ecs.stage_remove(&[early])?;
    assert!(ecs.stage().schedule().is_empty());

    ecs.stage_add(&[early])?;
    ecs.stage_clear()?;
    assert!(ecs.stage().scenes().is_empty());
    ecs.call_stage()?;
    assert!(calls(&log).is_empty());
    Ok(())
}

#[test]
fn order_assigns_descending_priorities() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let input = recording_system(&mut ecs, &log, "input", 0)?;
    let gravity = recording_system(&mut ecs, &log, "gravity", 0)?;
    let collide = recording_system(&mut ecs, &log, "collide", 0)?;
    let render = recording_system(&mut ecs, &log, "render", 0)?;

    let frame = ecs.define_scene("frame", 0)?;
    ecs.add_to_scene(frame, &[render, collide, gravity, input])?;

    Order::sort(
        &mut ecs,
        &[input.into(), Sortable::from(vec![gravity, collide]), render.into()],
    )?;
    assert_eq!(ecs.priority_of(input)?, 2);
    assert_eq!(ecs.priority_of(gravity)?, 1);
    assert_eq!(ecs.priority_of(collide)?, 1);
    assert_eq!(ecs.priority_of(render)?, 0);

    // the group keeps its joining order
    ecs.call_scene(frame)?;
    assert_eq!(calls(&log), vec!["input", "collide", "gravity", "render"]);
    Ok(())
}

#[test]
fn order_sorts_scenes_on_the_stage() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let first = ecs.define_scene("first", 0)?;
    let second = ecs.define_scene("second", 0)?;
    let third = ecs.define_scene("third", 0)?;
    ecs.stage_add(&[third, second, first])?;

    Order::sort(&mut ecs, &[first.into(), second.into(), third.into()])?;
    assert_eq!(ecs.stage().scenes(), &[first, second, third]);
    assert_eq!(ecs.scene(first)?.priority(), 2);
    Ok(())
}

#[test]
fn systems_listing_is_priority_ordered() -> ECSResult<()> {
    let mut ecs = ECSManager::new();
    let log = call_log();
    let a = recording_system(&mut ecs, &log, "a", 1)?;
    let b = recording_system(&mut ecs, &log, "b", 9)?;
    let c = recording_system(&mut ecs, &log, "c", 1)?;

    assert_eq!(ecs.systems(), vec![b, a, c]);
    assert_eq!(ecs.system_named("c"), Some(c));
    assert_eq!(ecs.system(b)?.name(), "b");
    Ok(())
}
