#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use reactive_ecs::engine::component::KindBuilder;
use reactive_ecs::engine::error::ECSResult;
use reactive_ecs::engine::manager::ECSManager;
use reactive_ecs::engine::types::{KindId, Priority, SystemId};

/// Routes `tracing` output through the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Shared call log written by recording systems.
pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

pub fn call_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<&'static str> {
    log.borrow().clone()
}

pub fn count(log: &CallLog, name: &str) -> usize {
    log.borrow().iter().filter(|n| **n == name).count()
}

/// Defines a system that appends `name` to `log` on every call.
pub fn recording_system(
    ecs: &mut ECSManager,
    log: &CallLog,
    name: &'static str,
    priority: Priority,
) -> ECSResult<SystemId> {
    let log = Rc::clone(log);
    ecs.define_system(name, priority, move |_ecs| {
        log.borrow_mut().push(name);
        Ok(())
    })
}

/// `Health { max, current = 100 }`
pub fn define_health(ecs: &mut ECSManager) -> ECSResult<KindId> {
    ecs.define_kind(KindBuilder::new("Health").attr("max").attr_with_default("current", 100))
}

/// `Position { x = 0.0, y = 0.0 }`
pub fn define_position(ecs: &mut ECSManager) -> ECSResult<KindId> {
    ecs.define_kind(
        KindBuilder::new("Position")
            .attr_with_default("x", 0.0)
            .attr_with_default("y", 0.0),
    )
}

/// Checks that entity and component membership mirror each other.
pub fn assert_mirrored(ecs: &ECSManager) -> ECSResult<()> {
    for entity in ecs.entities() {
        for (kind, components) in ecs.entity(entity)?.iter() {
            assert!(!components.is_empty(), "empty kind list left on entity");
            for component in components {
                assert_eq!(ecs.kind_of(*component)?, kind);
                assert!(ecs.component(*component)?.is_held_by(entity));
            }
        }
    }
    for kind in ecs.kinds() {
        for component in ecs.instances_of(kind)? {
            for entity in ecs.entities_of(component)? {
                assert!(ecs.entity(entity)?.holds(kind, component));
            }
        }
    }
    Ok(())
}
