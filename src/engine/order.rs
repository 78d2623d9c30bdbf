//! Bulk priority assignment.
//!
//! [`Order::sort`] turns "run these in this order" into priorities. Given
//! `n` items, item `i` receives priority `n - 1 - i`, so the first item runs
//! first. A group item gives every member the same priority.
//!
//! ```ignore
//! // input before physics, render last; both physics systems share a slot
//! Order::sort(&mut ecs, &[input.into(), vec![gravity, collide].into(), render.into()])?;
//! ```

use crate::engine::error::ECSResult;
use crate::engine::manager::ECSManager;
use crate::engine::types::{Priority, SceneId, SystemId};


/// One position in an ordering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sortable {
    /// A single system.
    System(SystemId),

    /// A single scene.
    Scene(SceneId),

    /// Systems sharing one priority.
    Systems(Vec<SystemId>),

    /// Scenes sharing one priority.
    Scenes(Vec<SceneId>),
}

impl From<SystemId> for Sortable {
    fn from(system: SystemId) -> Self {
        Sortable::System(system)
    }
}

impl From<SceneId> for Sortable {
    fn from(scene: SceneId) -> Self {
        Sortable::Scene(scene)
    }
}

impl From<Vec<SystemId>> for Sortable {
    fn from(systems: Vec<SystemId>) -> Self {
        Sortable::Systems(systems)
    }
}

impl From<Vec<SceneId>> for Sortable {
    fn from(scenes: Vec<SceneId>) -> Self {
        Sortable::Scenes(scenes)
    }
}

/// Priority assignment helper.
pub struct Order;

impl Order {

    /// Assigns priorities so that `items` execute in the given order.
    ///
    /// Systems and scenes may be mixed; each kind of object is only compared
    /// against its own kind when executed.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`](crate::engine::error::ECSError::PreconditionViolation)
    /// if any handle is stale; no priority changes in that case.
    pub fn sort(ecs: &mut ECSManager, items: &[Sortable]) -> ECSResult<()> {
        for item in items {
            match item {
                Sortable::System(system) => { ecs.system_ref(*system)?; }
                Sortable::Scene(scene) => { ecs.scene_ref(*scene)?; }
                Sortable::Systems(systems) => {
                    for system in systems {
                        ecs.system_ref(*system)?;
                    }
                }
                Sortable::Scenes(scenes) => {
                    for scene in scenes {
                        ecs.scene_ref(*scene)?;
                    }
                }
            }
        }

        let top = items.len() as Priority - 1;
        for (index, item) in items.iter().enumerate() {
            let priority = top - index as Priority;
            match item {
                Sortable::System(system) => ecs.set_priority(*system, priority)?,
                Sortable::Scene(scene) => ecs.set_scene_priority(*scene, priority)?,
                Sortable::Systems(systems) => {
                    for system in systems {
                        ecs.set_priority(*system, priority)?;
                    }
                }
                Sortable::Scenes(scenes) => {
                    for scene in scenes {
                        ecs.set_scene_priority(*scene, priority)?;
                    }
                }
            }
        }
        Ok(())
    }
}
