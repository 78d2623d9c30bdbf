//! Scenes: named, priority-ordered groups of systems.
//!
//! A scene keeps its member list sorted by descending system priority at
//! all times. Membership is mirrored on the system side
//! ([`SystemEntry::scenes`](crate::engine::systems::SystemEntry::scenes)),
//! and any change to a scene that sits on the stage rebuilds the stage
//! schedule.
//!
//! ## Ordering
//! The sorted list is always rebuilt from the joining order, so systems with
//! equal priority keep the order in which they joined the scene, however
//! often their priorities have changed in between.

use std::cmp::Reverse;

use indexmap::IndexSet;
use tracing::debug;

use crate::engine::error::{ECSError, ECSResult};
use crate::engine::manager::ECSManager;
use crate::engine::types::{Priority, SceneId, SystemId};
use crate::profiling::profiler;


/// An ordered group of systems.
#[derive(Debug)]
pub struct Scene {
    name: String,
    priority: Priority,
    members: IndexSet<SystemId>,
    systems: Vec<SystemId>,
}

impl Scene {

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Priority of the scene within the stage.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Member systems, highest priority first.
    pub fn systems(&self) -> &[SystemId] {
        &self.systems
    }

    /// Returns `true` if `system` is a member.
    pub fn contains(&self, system: SystemId) -> bool {
        self.members.contains(&system)
    }

    pub(crate) fn forget_system(&mut self, system: SystemId) {
        if self.members.shift_remove(&system) {
            self.systems.retain(|s| *s != system);
        }
    }
}

impl ECSManager {

    /// Registers an empty scene.
    ///
    /// ## Errors
    /// [`ECSError::DuplicateName`] if a scene with this name exists.
    pub fn define_scene(&mut self, name: impl Into<String>, priority: Priority) -> ECSResult<SceneId> {
        let name = name.into();
        if self.scene_names.contains_key(&name) {
            return Err(ECSError::DuplicateName { registry: "scene", name });
        }

        debug!(scene = %name, priority, "defined scene");

        let id = self.scenes.insert(Scene {
            name: name.clone(),
            priority,
            members: IndexSet::new(),
            systems: Vec::new(),
        });
        self.scene_names.insert(name, id);
        Ok(id)
    }

    /// Looks up a scene by name.
    pub fn scene_named(&self, name: &str) -> Option<SceneId> {
        self.scene_names.get(name).copied()
    }

    /// Returns the scene record.
    pub fn scene(&self, scene: SceneId) -> ECSResult<&Scene> {
        self.scene_ref(scene)
    }

    /// Adds systems to a scene and re-sorts it.
    ///
    /// Systems already in the scene are ignored.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] for a stale scene or system handle
    /// (checked before anything changes).
    pub fn add_to_scene(&mut self, scene: SceneId, systems: &[SystemId]) -> ECSResult<()> {
        self.scene_ref(scene)?;
        for system in systems {
            self.system_ref(*system)?;
        }

        for &system in systems {
            if self.system_mut(system)?.join_scene(scene) {
                self.scene_mut(scene)?.members.insert(system);
            }
        }
        self.resort_scene(scene);
        self.refresh_stage();
        Ok(())
    }

    /// Removes systems from a scene. Non-members are ignored.
    pub fn remove_from_scene(&mut self, scene: SceneId, systems: &[SystemId]) -> ECSResult<()> {
        self.scene_ref(scene)?;
        for system in systems {
            self.system_ref(*system)?;
        }

        for &system in systems {
            if self.system_mut(system)?.leave_scene(scene) {
                self.scene_mut(scene)?.forget_system(system);
            }
        }
        self.refresh_stage();
        Ok(())
    }

    /// Removes every system from a scene, on both sides.
    pub fn clear_scene(&mut self, scene: SceneId) -> ECSResult<()> {
        let record = self.scene_mut(scene)?;
        record.systems.clear();
        let members = std::mem::take(&mut record.members);
        for system in members {
            if let Some(entry) = self.systems.get_mut(system) {
                entry.leave_scene(scene);
            }
        }
        self.refresh_stage();
        Ok(())
    }

    /// Calls every member system once, highest priority first.
    ///
    /// The member list is snapshotted first. Systems that earlier callbacks
    /// removed from the scene or deleted are skipped; systems added by them
    /// run next time.
    ///
    /// ## Errors
    /// The first callback error; remaining systems are not called.
    pub fn call_scene(&mut self, scene: SceneId) -> ECSResult<()> {
        let record = self.scene_ref(scene)?;
        let snapshot = record.systems.clone();

        let _span = profiler::span("ECSManager::call_scene")
            .arg("scene", profiler::Arg::Str(record.name.clone()));

        for system in snapshot {
            let member = self.scenes.get(scene).is_some_and(|s| s.contains(system));
            if member && self.systems.contains_key(system) {
                self.call_system(system)?;
            }
        }
        Ok(())
    }

    /// Changes a scene's priority and rebuilds the stage schedule.
    pub fn set_scene_priority(&mut self, scene: SceneId, priority: Priority) -> ECSResult<()> {
        let record = self.scene_mut(scene)?;
        if record.priority == priority {
            return Ok(());
        }
        record.priority = priority;
        self.refresh_stage();
        Ok(())
    }

    /// Rebuilds a scene's sorted list from its joining order.
    pub(crate) fn resort_scene(&mut self, scene: SceneId) {
        let Some(record) = self.scenes.get_mut(scene) else { return; };
        let systems = &self.systems;
        record.systems = record.members.iter().copied().collect();
        record
            .systems
            .sort_by_key(|s| Reverse(systems.get(*s).map_or(Priority::MIN, |e| e.priority())));
    }
}
