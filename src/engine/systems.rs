//! ECS System Abstractions
//!
//! This module defines the *system execution model* used by the engine.
//!
//! A **system** is a named unit of logic with a priority. Systems:
//! - run when called directly, as part of a scene, or once per stage tick,
//! - run reactively when a component they watch is attached, detached or
//!   changed (see [`triggers`](crate::engine::triggers)),
//! - receive `&mut ECSManager` and may mutate any part of the registry.
//!
//! ## System Trait
//!
//! The [`System`] trait is the minimal interface required for execution.
//! Any closure `Fn(&mut ECSManager) -> ECSResult<()>` is a system, so most
//! logic is written inline:
//!
//! ```ignore
//! let heal = ecs.define_system("heal", 10, |ecs: &mut ECSManager| {
//!     for c in ecs.instances_of(health)?.collect::<Vec<_>>() {
//!         ecs.update(c, "current", 100)?;
//!     }
//!     Ok(())
//! })?;
//! ```
//!
//! ## Callbacks and redefinition
//!
//! Callbacks are stored behind `Rc`. Calling a system clones the `Rc` before
//! invoking it, so [`ECSManager::redefine`] may swap the stored callback (even
//! from inside the callback itself) without affecting the call in flight.
//!
//! ## Priorities
//!
//! Changing a priority re-sorts every scene the system belongs to and
//! refreshes the stage. Dispatch reads priorities at resolution time, so the
//! next event observes the new value.
//!
//! ## Trigger links
//!
//! `trigger_when_added`, `trigger_when_removed` and `trigger_when_changed`
//! register a link on both the system and the target;
//! [`ECSManager::clear_triggers`] removes links from both sides.

use std::cmp::Reverse;
use std::rc::Rc;

use indexmap::IndexSet;
use tracing::debug;

use crate::engine::error::{ECSError, ECSResult};
use crate::engine::manager::ECSManager;
use crate::engine::triggers::SystemLinks;
use crate::engine::types::{
    HandleKind,
    Priority,
    SceneId,
    SystemId,
    TriggerEvent,
    TriggerSelector,
    TriggerTarget,
};
use crate::profiling::profiler;


/// A unit of executable logic operating on the registry.
///
/// Implemented for every `Fn(&mut ECSManager) -> ECSResult<()>`; implement it
/// directly for systems that carry their own configuration.
pub trait System {
    /// Executes the system logic.
    fn run(&self, ecs: &mut ECSManager) -> ECSResult<()>;
}

impl<F> System for F
where
    F: Fn(&mut ECSManager) -> ECSResult<()>,
{
    #[inline]
    fn run(&self, ecs: &mut ECSManager) -> ECSResult<()> {
        self(ecs)
    }
}

/// A registered system.
///
/// It stores:
/// - its unique name and current priority,
/// - the callback executed on each call,
/// - the scenes it belongs to (back-references maintained by scene
///   operations),
/// - its side of every trigger link.
pub struct SystemEntry {
    name: String,
    priority: Priority,
    callback: Rc<dyn System>,
    scenes: IndexSet<SceneId>,
    links: SystemLinks,
}

impl SystemEntry {

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Scenes this system belongs to, in joining order.
    pub fn scenes(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.scenes.iter().copied()
    }

    /// Trigger links held by this system.
    pub fn links(&self) -> &SystemLinks {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> &mut SystemLinks {
        &mut self.links
    }

    pub(crate) fn join_scene(&mut self, scene: SceneId) -> bool {
        self.scenes.insert(scene)
    }

    pub(crate) fn leave_scene(&mut self, scene: SceneId) -> bool {
        self.scenes.shift_remove(&scene)
    }
}

impl std::fmt::Debug for SystemEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemEntry")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("scenes", &self.scenes)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl ECSManager {

    /// Registers a closure system under a unique name.
    ///
    /// ## Errors
    /// [`ECSError::DuplicateName`] if a system with this name exists.
    pub fn define_system<F>(&mut self, name: impl Into<String>, priority: Priority, callback: F) -> ECSResult<SystemId>
    where
        F: Fn(&mut ECSManager) -> ECSResult<()> + 'static,
    {
        self.register_system(name.into(), priority, Rc::new(callback))
    }

    /// Registers any [`System`] implementation under a unique name.
    pub fn define_system_with<S>(&mut self, name: impl Into<String>, priority: Priority, system: S) -> ECSResult<SystemId>
    where
        S: System + 'static,
    {
        self.register_system(name.into(), priority, Rc::new(system))
    }

    fn register_system(&mut self, name: String, priority: Priority, callback: Rc<dyn System>) -> ECSResult<SystemId> {
        if self.system_names.contains_key(&name) {
            return Err(ECSError::DuplicateName { registry: "system", name });
        }

        debug!(system = %name, priority, "defined system");

        let id = self.systems.insert(SystemEntry {
            name: name.clone(),
            priority,
            callback,
            scenes: IndexSet::new(),
            links: SystemLinks::default(),
        });
        self.system_names.insert(name, id);
        Ok(id)
    }

    /// Looks up a system by name.
    pub fn system_named(&self, name: &str) -> Option<SystemId> {
        self.system_names.get(name).copied()
    }

    /// Returns the system record.
    pub fn system(&self, system: SystemId) -> ECSResult<&SystemEntry> {
        self.system_ref(system)
    }

    /// Every registered system, highest priority first; ties keep definition
    /// order.
    pub fn systems(&self) -> Vec<SystemId> {
        let mut all: Vec<SystemId> = self.system_names.values().copied().collect();
        all.sort_by_key(|s| Reverse(self.systems[*s].priority));
        all
    }

    /// Current priority of a system.
    pub fn priority_of(&self, system: SystemId) -> ECSResult<Priority> {
        Ok(self.system_ref(system)?.priority)
    }

    /// Scenes a system belongs to.
    pub fn scenes_of(&self, system: SystemId) -> ECSResult<Vec<SceneId>> {
        Ok(self.system_ref(system)?.scenes().collect())
    }

    /// Invokes a system's callback once.
    ///
    /// ## Semantics
    /// The callback is cloned out of the registry before it runs, so it may
    /// redefine or delete its own system.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] for a stale handle; otherwise
    /// whatever the callback returns.
    pub fn call_system(&mut self, system: SystemId) -> ECSResult<()> {
        let entry = self.system_ref(system)?;
        let callback = Rc::clone(&entry.callback);

        let _span = profiler::span("ECSManager::call_system")
            .arg("system", profiler::Arg::Str(entry.name.clone()));

        callback.run(self)
    }

    /// Replaces the callback used by future calls.
    pub fn redefine<F>(&mut self, system: SystemId, callback: F) -> ECSResult<()>
    where
        F: Fn(&mut ECSManager) -> ECSResult<()> + 'static,
    {
        let entry = self.system_mut(system)?;
        entry.callback = Rc::new(callback);
        debug!(system = %entry.name, "redefined system");
        Ok(())
    }

    /// Changes a system's priority.
    ///
    /// Every scene holding the system is re-sorted, then the stage schedule
    /// is rebuilt.
    pub fn set_priority(&mut self, system: SystemId, priority: Priority) -> ECSResult<()> {
        let entry = self.system_mut(system)?;
        if entry.priority == priority {
            return Ok(());
        }
        entry.priority = priority;
        let scenes: Vec<SceneId> = entry.scenes().collect();

        for scene in scenes {
            self.resort_scene(scene);
        }
        self.refresh_stage();
        Ok(())
    }

    /// Runs `system` whenever a matching component is attached to an entity.
    pub fn trigger_when_added(&mut self, system: SystemId, target: impl Into<TriggerTarget>) -> ECSResult<()> {
        self.link_trigger(system, target.into(), TriggerEvent::Addition, None)
    }

    /// Runs `system` whenever a matching component is about to be detached.
    pub fn trigger_when_removed(&mut self, system: SystemId, target: impl Into<TriggerTarget>) -> ECSResult<()> {
        self.link_trigger(system, target.into(), TriggerEvent::Removal, None)
    }

    /// Runs `system` whenever `attr` changes on a matching component.
    ///
    /// ## Errors
    /// [`ECSError::UnknownAttribute`] if the target's kind does not declare
    /// `attr`.
    pub fn trigger_when_changed(
        &mut self,
        system: SystemId,
        target: impl Into<TriggerTarget>,
        attr: &str,
    ) -> ECSResult<()> {
        self.link_trigger(system, target.into(), TriggerEvent::AttributeChange, Some(attr))
    }

    fn link_trigger(
        &mut self,
        system: SystemId,
        target: TriggerTarget,
        event: TriggerEvent,
        attr: Option<&str>,
    ) -> ECSResult<()> {
        self.system_ref(system)?;
        let kind = match target {
            TriggerTarget::Kind(kind) => kind,
            TriggerTarget::Component(component) => self.component_ref(component)?.kind(),
        };
        let manager = self.kind_ref(kind)?;
        if let Some(attr) = attr {
            if !manager.has_attribute(attr) {
                return Err(ECSError::UnknownAttribute {
                    kind: manager.name().to_owned(),
                    attribute: attr.to_owned(),
                });
            }
        }

        self.trigger_table_mut(target)?.link(event, attr, system);

        let links = self.system_mut(system)?.links_mut();
        match (event, attr) {
            (TriggerEvent::Addition, _) => { links.addition.insert(target); }
            (TriggerEvent::Removal, _) => { links.removal.insert(target); }
            (TriggerEvent::AttributeChange, Some(attr)) => {
                links.attr.entry(target).or_default().insert(attr.to_owned());
            }
            (TriggerEvent::AttributeChange, None) => {}
        }
        Ok(())
    }

    /// Removes trigger links from both the system and the targets.
    ///
    /// ## Selection
    /// * `selectors` picks the link families; an empty slice means all three.
    ///   [`TriggerSelector::Attr`] clears every watched attribute and
    ///   supersedes any [`TriggerSelector::AttrNamed`] in the same call.
    /// * `target` restricts clearing to links with that kind or component;
    ///   `None` clears links with every target.
    ///
    /// ## Example
    /// ```ignore
    /// // stop watching `current` on Health, keep everything else
    /// ecs.clear_triggers(sys, &[TriggerSelector::attr("current")], Some(health.into()))?;
    /// ```
    pub fn clear_triggers(
        &mut self,
        system: SystemId,
        selectors: &[TriggerSelector],
        target: Option<TriggerTarget>,
    ) -> ECSResult<()> {
        let all = selectors.is_empty();
        let addition = all || selectors.contains(&TriggerSelector::Addition);
        let removal = all || selectors.contains(&TriggerSelector::Removal);
        let every_attr = all || selectors.contains(&TriggerSelector::Attr);
        let named: Vec<&str> = selectors
            .iter()
            .filter_map(|s| match s {
                TriggerSelector::AttrNamed(name) => Some(name.as_str()),
                _ => None,
            })
            .collect();

        let links = self.system_ref(system)?.links();
        let in_scope = |t: &TriggerTarget| target.map_or(true, |wanted| wanted == *t);

        let mut doomed: Vec<(TriggerTarget, TriggerEvent, Option<String>)> = Vec::new();
        if addition {
            doomed.extend(links.addition_triggers().filter(in_scope).map(|t| (t, TriggerEvent::Addition, None)));
        }
        if removal {
            doomed.extend(links.removal_triggers().filter(in_scope).map(|t| (t, TriggerEvent::Removal, None)));
        }
        doomed.extend(
            links
                .attr_triggers()
                .filter(|(t, attr)| in_scope(t) && (every_attr || named.contains(attr)))
                .map(|(t, attr)| (t, TriggerEvent::AttributeChange, Some(attr.to_owned()))),
        );

        for (t, event, attr) in doomed {
            self.unlink_trigger(system, t, event, attr.as_deref());
        }
        Ok(())
    }

    fn unlink_trigger(&mut self, system: SystemId, target: TriggerTarget, event: TriggerEvent, attr: Option<&str>) {
        if let Ok(table) = self.trigger_table_mut(target) {
            table.unlink(event, attr, system);
        }
        let Some(entry) = self.systems.get_mut(system) else { return; };
        let links = entry.links_mut();
        match (event, attr) {
            (TriggerEvent::Addition, _) => { links.addition.shift_remove(&target); }
            (TriggerEvent::Removal, _) => { links.removal.shift_remove(&target); }
            (TriggerEvent::AttributeChange, Some(attr)) => {
                if let Some(attrs) = links.attr.get_mut(&target) {
                    attrs.shift_remove(attr);
                    if attrs.is_empty() {
                        links.attr.shift_remove(&target);
                    }
                }
            }
            (TriggerEvent::AttributeChange, None) => {}
        }
    }

    /// Unregisters a system.
    ///
    /// ## Semantics
    /// Every trigger link is removed from both sides, the system leaves every
    /// scene (and therefore the stage schedule), and its name becomes
    /// available again. A running callback may delete its own system; the
    /// call completes normally.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] if the system was already deleted.
    pub fn delete_system(&mut self, system: SystemId) -> ECSResult<()> {
        self.clear_triggers(system, &[], None)?;

        let entry = self.systems.remove(system).ok_or(ECSError::PreconditionViolation(HandleKind::System))?;
        for scene in entry.scenes() {
            if let Some(record) = self.scenes.get_mut(scene) {
                record.forget_system(system);
            }
        }
        self.system_names.shift_remove(&entry.name);
        self.refresh_stage();

        debug!(system = %entry.name, "deleted system");
        Ok(())
    }
}
