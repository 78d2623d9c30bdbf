//! Trigger registries and reactive dispatch.
//!
//! A trigger is a bidirectional link between a system and a
//! [`TriggerTarget`] (a whole kind, or one component instance):
//!
//! * the target stores the system in its [`TriggerTable`],
//! * the system stores the target in its [`SystemLinks`].
//!
//! Both sides are always updated together by the `trigger_when_*` and
//! `clear_triggers` operations, and by component/system deletion.
//!
//! ## Dispatch
//!
//! When an event happens to a component (attached, about to be detached, or
//! an attribute changed) the manager:
//!
//! 1. collects the kind-level systems for the event, then the instance-level
//!    ones, de-duplicating while preserving that order,
//! 2. stable-sorts the candidates by descending priority,
//! 3. invokes each candidate exactly once, re-checking that it is still
//!    registered right before the call.
//!
//! Step 3 iterates over the snapshot built in steps 1–2, never over the live
//! tables, so callbacks may freely add or remove triggers, components or
//! entities. Such changes are visible to the *next* dispatch, not to the one
//! in flight.

use std::cmp::Reverse;

use indexmap::{IndexMap, IndexSet};
use tracing::trace;

use crate::engine::error::ECSResult;
use crate::engine::manager::ECSManager;
use crate::engine::types::{ComponentId, SystemId, TriggerEvent, TriggerTarget};
use crate::profiling::profiler;


/// Systems subscribed to a kind or a component instance.
///
/// Kept on both [`ComponentManager`](crate::engine::component::ComponentManager)
/// (kind-level) and [`Component`](crate::engine::component::Component)
/// (instance-level).
#[derive(Clone, Debug, Default)]
pub struct TriggerTable {
    addition: IndexSet<SystemId>,
    removal: IndexSet<SystemId>,
    attr: IndexMap<String, IndexSet<SystemId>>,
}

impl TriggerTable {

    /// Systems triggered when a component is attached to an entity.
    pub fn addition_triggers(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.addition.iter().copied()
    }

    /// Systems triggered when a component is detached from an entity.
    pub fn removal_triggers(&self) -> impl Iterator<Item = SystemId> + '_ {
        self.removal.iter().copied()
    }

    /// Systems triggered when `attr` changes.
    pub fn attr_triggers<'a>(&'a self, attr: &str) -> impl Iterator<Item = SystemId> + 'a {
        self.attr.get(attr).into_iter().flat_map(|set| set.iter().copied())
    }

    /// Attribute names that have at least one subscriber.
    pub fn watched_attributes(&self) -> impl Iterator<Item = &str> + '_ {
        self.attr.keys().map(String::as_str)
    }

    /// Returns `true` if no system is subscribed.
    pub fn is_empty(&self) -> bool {
        self.addition.is_empty() && self.removal.is_empty() && self.attr.is_empty()
    }

    fn event_set(&self, event: TriggerEvent, attr: Option<&str>) -> Option<&IndexSet<SystemId>> {
        match (event, attr) {
            (TriggerEvent::Addition, _) => Some(&self.addition),
            (TriggerEvent::Removal, _) => Some(&self.removal),
            (TriggerEvent::AttributeChange, Some(attr)) => self.attr.get(attr),
            (TriggerEvent::AttributeChange, None) => None,
        }
    }

    pub(crate) fn link(&mut self, event: TriggerEvent, attr: Option<&str>, system: SystemId) {
        match (event, attr) {
            (TriggerEvent::Addition, _) => { self.addition.insert(system); }
            (TriggerEvent::Removal, _) => { self.removal.insert(system); }
            (TriggerEvent::AttributeChange, Some(attr)) => {
                self.attr.entry(attr.to_owned()).or_default().insert(system);
            }
            (TriggerEvent::AttributeChange, None) => {}
        }
    }

    pub(crate) fn unlink(&mut self, event: TriggerEvent, attr: Option<&str>, system: SystemId) {
        match (event, attr) {
            (TriggerEvent::Addition, _) => { self.addition.shift_remove(&system); }
            (TriggerEvent::Removal, _) => { self.removal.shift_remove(&system); }
            (TriggerEvent::AttributeChange, Some(attr)) => {
                if let Some(set) = self.attr.get_mut(attr) {
                    set.shift_remove(&system);
                    if set.is_empty() {
                        self.attr.shift_remove(attr);
                    }
                }
            }
            (TriggerEvent::AttributeChange, None) => {}
        }
    }

    /// Every distinct system linked through any event, in first-seen order.
    pub(crate) fn linked_systems(&self) -> Vec<SystemId> {
        let mut seen: IndexSet<SystemId> = IndexSet::new();
        seen.extend(self.addition.iter().copied());
        seen.extend(self.removal.iter().copied());
        for set in self.attr.values() {
            seen.extend(set.iter().copied());
        }
        seen.into_iter().collect()
    }
}

/// The system-side mirror of its trigger links.
#[derive(Clone, Debug, Default)]
pub struct SystemLinks {
    pub(crate) addition: IndexSet<TriggerTarget>,
    pub(crate) removal: IndexSet<TriggerTarget>,
    pub(crate) attr: IndexMap<TriggerTarget, IndexSet<String>>,
}

impl SystemLinks {

    /// Targets whose additions trigger the system.
    pub fn addition_triggers(&self) -> impl Iterator<Item = TriggerTarget> + '_ {
        self.addition.iter().copied()
    }

    /// Targets whose removals trigger the system.
    pub fn removal_triggers(&self) -> impl Iterator<Item = TriggerTarget> + '_ {
        self.removal.iter().copied()
    }

    /// `(target, attribute)` pairs whose changes trigger the system.
    pub fn attr_triggers(&self) -> impl Iterator<Item = (TriggerTarget, &str)> + '_ {
        self.attr
            .iter()
            .flat_map(|(target, attrs)| attrs.iter().map(move |a| (*target, a.as_str())))
    }

    /// Returns `true` if the system has no trigger links.
    pub fn is_empty(&self) -> bool {
        self.addition.is_empty() && self.removal.is_empty() && self.attr.is_empty()
    }

    /// Drops every link to `target`.
    pub(crate) fn forget_target(&mut self, target: TriggerTarget) {
        self.addition.shift_remove(&target);
        self.removal.shift_remove(&target);
        self.attr.shift_remove(&target);
    }
}

impl ECSManager {

    /// Resolves the ordered, de-duplicated systems to run for an event.
    ///
    /// ## Order
    /// Kind-level subscribers first, then instance-level ones, each in
    /// registration order; duplicates keep their first position. The list is
    /// then stable-sorted by descending priority.
    pub(crate) fn resolve_triggers(
        &self,
        component: ComponentId,
        event: TriggerEvent,
        attr: Option<&str>,
    ) -> ECSResult<Vec<SystemId>> {
        let instance = self.component_ref(component)?;
        let kind = self.kind_ref(instance.kind())?;

        let mut candidates: IndexSet<SystemId> = IndexSet::new();
        if let Some(set) = kind.triggers().event_set(event, attr) {
            candidates.extend(set.iter().copied());
        }
        if let Some(set) = instance.triggers().event_set(event, attr) {
            candidates.extend(set.iter().copied());
        }

        let mut ordered: Vec<SystemId> = candidates
            .into_iter()
            .filter(|s| self.systems.contains_key(*s))
            .collect();
        ordered.sort_by_key(|s| Reverse(self.systems[*s].priority()));
        Ok(ordered)
    }

    /// Runs every system subscribed to `event` on `component`.
    ///
    /// ## Failure behavior
    /// The first callback error is returned and the remaining systems of the
    /// snapshot are not invoked. Registry mutations made before the error
    /// are kept.
    pub(crate) fn dispatch(
        &mut self,
        component: ComponentId,
        event: TriggerEvent,
        attr: Option<&str>,
    ) -> ECSResult<()> {
        let snapshot = self.resolve_triggers(component, event, attr)?;
        if snapshot.is_empty() {
            return Ok(());
        }

        let _span = profiler::span("ECSManager::dispatch")
            .arg("systems", profiler::Arg::U64(snapshot.len() as u64));
        trace!(?component, ?event, attr, systems = snapshot.len(), "dispatching triggers");

        for system in snapshot {
            if self.systems.contains_key(system) {
                self.call_system(system)?;
            }
        }
        Ok(())
    }

    /// Systems subscribed to a kind or a component instance.
    pub fn triggers_of(&self, target: impl Into<TriggerTarget>) -> ECSResult<&TriggerTable> {
        match target.into() {
            TriggerTarget::Kind(kind) => Ok(self.kind_ref(kind)?.triggers()),
            TriggerTarget::Component(component) => Ok(self.component_ref(component)?.triggers()),
        }
    }

    #[inline]
    pub(crate) fn trigger_table_mut(&mut self, target: TriggerTarget) -> ECSResult<&mut TriggerTable> {
        match target {
            TriggerTarget::Kind(kind) => Ok(self.kind_mut(kind)?.triggers_mut()),
            TriggerTarget::Component(component) => Ok(self.component_mut(component)?.triggers_mut()),
        }
    }
}
