//! Entities and component attachment.
//!
//! An [`Entity`] is nothing but a map from kind to the ordered list of
//! component instances of that kind attached to it. Attaching and detaching
//! keep the component's owner set mirrored and run addition/removal dispatch.
//!
//! ## Attachment rules
//! * An entity may hold several instances of the same kind, but never the
//!   same instance twice; re-adding is a no-op.
//! * A kind key exists only while at least one instance of that kind is
//!   attached. Detaching the last one removes the key.
//! * Removal dispatch runs *before* detaching and only while the entity is
//!   still an owner, so cascaded deletes never fire twice.

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::engine::error::{ECSError, ECSResult};
use crate::engine::manager::ECSManager;
use crate::engine::types::{ComponentId, EntityId, KindId, TriggerEvent};


/// Per-kind component list; most entities hold one or two of a kind.
pub type ComponentList = SmallVec<[ComponentId; 2]>;

/// A collection of component instances, grouped by kind.
#[derive(Debug, Default)]
pub struct Entity {
    components: IndexMap<KindId, ComponentList>,
}

impl Entity {

    /// Kinds with at least one attached instance, in first-attachment order.
    pub fn kinds(&self) -> impl Iterator<Item = KindId> + '_ {
        self.components.keys().copied()
    }

    /// Instances of `kind`, in attachment order (empty when none).
    pub fn components_of(&self, kind: KindId) -> &[ComponentId] {
        self.components.get(&kind).map(|list| list.as_slice()).unwrap_or(&[])
    }

    /// Every attached instance grouped by kind.
    pub fn iter(&self) -> impl Iterator<Item = (KindId, &[ComponentId])> + '_ {
        self.components.iter().map(|(kind, list)| (*kind, list.as_slice()))
    }

    /// Total number of attached instances.
    pub fn len(&self) -> usize {
        self.components.values().map(SmallVec::len).sum()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if `component` (of `kind`) is attached.
    pub fn holds(&self, kind: KindId, component: ComponentId) -> bool {
        self.components_of(kind).contains(&component)
    }

    fn insert(&mut self, kind: KindId, component: ComponentId) -> bool {
        let list = self.components.entry(kind).or_default();
        if list.contains(&component) {
            return false;
        }
        list.push(component);
        true
    }

    fn take(&mut self, kind: KindId, component: ComponentId) -> bool {
        let Some(list) = self.components.get_mut(&kind) else { return false; };
        let Some(position) = list.iter().position(|c| *c == component) else { return false; };
        list.remove(position);
        if list.is_empty() {
            self.components.shift_remove(&kind);
        }
        true
    }
}

impl ECSManager {

    /// Creates an entity and attaches `components` to it.
    ///
    /// Duplicates in `components` collapse to one attachment; addition
    /// triggers fire once per newly attached instance.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] if any component handle is stale;
    /// no entity is created in that case.
    pub fn spawn(&mut self, components: &[ComponentId]) -> ECSResult<EntityId> {
        for component in components {
            self.component_ref(*component)?;
        }

        let entity = self.entities.insert(Entity::default());
        self.entity_order.insert(entity);
        debug!(?entity, components = components.len(), "spawned entity");

        self.add(entity, components)?;
        Ok(entity)
    }

    /// Live entities, in creation order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entity_order.iter().copied()
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the entity record.
    pub fn entity(&self, entity: EntityId) -> ECSResult<&Entity> {
        self.entity_ref(entity)
    }

    /// Attaches components to an entity.
    ///
    /// ## Semantics
    /// For each component not already attached, in order: insert it into the
    /// entity's list for its kind, insert the entity into the component's
    /// owner set, then run addition dispatch.
    ///
    /// If a triggered callback deletes the entity, the remaining components
    /// are skipped. Components deleted by callbacks before their turn are
    /// skipped as well.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] for a stale entity or component
    /// handle (checked before anything is attached); otherwise the first
    /// callback error.
    pub fn add(&mut self, entity: EntityId, components: &[ComponentId]) -> ECSResult<()> {
        self.entity_ref(entity)?;
        for component in components {
            self.component_ref(*component)?;
        }

        for &component in components {
            let Some(kind) = self.components.get(component).map(|c| c.kind()) else {
                trace!(?component, "component deleted before attachment; skipping");
                continue;
            };
            let Some(record) = self.entities.get_mut(entity) else { break; };
            if !record.insert(kind, component) {
                continue;
            }
            self.component_mut(component)?.attach_entity(entity);

            self.dispatch(component, TriggerEvent::Addition, None)?;
        }
        Ok(())
    }

    /// Detaches components from an entity.
    ///
    /// ## Semantics
    /// For each component: if the entity is currently an owner, removal
    /// dispatch runs first (callbacks still see it attached); then the
    /// component is detached from both sides. Components that are not
    /// attached are ignored.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] for a stale entity or component
    /// handle (checked up front); otherwise the first callback error.
    pub fn remove(&mut self, entity: EntityId, components: &[ComponentId]) -> ECSResult<()> {
        self.entity_ref(entity)?;
        for component in components {
            self.component_ref(*component)?;
        }

        for &component in components {
            let attached = self
                .components
                .get(component)
                .is_some_and(|c| c.is_held_by(entity));
            if attached {
                self.dispatch(component, TriggerEvent::Removal, None)?;
            }
            self.detach(entity, component);
        }
        Ok(())
    }

    /// Deletes an entity.
    ///
    /// ## Semantics
    /// Every held component is removed as by [`remove`](Self::remove)
    /// (removal triggers fire), walking each kind's list from the most recent
    /// attachment backwards. Components attached by callbacks during the
    /// deletion are detached without dispatch. The entity is then freed.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] if the entity was already deleted.
    pub fn delete_entity(&mut self, entity: EntityId) -> ECSResult<()> {
        let held: Vec<ComponentId> = self
            .entity_ref(entity)?
            .components
            .values()
            .flat_map(|list| list.iter().rev().copied())
            .collect();

        for component in held {
            if !self.entities.contains_key(entity) {
                return Ok(());
            }
            let attached = self
                .components
                .get(component)
                .is_some_and(|c| c.is_held_by(entity));
            if attached {
                self.dispatch(component, TriggerEvent::Removal, None)?;
                self.detach(entity, component);
            }
        }

        let Some(record) = self.entities.remove(entity) else { return Ok(()); };
        for component in record.components.values().flatten() {
            if let Some(instance) = self.components.get_mut(*component) {
                instance.detach_entity(entity);
            }
        }
        self.entity_order.shift_remove(&entity);
        debug!(?entity, "deleted entity");
        Ok(())
    }

    /// The single component of `kind` expected on `entity`.
    ///
    /// Returns the first attached instance of the kind. Raises a usage hint
    /// when several are attached.
    ///
    /// ## Errors
    /// [`ECSError::NoSuchComponent`] if none is attached.
    pub fn single_component(&self, entity: EntityId, kind: KindId) -> ECSResult<ComponentId> {
        let list = self.entity_ref(entity)?.components_of(kind);
        match list {
            [] => Err(ECSError::NoSuchComponent { kind: self.kind_name(kind)?.to_owned() }),
            [only] => Ok(*only),
            [first, ..] => {
                self.usage_hint("entity holds many components of this kind but a single one was requested");
                Ok(*first)
            }
        }
    }

    /// Instances of `kind` attached to `entity`, in attachment order.
    pub fn components_of(&self, entity: EntityId, kind: KindId) -> ECSResult<&[ComponentId]> {
        Ok(self.entity_ref(entity)?.components_of(kind))
    }

    /// Kinds held by `entity`, in first-attachment order.
    pub fn kinds_on(&self, entity: EntityId) -> ECSResult<Vec<KindId>> {
        Ok(self.entity_ref(entity)?.kinds().collect())
    }

    /// Returns `true` if `entity` holds at least one instance of `kind`.
    pub fn has_kind(&self, entity: EntityId, kind: KindId) -> ECSResult<bool> {
        Ok(!self.entity_ref(entity)?.components_of(kind).is_empty())
    }

    /// Detaches both sides of an entity/component link without dispatch.
    pub(crate) fn detach(&mut self, entity: EntityId, component: ComponentId) {
        let Some(instance) = self.components.get_mut(component) else { return; };
        instance.detach_entity(entity);
        let kind = instance.kind();
        if let Some(record) = self.entities.get_mut(entity) {
            record.take(kind, component);
        }
    }
}
