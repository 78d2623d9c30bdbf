//! # Component Kinds and Instances
//!
//! This module provides the component layer: declaring component *kinds*
//! (component managers) at runtime, creating *instances* of them, reading and
//! writing their attributes, and deleting them.
//!
//! ## Kinds
//! A kind is declared once with a [`KindBuilder`]: an ordered list of
//! attribute names, each with an optional default value. Declaring a kind
//! returns a [`KindId`] handle; the kind can also be looked up by name.
//!
//! ## Instances
//! An instance holds one [`Value`] per declared attribute, the set of entities
//! currently holding it (attachment order), and its own instance-level
//! [`TriggerTable`].
//!
//! ## Invariants
//! - Kind names are unique for the lifetime of the manager.
//! - Attribute names are unique within a kind and never reserved names.
//! - `values.len()` always equals the kind's attribute count.
//! - A kind's live list holds exactly its live instances, in creation order.
//! - Defaults are duplicated per instance, never shared.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::engine::error::{ECSError, ECSResult};
use crate::engine::manager::ECSManager;
use crate::engine::triggers::TriggerTable;
use crate::engine::types::{
    ComponentId,
    EntityId,
    KindId,
    TriggerEvent,
    TriggerTarget,
    RESERVED_ATTRIBUTE_NAMES,
};
use crate::engine::value::Value;


/// Builder for a component kind declaration.
///
/// ## Example
/// ```ignore
/// let health = ecs.define_kind(
///     KindBuilder::new("Health")
///         .attr("max")
///         .attr_with_default("current", 100),
/// )?;
/// ```
#[derive(Clone, Debug)]
pub struct KindBuilder {
    name: String,
    attributes: Vec<(String, Value)>,
}

impl KindBuilder {

    /// Starts a declaration for a kind called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new() }
    }

    /// Declares an attribute without a default; new instances start at
    /// [`Value::Nil`].
    pub fn attr(mut self, name: impl Into<String>) -> Self {
        self.attributes.push((name.into(), Value::Nil));
        self
    }

    /// Declares several attributes without defaults.
    pub fn attrs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes.extend(names.into_iter().map(|n| (n.into(), Value::Nil)));
        self
    }

    /// Declares an attribute with a default value.
    pub fn attr_with_default(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.attributes.push((name.into(), default.into()));
        self
    }

    /// Name of the kind being declared.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A declared component kind and its live instances.
///
/// ## Purpose
/// Owns the attribute schema, the creation-ordered list of live instances,
/// and the kind-level triggers that apply to every instance.
#[derive(Debug)]
pub struct ComponentManager {
    name: String,
    schema: IndexMap<String, Value>,
    instances: IndexSet<ComponentId>,
    triggers: TriggerTable,
}

impl ComponentManager {

    /// Declared kind name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute names in declaration order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.schema.keys().map(String::as_str)
    }

    /// Declared default of `attr` ([`Value::Nil`] when declared without one).
    pub fn default_of(&self, attr: &str) -> Option<&Value> {
        self.schema.get(attr)
    }

    /// Returns `true` if the kind declares `attr`.
    pub fn has_attribute(&self, attr: &str) -> bool {
        self.schema.contains_key(attr)
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the kind has no live instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Kind-level triggers.
    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub(crate) fn triggers_mut(&mut self) -> &mut TriggerTable {
        &mut self.triggers
    }

    fn slot_of(&self, attr: &str) -> ECSResult<usize> {
        self.schema.get_index_of(attr).ok_or_else(|| ECSError::UnknownAttribute {
            kind: self.name.clone(),
            attribute: attr.to_owned(),
        })
    }
}

/// A single component instance.
#[derive(Debug)]
pub struct Component {
    kind: KindId,
    values: Vec<Value>,
    entities: IndexSet<EntityId>,
    triggers: TriggerTable,
}

impl Component {

    /// Kind this instance belongs to.
    pub fn kind(&self) -> KindId {
        self.kind
    }

    /// Entities holding this instance, in attachment order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Number of entities holding this instance.
    pub fn owner_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if `entity` holds this instance.
    pub fn is_held_by(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Instance-level triggers.
    pub fn triggers(&self) -> &TriggerTable {
        &self.triggers
    }

    pub(crate) fn triggers_mut(&mut self) -> &mut TriggerTable {
        &mut self.triggers
    }

    pub(crate) fn attach_entity(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    pub(crate) fn detach_entity(&mut self, entity: EntityId) -> bool {
        self.entities.shift_remove(&entity)
    }
}

impl ECSManager {

    /// Declares a new component kind.
    ///
    /// ## Errors
    /// - [`ECSError::DuplicateKind`] if a kind with the same name exists.
    /// - [`ECSError::NameCollision`] if an attribute name is empty, reserved
    ///   (see [`RESERVED_ATTRIBUTE_NAMES`]), or declared twice.
    ///
    /// Nothing is registered when an error is returned.
    pub fn define_kind(&mut self, builder: KindBuilder) -> ECSResult<KindId> {
        let KindBuilder { name, attributes } = builder;

        if self.kind_names.contains_key(&name) {
            return Err(ECSError::DuplicateKind { name });
        }

        let mut schema: IndexMap<String, Value> = IndexMap::with_capacity(attributes.len());
        for (attribute, default) in attributes {
            let reason = if attribute.is_empty() {
                Some("the empty name")
            } else if RESERVED_ATTRIBUTE_NAMES.contains(&attribute.as_str()) {
                Some("a reserved name")
            } else if schema.contains_key(&attribute) {
                Some("another attribute of the same kind")
            } else {
                None
            };

            if let Some(reason) = reason {
                return Err(ECSError::NameCollision { kind: name, attribute, reason });
            }
            schema.insert(attribute, default);
        }

        debug!(kind = %name, attributes = schema.len(), "defined component kind");

        let id = self.kinds.insert(ComponentManager {
            name: name.clone(),
            schema,
            instances: IndexSet::new(),
            triggers: TriggerTable::default(),
        });
        self.kind_names.insert(name, id);
        Ok(id)
    }

    /// Looks up a kind by its declared name.
    pub fn kind_named(&self, name: &str) -> Option<KindId> {
        self.kind_names.get(name).copied()
    }

    /// All kinds, in definition order.
    pub fn kinds(&self) -> impl Iterator<Item = KindId> + '_ {
        self.kind_names.values().copied()
    }

    /// Returns the kind record.
    pub fn kind(&self, kind: KindId) -> ECSResult<&ComponentManager> {
        self.kind_ref(kind)
    }

    /// Declared name of a kind.
    pub fn kind_name(&self, kind: KindId) -> ECSResult<&str> {
        Ok(self.kind_ref(kind)?.name())
    }

    /// Creates an instance with every attribute at its (duplicated) default.
    pub fn instantiate(&mut self, kind: KindId) -> ECSResult<ComponentId> {
        self.instantiate_with(kind, std::iter::empty::<(&str, Value)>())
    }

    /// Creates an instance, then applies `overrides` on top of the defaults.
    ///
    /// ## Semantics
    /// - Every default is copied with [`Value::duplicate`] first.
    /// - Overrides are written directly; no attribute triggers fire, since
    ///   the instance is not observable before it is returned.
    /// - The instance is appended to the kind's live list.
    ///
    /// ## Errors
    /// [`ECSError::UnknownAttribute`] if an override names an undeclared
    /// attribute; nothing is created in that case.
    pub fn instantiate_with<I, K, V>(&mut self, kind: KindId, overrides: I) -> ECSResult<ComponentId>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let manager = self.kind_ref(kind)?;
        let mut values: Vec<Value> = manager.schema.values().map(Value::duplicate).collect();

        for (attr, value) in overrides {
            let slot = manager.slot_of(attr.as_ref())?;
            values[slot] = value.into();
        }

        let id = self.components.insert(Component {
            kind,
            values,
            entities: IndexSet::new(),
            triggers: TriggerTable::default(),
        });
        self.kind_mut(kind)?.instances.insert(id);
        Ok(id)
    }

    /// Live instances of a kind, in creation order.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted. It borrows
    /// the manager; collect it first when the loop body needs to mutate.
    pub fn instances_of(&self, kind: KindId) -> ECSResult<impl Iterator<Item = ComponentId> + Clone + '_> {
        Ok(self.kind_ref(kind)?.instances.iter().copied())
    }

    /// Number of live instances of a kind.
    pub fn component_count(&self, kind: KindId) -> ECSResult<usize> {
        Ok(self.kind_ref(kind)?.len())
    }

    /// Returns the instance record.
    pub fn component(&self, component: ComponentId) -> ECSResult<&Component> {
        self.component_ref(component)
    }

    /// Kind of an instance.
    pub fn kind_of(&self, component: ComponentId) -> ECSResult<KindId> {
        Ok(self.component_ref(component)?.kind)
    }

    /// Entities holding an instance, in attachment order.
    pub fn entities_of(&self, component: ComponentId) -> ECSResult<impl Iterator<Item = EntityId> + '_> {
        Ok(self.component_ref(component)?.entities())
    }

    /// Reads an attribute.
    pub fn attribute(&self, component: ComponentId, attr: &str) -> ECSResult<&Value> {
        let instance = self.component_ref(component)?;
        let slot = self.kind_ref(instance.kind)?.slot_of(attr)?;
        Ok(&instance.values[slot])
    }

    /// Writes an attribute and runs attribute-change dispatch.
    ///
    /// ## Semantics
    /// If `value` is identical to the current value ([`Value::is_identical`])
    /// nothing happens. Otherwise the value is stored, then every system
    /// watching `attr` on this instance or its kind runs, highest priority
    /// first. Returns the written value.
    ///
    /// ## Limitation
    /// Identity is coarse: mutating a list or map in place is never noticed.
    /// Write a new value through this method to notify watchers.
    pub fn update(&mut self, component: ComponentId, attr: &str, value: impl Into<Value>) -> ECSResult<Value> {
        let value = value.into();
        let kind = self.component_ref(component)?.kind;
        let slot = self.kind_ref(kind)?.slot_of(attr)?;

        let instance = self.component_mut(component)?;
        if instance.values[slot].is_identical(&value) {
            return Ok(value);
        }
        instance.values[slot] = value.clone();

        self.dispatch(component, TriggerEvent::AttributeChange, Some(attr))?;
        Ok(value)
    }

    /// Writes several attributes in order, each through [`update`](Self::update).
    pub fn update_attrs<I, K, V>(&mut self, component: ComponentId, values: I) -> ECSResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (attr, value) in values {
            self.update(component, attr.as_ref(), value)?;
        }
        Ok(())
    }

    /// Snapshot of every attribute, in declaration order.
    pub fn to_map(&self, component: ComponentId) -> ECSResult<IndexMap<String, Value>> {
        let instance = self.component_ref(component)?;
        let manager = self.kind_ref(instance.kind)?;
        Ok(manager
            .schema
            .keys()
            .cloned()
            .zip(instance.values.iter().cloned())
            .collect())
    }

    /// The single entity expected to hold `component`.
    ///
    /// Returns the first owner in attachment order, or `None`. Raises a usage
    /// hint when there are zero or several owners.
    pub fn single_owner(&self, component: ComponentId) -> ECSResult<Option<EntityId>> {
        let instance = self.component_ref(component)?;
        match instance.entities.len() {
            0 => self.usage_hint("component belongs to no entities but a single owner was requested"),
            1 => {}
            _ => self.usage_hint("component belongs to many entities but a single owner was requested"),
        }
        Ok(instance.entities.first().copied())
    }

    /// Deletes a component instance.
    ///
    /// ## Semantics
    /// 1. The instance is removed from every entity holding it (most recent
    ///    owner first); removal triggers fire for each.
    /// 2. Every trigger link involving this instance is removed from both the
    ///    instance and the linked systems.
    /// 3. The instance leaves its kind's live list and its slot is freed.
    ///
    /// Owners attached by callbacks during step 1 are detached without
    /// dispatch. If a callback deletes the instance itself, this returns
    /// `Ok(())`.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`] if the instance was already deleted.
    pub fn delete_component(&mut self, component: ComponentId) -> ECSResult<()> {
        let owners: Vec<EntityId> = self.component_ref(component)?.entities.iter().rev().copied().collect();

        for entity in owners {
            if !self.components.contains_key(component) {
                return Ok(());
            }
            if self.entities.contains_key(entity) {
                self.remove(entity, &[component])?;
            }
        }

        let Some(instance) = self.components.get(component) else { return Ok(()); };
        let kind = instance.kind;
        let leftovers: Vec<EntityId> = instance.entities.iter().copied().collect();
        for entity in leftovers {
            self.detach(entity, component);
        }

        let target = TriggerTarget::Component(component);
        for system in self.component_ref(component)?.triggers.linked_systems() {
            if let Some(entry) = self.systems.get_mut(system) {
                entry.links_mut().forget_target(target);
            }
        }

        if let Some(manager) = self.kinds.get_mut(kind) {
            manager.instances.shift_remove(&component);
        }
        self.components.remove(component);
        debug!(?component, "deleted component");
        Ok(())
    }
}
