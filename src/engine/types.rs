//! Core ECS Types and Identifiers
//!
//! This module defines the **handles, identifiers, and small shared enums**
//! used throughout the engine. They form the vocabulary that the component,
//! entity, system, scene and stage layers use to refer to each other.
//!
//! ## Handle Model
//!
//! Every registry object lives in a generational slot map owned by
//! [`ECSManager`](crate::engine::manager::ECSManager). Cross references are
//! plain copyable keys:
//!
//! ```text
//! | slot index | generation |
//! ```
//!
//! - **Index** identifies the arena slot.
//! - **Generation** enables stale-handle detection after deletion.
//!
//! An entity therefore never *owns* its components and a system never owns the
//! components it watches; both sides hold keys, and the manager keeps the two
//! sides mirrored.
//!
//! ## Priorities
//!
//! [`Priority`] orders systems within scenes, scenes within the stage, and
//! triggered systems during dispatch. Higher values run earlier. All sorts are
//! stable, so equal priorities keep insertion order.

use slotmap::new_key_type;

new_key_type! {
    /// Handle to a declared component kind (a component manager).
    pub struct KindId;

    /// Handle to a single component instance.
    pub struct ComponentId;

    /// Handle to an entity.
    pub struct EntityId;

    /// Handle to a system.
    pub struct SystemId;

    /// Handle to a scene.
    pub struct SceneId;
}

/// Execution priority. Higher values are executed earlier.
pub type Priority = i64;

/// Simulation tick counter.
pub type Tick = u64;

/// Attribute names that cannot be declared on a component kind.
///
/// These mirror the operations every component instance exposes, so an
/// attribute of the same name would be ambiguous in host-facing tooling.
pub const RESERVED_ATTRIBUTE_NAMES: &[&str] = &[
    "addition_triggers",
    "removal_triggers",
    "attr_triggers",
    "entities",
    "entity",
    "delete",
    "update",
    "update_attrs",
    "to_h",
    "set_defaults",
];

/// The object a trigger is attached to: either a whole kind or one instance.
///
/// Kind-level triggers fire for every instance of the kind; instance-level
/// triggers supplement them for that one instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerTarget {
    /// Every instance of a component kind.
    Kind(KindId),

    /// A single component instance.
    Component(ComponentId),
}

impl From<KindId> for TriggerTarget {
    fn from(kind: KindId) -> Self {
        TriggerTarget::Kind(kind)
    }
}

impl From<ComponentId> for TriggerTarget {
    fn from(component: ComponentId) -> Self {
        TriggerTarget::Component(component)
    }
}

/// The three families of trigger events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerEvent {
    /// A component was attached to an entity.
    Addition,

    /// A component is about to be detached from an entity.
    Removal,

    /// An attribute of a component changed.
    AttributeChange,
}

/// Selects which trigger links [`ECSManager::clear_triggers`] removes.
///
/// [`ECSManager::clear_triggers`]: crate::engine::manager::ECSManager::clear_triggers
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TriggerSelector {
    /// All addition links.
    Addition,

    /// All removal links.
    Removal,

    /// All attribute-change links, for every attribute.
    Attr,

    /// Attribute-change links for one attribute name only.
    AttrNamed(String),
}

impl TriggerSelector {
    /// Selector for attribute-change links of a single attribute.
    pub fn attr(name: impl Into<String>) -> Self {
        TriggerSelector::AttrNamed(name.into())
    }
}

/// Handle families, used to report which kind of stale handle was supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A [`KindId`].
    Kind,
    /// A [`ComponentId`].
    Component,
    /// An [`EntityId`].
    Entity,
    /// A [`SystemId`].
    System,
    /// A [`SceneId`].
    Scene,
}

impl std::fmt::Display for HandleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            HandleKind::Kind => "kind",
            HandleKind::Component => "component",
            HandleKind::Entity => "entity",
            HandleKind::System => "system",
            HandleKind::Scene => "scene",
        };
        f.write_str(name)
    }
}
