//! ECS registry and orchestration layer.
//!
//! This module defines [`ECSManager`], the explicit context object that owns
//! every piece of ECS state:
//!
//! * component kinds (component managers) and their live instances,
//! * entities and their per-kind component lists,
//! * systems, their callbacks and trigger links,
//! * scenes and the single stage executed once per tick.
//!
//! The operations themselves are spread across the sibling modules
//! (`component`, `entity`, `systems`, `scene`, `scheduler`, `query`,
//! `triggers`); each contributes an `impl ECSManager` block. This module holds
//! the storage, construction, and the handle-validation helpers they share.
//!
//! ## Ownership model
//!
//! All objects live in generational slot maps. Cross references
//! (entity ↔ component, system ↔ trigger target, system ↔ scene) are stored on
//! both sides as handles and kept mirrored by the operations; nothing holds a
//! pointer to anything else, so there are no reference cycles.
//!
//! ## Re-entrancy
//!
//! System callbacks receive `&mut ECSManager` and may mutate anything. Every
//! place that invokes callbacks (dispatch, scenes, the stage) first
//! materializes a snapshot of the systems to run and re-validates each handle
//! right before invoking it. Systems deleted mid-snapshot are skipped, and
//! [`ECSManager::call_scene`] also skips systems that have left the scene.
//! The stage runs its snapshot as planned; membership changes reach it on the
//! next tick.
//!
//! ## Threading
//!
//! `ECSManager` is single-threaded by construction (`!Send`, `!Sync`): system
//! callbacks are reference counted with `Rc`, and usage hints are counted in a
//! `Cell`.

use std::cell::Cell;

use indexmap::{IndexMap, IndexSet};
use slotmap::SlotMap;
use tracing::warn;

use crate::engine::component::{Component, ComponentManager};
use crate::engine::config::ECSConfig;
use crate::engine::entity::Entity;
use crate::engine::error::{ECSError, ECSResult};
use crate::engine::scene::Scene;
use crate::engine::scheduler::Stage;
use crate::engine::systems::SystemEntry;
use crate::engine::types::{
    ComponentId,
    EntityId,
    HandleKind,
    KindId,
    SceneId,
    SystemId,
};


/// Owner of all ECS state.
///
/// ## Invariants
/// * `E ∈ components[C].entities` **iff** `C ∈ entities[E].components[kind(C)]`.
/// * Every system handle stored in a trigger table is live, and the system
///   stores the matching target (and attribute) on its side.
/// * `kind_names`, `system_names` and `scene_names` only map to live handles.
/// * A scene's system list is sorted by descending priority (stable).
pub struct ECSManager {
    /// Declared component kinds.
    pub(crate) kinds: SlotMap<KindId, ComponentManager>,

    /// Kind lookup by declared name, in definition order.
    pub(crate) kind_names: IndexMap<String, KindId>,

    /// Live component instances of every kind.
    pub(crate) components: SlotMap<ComponentId, Component>,

    /// Live entities.
    pub(crate) entities: SlotMap<EntityId, Entity>,

    /// Entity creation order.
    pub(crate) entity_order: IndexSet<EntityId>,

    /// Registered systems.
    pub(crate) systems: SlotMap<SystemId, SystemEntry>,

    /// System lookup by name, in definition order.
    pub(crate) system_names: IndexMap<String, SystemId>,

    /// Registered scenes.
    pub(crate) scenes: SlotMap<SceneId, Scene>,

    /// Scene lookup by name, in definition order.
    pub(crate) scene_names: IndexMap<String, SceneId>,

    /// The per-tick execution list.
    pub(crate) stage: Stage,

    /// Behavioural policies.
    config: ECSConfig,

    /// Number of usage hints raised so far.
    usage_hints: Cell<u64>,
}

impl Default for ECSManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ECSManager {

    /// Creates an empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ECSConfig::default())
    }

    /// Creates an empty registry with the given configuration.
    pub fn with_config(config: ECSConfig) -> Self {
        Self {
            kinds: SlotMap::with_key(),
            kind_names: IndexMap::new(),
            components: SlotMap::with_key(),
            entities: SlotMap::with_key(),
            entity_order: IndexSet::new(),
            systems: SlotMap::with_key(),
            system_names: IndexMap::new(),
            scenes: SlotMap::with_key(),
            scene_names: IndexMap::new(),
            stage: Stage::default(),
            config,
            usage_hints: Cell::new(0),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ECSConfig {
        &self.config
    }

    /// Number of usage hints raised since construction.
    ///
    /// A usage hint is raised when a lookup meant for a single owner or a
    /// single component finds zero or several candidates. Hints never abort
    /// the operation.
    pub fn usage_hints(&self) -> u64 {
        self.usage_hints.get()
    }

    /// Records a usage hint and, if enabled, logs it.
    pub(crate) fn usage_hint(&self, message: &str) {
        self.usage_hints.set(self.usage_hints.get() + 1);
        if self.config.usage_hints {
            warn!(target: "reactive_ecs::usage", "{message}; you may have a bug in your logic");
        }
    }

    #[inline]
    pub(crate) fn kind_ref(&self, kind: KindId) -> ECSResult<&ComponentManager> {
        self.kinds.get(kind).ok_or(ECSError::PreconditionViolation(HandleKind::Kind))
    }

    #[inline]
    pub(crate) fn kind_mut(&mut self, kind: KindId) -> ECSResult<&mut ComponentManager> {
        self.kinds.get_mut(kind).ok_or(ECSError::PreconditionViolation(HandleKind::Kind))
    }

    #[inline]
    pub(crate) fn component_ref(&self, component: ComponentId) -> ECSResult<&Component> {
        self.components
            .get(component)
            .ok_or(ECSError::PreconditionViolation(HandleKind::Component))
    }

    #[inline]
    pub(crate) fn component_mut(&mut self, component: ComponentId) -> ECSResult<&mut Component> {
        self.components
            .get_mut(component)
            .ok_or(ECSError::PreconditionViolation(HandleKind::Component))
    }

    #[inline]
    pub(crate) fn entity_ref(&self, entity: EntityId) -> ECSResult<&Entity> {
        self.entities.get(entity).ok_or(ECSError::PreconditionViolation(HandleKind::Entity))
    }

    #[inline]
    pub(crate) fn system_ref(&self, system: SystemId) -> ECSResult<&SystemEntry> {
        self.systems.get(system).ok_or(ECSError::PreconditionViolation(HandleKind::System))
    }

    #[inline]
    pub(crate) fn system_mut(&mut self, system: SystemId) -> ECSResult<&mut SystemEntry> {
        self.systems.get_mut(system).ok_or(ECSError::PreconditionViolation(HandleKind::System))
    }

    #[inline]
    pub(crate) fn scene_ref(&self, scene: SceneId) -> ECSResult<&Scene> {
        self.scenes.get(scene).ok_or(ECSError::PreconditionViolation(HandleKind::Scene))
    }

    #[inline]
    pub(crate) fn scene_mut(&mut self, scene: SceneId) -> ECSResult<&mut Scene> {
        self.scenes.get_mut(scene).ok_or(ECSError::PreconditionViolation(HandleKind::Scene))
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn is_entity_alive(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Returns `true` if the handle refers to a live component.
    pub fn is_component_alive(&self, component: ComponentId) -> bool {
        self.components.contains_key(component)
    }

    /// Returns `true` if the handle refers to a registered system.
    pub fn is_system_alive(&self, system: SystemId) -> bool {
        self.systems.contains_key(system)
    }
}
