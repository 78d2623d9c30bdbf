//! # Reactive ECS
//!
//! Entity-Component-System registry with reactive triggers, designed for
//! game-style simulations driven by a host loop.
//!
//! ## Design Goals
//! - Runtime-declared component kinds with per-instance defaults
//! - Mirrored entity/component membership with no dangling handles
//! - Reactive systems triggered by additions, removals and attribute changes
//! - Deterministic, priority-ordered scenes and a per-tick stage
//! - Safe mutation of the registry from inside any callback
//!
//! ## Example
//! ```
//! use reactive_ecs::prelude::*;
//!
//! # fn main() -> ECSResult<()> {
//! let mut ecs = ECSManager::new();
//! let health = ecs.define_kind(KindBuilder::new("Health").attr("max").attr_with_default("current", 100))?;
//!
//! let announce = ecs.define_system("announce", 0, |_ecs| Ok(()))?;
//! ecs.trigger_when_changed(announce, health, "current")?;
//!
//! let hp = ecs.instantiate(health)?;
//! let hero = ecs.spawn(&[hp])?;
//! ecs.update(hp, "current", 50)?;
//!
//! assert_eq!(ecs.attribute(hp, "current")?.as_int(), Some(50));
//! assert_eq!(ecs.single_component(hero, health)?, hp);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod engine;
pub mod profiling;

pub use profiling::profiler;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::manager::ECSManager;

pub use engine::component::{
    Component,
    ComponentManager,
    KindBuilder,
};

pub use engine::entity::{
    ComponentList,
    Entity,
};

pub use engine::value::{
    ListCell,
    MapCell,
    Value,
};

pub use engine::triggers::{
    SystemLinks,
    TriggerTable,
};

pub use engine::query::{
    GroupRow,
    QueryBuilder,
};

pub use engine::systems::{
    System,
    SystemEntry,
};

pub use engine::scene::Scene;
pub use engine::scheduler::Stage;
pub use engine::order::{Order, Sortable};

pub use engine::config::{
    ECSConfig,
    StageDedup,
};

pub use engine::error::{
    ECSError,
    ECSResult,
};

pub use engine::types::{
    ComponentId,
    EntityId,
    HandleKind,
    KindId,
    Priority,
    SceneId,
    SystemId,
    Tick,
    TriggerEvent,
    TriggerSelector,
    TriggerTarget,
    RESERVED_ATTRIBUTE_NAMES,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used ECS types.
///
/// Import with:
/// ```rust
/// use reactive_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        ComponentId,
        ECSConfig,
        ECSError,
        ECSManager,
        ECSResult,
        EntityId,
        GroupRow,
        KindBuilder,
        KindId,
        Order,
        QueryBuilder,
        SceneId,
        Sortable,
        StageDedup,
        System,
        SystemId,
        TriggerSelector,
        TriggerTarget,
        Value,
    };
}
