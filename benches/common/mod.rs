#![allow(dead_code)]

use reactive_ecs::engine::component::KindBuilder;
use reactive_ecs::engine::error::ECSResult;
use reactive_ecs::engine::manager::ECSManager;
use reactive_ecs::engine::types::{ComponentId, EntityId, KindId};

pub const AGENTS_SMALL: usize = 1_000;
pub const AGENTS_MED: usize = 10_000;
pub const AGENTS_LARGE: usize = 100_000;

#[derive(Clone, Copy)]
pub struct Kinds {
    pub position: KindId,
    pub wealth: KindId,
    pub productivity: KindId,
}

pub fn define_kinds(ecs: &mut ECSManager) -> ECSResult<Kinds> {
    Ok(Kinds {
        position: ecs.define_kind(
            KindBuilder::new("Position")
                .attr_with_default("x", 0.0)
                .attr_with_default("y", 0.0),
        )?,
        wealth: ecs.define_kind(KindBuilder::new("Wealth").attr_with_default("value", 1.0))?,
        productivity: ecs.define_kind(KindBuilder::new("Productivity").attr_with_default("rate", 0.5))?,
    })
}

/// Spawns `agent_count` agents holding one instance of each kind.
pub fn populate(ecs: &mut ECSManager, kinds: &Kinds, agent_count: usize) -> ECSResult<Vec<EntityId>> {
    (0..agent_count)
        .map(|_| {
            let components: [ComponentId; 3] = [
                ecs.instantiate(kinds.position)?,
                ecs.instantiate(kinds.wealth)?,
                ecs.instantiate(kinds.productivity)?,
            ];
            ecs.spawn(&components)
        })
        .collect()
}

pub fn setup_world(agent_count: usize) -> ECSResult<(ECSManager, Kinds)> {
    let mut ecs = ECSManager::new();
    let kinds = define_kinds(&mut ecs)?;
    populate(&mut ecs, &kinds, agent_count)?;
    Ok((ecs, kinds))
}
