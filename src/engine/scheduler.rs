//! Stage scheduling and execution.
//!
//! This module is responsible for:
//! * holding the ordered list of scenes executed once per tick,
//! * flattening those scenes into a single system schedule,
//! * running that schedule and counting ticks.
//!
//! ## Scheduling model
//!
//! Scenes on the stage are ordered by descending scene priority. The order is
//! always derived from the staging order, so ties keep the order in which
//! scenes were staged. The schedule is the
//! concatenation of each scene's member list in that order.
//!
//! Under [`StageDedup::Deduplicate`] a system that belongs to several staged
//! scenes runs once per tick, at the position of its first occurrence.
//! Under [`StageDedup::PerScene`] it runs once per scene.
//!
//! ## Consistency
//!
//! The schedule is rebuilt whenever anything it depends on changes: staging
//! or unstaging a scene, scene membership, scene priority, system priority,
//! or system deletion. Reading [`Stage::schedule`] therefore never observes
//! a stale order.

use std::cmp::Reverse;

use indexmap::IndexSet;
use tracing::trace;

use crate::engine::config::StageDedup;
use crate::engine::error::ECSResult;
use crate::engine::manager::ECSManager;
use crate::engine::types::{SceneId, SystemId, Tick};
use crate::profiling::profiler;


/// The per-tick execution plan.
///
/// ## Invariants
/// * `staged` holds live scenes only, in staging order.
/// * `scenes` is `staged` stable-sorted by descending priority.
/// * `schedule` is derived from `scenes` and never edited directly.
#[derive(Debug, Default)]
pub struct Stage {
    staged: IndexSet<SceneId>,
    scenes: Vec<SceneId>,
    schedule: Vec<SystemId>,
    ticks: Tick,
}

impl Stage {

    /// Staged scenes, highest priority first.
    pub fn scenes(&self) -> &[SceneId] {
        &self.scenes
    }

    /// Flattened system schedule for one tick.
    pub fn schedule(&self) -> &[SystemId] {
        &self.schedule
    }

    /// Number of completed [`ECSManager::call_stage`] invocations.
    pub fn ticks(&self) -> Tick {
        self.ticks
    }

    /// Returns `true` if `scene` is staged.
    pub fn contains(&self, scene: SceneId) -> bool {
        self.staged.contains(&scene)
    }
}

impl ECSManager {

    /// Returns the stage.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Puts scenes on the stage. Scenes already staged are ignored.
    ///
    /// ## Errors
    /// [`ECSError::PreconditionViolation`](crate::engine::error::ECSError::PreconditionViolation)
    /// for a stale scene handle (checked before anything changes).
    pub fn stage_add(&mut self, scenes: &[SceneId]) -> ECSResult<()> {
        for scene in scenes {
            self.scene_ref(*scene)?;
        }
        self.stage.staged.extend(scenes.iter().copied());
        self.refresh_stage();
        Ok(())
    }

    /// Takes scenes off the stage. Unstaged scenes are ignored.
    pub fn stage_remove(&mut self, scenes: &[SceneId]) -> ECSResult<()> {
        for scene in scenes {
            self.scene_ref(*scene)?;
        }
        self.stage.staged.retain(|s| !scenes.contains(s));
        self.refresh_stage();
        Ok(())
    }

    /// Takes every scene off the stage. The tick counter is kept.
    pub fn stage_clear(&mut self) -> ECSResult<()> {
        self.stage.staged.clear();
        self.refresh_stage();
        Ok(())
    }

    /// Runs one tick: every scheduled system once, in schedule order.
    ///
    /// The schedule is snapshotted first. Systems deleted during the tick are
    /// skipped; schedule changes made during the tick apply from the next one.
    ///
    /// ## Errors
    /// The first callback error; the rest of the tick is skipped and the tick
    /// is not counted.
    pub fn call_stage(&mut self) -> ECSResult<()> {
        let snapshot = self.stage.schedule.clone();

        let _span = profiler::span("ECSManager::call_stage")
            .arg("tick", profiler::Arg::U64(self.stage.ticks))
            .arg("systems", profiler::Arg::U64(snapshot.len() as u64));
        trace!(tick = self.stage.ticks, systems = snapshot.len(), "calling stage");

        for system in snapshot {
            if self.systems.contains_key(system) {
                self.call_system(system)?;
            }
        }
        self.stage.ticks += 1;
        Ok(())
    }

    /// Re-derives the scene order from the staging order and rebuilds the
    /// schedule.
    pub(crate) fn refresh_stage(&mut self) {
        let dedup = self.config().stage_dedup;
        let scenes = &self.scenes;
        self.stage.staged.retain(|s| scenes.contains_key(*s));
        self.stage.scenes = self.stage.staged.iter().copied().collect();
        self.stage
            .scenes
            .sort_by_key(|s| Reverse(scenes[*s].priority()));

        let members = self
            .stage
            .scenes
            .iter()
            .flat_map(|s| scenes[*s].systems().iter().copied());

        self.stage.schedule = match dedup {
            StageDedup::Deduplicate => members.collect::<IndexSet<SystemId>>().into_iter().collect(),
            StageDedup::PerScene => members.collect(),
        };

        trace!(
            scenes = self.stage.scenes.len(),
            systems = self.stage.schedule.len(),
            "refreshed stage schedule"
        );
    }
}
