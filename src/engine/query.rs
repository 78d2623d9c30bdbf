//! Grouped iteration over kinds.
//!
//! This module provides a *builder-style* API for selecting entities by the
//! kinds of components they hold, and for visiting the matching components.
//!
//! ## Matching rules
//! Given kinds `[K0, K1, ..., Kn]`:
//!
//! * **No kinds:** nothing matches.
//! * **One kind:** one row per live instance of `K0`, in creation order,
//!   paired with its first owner in attachment order (`None` if unowned).
//! * **Several kinds:** for each instance `c0` of `K0` (creation order) that
//!   has an owner, take its first owner `e`; the row is kept only if `e`
//!   holds at least one instance of every other kind. The other columns are
//!   `e`'s first instance of each kind, the same policy as
//!   [`ECSManager::single_component`], including its usage hint when `e`
//!   holds several.
//!
//! Rows are materialized as a snapshot before anything is visited, so
//! [`QueryBuilder::for_each`] callbacks may mutate the manager. Rows whose
//! handles die mid-iteration are still visited; callbacks should treat
//! stale-handle errors accordingly.
//!
//! ## Example
//! ```ignore
//! QueryBuilder::new()
//!     .with(position)
//!     .with(velocity)
//!     .for_each(&mut ecs, |ecs, row| {
//!         let vx = ecs.attribute(row.components[1], "x")?.as_float().unwrap_or(0.0);
//!         let px = ecs.attribute(row.components[0], "x")?.as_float().unwrap_or(0.0);
//!         ecs.update(row.components[0], "x", px + vx)?;
//!         Ok(())
//!     })?;
//! ```

use smallvec::SmallVec;

use crate::engine::error::ECSResult;
use crate::engine::manager::ECSManager;
use crate::engine::types::{ComponentId, EntityId, KindId};


/// One match of a grouped query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupRow {
    /// One component per requested kind, in request order.
    pub components: SmallVec<[ComponentId; 4]>,

    /// The entity the row was resolved through. Always `Some` for
    /// multi-kind queries.
    pub entity: Option<EntityId>,
}

/// Builder for grouped queries.
///
/// The builder is consumed when executed.
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    kinds: SmallVec<[KindId; 4]>,
}

impl QueryBuilder {

    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a kind. The first kind added drives iteration.
    pub fn with(mut self, kind: KindId) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Requested kinds, in order.
    pub fn kinds(&self) -> &[KindId] {
        &self.kinds
    }

    /// Materializes the matching rows.
    pub fn collect(self, ecs: &ECSManager) -> ECSResult<Vec<GroupRow>> {
        ecs.group(&self.kinds)
    }

    /// Visits every matching row with mutable access to the manager.
    ///
    /// Stops at, and returns, the first error raised by `f`.
    pub fn for_each<F>(self, ecs: &mut ECSManager, mut f: F) -> ECSResult<()>
    where
        F: FnMut(&mut ECSManager, &GroupRow) -> ECSResult<()>,
    {
        let rows = ecs.group(&self.kinds)?;
        for row in &rows {
            f(ecs, row)?;
        }
        Ok(())
    }
}

impl ECSManager {

    /// Materializes the rows matching `kinds`. See the module docs for the
    /// matching rules.
    pub fn group(&self, kinds: &[KindId]) -> ECSResult<Vec<GroupRow>> {
        let Some((&driver, others)) = kinds.split_first() else {
            return Ok(Vec::new());
        };
        for kind in others {
            self.kind_ref(*kind)?;
        }

        let mut rows = Vec::new();
        for component in self.instances_of(driver)? {
            let owner = self.component_ref(component)?.entities().next();

            if others.is_empty() {
                rows.push(GroupRow { components: SmallVec::from_elem(component, 1), entity: owner });
                continue;
            }

            let Some(entity) = owner else { continue; };
            let record = self.entity_ref(entity)?;
            if others.iter().any(|kind| record.components_of(*kind).is_empty()) {
                continue;
            }

            let mut components: SmallVec<[ComponentId; 4]> = SmallVec::with_capacity(kinds.len());
            components.push(component);
            for kind in others {
                components.push(self.single_component(entity, *kind)?);
            }
            rows.push(GroupRow { components, entity: Some(entity) });
        }
        Ok(rows)
    }

    /// Visits every row matching `kinds` with mutable access to the manager.
    pub fn group_each<F>(&mut self, kinds: &[KindId], f: F) -> ECSResult<()>
    where
        F: FnMut(&mut ECSManager, &GroupRow) -> ECSResult<()>,
    {
        kinds
            .iter()
            .fold(QueryBuilder::new(), |query, kind| query.with(*kind))
            .for_each(self, f)
    }
}
