//! Growth System
//!
//! Starved trees are destroyed, old trees die into seeds, the rest grow.

use tracing::debug;

use crate::components::{Living, Tree};
use crate::error::Result;
use crate::lifecycle;
use crate::world::SimulationWorld;

/// Process every living tree once
pub fn growth_system(sim: &mut SimulationWorld) -> Result<()> {
    let trees: Vec<hecs::Entity> = sim
        .registry
        .query::<&Tree>()
        .with::<&Living>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in trees {
        let energy = sim.registry.get::<&Tree>(entity)?.energy;
        let expired = sim.registry.get::<&Living>(entity)?.is_expired();

        if energy <= 0 {
            debug!(?entity, energy, "tree starved");
            lifecycle::destroy(sim, entity)?;
        } else if expired {
            lifecycle::kill(sim, entity)?;
        } else {
            lifecycle::grow(sim, entity)?;
        }
    }

    Ok(())
}
