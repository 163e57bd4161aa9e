//! Physics System
//!
//! Moves falling seeds one row down, planting them on the ground and
//! crushing them when they land on existing growth.

use crate::components::{Cell, Direction, Falling, Tree};
use crate::error::{Error, Result};
use crate::lifecycle;
use crate::world::SimulationWorld;

/// Advance every falling seed by one row
pub fn physics_system(sim: &mut SimulationWorld) -> Result<()> {
    let seeds: Vec<hecs::Entity> = sim
        .registry
        .query::<&Tree>()
        .with::<&Falling>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();

    for entity in seeds {
        let pos = sim
            .registry
            .get::<&Tree>(entity)?
            .alive_cells
            .front()
            .copied()
            .ok_or_else(|| Error::Inconsistent(format!("seed {:?} has no position", entity)))?;

        let Some(below_pos) = sim.grid.neighbor(pos, Direction::Down) else {
            lifecycle::plant(sim, entity)?;
            continue;
        };

        let below = sim.grid.at(below_pos)?;
        if sim.registry.entity(below)?.has::<Cell>() {
            lifecycle::destroy(sim, entity)?;
            continue;
        }

        let here = sim.grid.at(pos)?;
        let cell = sim.registry.remove_one::<Cell>(here).map_err(|_| {
            Error::Inconsistent(format!(
                "seed {:?} at ({}, {}) has no cell",
                entity, pos.x, pos.y
            ))
        })?;
        sim.registry.insert_one(below, cell)?;

        if let Some(front) = sim.registry.get::<&mut Tree>(entity)?.alive_cells.front_mut() {
            *front = below_pos;
        }
        sim.registry.get::<&mut Falling>(entity)?.fallen += 1;
    }

    Ok(())
}
