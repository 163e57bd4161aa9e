//! Tree lifecycle: spawn, grow, kill into seeds, destroy and plant.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, trace};

use crate::components::*;
use crate::error::{Error, Result};
use crate::world::SimulationWorld;

/// Living component with a fresh color and lifespan
fn random_living(sim: &mut SimulationWorld) -> Living {
    let (min_age, max_age) = (sim.config.min_max_age, sim.config.max_max_age);
    Living {
        color_index: sim.rng.gen_range(1..=6),
        age: 0,
        max_age: sim.rng.gen_range(min_age..=max_age),
    }
}

/// Remove the cell at `pos`, which must be owned by `owner`
fn vacate(sim: &mut SimulationWorld, pos: Position, owner: hecs::Entity) -> Result<()> {
    let entity = sim.grid.at(pos)?;
    sim.registry.remove_one::<Cell>(entity).map_err(|_| {
        Error::Inconsistent(format!(
            "tree {:?} lists ({}, {}) but the grid cell is empty",
            owner, pos.x, pos.y
        ))
    })?;
    Ok(())
}

/// Spawn a fresh tree with a random genome on the ground at `x`.
///
/// A cell already at that spot is taken over; its previous owner forgets the
/// position and is destroyed if that leaves it without a growth front.
pub fn spawn(sim: &mut SimulationWorld, x: u32, energy: i32) -> Result<hecs::Entity> {
    let pos = Position::new(x, 0);
    let cell_entity = sim.grid.at(pos)?;

    if let Some(previous) = sim.cell_at(pos)? {
        release_position(sim, previous.parent, pos)?;
    }

    let genom = sim.sampler.random_genom(&mut sim.rng);
    let living = random_living(sim);
    let entity = sim.registry.spawn((Tree::rooted_at(energy, genom, pos), living));
    sim.registry.insert_one(cell_entity, Cell::active(entity, 0))?;

    debug!(?entity, x, energy, "spawned tree");
    Ok(entity)
}

/// Drop `pos` from `owner`'s position lists ahead of the cell being replaced
fn release_position(sim: &mut SimulationWorld, owner: hecs::Entity, pos: Position) -> Result<()> {
    let orphaned = {
        let mut tree = match sim.registry.get::<&mut Tree>(owner) {
            Ok(tree) => tree,
            Err(_) => return Ok(()),
        };
        tree.alive_cells.retain(|p| *p != pos);
        tree.dead_cells.retain(|p| *p != pos);
        tree.alive_cells.is_empty()
    };
    sim.registry.remove_one::<Cell>(sim.grid.at(pos)?)?;
    if orphaned {
        destroy(sim, owner)?;
    }
    Ok(())
}

/// Grow every cell of the growth front once.
///
/// Front cells are visited oldest first. Each tries all four directions; a
/// direction grows when its gene transition stays inside the genome, the
/// target is on the grid and empty, and the predicate holds. New cells go to
/// the front of `alive_cells` and are not revisited this pass. A source cell
/// that produced at least one new cell settles into the trunk.
pub fn grow(sim: &mut SimulationWorld, entity: hecs::Entity) -> Result<()> {
    let (genom, front) = {
        let tree = sim.registry.get::<&Tree>(entity)?;
        let front: Vec<Position> = tree.alive_cells.iter().rev().copied().collect();
        (tree.genom.clone(), front)
    };

    let mut sprouted = Vec::new();
    let mut settled = Vec::new();

    for pos in front {
        let source = sim.grid.at(pos)?;
        let cell = sim.cell_at(pos)?.ok_or_else(|| {
            Error::Inconsistent(format!(
                "growth front of {:?} holds empty cell ({}, {})",
                entity, pos.x, pos.y
            ))
        })?;
        if cell.parent != entity {
            return Err(Error::Inconsistent(format!(
                "cell ({}, {}) on the front of {:?} belongs to {:?}",
                pos.x, pos.y, entity, cell.parent
            )));
        }
        let gene = *genom.gene(cell.active_gene).ok_or_else(|| {
            Error::Inconsistent(format!("active gene {} out of range", cell.active_gene))
        })?;

        let mut grew = false;
        for dir in Direction::ALL {
            let Some(next_gene) = gene.protein(dir).next_gene_index() else {
                continue;
            };
            let Some(target) = sim.grid.neighbor(pos, dir) else {
                continue;
            };
            let near = sim.grid.at(target)?;
            if sim.registry.entity(near)?.has::<Cell>() {
                continue;
            }
            if !genom.grows(&sim.registry, &cell, dir, pos)? {
                continue;
            }
            sim.registry.insert_one(
                near,
                Cell {
                    active_gene: next_gene,
                    cell_type: CellType::Active,
                    ..cell
                },
            )?;
            trace!(?entity, from = ?pos, to = ?target, next_gene, "grew cell");
            sprouted.push(target);
            grew = true;
        }

        if grew {
            sim.registry.get::<&mut Cell>(source)?.cell_type = CellType::Dead;
            settled.push(pos);
        }
    }

    {
        let mut tree = sim.registry.get::<&mut Tree>(entity)?;
        if !settled.is_empty() {
            let gone: HashSet<Position> = settled.iter().copied().collect();
            tree.alive_cells.retain(|p| !gone.contains(p));
            tree.dead_cells.extend(settled);
        }
        for pos in sprouted {
            tree.alive_cells.push_front(pos);
        }
    }
    sim.registry.get::<&mut Living>(entity)?.age += 1;
    Ok(())
}

/// Kill a tree: the trunk disappears and every front cell becomes a falling
/// seed carrying an equal share of the energy and a cloned genome.
///
/// Returns the new seed entities.
pub fn kill(sim: &mut SimulationWorld, entity: hecs::Entity) -> Result<Vec<hecs::Entity>> {
    if sim.registry.get::<&Tree>(entity)?.alive_cells.is_empty() {
        return Err(Error::Inconsistent(format!(
            "tree {:?} has no growth front to seed from",
            entity
        )));
    }
    let tree = sim.registry.remove_one::<Tree>(entity)?;

    for &pos in &tree.dead_cells {
        vacate(sim, pos, entity)?;
    }

    let average_energy = tree.energy / tree.alive_cells.len() as i32;
    let mut seeds = Vec::with_capacity(tree.alive_cells.len());

    for &pos in &tree.alive_cells {
        let cell_entity = sim.grid.at(pos)?;
        if !sim.registry.contains(cell_entity) {
            return Err(Error::Inconsistent(format!(
                "found invalid grid entity at ({}, {})",
                pos.x, pos.y
            )));
        }
        if !sim.registry.entity(cell_entity)?.has::<Cell>() {
            return Err(Error::Inconsistent(format!(
                "no cell at ({}, {}) while seeding {} cells of {:?}",
                pos.x,
                pos.y,
                tree.alive_cells.len(),
                entity
            )));
        }

        let genom = sim.sampler.clone_genom(&tree.genom, &mut sim.rng);
        let seed = sim
            .registry
            .spawn((Tree::rooted_at(average_energy, genom, pos), Falling::default()));

        {
            let mut cell = sim.registry.get::<&mut Cell>(cell_entity)?;
            cell.parent = seed;
            cell.active_gene = 0;
        }
        seeds.push(seed);
    }

    sim.registry.despawn(entity)?;
    debug!(?entity, seeds = seeds.len(), average_energy, "tree died into seeds");
    Ok(seeds)
}

/// Remove a tree and all its cells without offspring
pub fn destroy(sim: &mut SimulationWorld, entity: hecs::Entity) -> Result<()> {
    let positions: Vec<Position> = sim.registry.get::<&Tree>(entity)?.positions().collect();
    for pos in positions {
        vacate(sim, pos, entity)?;
    }
    sim.registry.despawn(entity)?;
    debug!(?entity, "destroyed tree");
    Ok(())
}

/// Turn a landed seed into a living tree
pub fn plant(sim: &mut SimulationWorld, entity: hecs::Entity) -> Result<()> {
    sim.registry.remove_one::<Falling>(entity)?;
    let living = random_living(sim);
    sim.registry.insert_one(entity, living)?;
    debug!(?entity, "planted seed");
    Ok(())
}
