//! Sun System
//!
//! Hands out sunlight per column, upper canopy first, then charges every
//! tree upkeep for each cell it holds.

use std::collections::HashMap;

use crate::components::{Cell, Position, Tree};
use crate::error::{Error, Result};
use crate::world::SimulationWorld;

/// Energy every cell costs its tree per year
pub const CELL_UPKEEP: i32 = 10;

/// Light up to `levels` occupied rows per column. The `k`-th occupied row
/// from the top earns `(levels - k) * (row + min_energy)`.
pub fn sun_system(sim: &mut SimulationWorld, min_energy: i32, levels: u32) -> Result<()> {
    let (width, height) = (sim.grid.width(), sim.grid.height());

    for x in 0..width {
        let mut level = levels;
        let mut row = height;
        while level > 0 && row > 0 {
            row -= 1;
            let Some(cell) = sim.cell_at(Position::new(x, row))? else {
                continue;
            };
            let gain = i32::try_from(level)
                .unwrap_or(i32::MAX)
                .saturating_mul((row as i32).saturating_add(min_energy));
            let mut tree = sim.registry.get::<&mut Tree>(cell.parent).map_err(|_| {
                Error::Inconsistent(format!(
                    "cell ({}, {}) belongs to missing tree {:?}",
                    x, row, cell.parent
                ))
            })?;
            tree.energy = tree.energy.saturating_add(gain);
            level -= 1;
        }
    }

    let mut upkeep: HashMap<hecs::Entity, i32> = HashMap::new();
    for (_, cell) in sim.registry.query::<&Cell>().iter() {
        *upkeep.entry(cell.parent).or_insert(0) += CELL_UPKEEP;
    }
    for (parent, cost) in upkeep {
        let mut tree = sim.registry.get::<&mut Tree>(parent).map_err(|_| {
            Error::Inconsistent(format!("cells owned by missing tree {:?}", parent))
        })?;
        tree.energy = tree.energy.saturating_sub(cost);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::lifecycle;

    #[test]
    fn test_single_tree_income() {
        let mut world =
            SimulationWorld::new(SimulationConfig::with_population(20, 10, 1, 300)).unwrap();
        let tree = lifecycle::spawn(&mut world, 3, 300).unwrap();
        sun_system(&mut world, 5, 3).unwrap();
        // 3 * (0 + 5) light, 10 upkeep
        assert_eq!(world.registry.get::<&Tree>(tree).unwrap().energy, 305);
    }

    #[test]
    fn test_upper_rows_shade_lower_rows() {
        let mut world =
            SimulationWorld::new(SimulationConfig::with_population(20, 10, 1, 300)).unwrap();
        let low = lifecycle::spawn(&mut world, 3, 300).unwrap();
        let high = lifecycle::spawn(&mut world, 7, 300).unwrap();
        let upper = world.at(3, 1).unwrap();
        world.registry.insert_one(upper, Cell::active(high, 0)).unwrap();
        world.registry.get::<&mut Tree>(high).unwrap().dead_cells.push(Position::new(3, 1));

        sun_system(&mut world, 5, 3).unwrap();

        // Row 0 in column 3 is second from the top: 2 * (0 + 5)
        assert_eq!(world.registry.get::<&Tree>(low).unwrap().energy, 300 + 10 - 10);
        // 3 * (1 + 5) in column 3, 3 * (0 + 5) in column 7, two cells upkeep
        assert_eq!(world.registry.get::<&Tree>(high).unwrap().energy, 300 + 18 + 15 - 20);
        world.validate().unwrap();
    }

    #[test]
    fn test_levels_limit_lit_rows() {
        let mut world =
            SimulationWorld::new(SimulationConfig::with_population(20, 10, 1, 300)).unwrap();
        let tree = lifecycle::spawn(&mut world, 3, 0).unwrap();
        for row in 1..4 {
            let entity = world.at(3, row).unwrap();
            world.registry.insert_one(entity, Cell::active(tree, 0)).unwrap();
            world.registry.get::<&mut Tree>(tree).unwrap().dead_cells.push(Position::new(3, row));
        }

        sun_system(&mut world, 0, 2).unwrap();
        // Only rows 3 and 2 are lit: 2 * 3 + 1 * 2, then 4 cells upkeep
        assert_eq!(world.registry.get::<&Tree>(tree).unwrap().energy, 8 - 40);
    }

    #[test]
    fn test_huge_level_count_saturates() {
        let mut world =
            SimulationWorld::new(SimulationConfig::with_population(20, 10, 1, 300)).unwrap();
        let tree = lifecycle::spawn(&mut world, 3, 300).unwrap();
        sun_system(&mut world, 5, u32::MAX).unwrap();
        assert_eq!(world.registry.get::<&Tree>(tree).unwrap().energy, i32::MAX - CELL_UPKEEP);
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let mut world =
            SimulationWorld::new(SimulationConfig::with_population(20, 10, 1, 300)).unwrap();
        let ghost = world.registry.spawn(());
        let entity = world.at(2, 2).unwrap();
        world.registry.insert_one(entity, Cell::active(ghost, 0)).unwrap();
        assert!(matches!(
            sun_system(&mut world, 5, 3),
            Err(Error::Inconsistent(_))
        ));
    }
}
