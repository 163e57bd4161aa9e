//! Simulation World - main orchestrator

use std::collections::HashMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::components::*;
use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::genetics::GeneSampler;
use crate::grid::Grid;
use crate::lifecycle;
use crate::systems;

pub struct SimulationWorld {
    pub registry: hecs::World,
    pub grid: Grid,
    pub config: SimulationConfig,
    pub sampler: GeneSampler,
    pub rng: ChaCha8Rng,
    year: u64,
}

impl SimulationWorld {
    /// Build an empty world: every grid cell exists, no trees yet.
    ///
    /// The configuration is validated before anything is allocated.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let sampler = GeneSampler::new(config.mutation_chance)?;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        let mut registry = hecs::World::new();
        let grid = Grid::new(&mut registry, config.width, config.height);

        Ok(Self {
            registry,
            grid,
            config,
            sampler,
            rng,
            year: 0,
        })
    }

    /// Build a world and plant the configured seed trees on the ground row
    pub fn from_config(config: SimulationConfig) -> Result<Self> {
        let mut world = Self::new(config)?;
        world.seed_population()?;
        Ok(world)
    }

    /// `num_seed_trees` trees with `initial_energy` each, evenly spaced
    /// along the ground
    pub fn create(
        width: u32,
        height: u32,
        num_seed_trees: u32,
        initial_energy: i32,
    ) -> Result<Self> {
        Self::from_config(SimulationConfig::with_population(
            width,
            height,
            num_seed_trees,
            initial_energy,
        ))
    }

    /// Spawn the configured seed trees
    pub fn seed_population(&mut self) -> Result<()> {
        let offsets: Vec<u32> = self.config.seed_offsets().collect();
        let energy = self.config.initial_energy;
        for x in offsets {
            lifecycle::spawn(self, x, energy)?;
        }
        debug!(trees = self.tree_count(), "seeded population");
        Ok(())
    }

    /// Grid entity at `(x, y)`
    pub fn at(&self, x: u32, y: u32) -> Result<hecs::Entity> {
        self.grid.at(Position::new(x, y))
    }

    /// Cell component at `pos`, `None` when the grid cell is empty
    pub fn cell_at(&self, pos: Position) -> Result<Option<Cell>> {
        let entity = self.grid.at(pos)?;
        let entity_ref = self.registry.entity(entity)?;
        let cell = entity_ref.get::<&Cell>().map(|cell| *cell);
        Ok(cell)
    }

    /// Run one simulated year: physics, then growth, then sunlight.
    /// Returns whether any tree remains.
    #[instrument(level = "debug", skip(self), fields(year = self.year))]
    pub fn tick(&mut self, sun_min: i32, sun_levels: u32) -> Result<bool> {
        systems::physics_system(self)?;
        systems::growth_system(self)?;
        systems::sun_system(self, sun_min, sun_levels)?;
        self.year += 1;
        Ok(self.tree_count() > 0)
    }

    /// Tick with the configured sunlight parameters
    pub fn step(&mut self) -> Result<bool> {
        let (sun_min, sun_levels) = (self.config.sun_energy, self.config.sun_levels);
        self.tick(sun_min, sun_levels)
    }

    /// Advance up to `years` ticks, stopping once every tree is gone.
    /// Returns the number of ticks performed.
    pub fn run_years(&mut self, years: u32) -> Result<u32> {
        let mut performed = 0;
        while performed < years {
            performed += 1;
            if !self.step()? {
                debug!(year = self.year, "no trees left");
                break;
            }
        }
        Ok(performed)
    }

    /// Completed ticks since creation
    pub fn year(&self) -> u64 {
        self.year
    }

    pub fn tree_count(&self) -> usize {
        self.registry.query::<&Tree>().iter().count()
    }

    pub fn living_count(&self) -> usize {
        self.registry.query::<&Tree>().with::<&Living>().iter().count()
    }

    pub fn falling_count(&self) -> usize {
        self.registry.query::<&Tree>().with::<&Falling>().iter().count()
    }

    /// Total entities in the store: grid placeholders plus trees
    pub fn entity_count(&self) -> usize {
        self.registry.len() as usize
    }

    /// Check the structural invariants between trees and grid cells
    pub fn validate(&self) -> Result<()> {
        let mut owners: HashMap<Position, hecs::Entity> = HashMap::new();

        for (entity, (tree, living, falling)) in self
            .registry
            .query::<(&Tree, Option<&Living>, Option<&Falling>)>()
            .iter()
        {
            if living.is_some() == falling.is_some() {
                return Err(Error::Inconsistent(format!(
                    "tree {:?} must be exactly one of living or falling",
                    entity
                )));
            }
            if tree.alive_cells.is_empty() {
                return Err(Error::Inconsistent(format!(
                    "tree {:?} has no growth front",
                    entity
                )));
            }
            if falling.is_some() && tree.cell_count() != 1 {
                return Err(Error::Inconsistent(format!(
                    "seed {:?} occupies {} cells",
                    entity,
                    tree.cell_count()
                )));
            }
            for pos in tree.positions() {
                if let Some(other) = owners.insert(pos, entity) {
                    return Err(Error::Inconsistent(format!(
                        "position ({}, {}) listed by {:?} and {:?}",
                        pos.x, pos.y, other, entity
                    )));
                }
                match self.cell_at(pos)? {
                    Some(cell) if cell.parent == entity => {}
                    Some(cell) => {
                        return Err(Error::Inconsistent(format!(
                            "cell ({}, {}) listed by {:?} but owned by {:?}",
                            pos.x, pos.y, entity, cell.parent
                        )))
                    }
                    None => {
                        return Err(Error::Inconsistent(format!(
                            "tree {:?} lists empty cell ({}, {})",
                            entity, pos.x, pos.y
                        )))
                    }
                }
            }
        }

        for (pos, entity) in self.grid.iter() {
            let entity_ref = self.registry.entity(entity)?;
            match entity_ref.get::<&Cell>() {
                Some(cell) => {
                    if owners.get(&pos) != Some(&cell.parent) {
                        return Err(Error::Inconsistent(format!(
                            "cell ({}, {}) is not listed by its parent {:?}",
                            pos.x, pos.y, cell.parent
                        )));
                    }
                }
                None => {
                    if entity_ref.component_types().next().is_some() {
                        return Err(Error::Inconsistent(format!(
                            "grid entity at ({}, {}) carries unknown components",
                            pos.x, pos.y
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
