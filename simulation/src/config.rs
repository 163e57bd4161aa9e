//! Configuration for a simulation run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// World and pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Width of the grid (wraps horizontally)
    pub width: u32,
    /// Height of the grid, row 0 is the ground
    pub height: u32,
    /// Number of trees spawned on the ground row at creation
    pub num_seed_trees: u32,
    /// Starting energy of every seed tree
    pub initial_energy: i32,
    /// Distance between neighbouring seed trees (first one sits at `seed_spacing`)
    pub seed_spacing: u32,
    /// Minimum sunlight energy added to every lit row
    pub sun_energy: i32,
    /// How many occupied rows per column receive sunlight
    pub sun_levels: u32,
    /// Probability that a cloned genome mutates one gene (0.0 to 1.0)
    pub mutation_chance: f64,
    /// Lower bound of the randomized lifespan
    pub min_max_age: u32,
    /// Upper bound of the randomized lifespan
    pub max_max_age: u32,
    /// Seed for the world's random stream
    pub rng_seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 200,
            height: 60,
            num_seed_trees: 12,
            initial_energy: 300,
            seed_spacing: 5,
            sun_energy: 5,
            sun_levels: 3,
            mutation_chance: 0.25,
            min_max_age: 80,
            max_max_age: 90,
            rng_seed: 12345,
        }
    }
}

impl SimulationConfig {
    /// Default parameters with the given dimensions and seed population
    pub fn with_population(
        width: u32,
        height: u32,
        num_seed_trees: u32,
        initial_energy: i32,
    ) -> Self {
        Self {
            width,
            height,
            num_seed_trees,
            initial_energy,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// X offsets of the initial seed trees
    pub fn seed_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (1..=self.num_seed_trees).map(move |i| i * self.seed_spacing)
    }

    /// Reject parameters that cannot produce a consistent world
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "world dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width.checked_mul(self.height).is_none() {
            return Err(Error::Config(format!(
                "world of {}x{} cells is too large",
                self.width, self.height
            )));
        }
        if self.num_seed_trees == 0 {
            return Err(Error::Config("num_seed_trees must be a positive value".into()));
        }
        if self.seed_spacing == 0 {
            return Err(Error::Config("seed_spacing must be a positive value".into()));
        }
        let last_offset = self.num_seed_trees as u64 * self.seed_spacing as u64;
        if last_offset >= self.width as u64 {
            return Err(Error::Config(format!(
                "{} seed trees spaced {} apart do not fit in width {}",
                self.num_seed_trees, self.seed_spacing, self.width
            )));
        }
        if self.min_max_age > self.max_max_age {
            return Err(Error::Config(format!(
                "lifespan range {}..={} is empty",
                self.min_max_age, self.max_max_age
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_chance) {
            return Err(Error::Config(format!(
                "mutation_chance must be within 0.0..=1.0, got {}",
                self.mutation_chance
            )));
        }
        if self.sun_levels == 0 {
            return Err(Error::Config("sun_levels must be a positive value".into()));
        }
        Ok(())
    }
}
