//! Canopy Simulation Engine
//!
//! Genetically encoded trees grow on a grid that wraps horizontally and
//! compete for sunlight, one simulated year per tick. Grid cells and trees
//! are entities in a `hecs` world.

pub mod components;
pub mod config;
pub mod error;
pub mod export;
pub mod genetics;
pub mod grid;
pub mod lifecycle;
pub mod systems;
pub mod view;
pub mod world;

pub use components::*;
pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use export::{ExportData, ExportedTree, SaveStats};
pub use genetics::{Gene, GeneSampler, Genom, Predicate, Protein, NUM_GENES};
pub use grid::Grid;
pub use world::SimulationWorld;
