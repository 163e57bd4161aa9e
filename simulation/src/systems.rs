//! ECS Systems - the passes run once per simulated year
//!
//! Order matters: growth and sunlight assume no seed is mid-fall, and
//! sunlight assumes this year's growth has settled.

pub mod physics;
pub mod growth;
pub mod sun;

pub use physics::physics_system;
pub use growth::growth_system;
pub use sun::{sun_system, CELL_UPKEEP};
