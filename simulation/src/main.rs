//! Headless driver: grows a forest and dumps it to `dump.json`.
//!
//! Reads an optional JSON configuration from the path in `CANOPY_CONFIG`.

use canopy::view::{Renderer, TextDisplay};
use canopy::{SimulationConfig, SimulationWorld};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const YEARS: u32 = 1000;
const REPORT_EVERY: u32 = 100;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match std::env::var("CANOPY_CONFIG") {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            SimulationConfig::load(&path)?
        }
        Err(_) => SimulationConfig::default(),
    };

    info!(
        "Creating {}x{} world with {} trees",
        config.width, config.height, config.num_seed_trees
    );
    let mut world = SimulationWorld::from_config(config)?;

    let start = std::time::Instant::now();
    let mut years = 0;
    while years < YEARS {
        let performed = world.run_years(REPORT_EVERY.min(YEARS - years))?;
        years += performed;
        info!(
            "Year {:5}: {} trees ({} living, {} seeds)",
            world.year(),
            world.tree_count(),
            world.living_count(),
            world.falling_count()
        );
        if world.tree_count() == 0 {
            warn!("No life left after {} years", world.year());
            break;
        }
    }
    let elapsed = start.elapsed();
    info!(
        "Simulated {} years in {:?} ({:?} per year)",
        years,
        elapsed,
        elapsed / years.max(1)
    );

    let mut renderer = Renderer::new(TextDisplay::new(
        world.grid.width().min(120),
        world.grid.height(),
    ));
    renderer.render(&world)?;
    println!("{}", renderer.display.frame());

    let stats = world.save_to_file("dump.json")?;
    info!("Dumped {} trees ({} bytes) to dump.json", stats.trees, stats.file_bytes);

    Ok(())
}
