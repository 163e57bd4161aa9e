use canopy::lifecycle;
use canopy::{
    Cell, CellType, Falling, Gene, Genom, Living, Position, Predicate, Protein, SimulationConfig,
    SimulationWorld, Tree, NUM_GENES,
};
use proptest::prelude::*;

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        width: 60,
        height: 24,
        num_seed_trees: 8,
        rng_seed: seed,
        ..Default::default()
    }
}

fn grid_snapshot(world: &SimulationWorld) -> Vec<Option<(CellType, u8)>> {
    world
        .grid
        .iter()
        .map(|(pos, _)| {
            world
                .cell_at(pos)
                .unwrap()
                .map(|cell| (cell.cell_type, cell.active_gene))
        })
        .collect()
}

#[test]
fn test_long_run_keeps_invariants() {
    let mut world = SimulationWorld::from_config(config(12345)).unwrap();
    for _ in 0..300 {
        let alive = world.tick(5, 3).unwrap();
        world.validate().unwrap();
        assert!(world.entity_count() <= 60 * 24 + world.tree_count());
        if !alive {
            break;
        }
    }
}

#[test]
fn test_same_seed_same_world() {
    let mut a = SimulationWorld::from_config(config(77)).unwrap();
    let mut b = SimulationWorld::from_config(config(77)).unwrap();
    for _ in 0..150 {
        assert_eq!(a.tick(5, 3).unwrap(), b.tick(5, 3).unwrap());
    }
    assert_eq!(grid_snapshot(&a), grid_snapshot(&b));
    assert_eq!(a.export_world().unwrap(), b.export_world().unwrap());
}

#[test]
fn test_all_none_genome_grows_every_way() {
    let mut world = SimulationWorld::new(config(1)).unwrap();
    let tree = lifecycle::spawn(&mut world, 10, 300).unwrap();
    world.registry.get::<&mut Tree>(tree).unwrap().genom =
        Genom::from_genes([Gene::uniform(Protein::new(Predicate::None, 0, 3)); NUM_GENES]);

    lifecycle::grow(&mut world, tree).unwrap();

    let t = world.registry.get::<&Tree>(tree).unwrap();
    // Downward growth from the ground row is rejected
    assert_eq!(t.alive_cells.len(), 3);
    assert_eq!(t.dead_cells, vec![Position::new(10, 0)]);
    assert!(!t.alive_cells.contains(&Position::new(10, 0)));
}

#[test]
fn test_starving_tree_vanishes_next_tick() {
    let mut world = SimulationWorld::new(config(1)).unwrap();
    let tree = lifecycle::spawn(&mut world, 10, 300).unwrap();
    world.registry.get::<&mut Tree>(tree).unwrap().energy = -1;

    assert!(!world.tick(5, 3).unwrap());
    assert!(!world.registry.contains(tree));
    assert!(world.cell_at(Position::new(10, 0)).unwrap().is_none());
}

#[test]
fn test_old_tree_drops_seeds_that_fall() {
    let mut world = SimulationWorld::new(config(1)).unwrap();
    let tree = lifecycle::spawn(&mut world, 10, 1000).unwrap();
    world.registry.get::<&mut Tree>(tree).unwrap().genom =
        Genom::from_genes([Gene::uniform(Protein::new(Predicate::None, 0, 0)); NUM_GENES]);
    for _ in 0..3 {
        lifecycle::grow(&mut world, tree).unwrap();
    }
    let (energy, front) = {
        let t = world.registry.get::<&Tree>(tree).unwrap();
        (t.energy, t.alive_cells.len() as i32)
    };
    {
        let mut living = world.registry.get::<&mut Living>(tree).unwrap();
        living.age = living.max_age;
    }

    canopy::systems::growth_system(&mut world).unwrap();

    assert_eq!(world.falling_count() as i32, front);
    for (_, t) in world.registry.query::<&Tree>().with::<&Falling>().iter() {
        assert_eq!(t.energy, energy / front);
    }
    world.validate().unwrap();

    // Let every seed land or be crushed
    for _ in 0..5 {
        canopy::systems::physics_system(&mut world).unwrap();
        world.validate().unwrap();
    }
    assert_eq!(world.falling_count(), 0);
    for (_, cell) in world.registry.query::<&Cell>().iter() {
        assert_eq!(cell.active_gene, 0);
    }
    for (_, t) in world.registry.query::<&Tree>().iter() {
        assert_eq!(t.alive_cells[0].y, 0);
    }
}

#[test]
fn test_extinction_reported() {
    let mut world = SimulationWorld::create(30, 10, 2, 1).unwrap();
    let mut ticks = 0;
    while world.tick(-100, 1).unwrap() {
        ticks += 1;
        assert!(ticks < 50, "trees should starve quickly");
    }
    assert_eq!(world.tree_count(), 0);
    assert_eq!(world.entity_count(), 30 * 10);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_ticks_preserve_invariants(
        seed in any::<u64>(),
        width in 20u32..60,
        height in 4u32..20,
        trees in 1u32..4,
        sun_min in -2i32..10,
        sun_levels in 1u32..5,
        ticks in 1usize..120,
    ) {
        let config = SimulationConfig {
            width,
            height,
            num_seed_trees: trees,
            rng_seed: seed,
            mutation_chance: 1.0,
            min_max_age: 5,
            max_max_age: 30,
            ..Default::default()
        };
        let cells = (width * height) as usize;
        let mut world = SimulationWorld::from_config(config).unwrap();
        for _ in 0..ticks {
            let alive = world.tick(sun_min, sun_levels).unwrap();
            prop_assert!(world.validate().is_ok());
            prop_assert_eq!(alive, world.tree_count() > 0);
            prop_assert!(world.entity_count() <= cells + world.tree_count());
            prop_assert_eq!(world.living_count() + world.falling_count(), world.tree_count());
            if !alive {
                break;
            }
        }
        prop_assert!(world.export_world().is_ok());
    }
}
