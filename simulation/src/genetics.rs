//! Genetic growth rules.
//!
//! A [`Genom`] is a fixed bank of [`Gene`]s. Every grid cell of a tree points
//! at one gene (its active gene), and that gene holds one [`Protein`] per
//! direction. A protein is a predicate deciding whether the cell may grow in
//! its direction, plus the gene index the new cell will carry.

use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Uniform};

use crate::components::{Cell, Direction, Living, Position, Tree};
use crate::error::{Error, Result};

/// Number of gene slots in every genome
pub const NUM_GENES: usize = 16;

/// Energy predicates compare against `parameter * ENERGY_PER_PARAMETER`
pub const ENERGY_PER_PARAMETER: i32 = 50;

/// Upper bound (inclusive) of randomly rolled parameters and gene indices.
/// Only indices below [`NUM_GENES`] propagate, so about half of all rolled
/// transitions are inert.
pub const MAX_RANDOM_VALUE: u8 = ((NUM_GENES - 1) << 1) as u8;

/// Chance that a single protein is re-rolled when a gene is generated
pub const PROTEIN_REROLL_CHANCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Predicate {
    None,
    EnergyLess,
    EnergyGreater,
    HeightLess,
    HeightGreater,
    AgeLess,
    AgeGreater,
}

impl Predicate {
    /// Roll table for random proteins, `None` is three times as likely
    const ROLL_TABLE: [Predicate; 9] = [
        Predicate::None,
        Predicate::None,
        Predicate::None,
        Predicate::EnergyLess,
        Predicate::EnergyGreater,
        Predicate::HeightLess,
        Predicate::HeightGreater,
        Predicate::AgeLess,
        Predicate::AgeGreater,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Predicate::None => "none",
            Predicate::EnergyLess => "energy_less",
            Predicate::EnergyGreater => "energy_greater",
            Predicate::HeightLess => "height_less",
            Predicate::HeightGreater => "height_greater",
            Predicate::AgeLess => "age_less",
            Predicate::AgeGreater => "age_greater",
        }
    }
}

/// Growth rule for one direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Protein {
    pub predicate: Predicate,
    pub parameter: u8,
    pub next_gene: u8,
}

impl Default for Protein {
    fn default() -> Self {
        Self {
            predicate: Predicate::None,
            parameter: 0,
            next_gene: MAX_RANDOM_VALUE,
        }
    }
}

impl Protein {
    pub fn new(predicate: Predicate, parameter: u8, next_gene: u8) -> Self {
        Self {
            predicate,
            parameter,
            next_gene,
        }
    }

    /// Gene index for cells grown by this protein, `None` when the
    /// transition points outside the genome and must not propagate
    pub fn next_gene_index(&self) -> Option<u8> {
        ((self.next_gene as usize) < NUM_GENES).then_some(self.next_gene)
    }
}

/// State of the owning tree that predicates are evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthContext {
    pub energy: i32,
    pub age: u32,
}

impl GrowthContext {
    /// Read the context of `tree` from the store. The tree must be living.
    pub fn of(world: &hecs::World, tree: hecs::Entity) -> Result<Self> {
        let energy = world.get::<&Tree>(tree)?.energy;
        let age = world.get::<&Living>(tree)?.age;
        Ok(Self { energy, age })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gene {
    pub proteins: [Protein; 4],
}

impl Gene {
    /// Gene with the same protein in every direction
    pub fn uniform(protein: Protein) -> Self {
        Self {
            proteins: [protein; 4],
        }
    }

    pub fn protein(&self, dir: Direction) -> &Protein {
        &self.proteins[dir.index()]
    }

    /// Evaluate the predicate for `dir` at the source position `pos`
    pub fn evaluate(&self, dir: Direction, ctx: &GrowthContext, pos: Position) -> bool {
        let protein = self.protein(dir);
        let parameter = protein.parameter as u32;
        let energy_threshold = protein.parameter as i32 * ENERGY_PER_PARAMETER;
        match protein.predicate {
            Predicate::None => true,
            Predicate::EnergyLess => ctx.energy <= energy_threshold,
            Predicate::EnergyGreater => ctx.energy >= energy_threshold,
            Predicate::HeightLess => pos.y <= parameter,
            Predicate::HeightGreater => pos.y >= parameter,
            Predicate::AgeLess => ctx.age <= parameter,
            Predicate::AgeGreater => ctx.age >= parameter,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Genom {
    genes: [Gene; NUM_GENES],
}

impl Genom {
    pub fn from_genes(genes: [Gene; NUM_GENES]) -> Self {
        Self { genes }
    }

    pub fn genes(&self) -> &[Gene; NUM_GENES] {
        &self.genes
    }

    pub fn gene(&self, index: u8) -> Option<&Gene> {
        self.genes.get(index as usize)
    }

    /// Whether `cell` may grow toward `dir` from `pos`.
    ///
    /// Reads the energy and age of the cell's parent tree; never mutates.
    pub fn grows(
        &self,
        world: &hecs::World,
        cell: &Cell,
        dir: Direction,
        pos: Position,
    ) -> Result<bool> {
        let gene = self.gene(cell.active_gene).ok_or_else(|| {
            Error::Inconsistent(format!(
                "cell at ({}, {}) has active gene {} outside the genome",
                pos.x, pos.y, cell.active_gene
            ))
        })?;
        let ctx = GrowthContext::of(world, cell.parent)?;
        Ok(gene.evaluate(dir, &ctx, pos))
    }
}

/// Random generation and mutation of genes
#[derive(Debug, Clone)]
pub struct GeneSampler {
    reroll: Bernoulli,
    mutation: Bernoulli,
    value: Uniform<u8>,
}

impl GeneSampler {
    pub fn new(mutation_chance: f64) -> Result<Self> {
        let mutation = Bernoulli::new(mutation_chance)
            .map_err(|e| Error::Config(format!("mutation_chance {}: {}", mutation_chance, e)))?;
        let reroll = Bernoulli::new(PROTEIN_REROLL_CHANCE)
            .map_err(|e| Error::Config(e.to_string()))?;
        Ok(Self {
            reroll,
            mutation,
            value: Uniform::new_inclusive(0, MAX_RANDOM_VALUE),
        })
    }

    /// Re-roll each protein of `gene` independently with a 40% chance
    pub fn mutate_gene<R: Rng>(&self, mut gene: Gene, rng: &mut R) -> Gene {
        for protein in gene.proteins.iter_mut() {
            if self.reroll.sample(rng) {
                let roll = rng.gen_range(0..Predicate::ROLL_TABLE.len());
                protein.predicate = Predicate::ROLL_TABLE[roll];
                protein.parameter = self.value.sample(rng);
                protein.next_gene = self.value.sample(rng);
            }
        }
        gene
    }

    pub fn random_gene<R: Rng>(&self, rng: &mut R) -> Gene {
        self.mutate_gene(Gene::default(), rng)
    }

    pub fn random_genom<R: Rng>(&self, rng: &mut R) -> Genom {
        let mut genom = Genom::default();
        for gene in genom.genes.iter_mut() {
            *gene = self.random_gene(rng);
        }
        genom
    }

    /// Copy `genom` for an offspring; at most one gene slot mutates
    pub fn clone_genom<R: Rng>(&self, genom: &Genom, rng: &mut R) -> Genom {
        let mut copy = genom.clone();
        if self.mutation.sample(rng) {
            let slot = rng.gen_range(0..NUM_GENES);
            copy.genes[slot] = self.mutate_gene(copy.genes[slot], rng);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ctx(energy: i32, age: u32) -> GrowthContext {
        GrowthContext { energy, age }
    }

    #[test]
    fn test_none_always_grows() {
        let gene = Gene::uniform(Protein::new(Predicate::None, 0, 0));
        for dir in Direction::ALL {
            assert!(gene.evaluate(dir, &ctx(-100, 0), Position::new(0, 0)));
        }
    }

    #[test]
    fn test_energy_predicates_scale_parameter() {
        let less = Gene::uniform(Protein::new(Predicate::EnergyLess, 2, 0));
        assert!(less.evaluate(Direction::Up, &ctx(100, 0), Position::new(0, 0)));
        assert!(!less.evaluate(Direction::Up, &ctx(101, 0), Position::new(0, 0)));

        let greater = Gene::uniform(Protein::new(Predicate::EnergyGreater, 2, 0));
        assert!(greater.evaluate(Direction::Up, &ctx(100, 0), Position::new(0, 0)));
        assert!(!greater.evaluate(Direction::Up, &ctx(99, 0), Position::new(0, 0)));
    }

    #[test]
    fn test_height_and_age_predicates() {
        let height = Gene::uniform(Protein::new(Predicate::HeightLess, 3, 0));
        assert!(height.evaluate(Direction::Left, &ctx(0, 0), Position::new(9, 3)));
        assert!(!height.evaluate(Direction::Left, &ctx(0, 0), Position::new(9, 4)));

        let age = Gene::uniform(Protein::new(Predicate::AgeGreater, 10, 0));
        assert!(age.evaluate(Direction::Right, &ctx(0, 10), Position::new(0, 0)));
        assert!(!age.evaluate(Direction::Right, &ctx(0, 9), Position::new(0, 0)));
    }

    #[test]
    fn test_next_gene_sentinel() {
        assert_eq!(Protein::new(Predicate::None, 0, 15).next_gene_index(), Some(15));
        assert_eq!(Protein::new(Predicate::None, 0, 16).next_gene_index(), None);
        assert_eq!(Protein::default().next_gene_index(), None);
    }

    #[test]
    fn test_random_values_stay_in_domain() {
        let sampler = GeneSampler::new(0.25).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let genom = sampler.random_genom(&mut rng);
            for gene in genom.genes() {
                for protein in &gene.proteins {
                    assert!(protein.parameter <= MAX_RANDOM_VALUE);
                    assert!(protein.next_gene <= MAX_RANDOM_VALUE);
                }
            }
        }
    }

    #[test]
    fn test_clone_without_mutation_is_exact() {
        let sampler = GeneSampler::new(0.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let genom = sampler.random_genom(&mut rng);
        for _ in 0..20 {
            assert_eq!(sampler.clone_genom(&genom, &mut rng), genom);
        }
    }

    #[test]
    fn test_clone_mutates_at_most_one_gene() {
        let sampler = GeneSampler::new(1.0).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let genom = sampler.random_genom(&mut rng);
        for _ in 0..50 {
            let copy = sampler.clone_genom(&genom, &mut rng);
            let changed = genom
                .genes()
                .iter()
                .zip(copy.genes())
                .filter(|(a, b)| a != b)
                .count();
            assert!(changed <= 1);
        }
    }

    #[test]
    fn test_sampler_rejects_bad_chance() {
        assert!(matches!(GeneSampler::new(1.5), Err(Error::Config(_))));
    }

    #[test]
    fn test_predicate_names() {
        assert_eq!(Predicate::AgeGreater.as_str(), "age_greater");
        assert_eq!(Predicate::HeightLess.as_str(), "height_less");
        assert_eq!(Predicate::None.as_str(), "none");
    }
}
