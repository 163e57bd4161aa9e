//! One-way JSON export of the simulation state
//!
//! There is no loader: a running simulation cannot be resumed from a dump.

use std::path::Path;

use serde::Serialize;

use crate::components::*;
use crate::error::{Error, Result};
use crate::genetics::{Gene, Protein};
use crate::world::SimulationWorld;

/// Schema version written into every export
pub const EXPORT_VERSION: u8 = 1;

// ============================================================================
// Export Data Structures
// ============================================================================

/// Complete world snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub version: u8,
    pub year: u64,
    pub width: u32,
    pub height: u32,
    pub trees: Vec<ExportedTree>,
}

/// Single tree with its genome, cells and state payload
#[derive(Debug, Clone, Serialize)]
pub struct ExportedTree {
    pub entity: u32,
    pub energy: i32,
    pub genom: Vec<ExportedGene>,
    pub alive_cells: Vec<ExportedCell>,
    pub dead_cells: Vec<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub living: Option<Living>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub falling: Option<Falling>,
}

/// Growth-front cell together with the gene it carries
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExportedCell {
    pub x: u32,
    pub y: u32,
    pub active_gene: u8,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExportedGene {
    pub up: ExportedProtein,
    pub down: ExportedProtein,
    pub left: ExportedProtein,
    pub right: ExportedProtein,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExportedProtein {
    pub predicate: &'static str,
    pub parameter: u8,
    #[serde(rename = "nextGene")]
    pub next_gene: u8,
}

impl From<&Protein> for ExportedProtein {
    fn from(protein: &Protein) -> Self {
        Self {
            predicate: protein.predicate.as_str(),
            parameter: protein.parameter,
            next_gene: protein.next_gene,
        }
    }
}

impl From<&Gene> for ExportedGene {
    fn from(gene: &Gene) -> Self {
        Self {
            up: gene.protein(Direction::Up).into(),
            down: gene.protein(Direction::Down).into(),
            left: gene.protein(Direction::Left).into(),
            right: gene.protein(Direction::Right).into(),
        }
    }
}

/// Result of writing an export to disk
#[derive(Debug, Clone)]
pub struct SaveStats {
    pub trees: u32,
    pub file_bytes: u64,
}

// ============================================================================
// Export Implementation
// ============================================================================

impl SimulationWorld {
    /// Snapshot a single tree
    pub fn export_tree(&self, entity: hecs::Entity) -> Result<ExportedTree> {
        let tree = self.registry.get::<&Tree>(entity)?;
        let living = self.registry.get::<&Living>(entity).ok().map(|l| *l);
        let falling = self.registry.get::<&Falling>(entity).ok().map(|f| *f);
        if living.is_none() && falling.is_none() {
            return Err(Error::Inconsistent(format!(
                "tree {:?} is neither living nor falling",
                entity
            )));
        }

        let alive_cells = tree
            .alive_cells
            .iter()
            .map(|&pos| {
                let cell = self.cell_at(pos)?.ok_or_else(|| {
                    Error::Inconsistent(format!(
                        "tree {:?} lists empty cell ({}, {})",
                        entity, pos.x, pos.y
                    ))
                })?;
                Ok(ExportedCell {
                    x: pos.x,
                    y: pos.y,
                    active_gene: cell.active_gene,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ExportedTree {
            entity: entity.id(),
            energy: tree.energy,
            genom: tree.genom.genes().iter().map(ExportedGene::from).collect(),
            alive_cells,
            dead_cells: tree.dead_cells.clone(),
            living,
            falling,
        })
    }

    pub fn export_data(&self) -> Result<ExportData> {
        let entities: Vec<hecs::Entity> = self
            .registry
            .query::<&Tree>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();

        let trees = entities
            .into_iter()
            .map(|entity| self.export_tree(entity))
            .collect::<Result<Vec<_>>>()?;

        Ok(ExportData {
            version: EXPORT_VERSION,
            year: self.year(),
            width: self.grid.width(),
            height: self.grid.height(),
            trees,
        })
    }

    /// Export entire world state to a pretty-printed JSON string
    pub fn export_world(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export_data()?)?)
    }

    /// Write the JSON export to `path`
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<SaveStats> {
        let data = self.export_data()?;
        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(path, &json)?;
        Ok(SaveStats {
            trees: data.trees.len() as u32,
            file_bytes: json.len() as u64,
        })
    }
}
