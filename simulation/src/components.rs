//! ECS Components for grid cells and trees

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::genetics::Genom;

// ============================================================================
// Geometry
// ============================================================================

/// Grid coordinate, `y = 0` is ground level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Growth direction. The declaration order is the order growth is attempted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Down,
    Up,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Down,
        Direction::Up,
        Direction::Right,
    ];

    /// Slot of this direction inside a gene
    pub fn index(self) -> usize {
        self as usize
    }
}

// ============================================================================
// Grid Cell Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellType {
    /// Growth front
    Active,
    /// Settled trunk
    Dead,
}

/// Marks a grid entity as occupied by tree tissue.
///
/// `parent` is a plain handle to the owning tree. It never owns the tree and
/// may be stale, so lookups through it must be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub parent: hecs::Entity,
    pub active_gene: u8,
    pub cell_type: CellType,
}

impl Cell {
    pub fn active(parent: hecs::Entity, active_gene: u8) -> Self {
        Self {
            parent,
            active_gene,
            cell_type: CellType::Active,
        }
    }
}

// ============================================================================
// Tree Components
// ============================================================================

/// A simulated plant: energy balance, genome and the cells it occupies
#[derive(Debug, Clone)]
pub struct Tree {
    pub energy: i32,
    pub genom: Genom,
    /// Growth front, newest positions at the front
    pub alive_cells: VecDeque<Position>,
    /// Trunk, in the order cells settled
    pub dead_cells: Vec<Position>,
}

impl Tree {
    pub fn new(energy: i32, genom: Genom) -> Self {
        Self {
            energy,
            genom,
            alive_cells: VecDeque::new(),
            dead_cells: Vec::new(),
        }
    }

    /// Tree occupying a single position, used for fresh spawns and seeds
    pub fn rooted_at(energy: i32, genom: Genom, pos: Position) -> Self {
        let mut tree = Self::new(energy, genom);
        tree.alive_cells.push_back(pos);
        tree
    }

    pub fn cell_count(&self) -> usize {
        self.alive_cells.len() + self.dead_cells.len()
    }

    /// Every position owned by the tree, growth front first
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.alive_cells.iter().chain(self.dead_cells.iter()).copied()
    }
}

/// Tree is a mature, growing plant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Living {
    pub color_index: u8,
    pub age: u32,
    pub max_age: u32,
}

impl Living {
    pub fn is_expired(&self) -> bool {
        self.age >= self.max_age
    }
}

/// Tree is an airborne seed descending toward the ground
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Falling {
    /// Rows descended so far
    pub fallen: u32,
}
