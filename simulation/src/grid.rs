//! Fixed-size grid of placeholder entities, wrapping horizontally only.

use crate::components::{Direction, Position};
use crate::error::{Error, Result};

/// One store entity per coordinate, row-major with row 0 at the ground.
///
/// The entities live as long as the grid; only the components attached to
/// them change while vegetation grows, dies and falls.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    field: Vec<hecs::Entity>,
}

impl Grid {
    /// Spawn `width * height` component-less entities in `registry`
    pub fn new(registry: &mut hecs::World, width: u32, height: u32) -> Self {
        let size = width as usize * height as usize;
        let mut field = Vec::with_capacity(size);
        for _ in 0..size {
            field.push(registry.spawn(()));
        }
        Self {
            width,
            height,
            field,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    /// Entity at `pos`, out-of-range coordinates are rejected
    pub fn at(&self, pos: Position) -> Result<hecs::Entity> {
        if !self.contains(pos) {
            return Err(Error::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.field[self.pos_to_index(pos)])
    }

    /// Neighbour of `pos` toward `dir`. The x axis wraps, `None` when the
    /// step would leave the grid vertically.
    pub fn neighbor(&self, pos: Position, dir: Direction) -> Option<Position> {
        match dir {
            Direction::Left => {
                let x = if pos.x == 0 { self.width - 1 } else { pos.x - 1 };
                Some(Position::new(x, pos.y))
            }
            Direction::Right => {
                let x = if pos.x + 1 >= self.width { 0 } else { pos.x + 1 };
                Some(Position::new(x, pos.y))
            }
            Direction::Down => pos.y.checked_sub(1).map(|y| Position::new(pos.x, y)),
            Direction::Up => {
                let y = pos.y + 1;
                (y < self.height).then(|| Position::new(pos.x, y))
            }
        }
    }

    fn pos_to_index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Get position from index
    pub fn index_to_pos(&self, index: usize) -> Position {
        let x = (index % self.width as usize) as u32;
        let y = (index / self.width as usize) as u32;
        Position::new(x, y)
    }

    /// Iterator over all positions with their entities
    pub fn iter(&self) -> impl Iterator<Item = (Position, hecs::Entity)> + '_ {
        self.field
            .iter()
            .enumerate()
            .map(move |(i, entity)| (self.index_to_pos(i), *entity))
    }
}
