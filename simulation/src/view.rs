//! Read-only views of the grid for presentation layers.
//!
//! Rendering pulls a snapshot between ticks; nothing here mutates the
//! simulation.

use crate::components::{CellType, Falling, Living, Position};
use crate::error::{Error, Result};
use crate::world::SimulationWorld;

pub const BLACK: u8 = 0;
pub const WHITE: u8 = 7;

/// What occupies a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    /// Cell held by a falling seed
    Seed,
    Active { color: u8 },
    Dead { color: u8 },
}

impl SimulationWorld {
    /// Snapshot of the cell at `(x, y)`
    pub fn inspect(&self, x: u32, y: u32) -> Result<CellView> {
        let Some(cell) = self.cell_at(Position::new(x, y))? else {
            return Ok(CellView::Empty);
        };
        let owner = self.registry.entity(cell.parent).map_err(|_| {
            Error::Inconsistent(format!("cell ({}, {}) has a stale parent", x, y))
        })?;
        if let Some(living) = owner.get::<&Living>() {
            Ok(match cell.cell_type {
                CellType::Active => CellView::Active { color: living.color_index },
                CellType::Dead => CellView::Dead { color: living.color_index },
            })
        } else if owner.has::<Falling>() {
            Ok(CellView::Seed)
        } else {
            Err(Error::Inconsistent(format!(
                "cell ({}, {}) belongs to an entity that is not a tree",
                x, y
            )))
        }
    }
}

/// Output surface a [`Renderer`] draws onto. Colors: 0 black, 1 red,
/// 2 green, 3 yellow, 4 blue, 5 magenta, 6 cyan, 7 white.
pub trait Display {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn begin(&mut self) {}
    fn end(&mut self) {}
    /// Draw `ch` at display row `row` (0 is the top) and column `col`
    fn draw(&mut self, row: u32, col: u32, ch: char, color: u8);
    fn on_scroll(&mut self, _camera: Camera) {}
}

/// Bottom-left corner of the viewport in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Camera {
    pub x: u32,
    pub y: u32,
}

impl Camera {
    /// Move by `(dx, dy)` and clamp into
    /// `[0, world_w - view_w] x [0, world_h - view_h]`
    pub fn scroll(&mut self, dx: i32, dy: i32, world: (u32, u32), view: (u32, u32)) {
        let max_x = world.0.saturating_sub(view.0) as i64;
        let max_y = world.1.saturating_sub(view.1) as i64;
        self.x = (self.x as i64 + dx as i64).clamp(0, max_x) as u32;
        self.y = (self.y as i64 + dy as i64).clamp(0, max_y) as u32;
    }
}

pub struct Renderer<D> {
    pub display: D,
    pub camera: Camera,
}

impl<D: Display> Renderer<D> {
    pub fn new(display: D) -> Self {
        Self {
            display,
            camera: Camera::default(),
        }
    }

    pub fn scroll(&mut self, world: &SimulationWorld, dx: i32, dy: i32) {
        let view = (self.display.width(), self.display.height());
        self.camera
            .scroll(dx, dy, (world.grid.width(), world.grid.height()), view);
        self.display.on_scroll(self.camera);
    }

    /// Draw the part of the world under the camera, ground at the bottom
    pub fn render(&mut self, world: &SimulationWorld) -> Result<()> {
        let (width, height) = (self.display.width(), self.display.height());
        self.display.begin();
        for col in 0..width {
            for j in 0..height {
                let row = height - j - 1;
                let (x, y) = (self.camera.x + col, self.camera.y + j);
                if x >= world.grid.width() || y >= world.grid.height() {
                    self.display.draw(row, col, ' ', BLACK);
                    continue;
                }
                match world.inspect(x, y)? {
                    CellView::Empty => self.display.draw(row, col, ' ', BLACK),
                    CellView::Seed => self.display.draw(row, col, '$', WHITE),
                    CellView::Active { color } => self.display.draw(row, col, '$', color),
                    CellView::Dead { color } => self.display.draw(row, col, ' ', color),
                }
            }
        }
        self.display.end();
        Ok(())
    }
}

/// In-memory character display. Trunk cells, which a color terminal shows
/// as a colored blank, are written as `#`.
#[derive(Debug, Clone)]
pub struct TextDisplay {
    width: u32,
    height: u32,
    rows: Vec<Vec<char>>,
}

impl TextDisplay {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![' '; width as usize]; height as usize],
        }
    }

    /// Current frame, top row first
    pub fn frame(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Display for TextDisplay {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn begin(&mut self) {
        for row in self.rows.iter_mut() {
            row.fill(' ');
        }
    }

    fn draw(&mut self, row: u32, col: u32, ch: char, color: u8) {
        let ch = if ch == ' ' && color != BLACK { '#' } else { ch };
        if let Some(slot) = self
            .rows
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
        {
            *slot = ch;
        }
    }
}
