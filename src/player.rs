//! The single actor. Holds only its position; every change goes through the grid.

use crate::grid::{Grid, offset};
use crate::theme::Theme;
use crate::tile::{DrawCommand, Glyph, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    x: usize,
    y: usize,
}

impl Player {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    pub fn position(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn draw(&self, theme: &Theme) -> DrawCommand {
        DrawCommand::new(theme.player, Glyph::Solid, self.x, self.y)
    }

    pub fn move_horizontal(&mut self, grid: &mut Grid, dx: isize) {
        let (x, y) = self.position();
        grid.move_horizontal(self, x, y, dx);
    }

    pub fn move_vertical(&mut self, grid: &mut Grid, dy: isize) {
        let (x, y) = self.position();
        grid.move_vertical(self, x, y, dy);
    }

    /// Walk into the neighbouring cell. Called by tiles that accept the player.
    pub fn step(&mut self, grid: &mut Grid, dx: isize, dy: isize) {
        let target = offset(self.x, dx, grid.width()).zip(offset(self.y, dy, grid.height()));
        if let Some((nx, ny)) = target {
            self.move_to_tile(grid, nx, ny);
        }
    }

    pub fn push_horizontal(&mut self, grid: &mut Grid, tile: Tile, dx: isize) {
        let (x, y) = self.position();
        grid.push_horizontal(self, tile, x, y, dx);
    }

    pub fn move_to_tile(&mut self, grid: &mut Grid, new_x: usize, new_y: usize) {
        grid.move_player(self.x, self.y, new_x, new_y);
        self.x = new_x;
        self.y = new_y;
    }
}
