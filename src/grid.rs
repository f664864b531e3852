//! Grid: the tile array. Sole owner of tile placement; tiles decide what a
//! move means, the grid carries it out.
//!
//! y=0 is the top row. Cells outside the grid behave like unbreakable wall:
//! nothing enters them, nothing lands on them, and a block on the bottom row
//! rests on the edge.

use crate::falling::FallingState;
use crate::key::RemoveStrategy;
use crate::level::Level;
use crate::player::Player;
use crate::theme::Theme;
use crate::tile::{DrawCommand, Tile};
use tracing::debug;

/// `v + d` if it stays inside `0..len`.
pub fn offset(v: usize, d: isize, len: usize) -> Option<usize> {
    v.checked_add_signed(d).filter(|&n| n < len)
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    /// rows[y][x]
    rows: Vec<Vec<Tile>>,
    /// Locks cleared since the last `take_cleared`, with the tile they held.
    cleared: Vec<(usize, usize, Tile)>,
}

impl Grid {
    pub fn from_level(level: &Level) -> Self {
        let rows: Vec<Vec<Tile>> = level
            .rows()
            .iter()
            .map(|row| row.iter().map(|raw| raw.to_tile()).collect())
            .collect();
        Self {
            width: level.width(),
            height: level.height(),
            rows,
            cleared: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, tile: Tile) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = tile;
        }
    }

    /// Render instructions for every non-empty cell, row by row.
    pub fn draw(&self, theme: &Theme) -> Vec<DrawCommand> {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter_map(move |(x, tile)| tile.draw(theme, x, y))
            })
            .collect()
    }

    /// Gravity sweep, bottom row first. A block that drops lands in a row
    /// already visited, and the cell it left is seen as air by the block
    /// above it, so unsupported stacks cascade within one sweep.
    pub fn update(&mut self) {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let tile = self.rows[y][x];
                tile.update(self, x, y);
            }
        }
    }

    pub fn drop_tile(&mut self, tile: Tile, x: usize, y: usize) {
        self.set(x, y + 1, tile);
        self.set(x, y, Tile::Air);
    }

    /// State for a block resting on `(x, y)`. Off-grid counts as solid.
    pub fn block_on_top_state(&self, x: usize, y: usize) -> FallingState {
        self.get(x, y)
            .map_or(FallingState::Resting, Tile::block_on_top_state)
    }

    /// Only called once a tile has accepted the move.
    pub fn move_player(&mut self, x: usize, y: usize, new_x: usize, new_y: usize) {
        self.set(x, y, Tile::Air);
        self.set(new_x, new_y, Tile::PlayerOccupancy);
    }

    pub fn move_horizontal(&mut self, player: &mut Player, x: usize, y: usize, dx: isize) {
        if let Some(tile) = offset(x, dx, self.width).and_then(|nx| self.get(nx, y)) {
            tile.move_horizontal(self, player, dx);
        }
    }

    pub fn move_vertical(&mut self, player: &mut Player, x: usize, y: usize, dy: isize) {
        if let Some(tile) = offset(y, dy, self.height).and_then(|ny| self.get(x, ny)) {
            tile.move_vertical(self, player, dy);
        }
    }

    /// Replace every tile matching `strategy` with air. Returns the count.
    pub fn remove(&mut self, strategy: RemoveStrategy) -> usize {
        let mut removed = 0;
        for (y, row) in self.rows.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                if strategy.check(*cell) {
                    self.cleared.push((x, y, *cell));
                    *cell = Tile::Air;
                    removed += 1;
                }
            }
        }
        debug!(?strategy, removed, "locks removed");
        removed
    }

    /// Player at `(x, y)` pushes `tile` sitting at `(x + dx, y)`. The landing
    /// cell two steps away must be air and must itself be supported.
    pub fn push_horizontal(&mut self, player: &mut Player, tile: Tile, x: usize, y: usize, dx: isize) {
        let Some(block_x) = offset(x, dx, self.width) else {
            return;
        };
        let Some(landing_x) = offset(x, 2 * dx, self.width) else {
            return;
        };
        let landing_free = self.get(landing_x, y).is_some_and(Tile::is_air);
        let landing_supported = !self.get(landing_x, y + 1).is_some_and(Tile::is_air);
        if landing_free && landing_supported {
            self.set(landing_x, y, tile);
            player.move_to_tile(self, block_x, y);
            debug!(from = block_x, to = landing_x, y, "block pushed");
        }
    }

    /// Lock cells cleared since the previous call.
    pub fn take_cleared(&mut self) -> Vec<(usize, usize, Tile)> {
        std::mem::take(&mut self.cleared)
    }

    pub fn count(&self, pred: impl Fn(Tile) -> bool) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|tile| pred(**tile))
            .count()
    }

    pub fn locks_remaining(&self) -> usize {
        self.count(|t| t.is_lock1() || t.is_lock2())
    }

    pub fn falling_blocks(&self) -> usize {
        self.count(|t| t.falling_state().is_some_and(FallingState::is_falling))
    }
}

/// One string per row in the level legend, for comparing grid states in tests.
#[cfg(test)]
pub fn snapshot(grid: &Grid) -> Vec<String> {
    grid.rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|tile| match tile {
                    Tile::Air => '.',
                    Tile::Flux => ':',
                    Tile::Unbreakable => '#',
                    Tile::PlayerOccupancy => 'P',
                    Tile::Stone(FallingState::Resting) => 'o',
                    Tile::Stone(FallingState::Falling) => 'O',
                    Tile::Box(FallingState::Resting) => 'b',
                    Tile::Box(FallingState::Falling) => 'B',
                    Tile::Key(c) if c.is_first() => 'k',
                    Tile::Key(_) => 'j',
                    Tile::Lock(c) if c.is_first() => 'K',
                    Tile::Lock(_) => 'J',
                })
                .collect()
        })
        .collect()
}
