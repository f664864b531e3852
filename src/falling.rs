//! Gravity state carried by stones and boxes.

use crate::grid::Grid;
use crate::player::Player;
use crate::tile::Tile;

/// Resting blocks can be pushed; falling blocks drop one row per sweep step and
/// ignore pushes. The state is recomputed every tick from the tile below, so
/// the stored value only matters between two sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallingState {
    Resting,
    Falling,
}

impl FallingState {
    pub fn is_falling(self) -> bool {
        matches!(self, Self::Falling)
    }

    /// Re-evaluate the block at `(x, y)` against the tile beneath it and drop
    /// it one row if unsupported. `with_state` rebuilds the block with the new
    /// state so stones stay stones and boxes stay boxes.
    pub fn update(
        grid: &mut Grid,
        x: usize,
        y: usize,
        with_state: fn(FallingState) -> Tile,
    ) {
        let state = grid.block_on_top_state(x, y + 1);
        let tile = with_state(state);
        match state {
            Self::Falling => grid.drop_tile(tile, x, y),
            Self::Resting => grid.set(x, y, tile),
        }
    }

    pub fn move_horizontal(self, grid: &mut Grid, player: &mut Player, tile: Tile, dx: isize) {
        match self {
            Self::Falling => {}
            Self::Resting => player.push_horizontal(grid, tile, dx),
        }
    }
}
