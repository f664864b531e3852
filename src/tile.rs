//! Tile variants and how each one reacts to being entered, updated or drawn.
//! Tiles are plain values; the grid replaces them in place, never mutates them.

use crate::falling::FallingState;
use crate::grid::Grid;
use crate::key::KeyConfiguration;
use crate::player::Player;
use crate::theme::Theme;
use ratatui::style::Color;

/// Edge length of one cell in render units.
pub const TILE_SIZE: u16 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Air,
    Flux,
    Unbreakable,
    /// Marks the player's cell. The actor itself is [`Player`].
    PlayerOccupancy,
    Stone(FallingState),
    Box(FallingState),
    Key(&'static KeyConfiguration),
    Lock(&'static KeyConfiguration),
}

/// How a renderer should fill a cell. Colour carries the meaning; the glyph
/// only helps terminals tell keys from locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Solid,
    Key,
    Lock,
}

/// One render instruction: fill grid cell `(x, y)` with `color`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub color: Color,
    pub glyph: Glyph,
    pub x: usize,
    pub y: usize,
    /// Edge length in render units (always `TILE_SIZE`). Reserved for pixel renderers.
    #[allow(dead_code)]
    pub size: u16,
}

impl DrawCommand {
    pub fn new(color: Color, glyph: Glyph, x: usize, y: usize) -> Self {
        Self {
            color,
            glyph,
            x,
            y,
            size: TILE_SIZE,
        }
    }
}

impl Tile {
    pub fn is_air(self) -> bool {
        matches!(self, Self::Air)
    }

    pub fn is_lock1(self) -> bool {
        matches!(self, Self::Lock(config) if config.is_first())
    }

    pub fn is_lock2(self) -> bool {
        matches!(self, Self::Lock(config) if !config.is_first())
    }

    /// Falling state of a stone or box; `None` for everything else.
    pub fn falling_state(self) -> Option<FallingState> {
        match self {
            Self::Stone(state) | Self::Box(state) => Some(state),
            _ => None,
        }
    }

    pub fn draw(self, theme: &Theme, x: usize, y: usize) -> Option<DrawCommand> {
        let (color, glyph) = match self {
            Self::Air | Self::PlayerOccupancy => return None,
            Self::Flux => (theme.flux, Glyph::Solid),
            Self::Unbreakable => (theme.unbreakable, Glyph::Solid),
            Self::Stone(_) => (theme.stone, Glyph::Solid),
            Self::Box(_) => (theme.box_fill, Glyph::Solid),
            Self::Key(config) => (config.color(theme), Glyph::Key),
            Self::Lock(config) => (config.color(theme), Glyph::Lock),
        };
        Some(DrawCommand::new(color, glyph, x, y))
    }

    /// The player tries to step sideways into this tile.
    pub fn move_horizontal(self, grid: &mut Grid, player: &mut Player, dx: isize) {
        match self {
            Self::Air | Self::Flux => player.step(grid, dx, 0),
            Self::Unbreakable | Self::PlayerOccupancy | Self::Lock(_) => {}
            Self::Stone(state) | Self::Box(state) => state.move_horizontal(grid, player, self, dx),
            Self::Key(config) => {
                config.remove_lock(grid);
                player.step(grid, dx, 0);
            }
        }
    }

    /// The player tries to step up or down into this tile.
    pub fn move_vertical(self, grid: &mut Grid, player: &mut Player, dy: isize) {
        match self {
            Self::Air | Self::Flux => player.step(grid, 0, dy),
            Self::Unbreakable
            | Self::PlayerOccupancy
            | Self::Lock(_)
            | Self::Stone(_)
            | Self::Box(_) => {}
            Self::Key(config) => {
                config.remove_lock(grid);
                player.step(grid, 0, dy);
            }
        }
    }

    /// Gravity step for the cell at `(x, y)`. Only stones and boxes react.
    pub fn update(self, grid: &mut Grid, x: usize, y: usize) {
        match self {
            Self::Stone(_) => FallingState::update(grid, x, y, Self::Stone),
            Self::Box(_) => FallingState::update(grid, x, y, Self::Box),
            _ => {}
        }
    }

    /// State a block sitting directly on this tile should adopt.
    pub fn block_on_top_state(self) -> FallingState {
        match self {
            Self::Air => FallingState::Falling,
            _ => FallingState::Resting,
        }
    }
}
