//! Key sets: which colour a key/lock pair draws in and which locks a key clears.

use crate::grid::Grid;
use crate::theme::Theme;
use crate::tile::Tile;
use ratatui::style::Color;

/// Display colour of a key set. Resolved against the theme at draw time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    Yellow,
    Blue,
}

/// Predicate used by [`Grid::remove`] to pick the tiles to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveStrategy {
    Lock1,
    Lock2,
}

impl RemoveStrategy {
    pub fn check(self, tile: Tile) -> bool {
        match self {
            Self::Lock1 => tile.is_lock1(),
            Self::Lock2 => tile.is_lock2(),
        }
    }
}

/// Immutable pairing of colour, key-set identity and removal predicate.
/// Keys and locks both point at one of the two statics below.
#[derive(Debug, PartialEq, Eq)]
pub struct KeyConfiguration {
    color: KeyColor,
    first: bool,
    remove_strategy: RemoveStrategy,
}

pub static YELLOW_KEY: KeyConfiguration = KeyConfiguration {
    color: KeyColor::Yellow,
    first: true,
    remove_strategy: RemoveStrategy::Lock1,
};

pub static BLUE_KEY: KeyConfiguration = KeyConfiguration {
    color: KeyColor::Blue,
    first: false,
    remove_strategy: RemoveStrategy::Lock2,
};

impl KeyConfiguration {
    /// True for key set 1 (yellow).
    pub fn is_first(&self) -> bool {
        self.first
    }

    pub fn color(&self, theme: &Theme) -> Color {
        theme.key_color(self.color)
    }

    /// Clear every lock this key opens. Returns how many were removed.
    pub fn remove_lock(&self, grid: &mut Grid) -> usize {
        grid.remove(self.remove_strategy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::falling::FallingState;

    #[test]
    fn test_strategy_matches_lock_of_same_set_only() {
        assert!(RemoveStrategy::Lock1.check(Tile::Lock(&YELLOW_KEY)));
        assert!(!RemoveStrategy::Lock1.check(Tile::Lock(&BLUE_KEY)));
        assert!(RemoveStrategy::Lock2.check(Tile::Lock(&BLUE_KEY)));
        assert!(!RemoveStrategy::Lock2.check(Tile::Lock(&YELLOW_KEY)));
    }

    #[test]
    fn test_strategy_ignores_keys_and_blocks() {
        for tile in [
            Tile::Key(&YELLOW_KEY),
            Tile::Key(&BLUE_KEY),
            Tile::Air,
            Tile::Box(FallingState::Resting),
        ] {
            assert!(!RemoveStrategy::Lock1.check(tile));
            assert!(!RemoveStrategy::Lock2.check(tile));
        }
    }

    #[test]
    fn test_key_colours_come_from_theme() {
        let theme = Theme::default();
        assert_eq!(YELLOW_KEY.color(&theme), theme.key1);
        assert_eq!(BLUE_KEY.color(&theme), theme.key2);
    }
}
