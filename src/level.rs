//! Level data: raw tile codes, text level files, and the built-in level.
//!
//! ## Text format (one row per line, one character per cell)
//!   '#' = Unbreakable      '.' or ' ' = Air       ':' = Flux
//!   'P' = Player start     'o' = Stone            'O' = Falling stone
//!   'b' = Box              'B' = Falling box
//!   'k' = Key 1 (yellow)   'K' = Lock 1           'j' = Key 2 (blue)   'J' = Lock 2
//!
//! Lines starting with `;` are comments; empty lines are skipped.
//! Levels must be rectangular and contain exactly one player start.

use crate::falling::FallingState;
use crate::key::{BLUE_KEY, YELLOW_KEY};
use crate::tile::Tile;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The closed set of tile codes a level may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTile {
    Air,
    Flux,
    Unbreakable,
    Player,
    Stone,
    FallingStone,
    Box,
    FallingBox,
    Key1,
    Lock1,
    Key2,
    Lock2,
}

impl TryFrom<u8> for RawTile {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Air,
            1 => Self::Flux,
            2 => Self::Unbreakable,
            3 => Self::Player,
            4 => Self::Stone,
            5 => Self::FallingStone,
            6 => Self::Box,
            7 => Self::FallingBox,
            8 => Self::Key1,
            9 => Self::Lock1,
            10 => Self::Key2,
            11 => Self::Lock2,
            other => return Err(other),
        })
    }
}

impl RawTile {
    pub fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '.' | ' ' => Self::Air,
            ':' => Self::Flux,
            '#' => Self::Unbreakable,
            'P' => Self::Player,
            'o' => Self::Stone,
            'O' => Self::FallingStone,
            'b' => Self::Box,
            'B' => Self::FallingBox,
            'k' => Self::Key1,
            'K' => Self::Lock1,
            'j' => Self::Key2,
            'J' => Self::Lock2,
            _ => return None,
        })
    }

    pub fn to_tile(self) -> Tile {
        match self {
            Self::Air => Tile::Air,
            Self::Flux => Tile::Flux,
            Self::Unbreakable => Tile::Unbreakable,
            Self::Player => Tile::PlayerOccupancy,
            Self::Stone => Tile::Stone(FallingState::Resting),
            Self::FallingStone => Tile::Stone(FallingState::Falling),
            Self::Box => Tile::Box(FallingState::Resting),
            Self::FallingBox => Tile::Box(FallingState::Falling),
            Self::Key1 => Tile::Key(&YELLOW_KEY),
            Self::Lock1 => Tile::Lock(&YELLOW_KEY),
            Self::Key2 => Tile::Key(&BLUE_KEY),
            Self::Lock2 => Tile::Lock(&BLUE_KEY),
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("could not read level {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown tile code {code} at row {row}, column {col}")]
    UnknownCode { code: u8, row: usize, col: usize },
    #[error("unknown tile character {ch:?} at row {row}, column {col}")]
    UnknownChar { ch: char, row: usize, col: usize },
    #[error("level has no rows")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("level has no player start")]
    MissingPlayer,
    #[error("level has {count} player starts, expected exactly one")]
    MultiplePlayers { count: usize },
}

/// Built-in level, as raw tile codes.
const BUILTIN_LEVEL: [[u8; 8]; 6] = [
    [2, 2, 2, 2, 2, 2, 2, 2],
    [2, 3, 0, 1, 1, 2, 0, 2],
    [2, 4, 2, 6, 1, 2, 0, 2],
    [2, 8, 4, 1, 1, 2, 0, 2],
    [2, 4, 1, 1, 1, 9, 0, 2],
    [2, 2, 2, 2, 2, 2, 2, 2],
];

/// A validated, rectangular level with exactly one player start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    name: String,
    rows: Vec<Vec<RawTile>>,
    width: usize,
    player_start: (usize, usize),
}

impl Level {
    pub fn builtin() -> Result<Self, LevelError> {
        let rows: Vec<&[u8]> = BUILTIN_LEVEL.iter().map(|row| row.as_slice()).collect();
        Self::from_codes("builtin", &rows)
    }

    pub fn from_codes(name: &str, codes: &[&[u8]]) -> Result<Self, LevelError> {
        let rows = codes
            .iter()
            .enumerate()
            .map(|(row, line)| {
                line.iter()
                    .enumerate()
                    .map(|(col, &code)| {
                        RawTile::try_from(code)
                            .map_err(|code| LevelError::UnknownCode { code, row, col })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(name, rows)
    }

    pub fn parse(name: &str, text: &str) -> Result<Self, LevelError> {
        let rows = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty() && !line.starts_with(';'))
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| {
                        RawTile::from_char(ch).ok_or(LevelError::UnknownChar { ch, row, col })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_rows(name, rows)
    }

    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "level".to_string());
        Self::parse(&name, &text)
    }

    fn from_rows(name: &str, rows: Vec<Vec<RawTile>>) -> Result<Self, LevelError> {
        let width = rows.first().map(Vec::len).filter(|&w| w > 0).ok_or(LevelError::Empty)?;
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(LevelError::Ragged {
                row,
                found,
                expected: width,
            });
        }
        let starts: Vec<(usize, usize)> = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, raw)| *raw == RawTile::Player)
                    .map(move |(x, _)| (x, y))
            })
            .collect();
        let player_start = match starts.as_slice() {
            [] => return Err(LevelError::MissingPlayer),
            [start] => *start,
            many => return Err(LevelError::MultiplePlayers { count: many.len() }),
        };
        Ok(Self {
            name: name.to_string(),
            rows,
            width,
            player_start,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Vec<RawTile>] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn player_start(&self) -> (usize, usize) {
        self.player_start
    }
}
