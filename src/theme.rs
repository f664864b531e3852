//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::key::KeyColor;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Tile colours plus the handful of UI colours the frame needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub flux: Color,
    pub unbreakable: Color,
    pub stone: Color,
    pub box_fill: Color,
    pub player: Color,
    /// Key set 1 (yellow) keys and locks.
    pub key1: Color,
    /// Key set 2 (blue) keys and locks.
    pub key2: Color,
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text.
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            flux: Color::Rgb(0xCC, 0xFF, 0xCC),
            unbreakable: Color::Rgb(0x99, 0x99, 0x99),
            stone: Color::Rgb(0x00, 0x00, 0xCC),
            box_fill: Color::Rgb(0x8B, 0x45, 0x13),
            player: Color::Rgb(0xFF, 0x00, 0x00),
            key1: Color::Rgb(0xFF, 0xCC, 0x00),
            key2: Color::Rgb(0x00, 0xCC, 0xFF),
            bg: Color::Rgb(0x31, 0x35, 0x3F),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
        }
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Keys not present (or not valid hex) keep their default colour.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)?;
        Ok(Self::from_map(&parse_theme_file(&s)))
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, fallback: Color| {
            map.get(key)
                .and_then(|v| parse_hex(v).ok())
                .unwrap_or(fallback)
        };
        Self {
            flux: get("flux", defaults.flux),
            unbreakable: get("unbreakable", defaults.unbreakable),
            stone: get("stone", defaults.stone),
            box_fill: get("box", defaults.box_fill),
            player: get("player", defaults.player),
            key1: get("key1", defaults.key1),
            key2: get("key2", defaults.key2),
            bg: get("bg", defaults.bg),
            div_line: get("div_line", defaults.div_line),
            main_fg: get("main_fg", defaults.main_fg),
            title: get("title", defaults.title),
        }
    }

    #[inline]
    pub fn key_color(&self, color: KeyColor) -> Color {
        match color {
            KeyColor::Yellow => self.key1,
            KeyColor::Blue => self.key2,
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|part| u8::from_str_radix(part, 16).ok())
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#8B4513").unwrap();
        assert!(matches!(c, Color::Rgb(0x8B, 0x45, 0x13)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12345"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GG0000"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[stone]="#0000CC""##);
        assert_eq!(map.get("stone"), Some(&"#0000CC".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_only_listed_keys() {
        let map = parse_theme_file(
            "# comment\ntheme[key1]='#FF8800'\ntheme[box]=\"#123\"\ntheme[stone]=\"nope\"\n",
        );
        let theme = Theme::from_map(&map);
        let defaults = Theme::default();
        assert_eq!(theme.key1, Color::Rgb(0xFF, 0x88, 0x00));
        assert_eq!(theme.box_fill, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.stone, defaults.stone);
        assert_eq!(theme.bg, defaults.bg);
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(Theme::load(None).unwrap(), Theme::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = Theme::load(Some(Path::new("/nonexistent/theme.theme"))).unwrap_err();
        assert!(matches!(err, ThemeError::Io(_)));
    }
}
