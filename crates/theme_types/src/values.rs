// Resource values - what a bound field receives
//
// Colors are packed ARGB words; drawables are the small set of drawable-like
// assets a skin can hand out. Both serialize as strings/tables so skins can
// be written by hand in TOML.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a resource inside a skin.
pub type ResourceId = u32;

// ─────────────────────────────────────────────────────────────────────────────
// Resource Kind
// ─────────────────────────────────────────────────────────────────────────────

/// The two kinds of resource a field can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Color,
    Drawable,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Color => write!(f, "color"),
            ResourceKind::Drawable => write!(f, "drawable"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// Error returned when parsing a color literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("Color must start with '#': {0}")]
    MissingHash(String),
    #[error("Color must have 6 or 8 hex digits: {0}")]
    InvalidLength(String),
    #[error("Invalid hex digits in color: {0}")]
    InvalidHex(String),
}

/// A packed `0xAARRGGBB` color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0x0000_0000);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);

    /// Build an opaque color from its channels
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32))
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Parses `#RRGGBB` (opaque) or `#AARRGGBB`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        let value =
            u32::from_str_radix(hex, 16).map_err(|_| ColorParseError::InvalidHex(s.to_string()))?;
        match hex.len() {
            6 => Ok(Color(0xFF00_0000 | value)),
            8 => Ok(Color(value)),
            _ => Err(ColorParseError::InvalidLength(s.to_string())),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Drawable
// ─────────────────────────────────────────────────────────────────────────────

/// A drawable-like asset handed out by a skin
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawable {
    /// Nothing to draw
    #[default]
    Empty,
    /// A solid fill
    Solid { color: Color },
    /// An image asset, by path relative to the skin root
    Image { path: String },
}

impl Drawable {
    pub fn solid(color: Color) -> Self {
        Drawable::Solid { color }
    }

    pub fn image(path: impl Into<String>) -> Self {
        Drawable::Image { path: path.into() }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Drawable::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_opaque_color() {
        let color: Color = "#336699".parse().unwrap();
        assert_eq!(color, Color::rgb(0x33, 0x66, 0x99));
        assert_eq!(color.alpha(), 0xFF);
    }

    #[test]
    fn test_parse_argb_color() {
        let color: Color = "#80FF0000".parse().unwrap();
        assert_eq!(color.alpha(), 0x80);
        assert_eq!(color.red(), 0xFF);
        assert_eq!(color.to_string(), "#80FF0000");
    }

    #[test]
    fn test_parse_color_errors() {
        assert!(matches!(
            "336699".parse::<Color>(),
            Err(ColorParseError::MissingHash(_))
        ));
        assert!(matches!(
            "#3366".parse::<Color>(),
            Err(ColorParseError::InvalidLength(_))
        ));
        assert!(matches!(
            "#GG6699".parse::<Color>(),
            Err(ColorParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_drawable_serde() {
        let json = serde_json::json!({ "type": "image", "path": "icons/star.png" });
        let drawable: Drawable = serde_json::from_value(json).unwrap();
        assert_eq!(drawable, Drawable::image("icons/star.png"));

        let solid = serde_json::to_value(Drawable::solid(Color::BLACK)).unwrap();
        assert_eq!(solid["color"], "#FF000000");
    }
}
