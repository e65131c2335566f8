use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when decoding a color or region key from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digit in {0:?}")]
    Digit(String),
    #[error("expected an r,g,b triple with channels in 0..=255, got {0:?}")]
    Triple(String),
}

/// RGB color of a base-raster pixel or a rendered label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Fill used for pixels that have no province or no available label.
    pub const BLANK: Color = Color { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Grayscale color used by numerical layers.
    pub const fn gray(level: u8) -> Self {
        Self::new(level, level, level)
    }

    /// Packs the channels as `0x00RRGGBB`.
    pub const fn packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn from_packed(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    pub fn from_pixel(pixel: &image::Rgb<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }

    pub fn to_pixel(self) -> image::Rgb<u8> {
        image::Rgb([self.r, self.g, self.b])
    }

    /// Parses `RRGGBB`, tolerating a leading `#` or `x` and either letter case.
    pub fn parse_hex(text: &str) -> Result<Self, ColorParseError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix('x'))
            .unwrap_or(trimmed);
        if digits.chars().count() != 6 {
            return Err(ColorParseError::Length(text.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(text.to_string()));
        }
        let value =
            u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::Digit(text.to_string()))?;
        Ok(Self::from_packed(value))
    }

    /// Parses a decimal triple such as `12,200,7` or `12 200 7`.
    pub fn parse_triple(text: &str) -> Result<Self, ColorParseError> {
        let channels: Vec<u8> = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ColorParseError::Triple(text.to_string()))?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => Err(ColorParseError::Triple(text.to_string())),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Canonical identity of a province: its color on the base raster.
///
/// Rendered as six uppercase hex digits (`FF0000`). Ordering matches the
/// lexicographic order of that rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegionId(u32);

impl RegionId {
    pub const fn from_color(color: Color) -> Self {
        Self(color.packed())
    }

    pub const fn color(self) -> Color {
        Color::from_packed(self.0)
    }

    /// Packed `0x00RRGGBB` value, suitable as a dense table index.
    pub const fn packed(self) -> u32 {
        self.0
    }
}

impl From<Color> for RegionId {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

impl FromStr for RegionId {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse_hex(s).map(Self::from_color)
    }
}

impl TryFrom<String> for RegionId {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegionId> for String {
    fn from(id: RegionId) -> Self {
        id.to_string()
    }
}

/// Region key for a channel triple, or `None` if any channel is outside `0..=255`.
pub fn hex_of(r: i32, g: i32, b: i32) -> Option<RegionId> {
    let channel = |v: i32| u8::try_from(v).ok();
    Some(RegionId::from_color(Color::new(
        channel(r)?,
        channel(g)?,
        channel(b)?,
    )))
}

/// Channel triple of a region key.
pub fn rgb_of(id: RegionId) -> (u8, u8, u8) {
    let c = id.color();
    (c.r, c.g, c.b)
}
