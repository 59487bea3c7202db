//! Color representation for console cells
//!
//! Supports:
//! - Tri-channel colors `(r, g, b)`
//! - Packed integer colors `0xRRGGBB`
//! - Quantization to a per-channel bit depth (bounds glyph cache keys)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GRAY: Rgb = Rgb::new(128, 128, 128);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode a packed `0xRRGGBB` integer (bits above 24 are ignored)
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Encode as a packed `0xRRGGBB` integer
    pub const fn to_packed(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Convert to an opaque framebuffer pixel (0xAARRGGBB)
    pub const fn to_pixel(self) -> u32 {
        0xFF00_0000 | self.to_packed()
    }

    /// Quantize every channel to the given depth
    pub fn quantize(self, depth: ColorDepth) -> Self {
        Self {
            r: depth.quantize_channel(self.r),
            g: depth.quantize_channel(self.g),
            b: depth.quantize_channel(self.b),
        }
    }

    /// Parse a hex color string (`#rrggbb` or `rrggbb`)
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self { r, g, b })
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

impl From<u32> for Rgb {
    fn from(packed: u32) -> Self {
        Self::from_packed(packed)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value).ok_or_else(|| {
            ConfigError::new(format!(
                "Invalid hex color '{}'. Expected format: #RRGGBB",
                value
            ))
        })
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Bits kept per color channel before glyph keys are hashed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ColorDepth(u8);

impl ColorDepth {
    pub const MIN_BITS: u8 = 1;
    pub const MAX_BITS: u8 = 8;
    pub const TRUE_COLOR: ColorDepth = ColorDepth(8);

    pub fn new(bits: u8) -> Result<Self, ConfigError> {
        if (Self::MIN_BITS..=Self::MAX_BITS).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(ConfigError::for_field(
                "color_depth",
                format!("Color depth must be between 1 and 8 bits, got {}", bits),
            ))
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// Number of distinct values a channel can take at this depth
    pub fn levels(self) -> u16 {
        1 << self.0
    }

    /// Quantize one channel, rescaling the kept levels to the full 0..=255 range
    ///
    /// 1 bit yields {0, 255}, 2 bits yield {0, 85, 170, 255}, 8 bits are exact.
    pub fn quantize_channel(self, value: u8) -> u8 {
        if self.0 >= Self::MAX_BITS {
            return value;
        }
        let max_level = (self.levels() - 1) as u32;
        let level = (value >> (Self::MAX_BITS - self.0)) as u32;
        ((level * 255) / max_level) as u8
    }
}

impl Default for ColorDepth {
    fn default() -> Self {
        Self::TRUE_COLOR
    }
}

impl TryFrom<u8> for ColorDepth {
    type Error = ConfigError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<ColorDepth> for u8 {
    fn from(depth: ColorDepth) -> Self {
        depth.0
    }
}
