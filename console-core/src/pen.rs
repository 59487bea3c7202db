//! Pen state: the attributes applied to subsequent paint commands

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// A single text style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    Bold,
    Italic,
    Underline,
    Strikethrough,
}

impl Style {
    pub const ALL: [Style; 4] = [
        Style::Bold,
        Style::Italic,
        Style::Underline,
        Style::Strikethrough,
    ];

    /// Backend style constant for this style
    pub const fn bit(self) -> u8 {
        STYLE_BITS[self as usize]
    }
}

/// Style constants indexed by `Style` discriminant
const STYLE_BITS: [u8; 4] = [
    StyleBits::BOLD.0,
    StyleBits::ITALIC.0,
    StyleBits::UNDERLINE.0,
    StyleBits::STRIKETHROUGH.0,
];

/// Packed style bits handed to the font rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StyleBits(pub u8);

impl StyleBits {
    pub const NORMAL: StyleBits = StyleBits(0x00);
    pub const BOLD: StyleBits = StyleBits(0x01);
    pub const ITALIC: StyleBits = StyleBits(0x02);
    pub const UNDERLINE: StyleBits = StyleBits(0x04);
    pub const STRIKETHROUGH: StyleBits = StyleBits(0x08);

    pub fn contains(self, style: Style) -> bool {
        self.0 & style.bit() != 0
    }
}

/// Boolean style flags of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl StyleFlags {
    pub fn is_set(&self, style: Style) -> bool {
        match style {
            Style::Bold => self.bold,
            Style::Italic => self.italic,
            Style::Underline => self.underline,
            Style::Strikethrough => self.strikethrough,
        }
    }

    pub fn set(&mut self, style: Style, on: bool) {
        match style {
            Style::Bold => self.bold = on,
            Style::Italic => self.italic = on,
            Style::Underline => self.underline = on,
            Style::Strikethrough => self.strikethrough = on,
        }
    }

    /// Pack the flags into backend style bits
    pub fn bits(&self) -> StyleBits {
        let bits = Style::ALL
            .iter()
            .filter(|style| self.is_set(**style))
            .fold(0u8, |acc, style| acc | style.bit());
        StyleBits(bits)
    }
}

/// Current foreground/background/styles of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenState {
    pub foreground: Rgb,
    pub background: Rgb,
    pub styles: StyleFlags,
}

impl PenState {
    pub fn new() -> Self {
        Self {
            foreground: Rgb::WHITE,
            background: Rgb::BLACK,
            styles: StyleFlags::default(),
        }
    }

    /// Reset all attributes to default
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PenState {
    fn default() -> Self {
        Self::new()
    }
}
