//! Backend capability traits
//!
//! The console core never talks to a window system or a font file directly.
//! A `Backend` provides a window with a `RenderSurface`, event polling and a
//! `FontResource`; the implementation is chosen at startup.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::Result;
use crate::pen::StyleBits;
use crate::raster::{PixelRect, RasterSurface, TextureId};
use crate::settings::{FontSettings, WindowSettings};

/// Fixed pixel size of one cell, derived from the reference space glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellSize {
    pub width: u32,
    pub height: u32,
}

impl CellSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Glyph rasterization quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    /// Thresholded ink, transparent background
    Solid,
    /// Anti-aliased ink on the cell background
    Shaded,
    /// Per-channel LCD coverage on the cell background
    Subpixel,
    /// Anti-aliased ink with alpha, transparent background
    #[default]
    Blended,
}

impl RenderQuality {
    /// Whether glyphs come back already painted over their background
    pub fn has_native_background(self) -> bool {
        matches!(self, RenderQuality::Shaded | RenderQuality::Subpixel)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "solid" => Some(RenderQuality::Solid),
            "shaded" => Some(RenderQuality::Shaded),
            "subpixel" | "lcd" => Some(RenderQuality::Subpixel),
            "blended" => Some(RenderQuality::Blended),
            _ => None,
        }
    }
}

/// Character set the font resource accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// 7-bit ASCII; anything else renders as '?'
    #[default]
    Ascii,
    /// Every Unicode scalar value
    Utf8,
    /// Basic Multilingual Plane; anything above renders as U+FFFD
    Unicode,
}

impl EncodingMode {
    /// Map a code point to the one the font resource will rasterize
    pub fn map_char(self, c: char) -> char {
        match self {
            EncodingMode::Ascii if !c.is_ascii() => '?',
            EncodingMode::Unicode if (c as u32) > 0xFFFF => char::REPLACEMENT_CHARACTER,
            _ => c,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "ascii" => Some(EncodingMode::Ascii),
            "utf8" | "utf-8" => Some(EncodingMode::Utf8),
            "unicode" | "ucs2" | "ucs-2" => Some(EncodingMode::Unicode),
            _ => None,
        }
    }
}

/// Font resource capability
pub trait FontResource {
    /// Cell size of the reference space character
    fn cell_size(&self) -> CellSize;

    fn quality(&self) -> RenderQuality;

    /// Rasterize one character with the given colors and style bits
    fn render_glyph(
        &self,
        codepoint: char,
        foreground: Rgb,
        background: Rgb,
        styles: StyleBits,
    ) -> Result<RasterSurface>;
}

/// Drawing capability of a window
pub trait RenderSurface {
    /// Upload a raster surface and return a handle to it
    fn create_texture(&mut self, raster: &RasterSurface) -> Result<TextureId>;

    fn destroy_texture(&mut self, id: TextureId);

    fn clear(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb);

    fn outline_rect(&mut self, rect: PixelRect, thickness: u32, color: Rgb);

    /// Copy a texture into `dest`, overwriting what is there
    fn copy_texture(&mut self, id: TextureId, dest: PixelRect) -> Result<()>;

    /// Surface size in pixels
    fn size(&self) -> (u32, u32);
}

/// Event reported by a backend poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    Quit,
    Resized { width: u32, height: u32 },
}

/// Level-triggered keyboard snapshot: the keys held during the last poll
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyState {
    held: BTreeSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot, lowercasing every name
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            held: names
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_pressed(&self, name: &str) -> bool {
        self.held.contains(&name.to_lowercase())
    }

    /// Held key names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.held.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Window and renderer backend
pub trait Backend: Sized {
    type Font: FontResource;
    type Surface: RenderSurface;

    fn create_window(settings: &WindowSettings) -> Result<Self>;

    /// Open the font resource; failure is fatal at startup
    fn open_font(&mut self, settings: &FontSettings) -> Result<Self::Font>;

    /// Append pending events to `events`
    ///
    /// A backend resizes its own surface before reporting `Resized`.
    fn poll_events(&mut self, events: &mut Vec<BackendEvent>);

    fn pressed_keys(&self) -> KeyState;

    fn surface(&mut self) -> &mut Self::Surface;

    /// Show the composited frame
    fn present(&mut self) -> Result<()>;

    fn set_title(&mut self, title: &str);

    fn set_resizable(&mut self, resizable: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_background() {
        assert!(!RenderQuality::Solid.has_native_background());
        assert!(RenderQuality::Shaded.has_native_background());
        assert!(RenderQuality::Subpixel.has_native_background());
        assert!(!RenderQuality::Blended.has_native_background());
    }

    #[test]
    fn test_encoding_map() {
        assert_eq!(EncodingMode::Ascii.map_char('a'), 'a');
        assert_eq!(EncodingMode::Ascii.map_char('é'), '?');
        assert_eq!(EncodingMode::Utf8.map_char('😀'), '😀');
        assert_eq!(EncodingMode::Unicode.map_char('é'), 'é');
        assert_eq!(
            EncodingMode::Unicode.map_char('😀'),
            char::REPLACEMENT_CHARACTER
        );
    }

    #[test]
    fn test_key_state_lowercases() {
        let keys = KeyState::from_names(["Escape", "A", "space"]);
        assert!(keys.is_pressed("escape"));
        assert!(keys.is_pressed("ESCAPE"));
        assert!(keys.is_pressed("a"));
        assert_eq!(keys.names().collect::<Vec<_>>(), vec!["a", "escape", "space"]);
        assert!(!KeyState::new().is_pressed("a"));
    }

    #[test]
    fn test_quality_names() {
        assert_eq!(RenderQuality::from_name("LCD"), Some(RenderQuality::Subpixel));
        assert_eq!(EncodingMode::from_name("utf-8"), Some(EncodingMode::Utf8));
        assert_eq!(RenderQuality::from_name("fancy"), None);
    }
}
