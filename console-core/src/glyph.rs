//! Glyph cache
//!
//! Maps a styled character to a texture on the render surface. Entries are
//! rendered lazily on first use and are only ever removed all at once.

use std::collections::HashMap;

use log::{debug, trace};

use crate::backend::{FontResource, RenderSurface};
use crate::color::{ColorDepth, Rgb};
use crate::command::CharacterCell;
use crate::error::Result;
use crate::pen::StyleFlags;
use crate::raster::TextureId;

/// Immutable cache key: a code point with quantized colors and style flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    pub codepoint: char,
    pub foreground: Rgb,
    pub background: Rgb,
    pub styles: StyleFlags,
}

impl GlyphKey {
    /// Build a key, quantizing both colors to `depth`
    pub fn new(
        codepoint: char,
        foreground: Rgb,
        background: Rgb,
        styles: StyleFlags,
        depth: ColorDepth,
    ) -> Self {
        Self {
            codepoint,
            foreground: foreground.quantize(depth),
            background: background.quantize(depth),
            styles,
        }
    }

    pub fn from_cell(cell: &CharacterCell, depth: ColorDepth) -> Self {
        Self::new(
            cell.codepoint,
            cell.foreground,
            cell.background,
            cell.styles,
            depth,
        )
    }
}

/// Owned mapping from glyph keys to surface textures
#[derive(Debug, Default)]
pub struct GlyphCache {
    entries: HashMap<GlyphKey, TextureId>,
    hits: u64,
    misses: u64,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(128),
            hits: 0,
            misses: 0,
        }
    }

    /// Texture for `key`, rendering and uploading it on first use
    ///
    /// Quality modes without a native background are composited over the key
    /// background before upload, so every cached texture is opaque.
    pub fn present_character<F, S>(
        &mut self,
        key: &GlyphKey,
        font: &F,
        surface: &mut S,
    ) -> Result<TextureId>
    where
        F: FontResource + ?Sized,
        S: RenderSurface + ?Sized,
    {
        if let Some(&id) = self.entries.get(key) {
            self.hits += 1;
            return Ok(id);
        }

        trace!("Rendering glyph {:?}", key);
        let raster = font.render_glyph(
            key.codepoint,
            key.foreground,
            key.background,
            key.styles.bits(),
        )?;
        let raster = if font.quality().has_native_background() {
            raster
        } else {
            raster.over_background(key.background)
        };
        let id = surface.create_texture(&raster)?;

        self.misses += 1;
        self.entries.insert(*key, id);
        Ok(id)
    }

    /// Cached texture for `key` without rendering
    pub fn get(&self, key: &GlyphKey) -> Option<TextureId> {
        self.entries.get(key).copied()
    }

    /// Destroy every cached texture and empty the mapping
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: RenderSurface + ?Sized,
    {
        if self.entries.is_empty() {
            return;
        }
        debug!("Clearing glyph cache ({} entries)", self.entries.len());
        for (_, id) in self.entries.drain() {
            surface.destroy_texture(id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups served from the cache since creation
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to render since creation
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
