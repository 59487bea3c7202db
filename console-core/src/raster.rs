//! Software raster primitives
//!
//! `RasterSurface` is what a font resource hands back for one glyph.
//! `Framebuffer` holds packed 0xAARRGGBB pixels ready for presentation, and
//! `SoftwareSurface` combines it with a texture store to implement the
//! `RenderSurface` capability without any GPU.

use std::collections::HashMap;
use std::ops::Range;

use crate::backend::RenderSurface;
use crate::color::Rgb;
use crate::error::{ConsoleError, Result};

/// Pixel-space rectangle; the origin may lie outside the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x
            && y >= self.y
            && (x as i64) < self.x as i64 + self.width as i64
            && (y as i64) < self.y as i64 + self.height as i64
    }
}

/// Opaque handle to a texture owned by a render surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

/// RGBA pixels produced by glyph rasterization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl RasterSurface {
    /// Fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; (width * height) as usize],
        }
    }

    /// Opaque surface filled with `color`
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            width,
            height,
            pixels: vec![[color.r, color.g, color.b, 255]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    /// RGBA pixel at (x, y), transparent outside the surface
    pub fn pixel(&self, x: i32, y: i32) -> [u8; 4] {
        self.index(x, y)
            .map(|idx| self.pixels[idx])
            .unwrap_or([0, 0, 0, 0])
    }

    /// Overwrite one pixel; out-of-bounds writes are ignored
    pub fn put_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = rgba;
        }
    }

    /// Fill a span of rows with an opaque color
    pub fn fill_rows(&mut self, y: i32, rows: u32, color: Rgb) {
        for dy in 0..rows as i32 {
            for x in 0..self.width as i32 {
                self.put_pixel(x, y + dy, [color.r, color.g, color.b, 255]);
            }
        }
    }

    /// Composite this surface over an opaque background
    ///
    /// The result is fully opaque, so it can later be copied without blending.
    pub fn over_background(&self, background: Rgb) -> RasterSurface {
        let pixels = self
            .pixels
            .iter()
            .map(|&[r, g, b, a]| {
                let a = a as u32;
                let ia = 255 - a;
                [
                    ((r as u32 * a + background.r as u32 * ia) / 255) as u8,
                    ((g as u32 * a + background.g as u32 * ia) / 255) as u8,
                    ((b as u32 * a + background.b as u32 * ia) / 255) as u8,
                    255,
                ]
            })
            .collect();
        RasterSurface {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Textures keyed by freshly allocated ids
///
/// Ids are never reused, so a handle obtained before `clear` can never alias a
/// texture created afterwards.
#[derive(Debug, Default)]
pub struct TextureStore {
    next_id: u64,
    textures: HashMap<TextureId, RasterSurface>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, surface: RasterSurface) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(id, surface);
        id
    }

    pub fn remove(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    pub fn get(&self, id: TextureId) -> Option<&RasterSurface> {
        self.textures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

/// Packed 0xAARRGGBB pixel buffer
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK.to_pixel(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Resize, discarding the previous contents
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb::BLACK.to_pixel(); (width * height) as usize];
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn clear(&mut self, color: Rgb) {
        self.pixels.fill(color.to_pixel());
    }

    #[inline]
    fn put(&mut self, px: i32, py: i32, pixel: u32) {
        if px < 0 || py < 0 || px >= self.width as i32 || py >= self.height as i32 {
            return;
        }
        let idx = (py as u32 * self.width + px as u32) as usize;
        if idx < self.pixels.len() {
            self.pixels[idx] = pixel;
        }
    }

    /// Visible (x, y) ranges of `rect`, relative to its origin
    fn clip(&self, rect: PixelRect) -> Option<(Range<u32>, Range<u32>)> {
        let span = |origin: i32, len: u32, limit: u32| {
            let start = (-(origin as i64)).clamp(0, len as i64);
            let end = (limit as i64 - origin as i64).clamp(0, len as i64);
            (start < end).then(|| start as u32..end as u32)
        };
        Some((
            span(rect.x, rect.width, self.width)?,
            span(rect.y, rect.height, self.height)?,
        ))
    }

    /// Fill a rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        let pixel = color.to_pixel();
        let Some((xs, ys)) = self.clip(rect) else {
            return;
        };
        for dy in ys {
            let py = rect.y.saturating_add_unsigned(dy);
            for dx in xs.clone() {
                self.put(rect.x.saturating_add_unsigned(dx), py, pixel);
            }
        }
    }

    /// Draw a hollow rectangle with edges `thickness` pixels wide
    pub fn outline_rect(&mut self, rect: PixelRect, thickness: u32, color: Rgb) {
        let t = thickness.min(rect.width / 2).min(rect.height / 2).max(1);
        let PixelRect {
            x,
            y,
            width: w,
            height: h,
        } = rect;
        if rect.is_empty() {
            return;
        }
        // Top and bottom edges
        self.fill_rect(PixelRect::new(x, y, w, t), color);
        self.fill_rect(PixelRect::new(x, y.saturating_add_unsigned(h - t), w, t), color);
        // Left and right edges
        self.fill_rect(PixelRect::new(x, y, t, h), color);
        self.fill_rect(PixelRect::new(x.saturating_add_unsigned(w - t), y, t, h), color);
    }

    /// Copy a raster surface into `dest`, scaling with nearest-neighbour
    ///
    /// Source alpha is ignored: the copy fully overwrites the destination.
    pub fn blit(&mut self, src: &RasterSurface, dest: PixelRect) {
        if dest.is_empty() || src.width() == 0 || src.height() == 0 {
            return;
        }
        let Some((xs, ys)) = self.clip(dest) else {
            return;
        };
        for dy in ys {
            let py = dest.y.saturating_add_unsigned(dy);
            let sy = (dy as u64 * src.height() as u64 / dest.height as u64) as i32;
            for dx in xs.clone() {
                let px = dest.x.saturating_add_unsigned(dx);
                let sx = (dx as u64 * src.width() as u64 / dest.width as u64) as i32;
                let [r, g, b, _] = src.pixel(sx, sy);
                self.put(px, py, Rgb::new(r, g, b).to_pixel());
            }
        }
    }
}

/// CPU implementation of `RenderSurface`
#[derive(Debug)]
pub struct SoftwareSurface {
    framebuffer: Framebuffer,
    textures: TextureStore,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            framebuffer: Framebuffer::new(width, height),
            textures: TextureStore::new(),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn textures(&self) -> &TextureStore {
        &self.textures
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.framebuffer.resize(width, height);
    }
}

impl RenderSurface for SoftwareSurface {
    fn create_texture(&mut self, raster: &RasterSurface) -> Result<TextureId> {
        Ok(self.textures.insert(raster.clone()))
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.textures.remove(id);
    }

    fn clear(&mut self, color: Rgb) {
        self.framebuffer.clear(color);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.framebuffer.fill_rect(rect, color);
    }

    fn outline_rect(&mut self, rect: PixelRect, thickness: u32, color: Rgb) {
        self.framebuffer.outline_rect(rect, thickness, color);
    }

    fn copy_texture(&mut self, id: TextureId, dest: PixelRect) -> Result<()> {
        let texture = self
            .textures
            .get(id)
            .ok_or(ConsoleError::UnknownTexture(id))?;
        self.framebuffer.blit(texture, dest);
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        (self.framebuffer.width(), self.framebuffer.height())
    }
}
