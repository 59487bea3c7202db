//! Per-cell coverage masks
//!
//! Glyph bitmaps from the rasterizer are stamped into a cell-sized mask, with
//! bold and italic synthesized by stamping twice and by shearing rows.
//! Decorations are added as full-coverage lines. The mask is then turned into
//! an RGBA raster according to the render quality.

use console_core::{RasterSurface, RenderQuality, Rgb};

/// Coverage per pixel and per color channel, 0..=255
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    cells: Vec<[u8; 3]>,
}

/// A rasterized glyph bitmap positioned relative to the cell origin
#[derive(Debug, Clone, Copy)]
pub struct GlyphBitmap<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
    /// Bytes per pixel: 1 for grayscale, 3 for subpixel
    pub channels: usize,
    pub x: i32,
    pub y: i32,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![[0; 3]; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: i32, y: i32) -> [u8; 3] {
        self.index(x, y).map(|idx| self.cells[idx]).unwrap_or([0; 3])
    }

    /// Sum of every channel, used to compare ink amounts
    pub fn total(&self) -> u64 {
        self.cells
            .iter()
            .flat_map(|c| c.iter())
            .map(|&v| v as u64)
            .sum()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    fn max_into(&mut self, x: i32, y: i32, value: [u8; 3]) {
        if let Some(idx) = self.index(x, y) {
            let cell = &mut self.cells[idx];
            for (dst, src) in cell.iter_mut().zip(value) {
                *dst = (*dst).max(src);
            }
        }
    }

    /// Stamp a bitmap, keeping the maximum coverage per pixel
    ///
    /// `shear` moves each row right by `shear * (baseline - row)` pixels.
    pub fn stamp(&mut self, glyph: &GlyphBitmap<'_>, dx: i32, shear: f32, baseline: i32) {
        for row in 0..glyph.height {
            let py = glyph.y + row as i32;
            let offset = (shear * (baseline - py) as f32).round() as i32;
            for col in 0..glyph.width {
                let base = (row * glyph.width + col) * glyph.channels;
                let value = if glyph.channels == 3 {
                    [glyph.data[base], glyph.data[base + 1], glyph.data[base + 2]]
                } else {
                    let v = glyph.data[base];
                    [v, v, v]
                };
                if value == [0; 3] {
                    continue;
                }
                self.max_into(glyph.x + col as i32 + dx + offset, py, value);
            }
        }
    }

    /// Full-coverage horizontal line
    pub fn hline(&mut self, y: i32, thickness: u32) {
        for dy in 0..thickness as i32 {
            for x in 0..self.width as i32 {
                self.max_into(x, y + dy, [255; 3]);
            }
        }
    }

    /// Convert to RGBA for the given quality
    ///
    /// Solid and blended leave uncovered pixels transparent; shaded and
    /// subpixel paint them with the background.
    pub fn to_raster(&self, quality: RenderQuality, foreground: Rgb, background: Rgb) -> RasterSurface {
        let mut raster = if quality.has_native_background() {
            RasterSurface::filled(self.width, self.height, background)
        } else {
            RasterSurface::new(self.width, self.height)
        };
        let fg = [foreground.r, foreground.g, foreground.b];
        let bg = [background.r, background.g, background.b];

        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let [cr, cg, cb] = self.get(x, y);
                let pixel = match quality {
                    RenderQuality::Solid => {
                        if cg < 128 {
                            continue;
                        }
                        [fg[0], fg[1], fg[2], 255]
                    }
                    RenderQuality::Shaded => {
                        if cg == 0 {
                            continue;
                        }
                        [blend(fg[0], bg[0], cg), blend(fg[1], bg[1], cg), blend(fg[2], bg[2], cg), 255]
                    }
                    RenderQuality::Subpixel => {
                        if cr == 0 && cg == 0 && cb == 0 {
                            continue;
                        }
                        [blend(fg[0], bg[0], cr), blend(fg[1], bg[1], cg), blend(fg[2], bg[2], cb), 255]
                    }
                    RenderQuality::Blended => {
                        if cg == 0 {
                            continue;
                        }
                        [fg[0], fg[1], fg[2], cg]
                    }
                };
                raster.put_pixel(x, y, pixel);
            }
        }
        raster
    }
}

#[inline]
fn blend(fg: u8, bg: u8, coverage: u8) -> u8 {
    let a = coverage as u32;
    ((fg as u32 * a + bg as u32 * (255 - a)) / 255) as u8
}
