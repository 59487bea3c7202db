//! Font resource backed by fontdue
//!
//! The cell size is fixed at open time from the space character. Every glyph
//! is rendered into a raster of exactly one cell.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings as FontdueSettings};
use log::{debug, trace, warn};

use console_core::{
    CellSize, ConsoleError, EncodingMode, FontResource, FontSettings, RasterSurface,
    RenderQuality, Result, Rgb, Style, StyleBits,
};

use crate::coverage::{CoverageMask, GlyphBitmap};

/// Horizontal shift per pixel of height for synthesized italics
const ITALIC_SHEAR: f32 = 0.2;

/// Monospace fonts tried when no font path is configured
pub fn system_font_paths() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &[
            "/System/Library/Fonts/Menlo.ttc",
            "/System/Library/Fonts/Monaco.ttf",
            "/Library/Fonts/Courier New.ttf",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            "C:\\Windows\\Fonts\\consola.ttf",
            "C:\\Windows\\Fonts\\cour.ttf",
        ]
    } else {
        &[
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
            "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
            "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
        ]
    }
}

/// A scalable font rendering fixed-size cells
pub struct FontdueResource {
    font: Font,
    px: f32,
    encoding: EncodingMode,
    quality: RenderQuality,
    cell: CellSize,
    baseline: i32,
}

impl FontdueResource {
    /// Open the configured font, or the first system monospace font found
    pub fn open(settings: &FontSettings) -> Result<Self> {
        match &settings.path {
            Some(path) => Self::open_path(path, settings),
            None => Self::open_system(settings),
        }
    }

    fn open_path(path: &Path, settings: &FontSettings) -> Result<Self> {
        let data = fs::read(path).map_err(|source| ConsoleError::FontNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded font: {}", path.display());
        Self::from_bytes(data, settings)
    }

    fn open_system(settings: &FontSettings) -> Result<Self> {
        for path in system_font_paths() {
            if let Ok(data) = fs::read(path) {
                debug!("Loaded system font: {}", path);
                return Self::from_bytes(data, settings);
            }
        }
        warn!("No system monospace font found");
        Err(ConsoleError::FontNotFound {
            path: PathBuf::from(system_font_paths().first().copied().unwrap_or_default()),
            source: io::Error::new(io::ErrorKind::NotFound, "no system monospace font found"),
        })
    }

    /// Parse font data and derive the cell size
    pub fn from_bytes(data: Vec<u8>, settings: &FontSettings) -> Result<Self> {
        let font = Font::from_bytes(data, FontdueSettings::default())
            .map_err(|e| ConsoleError::FontParse(e.to_string()))?;
        let px = settings.point_size;

        let space = font.metrics(' ', px);
        let (line_height, ascent) = match font.horizontal_line_metrics(px) {
            Some(line) => (line.new_line_size, line.ascent),
            None => (px * 1.4, px),
        };
        let cell = CellSize::new(
            (space.advance_width.ceil() as u32).max(1),
            (line_height.ceil() as u32).max(1),
        );
        let baseline = ascent.ceil() as i32;

        debug!(
            "Font cell size {}x{} at {}px, baseline {}",
            cell.width, cell.height, px, baseline
        );

        Ok(Self {
            font,
            px,
            encoding: settings.encoding,
            quality: settings.quality,
            cell,
            baseline,
        })
    }

    pub fn encoding(&self) -> EncodingMode {
        self.encoding
    }

    pub fn baseline(&self) -> i32 {
        self.baseline
    }

    /// Coverage of one character with synthesized styles
    pub fn coverage(&self, codepoint: char, styles: StyleBits) -> CoverageMask {
        let CellSize { width, height } = self.cell;
        let mut mask = CoverageMask::new(width, height);
        let c = self.encoding.map_char(codepoint);

        if !c.is_whitespace() {
            let subpixel = self.quality == RenderQuality::Subpixel;
            let (metrics, data) = if subpixel {
                self.font.rasterize_subpixel(c, self.px)
            } else {
                self.font.rasterize(c, self.px)
            };
            let glyph = GlyphBitmap {
                data: &data,
                width: metrics.width,
                height: metrics.height,
                channels: if subpixel { 3 } else { 1 },
                x: metrics.xmin,
                y: self.baseline - metrics.ymin - metrics.height as i32,
            };
            let shear = if styles.contains(Style::Italic) {
                ITALIC_SHEAR
            } else {
                0.0
            };
            mask.stamp(&glyph, 0, shear, self.baseline);
            if styles.contains(Style::Bold) {
                mask.stamp(&glyph, 1, shear, self.baseline);
            }
        }

        let thickness = ((self.px / 14.0).round() as u32).max(1);
        if styles.contains(Style::Underline) {
            let y = (self.baseline + 1).min(height as i32 - thickness as i32);
            mask.hline(y, thickness);
        }
        if styles.contains(Style::Strikethrough) {
            mask.hline(self.baseline - (self.px * 0.3).round() as i32, thickness);
        }
        mask
    }
}

impl FontResource for FontdueResource {
    fn cell_size(&self) -> CellSize {
        self.cell
    }

    fn quality(&self) -> RenderQuality {
        self.quality
    }

    fn render_glyph(
        &self,
        codepoint: char,
        foreground: Rgb,
        background: Rgb,
        styles: StyleBits,
    ) -> Result<RasterSurface> {
        trace!("Rasterizing {:?} with styles {:#04x}", codepoint, styles.0);
        let mask = self.coverage(codepoint, styles);
        Ok(mask.to_raster(self.quality, foreground, background))
    }
}
