//! Headless backend
//!
//! Renders into an in-memory framebuffer with a fixed-cell font, replays
//! scripted events and records every draw call. Used by tests and by the
//! application's `headless` backend option.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::backend::{
    Backend, BackendEvent, CellSize, FontResource, KeyState, RenderQuality, RenderSurface,
};
use crate::color::Rgb;
use crate::error::Result;
use crate::pen::{Style, StyleBits};
use crate::raster::{Framebuffer, PixelRect, RasterSurface, SoftwareSurface, TextureId};
use crate::settings::{FontSettings, WindowSettings};

/// Block font: every visible glyph is a foreground box in the middle of the cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFont {
    cell: CellSize,
    quality: RenderQuality,
}

impl FixedFont {
    pub fn new(cell: CellSize, quality: RenderQuality) -> Self {
        Self { cell, quality }
    }

    /// Box covered by the ink of a visible glyph
    pub fn ink_rect(&self, styles: StyleBits) -> PixelRect {
        let CellSize { width, height } = self.cell;
        let inset = if styles.contains(Style::Bold) {
            width / 8
        } else {
            width / 4
        };
        PixelRect::new(
            inset as i32,
            (height / 4) as i32,
            width - inset * 2,
            height / 2,
        )
    }
}

impl Default for FixedFont {
    fn default() -> Self {
        Self::new(CellSize::new(8, 16), RenderQuality::Shaded)
    }
}

impl FontResource for FixedFont {
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
        let CellSize { width, height } = self.cell;
        let mut raster = if self.quality.has_native_background() {
            RasterSurface::filled(width, height, background)
        } else {
            RasterSurface::new(width, height)
        };
        let ink = [foreground.r, foreground.g, foreground.b, 255];

        if !codepoint.is_whitespace() {
            let rect = self.ink_rect(styles);
            let shear = styles.contains(Style::Italic) as i32;
            for dy in 0..rect.height as i32 {
                // Lean the top half right
                let dx_shift = if dy < rect.height as i32 / 2 { shear } else { 0 };
                for dx in 0..rect.width as i32 {
                    raster.put_pixel(rect.x + dx + dx_shift, rect.y + dy, ink);
                }
            }
        }
        if styles.contains(Style::Underline) {
            for x in 0..width as i32 {
                raster.put_pixel(x, height as i32 - 2, ink);
            }
        }
        if styles.contains(Style::Strikethrough) {
            for x in 0..width as i32 {
                raster.put_pixel(x, height as i32 / 2, ink);
            }
        }
        Ok(raster)
    }
}

/// A draw call recorded by `RecordingSurface`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawCall {
    Clear(Rgb),
    FillRect(PixelRect, Rgb),
    OutlineRect(PixelRect, Rgb),
    CreateTexture(TextureId),
    DestroyTexture(TextureId),
    CopyTexture(TextureId, PixelRect),
}

/// Software surface that logs the draw calls of the current frame
///
/// The log restarts at every `clear`.
#[derive(Debug)]
pub struct RecordingSurface {
    inner: SoftwareSurface,
    log: Vec<DrawCall>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            inner: SoftwareSurface::new(width, height),
            log: Vec::new(),
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        self.inner.framebuffer()
    }

    /// Live texture count
    pub fn texture_count(&self) -> usize {
        self.inner.textures().len()
    }

    pub fn draw_log(&self) -> &[DrawCall] {
        &self.log
    }

    /// Pixel at (x, y) as an `Rgb`
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.framebuffer().pixel(x, y).map(Rgb::from_packed)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.inner.resize(width, height);
    }
}

impl RenderSurface for RecordingSurface {
    fn create_texture(&mut self, raster: &RasterSurface) -> Result<TextureId> {
        let id = self.inner.create_texture(raster)?;
        self.log.push(DrawCall::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        self.log.push(DrawCall::DestroyTexture(id));
        self.inner.destroy_texture(id);
    }

    fn clear(&mut self, color: Rgb) {
        self.log.clear();
        self.log.push(DrawCall::Clear(color));
        self.inner.clear(color);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        self.log.push(DrawCall::FillRect(rect, color));
        self.inner.fill_rect(rect, color);
    }

    fn outline_rect(&mut self, rect: PixelRect, thickness: u32, color: Rgb) {
        self.log.push(DrawCall::OutlineRect(rect, color));
        self.inner.outline_rect(rect, thickness, color);
    }

    fn copy_texture(&mut self, id: TextureId, dest: PixelRect) -> Result<()> {
        self.inner.copy_texture(id, dest)?;
        self.log.push(DrawCall::CopyTexture(id, dest));
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.inner.size()
    }
}

/// In-memory backend with scripted events
#[derive(Debug)]
pub struct HeadlessBackend {
    surface: RecordingSurface,
    cell: CellSize,
    events: VecDeque<BackendEvent>,
    keys: BTreeSet<String>,
    title: String,
    resizable: bool,
    frames_presented: u64,
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RecordingSurface::new(width, height),
            cell: FixedFont::default().cell_size(),
            events: VecDeque::new(),
            keys: BTreeSet::new(),
            title: String::new(),
            resizable: true,
            frames_presented: 0,
        }
    }

    /// Use a different cell size for fonts opened afterwards
    pub fn with_cell_size(mut self, cell: CellSize) -> Self {
        self.cell = cell;
        self
    }

    pub fn set_cell_size(&mut self, cell: CellSize) {
        self.cell = cell;
    }

    /// Queue an event for the next poll
    pub fn push_event(&mut self, event: BackendEvent) {
        self.events.push_back(event);
    }

    pub fn press(&mut self, name: &str) {
        self.keys.insert(name.to_lowercase());
    }

    pub fn release(&mut self, name: &str) {
        self.keys.remove(&name.to_lowercase());
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn recording(&self) -> &RecordingSurface {
        &self.surface
    }
}

impl Backend for HeadlessBackend {
    type Font = FixedFont;
    type Surface = RecordingSurface;

    fn create_window(settings: &WindowSettings) -> Result<Self> {
        let mut backend = Self::new(settings.width, settings.height);
        backend.title = settings.title.clone();
        Ok(backend)
    }

    fn open_font(&mut self, settings: &FontSettings) -> Result<Self::Font> {
        debug!(
            "Headless font: {}x{} cells, {:?} quality",
            self.cell.width, self.cell.height, settings.quality
        );
        Ok(FixedFont::new(self.cell, settings.quality))
    }

    fn poll_events(&mut self, events: &mut Vec<BackendEvent>) {
        while let Some(event) = self.events.pop_front() {
            if let BackendEvent::Resized { width, height } = event {
                self.surface.resize(width, height);
            }
            events.push(event);
        }
    }

    fn pressed_keys(&self) -> KeyState {
        KeyState::from_names(&self.keys)
    }

    fn surface(&mut self) -> &mut Self::Surface {
        &mut self.surface
    }

    fn present(&mut self) -> Result<()> {
        self.frames_presented += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }
}
