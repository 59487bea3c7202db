//! Frame compositor
//!
//! Replays each buffer's queued commands in issue order onto a render
//! surface, then draws the buffer's blinking cursor. A later command at the
//! same cell always covers an earlier one; nothing is blended.

use std::ops::AddAssign;

use crate::backend::{CellSize, FontResource, RenderSurface};
use crate::buffer::CellBuffer;
use crate::color::ColorDepth;
use crate::command::{CharacterCell, PaintCommand, RectangleFill};
use crate::cursor::CursorShape;
use crate::error::Result;
use crate::glyph::{GlyphCache, GlyphKey};
use crate::raster::PixelRect;

/// Counters for one composite pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub characters: usize,
    pub rectangles: usize,
    /// Commands that fell outside their buffer's shape
    pub skipped: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub cursors: usize,
}

impl AddAssign for FrameStats {
    fn add_assign(&mut self, other: Self) {
        self.characters += other.characters;
        self.rectangles += other.rectangles;
        self.skipped += other.skipped;
        self.cache_hits += other.cache_hits;
        self.cache_misses += other.cache_misses;
        self.cursors += other.cursors;
    }
}

/// Wrap a column past the buffer width onto following rows
///
/// Returns `None` when the wrapped cell lies outside the shape.
pub fn wrap_cell(column: usize, row: usize, shape: (usize, usize)) -> Option<(usize, usize)> {
    let (columns, rows) = shape;
    if columns == 0 {
        return None;
    }
    let row = row.checked_add(column / columns)?;
    let column = column % columns;
    (row < rows).then_some((column, row))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Destination of a cell-unit rectangle
fn cell_rect(
    column: usize,
    row: usize,
    width: usize,
    height: usize,
    cell: CellSize,
    scale: (u32, u32),
    offset: (i32, i32),
) -> PixelRect {
    let step_x = cell.width as i64 * scale.0 as i64;
    let step_y = cell.height as i64 * scale.1 as i64;
    PixelRect::new(
        saturate(column as i64 * step_x + offset.0 as i64),
        saturate(row as i64 * step_y + offset.1 as i64),
        (width as i64 * step_x).min(u32::MAX as i64) as u32,
        (height as i64 * step_y).min(u32::MAX as i64) as u32,
    )
}

/// Replays buffers onto a surface
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCompositor {
    depth: ColorDepth,
}

impl FrameCompositor {
    pub fn new(depth: ColorDepth) -> Self {
        Self { depth }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    pub fn set_depth(&mut self, depth: ColorDepth) {
        self.depth = depth;
    }

    /// Composite every buffer in order, advancing each cursor blink once
    pub fn composite<F, S>(
        &self,
        buffers: &mut [CellBuffer],
        cache: &mut GlyphCache,
        font: &F,
        surface: &mut S,
        delta_time: f32,
    ) -> Result<FrameStats>
    where
        F: FontResource + ?Sized,
        S: RenderSurface + ?Sized,
    {
        let mut stats = FrameStats::default();
        for buffer in buffers.iter_mut() {
            stats += self.composite_buffer(buffer, cache, font, surface, delta_time)?;
        }
        Ok(stats)
    }

    /// Composite one buffer's queue followed by its cursor
    pub fn composite_buffer<F, S>(
        &self,
        buffer: &mut CellBuffer,
        cache: &mut GlyphCache,
        font: &F,
        surface: &mut S,
        delta_time: f32,
    ) -> Result<FrameStats>
    where
        F: FontResource + ?Sized,
        S: RenderSurface + ?Sized,
    {
        let cell = font.cell_size();
        let (hits, misses) = (cache.hits(), cache.misses());
        let mut stats = FrameStats::default();

        for command in buffer.commands() {
            let drawn = match command {
                PaintCommand::Character(glyph) => {
                    self.draw_character(glyph, buffer, cell, cache, font, surface)?
                }
                PaintCommand::Rectangle(rect) => draw_rectangle(rect, buffer, cell, surface),
            };
            match (drawn, command) {
                (false, _) => stats.skipped += 1,
                (true, PaintCommand::Character(_)) => stats.characters += 1,
                (true, PaintCommand::Rectangle(_)) => stats.rectangles += 1,
            }
        }

        if draw_cursor(buffer, cell, surface, delta_time) {
            stats.cursors += 1;
        }

        stats.cache_hits = cache.hits() - hits;
        stats.cache_misses = cache.misses() - misses;
        Ok(stats)
    }

    fn draw_character<F, S>(
        &self,
        glyph: &CharacterCell,
        buffer: &CellBuffer,
        cell: CellSize,
        cache: &mut GlyphCache,
        font: &F,
        surface: &mut S,
    ) -> Result<bool>
    where
        F: FontResource + ?Sized,
        S: RenderSurface + ?Sized,
    {
        let Some((column, row)) = wrap_cell(glyph.column, glyph.row, buffer.shape()) else {
            return Ok(false);
        };
        let dest = cell_rect(
            column,
            row,
            1,
            1,
            cell,
            (glyph.scale_x, glyph.scale_y),
            buffer.pixel_offset(),
        );
        let key = GlyphKey::from_cell(glyph, self.depth);
        let texture = cache.present_character(&key, font, surface)?;

        surface.fill_rect(dest, glyph.background);
        surface.copy_texture(texture, dest)?;
        Ok(true)
    }
}

fn draw_rectangle<S>(rect: &RectangleFill, buffer: &CellBuffer, cell: CellSize, surface: &mut S) -> bool
where
    S: RenderSurface + ?Sized,
{
    let (columns, rows) = buffer.shape();
    if rect.column >= columns || rect.row >= rows {
        return false;
    }
    let dest = cell_rect(
        rect.column,
        rect.row,
        rect.width,
        rect.height,
        cell,
        buffer.scale(),
        buffer.pixel_offset(),
    );
    surface.fill_rect(dest, rect.color);
    true
}

/// Advance the blink and draw the cursor if it is visible this frame
fn draw_cursor<S>(buffer: &mut CellBuffer, cell: CellSize, surface: &mut S, delta_time: f32) -> bool
where
    S: RenderSurface + ?Sized,
{
    let visible = buffer.blink_mut().tick(delta_time);
    if !visible {
        return false;
    }
    let (x, y) = buffer.cursor();
    let Some((column, row)) = wrap_cell(x, y, buffer.shape()) else {
        return false;
    };
    let rect = cell_rect(column, row, 1, 1, cell, buffer.scale(), buffer.pixel_offset());
    let color = buffer.cursor_color();
    match buffer.cursor_style().shape(rect) {
        Some(CursorShape::Filled(rect)) => surface.fill_rect(rect, color),
        Some(CursorShape::Outline { rect, thickness }) => {
            surface.outline_rect(rect, thickness, color)
        }
        None => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_cell() {
        assert_eq!(wrap_cell(3, 1, (10, 5)), Some((3, 1)));
        assert_eq!(wrap_cell(12, 1, (10, 5)), Some((2, 2)));
        assert_eq!(wrap_cell(25, 3, (10, 5)), None);
        assert_eq!(wrap_cell(0, 5, (10, 5)), None);
        assert_eq!(wrap_cell(0, 0, (0, 5)), None);
    }

    #[test]
    fn test_cell_rect_scale_and_offset() {
        let rect = cell_rect(2, 3, 1, 1, CellSize::new(8, 16), (2, 3), (5, -7));
        assert_eq!(rect, PixelRect::new(2 * 16 + 5, 3 * 48 - 7, 16, 48));
    }

    #[test]
    fn test_stats_add() {
        let mut total = FrameStats {
            characters: 1,
            skipped: 2,
            ..FrameStats::default()
        };
        total += FrameStats {
            characters: 3,
            cache_misses: 4,
            ..FrameStats::default()
        };
        assert_eq!(total.characters, 4);
        assert_eq!(total.skipped, 2);
        assert_eq!(total.cache_misses, 4);
    }
}
