//! Cursor style and blink timing
//!
//! The cursor is drawn by the compositor after every queued command of a
//! buffer. Its visibility is driven by an accumulator advanced with the frame
//! delta time, so the blink period depends on frames, not on wall-clock time.

use serde::{Deserialize, Serialize};

use crate::raster::PixelRect;

/// Cursor visual style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CursorStyle {
    /// Bottom quarter of the cell
    #[default]
    Line,
    /// Hollow rectangle around the cell
    Rect,
    /// Filled cell
    SolidRect,
    /// Left sixth of the cell
    VerticalBar,
    /// Bottom eighth of the cell
    Underscore,
    /// Not drawn
    Empty,
}

/// Geometry the compositor draws for a cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Filled(PixelRect),
    Outline { rect: PixelRect, thickness: u32 },
}

impl CursorStyle {
    /// Parse a style name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "line" => Some(CursorStyle::Line),
            "rect" => Some(CursorStyle::Rect),
            "solid-rect" | "solid" => Some(CursorStyle::SolidRect),
            "vertical-bar" | "vertical" | "bar" => Some(CursorStyle::VerticalBar),
            "underscore" => Some(CursorStyle::Underscore),
            "empty" | "none" => Some(CursorStyle::Empty),
            _ => None,
        }
    }

    /// Sub-rectangle of the cell at `cell` covered by this style
    pub fn shape(self, cell: PixelRect) -> Option<CursorShape> {
        let PixelRect { x, y, width: w, height: h } = cell;
        match self {
            CursorStyle::Line => Some(CursorShape::Filled(PixelRect::new(
                x,
                y.saturating_add_unsigned((h / 4) * 3),
                w,
                h / 4,
            ))),
            CursorStyle::Rect => Some(CursorShape::Outline {
                rect: cell,
                thickness: (w / 8).max(1),
            }),
            CursorStyle::SolidRect => Some(CursorShape::Filled(cell)),
            CursorStyle::VerticalBar => {
                Some(CursorShape::Filled(PixelRect::new(x, y, w / 6, h)))
            }
            CursorStyle::Underscore => Some(CursorShape::Filled(PixelRect::new(
                x,
                y.saturating_add_unsigned((h / 8) * 7),
                w,
                h / 8,
            ))),
            CursorStyle::Empty => None,
        }
    }
}

/// Frame-driven blink accumulator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blink {
    accumulator: f32,
    /// Accumulator increase per second of frame time
    rate: f32,
    /// Accumulator value above which the cursor is shown
    on_threshold: f32,
}

impl Blink {
    pub fn new(rate: f32, on_threshold: f32) -> Self {
        Self {
            accumulator: 0.0,
            rate,
            on_threshold,
        }
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn on_threshold(&self) -> f32 {
        self.on_threshold
    }

    pub fn set_timing(&mut self, rate: f32, on_threshold: f32) {
        self.rate = rate;
        self.on_threshold = on_threshold;
    }

    /// Whether the cursor is shown at the current accumulator value
    pub fn is_visible(&self) -> bool {
        self.accumulator > self.on_threshold
    }

    /// Sample visibility for this frame, then advance by `delta_time`
    ///
    /// The accumulator wraps to zero once it passes twice the on threshold.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let visible = self.is_visible();
        if self.accumulator > self.on_threshold * 2.0 {
            self.accumulator = 0.0;
        }
        self.accumulator += self.rate * delta_time;
        visible
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for Blink {
    fn default() -> Self {
        Self::new(25.0, 10.0)
    }
}
