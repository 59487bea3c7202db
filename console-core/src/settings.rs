//! Plain-value settings consumed by the console core
//!
//! Every field has a serde default, so a partial TOML table deserializes into
//! a complete value. Loading files and applying overrides is the job of the
//! application crate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::backend::{EncodingMode, RenderQuality};
use crate::color::{ColorDepth, Rgb};
use crate::cursor::CursorStyle;
use crate::error::ConfigError;

/// Frame rate ceiling accepted by `validate`
pub const MAX_FPS: u32 = 1000;

/// Top-level console settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Bits per channel kept before glyph keys are hashed
    #[serde(default)]
    pub color_depth: ColorDepth,
    /// Destroy every cached glyph after each frame
    #[serde(default = "default_true")]
    pub auto_clear_cache: bool,
    /// Empty every buffer's command queue after each frame
    #[serde(default = "default_true")]
    pub auto_clear_buffer: bool,
    /// Target frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Whether window resizes reflow the buffers
    #[serde(default = "default_true")]
    pub resizable: bool,
    /// Color the surface is cleared to before compositing
    #[serde(default)]
    pub background: Rgb,
    #[serde(default)]
    pub cursor: CursorSettings,
    #[serde(default)]
    pub font: FontSettings,
    #[serde(default)]
    pub window: WindowSettings,
    /// Geometry of the main stream
    #[serde(default)]
    pub stream: StreamSettings,
}

fn default_true() -> bool {
    true
}
fn default_fps() -> u32 {
    30
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            color_depth: ColorDepth::default(),
            auto_clear_cache: true,
            auto_clear_buffer: true,
            fps: default_fps(),
            resizable: true,
            background: Rgb::BLACK,
            cursor: CursorSettings::default(),
            font: FontSettings::default(),
            window: WindowSettings::default(),
            stream: StreamSettings::default(),
        }
    }
}

impl ConsoleSettings {
    /// Reject values the frame loop cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fps == 0 {
            return Err(ConfigError::for_field("fps", "Frame rate must be at least 1"));
        }
        if self.fps > MAX_FPS {
            return Err(ConfigError::for_field(
                "fps",
                format!("Frame rate must be at most {}", MAX_FPS),
            ));
        }
        self.cursor.validate()?;
        self.font.validate()?;
        self.window.validate()?;
        self.stream.validate("stream")?;
        Ok(())
    }
}

/// Cursor appearance and blink timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorSettings {
    #[serde(default)]
    pub style: CursorStyle,
    #[serde(default = "default_cursor_color")]
    pub color: Rgb,
    /// Accumulator value above which the cursor is shown
    #[serde(default = "default_blink_on")]
    pub blink_on: f32,
    /// Accumulator increase per second
    #[serde(default = "default_blink_rate")]
    pub blink_rate: f32,
}

fn default_cursor_color() -> Rgb {
    Rgb::GRAY
}
fn default_blink_on() -> f32 {
    10.0
}
fn default_blink_rate() -> f32 {
    25.0
}

impl Default for CursorSettings {
    fn default() -> Self {
        Self {
            style: CursorStyle::default(),
            color: default_cursor_color(),
            blink_on: default_blink_on(),
            blink_rate: default_blink_rate(),
        }
    }
}

impl CursorSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.blink_on.is_nan() || self.blink_on <= 0.0 {
            return Err(ConfigError::for_field(
                "cursor.blink_on",
                "Blink threshold must be positive",
            ));
        }
        if self.blink_rate.is_nan() || self.blink_rate <= 0.0 {
            return Err(ConfigError::for_field(
                "cursor.blink_rate",
                "Blink rate must be positive",
            ));
        }
        Ok(())
    }
}

/// Font resource parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSettings {
    /// Font file; `None` tries the system monospace fonts
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_point_size")]
    pub point_size: f32,
    #[serde(default)]
    pub encoding: EncodingMode,
    #[serde(default)]
    pub quality: RenderQuality,
}

fn default_point_size() -> f32 {
    16.0
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            path: None,
            point_size: default_point_size(),
            encoding: EncodingMode::default(),
            quality: RenderQuality::default(),
        }
    }
}

impl FontSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_size.is_nan() || self.point_size < 4.0 {
            return Err(ConfigError::for_field(
                "font.point_size",
                "Font size must be at least 4.0",
            ));
        }
        if self.point_size > 200.0 {
            return Err(ConfigError::for_field(
                "font.point_size",
                "Font size must be at most 200.0",
            ));
        }
        Ok(())
    }
}

/// Window parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_title() -> String {
    "Virtual console".to_string()
}
fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    480
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl WindowSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::for_field(
                "window",
                "Window size must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Geometry of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSettings {
    #[serde(default = "default_columns")]
    pub columns: usize,
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Pixel offset added to every destination rectangle
    #[serde(default)]
    pub offset_x: i32,
    #[serde(default)]
    pub offset_y: i32,
    #[serde(default = "default_scale")]
    pub scale_x: u32,
    #[serde(default = "default_scale")]
    pub scale_y: u32,
    /// Follow window resizes
    #[serde(default = "default_true")]
    pub reflow: bool,
}

fn default_columns() -> usize {
    80
}
fn default_rows() -> usize {
    30
}
fn default_scale() -> u32 {
    1
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            columns: default_columns(),
            rows: default_rows(),
            offset_x: 0,
            offset_y: 0,
            scale_x: default_scale(),
            scale_y: default_scale(),
            reflow: true,
        }
    }
}

impl StreamSettings {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::for_field(
                field,
                "Stream shape must have at least one column and one row",
            ));
        }
        if self.scale_x == 0 || self.scale_y == 0 {
            return Err(ConfigError::for_field(field, "Scale must be at least 1"));
        }
        Ok(())
    }
}
