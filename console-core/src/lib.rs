//! Mochi Console Core
//!
//! This crate provides the platform-independent virtual text console:
//! - Cell buffers with a cursor, a pen and an ordered paint command queue
//! - A glyph cache keyed by quantized, structurally hashed glyph keys
//! - A frame compositor that replays queues onto a render surface
//! - A terminal façade driving the frame loop over an injected backend
//! - A thread-safe command channel for producer threads
//!
//! This crate has NO windowing or font-file dependencies. The headless
//! backend renders into memory, which is what the tests use.

pub mod backend;
pub mod buffer;
pub mod color;
pub mod command;
pub mod compositor;
pub mod cursor;
pub mod error;
pub mod glyph;
pub mod headless;
pub mod pen;
pub mod queue;
pub mod raster;
pub mod settings;
pub mod terminal;

pub use backend::{
    Backend, BackendEvent, CellSize, EncodingMode, FontResource, KeyState, RenderQuality,
    RenderSurface,
};
pub use buffer::CellBuffer;
pub use color::{ColorDepth, Rgb};
pub use command::{CharacterCell, PaintCommand, RectangleFill};
pub use compositor::{FrameCompositor, FrameStats};
pub use cursor::{Blink, CursorShape, CursorStyle};
pub use error::{CallbackError, ConfigError, ConsoleError, Result};
pub use glyph::{GlyphCache, GlyphKey};
pub use headless::{DrawCall, FixedFont, HeadlessBackend, RecordingSurface};
pub use pen::{PenState, Style, StyleBits, StyleFlags};
pub use queue::{command_channel, CommandReceiver, CommandSender};
pub use raster::{Framebuffer, PixelRect, RasterSurface, SoftwareSurface, TextureId, TextureStore};
pub use settings::{ConsoleSettings, CursorSettings, FontSettings, StreamSettings, WindowSettings};
pub use terminal::{Frame, StreamId, Terminal};
