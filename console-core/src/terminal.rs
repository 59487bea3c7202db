//! Terminal façade
//!
//! Owns the backend, the font resource, the streams and the glyph cache, and
//! drives the frame loop:
//! - append batches from attached command receivers
//! - poll events and reflow streams on resize
//! - run the user callback with a level-triggered key snapshot
//! - clear, composite and present
//! - apply the automatic cache and buffer clears
//! - sleep to hold the target frame rate

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::backend::{Backend, BackendEvent, CellSize, FontResource, KeyState, RenderSurface};
use crate::color::Rgb;
use crate::buffer::CellBuffer;
use crate::compositor::{FrameCompositor, FrameStats};
use crate::error::{CallbackError, ConsoleError, Result};
use crate::glyph::GlyphCache;
use crate::queue::CommandReceiver;
use crate::settings::{ConsoleSettings, FontSettings, StreamSettings};

/// Index of a stream owned by a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(usize);

impl StreamId {
    /// The stream created with the terminal
    pub const MAIN: StreamId = StreamId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// What the user callback sees of one frame
pub struct Frame<'a> {
    streams: &'a mut [CellBuffer],
    keys: &'a KeyState,
    delta_time: f32,
    quit: bool,
    title: Option<String>,
    clear_cache: bool,
}

impl<'a> Frame<'a> {
    /// The main stream
    pub fn main(&mut self) -> &mut CellBuffer {
        &mut self.streams[0]
    }

    pub fn stream(&mut self, id: StreamId) -> Option<&mut CellBuffer> {
        self.streams.get_mut(id.0)
    }

    pub fn streams(&mut self) -> &mut [CellBuffer] {
        &mut *self.streams
    }

    /// Keys held during this frame's poll
    pub fn keys(&self) -> &KeyState {
        self.keys
    }

    pub fn is_pressed(&self, name: &str) -> bool {
        self.keys.is_pressed(name)
    }

    /// Duration of the previous frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Stop the loop after this frame is presented
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Drop every cached glyph before this frame is composited
    pub fn clear_glyph_cache(&mut self) {
        self.clear_cache = true;
    }
}

/// Console window with one or more streams
pub struct Terminal<B: Backend> {
    backend: B,
    font: B::Font,
    settings: ConsoleSettings,
    streams: Vec<CellBuffer>,
    receivers: Vec<(StreamId, CommandReceiver)>,
    cache: GlyphCache,
    compositor: FrameCompositor,
    events: Vec<BackendEvent>,
    running: bool,
    delta_time: f32,
    last_stats: FrameStats,
}

impl<B: Backend> Terminal<B> {
    /// Create the window and open the font
    pub fn new(settings: ConsoleSettings) -> Result<Self> {
        settings.validate()?;
        let backend = B::create_window(&settings.window)?;
        Self::with_backend(backend, settings)
    }

    /// Wrap an existing backend; the font is opened here and failure is fatal
    pub fn with_backend(mut backend: B, settings: ConsoleSettings) -> Result<Self> {
        settings.validate()?;
        let font = backend.open_font(&settings.font)?;
        backend.set_resizable(settings.resizable);

        let mut main = CellBuffer::from_settings(&settings.stream);
        main.apply_cursor_settings(&settings.cursor);
        let compositor = FrameCompositor::new(settings.color_depth);

        debug!(
            "Terminal ready: {}x{} stream, {} fps",
            settings.stream.columns, settings.stream.rows, settings.fps
        );

        Ok(Self {
            backend,
            font,
            settings,
            streams: vec![main],
            receivers: Vec::new(),
            cache: GlyphCache::new(),
            compositor,
            events: Vec::new(),
            running: true,
            delta_time: 0.0,
            last_stats: FrameStats::default(),
        })
    }

    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn font(&self) -> &B::Font {
        &self.font
    }

    pub fn cell_size(&self) -> CellSize {
        self.font.cell_size()
    }

    pub fn main_stream(&mut self) -> &mut CellBuffer {
        &mut self.streams[0]
    }

    /// Add a stream drawn after every existing one
    pub fn add_stream(&mut self, settings: &StreamSettings) -> StreamId {
        let mut buffer = CellBuffer::from_settings(settings);
        buffer.apply_cursor_settings(&self.settings.cursor);
        self.streams.push(buffer);
        StreamId(self.streams.len() - 1)
    }

    pub fn stream(&self, id: StreamId) -> Option<&CellBuffer> {
        self.streams.get(id.0)
    }

    pub fn stream_mut(&mut self, id: StreamId) -> Option<&mut CellBuffer> {
        self.streams.get_mut(id.0)
    }

    pub fn streams(&self) -> &[CellBuffer] {
        &self.streams
    }

    /// Feed batches from `receiver` into stream `id` at the start of each frame
    pub fn attach_receiver(&mut self, id: StreamId, receiver: CommandReceiver) {
        self.receivers.push((id, receiver));
    }

    pub fn glyph_cache(&self) -> &GlyphCache {
        &self.cache
    }

    /// Destroy every cached glyph
    pub fn clear_glyph_cache(&mut self) {
        self.cache.clear(self.backend.surface());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Duration of the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn last_stats(&self) -> FrameStats {
        self.last_stats
    }

    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Color the surface is cleared to before each frame
    pub fn background(&self) -> Rgb {
        self.settings.background
    }

    pub fn set_background(&mut self, color: impl Into<Rgb>) {
        self.settings.background = color.into();
    }

    /// Replace the font resource
    ///
    /// The glyph cache is emptied and reflowing streams are reshaped for the
    /// new cell size. On failure the previous font stays in place.
    pub fn set_font(&mut self, settings: &FontSettings) -> Result<()> {
        settings.validate()?;
        let font = self.backend.open_font(settings)?;
        self.cache.clear(self.backend.surface());
        self.font = font;
        self.settings.font = settings.clone();

        let (width, height) = self.backend.surface().size();
        if width > 0 && height > 0 {
            self.reflow_streams(width, height);
        }
        Ok(())
    }

    /// Toggle whether window resizes reflow the streams
    pub fn set_resizable(&mut self, resizable: bool) {
        self.settings.resizable = resizable;
        self.backend.set_resizable(resizable);
    }

    fn drain_receivers(&mut self) {
        let streams = &mut self.streams;
        self.receivers.retain_mut(|(id, receiver)| {
            if let Some(stream) = streams.get_mut(id.0) {
                receiver.drain_into(stream);
            }
            !receiver.is_disconnected()
        });
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        if !self.settings.resizable {
            return;
        }
        if width == 0 || height == 0 {
            warn!("Ignoring zero-size resize {}x{}", width, height);
            return;
        }
        self.reflow_streams(width, height);
    }

    fn reflow_streams(&mut self, width: u32, height: u32) {
        let cell = self.cell_size();
        let columns = (width / cell.width.max(1)) as usize;
        let rows = (height / cell.height.max(1)) as usize;
        debug!("Reflow to {}x{} px: {}x{} cells", width, height, columns, rows);
        for stream in self.streams.iter_mut().filter(|stream| stream.reflow()) {
            stream.resize(columns, rows);
        }
    }

    fn poll(&mut self) {
        let mut events = std::mem::take(&mut self.events);
        self.backend.poll_events(&mut events);
        for event in events.drain(..) {
            match event {
                BackendEvent::Quit => self.running = false,
                BackendEvent::Resized { width, height } => self.handle_resize(width, height),
            }
        }
        self.events = events;
    }

    /// Run one frame with a given delta time
    ///
    /// A callback error stops the loop and is returned as
    /// `ConsoleError::Callback`; nothing is composited for that frame.
    pub fn step<C>(&mut self, delta_time: f32, callback: &mut C) -> Result<FrameStats>
    where
        C: FnMut(&mut Frame<'_>) -> std::result::Result<(), CallbackError>,
    {
        self.delta_time = delta_time;
        self.drain_receivers();
        self.poll();
        let keys = self.backend.pressed_keys();

        let mut frame = Frame {
            streams: &mut self.streams,
            keys: &keys,
            delta_time,
            quit: false,
            title: None,
            clear_cache: false,
        };
        if let Err(e) = callback(&mut frame) {
            self.running = false;
            error!("Frame callback failed: {}", e);
            return Err(ConsoleError::Callback(e));
        }
        let Frame {
            quit,
            title,
            clear_cache,
            ..
        } = frame;
        if quit {
            self.running = false;
        }
        if let Some(title) = title {
            self.backend.set_title(&title);
        }
        if clear_cache {
            self.clear_glyph_cache();
        }

        let surface = self.backend.surface();
        surface.clear(self.settings.background);
        let stats = self.compositor.composite(
            &mut self.streams,
            &mut self.cache,
            &self.font,
            surface,
            delta_time,
        )?;
        self.backend.present()?;

        if self.settings.auto_clear_cache {
            self.cache.clear(self.backend.surface());
        }
        if self.settings.auto_clear_buffer {
            self.streams.iter_mut().for_each(CellBuffer::clrscr);
        }

        self.last_stats = stats;
        Ok(stats)
    }

    /// Run frames until the loop stops, then destroy every cached glyph
    pub fn run<C>(&mut self, mut callback: C) -> Result<()>
    where
        C: FnMut(&mut Frame<'_>) -> std::result::Result<(), CallbackError>,
    {
        let budget = Duration::from_secs_f64(1.0 / self.settings.fps.max(1) as f64);
        let mut last = Instant::now();

        let result = loop {
            if !self.running {
                break Ok(());
            }
            let frame_start = Instant::now();
            if let Err(e) = self.step(self.delta_time, &mut callback) {
                break Err(e);
            }
            let elapsed = frame_start.elapsed();
            if elapsed < budget {
                thread::sleep(budget - elapsed);
            }
            let now = Instant::now();
            self.delta_time = now.duration_since(last).as_secs_f32();
            last = now;
        };

        self.clear_glyph_cache();
        result
    }
}
