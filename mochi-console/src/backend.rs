//! Window backend using winit and softbuffer (CPU rendering)
//!
//! The frame loop is owned by the terminal, so winit events are pumped once
//! per frame instead of handing control to `EventLoop::run`. Composition goes
//! to an in-memory software surface that is copied into the window buffer on
//! present.

use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Duration;

use softbuffer::{Context, Surface};
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowBuilder};

use console_core::{
    Backend, BackendEvent, ConsoleError, FontSettings, KeyState, Result, SoftwareSurface,
    WindowSettings,
};
use console_font::FontdueResource;

use crate::input::HeldKeys;

fn backend_error(e: impl std::fmt::Display) -> ConsoleError {
    ConsoleError::Backend(e.to_string())
}

/// Native window presenting a software framebuffer
pub struct WindowBackend {
    event_loop: EventLoop<()>,
    window: Rc<Window>,
    _context: Context<Rc<Window>>,
    surface: Surface<Rc<Window>, Rc<Window>>,
    canvas: SoftwareSurface,
    keys: HeldKeys,
}

impl Backend for WindowBackend {
    type Font = FontdueResource;
    type Surface = SoftwareSurface;

    fn create_window(settings: &WindowSettings) -> Result<Self> {
        let event_loop = EventLoop::new().map_err(backend_error)?;
        let window = WindowBuilder::new()
            .with_title(&settings.title)
            .with_inner_size(PhysicalSize::new(settings.width, settings.height))
            .build(&event_loop)
            .map_err(backend_error)?;
        let window = Rc::new(window);

        let context = Context::new(window.clone()).map_err(backend_error)?;
        let surface = Surface::new(&context, window.clone()).map_err(backend_error)?;

        let size = window.inner_size();
        log::debug!("Window created: {}x{}", size.width, size.height);

        Ok(Self {
            event_loop,
            window,
            _context: context,
            surface,
            canvas: SoftwareSurface::new(size.width, size.height),
            keys: HeldKeys::new(),
        })
    }

    fn open_font(&mut self, settings: &FontSettings) -> Result<Self::Font> {
        FontdueResource::open(settings)
    }

    fn poll_events(&mut self, events: &mut Vec<BackendEvent>) {
        let Self {
            event_loop,
            canvas,
            keys,
            ..
        } = self;

        let status = event_loop.pump_events(Some(Duration::ZERO), |event, _elwt| {
            let Event::WindowEvent { event, .. } = event else {
                return;
            };
            match event {
                WindowEvent::CloseRequested => events.push(BackendEvent::Quit),
                WindowEvent::Resized(size) => {
                    if size.width > 0 && size.height > 0 {
                        canvas.resize(size.width, size.height);
                    }
                    events.push(BackendEvent::Resized {
                        width: size.width,
                        height: size.height,
                    });
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    keys.handle(event.physical_key, &event.logical_key, event.state);
                }
                WindowEvent::Focused(false) => keys.clear(),
                _ => {}
            }
        });

        if let PumpStatus::Exit(code) = status {
            log::debug!("Event loop exited with code {}", code);
            events.push(BackendEvent::Quit);
        }
    }

    fn pressed_keys(&self) -> KeyState {
        self.keys.snapshot()
    }

    fn surface(&mut self) -> &mut Self::Surface {
        &mut self.canvas
    }

    fn present(&mut self) -> Result<()> {
        let framebuffer = self.canvas.framebuffer();
        let (Some(width), Some(height)) = (
            NonZeroU32::new(framebuffer.width()),
            NonZeroU32::new(framebuffer.height()),
        ) else {
            return Ok(());
        };

        self.surface.resize(width, height).map_err(backend_error)?;
        let mut buffer = self.surface.buffer_mut().map_err(backend_error)?;
        buffer.copy_from_slice(framebuffer.pixels());
        buffer.present().map_err(backend_error)?;
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_resizable(&mut self, resizable: bool) {
        self.window.set_resizable(resizable);
    }
}
