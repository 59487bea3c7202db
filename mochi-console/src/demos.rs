//! Demo programs
//!
//! Each demo is a frame callback run by the terminal loop. They are generic
//! over the backend so the same code drives a window or the headless backend.

use std::thread;
use std::time::Duration;

use console_core::{
    command_channel, Backend, CallbackError, CellBuffer, CursorStyle, Frame, PaintCommand,
    Result, Rgb, StreamSettings, Terminal,
};

use crate::config::DemoKind;

type FrameResult = std::result::Result<(), CallbackError>;

/// Run a demo until the window closes, Escape is held or `frame_limit` frames ran
pub fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    demo: DemoKind,
    frame_limit: Option<u64>,
) -> Result<()> {
    let mut frames = 0u64;
    let mut limit = move |frame: &mut Frame<'_>| {
        frames += 1;
        if frame.is_pressed("escape") || frame_limit.is_some_and(|max| frames >= max) {
            frame.quit();
        }
    };

    match demo {
        DemoKind::Hello => terminal.run(|frame: &mut Frame<'_>| -> FrameResult {
            hello(frame);
            limit(frame);
            Ok(())
        }),
        DemoKind::Keys => terminal.run(|frame: &mut Frame<'_>| -> FrameResult {
            keys(frame);
            limit(frame);
            Ok(())
        }),
        DemoKind::Streams => {
            setup_streams(terminal);
            let mut elapsed = 0.0f32;
            let mut ticker = Vec::new();
            terminal.run(|frame: &mut Frame<'_>| -> FrameResult {
                elapsed += frame.delta_time();
                streams(frame, elapsed);
                if let Some(stream) = frame.streams().get_mut(2) {
                    hold_latest(stream, &mut ticker);
                }
                limit(frame);
                Ok(())
            })
        }
    }
}

fn hello(frame: &mut Frame<'_>) {
    let dt = frame.delta_time();
    let main = frame.main();
    main.reset_all();

    main.set_foreground(0xFFB7C5u32);
    main.cputsxy(2, 1, "Hello, world!");

    main.reset_all();
    main.bold(true);
    main.cputsxy(2, 3, "bold");
    main.reset_all();
    main.italic(true);
    main.cputsxy(8, 3, "italic");
    main.reset_all();
    main.underline(true);
    main.cputsxy(16, 3, "underline");
    main.reset_all();
    main.strikethrough(true);
    main.cputsxy(27, 3, "strikethrough");

    main.reset_all();
    for (i, color) in [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE, Rgb::GRAY]
        .into_iter()
        .enumerate()
    {
        main.set_background(color);
        main.put_rect(2 + i * 3, 5, 2, 1);
    }

    main.reset_all();
    main.set_foreground((160u8, 160u8, 160u8));
    main.cputsxy(2, 7, "Lines\nare\nsplit");
    main.gotoxy(2, 11);
    main.print(&format!("frame time {:5.1} ms", dt * 1000.0));
    main.clreol();
    main.gotoxy(2, 13);
    main.print("Esc quits > ");
}

fn keys(frame: &mut Frame<'_>) {
    let held: Vec<String> = frame.keys().names().map(str::to_string).collect();
    let main = frame.main();
    main.reset_all();
    main.set_cursor_style(CursorStyle::Empty);
    main.set_foreground(Rgb::GREEN);
    main.cputsxy(1, 1, "Held keys:");
    main.set_foreground(Rgb::WHITE);
    if held.is_empty() {
        main.cputsxy(3, 3, "(none)");
    }
    for (row, name) in held.iter().enumerate() {
        main.cputsxy(3, 3 + row, name);
    }
}

fn setup_streams<B: Backend>(terminal: &mut Terminal<B>) {
    let banner = terminal.add_stream(&StreamSettings {
        offset_x: 16,
        offset_y: 8,
        scale_x: 2,
        scale_y: 2,
        reflow: false,
        ..StreamSettings::new(20, 2)
    });
    if let Some(stream) = terminal.stream_mut(banner) {
        stream.set_cursor_style(CursorStyle::Empty);
    }

    let ticker = terminal.add_stream(&StreamSettings {
        offset_y: 4,
        ..StreamSettings::new(80, 1)
    });
    if let Some(stream) = terminal.stream_mut(ticker) {
        stream.set_cursor_style(CursorStyle::Empty);
    }

    // The producer owns its own buffer and only ever hands over batches
    let (tx, rx) = command_channel();
    terminal.attach_receiver(ticker, rx);
    thread::spawn(move || {
        let mut buffer = CellBuffer::new(80, 1);
        for tick in 0u64.. {
            buffer.set_foreground(Rgb::from_packed(0x40_80_FF ^ (tick as u32 & 0xFF)));
            buffer.cputsxy(0, 0, &format!("producer tick {:>6}", tick));
            if !tx.submit(&mut buffer) {
                break;
            }
            thread::sleep(Duration::from_millis(100));
        }
    });
}

/// Keep showing the producer's last batch on frames where none arrived
///
/// The producer submits far slower than the frame rate and the buffer is
/// cleared after every frame.
fn hold_latest(stream: &mut CellBuffer, latest: &mut Vec<PaintCommand>) {
    if stream.commands().is_empty() {
        stream.extend_commands(latest.iter().copied());
    } else {
        latest.clear();
        latest.extend_from_slice(stream.commands());
    }
}

fn streams(frame: &mut Frame<'_>, elapsed: f32) {
    let main = frame.main();
    main.reset_all();
    main.set_cursor_style(CursorStyle::Underscore);
    for row in 4..12 {
        main.set_foreground(Rgb::new(0, 40 + row as u8 * 16, 0));
        main.cputsxy(0, row, &"main stream ".repeat(7));
    }
    main.gotoxy(0, 13);

    let Some(banner) = frame.streams().get_mut(1) else {
        return;
    };
    banner.reset_all();
    banner.set_background(0x303030u32);
    banner.put_rect(0, 0, 20, 2);
    banner.set_foreground(0xFFD700u32);
    banner.cputsxy(1, 0, "SCALED BANNER");
    banner.set_foreground(Rgb::WHITE);
    banner.cputsxy(1, 1, &format!("t = {:6.2} s", elapsed));
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_core::{ConsoleSettings, HeadlessBackend};

    fn terminal() -> Terminal<HeadlessBackend> {
        let settings = ConsoleSettings {
            fps: 1000,
            ..ConsoleSettings::default()
        };
        Terminal::new(settings).unwrap()
    }

    #[test]
    fn test_hello_stops_at_frame_limit() {
        let mut terminal = terminal();
        run(&mut terminal, DemoKind::Hello, Some(3)).unwrap();
        assert!(!terminal.is_running());
        assert_eq!(terminal.backend().frames_presented(), 3);
        assert!(terminal.glyph_cache().is_empty());
    }

    #[test]
    fn test_escape_quits_after_first_frame() {
        let mut terminal = terminal();
        terminal.backend_mut().press("Escape");
        run(&mut terminal, DemoKind::Keys, None).unwrap();
        assert_eq!(terminal.backend().frames_presented(), 1);
        assert!(terminal.last_stats().characters > 0);
    }

    #[test]
    fn test_streams_demo_adds_streams() {
        let mut terminal = terminal();
        run(&mut terminal, DemoKind::Streams, Some(2)).unwrap();
        assert_eq!(terminal.streams().len(), 3);
        let banner = &terminal.streams()[1];
        assert_eq!((banner.columns(), banner.scale()), (20, (2, 2)));
        assert!(terminal.last_stats().rectangles > 0);
    }

    #[test]
    fn test_ticker_replays_last_batch() {
        let mut stream = CellBuffer::new(80, 1);
        let mut latest = Vec::new();

        hold_latest(&mut stream, &mut latest);
        assert!(stream.commands().is_empty());

        stream.cputsxy(0, 0, "tick 1");
        hold_latest(&mut stream, &mut latest);
        assert_eq!(latest.len(), 6);

        stream.clrscr();
        hold_latest(&mut stream, &mut latest);
        assert_eq!(stream.commands(), latest.as_slice());

        stream.clrscr();
        stream.cputsxy(0, 0, "t2");
        hold_latest(&mut stream, &mut latest);
        assert_eq!(latest.len(), 2);
    }
}
