//! End-to-end composition tests
//!
//! Every test drives a `Terminal` over the headless backend and inspects the
//! resulting framebuffer pixels, draw log and frame statistics. The headless
//! font uses 8x16 cells with a foreground box covering x 2..6, y 4..12.

use console_core::{
    command_channel, CallbackError, CellSize, ColorDepth, ConsoleSettings, CursorSettings,
    CursorStyle, DrawCall, FixedFont, Frame, GlyphCache, GlyphKey, HeadlessBackend,
    RenderQuality, Rgb, SoftwareSurface, StreamId, StreamSettings, StyleFlags, Terminal,
};

type Result = std::result::Result<(), CallbackError>;

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        cursor: CursorSettings {
            style: CursorStyle::Empty,
            ..CursorSettings::default()
        },
        ..ConsoleSettings::default()
    }
}

fn terminal_with(settings: ConsoleSettings) -> Terminal<HeadlessBackend> {
    Terminal::with_backend(HeadlessBackend::new(640, 480), settings).unwrap()
}

fn terminal() -> Terminal<HeadlessBackend> {
    terminal_with(settings())
}

/// Color of the ink pixel of cell (column, row) on the main stream
fn ink(term: &Terminal<HeadlessBackend>, column: u32, row: u32) -> Rgb {
    term.backend()
        .recording()
        .pixel(column * 8 + 4, row * 16 + 8)
        .unwrap()
}

/// Color of the top-left pixel of cell (column, row), outside the ink box
fn paper(term: &Terminal<HeadlessBackend>, column: u32, row: u32) -> Rgb {
    term.backend()
        .recording()
        .pixel(column * 8, row * 16)
        .unwrap()
}

fn frame<F>(term: &mut Terminal<HeadlessBackend>, mut draw: F) -> console_core::FrameStats
where
    F: FnMut(&mut Frame<'_>),
{
    term.step(0.0, &mut |frame: &mut Frame<'_>| -> Result {
        draw(frame);
        Ok(())
    })
    .unwrap()
}

#[test]
fn later_put_char_overwrites_earlier() {
    let mut term = terminal();
    frame(&mut term, |frame| {
        let main = frame.main();
        main.set_foreground(Rgb::RED);
        main.set_background(Rgb::BLUE);
        main.put_char(3, 2, 'A');
        main.set_foreground(Rgb::GREEN);
        main.set_background(Rgb::WHITE);
        main.put_char(3, 2, 'B');
    });
    assert_eq!(ink(&term, 3, 2), Rgb::GREEN);
    assert_eq!(paper(&term, 3, 2), Rgb::WHITE);
}

#[test]
fn identical_keys_share_a_handle() {
    let font = FixedFont::default();
    let mut surface = SoftwareSurface::new(64, 64);
    let mut cache = GlyphCache::new();
    let key = GlyphKey::new(
        'q',
        Rgb::new(10, 20, 30),
        Rgb::new(40, 50, 60),
        StyleFlags::default(),
        ColorDepth::TRUE_COLOR,
    );

    let first = cache.present_character(&key, &font, &mut surface).unwrap();
    let second = cache.present_character(&key, &font, &mut surface).unwrap();
    assert_eq!(first, second);

    let italic = GlyphKey {
        styles: StyleFlags {
            italic: true,
            ..StyleFlags::default()
        },
        ..key
    };
    let third = cache.present_character(&italic, &font, &mut surface).unwrap();
    assert_ne!(first, third);
}

#[test]
fn pen_survives_clrscr() {
    let mut term = terminal();
    frame(&mut term, |frame| {
        let main = frame.main();
        main.set_foreground(Rgb::RED);
        main.cputs('A');
        main.clrscr();
        main.cputs('B');
    });
    assert_eq!(ink(&term, 1, 0), Rgb::RED);
    assert_eq!(ink(&term, 0, 0), Rgb::BLACK);
}

#[test]
fn cputsxy_newline_placement() {
    let mut term = terminal();
    frame(&mut term, |frame| {
        let main = frame.main();
        main.set_foreground(Rgb::GREEN);
        main.cputsxy(2, 3, "ab\ncd");
    });
    for (column, row) in [(2, 3), (3, 3), (2, 4), (3, 4)] {
        assert_eq!(ink(&term, column, row), Rgb::GREEN, "cell {},{}", column, row);
    }
    assert_eq!(ink(&term, 4, 3), Rgb::BLACK);
    assert_eq!(ink(&term, 4, 4), Rgb::BLACK);
}

#[test]
fn shrunk_buffer_skips_out_of_range_commands() {
    let mut term = terminal();
    let stats = frame(&mut term, |frame| {
        let main = frame.main();
        main.put_char(5, 25, 'x');
        main.put_char(1, 1, 'y');
        main.resize(10, 10);
    });
    assert_eq!(stats.characters, 1);
    assert_eq!(stats.skipped, 1);
}

#[test]
fn shrunk_buffer_skips_out_of_range_rectangles() {
    let mut term = terminal();
    let stats = frame(&mut term, |frame| {
        let main = frame.main();
        main.set_background(Rgb::RED);
        main.put_rect(1, 1, 2, 2);
        main.put_rect(5, 25, 1, 1);
        main.resize(10, 10);
    });
    assert_eq!(stats.rectangles, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(paper(&term, 2, 2), Rgb::RED);
    assert_eq!(paper(&term, 5, 25), Rgb::BLACK);
}

#[test]
fn cursor_near_coordinate_limit_is_clipped() {
    let mut term = terminal_with(ConsoleSettings {
        cursor: CursorSettings {
            style: CursorStyle::Line,
            ..CursorSettings::default()
        },
        ..ConsoleSettings::default()
    });
    let mut cursors = Vec::new();
    for _ in 0..3 {
        let stats = term
            .step(1.0, &mut |frame: &mut Frame<'_>| -> Result {
                frame.main().set_pixel_offset(0, i32::MAX - 4);
                Ok(())
            })
            .unwrap();
        cursors.push(stats.cursors);
    }
    assert_eq!(cursors, vec![0, 1, 1]);
    let recording = term.backend().recording();
    assert!(recording
        .framebuffer()
        .pixels()
        .iter()
        .all(|&pixel| pixel == Rgb::BLACK.to_pixel()));
}

#[test]
fn clear_yields_fresh_handles() {
    let font = FixedFont::default();
    let mut surface = SoftwareSurface::new(64, 64);
    let mut cache = GlyphCache::new();
    let key = GlyphKey::new(
        'z',
        Rgb::WHITE,
        Rgb::BLACK,
        StyleFlags::default(),
        ColorDepth::TRUE_COLOR,
    );

    let before = cache.present_character(&key, &font, &mut surface).unwrap();
    cache.clear(&mut surface);
    let after = cache.present_character(&key, &font, &mut surface).unwrap();
    assert_ne!(before, after);
    assert_eq!(surface.textures().len(), 1);
}

#[test]
fn cursor_blink_period_is_deterministic() {
    let run = || {
        let mut term = terminal_with(ConsoleSettings {
            cursor: CursorSettings {
                style: CursorStyle::SolidRect,
                color: Rgb::WHITE,
                blink_on: 10.0,
                blink_rate: 20.0,
            },
            ..ConsoleSettings::default()
        });
        (0..20)
            .map(|_| {
                let stats = term
                    .step(0.125, &mut |_: &mut Frame<'_>| -> Result { Ok(()) })
                    .unwrap();
                let drawn = paper(&term, 0, 0) == Rgb::WHITE;
                assert_eq!(drawn, stats.cursors == 1);
                drawn
            })
            .collect::<Vec<_>>()
    };

    let first = run();
    assert_eq!(first, run());
    assert_eq!(&first[..10], &[false, false, false, false, false, true, true, true, true, true]);
    assert_eq!(&first[10..19], &[false, false, false, false, true, true, true, true, true]);
}

#[test]
fn rectangle_and_glyph_overwrite_by_issue_order() {
    let mut term = terminal();
    let stats = frame(&mut term, |frame| {
        let main = frame.main();
        main.set_background(Rgb::RED);
        main.put_rect(0, 0, 2, 1);
        main.set_background(Rgb::BLACK);
        main.set_foreground(Rgb::GREEN);
        main.put_char(0, 0, 'x');
        main.put_char(1, 1, 'y');
        main.set_background(Rgb::BLUE);
        main.put_rect(1, 1, 1, 1);
    });
    assert_eq!(stats.rectangles, 2);
    // Glyph drawn after the red rectangle
    assert_eq!(paper(&term, 0, 0), Rgb::BLACK);
    assert_eq!(ink(&term, 0, 0), Rgb::GREEN);
    assert_eq!(paper(&term, 1, 0), Rgb::RED);
    // Blue rectangle drawn after the glyph covers it entirely
    assert_eq!(ink(&term, 1, 1), Rgb::BLUE);
}

#[test]
fn columns_wrap_within_each_buffer() {
    let mut term = terminal();
    let narrow = term.add_stream(&StreamSettings {
        offset_x: 320,
        ..StreamSettings::new(4, 4)
    });
    frame(&mut term, |frame| {
        frame.main().set_foreground(Rgb::RED);
        frame.main().put_char(82, 0, 'a');
        let side = frame.stream(narrow).unwrap();
        side.set_foreground(Rgb::GREEN);
        side.put_char(5, 0, 'b');
    });
    // Main: 80 columns, column 82 lands on (2, 1)
    assert_eq!(ink(&term, 2, 1), Rgb::RED);
    // Side: 4 columns, column 5 lands on (1, 1), shifted 320 px right
    assert_eq!(ink(&term, 40 + 1, 1), Rgb::GREEN);
}

#[test]
fn scale_and_offset_place_cells() {
    let mut term = terminal();
    let big = term.add_stream(&StreamSettings {
        offset_x: 100,
        offset_y: 50,
        scale_x: 2,
        scale_y: 2,
        reflow: false,
        ..StreamSettings::new(10, 5)
    });
    frame(&mut term, |frame| {
        let stream = frame.stream(big).unwrap();
        stream.set_foreground(Rgb::GREEN);
        stream.set_background(Rgb::BLUE);
        stream.put_char(1, 1, 'x');
    });
    let log = term.backend().recording().draw_log();
    assert!(log
        .iter()
        .any(|call| matches!(call, DrawCall::CopyTexture(_, rect) if rect.x == 116 && rect.y == 82 && rect.width == 16 && rect.height == 32)));

    let surface = term.backend().recording();
    assert_eq!(surface.pixel(116, 82), Some(Rgb::BLUE));
    assert_eq!(surface.pixel(116 + 8, 82 + 16), Some(Rgb::GREEN));
}

#[test]
fn streams_composite_in_creation_order() {
    let mut term = terminal();
    let overlay = term.add_stream(&StreamSettings::new(80, 30));
    frame(&mut term, |frame| {
        frame.main().set_background(Rgb::RED);
        frame.main().put_rect(0, 0, 1, 1);
        let top = frame.stream(overlay).unwrap();
        top.set_background(Rgb::BLUE);
        top.put_rect(0, 0, 1, 1);
    });
    assert_eq!(paper(&term, 0, 0), Rgb::BLUE);
}

#[test]
fn glyph_drawn_as_background_fill_then_copy() {
    let mut term = terminal();
    frame(&mut term, |frame| frame.main().put_char(0, 0, 'x'));
    let calls: Vec<&DrawCall> = term
        .backend()
        .recording()
        .draw_log()
        .iter()
        .filter(|call| matches!(call, DrawCall::FillRect(..) | DrawCall::CopyTexture(..)))
        .collect();
    assert!(matches!(calls[0], DrawCall::FillRect(_, Rgb::BLACK)));
    assert!(matches!(calls[1], DrawCall::CopyTexture(..)));
}

#[test]
fn blended_glyphs_composite_over_key_background() {
    let mut settings = settings();
    settings.font.quality = RenderQuality::Blended;
    let mut term = terminal_with(settings);
    frame(&mut term, |frame| {
        let main = frame.main();
        main.set_background(Rgb::BLUE);
        main.set_foreground(Rgb::WHITE);
        main.put_char(0, 0, 'x');
    });
    assert_eq!(paper(&term, 0, 0), Rgb::BLUE);
    assert_eq!(ink(&term, 0, 0), Rgb::WHITE);
}

#[test]
fn quantized_colors_share_cache_entries() {
    let mut settings = settings();
    settings.color_depth = ColorDepth::new(1).unwrap();
    settings.auto_clear_cache = false;
    let mut term = terminal_with(settings);
    let stats = frame(&mut term, |frame| {
        let main = frame.main();
        main.set_foreground(Rgb::new(200, 0, 0));
        main.cputs('a');
        main.set_foreground(Rgb::new(250, 60, 0));
        main.cputs('a');
    });
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(ink(&term, 0, 0), Rgb::RED);
}

#[test]
fn producer_thread_batches_reach_stream() {
    let mut term = terminal();
    let (tx, rx) = command_channel();
    term.attach_receiver(StreamId::MAIN, rx);

    std::thread::spawn(move || {
        let mut buffer = console_core::CellBuffer::new(80, 30);
        buffer.set_foreground(Rgb::GREEN);
        buffer.cputsxy(0, 0, "hi");
        tx.submit(&mut buffer);
    })
    .join()
    .unwrap();

    let stats = frame(&mut term, |_| {});
    assert_eq!(stats.characters, 2);
    assert_eq!(ink(&term, 1, 0), Rgb::GREEN);
}

#[test]
fn custom_cell_size_drives_resize() {
    let backend = HeadlessBackend::new(100, 100).with_cell_size(CellSize::new(10, 20));
    let mut term = Terminal::with_backend(backend, settings()).unwrap();
    term.backend_mut()
        .push_event(console_core::BackendEvent::Resized { width: 205, height: 99 });
    frame(&mut term, |_| {});
    assert_eq!(term.stream(StreamId::MAIN).unwrap().shape(), (20, 4));
}
