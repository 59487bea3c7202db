//! Cell buffer: a grid shape, a cursor, a pen and a queue of paint commands
//!
//! Drawing operations never touch pixels. They snapshot the pen into a
//! `PaintCommand` and append it to the queue, which the compositor replays in
//! issue order. Coordinates are not clamped here: anything outside the shape
//! at composite time is skipped.

use crate::color::Rgb;
use crate::command::{CharacterCell, PaintCommand, RectangleFill};
use crate::cursor::{Blink, CursorStyle};
use crate::pen::{PenState, Style};
use crate::settings::{CursorSettings, StreamSettings};

/// An independently positioned and scaled grid of cells
#[derive(Debug, Clone)]
pub struct CellBuffer {
    columns: usize,
    rows: usize,
    cursor_x: usize,
    cursor_y: usize,
    pen: PenState,
    pixel_offset: (i32, i32),
    scale: (u32, u32),
    reflow: bool,
    cursor_style: CursorStyle,
    cursor_color: Rgb,
    blink: Blink,
    commands: Vec<PaintCommand>,
}

impl CellBuffer {
    /// Create a buffer with the given shape and default geometry
    pub fn new(columns: usize, rows: usize) -> Self {
        Self::from_settings(&StreamSettings::new(columns, rows))
    }

    pub fn from_settings(settings: &StreamSettings) -> Self {
        let cursor = CursorSettings::default();
        Self {
            columns: settings.columns,
            rows: settings.rows,
            cursor_x: 0,
            cursor_y: 0,
            pen: PenState::new(),
            pixel_offset: (settings.offset_x, settings.offset_y),
            scale: (settings.scale_x.max(1), settings.scale_y.max(1)),
            reflow: settings.reflow,
            cursor_style: cursor.style,
            cursor_color: cursor.color,
            blink: Blink::new(cursor.blink_rate, cursor.blink_on),
            commands: Vec::new(),
        }
    }

    /// Apply cursor style, color and blink timing
    pub fn apply_cursor_settings(&mut self, settings: &CursorSettings) {
        self.cursor_style = settings.style;
        self.cursor_color = settings.color;
        self.blink.set_timing(settings.blink_rate, settings.blink_on);
    }

    // Shape and geometry

    /// (columns, rows)
    pub fn shape(&self) -> (usize, usize) {
        (self.columns, self.rows)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Update the shape only; queued commands are kept as they are
    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.columns = columns;
        self.rows = rows;
    }

    pub fn pixel_offset(&self) -> (i32, i32) {
        self.pixel_offset
    }

    pub fn set_pixel_offset(&mut self, x: i32, y: i32) {
        self.pixel_offset = (x, y);
    }

    pub fn scale(&self) -> (u32, u32) {
        self.scale
    }

    /// Set the integer cell scale; zero is raised to one
    pub fn set_scale(&mut self, x: u32, y: u32) {
        self.scale = (x.max(1), y.max(1));
    }

    /// Whether window resizes update this buffer's shape
    pub fn reflow(&self) -> bool {
        self.reflow
    }

    pub fn set_reflow(&mut self, reflow: bool) {
        self.reflow = reflow;
    }

    // Cursor

    /// Move the cursor without drawing
    pub fn gotoxy(&mut self, x: usize, y: usize) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn wherex(&self) -> usize {
        self.cursor_x
    }

    pub fn wherey(&self) -> usize {
        self.cursor_y
    }

    /// (x, y)
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    pub fn cursor_color(&self) -> Rgb {
        self.cursor_color
    }

    pub fn set_cursor_color(&mut self, color: impl Into<Rgb>) {
        self.cursor_color = color.into();
    }

    pub fn blink(&self) -> &Blink {
        &self.blink
    }

    pub fn blink_mut(&mut self) -> &mut Blink {
        &mut self.blink
    }

    pub fn blink_accumulator(&self) -> f32 {
        self.blink.accumulator()
    }

    // Pen

    pub fn pen(&self) -> &PenState {
        &self.pen
    }

    /// Accepts `(r, g, b)`, `[r, g, b]`, a packed `0xRRGGBB` or an `Rgb`
    pub fn set_foreground(&mut self, color: impl Into<Rgb>) {
        self.pen.foreground = color.into();
    }

    pub fn set_background(&mut self, color: impl Into<Rgb>) {
        self.pen.background = color.into();
    }

    pub fn set_style(&mut self, style: Style, on: bool) {
        self.pen.styles.set(style, on);
    }

    pub fn bold(&mut self, on: bool) {
        self.set_style(Style::Bold, on);
    }

    pub fn italic(&mut self, on: bool) {
        self.set_style(Style::Italic, on);
    }

    pub fn underline(&mut self, on: bool) {
        self.set_style(Style::Underline, on);
    }

    pub fn strikethrough(&mut self, on: bool) {
        self.set_style(Style::Strikethrough, on);
    }

    /// Restore default colors and styles and home the cursor
    ///
    /// The command queue and the scale are left untouched.
    pub fn reset_all(&mut self) {
        self.pen.reset();
        self.gotoxy(0, 0);
    }

    // Drawing

    /// Queue a character at (x, y) and move the cursor there without advancing
    pub fn put_char(&mut self, x: usize, y: usize, codepoint: char) {
        let cell = CharacterCell::from_pen(codepoint, x, y, &self.pen, self.scale);
        self.commands.push(cell.into());
        self.gotoxy(x, y);
    }

    /// Queue a character at the cursor and advance one column
    pub fn cputs(&mut self, codepoint: char) {
        let (x, y) = self.cursor();
        self.put_char(x, y, codepoint);
        self.cursor_x = x + 1;
    }

    /// Queue a string starting at (x, y)
    ///
    /// `\n` returns to column `x` on the next row. The cursor ends on the
    /// position after the last character.
    pub fn cputsxy(&mut self, x: usize, y: usize, text: &str) {
        let (mut col, mut row) = (x, y);
        for ch in text.chars() {
            if ch == '\n' {
                col = x;
                row += 1;
            } else {
                self.put_char(col, row, ch);
                col += 1;
            }
        }
        self.gotoxy(col, row);
    }

    /// Queue a string at the cursor
    pub fn print(&mut self, text: &str) {
        let (x, y) = self.cursor();
        self.cputsxy(x, y, text);
    }

    /// Queue a rectangle in the current background color
    pub fn put_rect(&mut self, x: usize, y: usize, width: usize, height: usize) {
        self.commands.push(
            RectangleFill {
                column: x,
                row: y,
                width,
                height,
                color: self.pen.background,
            }
            .into(),
        );
    }

    /// Clear from the cursor to the end of the row with the current background
    pub fn clreol(&mut self) {
        let width = self.columns.saturating_sub(self.cursor_x);
        if width > 0 {
            self.put_rect(self.cursor_x, self.cursor_y, width, 1);
        }
    }

    // Queue

    /// Empty the command queue; pen and cursor are kept
    pub fn clrscr(&mut self) {
        self.commands.clear();
    }

    /// Queued commands in issue order
    pub fn commands(&self) -> &[PaintCommand] {
        &self.commands
    }

    /// Remove and return every queued command
    pub fn take_commands(&mut self) -> Vec<PaintCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Append commands after the ones already queued
    pub fn extend_commands<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = PaintCommand>,
    {
        self.commands.extend(commands);
    }
}

impl Default for CellBuffer {
    fn default() -> Self {
        Self::from_settings(&StreamSettings::default())
    }
}
