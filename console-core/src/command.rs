//! Paint commands queued by a cell buffer and replayed by the compositor

use crate::color::Rgb;
use crate::pen::{PenState, StyleFlags};

/// A character drawn at one cell with a snapshot of the pen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterCell {
    pub codepoint: char,
    pub column: usize,
    pub row: usize,
    pub foreground: Rgb,
    pub background: Rgb,
    pub styles: StyleFlags,
    pub scale_x: u32,
    pub scale_y: u32,
}

impl CharacterCell {
    /// Snapshot the pen into a new cell
    pub fn from_pen(
        codepoint: char,
        column: usize,
        row: usize,
        pen: &PenState,
        scale: (u32, u32),
    ) -> Self {
        Self {
            codepoint,
            column,
            row,
            foreground: pen.foreground,
            background: pen.background,
            styles: pen.styles,
            scale_x: scale.0,
            scale_y: scale.1,
        }
    }

    /// Whether the cell draws nothing but background
    pub fn is_blank(&self) -> bool {
        self.codepoint == ' '
    }
}

/// A rectangle filled with a solid color, sized in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangleFill {
    pub column: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
    pub color: Rgb,
}

/// A queued draw awaiting composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintCommand {
    Character(CharacterCell),
    Rectangle(RectangleFill),
}

impl PaintCommand {
    /// Cell coordinate the command is anchored at
    pub fn position(&self) -> (usize, usize) {
        match self {
            PaintCommand::Character(cell) => (cell.column, cell.row),
            PaintCommand::Rectangle(rect) => (rect.column, rect.row),
        }
    }
}

impl From<CharacterCell> for PaintCommand {
    fn from(cell: CharacterCell) -> Self {
        PaintCommand::Character(cell)
    }
}

impl From<RectangleFill> for PaintCommand {
    fn from(rect: RectangleFill) -> Self {
        PaintCommand::Rectangle(rect)
    }
}
