//! Mochi Console Font
//!
//! Font resource for the virtual console, built on fontdue:
//! - Fixed cell size derived from the space character
//! - Solid, shaded, subpixel and blended rendering
//! - ASCII, UTF-8 and UCS-2 encodings
//! - Synthesized bold, italic, underline and strikethrough

pub mod coverage;
pub mod font;

pub use coverage::{CoverageMask, GlyphBitmap};
pub use font::{system_font_paths, FontdueResource};
