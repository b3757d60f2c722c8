//! Drawing surfaces and frame composition.
//!
//! [`Surface`] is the drawing half of the rendering provider. [`Canvas`] is a
//! software implementation over a `0RGB` pixel buffer that any windowing
//! [`crate::Display`] can present.

pub mod canvas;
pub mod compositor;
pub mod font;

use image::RgbImage;

use crate::image_pipeline::layout::{CellMetrics, Rect};

/// Glyph measured when sizing grid cells; the widest glyph in common
/// monospace fonts.
pub const REFERENCE_GLYPH: char = 'W';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextSize {
    /// Grid and status text.
    Body,
    /// Large centered notices.
    Banner,
}

/// Coverage mask for one rasterized glyph, positioned relative to the top
/// left corner of its cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphBitmap {
    pub width: usize,
    pub height: usize,
    pub left: i32,
    pub top: i32,
    pub coverage: Vec<u8>,
}

/// Source of glyph shapes and metrics.
pub trait GlyphSource {
    /// Horizontal advance of `ch` at `size` pixels.
    fn advance(&self, ch: char, size: f32) -> u32;

    /// Distance between consecutive text lines at `size` pixels.
    fn line_height(&self, size: f32) -> u32;

    fn rasterize(&self, ch: char, size: f32) -> GlyphBitmap;
}

/// Target that one composed frame is drawn onto.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self, rgb: [u8; 3]);

    /// Size of a single body glyph cell, never zero. Measuring
    /// [`REFERENCE_GLYPH`] gives the grid pitch.
    fn measure_glyph(&self, ch: char) -> CellMetrics;

    /// Extent of a single line of text.
    fn measure_text(&self, text: &str, size: TextSize) -> (u32, u32);

    /// Draws `ch` with its cell's top left corner at `(x, y)`.
    fn draw_glyph(&mut self, ch: char, rgb: [u8; 3], x: i32, y: i32);

    fn draw_text(&mut self, text: &str, rgb: [u8; 3], x: i32, y: i32, size: TextSize);

    /// Alpha-blends a solid rectangle; `rgba[3]` is the opacity.
    fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]);

    /// Opaque border drawn inside `rect`.
    fn stroke_rect(&mut self, rect: Rect, rgb: [u8; 3], thickness: u32);

    fn blit(&mut self, image: &RgbImage, x: i32, y: i32);

    /// Packed `0RGB` pixels, row-major.
    fn pixels(&self) -> &[u32];
}
