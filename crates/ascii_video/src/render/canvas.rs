use std::collections::HashMap;

use image::RgbImage;

use super::{GlyphBitmap, GlyphSource, Surface, TextSize};
use crate::image_pipeline::layout::{CellMetrics, Rect};

/// Height of banner text relative to body text.
const BANNER_SCALE: f32 = 3.6;

/// Software surface backed by a `0RGB` pixel buffer.
pub struct Canvas<G> {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    glyphs: G,
    body_size: f32,
    glyph_cache: HashMap<(char, TextSize), GlyphBitmap>,
}

impl<G: GlyphSource> Canvas<G> {
    pub fn new(width: u32, height: u32, glyphs: G, body_size: f32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            glyphs,
            body_size,
            glyph_cache: HashMap::new(),
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Reallocates the pixel buffer, cleared to black.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize];
    }

    pub fn glyphs(&self) -> &G {
        &self.glyphs
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpack(self.pixels[self.index(x, y)]))
    }

    fn font_size(&self, size: TextSize) -> f32 {
        match size {
            TextSize::Body => self.body_size,
            TextSize::Banner => self.body_size * BANNER_SCALE,
        }
    }

    fn draw_char(&mut self, ch: char, rgb: [u8; 3], x: i32, y: i32, size: TextSize) {
        let font_px = self.font_size(size);
        let glyphs = &self.glyphs;
        let bitmap =
            self.glyph_cache.entry((ch, size)).or_insert_with(|| glyphs.rasterize(ch, font_px));

        for row in 0..bitmap.height {
            let py = y + bitmap.top + row as i32;
            if py < 0 || py >= self.height as i32 {
                continue;
            }
            for col in 0..bitmap.width {
                let px = x + bitmap.left + col as i32;
                if px < 0 || px >= self.width as i32 {
                    continue;
                }
                let coverage = bitmap.coverage[row * bitmap.width + col];
                if coverage == 0 {
                    continue;
                }
                let idx = py as usize * self.width as usize + px as usize;
                self.pixels[idx] = blend(self.pixels[idx], rgb, coverage);
            }
        }
    }

    /// Visible part of `rect`, as pixel ranges.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.max(0) as i64;
        let y0 = rect.y.max(0) as i64;
        let x1 = (rect.x as i64 + rect.width as i64).min(self.width as i64);
        let y1 = (rect.y as i64 + rect.height as i64).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn fill_opaque(&mut self, rect: Rect, rgb: [u8; 3]) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        let pixel = pack(rgb);
        for y in y0..y1 {
            let start = self.index(0, y);
            self.pixels[start + x0 as usize..start + x1 as usize].fill(pixel);
        }
    }
}

impl<G: GlyphSource> Surface for Canvas<G> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, rgb: [u8; 3]) {
        self.pixels.fill(pack(rgb));
    }

    fn measure_glyph(&self, ch: char) -> CellMetrics {
        CellMetrics {
            width: self.glyphs.advance(ch, self.body_size).max(1),
            height: self.glyphs.line_height(self.body_size).max(1),
        }
    }

    fn measure_text(&self, text: &str, size: TextSize) -> (u32, u32) {
        let px = self.font_size(size);
        let width = text.chars().map(|ch| self.glyphs.advance(ch, px)).sum();
        (width, self.glyphs.line_height(px))
    }

    fn draw_glyph(&mut self, ch: char, rgb: [u8; 3], x: i32, y: i32) {
        self.draw_char(ch, rgb, x, y, TextSize::Body);
    }

    fn draw_text(&mut self, text: &str, rgb: [u8; 3], x: i32, y: i32, size: TextSize) {
        let px = self.font_size(size);
        let mut pen = x;
        for ch in text.chars() {
            self.draw_char(ch, rgb, pen, y, size);
            pen += self.glyphs.advance(ch, px) as i32;
        }
    }

    fn fill_rect(&mut self, rect: Rect, rgba: [u8; 4]) {
        let [r, g, b, alpha] = rgba;
        if alpha == 255 {
            self.fill_opaque(rect, [r, g, b]);
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = self.index(x, y);
                self.pixels[idx] = blend(self.pixels[idx], [r, g, b], alpha);
            }
        }
    }

    fn stroke_rect(&mut self, rect: Rect, rgb: [u8; 3], thickness: u32) {
        let t = thickness.min(rect.width / 2 + 1).min(rect.height / 2 + 1);
        let right = rect.x + rect.width as i32 - t as i32;
        let bottom = rect.y + rect.height as i32 - t as i32;

        self.fill_opaque(Rect::new(rect.x, rect.y, rect.width, t), rgb);
        self.fill_opaque(Rect::new(rect.x, bottom, rect.width, t), rgb);
        self.fill_opaque(Rect::new(rect.x, rect.y, t, rect.height), rgb);
        self.fill_opaque(Rect::new(right, rect.y, t, rect.height), rgb);
    }

    fn blit(&mut self, image: &RgbImage, x: i32, y: i32) {
        let target = Rect::new(x, y, image.width(), image.height());
        let Some((x0, y0, x1, y1)) = self.clip(target) else {
            return;
        };
        for py in y0..y1 {
            for px in x0..x1 {
                let src = image.get_pixel((px as i32 - x) as u32, (py as i32 - y) as u32);
                let idx = self.index(px, py);
                self.pixels[idx] = pack(src.0);
            }
        }
    }

    fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

pub fn pack([r, g, b]: [u8; 3]) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

pub fn unpack(pixel: u32) -> [u8; 3] {
    [(pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8]
}

fn blend(dst: u32, src: [u8; 3], alpha: u8) -> u32 {
    let alpha = u32::from(alpha);
    let inv = 255 - alpha;
    let dst = unpack(dst);
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * inv + 127) / 255) as u8;
    pack([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2])])
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;
    use crate::render::REFERENCE_GLYPH;
    use crate::testing::BlockGlyphs;

    fn canvas(width: u32, height: u32) -> Canvas<BlockGlyphs> {
        Canvas::new(width, height, BlockGlyphs::new(4, 8), 10.0)
    }

    #[test]
    fn glyphs_advance_by_fixed_pitch() {
        let mut canvas = canvas(32, 16);
        canvas.draw_text("ab", [255, 0, 0], 0, 0, TextSize::Body);

        assert_eq!(canvas.measure_text("ab", TextSize::Body), (8, 8));
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(4, 0), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(8, 0), Some([0, 0, 0]));
    }

    #[test]
    fn reference_glyph_sets_the_cell_size() {
        let canvas = canvas(0, 0);
        assert_eq!(canvas.measure_glyph(REFERENCE_GLYPH), CellMetrics { width: 4, height: 8 });

        let empty = Canvas::new(0, 0, BlockGlyphs::new(0, 0), 10.0);
        assert_eq!(empty.measure_glyph(REFERENCE_GLYPH), CellMetrics { width: 1, height: 1 });
    }

    #[test]
    fn resize_reallocates_a_black_surface() {
        let mut canvas = canvas(2, 2);
        canvas.clear([9, 9, 9]);
        canvas.resize(5, 3);

        assert_eq!(canvas.size(), (5, 3));
        assert_eq!(canvas.pixels().len(), 15);
        assert_eq!(canvas.pixel(4, 2), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(5, 2), None);
    }

    #[test]
    fn translucent_fill_blends_with_background() {
        let mut canvas = canvas(4, 4);
        canvas.clear([255, 255, 255]);
        canvas.fill_rect(Rect::new(0, 0, 2, 2), [0, 0, 0, 200]);

        assert_eq!(canvas.pixel(0, 0), Some([55, 55, 55]));
        assert_eq!(canvas.pixel(3, 3), Some([255, 255, 255]));
    }

    #[test]
    fn stroke_stays_inside_rect() {
        let mut canvas = canvas(10, 10);
        canvas.stroke_rect(Rect::new(2, 2, 6, 6), [255, 255, 255], 2);

        assert_eq!(canvas.pixel(2, 2), Some([255, 255, 255]));
        assert_eq!(canvas.pixel(3, 5), Some([255, 255, 255]));
        assert_eq!(canvas.pixel(4, 4), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(8, 8), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(7, 7), Some([255, 255, 255]));
    }

    #[test]
    fn drawing_is_clipped_to_the_surface() {
        let mut canvas = canvas(6, 6);
        let image = RgbImage::from_pixel(4, 4, Rgb([1, 2, 3]));
        canvas.blit(&image, 4, -2);
        canvas.fill_rect(Rect::new(-10, -10, 5, 5), [9, 9, 9, 255]);
        canvas.draw_glyph('x', [7, 7, 7], 5, 5);

        assert_eq!(canvas.pixel(5, 0), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(5, 2), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(5, 5), Some([7, 7, 7]));
    }
}
