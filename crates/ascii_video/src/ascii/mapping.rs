use crate::image_pipeline::adjust;
use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::layout::Geometry;

use super::{
    charset::CharacterSet,
    grid::{Cell, GlyphGrid},
};

/// Turns decoded frames into glyph grids.
///
/// Conversion is pure: the output depends only on the frame, the grid size
/// and the mapper's settings, never on earlier frames.
#[derive(Clone, Debug)]
pub struct GlyphMapper {
    charset: CharacterSet,
    color: bool,
}

impl GlyphMapper {
    pub fn new(charset: CharacterSet, color: bool) -> Self {
        Self { charset, color }
    }

    pub fn map_frame(&self, frame: &Frame, geometry: &Geometry) -> GlyphGrid {
        self.map_sized(frame, geometry.columns, geometry.rows)
    }

    pub fn map_sized(&self, frame: &Frame, columns: u32, rows: u32) -> GlyphGrid {
        let resized = frame.resample(columns, rows);

        let mut luminance = adjust::extract_luma(&resized);
        adjust::equalize_histogram(&mut luminance);

        let cells = luminance
            .iter()
            .zip(resized.as_bgr().chunks_exact(3))
            .map(|(&level, bgr)| {
                let index = self.charset.index_for_level(level);
                let color = self.color.then(|| [bgr[0], bgr[1], bgr[2]]);
                Cell::new(self.charset.char_at(index), index, color)
            })
            .collect();

        GlyphGrid::new(columns, rows, cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..height {
            for x in 0..width {
                let level = (x * 255 / (width - 1)) as u8;
                data.extend_from_slice(&[level, level, level]);
            }
        }
        Frame::from_bgr(width, height, data).unwrap()
    }

    #[test]
    fn grid_matches_requested_size_for_any_frame() {
        let mapper = GlyphMapper::new(CharacterSet::standard(), true);
        for frame in [Frame::filled(640, 480, [0; 3]), gradient_frame(33, 7), Frame::filled(1, 1, [9; 3])]
        {
            let grid = mapper.map_sized(&frame, 40, 15);
            assert_eq!((grid.width, grid.height), (40, 15));
            assert_eq!(grid.cells.len(), 600);
        }
    }

    #[test]
    fn black_frame_uses_darkest_glyph() {
        let mapper = GlyphMapper::new(CharacterSet::extended(), false);
        let grid = mapper.map_sized(&Frame::filled(64, 48, [0; 3]), 16, 6);

        assert!(grid.cells.iter().all(|cell| cell.index == 0 && cell.ch == ' '));
        assert!(grid.cells.iter().all(|cell| cell.color.is_none()));
    }

    #[test]
    fn brighter_columns_never_get_darker_glyphs() {
        let mapper = GlyphMapper::new(CharacterSet::standard(), false);
        let grid = mapper.map_sized(&gradient_frame(64, 4), 32, 4);

        for row in grid.row_cells() {
            for pair in row.windows(2) {
                assert!(pair[0].index <= pair[1].index);
            }
            assert_eq!(row[0].index, 0);
            assert_eq!(row[row.len() - 1].index, 11);
        }
    }

    #[test]
    fn color_cells_keep_native_order() {
        let mapper = GlyphMapper::new(CharacterSet::standard(), true);
        let grid = mapper.map_sized(&Frame::filled(8, 8, [10, 20, 30]), 4, 2);

        assert!(grid.cells.iter().all(|cell| cell.color == Some([10, 20, 30])));
        assert_eq!(grid.cells[0].rgb(), Some([30, 20, 10]));
    }

    #[test]
    fn cell_glyph_always_matches_its_index() {
        let charset = CharacterSet::extended();
        let mapper = GlyphMapper::new(charset.clone(), true);
        let grid = mapper.map_sized(&gradient_frame(100, 10), 50, 5);

        for cell in &grid.cells {
            assert_eq!(charset.char_at(cell.index), cell.ch);
        }
    }

    #[test]
    fn conversion_is_deterministic() {
        let mapper = GlyphMapper::new(CharacterSet::standard(), true);
        let frame = gradient_frame(90, 30);
        assert_eq!(mapper.map_sized(&frame, 30, 10), mapper.map_sized(&frame, 30, 10));
    }
}
