use super::{Surface, TextSize};
use crate::ascii::charset::CharacterSet;
use crate::ascii::grid::GlyphGrid;
use crate::image_pipeline::frame::Frame;
use crate::image_pipeline::layout::{Geometry, Rect};

pub const BACKGROUND: [u8; 3] = [0, 0, 0];
/// Opacity of the dark panels behind the preview and the status line.
pub const BACKDROP_ALPHA: u8 = 200;
pub const PREVIEW_BORDER_COLOR: [u8; 3] = [255, 255, 255];
pub const PREVIEW_BORDER_WIDTH: u32 = 2;
pub const STATUS_COLOR: [u8; 3] = [200, 200, 200];
pub const PAUSED_COLOR: [u8; 3] = [255, 255, 0];
pub const PAUSED_TEXT: &str = "PAUSED - Press SPACE to continue";
/// Vertical center of the paused banner.
const PAUSED_CENTER_Y: i32 = 30;
const STATUS_PAD_X: u32 = 10;
const STATUS_PAD_Y: u32 = 6;

/// Draws converted frames, the preview overlay and status text.
///
/// Holds no playback state; every call gets exactly what it draws.
#[derive(Clone, Debug)]
pub struct Compositor {
    charset: CharacterSet,
}

impl Compositor {
    pub fn new(charset: CharacterSet) -> Self {
        Self { charset }
    }

    /// Draws one full playing frame: grid, optional preview, then status.
    pub fn compose<S: Surface>(
        &self,
        surface: &mut S,
        geometry: &Geometry,
        grid: &GlyphGrid,
        preview: Option<&Frame>,
        status: &str,
    ) {
        surface.clear(BACKGROUND);
        self.draw_grid(surface, geometry, grid);
        if let Some(frame) = preview {
            self.draw_preview(surface, geometry, frame);
        }
        self.draw_status(surface, status);
    }

    pub fn draw_grid<S: Surface>(&self, surface: &mut S, geometry: &Geometry, grid: &GlyphGrid) {
        let (origin_x, origin_y) = geometry.grid_origin();
        let pitch_x = geometry.cell.width as i32;
        let pitch_y = geometry.cell.height as i32;

        for (row, cells) in grid.row_cells().enumerate() {
            let y = origin_y + row as i32 * pitch_y;
            for (column, cell) in cells.iter().enumerate() {
                let rgb = cell.rgb().unwrap_or_else(|| {
                    let gray = self.charset.gray_for(cell.index);
                    [gray; 3]
                });
                surface.draw_glyph(cell.ch, rgb, origin_x + column as i32 * pitch_x, y);
            }
        }
    }

    pub fn draw_preview<S: Surface>(&self, surface: &mut S, geometry: &Geometry, frame: &Frame) {
        let area = geometry.preview;
        let preview = frame.resample(area.width, area.height).to_rgb_image();

        let backdrop = geometry.preview_backdrop();
        surface.fill_rect(backdrop, [BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], BACKDROP_ALPHA]);
        surface.stroke_rect(backdrop, PREVIEW_BORDER_COLOR, PREVIEW_BORDER_WIDTH);
        surface.blit(&preview, area.x, area.y);
    }

    /// Status line anchored to the bottom left corner.
    pub fn draw_status<S: Surface>(&self, surface: &mut S, text: &str) {
        let (_, height) = surface.size();
        let (text_width, text_height) = surface.measure_text(text, TextSize::Body);
        let text_y = height as i32 - text_height as i32 - 10;

        let backdrop = Rect::new(8, text_y - 2, text_width + STATUS_PAD_X, text_height + STATUS_PAD_Y);
        surface.fill_rect(backdrop, [BACKGROUND[0], BACKGROUND[1], BACKGROUND[2], BACKDROP_ALPHA]);
        surface.draw_text(text, STATUS_COLOR, 10, text_y, TextSize::Body);
    }

    /// Banner shown while paused, over whatever was last drawn.
    pub fn draw_paused<S: Surface>(&self, surface: &mut S) {
        let (width, _) = surface.size();
        let (text_width, text_height) = surface.measure_text(PAUSED_TEXT, TextSize::Banner);
        let x = width as i32 / 2 - text_width as i32 / 2;
        let y = PAUSED_CENTER_Y - text_height as i32 / 2;
        surface.draw_text(PAUSED_TEXT, PAUSED_COLOR, x, y, TextSize::Banner);
    }
}

pub fn status_text(position: u64, frame_count: u64) -> String {
    format!("Frame: {position}/{frame_count}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ascii::grid::Cell;
    use crate::image_pipeline::layout::{CellMetrics, LayoutCalculator};
    use crate::render::canvas::Canvas;
    use crate::testing::BlockGlyphs;

    fn setup() -> (Geometry, Canvas<BlockGlyphs>) {
        let cell = CellMetrics { width: 4, height: 8 };
        let geometry = LayoutCalculator::new(80, Some(40)).derive(640, 480, cell).unwrap();
        let canvas = Canvas::new(
            geometry.surface_width,
            geometry.surface_height,
            BlockGlyphs::new(4, 8),
            10.0,
        );
        (geometry, canvas)
    }

    fn uniform_grid(geometry: &Geometry, cell: Cell) -> GlyphGrid {
        let count = (geometry.columns * geometry.rows) as usize;
        GlyphGrid::new(geometry.columns, geometry.rows, vec![cell; count])
    }

    #[test]
    fn color_cells_are_drawn_in_display_order() {
        let (geometry, mut canvas) = setup();
        let grid = uniform_grid(&geometry, Cell::new('#', 9, Some([10, 20, 30])));
        Compositor::new(CharacterSet::standard()).draw_grid(&mut canvas, &geometry, &grid);

        assert_eq!(canvas.pixel(10, 10), Some([30, 20, 10]));
        assert_eq!(canvas.pixel(9, 10), Some([0, 0, 0]));
    }

    #[test]
    fn monochrome_cells_use_ramp_gray() {
        let (geometry, mut canvas) = setup();
        let grid = uniform_grid(&geometry, Cell::new('o', 6, None));
        Compositor::new(CharacterSet::standard()).draw_grid(&mut canvas, &geometry, &grid);

        assert_eq!(canvas.pixel(10 + 4 * 3, 10 + 8 * 2), Some([127, 127, 127]));
    }

    #[test]
    fn cells_advance_by_cell_pitch() {
        let (geometry, mut canvas) = setup();
        let mut cells = vec![Cell::new(' ', 0, Some([0, 0, 0])); 80 * 40];
        cells[1] = Cell::new('@', 11, Some([0, 0, 255]));
        let grid = GlyphGrid::new(80, 40, cells);
        Compositor::new(CharacterSet::standard()).draw_grid(&mut canvas, &geometry, &grid);

        assert_eq!(canvas.pixel(13, 10), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(14, 10), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(17, 17), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(18, 10), Some([0, 0, 0]));
    }

    #[test]
    fn preview_overlays_the_grid() {
        let (geometry, mut canvas) = setup();
        let grid = uniform_grid(&geometry, Cell::new('@', 11, Some([255, 255, 255])));
        let frame = Frame::filled(64, 48, [0, 0, 255]);
        Compositor::new(CharacterSet::standard()).compose(
            &mut canvas,
            &geometry,
            &grid,
            Some(&frame),
            "",
        );

        let preview = geometry.preview;
        let border = geometry.preview_backdrop();
        assert_eq!(canvas.pixel(preview.x as u32 + 5, preview.y as u32 + 5), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(border.x as u32, border.y as u32), Some([255, 255, 255]));
    }

    #[test]
    fn status_sits_bottom_left_over_backdrop() {
        let (geometry, mut canvas) = setup();
        canvas.clear([255, 255, 255]);
        let compositor = Compositor::new(CharacterSet::standard());
        compositor.draw_status(&mut canvas, &status_text(3, 10));

        let height = geometry.surface_height;
        // Text rows run from height - 18 to height - 10.
        assert_eq!(canvas.pixel(10, height - 18), Some(STATUS_COLOR));
        assert_eq!(canvas.pixel(8, height - 20), Some([55, 55, 55]));
        assert_eq!(canvas.pixel(7, height - 20), Some([255, 255, 255]));
    }

    #[test]
    fn paused_banner_is_centered_on_its_line() {
        let (geometry, mut canvas) = setup();
        canvas.clear([1, 2, 3]);
        Compositor::new(CharacterSet::standard()).draw_paused(&mut canvas);

        // 32 block glyphs of 4x8 on a 340px surface: x 106..234, y 26..34.
        assert_eq!(geometry.surface_width, 340);
        assert_eq!(canvas.pixel(106, 26), Some(PAUSED_COLOR));
        assert_eq!(canvas.pixel(233, 33), Some(PAUSED_COLOR));
        assert_eq!(canvas.pixel(105, 30), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(234, 30), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(106, 25), Some([1, 2, 3]));
        assert_eq!(canvas.pixel(106, 34), Some([1, 2, 3]));
        // The space after "PAUSED" leaves a gap.
        assert_eq!(canvas.pixel(131, 30), Some([1, 2, 3]));
    }

    #[test]
    fn status_text_format() {
        assert_eq!(status_text(12, 300), "Frame: 12/300");
    }
}
