#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    /// Position of `ch` in the active character set.
    pub index: usize,
    /// Sample color in the frame's native blue, green, red order.
    pub color: Option<[u8; 3]>,
}

impl Cell {
    pub fn new(ch: char, index: usize, color: Option<[u8; 3]>) -> Self {
        Self { ch, index, color }
    }

    /// Sample color reordered for display, if the grid was built with color.
    pub fn rgb(&self) -> Option<[u8; 3]> {
        self.color.map(|[b, g, r]| [r, g, b])
    }
}

/// Row-major grid of converted cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphGrid {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

impl GlyphGrid {
    pub fn new(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        assert_eq!(width as usize * height as usize, cells.len());
        Self { width, height, cells }
    }

    pub fn cell(&self, column: u32, row: u32) -> Option<&Cell> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row as usize * self.width as usize + column as usize)
    }

    pub fn row_cells(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.width.max(1) as usize)
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.row_cells().map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
    }
}
