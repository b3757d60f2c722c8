use crate::PlayerError;

/// Blank border around the glyph grid, in pixels.
pub const SURFACE_MARGIN: u32 = 10;
pub const PREVIEW_WIDTH: u32 = 240;
/// Distance between the preview and the bottom-right surface edges.
pub const PREVIEW_INSET: i32 = 15;
/// Backdrop and border grow this far past each preview edge.
pub const PREVIEW_BORDER: i32 = 2;

/// Largest surface accepted, in pixels (8192 x 8192).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 26;

/// Glyphs are roughly twice as tall as they are wide.
const GLYPH_ASPECT_CORRECTION: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Grows the rectangle by `amount` on every side.
    pub fn inflate(&self, amount: i32) -> Self {
        let grow = |len: u32| (len as i64 + 2 * amount as i64).max(0) as u32;
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: grow(self.width),
            height: grow(self.height),
        }
    }
}

/// Pixel size of one monospace cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
}

/// Fixed layout for a playback session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u32,
    pub rows: u32,
    pub cell: CellMetrics,
    pub surface_width: u32,
    pub surface_height: u32,
    /// Where the preview pixels go.
    pub preview: Rect,
}

impl Geometry {
    pub fn grid_origin(&self) -> (i32, i32) {
        (SURFACE_MARGIN as i32, SURFACE_MARGIN as i32)
    }

    /// Backdrop and border area around the preview.
    pub fn preview_backdrop(&self) -> Rect {
        self.preview.inflate(PREVIEW_BORDER)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutCalculator {
    pub columns: i64,
    pub rows: Option<i64>,
}

impl LayoutCalculator {
    pub fn new(columns: i64, rows: Option<i64>) -> Self {
        Self { columns, rows }
    }

    /// Rows derived from the source aspect ratio when none are requested.
    pub fn derive_rows(columns: i64, source_width: u32, source_height: u32) -> i64 {
        let aspect = source_width as f64 / source_height as f64;
        (columns as f64 / aspect * GLYPH_ASPECT_CORRECTION).floor() as i64
    }

    pub fn derive(
        &self,
        source_width: u32,
        source_height: u32,
        cell: CellMetrics,
    ) -> Result<Geometry, PlayerError> {
        if source_width == 0 || source_height == 0 {
            return Err(PlayerError::InvalidConfiguration(format!(
                "degenerate source resolution {source_width}x{source_height}"
            )));
        }
        if self.columns <= 0 {
            return Err(PlayerError::InvalidConfiguration(format!(
                "grid width must be positive, got {}",
                self.columns
            )));
        }

        let rows = match self.rows {
            Some(rows) => rows,
            None => Self::derive_rows(self.columns, source_width, source_height),
        };
        if rows <= 0 {
            return Err(PlayerError::InvalidConfiguration(format!(
                "grid height must be positive, got {rows}"
            )));
        }

        let columns = to_u32(self.columns)?;
        let rows = to_u32(rows)?;
        let cell = CellMetrics { width: cell.width.max(1), height: cell.height.max(1) };

        let surface_width = columns
            .checked_mul(cell.width)
            .and_then(|w| w.checked_add(2 * SURFACE_MARGIN))
            .ok_or_else(|| PlayerError::InvalidConfiguration("surface too wide".into()))?;
        let surface_height = rows
            .checked_mul(cell.height)
            .and_then(|h| h.checked_add(2 * SURFACE_MARGIN))
            .ok_or_else(|| PlayerError::InvalidConfiguration("surface too tall".into()))?;
        if surface_width as u64 * surface_height as u64 > MAX_SURFACE_PIXELS {
            return Err(PlayerError::InvalidConfiguration(format!(
                "{columns}x{rows} grid needs a {surface_width}x{surface_height} surface, \
                 more than {MAX_SURFACE_PIXELS} pixels"
            )));
        }

        let preview_height =
            ((PREVIEW_WIDTH as u64 * source_height as u64) / source_width as u64).max(1) as u32;
        let preview = Rect::new(
            surface_width as i32 - PREVIEW_WIDTH as i32 - PREVIEW_INSET,
            surface_height as i32 - preview_height as i32 - PREVIEW_INSET,
            PREVIEW_WIDTH,
            preview_height,
        );

        Ok(Geometry { columns, rows, cell, surface_width, surface_height, preview })
    }
}

fn to_u32(value: i64) -> Result<u32, PlayerError> {
    u32::try_from(value)
        .map_err(|_| PlayerError::InvalidConfiguration(format!("grid dimension {value} too large")))
}
