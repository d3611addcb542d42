//! Geometric primitives shared by draw commands and panel frames.

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub x: f32,
    /// Y coordinate of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink by `margin` on every side, never below zero size.
    #[must_use]
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(
            self.x + margin,
            self.y + margin,
            (self.width - 2.0 * margin).max(0.0),
            (self.height - 2.0 * margin).max(0.0),
        )
    }

    /// Cell `(row, col)` (both 1-based) of a `rows x cols` grid with
    /// `spacing` between cells.
    #[must_use]
    pub fn grid_cell(&self, rows: usize, cols: usize, row: usize, col: usize, spacing: f32) -> Self {
        let rows = rows.max(1) as f32;
        let cols = cols.max(1) as f32;
        let cell_w = ((self.width - spacing * (cols - 1.0)) / cols).max(0.0);
        let cell_h = ((self.height - spacing * (rows - 1.0)) / rows).max(0.0);
        let c = col.saturating_sub(1) as f32;
        let r = row.saturating_sub(1) as f32;
        Self::new(self.x + c * (cell_w + spacing), self.y + r * (cell_h + spacing), cell_w, cell_h)
    }
}
