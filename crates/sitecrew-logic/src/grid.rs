//! Discrete cell grid — cell identity, bounds, and cell↔pixel conversion.

use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// A grid cell addressed by (column, row). Identity is by value so cells
/// can key sets and maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// The four orthogonal neighbors (may be out of bounds).
    pub fn neighbors(&self) -> [Cell; 4] {
        [
            Cell::new(self.col + 1, self.row),
            Cell::new(self.col - 1, self.row),
            Cell::new(self.col, self.row + 1),
            Cell::new(self.col, self.row - 1),
        ]
    }

    /// Manhattan distance, the A* heuristic for a 4-connected grid.
    pub fn manhattan(&self, other: &Cell) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }
}

/// Grid dimensions plus the pixel size of one cell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: i32,
    pub rows: i32,
    pub cell_size: f32,
}

impl GridSpec {
    pub fn new(cols: i32, rows: i32, cell_size: f32) -> Self {
        Self {
            cols,
            rows,
            cell_size,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && cell.col < self.cols && cell.row < self.rows
    }

    pub fn width_px(&self) -> f32 {
        self.cols as f32 * self.cell_size
    }

    pub fn height_px(&self) -> f32 {
        self.rows as f32 * self.cell_size
    }

    pub fn world_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width_px(), self.height_px())
    }

    /// The cell containing a world-space point, clamped into bounds.
    pub fn point_to_cell(&self, point: Point) -> Cell {
        let col = ((point.x / self.cell_size).floor() as i32).clamp(0, self.cols - 1);
        let row = ((point.y / self.cell_size).floor() as i32).clamp(0, self.rows - 1);
        Cell::new(col, row)
    }

    /// World-space center of a cell.
    pub fn cell_center(&self, cell: Cell) -> Point {
        Point::new(
            cell.col as f32 * self.cell_size + self.cell_size / 2.0,
            cell.row as f32 * self.cell_size + self.cell_size / 2.0,
        )
    }

    /// World-space rect covering a cell.
    pub fn cell_rect(&self, cell: Cell) -> Rect {
        Rect::new(
            cell.col as f32 * self.cell_size,
            cell.row as f32 * self.cell_size,
            self.cell_size,
            self.cell_size,
        )
    }
}
