//! Board module - manages the game grid
//!
//! The board is a `rows x cols` grid where each cell is empty or holds a piece kind.
//! Storage is a flat row-major vector sized once at construction.
//! Coordinates: (x, y) where x is the column (left to right) and y the row (top to bottom).
//!
//! Collision treats the bottom and both sides as walls, while the top is permeable:
//! a cell with `y < 0` never collides, so pieces can spawn partly above the board.

use arrayvec::ArrayVec;

use crate::config::MAX_DIMENSION;
use crate::types::{Cell, PieceKind};

/// Maximum number of rows one lock can complete (a piece spans at most 4 rows)
pub const MAX_CLEAR_ROWS: usize = 4;

/// The game board using flat array storage
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (y * cols + x)
    cells: Vec<Cell>,
}

impl Board {
    /// Create a new empty board
    ///
    /// Dimensions are clamped to `1..=MAX_DIMENSION`.
    pub fn new(rows: u8, cols: u8) -> Self {
        let rows = rows.clamp(1, MAX_DIMENSION);
        let cols = cols.clamp(1, MAX_DIMENSION);
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i8, y: i8) -> Option<usize> {
        if x < 0 || x >= self.cols as i8 || y < 0 || y >= self.rows as i8 {
            return None;
        }
        Some((y as usize) * (self.cols as usize) + (x as usize))
    }

    /// Number of columns
    pub fn width(&self) -> u8 {
        self.cols
    }

    /// Number of rows
    pub fn height(&self) -> u8 {
        self.rows
    }

    /// Get cell at position (x, y)
    /// Returns None if out of bounds
    pub fn get(&self, x: i8, y: i8) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Set cell at position (x, y)
    /// Returns false if out of bounds
    pub fn set(&mut self, x: i8, y: i8, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// Check if position is occupied (within bounds and filled)
    pub fn is_occupied(&self, x: i8, y: i8) -> bool {
        matches!(self.get(x, y), Some(Some(_)))
    }

    /// Whether a single absolute cell collides
    ///
    /// Sides and bottom are walls; rows above the board (`y < 0`) are open.
    #[inline]
    pub fn collides(&self, x: i8, y: i8) -> bool {
        if x < 0 || x >= self.cols as i8 || y >= self.rows as i8 {
            return true;
        }
        y >= 0 && self.is_occupied(x, y)
    }

    /// Whether any of the given absolute cells collides
    pub fn collision(&self, cells: &[(i8, i8)]) -> bool {
        cells.iter().any(|&(x, y)| self.collides(x, y))
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        if y >= self.rows as usize {
            return false;
        }
        let width = self.cols as usize;
        let start = y * width;
        self.cells[start..start + width].iter().all(|cell| cell.is_some())
    }

    /// Indices of all full rows, ascending
    ///
    /// Capacity is bounded by what a single lock can complete; extra rows
    /// (only reachable by editing the board directly) are ignored.
    pub fn full_rows(&self) -> ArrayVec<usize, MAX_CLEAR_ROWS> {
        let mut rows = ArrayVec::new();
        for y in 0..self.rows as usize {
            if self.is_row_full(y) && rows.try_push(y).is_err() {
                break;
            }
        }
        rows
    }

    /// Remove the given rows and insert an empty row at the top for each
    ///
    /// Rows are processed in ascending order. Removing row `r` shifts only rows
    /// above it, so later (larger) indices still point at the rows they named.
    /// Returns the number of rows removed.
    pub fn clear_rows(&mut self, rows: &[usize]) -> usize {
        let mut sorted: ArrayVec<usize, MAX_CLEAR_ROWS> = ArrayVec::new();
        for &r in rows {
            if r < self.rows as usize && !sorted.contains(&r) {
                let _ = sorted.try_push(r);
            }
        }
        sorted.sort_unstable();

        let width = self.cols as usize;
        for &y in &sorted {
            // Shift every row above `y` down by one, overwriting row `y`.
            self.cells.copy_within(0..y * width, width);
            self.cells[..width].fill(None);
        }

        sorted.len()
    }

    /// Write a piece's cells into the grid
    ///
    /// Cells outside the board (typically still above the top) are discarded.
    /// Returns how many cells were written.
    pub fn lock_cells(&mut self, cells: &[(i8, i8)], kind: PieceKind) -> u8 {
        let mut written = 0;
        for &(x, y) in cells {
            if self.set(x, y, Some(kind)) {
                written += 1;
            }
        }
        written
    }

    /// Count of non-empty cells
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Get a reference to the internal cells array (row-major)
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Iterate rows as slices, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.cols as usize)
    }

    /// Export as a row-major grid of piece ids (0 = empty)
    pub fn write_u8_grid(&self, out: &mut Vec<Vec<u8>>) {
        out.clear();
        out.extend(
            self.rows()
                .map(|row| row.iter().map(|c| c.map_or(0, |k| k.id())).collect()),
        );
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_ROWS, crate::types::DEFAULT_COLS)
    }
}
