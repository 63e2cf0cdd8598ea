//! A small library of named starting patterns, for seeding a tile's initial
//! cells from the `tile_worker` CLI or from tests, without hand-writing a
//! grid literal every time.

use crate::error::{Error, Result};

/// A named pattern: a set of alive-cell coordinates relative to its own
/// top-left corner, in `(row, column)` form.
#[derive(Clone)]
pub struct Pattern {
    pub name: &'static str,
    pub description: &'static str,
    cells: Vec<(usize, usize)>,
}

impl Pattern {
    fn new(name: &'static str, description: &'static str, cells: Vec<(usize, usize)>) -> Self {
        Self { name, description, cells }
    }

    /// The smallest `(rows, cols)` that fits every alive cell in this
    /// pattern.
    pub fn bounds(&self) -> (usize, usize) {
        let rows = self.cells.iter().map(|(r, _)| *r).max().unwrap_or(0) + 1;
        let cols = self.cells.iter().map(|(_, c)| *c).max().unwrap_or(0) + 1;
        (rows, cols)
    }

    /// Render this pattern into a `rows x cols` all-zero grid, placed at
    /// its top-left corner. Fails if the requested size is smaller than
    /// the pattern's own bounds.
    pub fn into_grid(&self, rows: usize, cols: usize) -> Result<Vec<Vec<i64>>> {
        let (min_rows, min_cols) = self.bounds();
        if rows < min_rows || cols < min_cols {
            return Err(Error::contract(format!(
                "{} needs at least {min_rows}x{min_cols}, got {rows}x{cols}",
                self.name
            )));
        }

        let mut grid = vec![vec![0i64; cols]; rows];
        for &(row, col) in &self.cells {
            grid[row][col] = 1;
        }
        Ok(grid)
    }
}

/// Classic Game of Life starting patterns.
pub mod presets {
    use super::Pattern;

    /// Glider — simplest spaceship, moves diagonally.
    pub fn glider() -> Pattern {
        Pattern::new(
            "glider",
            "moves diagonally, period 4",
            vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
        )
    }

    /// Blinker — period 2 oscillator.
    pub fn blinker() -> Pattern {
        Pattern::new("blinker", "oscillator, period 2", vec![(1, 0), (1, 1), (1, 2)])
    }

    /// Toad — period 2 oscillator.
    pub fn toad() -> Pattern {
        Pattern::new(
            "toad",
            "oscillator, period 2",
            vec![(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
        )
    }

    /// Block — simple still life.
    pub fn block() -> Pattern {
        Pattern::new("block", "still life", vec![(0, 0), (0, 1), (1, 0), (1, 1)])
    }

    /// Look up a preset by name, as accepted by the `tile_worker --pattern` flag.
    pub fn by_name(name: &str) -> Option<Pattern> {
        match name {
            "glider" => Some(glider()),
            "blinker" => Some(blinker()),
            "toad" => Some(toad()),
            "block" => Some(block()),
            _ => None,
        }
    }
}
