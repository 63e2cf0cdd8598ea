//! The tile grid: a pure function from (cells, neighbor borders) to the
//! next generation's cells, per spec §4.1.

use crate::direction::Direction;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// A rectangular tile of Game of Life cells, indexed `[row][column]`.
///
/// `0` is dead, any non-zero value is alive. Values survive unchanged
/// through `snapshot()` but `iterate()` always normalizes its *output* to
/// `{0, 1}` (spec §4.1 explicitly permits this).
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Vec<i64>>,
}

impl Grid {
    /// Build a grid from a `[row][column]` matrix. Rejects empty or jagged
    /// input (spec §3/§9: jagged input is a construction-time error, not an
    /// `iterate`-time one).
    pub fn new(cells: Vec<Vec<i64>>) -> Result<Self> {
        if cells.is_empty() || cells[0].is_empty() {
            return Err(Error::contract("grid must have at least one row and column"));
        }

        let col_count = cells[0].len();
        if cells.iter().any(|row| row.len() != col_count) {
            return Err(Error::contract("grid rows must all have the same length"));
        }

        Ok(Self { cells })
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.cells[0].len()
    }

    /// The grid in `[row][column]` form.
    pub fn snapshot(&self) -> Vec<Vec<i64>> {
        self.cells.clone()
    }

    /// The border strip this tile exposes in `direction` (spec §3): a full
    /// row/column for the four edges, a single cell for the four corners.
    pub fn border_at(&self, direction: Direction) -> Vec<i64> {
        if direction.is_corner() {
            return vec![self.corner_cell(direction)];
        }

        match direction {
            Direction::Up => self.cells[0].clone(),
            Direction::Down => self.cells[self.row_count() - 1].clone(),
            Direction::Left => self.cells.iter().map(|row| row[0]).collect(),
            Direction::Right => {
                let last = self.col_count() - 1;
                self.cells.iter().map(|row| row[last]).collect()
            }
            _ => unreachable!("corners handled above"),
        }
    }

    /// The single cell sitting in a corner direction.
    fn corner_cell(&self, direction: Direction) -> i64 {
        let last_row = self.row_count() - 1;
        let last_col = self.col_count() - 1;
        match direction {
            Direction::UpLeft => self.cells[0][0],
            Direction::UpRight => self.cells[0][last_col],
            Direction::DownLeft => self.cells[last_row][0],
            Direction::DownRight => self.cells[last_row][last_col],
            _ => unreachable!("only called for corner directions"),
        }
    }

    /// The border strip length this tile expects to receive for
    /// `direction`: `col_count` for UP/DOWN, `row_count` for LEFT/RIGHT, `1`
    /// for a corner (spec §4.1).
    pub fn expected_border_len(&self, direction: Direction) -> usize {
        if direction.is_corner() {
            return 1;
        }
        match direction {
            Direction::Up | Direction::Down => self.col_count(),
            Direction::Left | Direction::Right => self.row_count(),
            _ => unreachable!("corners handled above"),
        }
    }

    /// Advance one generation under Conway's B3/S23 rule, using whatever
    /// neighbor borders are supplied; missing directions are treated as
    /// all-zero (spec §4.1). Returns a fresh `Grid` — no cell of `self` is
    /// mutated in place.
    ///
    /// Builds a `(row_count+2) x (col_count+2)` border-extended scratch
    /// grid and folds it down to the interior, mirroring the original
    /// `GolCells.iterate`/`_extend_with_neighboring_border_cells` rather
    /// than bounds-checking each of the 8 Moore neighbors individually.
    pub fn iterate(&self, neighbor_borders: &HashMap<Direction, Vec<i64>>) -> Result<Grid> {
        for (direction, strip) in neighbor_borders {
            let expected = self.expected_border_len(*direction);
            if strip.len() != expected {
                return Err(Error::contract(format!(
                    "border for {direction} has length {}, expected {expected}",
                    strip.len()
                )));
            }
        }

        let extended = self.extend_with_borders(neighbor_borders);
        let row_count = self.row_count();
        let col_count = self.col_count();

        let cells = (0..row_count)
            .map(|row| {
                (0..col_count)
                    .map(|col| {
                        let current = extended[row + 1][col + 1];
                        let live_neighbors = Self::live_neighbor_count(&extended, row + 1, col + 1);
                        next_state(current != 0, live_neighbors)
                    })
                    .collect()
            })
            .collect();

        Ok(Grid { cells })
    }

    /// Build the `(row_count+2) x (col_count+2)` grid consisting of this
    /// tile surrounded by a one-cell ring taken from `neighbor_borders`,
    /// defaulting any absent direction to zero.
    fn extend_with_borders(&self, neighbor_borders: &HashMap<Direction, Vec<i64>>) -> Vec<Vec<i64>> {
        let row_count = self.row_count();
        let col_count = self.col_count();

        let border = |d: Direction| -> Vec<i64> {
            neighbor_borders
                .get(&d)
                .cloned()
                .unwrap_or_else(|| vec![0; self.expected_border_len(d)])
        };

        let left = border(Direction::Left);
        let right = border(Direction::Right);
        let up = border(Direction::Up);
        let down = border(Direction::Down);
        let up_left = border(Direction::UpLeft);
        let up_right = border(Direction::UpRight);
        let down_left = border(Direction::DownLeft);
        let down_right = border(Direction::DownRight);

        let mut extended = Vec::with_capacity(row_count + 2);

        let mut top_row = Vec::with_capacity(col_count + 2);
        top_row.push(up_left[0]);
        top_row.extend_from_slice(&up);
        top_row.push(up_right[0]);
        extended.push(top_row);

        for (row, cell_row) in self.cells.iter().enumerate() {
            let mut extended_row = Vec::with_capacity(col_count + 2);
            extended_row.push(left[row]);
            extended_row.extend_from_slice(cell_row);
            extended_row.push(right[row]);
            extended.push(extended_row);
        }

        let mut bottom_row = Vec::with_capacity(col_count + 2);
        bottom_row.push(down_left[0]);
        bottom_row.extend_from_slice(&down);
        bottom_row.push(down_right[0]);
        extended.push(bottom_row);

        extended
    }

    /// Count of non-zero (live) cells among the 8 Moore neighbors of
    /// `(row, col)` in the border-extended grid. Must only be called for
    /// an interior cell of that extended grid.
    fn live_neighbor_count(extended: &[Vec<i64>], row: usize, col: usize) -> u8 {
        let mut count = 0u8;
        for dr in -1i32..=1 {
            for dc in -1i32..=1 {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = (row as i32 + dr) as usize;
                let c = (col as i32 + dc) as usize;
                if extended[r][c] != 0 {
                    count += 1;
                }
            }
        }
        count
    }
}

/// Conway's B3/S23 rule, applied to an already-normalized alive/dead flag
/// and a live-neighbor count (spec §4.1's rule table, with the `n=2`
/// "current" case resolved by normalizing to `{0,1}`: a live cell with 2
/// neighbors survives as `1`, a dead cell with 2 neighbors stays `0`).
fn next_state(alive: bool, live_neighbors: u8) -> i64 {
    match (alive, live_neighbors) {
        (true, 2 | 3) => 1,
        (false, 3) => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(cells: Vec<Vec<i64>>) -> Grid {
        Grid::new(cells).unwrap()
    }

    fn empty_borders() -> HashMap<Direction, Vec<i64>> {
        HashMap::new()
    }

    #[test]
    fn rejects_empty_input() {
        assert!(Grid::new(vec![]).is_err());
        assert!(Grid::new(vec![vec![]]).is_err());
    }

    #[test]
    fn rejects_jagged_input() {
        assert!(Grid::new(vec![vec![0, 0], vec![0]]).is_err());
    }

    #[test]
    fn block_is_a_still_life() {
        let g = grid(vec![vec![1, 1], vec![1, 1]]);
        let next = g.iterate(&empty_borders()).unwrap();
        assert_eq!(next.snapshot(), vec![vec![1, 1], vec![1, 1]]);
    }

    #[test]
    fn blinker_oscillates() {
        let g = grid(vec![vec![0, 1, 0], vec![0, 1, 0], vec![0, 1, 0]]);
        let after_one = g.iterate(&empty_borders()).unwrap();
        assert_eq!(
            after_one.snapshot(),
            vec![vec![0, 0, 0], vec![1, 1, 1], vec![0, 0, 0]]
        );
        let after_two = after_one.iterate(&empty_borders()).unwrap();
        assert_eq!(after_two.snapshot(), g.snapshot());
    }

    #[test]
    fn all_zero_grid_stays_all_zero() {
        for (rows, cols) in [(1, 1), (3, 1), (1, 4), (5, 5)] {
            let g = grid(vec![vec![0; cols]; rows]);
            let next = g.iterate(&empty_borders()).unwrap();
            assert_eq!(next.snapshot(), vec![vec![0; cols]; rows]);
        }
    }

    #[test]
    fn iterate_preserves_dimensions() {
        let g = grid(vec![vec![1, 0, 1, 0], vec![0, 1, 0, 1]]);
        let next = g.iterate(&empty_borders()).unwrap();
        assert_eq!(next.row_count(), g.row_count());
        assert_eq!(next.col_count(), g.col_count());
    }

    #[test]
    fn neighbor_borders_seed_births_at_the_edge() {
        let g = grid(vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let mut borders = HashMap::new();
        borders.insert(Direction::Up, vec![1, 1, 1]);
        borders.insert(Direction::Down, vec![1, 1, 1]);
        borders.insert(Direction::Left, vec![1, 1, 1]);
        borders.insert(Direction::Right, vec![1, 1, 1]);

        let next = g.iterate(&borders).unwrap();
        assert_eq!(
            next.snapshot(),
            vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]]
        );
    }

    #[test]
    fn border_at_matches_spec_example() {
        let g = grid(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        assert_eq!(g.border_at(Direction::Up), vec![1, 2, 3]);
        assert_eq!(g.border_at(Direction::UpRight), vec![3]);
        assert_eq!(g.border_at(Direction::Right), vec![3, 6, 9]);
        assert_eq!(g.border_at(Direction::DownRight), vec![9]);
        assert_eq!(g.border_at(Direction::Down), vec![7, 8, 9]);
        assert_eq!(g.border_at(Direction::DownLeft), vec![7]);
        assert_eq!(g.border_at(Direction::Left), vec![1, 4, 7]);
        assert_eq!(g.border_at(Direction::UpLeft), vec![1]);
    }

    #[test]
    fn mismatched_border_length_is_a_contract_violation() {
        let g = grid(vec![vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let mut borders = HashMap::new();
        borders.insert(Direction::Up, vec![1, 1]); // expected 3
        let err = g.iterate(&borders).unwrap_err();
        assert!(matches!(err, Error::Contract(_)));
    }

    #[test]
    fn arbitrary_nonzero_values_count_as_alive() {
        let g = grid(vec![vec![5, 5, 5], vec![5, 5, 5], vec![5, 5, 5]]);
        let next = g.iterate(&empty_borders()).unwrap();
        // A fully alive 3x3 block: corners have 3 live neighbors (born/survive
        // as 1), edges have 5 (die), center has 8 (dies).
        assert_eq!(
            next.snapshot(),
            vec![vec![1, 0, 1], vec![0, 0, 0], vec![1, 0, 1]]
        );
    }
}
