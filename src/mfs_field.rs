// Board-logic engine
// Owns the cell grid, places mines, computes adjacency counts and performs flood-fill reveals

use rand::Rng;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Errors raised while building a mine field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid configuration: {rows}x{cols} grid cannot hold {mines} mines")]
    InvalidConfiguration { rows: usize, cols: usize, mines: usize },
    #[error("mine position ({row}, {col}) lies outside the grid")]
    MineOutOfBounds { row: usize, col: usize },
}

/// Snapshot of a single grid position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub is_mine: bool,
    pub adjacent_mines: u8, // 0-8, meaningful for non-mine cells
    pub is_revealed: bool,
    pub is_flagged: bool,
}

/// Result of a reveal call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Out of bounds, already revealed, or flagged
    NoOp,
    /// Number of cells newly revealed by this call
    Revealed { count: usize },
    /// The triggering mine
    Detonated { row: usize, col: usize },
}

/// Result of a flag toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    NoOp,
    Flagged,
    Unflagged,
}

/// The mine field: a rows x cols grid stored row-major
#[derive(Debug, Clone)]
pub struct MineField {
    rows: usize,
    cols: usize,
    mines: usize,
    cells: Vec<Cell>,
}

impl MineField {
    /// Create a field with mines placed by the thread-local RNG
    pub fn new(rows: usize, cols: usize, mines: usize) -> Result<Self, FieldError> {
        Self::with_rng(rows, cols, mines, &mut rand::thread_rng())
    }

    /// Create a field drawing mine positions from `rng`
    /// Positions are sampled without replacement over the whole grid
    pub fn with_rng<R: Rng + ?Sized>(
        rows: usize,
        cols: usize,
        mines: usize,
        rng: &mut R,
    ) -> Result<Self, FieldError> {
        let n = check_config(rows, cols, mines)?;
        let mut field = Self::empty(rows, cols, mines, n);
        for i in rand::seq::index::sample(rng, n, mines).into_iter() {
            field.cells[i].is_mine = true;
        }
        field.compute_adjacency();
        debug!(rows, cols, mines, "mine field generated");
        Ok(field)
    }

    /// Create a field with mines at exactly the given (row, col) positions
    /// Duplicate positions count once
    pub fn with_mines(
        rows: usize,
        cols: usize,
        positions: &[(usize, usize)],
    ) -> Result<Self, FieldError> {
        // validate dimensions before touching positions
        let n = check_config(rows, cols, 0)?;
        let mut field = Self::empty(rows, cols, 0, n);
        for &(row, col) in positions {
            if row >= rows || col >= cols {
                return Err(FieldError::MineOutOfBounds { row, col });
            }
            field.cells[row * cols + col].is_mine = true;
        }
        let mines = field.cells.iter().filter(|c| c.is_mine).count();
        check_config(rows, cols, mines)?;
        field.mines = mines;
        field.compute_adjacency();
        Ok(field)
    }

    fn empty(rows: usize, cols: usize, mines: usize, n: usize) -> Self {
        MineField {
            rows,
            cols,
            mines,
            cells: vec![Cell::default(); n],
        }
    }

    fn compute_adjacency(&mut self) {
        for idx in 0..self.cells.len() {
            if self.cells[idx].is_mine {
                continue;
            }
            let adj = self.neighbors(idx).filter(|&n| self.cells[n].is_mine).count();
            self.cells[idx].adjacent_mines = adj as u8;
        }
    }

    /// In-bounds Moore neighbours of a flat index
    fn neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = (idx / self.cols, idx % self.cols);
        let rows = row.saturating_sub(1)..=(row + 1).min(self.rows - 1);
        rows.flat_map(move |r| {
            (col.saturating_sub(1)..=(col + 1).min(self.cols - 1)).map(move |c| r * self.cols + c)
        })
        .filter(move |&n| n != idx)
    }

    /// Map signed coordinates to a flat index, None when outside the grid
    fn index(&self, row: isize, col: isize) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    /// Snapshot of the cell at (row, col)
    pub fn cell(&self, row: isize, col: isize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn flagged_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_flagged).count()
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_revealed).count()
    }

    /// Mine counter value (total mines - flagged cells)
    /// Negative when more flags than mines are placed
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flagged_count() as isize
    }

    /// All mine positions in row-major order
    pub fn mine_positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_mine)
            .map(|(i, _)| (i / self.cols, i % self.cols))
    }

    /// Reveal the cell at (row, col)
    /// - Mine: only this cell is revealed and the call reports the detonation
    /// - Otherwise: flood fill across zero-adjacency cells, stopping at numbered borders
    pub fn reveal(&mut self, row: isize, col: isize) -> RevealOutcome {
        let Some(start) = self.index(row, col) else {
            return RevealOutcome::NoOp;
        };
        let cell = self.cells[start];
        if cell.is_revealed || cell.is_flagged {
            return RevealOutcome::NoOp;
        }
        if cell.is_mine {
            self.cells[start].is_revealed = true;
            return RevealOutcome::Detonated {
                row: start / self.cols,
                col: start % self.cols,
            };
        }

        // Worklist fill: cells are marked revealed when pushed, so each is visited once
        let mut count = 1;
        self.cells[start].is_revealed = true;
        let mut work = vec![start];
        while let Some(idx) = work.pop() {
            if self.cells[idx].adjacent_mines != 0 {
                continue;
            }
            let next: Vec<usize> = self
                .neighbors(idx)
                .filter(|&n| {
                    let c = &self.cells[n];
                    !c.is_revealed && !c.is_flagged && !c.is_mine
                })
                .collect();
            for n in next {
                self.cells[n].is_revealed = true;
                count += 1;
                work.push(n);
            }
        }
        debug!(row, col, count, "cells revealed");
        RevealOutcome::Revealed { count }
    }

    /// Toggle the flag on an unrevealed cell
    pub fn toggle_flag(&mut self, row: isize, col: isize) -> FlagOutcome {
        let Some(idx) = self.index(row, col) else {
            return FlagOutcome::NoOp;
        };
        let cell = &mut self.cells[idx];
        if cell.is_revealed {
            return FlagOutcome::NoOp;
        }
        cell.is_flagged = !cell.is_flagged;
        if cell.is_flagged {
            FlagOutcome::Flagged
        } else {
            FlagOutcome::Unflagged
        }
    }

    /// Check if all non-mine cells have been revealed (win condition)
    pub fn is_won(&self) -> bool {
        self.cells.iter().all(|c| c.is_mine || c.is_revealed)
    }
}

/// Validate dimensions and mine count, returning the cell count
fn check_config(rows: usize, cols: usize, mines: usize) -> Result<usize, FieldError> {
    let invalid = FieldError::InvalidConfiguration { rows, cols, mines };
    if rows == 0 || cols == 0 {
        return Err(invalid);
    }
    match rows.checked_mul(cols) {
        Some(n) if mines < n => Ok(n),
        _ => Err(invalid),
    }
}

// Player's view of the board, mines stay hidden until revealed
impl fmt::Display for MineField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for c in row {
                let s = match (c.is_flagged, c.is_revealed, c.is_mine) {
                    (true, _, _) => 'F',
                    (_, false, _) => '#',
                    (_, true, true) => '*',
                    _ if c.adjacent_mines == 0 => '.',
                    _ => char::from(b'0' + c.adjacent_mines),
                };
                write!(f, "{s}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
