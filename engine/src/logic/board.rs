use minesweeper_common::models::{CellView, Pos, RevealOutcome};
use rand::Rng;
use tracing::debug;

use crate::{
    data::{Cell, Grid, Visibility},
    error::{EngineError, Result},
};

#[derive(Debug, Clone)]
pub struct Board {
    grid: Grid,
    mine_count: usize,
    covered_non_mine: usize,
    mines_placed: bool,
}

fn validate_params(rows: usize, cols: usize, mine_count: usize) -> Result<()> {
    if rows == 0 || cols == 0 {
        return Err(EngineError::InvalidConfiguration(format!(
            "grid must have at least one row and one column, got {rows}x{cols}"
        )));
    }

    let cells = rows
        .checked_mul(cols)
        .ok_or_else(|| EngineError::InvalidConfiguration(format!("{rows}x{cols} is too large")))?;

    if mine_count == 0 || mine_count >= cells {
        return Err(EngineError::InvalidConfiguration(format!(
            "mine count must be between 1 and {} for a {rows}x{cols} grid, got {mine_count}",
            cells - 1
        )));
    }

    Ok(())
}

impl Board {
    /// Allocates an all-covered board without mines.
    pub fn new(rows: usize, cols: usize, mine_count: usize) -> Result<Self> {
        validate_params(rows, cols, mine_count)?;
        Ok(Self {
            grid: Grid::new(rows, cols),
            mine_count,
            covered_non_mine: rows * cols - mine_count,
            mines_placed: false,
        })
    }

    /// Builds a board with mines at exactly the given positions.
    pub fn with_mines(rows: usize, cols: usize, mines: &[Pos]) -> Result<Self> {
        let mut board = Self::new(rows, cols, mines.len())?;

        for &pos in mines {
            let cell = board.cell_mut(pos)?;
            if cell.has_mine {
                return Err(EngineError::InvalidConfiguration(format!(
                    "duplicate mine at {pos}"
                )));
            }
            cell.has_mine = true;
        }

        board.count_adjacent();
        Ok(board)
    }

    /// Places `mine_count` mines by rejection sampling: a coordinate that
    /// already holds a mine is drawn again.
    pub fn place_mines<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        if self.mines_placed {
            return Err(EngineError::InvalidState(
                "mines have already been placed".to_string(),
            ));
        }

        let (rows, cols) = (self.rows(), self.cols());
        let mut placed = 0;
        let mut draws = 0usize;
        while placed < self.mine_count {
            draws += 1;
            let pos = Pos::new(rng.random_range(0..rows), rng.random_range(0..cols));
            let cell = self.cell_mut(pos)?;
            if !cell.has_mine {
                cell.has_mine = true;
                placed += 1;
            }
        }

        self.count_adjacent();
        debug!(
            "Placed {} mines on {}x{} board in {} draws",
            self.mine_count, rows, cols, draws
        );
        Ok(())
    }

    fn count_adjacent(&mut self) {
        for pos in self.grid.positions() {
            let adjacent = self.grid.count_adjacent_mines(pos);
            if let Some(cell) = self.grid.get_mut(pos) {
                cell.adjacent = adjacent;
            }
        }
        self.mines_placed = true;
    }

    /// Uncovers `pos`. Zero-count cells open their neighbourhood through an
    /// explicit worklist; every cell whose visibility changed is appended to
    /// `changed` in reveal order.
    pub fn reveal(&mut self, pos: Pos, changed: &mut Vec<Pos>) -> Result<RevealOutcome> {
        self.ensure_mines_placed()?;

        let cell = self.cell_mut(pos)?;
        if cell.visibility != Visibility::Covered {
            return Ok(RevealOutcome::Continue);
        }

        if cell.has_mine {
            cell.visibility = Visibility::Revealed;
            changed.push(pos);
            return Ok(RevealOutcome::HitMine);
        }

        let first_change = changed.len();
        let mut pending = vec![pos];
        while let Some(next) = pending.pop() {
            let Some(cell) = self.grid.get_mut(next) else {
                continue;
            };
            // A cell can be queued by several zero neighbours before it is popped.
            if cell.visibility != Visibility::Covered || cell.has_mine {
                continue;
            }

            cell.visibility = Visibility::Revealed;
            let adjacent = cell.adjacent;
            self.covered_non_mine -= 1;
            changed.push(next);

            if adjacent == 0 {
                let grid = &self.grid;
                pending.extend(grid.neighbors(next).filter(|neighbor| {
                    grid.get(*neighbor)
                        .is_some_and(|cell| cell.visibility == Visibility::Covered)
                }));
            }
        }

        debug!(
            "Revealed {} cells from {}, {} safe cells still covered",
            changed.len() - first_change,
            pos,
            self.covered_non_mine
        );

        if self.covered_non_mine == 0 {
            Ok(RevealOutcome::AllClear)
        } else {
            Ok(RevealOutcome::Continue)
        }
    }

    /// Flips `Covered <-> Flagged`. Returns whether the cell changed.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<bool> {
        self.ensure_mines_placed()?;

        let cell = self.cell_mut(pos)?;
        cell.visibility = match cell.visibility {
            Visibility::Covered => Visibility::Flagged,
            Visibility::Flagged => Visibility::Covered,
            Visibility::Revealed | Visibility::Exploded => return Ok(false),
        };
        Ok(true)
    }

    /// Marks every mine that is not flagged as exploded. Applying it again
    /// changes nothing.
    pub fn reveal_all_mines(&mut self, changed: &mut Vec<Pos>) {
        for pos in self.grid.positions() {
            if let Some(cell) = self.grid.get_mut(pos)
                && cell.has_mine
                && !matches!(cell.visibility, Visibility::Flagged | Visibility::Exploded)
            {
                cell.visibility = Visibility::Exploded;
                changed.push(pos);
            }
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn covered_non_mine_count(&self) -> usize {
        self.covered_non_mine
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn flagged_count(&self) -> usize {
        self.grid
            .cells()
            .iter()
            .filter(|cell| cell.visibility == Visibility::Flagged)
            .count()
    }

    pub fn cell(&self, pos: Pos) -> Result<&Cell> {
        self.grid.get(pos).ok_or(EngineError::OutOfBounds {
            pos,
            rows: self.rows(),
            cols: self.cols(),
        })
    }

    pub fn view(&self, pos: Pos) -> Result<CellView> {
        self.cell(pos).map(CellView::from)
    }

    pub fn field(&self) -> Vec<Vec<CellView>> {
        self.grid
            .cells()
            .chunks(self.cols())
            .map(|row| row.iter().map(CellView::from).collect())
            .collect()
    }

    fn cell_mut(&mut self, pos: Pos) -> Result<&mut Cell> {
        let (rows, cols) = (self.grid.rows(), self.grid.cols());
        self.grid
            .get_mut(pos)
            .ok_or(EngineError::OutOfBounds { pos, rows, cols })
    }

    fn ensure_mines_placed(&self) -> Result<()> {
        if self.mines_placed {
            Ok(())
        } else {
            Err(EngineError::InvalidState(
                "mines must be placed before the board is played".to_string(),
            ))
        }
    }
}
