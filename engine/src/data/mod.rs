use std::ops::RangeInclusive;

use minesweeper_common::models::{CellView, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Covered,
    Revealed,
    Flagged,
    Exploded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub has_mine: bool,
    pub adjacent: u8,
    pub visibility: Visibility,
}

impl From<&Cell> for CellView {
    fn from(value: &Cell) -> Self {
        match value.visibility {
            Visibility::Covered => Self::Covered,
            Visibility::Flagged => Self::Flagged,
            Visibility::Exploded => Self::Exploded,
            Visibility::Revealed if value.has_mine => Self::Mine,
            Visibility::Revealed => Self::Revealed {
                adjacent: value.adjacent,
            },
        }
    }
}

/// Row-major storage for a `rows x cols` board.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(pos.col + pos.row * self.cols)
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get_mut(pos.col + pos.row * self.cols)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Pos::new(row, col)))
    }

    /// In-bounds Moore neighbourhood of `pos`, excluding `pos` itself.
    /// Edge and corner cells simply yield fewer neighbours.
    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + use<> {
        let rows = span(pos.row, self.rows);
        let cols = span(pos.col, self.cols);

        rows.flat_map(move |row| cols.clone().map(move |col| Pos::new(row, col)))
            .filter(move |neighbor| *neighbor != pos)
    }

    pub fn count_adjacent_mines(&self, pos: Pos) -> u8 {
        self.neighbors(pos)
            .filter(|neighbor| self.get(*neighbor).is_some_and(|cell| cell.has_mine))
            .count() as u8
    }
}

fn span(center: usize, len: usize) -> RangeInclusive<usize> {
    center.saturating_sub(1)..=(center + 1).min(len.saturating_sub(1))
}
