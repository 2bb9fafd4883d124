use minesweeper_common::models::Pos;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid board configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("Position {pos} is outside the {rows}x{cols} grid")]
    OutOfBounds { pos: Pos, rows: usize, cols: usize },

    #[error("Invalid board state: {0}")]
    InvalidState(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
