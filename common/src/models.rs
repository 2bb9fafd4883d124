use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the presentation layer is allowed to see of a single cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum CellView {
    #[serde(rename = "covered")]
    Covered,
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    #[serde(rename = "mine")]
    Mine,
    #[serde(rename = "exploded")]
    Exploded,
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameParams {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub time_limit_secs: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Board dimensions, mine count and time limit bound to this preset.
    pub const fn params(self) -> GameParams {
        match self {
            Difficulty::Beginner => GameParams {
                rows: 9,
                cols: 6,
                mines: 11,
                time_limit_secs: 60,
            },
            Difficulty::Intermediate => GameParams {
                rows: 18,
                cols: 12,
                mines: 36,
                time_limit_secs: 180,
            },
            Difficulty::Advanced => GameParams {
                rows: 26,
                cols: 21,
                mines: 92,
                time_limit_secs: 660,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    /// Looks a preset up by its exact display name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|difficulty| difficulty.name() == name)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
    TimedOut,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }
}

/// Result of a single reveal command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealOutcome {
    Continue,
    HitMine,
    AllClear,
}

/// Read-only picture of a session, enough for a renderer to draw everything.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: Uuid,
    pub difficulty: Difficulty,
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub flags: usize,
    pub outcome: Outcome,
    pub elapsed_secs: u32,
    pub time_limit_secs: u32,
    pub field: Vec<Vec<CellView>>,
}

impl Snapshot {
    pub fn get_cell(&self, pos: Pos) -> Option<CellView> {
        self.field.get(pos.row)?.get(pos.col).copied()
    }

    /// Mine counter as shown next to the timer; negative when over-flagged.
    pub fn remaining_mines(&self) -> isize {
        self.mines as isize - self.flags as isize
    }
}
