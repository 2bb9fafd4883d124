use minesweeper_common::{
    models::{Difficulty, GameParams, Outcome, Pos, RevealOutcome, Snapshot},
    protocol::{CellUpdate, SessionMessage},
};
use rand::Rng;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    error::{EngineError, Result},
    logic::Board,
};

/// What a single command did to the session.
///
/// `signal` is only set for reveals that reached the board; commands ignored
/// because the session already finished come back with `signal: None` and no
/// changed cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub signal: Option<RevealOutcome>,
    pub changed: Vec<Pos>,
    pub outcome: Outcome,
}

/// One game: a board, the preset it was built from, the clock and the outcome.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    difficulty: Difficulty,
    board: Board,
    outcome: Outcome,
    elapsed_secs: u32,
}

impl Session {
    /// Builds the board for `difficulty` and places its mines with `rng`.
    pub fn new<R: Rng>(difficulty: Difficulty, rng: &mut R) -> Result<Self> {
        let params = difficulty.params();
        let mut board = Board::new(params.rows, params.cols, params.mines)?;
        board.place_mines(rng)?;
        Self::with_board(difficulty, board)
    }

    /// Like [`Session::new`], with the preset given by its display name.
    pub fn select_difficulty<R: Rng>(name: &str, rng: &mut R) -> Result<Self> {
        let difficulty = Difficulty::from_name(name)
            .ok_or_else(|| EngineError::InvalidDifficulty(name.to_string()))?;
        Self::new(difficulty, rng)
    }

    /// Adopts a board whose mines are already placed. Its shape and mine
    /// count must match the preset.
    pub fn with_board(difficulty: Difficulty, board: Board) -> Result<Self> {
        let params = difficulty.params();
        if (board.rows(), board.cols(), board.mine_count())
            != (params.rows, params.cols, params.mines)
        {
            return Err(EngineError::InvalidConfiguration(format!(
                "{}x{} board with {} mines does not match {} ({}x{} with {} mines)",
                board.rows(),
                board.cols(),
                board.mine_count(),
                difficulty,
                params.rows,
                params.cols,
                params.mines
            )));
        }
        if !board.mines_placed() {
            return Err(EngineError::InvalidState(
                "session board must have its mines placed".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        info!(
            "Starting {} session {}: {}x{} with {} mines, {}s limit",
            difficulty,
            id,
            board.rows(),
            board.cols(),
            board.mine_count(),
            params.time_limit_secs
        );

        Ok(Self {
            id,
            difficulty,
            board,
            outcome: Outcome::InProgress,
            elapsed_secs: 0,
        })
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn on_reveal(&mut self, pos: Pos) -> Result<Update> {
        if self.outcome.is_terminal() {
            debug!("Ignoring reveal at {} on finished session", pos);
            return Ok(self.idle());
        }

        let mut changed = Vec::new();
        let signal = self.board.reveal(pos, &mut changed)?;

        match signal {
            RevealOutcome::HitMine => {
                warn!("Mine hit at {} - game over", pos);
                // The disclosure re-reports the triggering cell as exploded.
                changed.clear();
                self.board.reveal_all_mines(&mut changed);
                self.finish(Outcome::Lost);
            }
            RevealOutcome::AllClear => self.finish(Outcome::Won),
            RevealOutcome::Continue => {
                debug!(
                    "Revealed {} cells, {} safe cells left",
                    changed.len(),
                    self.board.covered_non_mine_count()
                );
            }
        }

        Ok(Update {
            signal: Some(signal),
            changed,
            outcome: self.outcome,
        })
    }

    #[instrument(level = "trace", skip(self), fields(row = pos.row, col = pos.col))]
    pub fn on_toggle_flag(&mut self, pos: Pos) -> Result<Update> {
        if self.outcome.is_terminal() {
            debug!("Ignoring flag at {} on finished session", pos);
            return Ok(self.idle());
        }

        let changed = if self.board.toggle_flag(pos)? {
            debug!("Toggled flag at {}", pos);
            vec![pos]
        } else {
            debug!("Ignoring flag on uncovered cell {}", pos);
            Vec::new()
        };

        Ok(Update {
            signal: None,
            changed,
            outcome: self.outcome,
        })
    }

    /// Advances the clock by one second; reaching the limit ends the game.
    pub fn on_time_tick(&mut self) -> Update {
        if self.outcome.is_terminal() {
            return self.idle();
        }

        self.elapsed_secs += 1;

        let mut changed = Vec::new();
        if self.elapsed_secs >= self.time_limit_secs() {
            self.board.reveal_all_mines(&mut changed);
            self.finish(Outcome::TimedOut);
        }

        Update {
            signal: None,
            changed,
            outcome: self.outcome,
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.outcome = outcome;
        info!(
            "Session {} finished as {:?} after {}s",
            self.id, outcome, self.elapsed_secs
        );
    }

    fn idle(&self) -> Update {
        Update {
            signal: None,
            changed: Vec::new(),
            outcome: self.outcome,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn params(&self) -> GameParams {
        self.difficulty.params()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn time_limit_secs(&self) -> u32 {
        self.difficulty.params().time_limit_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.time_limit_secs().saturating_sub(self.elapsed_secs)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            id: self.id,
            difficulty: self.difficulty,
            rows: self.board.rows(),
            cols: self.board.cols(),
            mines: self.board.mine_count(),
            flags: self.board.flagged_count(),
            outcome: self.outcome,
            elapsed_secs: self.elapsed_secs,
            time_limit_secs: self.time_limit_secs(),
            field: self.board.field(),
        }
    }

    pub fn init_message(&self) -> SessionMessage {
        SessionMessage::Init {
            snapshot: self.snapshot(),
        }
    }

    pub fn update_message(&self, update: &Update) -> SessionMessage {
        SessionMessage::Update {
            updates: update
                .changed
                .iter()
                .filter_map(|&pos| {
                    self.board
                        .view(pos)
                        .ok()
                        .map(|value| CellUpdate { pos, value })
                })
                .collect(),
            signal: update.signal,
            outcome: update.outcome,
        }
    }

    pub fn tick_message(&self) -> SessionMessage {
        SessionMessage::Tick {
            elapsed_secs: self.elapsed_secs,
            remaining_secs: self.remaining_secs(),
        }
    }
}
