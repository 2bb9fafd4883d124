//! Board simulation and game session for single-player minesweeper.
//!
//! [`Session`] is the entry point for a presentation layer: it owns one
//! [`Board`], the difficulty preset, the clock and the outcome. Commands are
//! plain synchronous method calls; callers are expected to serialize them.
//!
//! ```
//! use minesweeper_common::models::{Outcome, Pos};
//! use minesweeper_engine::Session;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut session = Session::select_difficulty("Beginner", &mut rng)?;
//!
//! session.on_toggle_flag(Pos::new(0, 0))?;
//! let update = session.on_reveal(Pos::new(0, 0))?;
//! assert!(update.changed.is_empty());
//! assert_eq!(session.outcome(), Outcome::InProgress);
//! # Ok::<(), minesweeper_engine::EngineError>(())
//! ```

pub mod data;
pub mod error;
pub mod logic;

pub use error::{EngineError, Result};
pub use logic::{Board, Session, Update};
