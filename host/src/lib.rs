//! Hosting for a minesweeper session.
//!
//! The session runs on its own tokio task. Pointer-driven commands and the
//! one-second game clock are two producers on the same command channel, so
//! the session only ever sees one command at a time. State flows back to the
//! presentation layer as [`SessionMessage`]s.
//!
//! ```rust,no_run
//! use minesweeper_common::models::Pos;
//! use minesweeper_host::{HostConfig, runtime};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), minesweeper_host::HostError> {
//!     let (handle, mut messages) = runtime::spawn(&HostConfig::default())?;
//!
//!     handle.reveal(Pos::new(0, 0))?;
//!     while let Some(message) = messages.recv().await {
//!         println!("{message:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! [`SessionMessage`]: minesweeper_common::protocol::SessionMessage

pub mod config;
pub mod runtime;

pub use config::HostConfig;
pub use runtime::{SessionHandle, outcome_message, spawn};

use minesweeper_engine::EngineError;

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Session runtime has stopped")]
    Closed,
}
