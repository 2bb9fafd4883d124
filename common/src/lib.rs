//! Types shared between the minesweeper simulation and the hosts that drive it.
//!
//! Everything here is plain data and serializes with serde, so a presentation
//! layer can consume it in-process or as JSON lines.

pub mod models;
pub mod protocol;
