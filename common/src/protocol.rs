use serde::{Deserialize, Serialize};

use crate::models::{CellView, Outcome, Pos, RevealOutcome, Snapshot};

/// Player input, as produced by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "reveal")]
    Reveal { pos: Pos },
    #[serde(rename = "flag")]
    Flag { pos: Pos },
    #[serde(rename = "restart")]
    Restart { difficulty: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: CellView,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum SessionMessage {
    #[serde(rename = "init")]
    Init { snapshot: Snapshot },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        signal: Option<RevealOutcome>,
        outcome: Outcome,
    },
    #[serde(rename = "tick")]
    Tick {
        elapsed_secs: u32,
        remaining_secs: u32,
    },
    #[serde(rename = "rejected")]
    Rejected { reason: String },
}
