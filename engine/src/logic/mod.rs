mod board;
mod session;

pub use board::Board;
pub use session::{Session, Update};
