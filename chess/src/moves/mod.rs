//! Moves and their application to the board

mod base;
mod make;

pub use base::*;
pub use make::*;
