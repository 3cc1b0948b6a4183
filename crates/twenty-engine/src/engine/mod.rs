//! Engine module: 4x4 tile board, single-merge shift, random spawn and
//! the loss verdict. Public API stays small.
//!
//! - `Board` is the 4x4 state with convenience methods.
//! - Free functions mirror the methods (e.g., `apply_move`, `shift`, `render`).

mod error;
mod ops;
pub mod state;

pub use error::EngineError;
pub use state::{Board, Move, MoveResult, Spawn, Verdict, CELLS, SIZE};

pub use ops::{
    apply_move, count_empty, execute_move, highest_tile, make_move, render, shift, EMPTY_MARKER,
};
