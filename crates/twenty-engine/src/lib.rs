//! twenty-engine: the board logic of a 2048-style tile game played one
//! input at a time.
//!
//! Each move runs a merge pass (at most one merge per row/column), a
//! compaction pass toward the direction of travel, and a spawn pass that
//! drops a 2 (85%) or 4 (15%) into a random empty cell. A move that finds no
//! empty cell for the spawn is `Verdict::Lost`.
//!
//! Quick start:
//! ```
//! use twenty_engine::engine::{Board, Move, Verdict};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let board = Board::new_game();
//! let res = board.make_move(Move::Left, &mut rng);
//! assert_eq!(res.verdict, Verdict::Continue);
//! print!("{}", res.board.render());
//! ```

pub mod engine;
