use rand::Rng;
use std::fmt;
use std::str::FromStr;

use super::error::EngineError;
use super::ops;
use serde::{Deserialize, Serialize};

// Internal aliases; 0 marks an empty cell.
pub(crate) type Tile = u32;
pub(crate) type Line = [Tile; SIZE];

/// Side length of the board.
pub const SIZE: usize = 4;
/// Number of cells on the board.
pub const CELLS: usize = SIZE * SIZE;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        }
    }
}

impl FromStr for Move {
    type Err = EngineError;

    /// Case-insensitive: "left", "LEFT" and "Left" all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            _ => Err(EngineError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome classification of a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Continue,
    /// The spawn pass found no empty cell anywhere on the board.
    Lost,
}

/// Where the spawn pass placed its tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub value: u32,
}

/// Result of `apply_move`: the new board plus the verdict.
///
/// On `Verdict::Lost` the board is the merged/compacted board without a spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveResult {
    pub board: Board,
    pub verdict: Verdict,
    /// Sum of the tiles produced by merges in this move.
    pub gained: u64,
    pub spawn: Option<Spawn>,
}

impl MoveResult {
    #[inline]
    pub fn is_lost(&self) -> bool {
        self.verdict == Verdict::Lost
    }
}

/// A 4x4 tile board stored row-major, top row first. Empty cells hold 0.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board(pub(crate) [[Tile; SIZE]; SIZE]);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    /// The board a session starts from: empty except a 2 in the bottom-right cell.
    pub fn new_game() -> Self {
        let mut board = Board::EMPTY;
        board.0[SIZE - 1][SIZE - 1] = 2;
        board
    }

    /// Build a board from rows (top row first); 0 means empty.
    #[inline]
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Self {
        Board(rows)
    }

    /// Copy of the rows, top row first; 0 means empty.
    #[inline]
    pub fn rows(&self) -> [[u32; SIZE]; SIZE] {
        self.0
    }

    /// Tile value at (row, col), `None` if the cell is empty.
    ///
    /// Panics if `row` or `col` is out of range.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        match self.0[row][col] {
            0 => None,
            v => Some(v),
        }
    }

    /// Merge and compact in `dir` without spawning. Returns the new board and
    /// the points gained by merges.
    ///
    /// ```
    /// use twenty_engine::engine::{Board, Move};
    /// let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
    /// let (after, gained) = b.shift(Move::Left);
    /// assert_eq!(after.rows()[0], [4, 0, 0, 0]);
    /// assert_eq!(gained, 4);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> (Self, u64) {
        ops::shift(self, dir)
    }

    /// Place a random 2 (85%) or 4 (15%) tile, using the provided RNG.
    /// Returns `None` when the board has no empty cell.
    #[inline]
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Option<(Self, Spawn)> {
        ops::place_random_tile(self, rng)
    }

    /// Merge, compact and spawn, using the provided RNG.
    ///
    /// The spawn pass runs even when the shift changed nothing.
    ///
    /// ```
    /// use twenty_engine::engine::{Board, Move, Verdict};
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(7);
    /// let res = Board::new_game().make_move(Move::Up, &mut rng);
    /// assert_eq!(res.verdict, Verdict::Continue);
    /// assert_eq!(res.board.count_empty(), 14);
    /// ```
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, direction: Move, rng: &mut R) -> MoveResult {
        ops::apply_move(self, direction, rng)
    }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> usize {
        ops::count_empty(self)
    }

    /// Highest tile on the board (0 on an empty board).
    #[inline]
    pub fn highest_tile(self) -> u32 {
        ops::highest_tile(self)
    }

    /// Sum of all tile values.
    #[inline]
    pub fn sum(self) -> u64 {
        self.cells().map(u64::from).sum()
    }

    /// Iterate over cell values in row-major order (0 for empty).
    #[inline]
    pub fn cells(self) -> impl Iterator<Item = u32> {
        self.0.into_iter().flatten()
    }

    /// Fixed-width text rendering; see [`ops::render`].
    #[inline]
    pub fn render(&self) -> String {
        ops::render(self)
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ops::render(self))
    }
}

impl From<[[u32; SIZE]; SIZE]> for Board {
    fn from(rows: [[u32; SIZE]; SIZE]) -> Self {
        Board::from_rows(rows)
    }
}
