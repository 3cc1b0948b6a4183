use rand::Rng;

use super::error::EngineError;
use super::state::{Board, Line, Move, MoveResult, Spawn, Tile, Verdict, CELLS, SIZE};

/// Text shown for an empty cell.
pub const EMPTY_MARKER: &str = "_";
/// Extra spaces added to the widest cell label.
const CELL_PADDING: usize = 2;
/// Percent chance that a spawned tile is a 2 rather than a 4.
const TWO_PERCENT: u32 = 85;

/// Merge, compact, then spawn one tile (uses thread RNG).
pub fn make_move(board: Board, direction: Move) -> MoveResult {
    let mut rng = rand::thread_rng();
    apply_move(board, direction, &mut rng)
}

/// Merge, compact, then spawn one tile using the provided RNG.
///
/// The spawn pass runs even when merge and compaction changed nothing. If no
/// empty cell is left for the spawn, the verdict is `Lost` and the returned
/// board is the compacted one.
pub fn apply_move<R: Rng + ?Sized>(board: Board, direction: Move, rng: &mut R) -> MoveResult {
    let (shifted, gained) = shift(board, direction);
    match place_random_tile(shifted, rng) {
        Some((board, spawn)) => MoveResult {
            board,
            verdict: Verdict::Continue,
            gained,
            spawn: Some(spawn),
        },
        None => MoveResult {
            board: shifted,
            verdict: Verdict::Lost,
            gained,
            spawn: None,
        },
    }
}

/// Like `apply_move`, with the direction given as text (case-insensitive).
pub fn execute_move<R: Rng + ?Sized>(
    board: Board,
    direction: &str,
    rng: &mut R,
) -> Result<MoveResult, EngineError> {
    let direction: Move = direction.parse()?;
    Ok(apply_move(board, direction, rng))
}

/// Merge and compact every line in `direction`. No randomness.
///
/// Returns the new board and the sum of tiles produced by merges.
pub fn shift(board: Board, direction: Move) -> (Board, u64) {
    let mut out = board;
    let mut gained: u64 = 0;
    for idx in 0..SIZE {
        let mut line = extract_line(&board, direction, idx);
        gained += u64::from(shift_line(&mut line, direction));
        store_line(&mut out, direction, idx, line);
    }
    (out, gained)
}

// Left/right work on rows. Up/down work on columns read bottom-to-top, so
// "down" travels toward index 0 and "up" toward index 3.
fn extract_line(board: &Board, direction: Move, idx: usize) -> Line {
    match direction {
        Move::Left | Move::Right => board.0[idx],
        Move::Up | Move::Down => std::array::from_fn(|i| board.0[SIZE - 1 - i][idx]),
    }
}

fn store_line(board: &mut Board, direction: Move, idx: usize, line: Line) {
    match direction {
        Move::Left | Move::Right => board.0[idx] = line,
        Move::Up | Move::Down => {
            for (i, tile) in line.into_iter().enumerate() {
                board.0[SIZE - 1 - i][idx] = tile;
            }
        }
    }
}

pub(crate) fn shift_line(line: &mut Line, direction: Move) -> Tile {
    match direction {
        Move::Left | Move::Down => {
            let gained = merge_toward_start(line);
            compact_toward_start(line);
            gained
        }
        Move::Right | Move::Up => {
            let gained = merge_toward_end(line);
            compact_toward_end(line);
            gained
        }
    }
}

/// Scan from index 0; each cell looks ahead to the nearest non-empty cell and
/// absorbs it when equal and the sum fits in a tile. At most one merge per line.
fn merge_toward_start(line: &mut Line) -> Tile {
    for i in 0..SIZE {
        let Some(k) = (i + 1..SIZE).find(|&k| line[k] != 0) else {
            continue;
        };
        if line[i] == line[k] {
            // A pair whose sum does not fit in a tile stays unmerged.
            let Some(merged) = line[i].checked_add(line[k]) else {
                continue;
            };
            line[i] = merged;
            line[k] = 0;
            return merged;
        }
    }
    0
}

/// Scan from index 0; each cell looks back to the nearest non-empty cell and
/// absorbs it when equal and the sum fits in a tile. At most one merge per line.
///
/// The scan still starts at the far edge, so `[2, 2, 2, _]` merges the first
/// pair: `[_, 4, 2, _]`.
fn merge_toward_end(line: &mut Line) -> Tile {
    for i in 0..SIZE {
        let Some(k) = (0..i).rev().find(|&k| line[k] != 0) else {
            continue;
        };
        if line[i] == line[k] {
            // A pair whose sum does not fit in a tile stays unmerged.
            let Some(merged) = line[i].checked_add(line[k]) else {
                continue;
            };
            line[i] = merged;
            line[k] = 0;
            return merged;
        }
    }
    0
}

fn compact_toward_start(line: &mut Line) {
    let mut out = [0; SIZE];
    for (slot, tile) in out.iter_mut().zip(line.iter().copied().filter(|&t| t != 0)) {
        *slot = tile;
    }
    *line = out;
}

fn compact_toward_end(line: &mut Line) {
    line.reverse();
    compact_toward_start(line);
    line.reverse();
}

/// Spawn pass: random row, then a random empty column within it.
///
/// Returns `None` when the board has no empty cell.
pub(crate) fn place_random_tile<R: Rng + ?Sized>(
    board: Board,
    rng: &mut R,
) -> Option<(Board, Spawn)> {
    if count_empty(board) == 0 {
        return None;
    }
    let row = pick_open_row(&board, rng);
    let open: Vec<usize> = (0..SIZE).filter(|&c| board.0[row][c] == 0).collect();
    let col = match open.as_slice() {
        [only] => *only,
        cols => cols[rng.gen_range(0..cols.len())],
    };
    let value = generate_random_tile(rng);
    let mut out = board;
    out.0[row][col] = value;
    Some((out, Spawn { row, col, value }))
}

// Redraw rows that are full, at most CELLS times. The fallback picks
// uniformly among open rows, which is the same distribution.
fn pick_open_row<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> usize {
    let is_open = |row: usize| board.0[row].contains(&0);
    for _ in 0..CELLS {
        let row = rng.gen_range(0..SIZE);
        if is_open(row) {
            return row;
        }
    }
    let open: Vec<usize> = (0..SIZE).filter(|&r| is_open(r)).collect();
    open[rng.gen_range(0..open.len())]
}

pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    if rng.gen_range(0..100) < TWO_PERCENT { 2 } else { 4 }
}

/// Count the number of empty cells.
pub fn count_empty(board: Board) -> usize {
    board.cells().filter(|&t| t == 0).count()
}

pub fn highest_tile(board: Board) -> u32 {
    board.cells().max().unwrap_or(0)
}

/// Render the board as fixed-width text.
///
/// Every cell is left-justified to the widest label (value or `_`) plus two
/// spaces; cells are concatenated and each row ends with a newline.
pub fn render(board: &Board) -> String {
    let labels: Vec<String> = board.cells().map(cell_label).collect();
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(1) + CELL_PADDING;
    let mut out = String::with_capacity((width * SIZE + 1) * SIZE);
    for row in labels.chunks(SIZE) {
        out.extend(row.iter().map(|label| format!("{label:<width$}")));
        out.push('\n');
    }
    out
}

fn cell_label(tile: Tile) -> String {
    match tile {
        0 => EMPTY_MARKER.to_string(),
        v => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn left(mut line: Line) -> Line {
        shift_line(&mut line, Move::Left);
        line
    }

    fn right(mut line: Line) -> Line {
        shift_line(&mut line, Move::Right);
        line
    }

    fn non_empty(board: Board) -> usize {
        CELLS - count_empty(board)
    }

    #[test]
    fn it_shift_line_left() {
        assert_eq!(left([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(left([2, 4, 2, 4]), [2, 4, 2, 4]);
        assert_eq!(left([2, 2, 0, 0]), [4, 0, 0, 0]);
        assert_eq!(left([2, 0, 0, 2]), [4, 0, 0, 0]);
        assert_eq!(left([0, 0, 0, 8]), [8, 0, 0, 0]);
        assert_eq!(left([4, 2, 2, 0]), [4, 4, 0, 0]);
        assert_eq!(left([2, 4, 0, 4]), [2, 8, 0, 0]);
    }

    #[test]
    fn it_shift_line_right() {
        assert_eq!(right([0, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(right([2, 4, 2, 4]), [2, 4, 2, 4]);
        assert_eq!(right([2, 2, 0, 0]), [0, 0, 0, 4]);
        assert_eq!(right([0, 2, 0, 2]), [0, 0, 0, 4]);
        assert_eq!(right([8, 0, 0, 0]), [0, 0, 0, 8]);
    }

    #[test]
    fn only_one_merge_per_line() {
        // A merge-all pass would give [4, 4, 0, 0].
        assert_eq!(left([2, 2, 2, 2]), [4, 2, 2, 0]);
        assert_eq!(right([2, 2, 2, 2]), [0, 4, 2, 2]);
        assert_eq!(left([2, 2, 4, 4]), [4, 4, 4, 0]);
    }

    #[test]
    fn right_merge_scans_from_the_far_edge() {
        assert_eq!(right([2, 2, 2, 0]), [0, 0, 4, 2]);
    }

    #[test]
    fn merge_reports_points() {
        let mut line = [4, 0, 4, 2];
        assert_eq!(shift_line(&mut line, Move::Left), 8);
        let mut line = [2, 4, 8, 16];
        assert_eq!(shift_line(&mut line, Move::Left), 0);
    }

    #[test]
    fn test_shift_down() {
        let b = Board::from_rows([[2, 0, 0, 0], [2, 0, 0, 4], [0, 0, 0, 0], [0, 8, 0, 4]]);
        let (after, gained) = shift(b, Move::Down);
        assert_eq!(
            after.rows(),
            [[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [4, 8, 0, 8]]
        );
        assert_eq!(gained, 12);
    }

    #[test]
    fn test_shift_up() {
        let b = Board::from_rows([[2, 0, 0, 0], [2, 0, 0, 4], [0, 0, 0, 0], [0, 8, 0, 4]]);
        let (after, gained) = shift(b, Move::Up);
        assert_eq!(
            after.rows(),
            [[4, 8, 0, 8], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(gained, 12);
    }

    #[test]
    fn up_merges_the_pair_nearest_the_bottom() {
        // Column (top to bottom) 2, 2, 2, _: the lower pair merges.
        let b = Board::from_rows([[2, 0, 0, 0], [2, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0]]);
        let (after, _) = shift(b, Move::Up);
        let col: Vec<u32> = after.rows().iter().map(|r| r[0]).collect();
        assert_eq!(col, vec![2, 4, 0, 0]);

        let (after, _) = shift(b, Move::Down);
        let col: Vec<u32> = after.rows().iter().map(|r| r[0]).collect();
        assert_eq!(col, vec![0, 0, 2, 4]);
    }

    #[test]
    fn test_shift_left_and_right_boards() {
        let b = Board::from_rows([[2, 4, 8, 16], [4, 4, 4, 0], [0, 2, 0, 2], [8, 0, 0, 0]]);
        let (l, _) = shift(b, Move::Left);
        assert_eq!(
            l.rows(),
            [[2, 4, 8, 16], [8, 4, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0]]
        );
        let (r, _) = shift(b, Move::Right);
        assert_eq!(
            r.rows(),
            [[2, 4, 8, 16], [0, 0, 8, 4], [0, 0, 0, 4], [0, 0, 0, 8]]
        );
    }

    #[test]
    fn merge_then_spawn_scenario() {
        let b = Board::from_rows([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let res = apply_move(b, Move::Left, &mut rng);
            assert_eq!(res.verdict, Verdict::Continue);
            assert_eq!(res.gained, 4);
            let spawn = res.spawn.expect("spawned");
            assert_ne!((spawn.row, spawn.col), (0, 0));
            assert!(spawn.value == 2 || spawn.value == 4);
            assert_eq!(res.board.get(spawn.row, spawn.col), Some(spawn.value));

            let mut without_spawn = res.board.rows();
            without_spawn[spawn.row][spawn.col] = 0;
            assert_eq!(without_spawn, [[4, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
            assert_eq!(non_empty(res.board), 2);
        }
    }

    #[test]
    fn full_board_without_merges_is_lost() {
        let b = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        let mut rng = StdRng::seed_from_u64(1);
        for dir in Move::ALL {
            let res = apply_move(b, dir, &mut rng);
            assert_eq!(res.verdict, Verdict::Lost);
            assert!(res.is_lost());
            assert_eq!(res.board, b);
            assert_eq!(res.spawn, None);
            assert_eq!(res.gained, 0);
        }
    }

    #[test]
    fn full_board_with_a_merge_spawns_in_the_freed_cell() {
        let b = Board::from_rows([
            [2, 2, 4, 8],
            [4, 8, 16, 32],
            [8, 16, 32, 64],
            [16, 32, 64, 128],
        ]);
        let mut rng = StdRng::seed_from_u64(9);
        let res = apply_move(b, Move::Left, &mut rng);
        assert_eq!(res.verdict, Verdict::Continue);
        assert_eq!(res.gained, 4);
        let spawn = res.spawn.unwrap();
        assert_eq!((spawn.row, spawn.col), (0, 3));
        assert_eq!(&res.board.rows()[0][..3], &[4, 4, 8]);
        assert_eq!(res.board.count_empty(), 0);
    }

    // A move that merges and slides nothing still spawns a tile. The usual
    // 2048 rule skips the spawn here; this engine does not.
    #[test]
    fn no_op_move_still_spawns() {
        let b = Board::from_rows([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        assert_eq!(shift(b, Move::Left).0, b);
        let mut rng = StdRng::seed_from_u64(3);
        let res = apply_move(b, Move::Left, &mut rng);
        assert_eq!(res.verdict, Verdict::Continue);
        assert!(res.spawn.is_some());
        assert_eq!(non_empty(res.board), 2);
        assert_eq!(res.board.get(0, 0), Some(2));
    }

    #[test]
    fn spawn_uses_the_only_empty_cell() {
        let b = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (after, spawn) = place_random_tile(b, &mut rng).unwrap();
            assert_eq!((spawn.row, spawn.col), (2, 2));
            assert_eq!(after.count_empty(), 0);
        }
    }

    #[test]
    fn spawn_on_full_board_is_none() {
        let b = Board::from_rows([[2; 4]; 4]);
        let mut rng = StdRng::seed_from_u64(0);
        assert!(place_random_tile(b, &mut rng).is_none());
    }

    #[test]
    fn it_fills_empty_board() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut board = Board::EMPTY;
        for _ in 0..CELLS {
            board = place_random_tile(board, &mut rng).unwrap().0;
        }
        assert_eq!(count_empty(board), 0);
        assert!(board.cells().all(|t| t == 2 || t == 4));
    }

    #[test]
    fn spawn_value_distribution() {
        let mut rng = StdRng::seed_from_u64(2024);
        let draws = 10_000;
        let twos = (0..draws)
            .filter(|_| generate_random_tile(&mut rng) == 2)
            .count();
        assert!((8_200..=8_800).contains(&twos), "twos = {twos}");
    }

    #[test]
    fn execute_move_parses_direction() {
        let mut rng = StdRng::seed_from_u64(5);
        let b = Board::from_rows([[0, 0, 2, 2], [0; 4], [0; 4], [0; 4]]);
        let res = execute_move(b, "LEFT", &mut rng).unwrap();
        assert_eq!(res.gained, 4);
        assert_eq!(res.board.get(0, 0), Some(4));

        let err = execute_move(b, "north", &mut rng).unwrap_err();
        assert_eq!(err, EngineError::InvalidDirection("north".into()));
    }

    #[test]
    fn oversized_pair_does_not_merge() {
        let big = 1u32 << 31;
        let b = Board::from_rows([[big, big, 0, 0], [0; 4], [0; 4], [0; 4]]);
        for dir in [Move::Left, Move::Right] {
            let (after, gained) = shift(b, dir);
            assert_eq!(gained, 0);
            assert_eq!(after.sum(), b.sum());
            assert_eq!(CELLS - count_empty(after), 2);
        }
        // The scan moves past the oversized pair and still merges the next one.
        assert_eq!(left([big, big, 2, 2]), [big, big, 4, 0]);
    }

    #[test]
    fn gained_sums_past_a_single_tile() {
        let half = 1u32 << 30;
        let b = Board::from_rows([[half, half, 0, 0]; 4]);
        let (after, gained) = shift(b, Move::Left);
        assert_eq!(gained, 4 * (1u64 << 31));
        assert!(after.cells().filter(|&t| t != 0).all(|t| t == 1 << 31));
    }

    /// Always yields zero, so every row draw lands on row 0.
    struct ZeroRng {
        draws: usize,
    }

    impl rand::RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            0
        }
        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn row_retry_falls_back_to_an_open_row() {
        let b = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 0, 2, 4], [4, 2, 4, 2]]);
        let mut rng = ZeroRng { draws: 0 };
        assert_eq!(pick_open_row(&b, &mut rng), 2);
        assert!(rng.draws > CELLS);

        let mut rng = ZeroRng { draws: 0 };
        let (after, spawn) = place_random_tile(b, &mut rng).unwrap();
        assert_eq!((spawn.row, spawn.col, spawn.value), (2, 1, 2));
        assert_eq!(after.count_empty(), 0);
    }

    #[test]
    fn it_renders_new_game() {
        let text = render(&Board::new_game());
        assert_eq!(text, "_  _  _  _  \n_  _  _  _  \n_  _  _  _  \n_  _  _  2  \n");
    }

    #[test]
    fn render_pads_to_widest_tile() {
        let b = Board::from_rows([[1024, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let text = render(&b);
        let first = text.lines().next().unwrap();
        assert_eq!(first, "1024  2     _     _     ");
        assert!(text.lines().all(|l| l.len() == 24));
        assert_eq!(text.lines().count(), SIZE);
        assert_eq!(render(&b), text);
    }

    #[test]
    fn it_highest_tile() {
        assert_eq!(highest_tile(Board::EMPTY), 0);
        let b = Board::from_rows([[2, 0, 0, 0], [0, 64, 0, 0], [0; 4], [0, 0, 0, 8]]);
        assert_eq!(highest_tile(b), 64);
        assert_eq!(count_empty(b), 13);
    }
}
