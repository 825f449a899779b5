//! Random solved-board supplier for the binary and the bench.
//!
//! The engine itself never generates boards; it only consumes them.

use rand::seq::SliceRandom;
use rand::Rng;

/// Produces a uniformly shuffled solved 9x9 board by randomized
/// backtracking.
pub fn random_solved_board<R: Rng>(rng: &mut R) -> [[u8; 9]; 9] {
    let mut board = [[0u8; 9]; 9];
    let filled = fill(&mut board, rng);
    assert!(filled, "backtracking search cannot fail on an empty board");
    board
}

/// Blanks `count` filled cells (as zeroes) to derive a puzzle from a
/// solution.
pub fn punch_holes<R: Rng>(board: &[[u8; 9]; 9], count: usize, rng: &mut R) -> [[u8; 9]; 9] {
    let mut puzzle = *board;
    let mut remaining = count.min(81);
    while remaining > 0 {
        let r = rng.gen_range(0..9);
        let c = rng.gen_range(0..9);
        if puzzle[r][c] != 0 {
            puzzle[r][c] = 0;
            remaining -= 1;
        }
    }
    puzzle
}

fn placement_ok(board: &[[u8; 9]; 9], row: usize, col: usize, num: u8) -> bool {
    for x in 0..9 {
        if board[row][x] == num || board[x][col] == num {
            return false;
        }
    }
    let (start_row, start_col) = (3 * (row / 3), 3 * (col / 3));
    for i in 0..3 {
        for j in 0..3 {
            if board[start_row + i][start_col + j] == num {
                return false;
            }
        }
    }
    true
}

fn fill<R: Rng>(board: &mut [[u8; 9]; 9], rng: &mut R) -> bool {
    for i in 0..9 {
        for j in 0..9 {
            if board[i][j] == 0 {
                let mut candidates: Vec<u8> = (1..=9).collect();
                candidates.shuffle(rng);
                for num in candidates {
                    if placement_ok(board, i, j, num) {
                        board[i][j] = num;
                        if fill(board, rng) {
                            return true;
                        }
                        board[i][j] = 0;
                    }
                }
                return false;
            }
        }
    }
    true
}
