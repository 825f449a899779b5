//! Interactive commit-and-verify engine over a VOLE correlation in GF(2^m),
//! with two strategies for proving that a committed 9x9 Sudoku solution is
//! valid without revealing it.
//!
//! The prover holds the tapes (u, v), the verifier holds (delta, q) with
//! q = v + u * delta slot-wise. Commits, linear gates and checked
//! multiplications move both parties in lockstep; validation ends with short
//! openings of residual wires that hold zero iff the board is valid.

pub mod actors;
pub mod field;
pub mod gates;
pub mod sudoku;
pub mod vole;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

use crate::actors::{Prover, Verifier};
use crate::field::FieldConfig;
use crate::sudoku::{SudokuCircuit, SudokuValidator};
use crate::vole::VoleSetup;

/// A handle into the tapes. The value it carries is the prover's u at its
/// index; wires are immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire(pub usize);

/// Protocol failures: a verifier check rejected the prover's messages.
/// Recovered as a `false` verdict; everything else (cursor desync, tape
/// exhaustion, unsupported field) is a programming error and panics.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("multiplication check failed at slot {index}")]
    MulCheckFailed { index: usize },
    #[error("opening check failed at slot {index}")]
    OpenCheckFailed { index: usize },
}

/// Outcome of one full proof, with tape accounting for strategy comparison.
#[derive(Debug, Clone, Copy)]
pub struct ProofRun {
    pub valid: bool,
    pub slots_used: usize,
}

/// Deals a fresh correlation, commits the board and runs the validator.
pub fn prove_board<R: Rng>(
    field: FieldConfig,
    tape_len: usize,
    validator: &dyn SudokuValidator,
    board: &[[u8; 9]; 9],
    rng: &mut R,
) -> Result<ProofRun, ProofError> {
    let (prover_share, verifier_share) = VoleSetup::sample(field, tape_len, rng).split();
    let prover = Prover::new(field, prover_share);
    let verifier = Verifier::new(field, verifier_share);
    let mut circuit = SudokuCircuit::new(prover, verifier, rng);
    circuit.commit_board(board)?;
    let valid = validator.is_valid(&mut circuit);
    debug!(valid, slots = circuit.slots_used(), "proof finished");
    Ok(ProofRun {
        valid,
        slots_used: circuit.slots_used(),
    })
}
