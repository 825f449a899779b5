//! Bit-commits a 9x9 board and exposes its wires to the validators.

use rand::Rng;
use tracing::debug;

use crate::actors::{Prover, Verifier};
use crate::field::FieldConfig;
use crate::gates::{checked_mul, commit_constant, paired_sub, Gate, NumRecGate};
use crate::{ProofError, Wire};

/// Cells range over 1..9, so four bits per cell suffice.
const BITS_PER_CELL: usize = 4;

pub struct SudokuCircuit {
    field: FieldConfig,
    prover: Prover,
    verifier: Verifier,
    cells: [[Wire; 9]; 9],
    challenge: u64,
    challenge_wire: Wire,
    expected_poly_wire: Option<Wire>,
}

impl SudokuCircuit {
    /// Samples and commits the challenge up front; the expected-polynomial
    /// wire is only built once a validator asks for it.
    pub fn new<R: Rng>(mut prover: Prover, mut verifier: Verifier, rng: &mut R) -> Self {
        let field = prover.field();
        let challenge = field.random_element(rng);
        let challenge_wire = commit_constant(&mut prover, &mut verifier, challenge);
        Self {
            field,
            prover,
            verifier,
            cells: [[Wire(0); 9]; 9],
            challenge,
            challenge_wire,
            expected_poly_wire: None,
        }
    }

    pub fn field(&self) -> FieldConfig {
        self.field
    }

    pub fn challenge_wire(&self) -> Wire {
        self.challenge_wire
    }

    /// Both actors, split-borrowed so gates can drive them in lockstep.
    pub fn parties_mut(&mut self) -> (&mut Prover, &mut Verifier) {
        (&mut self.prover, &mut self.verifier)
    }

    pub fn prover(&self) -> &Prover {
        &self.prover
    }

    pub fn verifier_mut(&mut self) -> &mut Verifier {
        &mut self.verifier
    }

    pub fn slots_used(&self) -> usize {
        self.prover.slots_used()
    }

    /// Commits every cell bit by bit and rebuilds the cell values through
    /// NumRec wires.
    pub fn commit_board(&mut self, board: &[[u8; 9]; 9]) -> Result<(), ProofError> {
        for (i, row) in board.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                let bits = self.field.bit_dec(*value as u64, BITS_PER_CELL);
                let bit_wires: Vec<Wire> = bits
                    .iter()
                    .map(|bit| commit_constant(&mut self.prover, &mut self.verifier, *bit))
                    .collect();
                let cell =
                    NumRecGate::new(bit_wires).evaluate(&mut self.prover, &mut self.verifier)?;
                self.cells[i][j] = cell;
            }
        }
        debug!(slots = self.prover.slots_used(), "board committed");
        Ok(())
    }

    pub fn row_wires(&self, row: usize) -> Vec<Wire> {
        self.cells[row].to_vec()
    }

    pub fn column_wires(&self, col: usize) -> Vec<Wire> {
        (0..9).map(|i| self.cells[i][col]).collect()
    }

    /// Boxes are numbered row-major:
    /// 0 1 2
    /// 3 4 5
    /// 6 7 8
    pub fn box_wires(&self, box_index: usize) -> Vec<Wire> {
        let box_row = (box_index / 3) * 3;
        let box_col = (box_index % 3) * 3;
        (0..3)
            .flat_map(|i| (0..3).map(move |j| (box_row + i, box_col + j)))
            .map(|(i, j)| self.cells[i][j])
            .collect()
    }

    /// The committed product prod_{i=1..9} (r - i), built on first use from
    /// committed constants so a run that never needs it is not charged.
    pub fn expected_poly_wire(&mut self) -> Result<Wire, ProofError> {
        if let Some(wire) = self.expected_poly_wire {
            return Ok(wire);
        }
        let one = commit_constant(&mut self.prover, &mut self.verifier, 1);
        let mut acc = paired_sub(&mut self.prover, &mut self.verifier, self.challenge_wire, one);
        for i in 2..=9u64 {
            let constant = commit_constant(&mut self.prover, &mut self.verifier, i);
            let diff = paired_sub(
                &mut self.prover,
                &mut self.verifier,
                self.challenge_wire,
                constant,
            );
            acc = checked_mul(&mut self.prover, &mut self.verifier, acc, diff)?;
        }
        self.expected_poly_wire = Some(acc);
        Ok(acc)
    }

    /// The challenge value itself. It is public to both parties; the
    /// committed wire exists so gates can fold it into products.
    pub fn challenge(&self) -> u64 {
        self.challenge
    }
}
