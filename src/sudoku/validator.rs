//! Validation strategies: polynomial identity testing and check-zero.
//!
//! Both strategies reduce each row, column and box to a residual wire that
//! carries zero iff the group is a permutation of 1..9, then differ in how
//! the 27 residuals are settled: PIT opens every residual, Check0 funnels
//! them through one final zero-indicator and opens a single wire.

use tracing::debug;

use crate::field::FieldConfig;
use crate::gates::{
    checked_mul, commit_constant, paired_add, paired_add_constant, paired_scalar_mul, paired_sub,
    AddGate, Check0Gate, CubeGate, Gate, SquareGate,
};
use crate::sudoku::circuit::SudokuCircuit;
use crate::{ProofError, Wire};

pub trait SudokuValidator {
    /// Reduces one row/column/box to a wire holding zero iff the nine input
    /// wires are a permutation of 1..9.
    fn validate_wires(
        &self,
        circuit: &mut SudokuCircuit,
        wires: &[Wire],
    ) -> Result<Wire, ProofError>;

    /// Runs the strategy over the whole board and settles the residuals.
    /// Protocol check failures surface as errors; an honest run on an
    /// invalid board returns Ok(false).
    fn try_validate(&self, circuit: &mut SudokuCircuit) -> Result<bool, ProofError>;

    /// One residual per row, column and box, in that order per index.
    fn validate_all_groups(&self, circuit: &mut SudokuCircuit) -> Result<Vec<Wire>, ProofError> {
        let mut residuals = Vec::with_capacity(27);
        for i in 0..9 {
            let row = circuit.row_wires(i);
            residuals.push(self.validate_wires(circuit, &row)?);
            let col = circuit.column_wires(i);
            residuals.push(self.validate_wires(circuit, &col)?);
            let boxed = circuit.box_wires(i);
            residuals.push(self.validate_wires(circuit, &boxed)?);
        }
        Ok(residuals)
    }

    /// The verifier's verdict for the whole proof.
    fn is_valid(&self, circuit: &mut SudokuCircuit) -> bool {
        let verdict = match self.try_validate(circuit) {
            Ok(ok) => ok,
            Err(err) => {
                debug!(error = %err, "proof rejected");
                false
            }
        };
        circuit.verifier_mut().conclude();
        verdict
    }
}

/// How the PIT strategy settles its 27 residual wires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitCompletion {
    /// Open every residual wire and require each to reveal zero.
    OpenEach,
    /// Fold the residuals into a single wire weighted by powers of the
    /// challenge and open only that wire.
    Aggregate,
}

/// Compares prod_i (r - w_i) at the committed random challenge r against the
/// committed expected product prod_{i=1..9} (r - i). Soundness degrades with
/// small fields; use m = 64 when it matters.
pub struct PitValidator {
    completion: PitCompletion,
}

impl PitValidator {
    pub fn new() -> Self {
        Self {
            completion: PitCompletion::OpenEach,
        }
    }

    pub fn with_completion(completion: PitCompletion) -> Self {
        Self { completion }
    }
}

impl Default for PitValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SudokuValidator for PitValidator {
    fn validate_wires(
        &self,
        circuit: &mut SudokuCircuit,
        wires: &[Wire],
    ) -> Result<Wire, ProofError> {
        assert_eq!(wires.len(), 9, "expected a group of 9 wires");
        let expected = circuit.expected_poly_wire()?;
        let challenge = circuit.challenge_wire();
        let (prover, verifier) = circuit.parties_mut();

        let mut acc = paired_sub(prover, verifier, challenge, wires[0]);
        for w in &wires[1..] {
            let diff = paired_sub(prover, verifier, challenge, *w);
            acc = checked_mul(prover, verifier, acc, diff)?;
        }
        AddGate::new(vec![acc, expected]).evaluate(prover, verifier)
    }

    fn try_validate(&self, circuit: &mut SudokuCircuit) -> Result<bool, ProofError> {
        let residuals = self.validate_all_groups(circuit)?;
        match self.completion {
            PitCompletion::OpenEach => {
                let (prover, verifier) = circuit.parties_mut();
                for residual in residuals {
                    let opening = prover.open(residual);
                    if !verifier.check_open(&opening) {
                        return Err(ProofError::OpenCheckFailed {
                            index: opening.index,
                        });
                    }
                    if opening.u != 0 {
                        debug!(index = opening.index, "nonzero residual");
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            PitCompletion::Aggregate => {
                let r = circuit.challenge();
                let field = circuit.field();
                let (prover, verifier) = circuit.parties_mut();
                let mut acc = residuals[0];
                let mut coeff = r;
                for residual in &residuals[1..] {
                    let term = paired_scalar_mul(prover, verifier, *residual, coeff);
                    acc = paired_add(prover, verifier, acc, term);
                    coeff = field.mul(coeff, r);
                }
                let opening = prover.open(acc);
                if !verifier.check_open(&opening) {
                    return Err(ProofError::OpenCheckFailed {
                        index: opening.index,
                    });
                }
                Ok(opening.u == 0)
            }
        }
    }
}

/// Checks sum w_i^2 and sum w_i^3 against the values these sums take on the
/// multiset {1..9}, which characterize it uniquely among multisets drawn
/// from 1..9 (verified exhaustively in the test suite). The expected sums
/// are recomputed for the configured field at construction, never assumed.
pub struct Check0Validator {
    expected_sum_sq: u64,
    expected_sum_cube: u64,
}

impl Check0Validator {
    pub fn new(field: FieldConfig) -> Self {
        let mut expected_sum_sq = 0;
        let mut expected_sum_cube = 0;
        for i in 1..=9u64 {
            let square = field.mul(i, i);
            expected_sum_sq = field.add(expected_sum_sq, square);
            expected_sum_cube = field.add(expected_sum_cube, field.mul(square, i));
        }
        Self {
            expected_sum_sq,
            expected_sum_cube,
        }
    }
}

impl SudokuValidator for Check0Validator {
    fn validate_wires(
        &self,
        circuit: &mut SudokuCircuit,
        wires: &[Wire],
    ) -> Result<Wire, ProofError> {
        assert_eq!(wires.len(), 9, "expected a group of 9 wires");
        let (prover, verifier) = circuit.parties_mut();

        let mut squared = Vec::with_capacity(wires.len());
        let mut cubed = Vec::with_capacity(wires.len());
        for w in wires {
            squared.push(SquareGate::new(*w).evaluate(prover, verifier)?);
            cubed.push(CubeGate::new(*w).evaluate(prover, verifier)?);
        }

        // Public constants enter as a committed zero shifted by add_constant.
        let zero = commit_constant(prover, verifier, 0);

        let sum_sq = AddGate::new(squared).evaluate(prover, verifier)?;
        let expected_sq = paired_add_constant(prover, verifier, zero, self.expected_sum_sq);
        let residual_sq = AddGate::new(vec![sum_sq, expected_sq]).evaluate(prover, verifier)?;

        let sum_cube = AddGate::new(cubed).evaluate(prover, verifier)?;
        let expected_cube = paired_add_constant(prover, verifier, zero, self.expected_sum_cube);
        let residual_cube = AddGate::new(vec![sum_cube, expected_cube]).evaluate(prover, verifier)?;

        Check0Gate::new(vec![residual_sq, residual_cube]).evaluate(prover, verifier)
    }

    fn try_validate(&self, circuit: &mut SudokuCircuit) -> Result<bool, ProofError> {
        let residuals = self.validate_all_groups(circuit)?;
        let (prover, verifier) = circuit.parties_mut();
        let combined = Check0Gate::new(residuals).evaluate(prover, verifier)?;
        let opening = prover.open(combined);
        if !verifier.check_open(&opening) {
            return Err(ProofError::OpenCheckFailed {
                index: opening.index,
            });
        }
        Ok(opening.u == 0)
    }
}

#[cfg(test)]
mod test {
    use itertools::Itertools;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use crate::actors::{Prover, Verifier};
    use crate::vole::{seed_from_label, VoleSetup};

    use super::*;

    fn fresh_circuit(label: &str, m: u32, length: usize) -> SudokuCircuit {
        let field = FieldConfig::new(m);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label(label));
        let (p, v) = VoleSetup::sample(field, length, &mut rng).split();
        SudokuCircuit::new(Prover::new(field, p), Verifier::new(field, v), &mut rng)
    }

    fn reference_board() -> [[u8; 9]; 9] {
        let mut board = [[0u8; 9]; 9];
        for r in 0..9 {
            for c in 0..9 {
                board[r][c] = ((3 * r + r / 3 + c) % 9 + 1) as u8;
            }
        }
        board
    }

    #[test]
    fn check0_constants_for_m8_are_1_and_73() {
        let validator = Check0Validator::new(FieldConfig::new(8));
        assert_eq!(validator.expected_sum_sq, 1);
        assert_eq!(validator.expected_sum_cube, 73);
    }

    /// The sum-of-squares / sum-of-cubes pair must single out permutations
    /// of {1..9} among all multisets over 1..9. Exhaustive: every
    /// permutation hits the targets, no multiset with a repeat does.
    #[test]
    fn check0_constants_characterize_permutations() {
        let field = FieldConfig::new(8);
        let validator = Check0Validator::new(field);
        let sums = |values: &[u64]| {
            values.iter().fold((0, 0), |(sq, cu), w| {
                let square = field.mul(*w, *w);
                (
                    field.add(sq, square),
                    field.add(cu, field.mul(square, *w)),
                )
            })
        };

        for perm in (1..=9u64).permutations(9) {
            assert_eq!(
                sums(&perm),
                (validator.expected_sum_sq, validator.expected_sum_cube)
            );
        }

        for combo in (1..=9u64).combinations_with_replacement(9) {
            if combo.iter().unique().count() == 9 {
                continue;
            }
            assert_ne!(
                sums(&combo),
                (validator.expected_sum_sq, validator.expected_sum_cube),
                "multiset {combo:?} collides with the permutation targets"
            );
        }
    }

    #[test]
    fn pit_accepts_every_valid_row() {
        let mut circuit = fresh_circuit("pit valid rows", 64, 4096);
        circuit.commit_board(&reference_board()).unwrap();
        let validator = PitValidator::new();
        for i in 0..9 {
            let row = circuit.row_wires(i);
            let residual = validator.validate_wires(&mut circuit, &row).unwrap();
            assert_eq!(circuit.prover().value(residual), 0);
        }
    }

    #[test]
    fn pit_flags_a_duplicated_cell() {
        let mut board = reference_board();
        board[0][0] = board[0][1];
        let mut circuit = fresh_circuit("pit duplicate row", 64, 4096);
        circuit.commit_board(&board).unwrap();
        let validator = PitValidator::new();
        let row = circuit.row_wires(0);
        let residual = validator.validate_wires(&mut circuit, &row).unwrap();
        assert_ne!(circuit.prover().value(residual), 0);
    }

    #[test]
    fn check0_accepts_every_valid_group() {
        let mut circuit = fresh_circuit("check0 valid groups", 8, 1 << 16);
        circuit.commit_board(&reference_board()).unwrap();
        let validator = Check0Validator::new(circuit.field());
        for i in 0..9 {
            let row = circuit.row_wires(i);
            let residual = validator.validate_wires(&mut circuit, &row).unwrap();
            assert_eq!(circuit.prover().value(residual), 0);
        }
    }

    #[test]
    fn check0_flags_a_duplicated_cell() {
        let mut board = reference_board();
        board[0][0] = board[0][1];
        let mut circuit = fresh_circuit("check0 duplicate row", 8, 1 << 16);
        circuit.commit_board(&board).unwrap();
        let validator = Check0Validator::new(circuit.field());
        let row = circuit.row_wires(0);
        let residual = validator.validate_wires(&mut circuit, &row).unwrap();
        assert_ne!(circuit.prover().value(residual), 0);
    }

    #[test]
    fn aggregated_completion_matches_open_each() {
        let board = reference_board();
        for (label, validator) in [
            ("agg pit open each", PitValidator::new()),
            (
                "agg pit aggregate",
                PitValidator::with_completion(PitCompletion::Aggregate),
            ),
        ] {
            let mut circuit = fresh_circuit(label, 64, 4096);
            circuit.commit_board(&board).unwrap();
            assert!(validator.is_valid(&mut circuit));
        }
    }

    #[test]
    fn aggregated_completion_rejects_a_duplicate() {
        let mut board = reference_board();
        board[0][0] = board[0][1];
        let validator = PitValidator::with_completion(PitCompletion::Aggregate);
        let mut circuit = fresh_circuit("agg pit duplicate", 64, 4096);
        circuit.commit_board(&board).unwrap();
        assert!(!validator.is_valid(&mut circuit));
    }

    /// Field-level PIT repetition: a shuffled 1..9 row always matches the
    /// expected product at a random challenge.
    #[test]
    fn pit_identity_holds_for_permutations() {
        let field = FieldConfig::new(8);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label("pit field valid"));
        for _ in 0..1000 {
            let mut row: Vec<u64> = (1..=9).collect();
            row.shuffle(&mut rng);
            let r = field.random_element(&mut rng);
            let expected = (1..=9u64).fold(1, |acc, i| field.mul(acc, field.sub(r, i)));
            let got = row.iter().fold(1, |acc, w| field.mul(acc, field.sub(r, *w)));
            assert_eq!(got, expected);
        }
    }

    /// A row with a duplicate is caught for all challenges except the roots
    /// of the difference polynomial, so failures dominate even in GF(2^8):
    /// expect false passes at roughly degree/|F| of the 1000 trials.
    #[test]
    fn pit_identity_fails_for_duplicates() {
        let field = FieldConfig::new(8);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label("pit field invalid"));
        let mut caught = 0;
        for _ in 0..1000 {
            let mut row: Vec<u64> = (1..=9).collect();
            row.shuffle(&mut rng);
            row[8] = row[0];
            let r = field.random_element(&mut rng);
            let expected = (1..=9u64).fold(1, |acc, i| field.mul(acc, field.sub(r, i)));
            let got = row.iter().fold(1, |acc, w| field.mul(acc, field.sub(r, *w)));
            if got != expected {
                caught += 1;
            }
        }
        assert!(caught > 950, "only {caught} of 1000 duplicate rows caught");
    }
}
