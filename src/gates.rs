//! Composite gates over committed wires.
//!
//! Each gate drives the prover and verifier through the same sequence of
//! primitive operations, keeping their cursors in lockstep. Multiplications
//! are always followed by the verifier's product check; a failed check
//! rejects the whole proof.

use crate::actors::{Prover, Verifier};
use crate::{ProofError, Wire};

pub trait Gate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError>;
}

/// Commits the public constant `k` on both sides.
pub fn commit_constant(prover: &mut Prover, verifier: &mut Verifier, k: u64) -> Wire {
    let msg = prover.commit(k);
    verifier.update_q(msg.index, msg.correction);
    Wire(msg.index)
}

pub fn paired_add(prover: &mut Prover, verifier: &mut Verifier, a: Wire, b: Wire) -> Wire {
    let c = prover.add(a, b);
    let vc = verifier.add(a, b);
    assert_eq!(c, vc, "cursor desync after addition");
    c
}

pub fn paired_sub(prover: &mut Prover, verifier: &mut Verifier, a: Wire, b: Wire) -> Wire {
    let c = prover.sub(a, b);
    let vc = verifier.sub(a, b);
    assert_eq!(c, vc, "cursor desync after subtraction");
    c
}

pub fn paired_scalar_mul(prover: &mut Prover, verifier: &mut Verifier, a: Wire, k: u64) -> Wire {
    let c = prover.scalar_mul(a, k);
    let vc = verifier.scalar_mul(a, k);
    assert_eq!(c, vc, "cursor desync after scalar multiplication");
    c
}

pub fn paired_add_constant(prover: &mut Prover, verifier: &mut Verifier, a: Wire, k: u64) -> Wire {
    let c = prover.add_constant(a, k);
    let vc = verifier.add_constant(a, k);
    assert_eq!(c, vc, "cursor desync after constant addition");
    c
}

/// One paired multiplication with its product check.
pub fn checked_mul(
    prover: &mut Prover,
    verifier: &mut Verifier,
    a: Wire,
    b: Wire,
) -> Result<Wire, ProofError> {
    let (c, msg) = prover.mul(a, b);
    let vc = verifier.mul(a, b, &msg);
    assert_eq!(c, vc, "cursor desync after multiplication");
    if !verifier.check_mul(a, b, c, msg.d, msg.e) {
        return Err(ProofError::MulCheckFailed { index: c.0 });
    }
    Ok(c)
}

/// Left-fold of two or more wires under addition.
pub struct AddGate {
    inputs: Vec<Wire>,
}

impl AddGate {
    pub fn new(inputs: Vec<Wire>) -> Self {
        assert!(
            inputs.len() >= 2,
            "AddGate needs at least 2 input wires, got {}",
            inputs.len()
        );
        Self { inputs }
    }
}

impl Gate for AddGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        let mut acc = self.inputs[0];
        for w in &self.inputs[1..] {
            acc = paired_add(prover, verifier, acc, *w);
        }
        Ok(acc)
    }
}

/// Left-fold of two or more wires under checked multiplication.
pub struct MulGate {
    inputs: Vec<Wire>,
}

impl MulGate {
    pub fn new(inputs: Vec<Wire>) -> Self {
        assert!(
            inputs.len() >= 2,
            "MulGate needs at least 2 input wires, got {}",
            inputs.len()
        );
        Self { inputs }
    }
}

impl Gate for MulGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        let mut acc = self.inputs[0];
        for w in &self.inputs[1..] {
            acc = checked_mul(prover, verifier, acc, *w)?;
        }
        Ok(acc)
    }
}

/// Raises a wire to a public power by repeated multiplication. Exponent 0
/// commits a fresh constant-one wire; exponent 1 returns the input as-is.
pub struct PowGate {
    base: Wire,
    exponent: u64,
}

impl PowGate {
    pub fn new(base: Wire, exponent: u64) -> Self {
        Self { base, exponent }
    }
}

impl Gate for PowGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        match self.exponent {
            0 => Ok(commit_constant(prover, verifier, 1)),
            1 => Ok(self.base),
            n => {
                let mut acc = self.base;
                for _ in 1..n {
                    acc = checked_mul(prover, verifier, acc, self.base)?;
                }
                Ok(acc)
            }
        }
    }
}

pub struct SquareGate {
    input: Wire,
}

impl SquareGate {
    pub fn new(input: Wire) -> Self {
        Self { input }
    }
}

impl Gate for SquareGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        PowGate::new(self.input, 2).evaluate(prover, verifier)
    }
}

pub struct CubeGate {
    input: Wire,
}

impl CubeGate {
    pub fn new(input: Wire) -> Self {
        Self { input }
    }
}

impl Gate for CubeGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        PowGate::new(self.input, 3).evaluate(prover, verifier)
    }
}

/// Reconstructs a value from bit wires (least significant first) as
/// sum bit_i * 2^i. Purely linear; consumes no multiplication material.
pub struct NumRecGate {
    bits: Vec<Wire>,
}

impl NumRecGate {
    pub fn new(bits: Vec<Wire>) -> Self {
        assert!(!bits.is_empty(), "NumRecGate needs at least 1 bit wire");
        Self { bits }
    }
}

impl Gate for NumRecGate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        let mut acc = paired_scalar_mul(prover, verifier, self.bits[0], 1);
        for (j, bit) in self.bits.iter().enumerate().skip(1) {
            let term = paired_scalar_mul(prover, verifier, *bit, 1 << j);
            acc = paired_add(prover, verifier, acc, term);
        }
        Ok(acc)
    }
}

/// Produces a wire equal to (prod_i (w_i^(2^m - 1) + 1)) + 1: zero iff every
/// input wire is zero. The inner power is the field's zero indicator.
pub struct Check0Gate {
    inputs: Vec<Wire>,
}

impl Check0Gate {
    pub fn new(inputs: Vec<Wire>) -> Self {
        assert!(!inputs.is_empty(), "Check0Gate needs at least 1 input wire");
        Self { inputs }
    }
}

impl Gate for Check0Gate {
    fn evaluate(&self, prover: &mut Prover, verifier: &mut Verifier) -> Result<Wire, ProofError> {
        let order = prover.field().multiplicative_order();
        let mut flags = Vec::with_capacity(self.inputs.len());
        for w in &self.inputs {
            let powered = PowGate::new(*w, order).evaluate(prover, verifier)?;
            flags.push(paired_add_constant(prover, verifier, powered, 1));
        }
        let product = if flags.len() == 1 {
            flags[0]
        } else {
            MulGate::new(flags).evaluate(prover, verifier)?
        };
        Ok(paired_add_constant(prover, verifier, product, 1))
    }
}
