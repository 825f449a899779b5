//! The prover and verifier state machines.
//!
//! Both parties hold one contiguous tape and a single append cursor. Every
//! prover operation must be mirrored by the matching verifier operation in
//! the same order so the cursors stay in lockstep; the gate layer enforces
//! the pairing. Cursor or phase violations are programming errors and panic.

use serde::{Deserialize, Serialize};

use crate::field::FieldConfig;
use crate::vole::{ProverShare, VerifierShare};
use crate::Wire;

/// Protocol phases, strictly forward-moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Fresh,
    Committing,
    Computing,
    Opening,
    Done,
}

impl Phase {
    /// Moves to `at_least` if behind it; panics past `ceiling`. Commits may
    /// still happen mid-computation (their ceiling is `Computing`), but no
    /// operation may run once the party has begun opening or finished.
    fn enter(&mut self, at_least: Phase, ceiling: Phase) {
        assert!(
            *self <= ceiling,
            "illegal backwards phase transition: {:?} after {:?}",
            at_least,
            *self
        );
        if *self < at_least {
            *self = at_least;
        }
    }
}

/// Per-commit correction: lets the verifier repair q at the committed slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CommitMessage {
    pub index: usize,
    pub correction: u64,
}

/// Per-multiplication message: the correction fixes q at the result slot,
/// (d, e) feed the verifier's multiplication check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MulMessage {
    pub index: usize,
    pub correction: u64,
    pub d: u64,
    pub e: u64,
}

/// A revealed tape slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Opening {
    pub index: usize,
    pub u: u64,
    pub v: u64,
}

pub struct Prover {
    field: FieldConfig,
    u: Vec<u64>,
    v: Vec<u64>,
    idx: usize,
    phase: Phase,
}

impl Prover {
    pub fn new(field: FieldConfig, share: ProverShare) -> Self {
        assert_eq!(
            share.u.len(),
            share.v.len(),
            "u and v tapes differ in length"
        );
        Self {
            field,
            u: share.u,
            v: share.v,
            idx: 0,
            phase: Phase::Fresh,
        }
    }

    pub fn field(&self) -> FieldConfig {
        self.field
    }

    /// Slots consumed so far.
    pub fn slots_used(&self) -> usize {
        self.idx
    }

    fn alloc(&mut self) -> usize {
        assert!(
            self.idx < self.u.len(),
            "prover tape exhausted at {} slots, provision a longer correlation",
            self.u.len()
        );
        let i = self.idx;
        self.idx += 1;
        i
    }

    /// Fixes `w` at the current slot. The returned correction is the XOR of
    /// the slot's fresh random u with w; v is left untouched, so once the
    /// verifier absorbs the correction, q[i] = v[i] + w * delta again.
    pub fn commit(&mut self, w: u64) -> CommitMessage {
        self.phase.enter(Phase::Committing, Phase::Computing);
        let i = self.alloc();
        let correction = self.field.add(self.u[i], w);
        self.u[i] = w;
        CommitMessage {
            index: i,
            correction,
        }
    }

    pub fn add(&mut self, a: Wire, b: Wire) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.u[c] = self.field.add(self.u[a.0], self.u[b.0]);
        self.v[c] = self.field.add(self.v[a.0], self.v[b.0]);
        Wire(c)
    }

    /// Identical to `add` in characteristic 2.
    pub fn sub(&mut self, a: Wire, b: Wire) -> Wire {
        self.add(a, b)
    }

    /// Multiplies a wire by the public scalar `k`.
    pub fn scalar_mul(&mut self, a: Wire, k: u64) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.u[c] = self.field.mul(k, self.u[a.0]);
        self.v[c] = self.field.mul(k, self.v[a.0]);
        Wire(c)
    }

    /// Adds the public constant `k` to a wire. Only u moves; the verifier
    /// compensates with k * delta on its side.
    pub fn add_constant(&mut self, a: Wire, k: u64) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.u[c] = self.field.add(self.u[a.0], k);
        self.v[c] = self.v[a.0];
        Wire(c)
    }

    /// Multiplies two wires. The result slot keeps its fresh v as the mask;
    /// (d, e) let the verifier check the product relation against q.
    pub fn mul(&mut self, a: Wire, b: Wire) -> (Wire, MulMessage) {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        let (ua, ub) = (self.u[a.0], self.u[b.0]);
        let (va, vb) = (self.v[a.0], self.v[b.0]);
        let new_u = self.field.mul(ua, ub);
        let correction = self.field.add(new_u, self.u[c]);
        self.u[c] = new_u;
        let d = self.field.add(
            self.field
                .add(self.field.mul(va, ub), self.field.mul(vb, ua)),
            self.v[c],
        );
        let e = self.field.mul(va, vb);
        (
            Wire(c),
            MulMessage {
                index: c,
                correction,
                d,
                e,
            },
        )
    }

    /// Reveals both tapes at a wire.
    pub fn open(&mut self, w: Wire) -> Opening {
        self.phase.enter(Phase::Opening, Phase::Opening);
        Opening {
            index: w.0,
            u: self.u[w.0],
            v: self.v[w.0],
        }
    }

    /// The committed value a wire carries. Prover-side only.
    pub fn value(&self, w: Wire) -> u64 {
        self.u[w.0]
    }
}

pub struct Verifier {
    field: FieldConfig,
    q: Vec<u64>,
    delta: u64,
    idx: usize,
    phase: Phase,
}

impl Verifier {
    pub fn new(field: FieldConfig, share: VerifierShare) -> Self {
        Self {
            field,
            q: share.q,
            delta: share.delta,
            idx: 0,
            phase: Phase::Fresh,
        }
    }

    pub fn slots_used(&self) -> usize {
        self.idx
    }

    fn alloc(&mut self) -> usize {
        assert!(
            self.idx < self.q.len(),
            "verifier tape exhausted at {} slots, provision a longer correlation",
            self.q.len()
        );
        let i = self.idx;
        self.idx += 1;
        i
    }

    /// Absorbs a correction into q[i]. Advances the cursor only when `i` is
    /// the slot at the cursor; corrections at earlier indices are in-place.
    pub fn update_q(&mut self, i: usize, di: u64) {
        self.phase.enter(Phase::Committing, Phase::Computing);
        assert!(
            i <= self.idx,
            "correction index {i} beyond cursor {}",
            self.idx
        );
        assert!(i < self.q.len(), "correction index {i} out of range");
        self.q[i] = self.field.add(self.q[i], self.field.mul(di, self.delta));
        if i == self.idx {
            self.idx += 1;
        }
    }

    pub fn add(&mut self, a: Wire, b: Wire) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.q[c] = self.field.add(self.q[a.0], self.q[b.0]);
        Wire(c)
    }

    /// Identical to `add` in characteristic 2.
    pub fn sub(&mut self, a: Wire, b: Wire) -> Wire {
        self.add(a, b)
    }

    pub fn scalar_mul(&mut self, a: Wire, k: u64) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.q[c] = self.field.mul(k, self.q[a.0]);
        Wire(c)
    }

    pub fn add_constant(&mut self, a: Wire, k: u64) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        self.q[c] = self.field.add(self.q[a.0], self.field.mul(k, self.delta));
        Wire(c)
    }

    /// Places the tentative q at the product slot. Correctness of the
    /// multiplication is only established by a subsequent `check_mul`.
    pub fn mul(&mut self, _a: Wire, _b: Wire, message: &MulMessage) -> Wire {
        self.phase.enter(Phase::Computing, Phase::Computing);
        let c = self.alloc();
        assert_eq!(
            c, message.index,
            "cursor desync: verifier at {c}, prover multiplied into {}",
            message.index
        );
        self.q[c] = self
            .field
            .add(self.q[c], self.field.mul(message.correction, self.delta));
        Wire(c)
    }

    /// Accepts iff q[a] * q[b] + delta * q[c] = d * delta + e, which holds
    /// exactly when u[c] = u[a] * u[b] and (d, e) were computed honestly.
    /// A cheating prover slips past with probability at most 1/|F|.
    pub fn check_mul(&self, a: Wire, b: Wire, c: Wire, d: u64, e: u64) -> bool {
        let lhs = self.field.add(
            self.field.mul(self.q[a.0], self.q[b.0]),
            self.field.mul(self.delta, self.q[c.0]),
        );
        let rhs = self.field.add(self.field.mul(d, self.delta), e);
        lhs == rhs
    }

    /// Accepts iff q[i] = v + w * delta for the revealed pair.
    pub fn check_open(&mut self, opening: &Opening) -> bool {
        self.phase.enter(Phase::Opening, Phase::Opening);
        self.q[opening.index]
            == self
                .field
                .add(opening.v, self.field.mul(opening.u, self.delta))
    }

    /// Final acceptance or rejection; no operation is legal afterwards.
    pub fn conclude(&mut self) {
        self.phase.enter(Phase::Done, Phase::Done);
    }
}
