use rand::Rng;
use tracing::debug;

use crate::field::FieldConfig;

/// One sampled VOLE correlation: q[i] = v[i] + u[i] * delta for every i.
///
/// The dealer is trusted and runs in-process. `split` hands the prover share
/// (u, v) and the verifier share (delta, q) out separately so that neither
/// party can reach the other's tape afterwards.
#[derive(Debug)]
pub struct VoleSetup {
    pub u: Vec<u64>,
    pub v: Vec<u64>,
    pub delta: u64,
    pub q: Vec<u64>,
}

/// The prover's half of the correlation.
#[derive(Debug)]
pub struct ProverShare {
    pub u: Vec<u64>,
    pub v: Vec<u64>,
}

/// The verifier's half of the correlation.
#[derive(Debug)]
pub struct VerifierShare {
    pub delta: u64,
    pub q: Vec<u64>,
}

impl VoleSetup {
    /// Samples a fresh length-`length` correlation: u uniform in {0,1}^L,
    /// v uniform in F^L, delta uniform in F.
    pub fn sample<R: Rng>(field: FieldConfig, length: usize, rng: &mut R) -> Self {
        let u: Vec<u64> = (0..length).map(|_| field.random_bit(rng)).collect();
        let v: Vec<u64> = (0..length).map(|_| field.random_element(rng)).collect();
        let delta = field.random_element(rng);
        let q = field.add_vectors(&v, &field.mul_scalar(&u, delta));
        debug!(length, m = field.m(), "sampled vole correlation");
        Self { u, v, delta, q }
    }

    pub fn split(self) -> (ProverShare, VerifierShare) {
        (
            ProverShare {
                u: self.u,
                v: self.v,
            },
            VerifierShare {
                delta: self.delta,
                q: self.q,
            },
        )
    }
}

/// Hashes a textual label into a 32-byte RNG seed, for reproducible runs.
pub fn seed_from_label(label: &str) -> [u8; 32] {
    *blake3::hash(label.as_bytes()).as_bytes()
}

#[cfg(test)]
mod test {
    use itertools::izip;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    use super::*;

    #[test]
    fn correlation_holds_on_every_slot() {
        let field = FieldConfig::new(8);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label("vole correlation test"));
        for _ in 0..10 {
            let setup = VoleSetup::sample(field, 500, &mut rng);
            assert!(izip!(&setup.u, &setup.v, &setup.q)
                .all(|(u, v, q)| *q == field.add(*v, field.mul(*u, setup.delta))));
        }
    }

    #[test]
    fn u_is_a_bit_tape() {
        let field = FieldConfig::new(64);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label("vole bit tape test"));
        let setup = VoleSetup::sample(field, 1000, &mut rng);
        assert!(setup.u.iter().all(|ui| *ui == 0 || *ui == 1));
    }

    #[test]
    fn split_preserves_both_shares() {
        let field = FieldConfig::new(8);
        let mut rng = ChaCha20Rng::from_seed(seed_from_label("vole split test"));
        let setup = VoleSetup::sample(field, 100, &mut rng);
        let (q, delta) = (setup.q.clone(), setup.delta);
        let (prover, verifier) = setup.split();
        assert_eq!(prover.u.len(), 100);
        assert_eq!(prover.v.len(), 100);
        assert_eq!(verifier.q, q);
        assert_eq!(verifier.delta, delta);
    }

    #[test]
    fn label_seeding_is_deterministic() {
        assert_eq!(seed_from_label("a"), seed_from_label("a"));
        assert_ne!(seed_from_label("a"), seed_from_label("b"));
    }
}
