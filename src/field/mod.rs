use rand::Rng;

/// Extension degrees this crate supports, each with its irreducible polynomial
/// over GF(2) encoded as an integer (bit i = coefficient of x^i).
/// m = 8 uses the AES polynomial x^8 + x^4 + x^3 + x + 1.
const IRREDUCIBLE: [(u32, u128); 3] = [
    (3, 0b1011),
    (8, 0b1_0001_1011),
    (64, (1 << 64) | 0b1_1011),
];

/// Arithmetic over GF(2^m). Elements are integers in [0, 2^m) interpreted as
/// polynomials over GF(2) of degree < m.
///
/// Addition and subtraction are both XOR. Multiplication is carry-less
/// shift-and-add with reduction by the irreducible polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldConfig {
    m: u32,
    irr_poly: u128,
}

impl FieldConfig {
    /// Panics if `m` is not in the supported set. An unsupported degree is a
    /// misconfiguration, not a runtime condition.
    pub fn new(m: u32) -> Self {
        let irr_poly = IRREDUCIBLE
            .iter()
            .find(|(deg, _)| *deg == m)
            .unwrap_or_else(|| {
                panic!(
                    "unsupported extension degree {m}, expected one of {:?}",
                    IRREDUCIBLE.map(|(deg, _)| deg)
                )
            })
            .1;
        Self { m, irr_poly }
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    /// 2^m - 1, the order of the multiplicative group.
    pub fn multiplicative_order(&self) -> u64 {
        ((1u128 << self.m) - 1) as u64
    }

    pub fn add(&self, a: u64, b: u64) -> u64 {
        a ^ b
    }

    /// Identical to `add` in characteristic 2.
    pub fn sub(&self, a: u64, b: u64) -> u64 {
        a ^ b
    }

    pub fn mul(&self, a: u64, b: u64) -> u64 {
        let mut acc: u128 = 0;
        let mut a = a as u128;
        let mut b = b;
        while b != 0 {
            if b & 1 == 1 {
                acc ^= a;
            }
            b >>= 1;
            a <<= 1;
            if a >> self.m != 0 {
                a ^= self.irr_poly;
            }
        }
        acc as u64
    }

    /// Square-and-multiply exponentiation.
    pub fn pow(&self, a: u64, n: u64) -> u64 {
        let mut result = 1;
        let mut base = a;
        let mut n = n;
        while n != 0 {
            if n & 1 == 1 {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            n >>= 1;
        }
        result
    }

    /// Fermat inverse a^(2^m - 2). Returns 0 for a = 0.
    pub fn inv(&self, a: u64) -> u64 {
        self.pow(a, ((1u128 << self.m) - 2) as u64)
    }

    /// Decomposes `i` into `d` bits, least significant first.
    pub fn bit_dec(&self, i: u64, d: usize) -> Vec<u64> {
        (0..d).map(|j| (i >> j) & 1).collect()
    }

    /// Recomposes `d` bits (least significant first) into an integer.
    pub fn num_rec(&self, d: usize, bits: &[u64]) -> u64 {
        (0..d).map(|j| bits[j] << j).sum()
    }

    /// Uniform element of the field.
    pub fn random_element<R: Rng>(&self, rng: &mut R) -> u64 {
        if self.m == 64 {
            rng.gen()
        } else {
            rng.gen_range(0..1u64 << self.m)
        }
    }

    /// Uniform bit.
    pub fn random_bit<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(0..2)
    }

    pub fn add_vectors(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
        a.iter().zip(b.iter()).map(|(ai, bi)| ai ^ bi).collect()
    }

    pub fn mul_scalar(&self, vector: &[u64], scalar: u64) -> Vec<u64> {
        vector.iter().map(|vi| self.mul(*vi, scalar)).collect()
    }
}
