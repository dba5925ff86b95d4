//! Opaque big-integer capability used by the primality pipeline.
//!
//! The pipeline only needs a handful of operations, so they are collected
//! behind [`Arithmetic`] and the production backend delegates to
//! `num-bigint`. Tests can drive the pipeline's control logic with a
//! small-integer backend instead.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};

/// Arbitrary-precision operations required by the pipeline.
///
/// `Nat` is an unsigned natural number. `sub` and `sub_u64` require the
/// result to be non-negative; the pipeline maintains that invariant.
pub trait Arithmetic {
    type Nat: Clone + Ord;

    fn nat(&self, n: u64) -> Self::Nat;

    /// The Mersenne number `2^p - 1`.
    fn mersenne(&self, p: u64) -> Self::Nat;

    fn add(&self, a: Self::Nat, b: &Self::Nat) -> Self::Nat;
    fn sub(&self, a: Self::Nat, b: &Self::Nat) -> Self::Nat;
    fn sub_u64(&self, a: Self::Nat, k: u64) -> Self::Nat;
    fn square(&self, a: &Self::Nat) -> Self::Nat;

    /// `a mod 2^bits`.
    fn low_bits(&self, a: &Self::Nat, bits: u64) -> Self::Nat;

    /// `a div 2^bits`.
    fn shift_right(&self, a: &Self::Nat, bits: u64) -> Self::Nat;

    fn is_zero(&self, a: &Self::Nat) -> bool;

    /// Miller-Rabin with the given round count. A `true` result means
    /// "probably prime" and is only ever used as a filter, never as the
    /// final verdict for a Mersenne number.
    fn is_probable_prime(&self, a: &Self::Nat, rounds: u32) -> bool;

    fn divisible(&self, a: &Self::Nat, q: &Self::Nat) -> bool;
    fn divisible_u64(&self, a: &Self::Nat, q: u64) -> bool;
}

/// Production backend on `num_bigint::BigUint`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BigIntBackend;

impl Arithmetic for BigIntBackend {
    type Nat = BigUint;

    fn nat(&self, n: u64) -> BigUint {
        BigUint::from(n)
    }

    fn mersenne(&self, p: u64) -> BigUint {
        (BigUint::one() << p) - 1u32
    }

    fn add(&self, a: BigUint, b: &BigUint) -> BigUint {
        a + b
    }

    fn sub(&self, a: BigUint, b: &BigUint) -> BigUint {
        a - b
    }

    fn sub_u64(&self, a: BigUint, k: u64) -> BigUint {
        a - k
    }

    fn square(&self, a: &BigUint) -> BigUint {
        a * a
    }

    fn low_bits(&self, a: &BigUint, bits: u64) -> BigUint {
        let mask = (BigUint::one() << bits) - 1u32;
        a & &mask
    }

    fn shift_right(&self, a: &BigUint, bits: u64) -> BigUint {
        a >> bits
    }

    fn is_zero(&self, a: &BigUint) -> bool {
        a.is_zero()
    }

    fn is_probable_prime(&self, a: &BigUint, rounds: u32) -> bool {
        miller_rabin(a, rounds)
    }

    fn divisible(&self, a: &BigUint, q: &BigUint) -> bool {
        (a % q).is_zero()
    }

    fn divisible_u64(&self, a: &BigUint, q: u64) -> bool {
        (a % q).is_zero()
    }
}

/// Miller-Rabin probable-prime test with random bases.
///
/// Error probability is at most 4^-rounds for composite `n`.
fn miller_rabin(n: &BigUint, rounds: u32) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if (n % 2u32).is_zero() {
        return false;
    }

    // n - 1 = d * 2^s with d odd
    let n_minus_one = n - &one;
    let s = n_minus_one
        .trailing_zeros()
        .expect("n - 1 is nonzero for n > 1");
    let d = &n_minus_one >> s;

    let mut rng = rand::thread_rng();

    'rounds: for _ in 0..rounds {
        // base in [2, n - 2]
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x == one || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'rounds;
            }
        }
        return false;
    }

    true
}
