//! Staged primality test for Mersenne numbers.
//!
//! Cheap filters run first and short-circuit on a definitive "composite";
//! only survivors reach the Lucas-Lehmer test, which is the sole stage
//! authoritative for primality of `M_p` itself.

use crate::arith::Arithmetic;
use crate::cancel::CancelToken;
use tracing::info;

/// Outcome of checking one exponent, tagged with the deciding stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// `M_p` is prime (p == 2 shortcut or Lucas-Lehmer).
    Prime,
    /// `p` itself is composite, so `M_p` cannot be prime.
    CompositeExponent,
    /// A proper factor `q` of `M_p` was found without computing the full test.
    KnownFactor(u64),
    /// Lucas-Lehmer completed with a nonzero residue.
    Composite,
}

impl Verdict {
    pub fn is_prime(&self) -> bool {
        matches!(self, Verdict::Prime)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Prime => write!(f, "prime"),
            Verdict::CompositeExponent => write!(f, "composite exponent"),
            Verdict::KnownFactor(q) => write!(f, "factor {q}"),
            Verdict::Composite => write!(f, "nonzero Lucas-Lehmer residue"),
        }
    }
}

/// Upper bound (exclusive) on `k` for trial factors `q = 2pk + 1`.
///
/// Dividing twice keeps `2p` from ever being formed, so the bound cannot
/// wrap for exponents near `u64::MAX`.
pub(crate) fn trial_division_bound(p: u64) -> u64 {
    if p == 0 {
        return 0;
    }
    (p / 2).min(u64::MAX / p / 2)
}

/// The compound test. Generic over the big-integer backend so control flow
/// can be exercised with a small-integer fake.
#[derive(Debug, Clone)]
pub struct Pipeline<A: Arithmetic> {
    arith: A,
    mr_rounds: u32,
}

impl<A: Arithmetic> Pipeline<A> {
    pub fn new(arith: A, mr_rounds: u32) -> Self {
        Self { arith, mr_rounds }
    }

    /// Decide whether `M_p = 2^p - 1` is prime.
    pub fn check(&self, p: u64) -> Verdict {
        self.check_with_cancel(p, &CancelToken::new())
            .expect("fresh token is never cancelled")
    }

    /// Like [`check`](Self::check), but the Lucas-Lehmer loop polls `cancel`
    /// between iterations. Returns `None` if the check was abandoned.
    pub fn check_with_cancel(&self, p: u64, cancel: &CancelToken) -> Option<Verdict> {
        // M_2 = 3 is prime; the general recurrence starts at p = 3.
        if p == 2 {
            return Some(Verdict::Prime);
        }

        // M_p can only be prime if p is. This also rejects p < 2.
        let pn = self.arith.nat(p);
        if !self.arith.is_probable_prime(&pn, self.mr_rounds) {
            return Some(Verdict::CompositeExponent);
        }

        if let Some(q) = self.algebraic_factor(p) {
            return Some(Verdict::KnownFactor(q));
        }

        if let Some(q) = self.small_factor(p) {
            return Some(Verdict::KnownFactor(q));
        }

        info!("Lucas-Lehmer required for M{p}");
        let prime = self.lucas_lehmer(p, cancel)?;
        Some(if prime { Verdict::Prime } else { Verdict::Composite })
    }

    /// Algebraic filter: for p > 3 with p ≡ 3 (mod 4), if q = 2p + 1 is prime
    /// then q divides M_p exactly when q is a factor; a single divisibility
    /// check eliminates the candidate.
    pub fn algebraic_factor(&self, p: u64) -> Option<u64> {
        if p <= 3 || p % 4 != 3 {
            return None;
        }
        // Skip the filter when 2p + 1 is not representable.
        let q = p.checked_mul(2)?.checked_add(1)?;

        let qn = self.arith.nat(q);
        if !self.arith.is_probable_prime(&qn, self.mr_rounds) {
            return None;
        }
        let m = self.arith.mersenne(p);
        if self.arith.divisible(&m, &qn) {
            Some(q)
        } else {
            None
        }
    }

    /// Trial-division sieve over candidate factors q = 2pk + 1.
    ///
    /// Any factor of a Mersenne number satisfies q ≡ ±1 (mod 8); multiples
    /// of 3, 5, 7 are skipped as trivially composite.
    pub fn small_factor(&self, p: u64) -> Option<u64> {
        let m = self.arith.mersenne(p);
        for k in 1..trial_division_bound(p) {
            // in range by construction of the bound
            let q = 2 * p * k + 1;
            if q % 8 != 1 && q % 8 != 7 {
                continue;
            }
            if q % 3 == 0 || q % 5 == 0 || q % 7 == 0 {
                continue;
            }
            if self.arith.divisible_u64(&m, q) {
                return Some(q);
            }
        }
        None
    }

    /// Lucas-Lehmer: V_1 = 4, V_{k+1} = (V_k² - 2) mod M_p; M_p is prime iff
    /// the final value is 0.
    ///
    /// Reduction modulo M_p splits the square into its low p bits plus the
    /// high quotient and folds them together, then subtracts M_p while the
    /// result still exceeds it. No general division is performed.
    fn lucas_lehmer(&self, p: u64, cancel: &CancelToken) -> Option<bool> {
        let m = self.arith.mersenne(p);
        let two = self.arith.nat(2);
        let mut v = self.arith.nat(4);

        for _ in 3..=p {
            if cancel.is_cancelled() {
                return None;
            }

            let sq = self.arith.square(&v);
            // V ∈ {0, 1} would underflow the unsigned subtraction; the
            // residue of V² - 2 is then V² + M_p - 2.
            let sq = if sq < two {
                self.arith.sub_u64(self.arith.add(sq, &m), 2)
            } else {
                self.arith.sub_u64(sq, 2)
            };

            let low = self.arith.low_bits(&sq, p);
            let mut folded = self.arith.add(self.arith.shift_right(&sq, p), &low);
            while folded >= m {
                folded = self.arith.sub(folded, &m);
            }
            v = folded;
        }

        Some(self.arith.is_zero(&v))
    }
}
