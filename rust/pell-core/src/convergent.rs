//! Convergents p_k/q_k of a periodic continued fraction.
//!
//! ```text
//! p_{-1} = 1, p_0 = a_0,   p_k = a_k * p_{k-1} + p_{k-2}
//! q_{-1} = 0, q_0 = 1,     q_k = a_k * q_{k-1} + q_{k-2}
//! ```
//! For sqrt(D) these satisfy p_k^2 - D*q_k^2 = (-1)^(k+1) * d_{k+1}, so the
//! convergent closing a period has norm +-1.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

use crate::cf::ContinuedFraction;

/// The k-th convergent p/q.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Convergent {
    pub index: usize,
    pub p: BigUint,
    pub q: BigUint,
}

impl Convergent {
    /// p^2 - D*q^2.
    pub fn norm(&self, d: u64) -> BigInt {
        let p = BigInt::from(self.p.clone());
        let q = BigInt::from(self.q.clone());
        &p * &p - BigInt::from(d) * &q * &q
    }
}

/// Lazy convergent sequence over a0 and a cyclic period.
///
/// Only the last two convergents are held. Cloning snapshots the position;
/// [`Convergents::new`] starts over from k = 0.
#[derive(Debug, Clone)]
pub struct Convergents {
    a0: u64,
    period: Vec<u64>,
    p_prev2: BigUint,
    p_prev1: BigUint,
    q_prev2: BigUint,
    q_prev1: BigUint,
    next_index: usize,
}

impl Convergents {
    /// `period` may be empty, in which case the sequence stops after k = 0.
    pub fn new(a0: u64, period: &[u64]) -> Self {
        Convergents {
            a0,
            period: period.to_vec(),
            p_prev2: BigUint::zero(),
            p_prev1: BigUint::one(),
            q_prev2: BigUint::one(),
            q_prev1: BigUint::zero(),
            next_index: 0,
        }
    }

    pub fn of(cf: &ContinuedFraction) -> Self {
        Self::new(cf.a0, &cf.period)
    }

    fn quotient(&self, k: usize) -> Option<u64> {
        if k == 0 {
            Some(self.a0)
        } else if self.period.is_empty() {
            None
        } else {
            Some(self.period[(k - 1) % self.period.len()])
        }
    }
}

impl Iterator for Convergents {
    type Item = Convergent;

    fn next(&mut self) -> Option<Convergent> {
        let k = self.next_index;
        let a = BigUint::from(self.quotient(k)?);

        // State holds (p_{k-2}, p_{k-1}); at k = 0 that is (0, 1) so the
        // recurrence yields p_0 = a0 with the seed p_{-1} = 1 in place.
        let p = &a * &self.p_prev1 + &self.p_prev2;
        let q = &a * &self.q_prev1 + &self.q_prev2;

        self.p_prev2 = std::mem::replace(&mut self.p_prev1, p.clone());
        self.q_prev2 = std::mem::replace(&mut self.q_prev1, q.clone());
        self.next_index += 1;

        Some(Convergent { index: k, p, q })
    }
}

/// The k-th convergent of `cf`, computed from scratch.
///
/// None only when `cf` was built by hand with an empty period and k > 0.
pub fn convergent(cf: &ContinuedFraction, k: usize) -> Option<Convergent> {
    Convergents::of(cf).nth(k)
}

/// Recover a_0, a_1, ... from consecutive convergents starting at k = 0.
///
/// Uses a_0 = p_0 / q_0 and a_k = (p_k - p_{k-2}) / p_{k-1}.
pub fn quotients_from_convergents(convergents: &[Convergent]) -> Vec<BigUint> {
    let mut out = Vec::with_capacity(convergents.len());
    let mut p_prev2 = BigUint::zero();
    let mut p_prev1 = BigUint::one();
    for c in convergents {
        let a = if out.is_empty() {
            &c.p / &c.q
        } else {
            (&c.p - &p_prev2) / &p_prev1
        };
        out.push(a);
        p_prev2 = std::mem::replace(&mut p_prev1, c.p.clone());
    }
    out
}
