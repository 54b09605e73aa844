//! Continued fraction expansion of sqrt(D).
//!
//! For non-square D the expansion is periodic:
//!   sqrt(D) = [a_0; a_1, a_2, ..., a_n, a_1, a_2, ...]
//! where the block [a_1, ..., a_n] repeats and a_n = 2*a_0.
//!
//! The expansion is driven by the integer state (m, d, a):
//! ```text
//! (m_0, d_0, a_0) = (0, 1, floor(sqrt(D)))
//! m_{k+1} = d_k * a_k - m_k
//! d_{k+1} = (D - m_{k+1}^2) / d_k
//! a_{k+1} = floor((a_0 + m_{k+1}) / d_{k+1})
//! ```
//! The first (m, d) pair that repeats closes one minimal period.

use std::collections::HashMap;
use std::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;

use crate::arith::isqrt;
use crate::error::{PellError, Result};

/// Iteration bound used by [`expand_sqrt_default`]. Periods of sqrt(D) are
/// O(sqrt(D) log D), so this covers every D the experiments touch.
pub const DEFAULT_MAX_ITERATIONS: usize = 1_000_000;

/// Periodic continued fraction of sqrt(D).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContinuedFraction {
    /// The radicand.
    pub d: u64,
    /// floor(sqrt(D)).
    pub a0: u64,
    /// One minimal period [a_1, ..., a_n]; the last entry is 2*a0.
    pub period: Vec<u64>,
}

impl ContinuedFraction {
    pub fn period_len(&self) -> usize {
        self.period.len()
    }

    /// Partial quotient a_k; indices past the period wrap around it.
    pub fn quotient(&self, k: usize) -> u64 {
        if k == 0 {
            self.a0
        } else {
            self.period[(k - 1) % self.period.len()]
        }
    }
}

impl fmt::Display for ContinuedFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body: Vec<String> = self.period.iter().map(|a| a.to_string()).collect();
        write!(f, "[{}; {}]", self.a0, body.join(", "))
    }
}

/// Reject D < 2 and perfect squares, returning floor(sqrt(D)) otherwise.
pub(crate) fn check_domain(d: u64) -> Result<u64> {
    if d < 2 {
        return Err(PellError::InvalidDomain {
            d,
            reason: "D must be at least 2",
        });
    }
    let a0 = isqrt(d);
    let (a0w, dw) = (a0 as u128, d as u128);
    if !(a0w * a0w <= dw && dw < (a0w + 1) * (a0w + 1)) {
        // isqrt is exact; a miss here means the integer square root is broken.
        return Err(PellError::InvalidDomain {
            d,
            reason: "integer square root out of bounds",
        });
    }
    if a0w * a0w == dw {
        return Err(PellError::InvalidDomain {
            d,
            reason: "D is a perfect square",
        });
    }
    Ok(a0)
}

/// Expand sqrt(D) until its (m, d) state repeats.
///
/// Fails with [`PellError::InvalidDomain`] for D < 2 or perfect squares and
/// with [`PellError::PeriodNotFound`] if no state repeats within
/// `max_iterations` steps.
pub fn expand_sqrt(d: u64, max_iterations: usize) -> Result<ContinuedFraction> {
    let a0 = check_domain(d)?;

    let radicand = d as u128;
    let root = a0 as u128;

    let mut seen: HashMap<(u128, u128), usize> = HashMap::new();
    let mut quotients: Vec<u64> = Vec::new();

    let (mut m, mut den, mut a) = (0u128, 1u128, root);

    for _ in 0..max_iterations {
        m = den * a - m;
        den = (radicand - m * m) / den;
        a = (root + m) / den;

        if let Some(&first) = seen.get(&(m, den)) {
            let period = quotients[first..].to_vec();
            log::trace!("sqrt({}) period length {}", d, period.len());
            return Ok(ContinuedFraction { d, a0, period });
        }
        seen.insert((m, den), quotients.len());
        // a <= 2*a0 < 2^33, always fits.
        quotients.push(a as u64);
    }

    Err(PellError::PeriodNotFound { d, max_iterations })
}

/// [`expand_sqrt`] with [`DEFAULT_MAX_ITERATIONS`].
pub fn expand_sqrt_default(d: u64) -> Result<ContinuedFraction> {
    expand_sqrt(d, DEFAULT_MAX_ITERATIONS)
}

/// Continued fraction digits of the rational p/q via the Euclidean algorithm.
///
/// The last digit is greater than 1 unless the expansion has a single term.
pub fn rational_digits(p: &BigUint, q: &BigUint) -> Vec<BigUint> {
    let mut digits = Vec::new();
    let (mut num, mut den) = (p.clone(), q.clone());
    while !den.is_zero() {
        let (quot, rem) = num.div_rem(&den);
        digits.push(quot);
        num = den;
        den = rem;
    }
    digits
}

/// Recover the minimal period of sqrt(D) from a stream of partial quotients
/// a_1, a_2, ... (a_0 excluded).
///
/// Returns the shortest block that ends in 2*a0 and repeats across the whole
/// stream, or None if the stream contains no such block.
pub fn minimal_period(a0: u64, tail: &[u64]) -> Option<Vec<u64>> {
    let closing = 2 * a0;
    (1..=tail.len())
        .filter(|&len| tail[len - 1] == closing)
        .find(|&len| (len..tail.len()).all(|i| tail[i] == tail[i - len]))
        .map(|len| tail[..len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cf_sqrt2() {
        let cf = expand_sqrt(2, 100).unwrap();
        assert_eq!(cf.a0, 1);
        assert_eq!(cf.period, vec![2]);
    }

    #[test]
    fn test_cf_sqrt7() {
        // sqrt(7) = [2; 1, 1, 1, 4]
        let cf = expand_sqrt(7, 100).unwrap();
        assert_eq!(cf.a0, 2);
        assert_eq!(cf.period, vec![1, 1, 1, 4]);
        assert_eq!(cf.quotient(0), 2);
        assert_eq!(cf.quotient(4), 4);
        assert_eq!(cf.quotient(5), 1);
        assert_eq!(cf.quotient(8), 4);
    }

    #[test]
    fn test_cf_sqrt13() {
        let cf = expand_sqrt(13, 100).unwrap();
        assert_eq!(cf.a0, 3);
        assert_eq!(cf.period, vec![1, 1, 1, 1, 6]);
    }

    #[test]
    fn test_cf_sqrt89() {
        let cf = expand_sqrt(89, 100).unwrap();
        assert_eq!(cf.a0, 9);
        assert_eq!(cf.period, vec![2, 3, 3, 2, 18]);
        assert_eq!(cf.to_string(), "[9; 2, 3, 3, 2, 18]");
    }

    #[test]
    fn test_period_ends_in_twice_a0() {
        for d in 2..2000u64 {
            if crate::arith::is_perfect_square(d) {
                continue;
            }
            let cf = expand_sqrt(d, 10_000).unwrap();
            assert_eq!(*cf.period.last().unwrap(), 2 * cf.a0, "D = {}", d);
            // The body a_1..a_{n-1} is a palindrome.
            let body = &cf.period[..cf.period.len() - 1];
            let reversed: Vec<u64> = body.iter().rev().copied().collect();
            assert_eq!(body, &reversed[..], "D = {}", d);
        }
    }

    #[test]
    fn test_invalid_domain() {
        for d in [0u64, 1, 4, 16, 144, 10_000] {
            assert!(
                matches!(expand_sqrt(d, 100), Err(PellError::InvalidDomain { .. })),
                "D = {}",
                d
            );
        }
    }

    #[test]
    fn test_iteration_bound() {
        // sqrt(94) has period 16.
        assert_eq!(
            expand_sqrt(94, 5),
            Err(PellError::PeriodNotFound {
                d: 94,
                max_iterations: 5
            })
        );
        assert_eq!(expand_sqrt(94, 17).unwrap().period_len(), 16);
        assert!(expand_sqrt(2, 0).is_err());
    }

    #[test]
    fn test_large_radicand() {
        // D = 2^62 + 1: a0 = 2^31, period [2^32]
        let d = (1u64 << 62) + 1;
        let cf = expand_sqrt(d, 100).unwrap();
        assert_eq!(cf.a0, 1 << 31);
        assert_eq!(cf.period, vec![1 << 32]);
    }

    #[test]
    fn test_rational_digits() {
        let digits = rational_digits(&BigUint::from(415u32), &BigUint::from(93u32));
        let expected: Vec<BigUint> = [4u32, 2, 6, 7].iter().map(|&x| BigUint::from(x)).collect();
        assert_eq!(digits, expected);
    }

    #[test]
    fn test_minimal_period() {
        // [2, 3, 3, 2, 18] repeated with a partial third copy
        let tail = [2, 3, 3, 2, 18, 2, 3, 3, 2, 18, 2, 3];
        assert_eq!(minimal_period(9, &tail), Some(vec![2, 3, 3, 2, 18]));
        assert_eq!(minimal_period(1, &[2, 2, 2]), Some(vec![2]));
        assert_eq!(minimal_period(9, &[2, 3, 3]), None);
    }
}
