//! Integer helpers shared by every experiment: square roots, divisor
//! functions, primality and a prime sieve.

use num_bigint::BigUint;
use num_integer::Roots;
use num_traits::{ToPrimitive, Zero};

/// Floor of sqrt(n), exact for every u64.
///
/// Postcondition: `r * r <= n < (r + 1) * (r + 1)` (checked in u128).
pub fn isqrt(n: u64) -> u64 {
    let r = n.sqrt();
    debug_assert!({
        let (r, n) = (r as u128, n as u128);
        r * r <= n && n < (r + 1) * (r + 1)
    });
    r
}

pub fn is_perfect_square(n: u64) -> bool {
    let r = isqrt(n) as u128;
    r * r == n as u128
}

/// Prime factorization by trial division, as (prime, exponent) pairs in
/// ascending order. `factorize(1)` is empty.
pub fn factorize(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    if n < 2 {
        return factors;
    }

    let mut push = |p: u64, n: &mut u64| {
        let mut e = 0u32;
        while *n % p == 0 {
            *n /= p;
            e += 1;
        }
        if e > 0 {
            factors.push((p, e));
        }
    };

    push(2, &mut n);
    push(3, &mut n);
    // 6k +- 1 wheel
    let mut p = 5u64;
    while (p as u128) * (p as u128) <= n as u128 {
        push(p, &mut n);
        push(p + 2, &mut n);
        p += 6;
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

/// Number of positive divisors, tau(n). tau(0) is defined as 0.
pub fn divisor_count(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    factorize(n).iter().map(|&(_, e)| e as u64 + 1).product()
}

/// Sum of positive divisors, sigma(n). Saturates on overflow.
pub fn divisor_sum(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    factorize(n)
        .iter()
        .map(|&(p, e)| {
            // (p^(e+1) - 1) / (p - 1), accumulated as 1 + p + ... + p^e
            let mut term = 1u64;
            let mut pk = 1u64;
            for _ in 0..e {
                pk = pk.saturating_mul(p);
                term = term.saturating_add(pk);
            }
            term
        })
        .fold(1u64, |acc, t| acc.saturating_mul(t))
}

/// Moebius function mu(n); mu(0) is defined as 0.
pub fn moebius(n: u64) -> i8 {
    if n == 0 {
        return 0;
    }
    let factors = factorize(n);
    if factors.iter().any(|&(_, e)| e > 1) {
        0
    } else if factors.len() % 2 == 0 {
        1
    } else {
        -1
    }
}

fn mul_mod(a: u64, b: u64, m: u64) -> u64 {
    ((a as u128 * b as u128) % m as u128) as u64
}

fn pow_mod(mut base: u64, mut exp: u64, m: u64) -> u64 {
    let mut result = 1u64 % m;
    base %= m;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, m);
        }
        base = mul_mod(base, base, m);
        exp >>= 1;
    }
    result
}

/// Deterministic Miller-Rabin, correct for every u64.
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in &WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut r = 0u32;
    while d % 2 == 0 {
        d /= 2;
        r += 1;
    }

    'witness: for &a in &WITNESSES {
        let mut x = pow_mod(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// All primes p with lo <= p <= hi (sieve of Eratosthenes).
pub fn primes_in(lo: u64, hi: u64) -> Vec<u64> {
    if hi < 2 || lo > hi {
        return Vec::new();
    }
    let limit = hi as usize;
    let mut composite = vec![false; limit + 1];
    let mut i = 2usize;
    while i * i <= limit {
        if !composite[i] {
            let mut j = i * i;
            while j <= limit {
                composite[j] = true;
                j += i;
            }
        }
        i += 1;
    }
    (lo.max(2) as usize..=limit)
        .filter(|&k| !composite[k])
        .map(|k| k as u64)
        .collect()
}

/// Natural logarithm of a BigUint, valid beyond the f64 range.
///
/// Keeps the top 64 bits and adds the dropped bit count times ln 2.
pub fn ln_big(n: &BigUint) -> f64 {
    if n.is_zero() {
        return f64::NEG_INFINITY;
    }
    let bits = n.bits();
    if bits <= 64 {
        return n.to_u64().map_or(f64::NAN, |v| (v as f64).ln());
    }
    let shift = bits - 64;
    let top = (n >> shift).to_u64().unwrap_or(u64::MAX);
    (top as f64).ln() + shift as f64 * std::f64::consts::LN_2
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_isqrt_exact_near_squares() {
        for r in [0u64, 1, 2, 3, 10, 255, 65535, 4_294_967_295] {
            let sq = r * r;
            assert_eq!(isqrt(sq), r);
            if sq > 0 {
                assert_eq!(isqrt(sq - 1), r - 1);
            }
            // 0 + 1 is itself a square.
            if r > 0 {
                assert_eq!(isqrt(sq + 1), r);
            }
        }
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn test_perfect_squares() {
        assert!(is_perfect_square(0));
        assert!(is_perfect_square(16));
        assert!(!is_perfect_square(17));
        assert!(is_perfect_square(u64::MAX - 2 * u32::MAX as u64));
        assert!(!is_perfect_square(u64::MAX));
    }

    #[test]
    fn test_divisor_functions() {
        assert_eq!(divisor_count(1), 1);
        assert_eq!(divisor_count(12), 6);
        assert_eq!(divisor_count(97), 2);
        assert_eq!(divisor_count(360), 24);
        assert_eq!(divisor_sum(1), 1);
        assert_eq!(divisor_sum(12), 28);
        assert_eq!(divisor_sum(28), 56);
        assert_eq!(moebius(1), 1);
        assert_eq!(moebius(6), 1);
        assert_eq!(moebius(30), -1);
        assert_eq!(moebius(12), 0);
    }

    #[test]
    fn test_factorize() {
        assert_eq!(factorize(1), vec![]);
        assert_eq!(factorize(360), vec![(2, 3), (3, 2), (5, 1)]);
        assert_eq!(factorize(1_000_003), vec![(1_000_003, 1)]);
        assert_eq!(factorize(77), vec![(7, 1), (11, 1)]);
    }

    #[test]
    fn test_is_prime_matches_sieve() {
        let sieve = primes_in(0, 2000);
        for n in 0..=2000u64 {
            assert_eq!(is_prime(n), sieve.contains(&n), "n = {}", n);
        }
        assert!(is_prime(18_446_744_073_709_551_557));
        assert!(!is_prime(3_215_031_751)); // strong pseudoprime to 2, 3, 5, 7
    }

    #[test]
    fn test_primes_in_range() {
        assert_eq!(primes_in(10, 30), vec![11, 13, 17, 19, 23, 29]);
        assert!(primes_in(30, 10).is_empty());
        assert_eq!(primes_in(0, 2), vec![2]);
    }

    #[test]
    fn test_ln_big() {
        assert!((ln_big(&BigUint::from(1000u32)) - 1000f64.ln()).abs() < 1e-12);
        let huge = BigUint::one() << 2000u32;
        let expected = 2000.0 * std::f64::consts::LN_2;
        assert!((ln_big(&huge) - expected).abs() < 1e-9);
    }
}
