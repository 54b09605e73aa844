//! Dirichlet-series analogues of the Riemann zeta function.
//!
//! For an arithmetic function f the series sum_{n>=1} f(n) n^{-s} has a
//! closed form in terms of zeta for the classical choices:
//! ```text
//! f = 1        ->  zeta(s)
//! f = tau      ->  zeta(s)^2
//! f = sigma    ->  zeta(s) * zeta(s - 1)     (s > 2)
//! f = mu       ->  1 / zeta(s)
//! ```
//! Truncated sums are compared against these, and the summatory function
//! sum_{k<=n} f(k) is fitted to a power law k^alpha to get a per-n exponent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use pell_core::arith::{divisor_count, divisor_sum, isqrt, moebius};

use crate::correlate::linear_fit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ArithmeticFunction {
    One,
    DivisorCount,
    DivisorSum,
    Moebius,
}

impl ArithmeticFunction {
    pub const ALL: [ArithmeticFunction; 4] = [
        ArithmeticFunction::One,
        ArithmeticFunction::DivisorCount,
        ArithmeticFunction::DivisorSum,
        ArithmeticFunction::Moebius,
    ];

    pub fn eval(self, n: u64) -> f64 {
        match self {
            ArithmeticFunction::One => 1.0,
            ArithmeticFunction::DivisorCount => divisor_count(n) as f64,
            ArithmeticFunction::DivisorSum => divisor_sum(n) as f64,
            ArithmeticFunction::Moebius => moebius(n) as f64,
        }
    }

    /// Abscissa of absolute convergence of the Dirichlet series.
    pub fn abscissa(self) -> f64 {
        match self {
            ArithmeticFunction::DivisorSum => 2.0,
            _ => 1.0,
        }
    }

    /// Exact value of the full series at s, when s is past the abscissa.
    pub fn closed_form(self, s: f64) -> Option<f64> {
        if s <= self.abscissa() {
            return None;
        }
        let z = zeta(s)?;
        match self {
            ArithmeticFunction::One => Some(z),
            ArithmeticFunction::DivisorCount => Some(z * z),
            ArithmeticFunction::DivisorSum => zeta(s - 1.0).map(|z1| z * z1),
            ArithmeticFunction::Moebius => Some(1.0 / z),
        }
    }
}

impl fmt::Display for ArithmeticFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArithmeticFunction::One => "one",
            ArithmeticFunction::DivisorCount => "tau",
            ArithmeticFunction::DivisorSum => "sigma",
            ArithmeticFunction::Moebius => "mu",
        };
        f.write_str(name)
    }
}

impl FromStr for ArithmeticFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "one" | "1" | "zeta" => Ok(ArithmeticFunction::One),
            "tau" | "d" | "divisor-count" => Ok(ArithmeticFunction::DivisorCount),
            "sigma" | "divisor-sum" => Ok(ArithmeticFunction::DivisorSum),
            "mu" | "moebius" | "mobius" => Ok(ArithmeticFunction::Moebius),
            other => Err(format!("unknown arithmetic function '{}'", other)),
        }
    }
}

/// Riemann zeta for real s > 1 by Euler-Maclaurin summation.
///
/// Ten direct terms plus five Bernoulli corrections give ~1e-13 accuracy
/// for s >= 1.1.
pub fn zeta(s: f64) -> Option<f64> {
    // B_2, B_4, ..., B_10
    const BERNOULLI: [f64; 5] = [1.0 / 6.0, -1.0 / 30.0, 1.0 / 42.0, -1.0 / 30.0, 5.0 / 66.0];
    const N: f64 = 10.0;

    if !(s > 1.0) {
        return None;
    }

    let mut total: f64 = (1..10).map(|n| (n as f64).powf(-s)).sum();
    total += N.powf(1.0 - s) / (s - 1.0);
    total += 0.5 * N.powf(-s);

    // B_{2k}/(2k)! * s(s+1)...(s+2k-2) * N^{-s-2k+1}
    let mut rising = s;
    let mut factorial = 2.0;
    for (k, b) in BERNOULLI.iter().enumerate() {
        let two_k = 2 * (k + 1);
        if k > 0 {
            rising *= (s + two_k as f64 - 3.0) * (s + two_k as f64 - 2.0);
            factorial *= ((two_k - 1) * two_k) as f64;
        }
        total += b / factorial * rising * N.powf(-s - two_k as f64 + 1.0);
    }
    Some(total)
}

/// sum_{k=1}^{terms} f(k) k^{-s}
pub fn partial_sum(f: ArithmeticFunction, s: f64, terms: u64) -> f64 {
    (1..=terms).map(|k| f.eval(k) * (k as f64).powf(-s)).sum()
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesRow {
    pub function: ArithmeticFunction,
    pub s: f64,
    pub terms: u64,
    pub partial: f64,
    pub closed_form: Option<f64>,
    pub relative_error: Option<f64>,
}

/// Truncated series against closed forms for every (f, s) pair.
pub fn series_table(functions: &[ArithmeticFunction], exponents: &[f64], terms: u64) -> Vec<SeriesRow> {
    let mut rows = Vec::with_capacity(functions.len() * exponents.len());
    for &function in functions {
        for &s in exponents {
            let partial = partial_sum(function, s, terms);
            let closed_form = function.closed_form(s);
            let relative_error = closed_form.map(|c| ((partial - c) / c).abs());
            rows.push(SeriesRow {
                function,
                s,
                terms,
                partial,
                closed_form,
                relative_error,
            });
        }
    }
    rows
}

pub fn print_series_table(rows: &[SeriesRow]) {
    println!(
        "  {:<6} {:>6} {:>9} {:>18} {:>18} {:>12}",
        "f", "s", "terms", "partial", "closed form", "rel. error"
    );
    for r in rows {
        let closed = r
            .closed_form
            .map_or_else(|| "diverges".to_string(), |c| format!("{:.12}", c));
        let err = r
            .relative_error
            .map_or_else(|| "-".to_string(), |e| format!("{:.3e}", e));
        println!(
            "  {:<6} {:>6.2} {:>9} {:>18.12} {:>18} {:>12}",
            r.function.to_string(),
            r.s,
            r.terms,
            r.partial,
            closed,
            err
        );
    }
}

/// Power-law fit |sum_{k<=x} f(k)| ~ C x^exponent over x in [sqrt(n), n].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExponentFit {
    pub function: ArithmeticFunction,
    pub n: u64,
    pub exponent: f64,
    /// ln C
    pub intercept: f64,
    pub r_squared: f64,
    /// Sample points used (zeros of the summatory function are skipped).
    pub points: usize,
}

const FIT_SAMPLES: usize = 64;

/// Fit the growth exponent of the summatory function of f up to n.
///
/// Points are spaced geometrically between sqrt(n) and n. Returns None when
/// fewer than two nonzero sample points remain (n < 4, or a function whose
/// summatory values vanish at every sample).
pub fn growth_exponent(f: ArithmeticFunction, n: u64) -> Option<ExponentFit> {
    if n < 4 {
        return None;
    }
    let k_min = isqrt(n).max(2);
    let ratio = n as f64 / k_min as f64;

    let mut sample_at: Vec<u64> = (0..FIT_SAMPLES)
        .map(|i| {
            let t = i as f64 / (FIT_SAMPLES - 1) as f64;
            ((k_min as f64 * ratio.powf(t)).round() as u64).clamp(k_min, n)
        })
        .collect();
    sample_at.sort_unstable();
    sample_at.dedup();

    let (mut xs, mut ys) = (Vec::new(), Vec::new());
    let mut running = 0.0f64;
    let mut next = sample_at.iter().peekable();
    for k in 1..=n {
        running += f.eval(k);
        if next.peek() == Some(&&k) {
            next.next();
            if running != 0.0 {
                xs.push((k as f64).ln());
                ys.push(running.abs().ln());
            }
        }
    }

    let fit = linear_fit(&xs, &ys)?;
    Some(ExponentFit {
        function: f,
        n,
        exponent: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
        points: xs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_zeta_known_values() {
        assert!((zeta(2.0).unwrap() - PI * PI / 6.0).abs() < 1e-12);
        assert!((zeta(4.0).unwrap() - PI.powi(4) / 90.0).abs() < 1e-12);
        assert!((zeta(1.5).unwrap() - 2.612_375_348_685_488).abs() < 1e-11);
        assert!((zeta(1.1).unwrap() - 10.584_448_464_950_81).abs() < 1e-9);
        assert_eq!(zeta(1.0), None);
        assert_eq!(zeta(0.5), None);
    }

    #[test]
    fn test_partial_sums_approach_closed_forms() {
        let rows = series_table(
            &[ArithmeticFunction::One, ArithmeticFunction::DivisorCount],
            &[3.0],
            20_000,
        );
        for r in &rows {
            assert!(r.relative_error.unwrap() < 1e-6, "{:?}", r);
        }

        let mu = partial_sum(ArithmeticFunction::Moebius, 2.0, 50_000);
        assert!((mu - 6.0 / (PI * PI)).abs() < 1e-3);

        let sigma = partial_sum(ArithmeticFunction::DivisorSum, 4.0, 20_000);
        let expected = ArithmeticFunction::DivisorSum.closed_form(4.0).unwrap();
        assert!(((sigma - expected) / expected).abs() < 1e-6);
    }

    #[test]
    fn test_closed_form_domain() {
        assert_eq!(ArithmeticFunction::DivisorSum.closed_form(2.0), None);
        assert!(ArithmeticFunction::DivisorSum.closed_form(2.5).is_some());
        assert_eq!(ArithmeticFunction::One.closed_form(1.0), None);
    }

    #[test]
    fn test_growth_exponents() {
        let one = growth_exponent(ArithmeticFunction::One, 10_000).unwrap();
        assert!((one.exponent - 1.0).abs() < 1e-9);
        assert!((one.r_squared - 1.0).abs() < 1e-9);

        // tau: k ln k dominates, so the local exponent sits a little above 1.
        let tau = growth_exponent(ArithmeticFunction::DivisorCount, 10_000).unwrap();
        assert!(tau.exponent > 1.05 && tau.exponent < 1.25, "{:?}", tau);

        let sigma = growth_exponent(ArithmeticFunction::DivisorSum, 10_000).unwrap();
        assert!((sigma.exponent - 2.0).abs() < 0.01, "{:?}", sigma);

        // Mertens function: well below sqrt growth at this range.
        let mu = growth_exponent(ArithmeticFunction::Moebius, 10_000).unwrap();
        assert!(mu.exponent < 0.6, "{:?}", mu);

        assert_eq!(growth_exponent(ArithmeticFunction::One, 3), None);
    }

    #[test]
    fn test_parse_and_display() {
        for f in ArithmeticFunction::ALL {
            assert_eq!(f.to_string().parse::<ArithmeticFunction>(), Ok(f));
        }
        assert!("zeta2".parse::<ArithmeticFunction>().is_err());
    }
}
