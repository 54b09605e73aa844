//! Batch Pell survey: solve every D in a range and keep one flat record per D.
//!
//! All other experiments aggregate over these records, so the survey is the
//! only place that touches the solver.

use std::fmt::Write as _;
use std::path::Path;

use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use pell_core::arith::{divisor_count, is_perfect_square, is_prime, primes_in};
use pell_core::cf::{expand_sqrt, DEFAULT_MAX_ITERATIONS};
use pell_core::pell::solve_from_cf;
use pell_core::PellError;

use crate::error::Result;
use crate::report::write_text;

/// Which D values a survey covers.
#[derive(Debug, Clone)]
pub struct SurveyConfig {
    pub lo: u64,
    pub hi: u64,
    /// Restrict to prime D.
    pub primes_only: bool,
    pub max_iterations: usize,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        SurveyConfig {
            lo: 2,
            hi: 10_000,
            primes_only: false,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// One solved D. Big integers are kept as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PellRecord {
    pub d: u64,
    pub a0: u64,
    pub period_len: usize,
    pub x0: String,
    pub y0: String,
    pub x0_mod_8: u64,
    pub y0_mod_8: u64,
    /// x^2 - D*y^2 = -1 is solvable (odd period).
    pub negative_pell: bool,
    /// ln(x0 + y0*sqrt(D)).
    pub regulator: f64,
    pub divisor_count: u64,
    pub is_prime: bool,
}

impl PellRecord {
    pub fn x0_big(&self) -> Option<BigUint> {
        self.x0.parse().ok()
    }

    /// x0 mod m, parsed from the stored decimal string.
    pub fn x0_mod(&self, m: u64) -> Option<u64> {
        if m == 0 {
            return None;
        }
        self.x0_big().and_then(|x| (x % m).to_u64())
    }
}

/// Solve a single D into a record.
pub fn solve_record(d: u64, max_iterations: usize) -> std::result::Result<PellRecord, PellError> {
    let cf = expand_sqrt(d, max_iterations)?;
    let sol = solve_from_cf(&cf)?;
    let residue = |v: &BigUint| (v % 8u32).to_u64().unwrap_or(0);

    Ok(PellRecord {
        d,
        a0: cf.a0,
        period_len: cf.period_len(),
        x0: sol.x.to_string(),
        y0: sol.y.to_string(),
        x0_mod_8: residue(&sol.x),
        y0_mod_8: residue(&sol.y),
        negative_pell: cf.period_len() % 2 == 1,
        regulator: sol.regulator(),
        divisor_count: divisor_count(d),
        is_prime: is_prime(d),
    })
}

/// The D values a config selects, in increasing order.
pub fn survey_inputs(config: &SurveyConfig) -> Vec<u64> {
    if config.primes_only {
        primes_in(config.lo, config.hi)
    } else {
        (config.lo.max(2)..=config.hi)
            .filter(|&d| !is_perfect_square(d))
            .collect()
    }
}

/// Solve every selected D in parallel. Output is sorted by D.
pub fn run_survey(config: &SurveyConfig) -> Result<Vec<PellRecord>> {
    let inputs = survey_inputs(config);
    log::info!(
        "Surveying {} values of D in [{}, {}]{}",
        inputs.len(),
        config.lo,
        config.hi,
        if config.primes_only { " (primes)" } else { "" }
    );

    let mut records: Vec<PellRecord> = inputs
        .into_par_iter()
        .map(|d| solve_record(d, config.max_iterations))
        .collect::<std::result::Result<Vec<_>, PellError>>()?;
    records.sort_by_key(|r| r.d);
    Ok(records)
}

pub const CSV_HEADER: &str =
    "d,a0,period_len,x0,y0,x0_mod_8,y0_mod_8,negative_pell,regulator,divisor_count,is_prime";

/// Render records as CSV text.
pub fn to_csv(records: &[PellRecord]) -> String {
    let mut out = String::with_capacity(64 * (records.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');
    for r in records {
        // Writing into a String cannot fail.
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{:.12},{},{}",
            r.d,
            r.a0,
            r.period_len,
            r.x0,
            r.y0,
            r.x0_mod_8,
            r.y0_mod_8,
            r.negative_pell,
            r.regulator,
            r.divisor_count,
            r.is_prime
        );
    }
    out
}

pub fn write_csv(records: &[PellRecord], path: &Path) -> Result<()> {
    write_text(path, &to_csv(records))?;
    log::info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}
