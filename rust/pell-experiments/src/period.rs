//! Period-length statistics of sqrt(D) expansions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::survey::PellRecord;

/// hits out of total, with the share precomputed for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Share {
    pub hits: usize,
    pub total: usize,
    pub share: f64,
}

impl Share {
    fn tally<I: IntoIterator<Item = bool>>(flags: I) -> Self {
        let (mut hits, mut total) = (0usize, 0usize);
        for f in flags {
            total += 1;
            hits += f as usize;
        }
        let share = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Share { hits, total, share }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub samples: usize,
    /// period length -> number of D
    pub histogram: BTreeMap<usize, usize>,
    /// Share of odd periods (negative Pell solvable) per D mod 8.
    pub odd_by_d_mod_8: Vec<(u64, Share)>,
    /// Odd-period share among primes p = 1 (mod 4).
    pub primes_1_mod_4_odd: Share,
    /// Odd-period share among primes p = 3 (mod 4).
    pub primes_3_mod_4_odd: Share,
    /// Mean of period / (sqrt(D) * ln D).
    pub mean_normalized_period: f64,
    /// (D, period) with the longest period.
    pub longest: Option<(u64, usize)>,
}

pub fn period_stats(records: &[PellRecord]) -> PeriodStats {
    let mut histogram = BTreeMap::new();
    for r in records {
        *histogram.entry(r.period_len).or_insert(0usize) += 1;
    }

    let odd_by_d_mod_8 = (0..8u64)
        .map(|res| {
            let share = Share::tally(
                records
                    .iter()
                    .filter(|r| r.d % 8 == res)
                    .map(|r| r.negative_pell),
            );
            (res, share)
        })
        .filter(|(_, s)| s.total > 0)
        .collect();

    let primes_with = |res: u64| {
        Share::tally(
            records
                .iter()
                .filter(|r| r.is_prime && r.d % 4 == res)
                .map(|r| r.negative_pell),
        )
    };

    let normalized: Vec<f64> = records
        .iter()
        .filter(|r| r.d >= 3)
        .map(|r| {
            let d = r.d as f64;
            r.period_len as f64 / (d.sqrt() * d.ln())
        })
        .collect();
    let mean_normalized_period = if normalized.is_empty() {
        0.0
    } else {
        normalized.iter().sum::<f64>() / normalized.len() as f64
    };

    let longest = records
        .iter()
        .max_by(|a, b| a.period_len.cmp(&b.period_len).then(b.d.cmp(&a.d)))
        .map(|r| (r.d, r.period_len));

    PeriodStats {
        samples: records.len(),
        histogram,
        odd_by_d_mod_8,
        primes_1_mod_4_odd: primes_with(1),
        primes_3_mod_4_odd: primes_with(3),
        mean_normalized_period,
        longest,
    }
}

pub fn print_period_stats(stats: &PeriodStats) {
    println!("Period statistics over {} values of D", stats.samples);
    println!("  Odd period (negative Pell solvable) by D mod 8:");
    for (res, s) in &stats.odd_by_d_mod_8 {
        println!(
            "    D = {} (mod 8): {:>6}/{:<6} {:>6.2}%",
            res,
            s.hits,
            s.total,
            100.0 * s.share
        );
    }
    for (label, s) in [
        ("p = 1 (mod 4)", &stats.primes_1_mod_4_odd),
        ("p = 3 (mod 4)", &stats.primes_3_mod_4_odd),
    ] {
        if s.total > 0 {
            println!(
                "  primes {}: odd period {}/{} ({:.2}%)",
                label,
                s.hits,
                s.total,
                100.0 * s.share
            );
        }
    }
    println!(
        "  mean period / (sqrt(D) ln D): {:.4}",
        stats.mean_normalized_period
    );
    if let Some((d, len)) = stats.longest {
        println!("  longest period: {} at D = {}", len, d);
    }
    let shortest: Vec<String> = stats
        .histogram
        .iter()
        .take(8)
        .map(|(len, count)| format!("{}:{}", len, count))
        .collect();
    println!("  histogram (len:count, shortest 8): {}", shortest.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{run_survey, SurveyConfig};

    #[test]
    fn test_prime_period_parity() {
        let records = run_survey(&SurveyConfig {
            lo: 3,
            hi: 3000,
            primes_only: true,
            ..SurveyConfig::default()
        })
        .unwrap();
        let stats = period_stats(&records);
        // p = 1 mod 4: period always odd; p = 3 mod 4: always even.
        assert!(stats.primes_1_mod_4_odd.total > 100);
        assert_eq!(stats.primes_1_mod_4_odd.hits, stats.primes_1_mod_4_odd.total);
        assert_eq!(stats.primes_3_mod_4_odd.hits, 0);
    }

    #[test]
    fn test_histogram_and_longest() {
        let records = run_survey(&SurveyConfig {
            lo: 2,
            hi: 100,
            ..SurveyConfig::default()
        })
        .unwrap();
        let stats = period_stats(&records);
        assert_eq!(stats.samples, 90);
        assert_eq!(stats.histogram.values().sum::<usize>(), 90);
        // sqrt(94) has period 16, the longest below 100.
        assert_eq!(stats.longest, Some((94, 16)));
        // D = 3 (mod 4) is never a sum of two squares: no odd periods.
        for (res, s) in &stats.odd_by_d_mod_8 {
            if res % 4 == 3 {
                assert_eq!(s.hits, 0, "D = {} mod 8", res);
            }
        }
    }

    #[test]
    fn test_share_tally_empty() {
        let s = Share::tally(std::iter::empty());
        assert_eq!(s, Share::default());
    }
}
