//! End-to-end checks of the experiment pipeline: survey -> aggregation -> cache.

use pell_experiments::cache::ExponentCache;
use pell_experiments::dirichlet::ArithmeticFunction;
use pell_experiments::period::period_stats;
use pell_experiments::residue::residue_table;
use pell_experiments::survey::{run_survey, PellRecord, SurveyConfig};
use pell_experiments::ExperimentError;

fn prime_records(lo: u64, hi: u64) -> Vec<PellRecord> {
    run_survey(&SurveyConfig {
        lo,
        hi,
        primes_only: true,
        ..SurveyConfig::default()
    })
    .unwrap()
}

#[test]
fn test_x0_mod_8_by_p_mod_32() {
    // Measured over odd primes below 5000: x0 mod 8 is fixed by p mod 8.
    let records = prime_records(3, 5_000);
    let table = residue_table(&records, 32, 8);
    assert_eq!(table.rows.len(), 16);
    for row in &table.rows {
        let expected = match row.d_residue % 8 {
            3 => 2,
            7 => 0,
            _ => 1,
        };
        assert!(row.is_deterministic(), "p = {} mod 32: {:?}", row.d_residue, row.counts);
        assert_eq!(row.dominant, expected, "p = {} mod 32", row.d_residue);
    }
    assert_eq!(table.deterministic_rows(), 16);
}

#[test]
fn test_period_stats_over_primes() {
    let records = prime_records(3, 5_000);
    let stats = period_stats(&records);
    assert_eq!(stats.samples, records.len());
    assert!((stats.primes_1_mod_4_odd.share - 1.0).abs() < 1e-12);
    assert_eq!(stats.primes_3_mod_4_odd.share, 0.0);
    assert!(stats.mean_normalized_period > 0.0);
}

#[test]
fn test_survey_records_round_trip_through_json() {
    let records = run_survey(&SurveyConfig {
        lo: 2,
        hi: 200,
        ..SurveyConfig::default()
    })
    .unwrap();
    let json = serde_json::to_string(&records).unwrap();
    let back: Vec<PellRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.len(), records.len());
    assert_eq!(back.iter().find(|r| r.d == 61).unwrap().x0, "1766319049");
}

#[test]
fn test_cache_written_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("optimal_exponents.json");

    // Reader before writer: missing input.
    assert!(matches!(
        ExponentCache::load(&path),
        Err(ExperimentError::MissingInput(_))
    ));

    let mut cache = ExponentCache::load_or_default(&path);
    cache.fill(5_000, &[ArithmeticFunction::One, ArithmeticFunction::DivisorSum]);
    cache.save(&path).unwrap();

    let read = ExponentCache::load(&path).unwrap();
    let fits = read.get(5_000).unwrap();
    assert_eq!(fits.len(), 2);
    assert!((fits[0].exponent - 1.0).abs() < 1e-9);
    assert!((fits[1].exponent - 2.0).abs() < 0.02);
}
