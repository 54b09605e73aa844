//! Pell / continued-fraction experiments CLI
//!
//! Usage:
//!   pell-experiments --mode=solve     --d=N
//!   pell-experiments --mode=survey    [--lo=2] [--hi=10000] [--primes] [--csv=path] [--json=path]
//!   pell-experiments --mode=residue   [--lo=3] [--hi=20000] [--d-mod=32] [--x-mod=8] [--all-d]
//!   pell-experiments --mode=period    [--lo=2] [--hi=10000]
//!   pell-experiments --mode=correlate [--lo=2] [--hi=10000]
//!   pell-experiments --mode=dirichlet [--terms=100000] [--s=1.5,2,3,4] [--f=one,tau,sigma,mu]
//!   pell-experiments --mode=exponents [--n=1000,10000,100000] [--cache=path]
//!   pell-experiments --mode=exponents-report [--cache=path]
//!   pell-experiments --mode=quick
//!
//! Modes:
//!   solve             expansion, fundamental solution and regulator for one D
//!   survey            solve a range of D, optionally export CSV / JSON
//!   residue           x0 mod m against D mod M (defaults: primes, x0 mod 8 vs p mod 32)
//!   period            period-length statistics and negative-Pell shares
//!   correlate         regulator correlations
//!   dirichlet         truncated Dirichlet series against zeta closed forms
//!   exponents         fit summatory growth exponents, write the cache
//!   exponents-report  print the cache written by `exponents`
//!   quick             small smoke run of every mode, no files written
//!
//! Logging goes through env_logger: RUST_LOG=info shows cache and file activity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pell_core::cf::expand_sqrt_default;
use pell_core::pell::{negative_pell_solution, solve_from_cf};

use pell_experiments::cache::{print_exponent_cache, ExponentCache, DEFAULT_CACHE_PATH};
use pell_experiments::correlate::{print_correlations, regulator_correlations};
use pell_experiments::dirichlet::{print_series_table, series_table, ArithmeticFunction};
use pell_experiments::error::Result;
use pell_experiments::period::{period_stats, print_period_stats};
use pell_experiments::report::{print_banner, write_json};
use pell_experiments::residue::{print_residue_table, residue_table};
use pell_experiments::survey::{run_survey, write_csv, SurveyConfig};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("quick");

    let outcome = match mode {
        "solve" => run_solve(&opts),
        "survey" => run_survey_mode(&opts),
        "residue" => run_residue(&opts),
        "period" => run_period(&opts),
        "correlate" => run_correlate(&opts),
        "dirichlet" => run_dirichlet(&opts),
        "exponents" => run_exponents(&opts),
        "exponents-report" => run_exponents_report(&opts),
        "quick" => run_quick(),
        other => {
            eprintln!(
                "Unknown mode: {other}. Use --mode=solve|survey|residue|period|correlate|dirichlet|exponents|exponents-report|quick"
            );
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run_solve(opts: &HashMap<String, String>) -> Result<()> {
    let d = parse_u64(opts, "d", 61);
    print_banner(&format!("Pell equation x^2 - {d} y^2 = 1"));

    let cf = expand_sqrt_default(d)?;
    println!("sqrt({}) = {}", d, cf);
    println!("period length: {}", cf.period_len());

    let sol = solve_from_cf(&cf)?;
    println!("fundamental solution:");
    println!("  x0 = {}", sol.x);
    println!("  y0 = {}", sol.y);
    println!(
        "  via {} convergent",
        if sol.from_negative {
            "squared norm -1"
        } else {
            "norm +1"
        }
    );
    println!("  regulator ln(x0 + y0 sqrt(D)) = {:.10}", sol.regulator());

    match negative_pell_solution(&cf)? {
        Some((x, y)) => println!("negative Pell x^2 - {d} y^2 = -1: ({x}, {y})"),
        None => println!("negative Pell x^2 - {d} y^2 = -1: no solution (even period)"),
    }
    Ok(())
}

fn survey_config(opts: &HashMap<String, String>, lo: u64, hi: u64, primes: bool) -> SurveyConfig {
    SurveyConfig {
        lo: parse_u64(opts, "lo", lo),
        hi: parse_u64(opts, "hi", hi),
        primes_only: primes || opts.contains_key("primes"),
        ..SurveyConfig::default()
    }
}

fn run_survey_mode(opts: &HashMap<String, String>) -> Result<()> {
    let config = survey_config(opts, 2, 10_000, false);
    print_banner("Pell survey");

    let records = run_survey(&config)?;
    println!("Solved {} values of D in [{}, {}]", records.len(), config.lo, config.hi);

    let max_digits = records.iter().max_by_key(|r| r.x0.len());
    if let Some(r) = max_digits {
        println!("Largest x0: D = {} ({} digits)", r.d, r.x0.len());
    }

    if let Some(path) = opts.get("csv") {
        write_csv(&records, Path::new(path))?;
        println!("CSV written to {path}");
    }
    if let Some(path) = opts.get("json") {
        write_json(&records, Path::new(path))?;
        println!("JSON written to {path}");
    }
    Ok(())
}

fn run_residue(opts: &HashMap<String, String>) -> Result<()> {
    // Primes by default; --all-d widens to every non-square D.
    let primes = !opts.contains_key("all-d");
    let config = survey_config(opts, 3, 20_000, primes);
    let d_mod = parse_u64(opts, "d-mod", 32).max(1);
    let x_mod = parse_u64(opts, "x-mod", 8).max(1);

    print_banner(&format!("x0 mod {x_mod} vs D mod {d_mod}"));
    let records = run_survey(&config)?;
    let table = residue_table(&records, d_mod, x_mod);
    print_residue_table(&table);

    if let Some(path) = opts.get("json") {
        write_json(&table, Path::new(path))?;
    }
    Ok(())
}

fn run_period(opts: &HashMap<String, String>) -> Result<()> {
    let config = survey_config(opts, 2, 10_000, false);
    print_banner("Continued fraction periods");
    let records = run_survey(&config)?;
    let stats = period_stats(&records);
    print_period_stats(&stats);

    if let Some(path) = opts.get("json") {
        write_json(&stats, Path::new(path))?;
    }
    Ok(())
}

fn run_correlate(opts: &HashMap<String, String>) -> Result<()> {
    let config = survey_config(opts, 2, 10_000, false);
    print_banner("Regulator correlations");
    let records = run_survey(&config)?;
    print_correlations(&regulator_correlations(&records));
    Ok(())
}

fn run_dirichlet(opts: &HashMap<String, String>) -> Result<()> {
    let terms = parse_u64(opts, "terms", 100_000);
    let exponents = parse_f64_list(opts, "s", &[1.5, 2.0, 3.0, 4.0]);
    let functions = parse_functions(opts);

    print_banner("Dirichlet series vs zeta closed forms");
    let rows = series_table(&functions, &exponents, terms);
    print_series_table(&rows);

    if let Some(path) = opts.get("json") {
        write_json(&rows, Path::new(path))?;
    }
    Ok(())
}

fn cache_path(opts: &HashMap<String, String>) -> PathBuf {
    PathBuf::from(
        opts.get("cache")
            .map(String::as_str)
            .unwrap_or(DEFAULT_CACHE_PATH),
    )
}

fn run_exponents(opts: &HashMap<String, String>) -> Result<()> {
    let path = cache_path(opts);
    let ns = parse_u64_list(opts, "n", &[1_000, 10_000, 100_000]);
    let functions = parse_functions(opts);

    print_banner("Summatory growth exponents");
    let mut cache = ExponentCache::load_or_default(&path);
    let mut computed = 0usize;
    for &n in &ns {
        if cache.fill(n, &functions) {
            computed += 1;
            println!("  fitted n = {n}");
        } else {
            println!("  n = {n} (cached)");
        }
    }
    if computed > 0 {
        cache.save(&path)?;
    }
    println!();
    print_exponent_cache(&cache);
    Ok(())
}

fn run_exponents_report(opts: &HashMap<String, String>) -> Result<()> {
    let path = cache_path(opts);
    print_banner("Cached growth exponents");
    let cache = ExponentCache::load(&path)?;
    print_exponent_cache(&cache);
    Ok(())
}

fn run_quick() -> Result<()> {
    print_banner("Quick smoke run");

    let records = run_survey(&SurveyConfig {
        lo: 2,
        hi: 500,
        ..SurveyConfig::default()
    })?;
    println!("Surveyed {} values of D\n", records.len());

    let primes: Vec<_> = records.iter().filter(|r| r.is_prime).cloned().collect();
    print_residue_table(&residue_table(&primes, 32, 8));
    println!();
    print_period_stats(&period_stats(&records));
    println!();
    print_correlations(&regulator_correlations(&records));
    println!();
    print_series_table(&series_table(&ArithmeticFunction::ALL, &[2.0, 3.0], 10_000));
    Ok(())
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    opts.get(key)
        .and_then(|v| v.replace('_', "").parse().ok())
        .unwrap_or(default)
}

fn parse_u64_list(opts: &HashMap<String, String>, key: &str, default: &[u64]) -> Vec<u64> {
    opts.get(key)
        .map(|v| {
            v.split(',')
                .filter_map(|s| s.trim().replace('_', "").parse().ok())
                .collect()
        })
        .unwrap_or_else(|| default.to_vec())
}

fn parse_f64_list(opts: &HashMap<String, String>, key: &str, default: &[f64]) -> Vec<f64> {
    opts.get(key)
        .map(|v| v.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_else(|| default.to_vec())
}

fn parse_functions(opts: &HashMap<String, String>) -> Vec<ArithmeticFunction> {
    match opts.get("f") {
        Some(v) => v
            .split(',')
            .filter_map(|s| match s.parse() {
                Ok(f) => Some(f),
                Err(e) => {
                    log::warn!("{e}, skipped");
                    None
                }
            })
            .collect(),
        None => ArithmeticFunction::ALL.to_vec(),
    }
}
