//! FOPDT fitting CLI
//!
//! Usage:
//!   fopdt-fit --mode=generate [--k=2] [--tau=1.5] [--t=4] [--duration=30] [--dt=0.1]
//!                             [--step-time=2] [--noise=0.05] [--seed=42] [--data=path]
//!   fopdt-fit --mode=fit      [--data=path] [--params=path] [grid flags]
//!   fopdt-fit --mode=compare  [--data=path] [--json=path] [grid flags]
//!   fopdt-fit --mode=report   [--params=path]
//!   fopdt-fit --mode=quick
//!
//! Grid flags take `min:max:steps`, e.g. `--grid-k=0.5:4:36 --grid-tau=0:5:51 --grid-t=0.5:10:39`.
//!
//! `fit` and `compare` read the CSV written by `generate`; `report` reads the
//! parameter dump written by `fit`. Set RUST_LOG=info to see file activity.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fopdt_fit::compare::{compare, print_comparison, write_comparison_json};
use fopdt_fit::data::{Dataset, GenerateConfig};
use fopdt_fit::error::{FitError, Result};
use fopdt_fit::fit::{grid_search, read_params, Grid, Range};
use fopdt_fit::Fopdt;

const DEFAULT_DATA_PATH: &str = "data/fopdt_data.csv";
const DEFAULT_PARAMS_PATH: &str = "results/fopdt_params.txt";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("quick");

    let outcome = match mode {
        "generate" => run_generate(&opts),
        "fit" => run_fit(&opts),
        "compare" => run_compare(&opts),
        "report" => run_report(&opts),
        "quick" => run_quick(),
        other => {
            eprintln!("Unknown mode: {other}. Use --mode=generate|fit|compare|report|quick");
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn banner(title: &str) {
    println!("=== {title} ===");
}

fn generate_config(opts: &HashMap<String, String>) -> GenerateConfig {
    let d = GenerateConfig::default();
    GenerateConfig {
        model: Fopdt::new(
            parse_f64(opts, "k", d.model.gain),
            parse_f64(opts, "tau", d.model.dead_time),
            parse_f64(opts, "t", d.model.time_constant),
        ),
        duration: parse_f64(opts, "duration", d.duration),
        dt: parse_f64(opts, "dt", d.dt),
        step_time: parse_f64(opts, "step-time", d.step_time),
        step_amplitude: parse_f64(opts, "amplitude", d.step_amplitude),
        noise_std: parse_f64(opts, "noise", d.noise_std),
        seed: opts
            .get("seed")
            .and_then(|v| v.parse().ok())
            .unwrap_or(d.seed),
    }
}

fn grid_config(opts: &HashMap<String, String>) -> Result<Grid> {
    let d = Grid::default();
    Ok(Grid {
        gain: parse_range(opts, "grid-k", d.gain)?,
        dead_time: parse_range(opts, "grid-tau", d.dead_time)?,
        time_constant: parse_range(opts, "grid-t", d.time_constant)?,
    })
}

fn path_opt(opts: &HashMap<String, String>, key: &str, default: &str) -> PathBuf {
    PathBuf::from(opts.get(key).map(String::as_str).unwrap_or(default))
}

fn run_generate(opts: &HashMap<String, String>) -> Result<()> {
    let config = generate_config(opts);
    let path = path_opt(opts, "data", DEFAULT_DATA_PATH);
    banner("Generate step-test data");

    let data = Dataset::generate(&config)?;
    println!("  true model: {}", config.model);
    println!(
        "  {} samples, dt = {}, step of {} at t = {}, noise std {}",
        data.len(),
        config.dt,
        config.step_amplitude,
        config.step_time,
        config.noise_std
    );
    data.write_csv(&path)?;
    println!("  written to {}", path.display());
    Ok(())
}

fn run_fit(opts: &HashMap<String, String>) -> Result<()> {
    let data = Dataset::read_csv(&path_opt(opts, "data", DEFAULT_DATA_PATH))?;
    let grid = grid_config(opts)?;
    let params = path_opt(opts, "params", DEFAULT_PARAMS_PATH);
    banner("Grid-search fit");

    let fit = grid_search(&data, &grid)?;
    println!("  best model: {}", fit.model);
    println!("  MSE = {:.6e}, R^2 = {:.6}", fit.mse, fit.r_squared);
    println!("  {} candidates evaluated", fit.evaluations);
    fit.write_params(&params)?;
    println!("  parameters written to {}", params.display());
    Ok(())
}

fn run_compare(opts: &HashMap<String, String>) -> Result<()> {
    let data = Dataset::read_csv(&path_opt(opts, "data", DEFAULT_DATA_PATH))?;
    let grid = grid_config(opts)?;
    banner("Grid search vs two-point identification");
    let cmp = compare(&data, &grid)?;
    print_comparison(&cmp, None);
    if let Some(path) = opts.get("json") {
        write_comparison_json(&cmp, Path::new(path))?;
        println!("  JSON written to {path}");
    }
    Ok(())
}

fn run_report(opts: &HashMap<String, String>) -> Result<()> {
    let path = path_opt(opts, "params", DEFAULT_PARAMS_PATH);
    banner("Fitted parameters");
    let fit = read_params(&path)?;
    print!("{}", fit.params_text());
    println!("  {}", fit.model);
    Ok(())
}

fn run_quick() -> Result<()> {
    banner("Quick smoke run");
    let config = GenerateConfig::default();
    let data = Dataset::generate(&config)?;
    let grid = Grid {
        gain: Range::new(1.0, 3.0, 21),
        dead_time: Range::new(0.0, 3.0, 31),
        time_constant: Range::new(2.0, 6.0, 21),
    };
    let cmp = compare(&data, &grid)?;
    print_comparison(&cmp, Some(&config.model));
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

fn parse_f64(opts: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    match opts.get(key).map(|v| v.parse::<f64>()) {
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            log::warn!("--{key}: {e}, using {default}");
            default
        }
        None => default,
    }
}

/// `min:max:steps`
fn parse_range(opts: &HashMap<String, String>, key: &str, default: Range) -> Result<Range> {
    let Some(raw) = opts.get(key) else {
        return Ok(default);
    };
    let parts: Vec<&str> = raw.split(':').collect();
    let bad = || FitError::InvalidGrid(format!("--{key}={raw}: expected min:max:steps"));
    if parts.len() != 3 {
        return Err(bad());
    }
    Ok(Range::new(
        parts[0].trim().parse().map_err(|_| bad())?,
        parts[1].trim().parse().map_err(|_| bad())?,
        parts[2].trim().parse().map_err(|_| bad())?,
    ))
}
