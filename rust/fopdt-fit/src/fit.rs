//! Exhaustive grid search over (K, tau, T) and the fitted-parameter dump.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::{write_text, Dataset};
use crate::error::{FitError, Result};
use crate::model::Fopdt;

/// `steps` evenly spaced values from `min` to `max` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub steps: usize,
}

impl Range {
    pub fn new(min: f64, max: f64, steps: usize) -> Self {
        Range { min, max, steps }
    }

    pub fn values(&self) -> Vec<f64> {
        match self.steps {
            0 => Vec::new(),
            1 => vec![self.min],
            n => {
                let step = (self.max - self.min) / (n - 1) as f64;
                (0..n).map(|i| self.min + i as f64 * step).collect()
            }
        }
    }

    fn validate(&self, name: &str, allow_negative: bool) -> Result<()> {
        if self.steps == 0 {
            return Err(FitError::InvalidGrid(format!("{name}: steps must be >= 1")));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(FitError::InvalidGrid(format!(
                "{name}: need finite min <= max, got [{}, {}]",
                self.min, self.max
            )));
        }
        if !allow_negative && self.min < 0.0 {
            return Err(FitError::InvalidGrid(format!("{name}: must be non-negative")));
        }
        Ok(())
    }
}

/// Search space for [`grid_search`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub gain: Range,
    pub dead_time: Range,
    pub time_constant: Range,
}

impl Default for Grid {
    fn default() -> Self {
        Grid {
            gain: Range::new(0.5, 4.0, 36),
            dead_time: Range::new(0.0, 5.0, 51),
            time_constant: Range::new(0.5, 10.0, 39),
        }
    }
}

impl Grid {
    /// Number of candidates, or None if it overflows `usize`.
    pub fn size(&self) -> Option<usize> {
        self.gain
            .steps
            .checked_mul(self.dead_time.steps)?
            .checked_mul(self.time_constant.steps)
    }

    /// Check every range and return the candidate count.
    pub fn validate(&self) -> Result<usize> {
        self.gain.validate("gain", true)?;
        self.dead_time.validate("dead_time", false)?;
        self.time_constant.validate("time_constant", false)?;
        self.size().ok_or_else(|| {
            FitError::InvalidGrid(format!(
                "{} x {} x {} candidates overflow",
                self.gain.steps, self.dead_time.steps, self.time_constant.steps
            ))
        })
    }
}

/// Mean squared error over the common prefix of the two series.
pub fn mse(predicted: &[f64], observed: &[f64]) -> f64 {
    let n = predicted.len().min(observed.len());
    if n == 0 {
        return f64::NAN;
    }
    predicted[..n]
        .iter()
        .zip(&observed[..n])
        .map(|(p, o)| (p - o) * (p - o))
        .sum::<f64>()
        / n as f64
}

/// Coefficient of determination 1 - SS_res / SS_tot.
pub fn r_squared(predicted: &[f64], observed: &[f64]) -> f64 {
    let n = predicted.len().min(observed.len());
    if n == 0 {
        return f64::NAN;
    }
    let mean = observed[..n].iter().sum::<f64>() / n as f64;
    let ss_tot: f64 = observed[..n].iter().map(|o| (o - mean) * (o - mean)).sum();
    let ss_res: f64 = predicted[..n]
        .iter()
        .zip(&observed[..n])
        .map(|(p, o)| (p - o) * (p - o))
        .sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub model: Fopdt,
    pub mse: f64,
    pub r_squared: f64,
    /// Candidate models simulated. Zero when read back from a dump.
    pub evaluations: usize,
}

impl FitResult {
    /// Score `model` against the noisy output of `data`.
    pub fn evaluate(model: Fopdt, data: &Dataset) -> Self {
        let predicted = model.simulate(&data.time, &data.input);
        FitResult {
            model,
            mse: mse(&predicted, &data.output_noisy),
            r_squared: r_squared(&predicted, &data.output_noisy),
            evaluations: 1,
        }
    }

    /// `K = ..`, `tau = ..`, `T = ..`, `MSE = ..`, `R² = ..`, one per line.
    pub fn params_text(&self) -> String {
        format!(
            "K = {}\ntau = {}\nT = {}\nMSE = {}\nR² = {}\n",
            self.model.gain, self.model.dead_time, self.model.time_constant, self.mse, self.r_squared
        )
    }

    pub fn write_params(&self, path: &Path) -> Result<()> {
        write_text(path, &self.params_text())?;
        log::info!("Wrote fitted parameters to {}", path.display());
        Ok(())
    }
}

/// Parse the text written by [`FitResult::params_text`]. Unknown keys are
/// skipped; `R2` is accepted for `R²`.
pub fn parse_params(text: &str) -> Result<FitResult> {
    let (mut gain, mut dead_time, mut time_constant, mut mse, mut r2) = (None, None, None, None, None);

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| FitError::Parse {
            line: i + 1,
            message: format!("expected 'key = value', got '{line}'"),
        })?;
        let value: f64 = value.trim().parse().map_err(|e| FitError::Parse {
            line: i + 1,
            message: format!("'{}': {}", value.trim(), e),
        })?;
        let slot = match key.trim() {
            "K" => &mut gain,
            "tau" => &mut dead_time,
            "T" => &mut time_constant,
            "MSE" => &mut mse,
            "R²" | "R2" => &mut r2,
            other => {
                log::warn!("Ignoring unknown parameter '{}'", other);
                continue;
            }
        };
        *slot = Some(value);
    }

    Ok(FitResult {
        model: Fopdt::new(
            gain.ok_or(FitError::MissingColumn("K"))?,
            dead_time.ok_or(FitError::MissingColumn("tau"))?,
            time_constant.ok_or(FitError::MissingColumn("T"))?,
        ),
        mse: mse.ok_or(FitError::MissingColumn("MSE"))?,
        r_squared: r2.ok_or(FitError::MissingColumn("R²"))?,
        evaluations: 0,
    })
}

/// Read a parameter dump. A missing file is [`FitError::MissingInput`].
pub fn read_params(path: &Path) -> Result<FitResult> {
    if !path.exists() {
        return Err(FitError::MissingInput(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    parse_params(&text)
}

/// Sample spacing of `data`, rejecting short records and uneven time axes.
///
/// [`Fopdt::simulate`] assumes a uniform grid.
pub fn require_uniform(data: &Dataset) -> Result<f64> {
    if data.len() < 2 {
        return Err(FitError::EmptyDataset);
    }
    data.uniform_dt().ok_or_else(|| {
        FitError::InvalidConfig("time axis must be strictly increasing with uniform spacing".to_string())
    })
}

/// Simulate every grid point and keep the lowest MSE against `output_noisy`.
///
/// Ties go to the earliest candidate in (K, tau, T) lexicographic order, so
/// the result does not depend on thread scheduling.
pub fn grid_search(data: &Dataset, grid: &Grid) -> Result<FitResult> {
    let total = grid.validate()?;
    require_uniform(data)?;

    let gains = grid.gain.values();
    let dead_times = grid.dead_time.values();
    let time_constants = grid.time_constant.values();
    let (nd, nt) = (dead_times.len(), time_constants.len());

    log::info!(
        "Grid search over {} candidates ({} x {} x {})",
        total,
        gains.len(),
        nd,
        nt
    );

    let candidate = |idx: usize| {
        Fopdt::new(
            gains[idx / (nd * nt)],
            dead_times[(idx / nt) % nd],
            time_constants[idx % nt],
        )
    };

    let scores: Vec<f64> = (0..total)
        .into_par_iter()
        .map(|idx| {
            let predicted = candidate(idx).simulate(&data.time, &data.input);
            let score = mse(&predicted, &data.output_noisy);
            if score.is_nan() {
                f64::INFINITY
            } else {
                score
            }
        })
        .collect();

    let (best_idx, _) = scores
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(bi, bs), (i, &s)| if s < bs { (i, s) } else { (bi, bs) });

    let mut best = FitResult::evaluate(candidate(best_idx), data);
    best.evaluations = total;
    log::debug!("Best candidate #{}: {} (MSE {:.6e})", best_idx, best.model, best.mse);
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GenerateConfig;

    fn small_grid() -> Grid {
        Grid {
            gain: Range::new(1.0, 3.0, 5),
            dead_time: Range::new(0.0, 3.0, 7),
            time_constant: Range::new(2.0, 6.0, 5),
        }
    }

    fn clean_data() -> Dataset {
        Dataset::generate(&GenerateConfig {
            noise_std: 0.0,
            ..GenerateConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_range_values() {
        assert_eq!(Range::new(0.0, 3.0, 7).values(), vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(Range::new(2.0, 9.0, 1).values(), vec![2.0]);
        assert!(Range::new(0.0, 1.0, 0).values().is_empty());
    }

    #[test]
    fn test_metrics() {
        let obs = [1.0, 2.0, 3.0];
        assert_eq!(mse(&obs, &obs), 0.0);
        assert_eq!(r_squared(&obs, &obs), 1.0);
        assert!((mse(&[2.0, 3.0, 4.0], &obs) - 1.0).abs() < 1e-12);
        // Predicting the mean scores zero.
        assert!(r_squared(&[2.0, 2.0, 2.0], &obs).abs() < 1e-12);
        assert!(mse(&[], &[]).is_nan());
    }

    #[test]
    fn test_recovers_true_model_on_clean_data() {
        let data = clean_data();
        let fit = grid_search(&data, &small_grid()).unwrap();
        assert_eq!(fit.model, Fopdt::new(2.0, 1.5, 4.0));
        assert_eq!(fit.evaluations, 175);
        assert!(fit.mse < 1e-20);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_recovers_true_model_on_noisy_data() {
        let data = Dataset::generate(&GenerateConfig::default()).unwrap();
        let fit = grid_search(&data, &small_grid()).unwrap();
        assert_eq!(fit.model, Fopdt::new(2.0, 1.5, 4.0));
        // Residual is the injected noise.
        assert!(fit.mse > 0.0015 && fit.mse < 0.0035, "mse {}", fit.mse);
        assert!(fit.r_squared > 0.99);
    }

    #[test]
    fn test_invalid_grid_and_data() {
        let data = clean_data();
        let mut grid = small_grid();
        grid.time_constant = Range::new(-1.0, 2.0, 3);
        assert!(matches!(grid_search(&data, &grid), Err(FitError::InvalidGrid(_))));
        grid.time_constant = Range::new(3.0, 2.0, 3);
        assert!(matches!(grid_search(&data, &grid), Err(FitError::InvalidGrid(_))));
        grid.time_constant = Range::new(2.0, 3.0, 0);
        assert!(matches!(grid_search(&data, &grid), Err(FitError::InvalidGrid(_))));

        assert!(matches!(
            grid_search(&Dataset::default(), &small_grid()),
            Err(FitError::EmptyDataset)
        ));
    }

    #[test]
    fn test_grid_size_overflow() {
        let grid = Grid {
            gain: Range::new(1.0, 2.0, usize::MAX),
            dead_time: Range::new(0.0, 1.0, 2),
            time_constant: Range::new(1.0, 2.0, 2),
        };
        assert_eq!(grid.size(), None);
        assert!(matches!(grid.validate(), Err(FitError::InvalidGrid(_))));
        assert!(matches!(grid_search(&clean_data(), &grid), Err(FitError::InvalidGrid(_))));
        assert_eq!(small_grid().size(), Some(175));
    }

    #[test]
    fn test_uneven_time_axis_is_rejected() {
        let data = clean_data();
        // Rows 0, 1 and every fifth row after: first gap 0.1, the rest 0.5.
        let keep: Vec<usize> = (0..data.len()).filter(|&k| k < 2 || k % 5 == 0).collect();
        let pick = |v: &[f64]| keep.iter().map(|&k| v[k]).collect::<Vec<f64>>();
        let uneven = Dataset {
            time: pick(&data.time),
            input: pick(&data.input),
            output_clean: pick(&data.output_clean),
            output_noisy: pick(&data.output_noisy),
        };
        assert_eq!(uneven.uniform_dt(), None);
        assert!(matches!(grid_search(&uneven, &small_grid()), Err(FitError::InvalidConfig(_))));
        assert!(matches!(require_uniform(&uneven), Err(FitError::InvalidConfig(_))));
        assert!((require_uniform(&data).unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_params_text_round_trip() {
        let fit = FitResult {
            model: Fopdt::new(2.0, 1.5, 4.0),
            mse: 0.0025,
            r_squared: 0.998,
            evaluations: 175,
        };
        let text = fit.params_text();
        assert_eq!(text, "K = 2\ntau = 1.5\nT = 4\nMSE = 0.0025\nR² = 0.998\n");
        let parsed = parse_params(&text).unwrap();
        assert_eq!(parsed.model, fit.model);
        assert_eq!(parsed.mse, fit.mse);
        assert_eq!(parsed.r_squared, fit.r_squared);
        assert_eq!(parsed.evaluations, 0);
    }

    #[test]
    fn test_parse_params_errors() {
        assert!(matches!(
            parse_params("K = 2\ntau = 1\nT = 4\nMSE = 0.1\n"),
            Err(FitError::MissingColumn("R²"))
        ));
        match parse_params("K = 2\ntau = one\n") {
            Err(FitError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {:?}", other),
        }
        assert!(parse_params("K = 2\ntau = 1\nT = 4\nMSE = 0.1\nR2 = 0.9\nnote = 1\n").is_ok());
    }

    #[test]
    fn test_write_and_read_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("fopdt_params.txt");
        assert!(matches!(read_params(&path), Err(FitError::MissingInput(_))));

        let fit = grid_search(&clean_data(), &small_grid()).unwrap();
        fit.write_params(&path).unwrap();
        let back = read_params(&path).unwrap();
        assert_eq!(back.model, fit.model);
    }
}
