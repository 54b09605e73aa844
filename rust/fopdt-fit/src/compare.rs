//! Smith's two-point identification, and a side-by-side with grid search.
//!
//! From a step response with output change dy for input change du:
//! ```text
//! K   = dy / du
//! T   = 1.5 * (t63 - t28)
//! tau = t63 - T - t_step
//! ```
//! where t28 and t63 are the times the response reaches 28.3 % and 63.2 %
//! of dy.

use std::path::Path;

use serde::Serialize;

use crate::data::{write_text, Dataset};
use crate::error::{FitError, Result};
use crate::fit::{grid_search, require_uniform, FitResult, Grid};
use crate::model::Fopdt;

/// Centered moving-average window applied before locating the crossings.
pub const SMOOTHING_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TwoPointFit {
    pub fit: FitResult,
    pub step_time: f64,
    pub t28: f64,
    pub t63: f64,
}

/// Centered moving average; the window shrinks at the ends.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let half = window.max(1) / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + half + 1).min(values.len());
            values[lo..hi].iter().sum::<f64>() / (hi - lo) as f64
        })
        .collect()
}

/// First time `signal` reaches `level`, interpolated between samples.
fn crossing_time(time: &[f64], signal: &[f64], level: f64, from: usize) -> Option<f64> {
    let k = (from..signal.len()).find(|&k| signal[k] >= level)?;
    if k == 0 || k == from {
        return Some(time[k]);
    }
    let (y0, y1) = (signal[k - 1], signal[k]);
    let frac = if y1 > y0 { (level - y0) / (y1 - y0) } else { 0.0 };
    Some(time[k - 1] + frac * (time[k] - time[k - 1]))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Identify a FOPDT model from the first step in `data.input`.
///
/// The baseline is the mean smoothed output before the step and the final
/// value the mean over the last tenth of the record. A negative dead-time
/// estimate is clamped to zero.
pub fn two_point_fit(data: &Dataset) -> Result<TwoPointFit> {
    require_uniform(data)?;
    let u0 = data.input[0];
    let step_idx = data
        .input
        .iter()
        .position(|&u| u != u0)
        .ok_or_else(|| FitError::Identification("input never changes".to_string()))?;
    let du = data.input[data.len() - 1] - u0;
    if du == 0.0 {
        return Err(FitError::Identification("input returns to its initial value".to_string()));
    }
    let step_time = data.time[step_idx];

    let smooth = moving_average(&data.output_noisy, SMOOTHING_WINDOW);
    let tail = (data.len() / 10).max(1);
    let y_final = mean(&smooth[data.len() - tail..]);
    let y_start = if step_idx > 0 { mean(&smooth[..step_idx]) } else { 0.0 };
    let dy = y_final - y_start;
    if dy == 0.0 {
        return Err(FitError::Identification("output does not respond to the step".to_string()));
    }

    // Work on the normalised response so a negative gain crosses upward too.
    let normalised: Vec<f64> = smooth.iter().map(|y| (y - y_start) / dy).collect();
    let t28 = crossing_time(&data.time, &normalised, 0.283, step_idx)
        .ok_or_else(|| FitError::Identification("response never reaches 28.3 %".to_string()))?;
    let t63 = crossing_time(&data.time, &normalised, 0.632, step_idx)
        .ok_or_else(|| FitError::Identification("response never reaches 63.2 %".to_string()))?;

    let time_constant = 1.5 * (t63 - t28);
    let dead_time = (t63 - time_constant - step_time).max(0.0);
    let model = Fopdt::new(dy / du, dead_time, time_constant);
    log::debug!("Two-point: t28 = {:.3}, t63 = {:.3} -> {}", t28, t63, model);

    Ok(TwoPointFit {
        fit: FitResult::evaluate(model, data),
        step_time,
        t28,
        t63,
    })
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Comparison {
    pub grid: FitResult,
    pub two_point: TwoPointFit,
}

impl Comparison {
    pub fn grid_wins(&self) -> bool {
        self.grid.mse <= self.two_point.fit.mse
    }
}

pub fn compare(data: &Dataset, grid: &Grid) -> Result<Comparison> {
    Ok(Comparison {
        grid: grid_search(data, grid)?,
        two_point: two_point_fit(data)?,
    })
}

/// Pretty-printed JSON of both fits, parent directories created as needed.
pub fn write_comparison_json(cmp: &Comparison, path: &Path) -> Result<()> {
    write_text(path, &serde_json::to_string_pretty(cmp)?)?;
    log::info!("Wrote comparison to {}", path.display());
    Ok(())
}

pub fn print_comparison(cmp: &Comparison, truth: Option<&Fopdt>) {
    println!(
        "  {:<12} {:>10} {:>10} {:>10} {:>12} {:>10} {:>8}",
        "method", "K", "tau", "T", "MSE", "R^2", "evals"
    );
    let row = |name: &str, r: &FitResult| {
        println!(
            "  {:<12} {:>10.4} {:>10.4} {:>10.4} {:>12.4e} {:>10.6} {:>8}",
            name, r.model.gain, r.model.dead_time, r.model.time_constant, r.mse, r.r_squared, r.evaluations
        );
    };
    if let Some(m) = truth {
        println!(
            "  {:<12} {:>10.4} {:>10.4} {:>10.4}",
            "true", m.gain, m.dead_time, m.time_constant
        );
    }
    row("grid", &cmp.grid);
    row("two-point", &cmp.two_point.fit);
    println!(
        "  two-point crossings: t28 = {:.3}, t63 = {:.3} (step at {:.3})",
        cmp.two_point.t28, cmp.two_point.t63, cmp.two_point.step_time
    );
    println!(
        "  lower MSE: {}",
        if cmp.grid_wins() { "grid search" } else { "two-point" }
    );
}
