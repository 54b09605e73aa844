//! Correlations between the regulator and simple invariants of D.

use serde::Serialize;

use crate::survey::PellRecord;

/// Pearson correlation coefficient. None for fewer than two points or a
/// constant series.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mx = xs[..n].iter().sum::<f64>() / nf;
    let my = ys[..n].iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx * syy).sqrt())
}

/// Least-squares line y = slope * x + intercept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Ordinary least squares. None for fewer than two points or constant x.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let nf = n as f64;
    let mx = xs[..n].iter().sum::<f64>() / nf;
    let my = ys[..n].iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    let r_squared = if syy == 0.0 {
        1.0
    } else {
        (sxy * sxy) / (sxx * syy)
    };
    Some(LinearFit {
        slope,
        intercept: my - slope * mx,
        r_squared,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct Correlation {
    pub label: String,
    pub samples: usize,
    pub r: Option<f64>,
}

/// Correlate the regulator with ln D, period length, tau(D) and sqrt(D).
pub fn regulator_correlations(records: &[PellRecord]) -> Vec<Correlation> {
    let regulators: Vec<f64> = records.iter().map(|r| r.regulator).collect();

    let features: [(&str, fn(&PellRecord) -> f64); 4] = [
        ("ln D", |r| (r.d as f64).ln()),
        ("period length", |r| r.period_len as f64),
        ("divisor count", |r| r.divisor_count as f64),
        ("sqrt D", |r| (r.d as f64).sqrt()),
    ];

    features
        .iter()
        .map(|(label, f)| {
            let xs: Vec<f64> = records.iter().map(f).collect();
            Correlation {
                label: label.to_string(),
                samples: records.len(),
                r: pearson(&xs, &regulators),
            }
        })
        .collect()
}

pub fn print_correlations(correlations: &[Correlation]) {
    println!("Regulator correlations");
    for c in correlations {
        match c.r {
            Some(r) => println!("  {:<14} r = {:+.4}  (n = {})", c.label, r, c.samples),
            None => println!("  {:<14} r = n/a    (n = {})", c.label, c.samples),
        }
    }
}
