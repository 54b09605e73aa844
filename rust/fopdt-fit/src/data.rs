//! Synthetic step-test datasets and their CSV form.
//!
//! CSV layout:
//! ```text
//! time,input,output_clean,output_noisy
//! 0,0,0,0.0123
//! ...
//! ```

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Serialize;

use crate::error::{FitError, Result};
use crate::model::Fopdt;

pub const CSV_HEADER: &str = "time,input,output_clean,output_noisy";

/// Parameters of a synthetic step test.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateConfig {
    pub model: Fopdt,
    pub duration: f64,
    pub dt: f64,
    pub step_time: f64,
    pub step_amplitude: f64,
    /// Standard deviation of additive Gaussian measurement noise.
    pub noise_std: f64,
    pub seed: u64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            model: Fopdt::new(2.0, 1.5, 4.0),
            duration: 30.0,
            dt: 0.1,
            step_time: 2.0,
            step_amplitude: 1.0,
            noise_std: 0.05,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub time: Vec<f64>,
    pub input: Vec<f64>,
    pub output_clean: Vec<f64>,
    pub output_noisy: Vec<f64>,
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents)?;
    Ok(())
}

impl Dataset {
    /// Simulate a step test through `config.model` and add seeded noise.
    pub fn generate(config: &GenerateConfig) -> Result<Self> {
        if !(config.dt > 0.0) || !(config.duration > 0.0) {
            return Err(FitError::InvalidConfig(format!(
                "dt ({}) and duration ({}) must be positive",
                config.dt, config.duration
            )));
        }
        let noise = Normal::new(0.0, config.noise_std)
            .map_err(|e| FitError::InvalidConfig(format!("noise_std = {}: {}", config.noise_std, e)))?;

        let samples = (config.duration / config.dt).round() as usize + 1;
        let time: Vec<f64> = (0..samples).map(|k| k as f64 * config.dt).collect();
        // Half-sample tolerance so a step time on the grid is not lost to rounding.
        let switch = config.step_time - 0.5 * config.dt;
        let input: Vec<f64> = time
            .iter()
            .map(|&t| if t >= switch { config.step_amplitude } else { 0.0 })
            .collect();
        let output_clean = config.model.simulate(&time, &input);

        let mut rng = StdRng::seed_from_u64(config.seed);
        let output_noisy = output_clean
            .iter()
            .map(|&y| y + noise.sample(&mut rng))
            .collect();

        log::debug!("Generated {} samples from {}", samples, config.model);
        Ok(Dataset {
            time,
            input,
            output_clean,
            output_noisy,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Sample spacing, if the time axis is uniform to within 1e-6 relative.
    pub fn uniform_dt(&self) -> Option<f64> {
        if self.time.len() < 2 {
            return None;
        }
        let dt = self.time[1] - self.time[0];
        if !(dt > 0.0) {
            return None;
        }
        let uniform = self
            .time
            .windows(2)
            .all(|w| ((w[1] - w[0]) - dt).abs() <= 1e-6 * dt);
        uniform.then_some(dt)
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(48 * (self.len() + 1));
        out.push_str(CSV_HEADER);
        out.push('\n');
        for k in 0..self.len() {
            // Writing into a String cannot fail.
            let _ = writeln!(
                out,
                "{},{},{},{}",
                self.time[k], self.input[k], self.output_clean[k], self.output_noisy[k]
            );
        }
        out
    }

    /// Parse CSV text. Columns are located by header name, so their order
    /// is free; extra columns are ignored.
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());

        let (_, header) = lines.next().ok_or(FitError::EmptyDataset)?;
        let columns: HashMap<&str, usize> = header
            .split(',')
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();
        let index_of = |name: &'static str| columns.get(name).copied().ok_or(FitError::MissingColumn(name));
        let idx = [
            index_of("time")?,
            index_of("input")?,
            index_of("output_clean")?,
            index_of("output_noisy")?,
        ];

        let mut data = Dataset::default();
        for (line_no, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let mut values = [0.0f64; 4];
            for (slot, &col) in values.iter_mut().zip(idx.iter()) {
                let raw = fields.get(col).ok_or_else(|| FitError::Parse {
                    line: line_no + 1,
                    message: format!("expected at least {} fields, found {}", col + 1, fields.len()),
                })?;
                *slot = raw.parse().map_err(|e| FitError::Parse {
                    line: line_no + 1,
                    message: format!("'{}': {}", raw, e),
                })?;
            }
            data.time.push(values[0]);
            data.input.push(values[1]);
            data.output_clean.push(values[2]);
            data.output_noisy.push(values[3]);
        }

        if data.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        Ok(data)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        write_text(path, &self.to_csv())?;
        log::info!("Wrote {} samples to {}", self.len(), path.display());
        Ok(())
    }

    /// Read a dataset written by [`Dataset::write_csv`]. A missing file is
    /// [`FitError::MissingInput`].
    pub fn read_csv(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(FitError::MissingInput(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let data = Self::from_csv_str(&text)?;
        log::info!("Loaded {} samples from {}", data.len(), path.display());
        Ok(data)
    }
}
