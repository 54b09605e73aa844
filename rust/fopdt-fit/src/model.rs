//! First-order-plus-dead-time process model.
//!
//! ```text
//! G(s) = K * exp(-tau * s) / (T * s + 1)
//! ```
//! Signals are deviation variables: zero input and zero output at rest.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fopdt {
    /// Static gain K.
    pub gain: f64,
    /// Dead time tau, in the same unit as the time axis.
    pub dead_time: f64,
    /// Time constant T.
    pub time_constant: f64,
}

impl Fopdt {
    pub fn new(gain: f64, dead_time: f64, time_constant: f64) -> Self {
        Fopdt {
            gain,
            dead_time,
            time_constant,
        }
    }

    /// Response at time t to a step of `amplitude` applied at t = 0.
    pub fn step_response(&self, t: f64, amplitude: f64) -> f64 {
        if t < self.dead_time {
            return 0.0;
        }
        if self.time_constant <= 0.0 {
            return self.gain * amplitude;
        }
        self.gain * amplitude * (1.0 - (-(t - self.dead_time) / self.time_constant).exp())
    }

    /// Simulate on a uniform grid with a zero-order hold on the input.
    ///
    /// The sample spacing is taken from the first two time stamps and the
    /// dead time is rounded to a whole number of samples. Output has the
    /// length of the shorter of `time` and `input`.
    pub fn simulate(&self, time: &[f64], input: &[f64]) -> Vec<f64> {
        let n = time.len().min(input.len());
        if n == 0 {
            return Vec::new();
        }
        let mut y = vec![0.0; n];
        if n == 1 {
            return y;
        }

        let dt = time[1] - time[0];
        let delay = (self.dead_time / dt).round().max(0.0) as usize;
        let a = if self.time_constant > 0.0 {
            (-dt / self.time_constant).exp()
        } else {
            0.0
        };
        let b = self.gain * (1.0 - a);

        for k in 0..n - 1 {
            let u = if k >= delay { input[k - delay] } else { 0.0 };
            y[k + 1] = a * y[k] + b * u;
        }
        y
    }
}

impl fmt::Display for Fopdt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "G(s) = {:.4} e^(-{:.4}s) / ({:.4}s + 1)",
            self.gain, self.dead_time, self.time_constant
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|k| k as f64 * dt).collect()
    }

    #[test]
    fn test_step_response() {
        let m = Fopdt::new(2.0, 1.0, 3.0);
        assert_eq!(m.step_response(0.5, 1.0), 0.0);
        assert_eq!(m.step_response(1.0, 1.0), 0.0);
        let at_tau_plus_t = m.step_response(4.0, 1.0);
        assert!((at_tau_plus_t - 2.0 * (1.0 - (-1.0f64).exp())).abs() < 1e-12);
        assert!((m.step_response(100.0, 0.5) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulate_matches_step_response_on_grid() {
        let m = Fopdt::new(1.5, 0.5, 2.0);
        let time = uniform(200, 0.1);
        let input = vec![1.0; 200];
        let y = m.simulate(&time, &input);
        for (k, &t) in time.iter().enumerate() {
            // Exact discretisation: no error at the sample instants.
            let expected = m.step_response(t, 1.0);
            assert!((y[k] - expected).abs() < 1e-9, "k = {}: {} vs {}", k, y[k], expected);
        }
    }

    #[test]
    fn test_simulate_degenerate_inputs() {
        let m = Fopdt::new(1.0, 0.0, 1.0);
        assert!(m.simulate(&[], &[]).is_empty());
        assert_eq!(m.simulate(&[0.0], &[1.0]), vec![0.0]);
        // Pure gain with no lag.
        let fast = Fopdt::new(3.0, 0.0, 0.0);
        let y = fast.simulate(&[0.0, 1.0, 2.0], &[1.0, 1.0, 1.0]);
        assert_eq!(y, vec![0.0, 3.0, 3.0]);
    }
}
