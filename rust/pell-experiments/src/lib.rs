//! # pell-experiments
//!
//! Exploratory statistics layered on `pell-core`. Every experiment consumes
//! the flat [`survey::PellRecord`]s produced by one parallel survey and only
//! adds its own aggregation and reporting:
//!
//! - **residue**: x0 mod m cross-tabulated against D mod M
//! - **period**: period-length distribution and negative-Pell shares
//! - **correlate**: regulator against ln D, period length, tau(D)
//! - **dirichlet**: truncated Dirichlet series against zeta closed forms,
//!   power-law exponents of summatory functions (cached by n in [`cache`])
//!
//! Reported percentages are measurements over a finite sample.

pub mod cache;
pub mod correlate;
pub mod dirichlet;
pub mod error;
pub mod period;
pub mod report;
pub mod residue;
pub mod survey;

pub use error::ExperimentError;
