//! # fopdt-fit
//!
//! Fit a first-order-plus-dead-time model to step-test data two ways and
//! compare them:
//!
//! - [`fit::grid_search`]: exhaustive search over (K, tau, T), scored by MSE
//!   against the noisy output
//! - [`compare::two_point_fit`]: Smith's 28.3 % / 63.2 % construction
//!
//! Data is synthetic ([`data::Dataset::generate`]) and travels between modes
//! as CSV; the chosen parameters are dumped as `key = value` text.

pub mod compare;
pub mod data;
pub mod error;
pub mod fit;
pub mod model;

pub use error::FitError;
pub use model::Fopdt;
