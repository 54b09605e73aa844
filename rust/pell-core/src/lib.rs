//! # pell-core
//!
//! Continued fractions of sqrt(D) and fundamental solutions of Pell's
//! equation x^2 - D*y^2 = 1, plus the small integer helpers (divisor
//! functions, primality, integer square roots) the experiments share.
//!
//! ## Pipeline
//!
//! - **Expansion** ([`cf::expand_sqrt`]): periodic partial quotients of sqrt(D),
//!   period closed by the first repeated (m, d) state
//! - **Convergents** ([`convergent::Convergents`]): lazy p_k/q_k over the period
//! - **Selection** ([`pell::solve_from_cf`]): norm +1 convergent, or the square
//!   of a norm -1 one, verified before it is returned

pub mod arith;
pub mod cf;
pub mod convergent;
pub mod error;
pub mod pell;

pub use cf::{expand_sqrt, ContinuedFraction};
pub use convergent::{Convergent, Convergents};
pub use error::PellError;
pub use pell::{fundamental_solution, PellSolution};
