//! Failure modes of the continued-fraction Pell solver.

use num_bigint::BigUint;

/// Errors raised while expanding sqrt(D) or extracting a Pell solution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PellError {
    /// The (m, d) recurrence did not revisit a state within the iteration bound.
    #[error("no period found for sqrt({d}) within {max_iterations} iterations")]
    PeriodNotFound { d: u64, max_iterations: usize },

    /// A candidate solution failed x^2 - D*y^2 = 1.
    #[error("candidate ({x}, {y}) does not satisfy x^2 - {d}*y^2 = 1")]
    InconsistentResult { d: u64, x: BigUint, y: BigUint },

    /// D is outside the solver's domain (D < 2 or a perfect square).
    #[error("D = {d} is not a valid Pell discriminant: {reason}")]
    InvalidDomain { d: u64, reason: &'static str },
}

pub type Result<T> = std::result::Result<T, PellError>;
