//! Error reporting for solver construction and solving.

/// Reported when the solver cannot be built around the given chain.
#[derive(Debug)]
pub enum ChainError {
    /// The bound arrays do not agree with the number of movable joints.
    InvalidChain { dof: usize, lower: usize, upper: usize },
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ChainError::InvalidChain { dof, lower, upper } => write!(
                f,
                "Invalid chain: {} joints but {} lower and {} upper bounds",
                dof, lower, upper
            ),
        }
    }
}

impl std::error::Error for ChainError {}

/// Reported by `solve` when no usable answer exists.
#[derive(Debug)]
pub enum SolveError {
    /// The seed configuration does not match the chain. Detected before any
    /// worker is dispatched.
    WrongDimension { expected: usize, found: usize },
    /// Both strategies exhausted the deadline without producing a solution.
    /// The caller keeps the seed configuration.
    NoSolution,
}

impl std::fmt::Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            SolveError::WrongDimension { expected, found } => write!(
                f,
                "Wrong seed dimension: chain has {} joints, seed has {}",
                expected, found
            ),
            SolveError::NoSolution => write!(f, "No solution found within the time budget"),
        }
    }
}

impl std::error::Error for SolveError {}
