//! Stationary distribution of a normalised generator by uniformised power iteration.
//!
//! The generator `Q` is turned into the stochastic matrix `P = I - Q / l`, with `l` the most
//! negative entry of `Q` scaled by a factor slightly above one so that `P` keeps a positive
//! diagonal and the iteration cannot cycle on a periodic chain.  Starting from the unit vector at
//! state 0, `pi <- pi P P` is repeated until two consecutive vectors are close in L1 norm.
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    instrument,
    warn,
};

use crate::sparse::CsrMatrix;

/// Power-iteration settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// L1 distance between consecutive iterates below which the iteration stops.
    pub tolerance: f64,
    /// Iteration cap; reaching it yields a best-effort result, not an error.
    pub max_iterations: usize,
    /// Scale applied to `min(Q)` so that `P` keeps a positive diagonal; must exceed 1.
    pub periodicity_factor: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { tolerance: 1e-3, max_iterations: 100_000, periodicity_factor: 1.001 }
    }
}

/// Result of [`solve`].
#[derive(Clone, Debug, PartialEq)]
pub struct StationaryDistribution {
    /// Probability of every state; sums to one.
    pub probabilities: Vec<f64>,
    /// Double steps performed.
    pub iterations: usize,
    /// L1 distance between the last two iterates.
    pub residual: f64,
    /// Whether `residual` reached the tolerance before the cap.
    pub converged: bool,
}

/// Stationary distribution of the generator `q`, starting from state 0.
#[instrument(skip_all, fields(nstates = q.nrows()))]
pub fn solve(q: &CsrMatrix, options: &SolverOptions) -> StationaryDistribution {
    let size = q.nrows();
    if size == 0 {
        return StationaryDistribution { probabilities: vec![], iterations: 0, residual: 0.0, converged: true };
    }

    let p = uniformize(q, options.periodicity_factor);

    let mut pi = vec![0.0; size];
    pi[0] = 1.0;
    let mut residual: f64 = 1.0;
    let mut iterations = 0;
    while residual > options.tolerance && iterations < options.max_iterations {
        let half = p.left_mul(&pi);
        pi = p.left_mul(&half);
        residual = l1_distance(&pi, &half);
        iterations += 1;
    }

    let converged = residual <= options.tolerance;
    if converged {
        debug!(iterations, residual, "stationary distribution converged");
    } else {
        warn!(iterations, residual, tolerance = options.tolerance, "iteration cap reached before convergence");
    }

    StationaryDistribution { probabilities: pi, iterations, residual, converged }
}

/// `P = I - Q / l` with `l = min(Q) * factor`.
pub fn uniformize(q: &CsrMatrix, factor: f64) -> CsrMatrix {
    // a generator always stores a negative diagonal; fall back to -1 for an entry-less matrix
    let l = q.min_value().filter(|&v| v < 0.0).unwrap_or(-1.0) * factor;
    q.map_with_diagonal(|r, c, v| if r == c { 1.0 - v / l } else { -v / l })
}

/// Sum of absolute differences.
fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
