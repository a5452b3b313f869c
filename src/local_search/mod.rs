//! Bounded local refinement strategies.
//!
//! After every swarm move a particle's position is polished inside a small
//! sub-region of the search space. Two interchangeable strategies implement
//! the same `refine` contract: a quasi-Newton descent for quality, and a
//! uniform sample-and-pick for cheapness. The swarm substitutes one for the
//! other at call time, so the final-sweep guarantee (always quasi-Newton)
//! costs a single branch.

use std::fmt;
use std::str::FromStr;

use ndarray::Array1;
use rand::Rng;

use crate::bounds::SearchSpace;
use crate::error::{PsOptError, Result};
use crate::objective::Objective;

mod quasi_newton;
mod stochastic;

pub use quasi_newton::QuasiNewton;
pub use stochastic::StochasticSearch;

/// Outcome of one local refinement call.
#[derive(Debug, Clone)]
pub struct Refinement {
    /// The best position found, always inside the refinement region.
    pub position: Array1<f64>,

    /// Objective value at that position; `f64::INFINITY` when every
    /// evaluation in the region failed.
    pub value: f64,

    /// Number of objective evaluations spent.
    pub func_evals: usize,
}

/// A bounded local search around a candidate point.
pub trait LocalSearch {
    /// Refine `start` within `region` and return the best point observed.
    ///
    /// Implementations must stay within their evaluation budget, must only
    /// evaluate points inside `region`, and must return their best-so-far
    /// result instead of failing when they cannot converge.
    fn refine<R: Rng>(
        &self,
        objective: &dyn Objective,
        start: &Array1<f64>,
        region: &SearchSpace,
        rng: &mut R,
    ) -> Refinement;
}

/// Which refinement strategy the swarm uses between sweeps.
///
/// The last sweep of a run always uses `Minimize` regardless of this
/// setting, so the reported result is a polished local optimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMethod {
    /// Bounded quasi-Newton minimization.
    Minimize,

    /// Uniform sampling inside the refinement region.
    Stochastic,
}

impl FromStr for LocalMethod {
    type Err = PsOptError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "minimize" => Ok(LocalMethod::Minimize),
            "stochastic" => Ok(LocalMethod::Stochastic),
            other => Err(PsOptError::InvalidParameter(format!(
                "unknown local search method '{}', expected 'minimize' or 'stochastic'",
                other
            ))),
        }
    }
}

impl fmt::Display for LocalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalMethod::Minimize => write!(f, "minimize"),
            LocalMethod::Stochastic => write!(f, "stochastic"),
        }
    }
}
