//! # psopt-rs
//!
//! `psopt-rs` is a Rust implementation of particle swarm optimization with
//! per-particle bounded local refinement, for gradient-free global
//! minimization of scalar objectives over box-bounded continuous domains.
//!
//! The library provides:
//! - A PSO velocity/position update with reflective boundary handling
//! - Two interchangeable local refinement strategies: a budgeted
//!   quasi-Newton (BFGS) descent and a stochastic sample-and-pick
//! - A guaranteed quasi-Newton polish on the final sweep, so the reported
//!   result is a verified local optimum even for stochastic runs
//! - Deterministic seeding, with optional parallel particle updates that
//!   reproduce the sequential results exactly
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::Array1;
//! use psopt_rs::{optimize, PsoParams};
//!
//! // A noisy-looking 1-D objective with its minimum at x = 5.
//! let objective = |x: &Array1<f64>| (x[0] - 5.0).powi(2);
//!
//! let result = optimize(&objective, vec![(0.0, 10.0)], PsoParams::default(), 10, 20).unwrap();
//!
//! assert!((result.best_position[0] - 5.0).abs() < 1e-2);
//! ```

pub mod bounds;
pub mod error;
pub mod local_search;
pub mod objective;
pub mod parameters;
pub mod swarm;

mod utils;

// Re-exports for convenience
pub use bounds::SearchSpace;
pub use error::{PsOptError, Result};
pub use local_search::{LocalMethod, LocalSearch, QuasiNewton, Refinement, StochasticSearch};
pub use objective::Objective;
pub use parameters::{DimScale, PsoParams};
pub use swarm::{optimize, Particle, ParticleSwarm, SwarmResult};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn version_is_set() {
        assert!(!super::VERSION.is_empty());
    }
}
