//! The particle swarm and its iteration loop.
//!
//! The swarm couples a classic PSO position/velocity update with a bounded
//! local refinement of every particle, every sweep. That pairing targets
//! objectives that are globally structured but locally noisy: the swarm
//! tracks the global structure while the refiner keeps individual
//! particles from settling into shallow local texture.
//!
//! Each sweep reads a frozen snapshot of the global best, updates every
//! particle against it (sequentially or fanned out over rayon), and only
//! then lets a single writer recompute the global best from the collected
//! personal bests. The last sweep always refines with the quasi-Newton
//! strategy so the reported optimum is a polished one.

use std::fmt;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::bounds::SearchSpace;
use crate::error::{PsOptError, Result};
use crate::local_search::{LocalMethod, LocalSearch, QuasiNewton, StochasticSearch};
use crate::objective::{evaluate, Objective};
use crate::parameters::PsoParams;

mod particle;

pub use particle::Particle;

/// Result of a swarm optimization run.
#[derive(Debug, Clone)]
pub struct SwarmResult {
    /// The best position found.
    pub best_position: Array1<f64>,

    /// The objective value at the best position; `f64::INFINITY` if no
    /// evaluation anywhere in the run produced a finite value.
    pub best_value: f64,

    /// The number of sweeps performed.
    pub iterations: usize,

    /// The total number of objective evaluations.
    pub func_evals: usize,
}

impl fmt::Display for SwarmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Particle Swarm Optimization Result:")?;
        writeln!(f, "  Best value: {:.6e}", self.best_value)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        write!(f, "  Best position: {:?}", self.best_position)
    }
}

/// Particle swarm optimizer with per-particle local refinement.
///
/// # Example
///
/// ```
/// use ndarray::Array1;
/// use psopt_rs::{ParticleSwarm, PsoParams, SearchSpace};
///
/// let space = SearchSpace::new(vec![(0.0, 10.0)]).unwrap();
/// let swarm = ParticleSwarm::new(10, space, PsoParams::default()).unwrap();
///
/// let objective = |x: &Array1<f64>| (x[0] - 5.0).powi(2);
/// let result = swarm.optimize(&objective, 20).unwrap();
///
/// assert!((result.best_position[0] - 5.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct ParticleSwarm {
    n_particles: usize,
    space: SearchSpace,
    params: PsoParams,
    method: LocalMethod,
    seed: u64,
    parallel: bool,
    verbosity: usize,
}

impl ParticleSwarm {
    /// Create a swarm over the given search space.
    ///
    /// All configuration is validated here, before any particle exists or
    /// any objective evaluation happens.
    ///
    /// # Arguments
    ///
    /// * `n_particles` - Number of particles, at least 1
    /// * `space` - The bounded search space
    /// * `params` - Swarm and refinement parameters
    ///
    /// # Returns
    ///
    /// * The configured swarm, or a configuration error
    pub fn new(n_particles: usize, space: SearchSpace, params: PsoParams) -> Result<Self> {
        if n_particles == 0 {
            return Err(PsOptError::InvalidParameter(
                "n_particles must be at least 1".to_string(),
            ));
        }
        params.validate(space.ndim())?;

        Ok(Self {
            n_particles,
            space,
            params,
            method: LocalMethod::Minimize,
            seed: 42,
            parallel: false,
            verbosity: 0,
        })
    }

    /// Set the local refinement strategy used between sweeps.
    ///
    /// The final sweep always uses the quasi-Newton strategy regardless of
    /// this setting.
    pub fn with_local_method(mut self, method: LocalMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the random seed for reproducibility.
    ///
    /// Runs with the same seed and configuration produce identical
    /// results, whether updates run sequentially or in parallel.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fan particle updates out over the rayon thread pool.
    ///
    /// Each particle update reads only the frozen global-best snapshot and
    /// its own state, so the fan-out needs no synchronization beyond the
    /// per-sweep barrier; results are identical to the sequential path.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the progress-reporting level; 0 (the default) is silent.
    ///
    /// Purely observational, no effect on results.
    pub fn with_verbosity(mut self, verbosity: usize) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Run the optimization for a fixed number of sweeps.
    ///
    /// # Arguments
    ///
    /// * `objective` - The function to minimize
    /// * `n_iterations` - Number of sweeps over the swarm, at least 1
    ///
    /// # Returns
    ///
    /// * The best value/position found, or a configuration error
    pub fn optimize<O>(&self, objective: &O, n_iterations: usize) -> Result<SwarmResult>
    where
        O: Objective + Sync,
    {
        if n_iterations == 0 {
            return Err(PsOptError::InvalidParameter(
                "n_iterations must be at least 1".to_string(),
            ));
        }

        let radii = self.params.search_radii(&self.space.widths())?;
        let quasi_newton = QuasiNewton::new(self.params.maxfun);
        let stochastic = StochasticSearch::new(self.params.maxfun);

        // Initialize the swarm and evaluate the starting positions.
        let mut particles: Vec<Particle> = (0..self.n_particles)
            .map(|i| Particle::new(&self.space, &mut self.particle_rng(0, i)))
            .collect();

        let initial_values: Vec<f64> = if self.parallel {
            particles
                .par_iter()
                .map(|p| evaluate(objective, &p.position))
                .collect()
        } else {
            particles
                .iter()
                .map(|p| evaluate(objective, &p.position))
                .collect()
        };
        for (particle, value) in particles.iter_mut().zip(initial_values) {
            particle.record_current(value);
        }

        let mut func_evals = self.n_particles;
        let (mut best_value, mut best_position) = global_best(&particles);

        for sweep in 0..n_iterations {
            let last_sweep = sweep + 1 == n_iterations;
            let method = if last_sweep {
                LocalMethod::Minimize
            } else {
                self.method
            };

            // Frozen snapshot: every particle in this sweep sees the same
            // global best, no matter in which order updates run.
            let snapshot = best_position.clone();

            let step = |index: usize, particle: &mut Particle| -> usize {
                let mut rng = self.particle_rng(sweep + 1, index);

                particle.update_velocity(&snapshot, &self.params, &mut rng);
                particle.advance(&self.space, self.params.beta);

                let region = self.space.local_subregion(&particle.position, &radii);
                let refined = match method {
                    LocalMethod::Minimize => {
                        quasi_newton.refine(objective, &particle.position, &region, &mut rng)
                    }
                    LocalMethod::Stochastic => {
                        stochastic.refine(objective, &particle.position, &region, &mut rng)
                    }
                };

                particle.position = refined.position;
                particle.record_current(refined.value);
                refined.func_evals
            };

            let sweep_evals: usize = if self.parallel {
                particles
                    .par_iter_mut()
                    .enumerate()
                    .map(|(i, p)| step(i, p))
                    .sum()
            } else {
                particles
                    .iter_mut()
                    .enumerate()
                    .map(|(i, p)| step(i, p))
                    .sum()
            };
            func_evals += sweep_evals;

            // Single writer after the barrier: recompute the global best
            // from the collected personal bests.
            let (value, position) = global_best(&particles);
            best_value = value;
            best_position = position;

            if self.verbosity > 0 {
                println!(
                    "sweep {:>4}/{}: best value {:.6e}",
                    sweep + 1,
                    n_iterations,
                    best_value
                );
            }
        }

        Ok(SwarmResult {
            best_position,
            best_value,
            iterations: n_iterations,
            func_evals,
        })
    }

    /// Deterministic per-(sweep, particle) random stream.
    ///
    /// Seeding by sweep and particle index keeps parallel and sequential
    /// runs bit-identical; sweep 0 is reserved for initialization.
    fn particle_rng(&self, sweep: usize, index: usize) -> StdRng {
        let stream = (sweep * self.n_particles + index) as u64;
        StdRng::seed_from_u64(self.seed.wrapping_add(stream))
    }
}

/// The lowest personal best in the swarm; the lowest particle index wins
/// ties, so results do not depend on update order.
fn global_best(particles: &[Particle]) -> (f64, Array1<f64>) {
    let mut best = &particles[0];
    for particle in &particles[1..] {
        if particle.best_value < best.best_value {
            best = particle;
        }
    }
    (best.best_value, best.best_position.clone())
}

/// Run a particle swarm optimization over the given bounds.
///
/// Convenience wrapper around [`ParticleSwarm`] with the default seed,
/// quasi-Newton refinement, and sequential execution.
///
/// # Arguments
///
/// * `objective` - The function to minimize
/// * `bounds` - Per-dimension `(lower, upper)` pairs
/// * `params` - Swarm and refinement parameters
/// * `n_particles` - Number of particles
/// * `n_iterations` - Number of sweeps
///
/// # Returns
///
/// * The best solution found, or a configuration error
pub fn optimize<O>(
    objective: &O,
    bounds: Vec<(f64, f64)>,
    params: PsoParams,
    n_particles: usize,
    n_iterations: usize,
) -> Result<SwarmResult>
where
    O: Objective + Sync,
{
    let space = SearchSpace::new(bounds)?;
    ParticleSwarm::new(n_particles, space, params)?.optimize(objective, n_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_particle_converges_on_quadratic() {
        let space = SearchSpace::new(vec![(0.0, 10.0)]).unwrap();
        let swarm = ParticleSwarm::new(1, space, PsoParams::default()).unwrap();

        let objective = |x: &Array1<f64>| (x[0] - 5.0).powi(2);
        let result = swarm.optimize(&objective, 20).unwrap();

        assert!(result.best_value < 1e-3);
        assert!((result.best_position[0] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_rejects_zero_particles_and_zero_iterations() {
        let space = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        assert!(ParticleSwarm::new(0, space.clone(), PsoParams::default()).is_err());

        let swarm = ParticleSwarm::new(1, space, PsoParams::default()).unwrap();
        let objective = |x: &Array1<f64>| x[0];
        assert!(swarm.optimize(&objective, 0).is_err());
    }

    #[test]
    fn test_invalid_parameters_fail_before_any_evaluation() {
        let space = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        let params = PsoParams::default().with_damping(2.0);

        match ParticleSwarm::new(4, space, params) {
            Err(PsOptError::InvalidParameter(msg)) => assert!(msg.contains("beta")),
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_result_display() {
        let result = SwarmResult {
            best_position: array![1.0, 2.0],
            best_value: 0.5,
            iterations: 10,
            func_evals: 420,
        };
        let text = format!("{}", result);
        assert!(text.contains("Best value"));
        assert!(text.contains("420"));
    }
}
