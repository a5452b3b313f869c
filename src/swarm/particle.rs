//! A single swarm particle: position, velocity, and personal-best memory.

use ndarray::Array1;
use rand::Rng;

use crate::bounds::SearchSpace;
use crate::parameters::PsoParams;

/// One candidate solution moving through the search space.
///
/// The position is always inside the bounds after any update; the
/// personal best records the lowest objective value this particle has
/// ever stood on, together with where that was.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current position, inside the search space.
    pub position: Array1<f64>,

    /// Current velocity.
    pub velocity: Array1<f64>,

    /// Position of the best value this particle has observed.
    pub best_position: Array1<f64>,

    /// Best (lowest) objective value observed; `f64::INFINITY` until the
    /// first successful evaluation.
    pub best_value: f64,
}

impl Particle {
    /// Create a particle at a uniformly random position with zero velocity.
    pub fn new(space: &SearchSpace, rng: &mut impl Rng) -> Self {
        let position = space.random_point(rng);
        Self {
            velocity: Array1::zeros(space.ndim()),
            best_position: position.clone(),
            best_value: f64::INFINITY,
            position,
        }
    }

    /// Apply the velocity transition rule.
    ///
    /// Per dimension, with independent uniform draws `r1`, `r2` in [0, 1):
    /// `v' = w*v + c1*r1*(best - x) + c2*r2*(global_best - x)`.
    ///
    /// # Arguments
    ///
    /// * `global_best` - Swarm-best position snapshot for this sweep
    /// * `params` - Inertia and attraction coefficients
    /// * `rng` - Random source for the per-dimension draws
    pub fn update_velocity(
        &mut self,
        global_best: &Array1<f64>,
        params: &PsoParams,
        rng: &mut impl Rng,
    ) {
        for d in 0..self.position.len() {
            let r1: f64 = rng.gen();
            let r2: f64 = rng.gen();

            let cognitive = params.c1 * r1 * (self.best_position[d] - self.position[d]);
            let social = params.c2 * r2 * (global_best[d] - self.position[d]);

            self.velocity[d] = params.w * self.velocity[d] + cognitive + social;
        }
    }

    /// Move along the current velocity, reflecting off the boundary.
    ///
    /// Out-of-bounds coordinates are folded back inside and their velocity
    /// components damped by `-beta`.
    pub fn advance(&mut self, space: &SearchSpace, beta: f64) {
        self.position += &self.velocity;
        space.reflect(&mut self.position, &mut self.velocity, beta);
    }

    /// Record an evaluation of the current position, updating the personal
    /// best on strict improvement.
    pub fn record_current(&mut self, value: f64) {
        if value < self.best_value {
            self.best_value = value;
            self.best_position.assign(&self.position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_particle_starts_inside_bounds() {
        let space = SearchSpace::new(vec![(0.0, 10.0), (-5.0, -1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(21);

        for _ in 0..20 {
            let particle = Particle::new(&space, &mut rng);
            assert!(space.contains(&particle.position));
            assert_eq!(particle.velocity, array![0.0, 0.0]);
            assert_eq!(particle.best_position, particle.position);
            assert!(particle.best_value.is_infinite());
        }
    }

    #[test]
    fn test_velocity_decays_when_attractors_coincide() {
        // With personal and global best at the current position, only the
        // inertia term survives, independent of the random draws.
        let space = SearchSpace::new(vec![(0.0, 10.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut particle = Particle::new(&space, &mut rng);
        particle.velocity = array![2.0];

        let params = PsoParams::default().with_inertia(0.5);
        let global_best = particle.position.clone();
        particle.update_velocity(&global_best, &params, &mut rng);

        assert_eq!(particle.velocity, array![1.0]);
    }

    #[test]
    fn test_advance_keeps_position_feasible() {
        let space = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(13);
        let mut particle = Particle::new(&space, &mut rng);
        particle.velocity = array![5.0];

        particle.advance(&space, 0.3);
        assert!(space.contains(&particle.position));
    }

    #[test]
    fn test_personal_best_is_monotone() {
        let space = SearchSpace::new(vec![(0.0, 10.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut particle = Particle::new(&space, &mut rng);

        particle.record_current(3.0);
        assert_eq!(particle.best_value, 3.0);

        particle.position = array![1.0];
        particle.record_current(7.0);
        assert_eq!(particle.best_value, 3.0);

        particle.position = array![2.0];
        particle.record_current(1.5);
        assert_eq!(particle.best_value, 1.5);
        assert_eq!(particle.best_position, array![2.0]);
    }

    #[test]
    fn test_non_finite_evaluation_never_becomes_best() {
        let space = SearchSpace::new(vec![(0.0, 10.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut particle = Particle::new(&space, &mut rng);

        particle.record_current(f64::INFINITY);
        assert!(particle.best_value.is_infinite());

        particle.record_current(100.0);
        particle.record_current(f64::INFINITY);
        assert_eq!(particle.best_value, 100.0);
    }
}
