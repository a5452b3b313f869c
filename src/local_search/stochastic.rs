//! Stochastic sample-and-pick local refinement.
//!
//! The cheap counterpart to the quasi-Newton strategy: spend the whole
//! evaluation budget on uniform draws inside the refinement region and
//! keep the argmin. No gradient estimation, higher-variance output.

use ndarray::Array1;
use rand::Rng;

use crate::bounds::SearchSpace;
use crate::local_search::{LocalSearch, Refinement};
use crate::objective::{evaluate, Objective};

/// Uniform random sampler over the refinement region.
#[derive(Debug, Clone)]
pub struct StochasticSearch {
    /// Total number of objective evaluations per refinement call,
    /// including the one spent on the start point.
    samples: usize,
}

impl StochasticSearch {
    /// Create a sampler with the given evaluation budget.
    pub fn new(samples: usize) -> Self {
        Self { samples }
    }
}

impl LocalSearch for StochasticSearch {
    fn refine<R: Rng>(
        &self,
        objective: &dyn Objective,
        start: &Array1<f64>,
        region: &SearchSpace,
        rng: &mut R,
    ) -> Refinement {
        // The start point is the first candidate, so the refined result is
        // never worse than where the particle already stands.
        let mut best_position = start.clone();
        let mut best_value = evaluate(objective, start);
        let mut func_evals = 1;

        while func_evals < self.samples {
            let candidate = region.random_point(rng);
            let value = evaluate(objective, &candidate);
            func_evals += 1;

            if value < best_value {
                best_value = value;
                best_position = candidate;
            }
        }

        Refinement {
            position: best_position,
            value: best_value,
            func_evals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    #[test]
    fn test_result_never_worse_than_start() {
        let objective = |x: &Array1<f64>| (x[0] - 5.0).powi(2) + x[1].powi(2);
        let space = SearchSpace::new(vec![(0.0, 10.0), (-2.0, 2.0)]).unwrap();
        let start = array![4.0, 1.0];
        let start_value = objective(&start);
        let mut rng = StdRng::seed_from_u64(3);

        let region = space.local_subregion(&start, &array![1.0, 0.5]);
        let result = StochasticSearch::new(25).refine(&objective, &start, &region, &mut rng);

        assert!(result.value <= start_value);
        assert!(region.contains(&result.position));
        assert_eq!(result.func_evals, 25);
    }

    #[test]
    fn test_spends_exactly_the_budget() {
        let calls = Cell::new(0usize);
        let objective = |x: &Array1<f64>| {
            calls.set(calls.get() + 1);
            x[0].abs()
        };
        let region = SearchSpace::new(vec![(-1.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(9);

        let result = StochasticSearch::new(7).refine(&objective, &array![0.9], &region, &mut rng);
        assert_eq!(calls.get(), 7);
        assert_eq!(result.func_evals, 7);

        // A budget of one evaluates only the start point.
        calls.set(0);
        let result = StochasticSearch::new(1).refine(&objective, &array![0.9], &region, &mut rng);
        assert_eq!(calls.get(), 1);
        assert_eq!(result.position, array![0.9]);
    }

    #[test]
    fn test_non_finite_values_are_never_selected() {
        // Finite only on the right half of the region; the start point
        // itself evaluates to NaN.
        let objective = |x: &Array1<f64>| {
            if x[0] < 0.5 {
                f64::NAN
            } else {
                x[0]
            }
        };
        let region = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(17);

        let result = StochasticSearch::new(50).refine(&objective, &array![0.1], &region, &mut rng);
        assert!(result.value.is_finite());
        assert!(result.position[0] >= 0.5);
    }
}
