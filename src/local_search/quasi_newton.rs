//! Bounded quasi-Newton (BFGS) local refinement.
//!
//! A dense inverse-Hessian BFGS with a numerically approximated gradient
//! and a projected backtracking line search. The refiner is budgeted: it
//! never spends more than `maxfun` objective evaluations, and when the
//! budget runs out before convergence it returns the best point seen so
//! far instead of failing.

use ndarray::{Array1, Array2, Axis};
use rand::Rng;

use crate::bounds::SearchSpace;
use crate::local_search::{LocalSearch, Refinement};
use crate::objective::{evaluate, Objective};
use crate::utils::finite_difference;

/// Sufficient-decrease constant for the Armijo condition.
const ARMIJO_C1: f64 = 1e-4;

/// Maximum number of step halvings in one line search.
const MAX_BACKTRACKS: usize = 16;

/// Curvature floor below which the BFGS update is skipped.
const CURVATURE_FLOOR: f64 = 1e-10;

/// Bounded BFGS minimizer with a hard evaluation budget.
#[derive(Debug, Clone)]
pub struct QuasiNewton {
    /// Maximum number of objective evaluations per refinement call.
    maxfun: usize,

    /// Gradient-norm tolerance for convergence.
    gtol: f64,

    /// Relative objective-change tolerance for convergence.
    ftol: f64,
}

impl QuasiNewton {
    /// Create a refiner with the given evaluation budget.
    pub fn new(maxfun: usize) -> Self {
        Self {
            maxfun,
            gtol: 1e-6,
            ftol: 1e-9,
        }
    }

    /// Set the convergence tolerances.
    ///
    /// # Arguments
    ///
    /// * `gtol` - Gradient-norm threshold
    /// * `ftol` - Relative objective-change threshold
    pub fn with_tolerances(mut self, gtol: f64, ftol: f64) -> Self {
        self.gtol = gtol;
        self.ftol = ftol;
        self
    }
}

impl LocalSearch for QuasiNewton {
    fn refine<R: Rng>(
        &self,
        objective: &dyn Objective,
        start: &Array1<f64>,
        region: &SearchSpace,
        _rng: &mut R,
    ) -> Refinement {
        let n = start.len();
        let mut budget = Budget::new(objective, self.maxfun, start);

        let mut x = start.clone();
        let mut fx = budget.eval(&x);

        // A full gradient costs 2n evaluations; without room for one there
        // is nothing more this strategy can do.
        if budget.remaining() < 2 * n {
            return budget.into_refinement();
        }
        let mut grad = finite_difference::gradient(&mut |p| budget.eval(p), &x, region, None);

        let mut h_inv: Array2<f64> = Array2::eye(n);

        loop {
            let grad_norm = grad.dot(&grad).sqrt();
            if grad_norm < self.gtol {
                break;
            }

            // Search direction from the inverse-Hessian approximation; fall
            // back to steepest descent when it stops being a descent
            // direction.
            let mut direction = -h_inv.dot(&grad);
            if direction.dot(&grad) >= 0.0 {
                h_inv = Array2::eye(n);
                direction = -grad.clone();
            }

            // Projected backtracking line search: trial points are clamped
            // onto the region, and the Armijo test uses the realized step.
            let mut alpha = 1.0;
            let mut accepted: Option<(Array1<f64>, f64)> = None;
            for _ in 0..MAX_BACKTRACKS {
                if budget.remaining() == 0 {
                    break;
                }

                let mut trial = &x + &(&direction * alpha);
                region.clamp(&mut trial);
                let f_trial = budget.eval(&trial);

                let step = &trial - &x;
                if f_trial <= fx + ARMIJO_C1 * grad.dot(&step) {
                    accepted = Some((trial, f_trial));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new)) = accepted else {
                break;
            };

            let step = &x_new - &x;
            let step_norm = step.dot(&step).sqrt();
            let f_change = (fx - f_new).abs();

            if budget.remaining() < 2 * n {
                break;
            }
            let grad_new =
                finite_difference::gradient(&mut |p| budget.eval(p), &x_new, region, None);

            // BFGS inverse-Hessian update, skipped when the curvature
            // condition fails (projection onto the region can break it).
            let y = &grad_new - &grad;
            let ys = y.dot(&step);
            if ys > CURVATURE_FLOOR {
                let rho = 1.0 / ys;
                let s_col = step.view().insert_axis(Axis(1));
                let s_row = step.view().insert_axis(Axis(0));
                let y_col = y.view().insert_axis(Axis(1));
                let y_row = y.view().insert_axis(Axis(0));

                let identity: Array2<f64> = Array2::eye(n);
                let left = &identity - &(s_col.dot(&y_row) * rho);
                let right = &identity - &(y_col.dot(&s_row) * rho);
                h_inv = left.dot(&h_inv).dot(&right) + s_col.dot(&s_row) * rho;
            }

            x = x_new;
            fx = f_new;
            grad = grad_new;

            if step_norm == 0.0 || f_change <= self.ftol * (1.0 + fx.abs()) {
                break;
            }
        }

        budget.into_refinement()
    }
}

/// Evaluation accountant: counts calls against the budget and tracks the
/// best point observed, which is what a budgeted refinement returns.
struct Budget<'a> {
    objective: &'a dyn Objective,
    limit: usize,
    used: usize,
    best_value: f64,
    best_position: Array1<f64>,
}

impl<'a> Budget<'a> {
    fn new(objective: &'a dyn Objective, limit: usize, start: &Array1<f64>) -> Self {
        Self {
            objective,
            limit,
            used: 0,
            best_value: f64::INFINITY,
            best_position: start.clone(),
        }
    }

    fn remaining(&self) -> usize {
        self.limit - self.used
    }

    fn eval(&mut self, position: &Array1<f64>) -> f64 {
        self.used += 1;
        let value = evaluate(self.objective, position);
        if value < self.best_value {
            self.best_value = value;
            self.best_position.assign(position);
        }
        value
    }

    fn into_refinement(self) -> Refinement {
        Refinement {
            position: self.best_position,
            value: self.best_value,
            func_evals: self.used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn refine_quadratic(start: f64, region: (f64, f64), maxfun: usize) -> Refinement {
        let objective = |x: &Array1<f64>| (x[0] - 5.0).powi(2);
        let region = SearchSpace::new(vec![region]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        QuasiNewton::new(maxfun).refine(&objective, &array![start], &region, &mut rng)
    }

    #[test]
    fn test_finds_interior_minimum() {
        let result = refine_quadratic(4.2, (4.0, 6.0), 50);
        assert_relative_eq!(result.position[0], 5.0, epsilon = 1e-4);
        assert!(result.value < 1e-8);
    }

    #[test]
    fn test_stops_at_region_edge_when_minimum_is_outside() {
        // The true minimum (5.0) lies outside the region [0, 1].
        let result = refine_quadratic(0.5, (0.0, 1.0), 50);
        assert_relative_eq!(result.position[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(result.value, 16.0, epsilon = 1e-3);
    }

    #[test]
    fn test_respects_evaluation_budget() {
        struct Counting {
            calls: AtomicUsize,
        }
        impl Objective for Counting {
            fn eval(&self, x: &Array1<f64>) -> crate::error::Result<f64> {
                self.calls.fetch_add(1, Ordering::Relaxed);
                Ok((x[0] - 5.0).powi(2) + x[1].powi(2))
            }
        }

        let objective = Counting {
            calls: AtomicUsize::new(0),
        };
        let region = SearchSpace::new(vec![(0.0, 10.0), (-1.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        for maxfun in [1, 3, 7, 20] {
            objective.calls.store(0, Ordering::Relaxed);
            let result =
                QuasiNewton::new(maxfun).refine(&objective, &array![0.0, 0.5], &region, &mut rng);
            let calls = objective.calls.load(Ordering::Relaxed);
            assert!(calls <= maxfun, "maxfun {} exceeded: {}", maxfun, calls);
            assert_eq!(result.func_evals, calls);
            assert!(region.contains(&result.position));
        }
    }

    #[test]
    fn test_never_returns_worse_than_start() {
        let result = refine_quadratic(9.0, (8.0, 10.0), 30);
        assert!(result.value <= 16.0);
        assert!(result.position[0] >= 8.0 && result.position[0] <= 10.0);
    }

    #[test]
    fn test_survives_non_finite_objective() {
        let objective = |_: &Array1<f64>| f64::NAN;
        let region = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let result = QuasiNewton::new(10).refine(&objective, &array![0.5], &region, &mut rng);
        assert!(result.value.is_infinite());
        assert_eq!(result.position, array![0.5]);
        assert!(result.func_evals <= 10);
    }
}
