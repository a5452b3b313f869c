//! Finite difference methods for numerical differentiation.
//!
//! The quasi-Newton refiner never assumes an analytic gradient; it
//! approximates one with central differences, keeping every probe point
//! inside the refinement region.

use ndarray::Array1;

use crate::bounds::SearchSpace;

/// Default step size for finite differences.
const DEFAULT_EPSILON: f64 = 1e-8;

/// Compute the gradient of a scalar function using central finite
/// differences, constrained to a bounded region.
///
/// The step is adapted to each coordinate's scale. Probe points are
/// projected onto the region, and the quotient divides by the realized
/// spread between them, so the estimate stays meaningful at the region
/// edge. Each call costs at most `2 * D` function evaluations.
///
/// # Arguments
///
/// * `f` - The function to differentiate; called only at in-region points
/// * `point` - Where to evaluate the gradient; must lie inside the region
/// * `region` - Box the probe points are confined to
/// * `epsilon` - Step size for finite differences (optional)
///
/// # Returns
///
/// * The gradient vector
pub fn gradient<F>(
    f: &mut F,
    point: &Array1<f64>,
    region: &SearchSpace,
    epsilon: Option<f64>,
) -> Array1<f64>
where
    F: FnMut(&Array1<f64>) -> f64,
{
    let eps = epsilon.unwrap_or(DEFAULT_EPSILON);
    let n = point.len();

    let mut grad = Array1::zeros(n);

    for j in 0..n {
        let (lower, upper) = region.bounds()[j];
        let x_j = point[j];

        // Adapt epsilon to parameter scale
        let eps_j = if x_j.abs() > eps { x_j.abs() * eps } else { eps };

        let forward_j = (x_j + eps_j).min(upper);
        let backward_j = (x_j - eps_j).max(lower);
        let spread = forward_j - backward_j;
        if spread <= 0.0 {
            continue;
        }

        let mut forward = point.clone();
        forward[j] = forward_j;
        let mut backward = point.clone();
        backward[j] = backward_j;

        grad[j] = (f(&forward) - f(&backward)) / spread;
    }

    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_gradient_of_quadratic() {
        let region = SearchSpace::new(vec![(-10.0, 10.0), (-10.0, 10.0)]).unwrap();
        let mut f = |x: &Array1<f64>| (x[0] - 1.0).powi(2) + 3.0 * x[1].powi(2);

        let grad = gradient(&mut f, &array![2.0, -1.0], &region, None);

        assert_relative_eq!(grad[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(grad[1], -6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_gradient_probes_stay_inside_region() {
        let region = SearchSpace::new(vec![(0.0, 1.0)]).unwrap();
        let mut min_seen = f64::INFINITY;
        let mut max_seen = f64::NEG_INFINITY;
        let mut f = |x: &Array1<f64>| {
            min_seen = min_seen.min(x[0]);
            max_seen = max_seen.max(x[0]);
            x[0] * x[0]
        };

        // Evaluating exactly at the edge must not probe outside of it.
        let grad = gradient(&mut f, &array![0.0], &region, None);
        assert!(min_seen >= 0.0 && max_seen <= 1.0);
        assert_relative_eq!(grad[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_gradient_evaluation_count() {
        let region = SearchSpace::new(vec![(-1.0, 1.0), (-1.0, 1.0), (-1.0, 1.0)]).unwrap();
        let mut calls = 0usize;
        let mut f = |x: &Array1<f64>| {
            calls += 1;
            x.sum()
        };

        gradient(&mut f, &array![0.0, 0.0, 0.0], &region, None);
        assert_eq!(calls, 6);
    }
}
