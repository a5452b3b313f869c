//! Axis-aligned search-space bounds.
//!
//! This module provides the `SearchSpace` type, a validated box constraint
//! used everywhere a position has to be kept feasible: uniform sampling,
//! reflective boundary handling for particles, and construction of the
//! sub-regions that local refinement is confined to.

use ndarray::Array1;
use rand::Rng;

use crate::error::{PsOptError, Result};

/// A bounded, axis-aligned box in R^D.
///
/// Each dimension carries a finite `(lower, upper)` interval with
/// `lower < upper`. The space is immutable once constructed; every
/// position-repair operation returns or mutates vectors, never the bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    bounds: Vec<(f64, f64)>,
}

impl SearchSpace {
    /// Create a search space from per-dimension `(lower, upper)` pairs.
    ///
    /// # Arguments
    ///
    /// * `bounds` - One `(lower, upper)` pair per dimension
    ///
    /// # Returns
    ///
    /// * The validated space, or a `BoundsError` if the list is empty, any
    ///   endpoint is non-finite, or any `lower >= upper`
    pub fn new(bounds: Vec<(f64, f64)>) -> Result<Self> {
        if bounds.is_empty() {
            return Err(PsOptError::BoundsError(
                "at least one dimension is required".to_string(),
            ));
        }

        for (d, &(lower, upper)) in bounds.iter().enumerate() {
            if !lower.is_finite() || !upper.is_finite() {
                return Err(PsOptError::BoundsError(format!(
                    "dimension {}: bounds must be finite, got [{}, {}]",
                    d, lower, upper
                )));
            }
            if lower >= upper {
                return Err(PsOptError::BoundsError(format!(
                    "dimension {}: lower bound {} must be less than upper bound {}",
                    d, lower, upper
                )));
            }
        }

        Ok(Self { bounds })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.bounds.len()
    }

    /// The per-dimension `(lower, upper)` pairs.
    pub fn bounds(&self) -> &[(f64, f64)] {
        &self.bounds
    }

    /// Per-dimension interval widths.
    pub fn widths(&self) -> Array1<f64> {
        self.bounds.iter().map(|(lower, upper)| upper - lower).collect()
    }

    /// Check whether a point lies inside the box (bounds inclusive).
    pub fn contains(&self, point: &Array1<f64>) -> bool {
        point.len() == self.bounds.len()
            && self
                .bounds
                .iter()
                .zip(point.iter())
                .all(|(&(lower, upper), &x)| x >= lower && x <= upper)
    }

    /// Draw a point uniformly at random inside the box.
    pub fn random_point(&self, rng: &mut impl Rng) -> Array1<f64> {
        self.bounds
            .iter()
            .map(|&(lower, upper)| rng.gen_range(lower..upper))
            .collect()
    }

    /// Project a point onto the box, component-wise.
    pub fn clamp(&self, point: &mut Array1<f64>) {
        for (x, &(lower, upper)) in point.iter_mut().zip(&self.bounds) {
            if *x < lower {
                *x = lower;
            } else if *x > upper {
                *x = upper;
            }
        }
    }

    /// Fold an out-of-bounds position back inside the box and damp the
    /// offending velocity components.
    ///
    /// A coordinate below `lower` is reflected to `lower + (lower - x)`;
    /// one above `upper` to `upper - (x - upper)`. The matching velocity
    /// component is scaled by `-beta`, so a particle that hit a wall loses
    /// kinetic energy instead of oscillating against the boundary.
    /// Dimensions already inside the box are left untouched.
    ///
    /// # Arguments
    ///
    /// * `position` - Candidate position, repaired in place
    /// * `velocity` - Velocity that produced it, damped in place
    /// * `beta` - Damping factor in (0, 1)
    pub fn reflect(&self, position: &mut Array1<f64>, velocity: &mut Array1<f64>, beta: f64) {
        for (d, &(lower, upper)) in self.bounds.iter().enumerate() {
            let x = position[d];
            if x < lower {
                // A step wider than the box can overshoot the far edge even
                // after reflecting; fold the remainder onto that edge.
                position[d] = (lower + (lower - x)).min(upper);
                velocity[d] = -beta * velocity[d];
            } else if x > upper {
                position[d] = (upper - (x - upper)).max(lower);
                velocity[d] = -beta * velocity[d];
            }
        }
    }

    /// The sub-box of the given radii around `center`, intersected with
    /// this space.
    ///
    /// Per dimension the result is `[max(lower, c - r), min(upper, c + r)]`,
    /// so the sub-region never exceeds the global bounds. The construction
    /// is pure: the same center and radii always produce the same region.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the sub-region; must lie inside the space
    /// * `radii` - Per-dimension half-widths, each strictly positive
    pub fn local_subregion(&self, center: &Array1<f64>, radii: &Array1<f64>) -> SearchSpace {
        let bounds = self
            .bounds
            .iter()
            .zip(center.iter().zip(radii.iter()))
            .map(|(&(lower, upper), (&c, &r))| (lower.max(c - r), upper.min(c + r)))
            .collect();

        SearchSpace { bounds }
    }
}
