//! Objective function trait and evaluation policy.
//!
//! The optimizer treats the objective as an opaque scalar function over a
//! position vector: possibly expensive, possibly noisy, never assumed
//! differentiable. Failed or non-finite evaluations are not errors at the
//! run level; they are mapped to `f64::INFINITY` in one place so that a
//! strict `<` comparison can never pick them over a finite candidate.

use ndarray::Array1;

use crate::error::Result;

/// A scalar objective function to be minimized.
///
/// Implement this trait for problem structs that carry data, or use any
/// closure `Fn(&Array1<f64>) -> f64` directly via the blanket impl.
pub trait Objective {
    /// Evaluate the objective at the given position.
    ///
    /// Returning an error, NaN, or an infinite value marks the position as
    /// unusable; the optimizer keeps running and never selects it as a
    /// best point.
    fn eval(&self, position: &Array1<f64>) -> Result<f64>;
}

impl<F> Objective for F
where
    F: Fn(&Array1<f64>) -> f64,
{
    fn eval(&self, position: &Array1<f64>) -> Result<f64> {
        Ok(self(position))
    }
}

/// Evaluate an objective and collapse failures into `f64::INFINITY`.
///
/// Errors, NaN, and infinities of either sign all map to positive
/// infinity, which loses every strict `<` comparison against a finite
/// value.
pub fn evaluate(objective: &dyn Objective, position: &Array1<f64>) -> f64 {
    match objective.eval(position) {
        Ok(value) if value.is_finite() => value,
        _ => f64::INFINITY,
    }
}
