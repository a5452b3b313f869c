//! Algorithm parameters for the particle swarm and its local refinement.
//!
//! Parameters are a plain record with builder-style setters and a single
//! `validate` entry point, so a misconfigured run fails before any particle
//! is created or any objective evaluation happens. The record serializes
//! to/from JSON for storing tuned configurations alongside results.

use std::fs::File;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{PsOptError, Result};

/// Fraction of each dimension's bound width used as the local-refinement
/// search radius.
///
/// A single value is broadcast to every dimension; a sequence gives one
/// fraction per dimension and must match the problem dimensionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimScale {
    /// One fraction applied to all dimensions.
    Uniform(f64),
    /// One fraction per dimension.
    PerDimension(Vec<f64>),
}

/// Parameters controlling the swarm update and the local refinement budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PsoParams {
    /// Cognitive coefficient: pull toward the particle's own best position.
    pub c1: f64,

    /// Social coefficient: pull toward the swarm's best position.
    pub c2: f64,

    /// Inertia coefficient applied to the previous velocity.
    pub w: f64,

    /// Velocity damping factor applied on boundary reflection, in (0, 1).
    pub beta: f64,

    /// Evaluation budget for one local refinement call: the quasi-Newton
    /// function-call cap, or the number of stochastic samples.
    pub maxfun: usize,

    /// Local-refinement search radius as a fraction of bound width per
    /// dimension, each in (0, 1].
    pub dim_scale: DimScale,
}

impl Default for PsoParams {
    fn default() -> Self {
        Self {
            c1: 0.5,
            c2: 0.3,
            w: 0.6,
            beta: 0.3,
            maxfun: 20,
            dim_scale: DimScale::Uniform(0.1),
        }
    }
}

impl PsoParams {
    /// Create parameters with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cognitive coefficient (c1).
    pub fn with_cognitive(mut self, c1: f64) -> Self {
        self.c1 = c1;
        self
    }

    /// Set the social coefficient (c2).
    pub fn with_social(mut self, c2: f64) -> Self {
        self.c2 = c2;
        self
    }

    /// Set the inertia coefficient (w).
    pub fn with_inertia(mut self, w: f64) -> Self {
        self.w = w;
        self
    }

    /// Set the reflection damping factor (beta).
    pub fn with_damping(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set the local refinement evaluation budget.
    pub fn with_maxfun(mut self, maxfun: usize) -> Self {
        self.maxfun = maxfun;
        self
    }

    /// Set a single search-radius fraction broadcast to all dimensions.
    pub fn with_dim_scale(mut self, scale: f64) -> Self {
        self.dim_scale = DimScale::Uniform(scale);
        self
    }

    /// Set one search-radius fraction per dimension.
    pub fn with_dim_scales(mut self, scales: Vec<f64>) -> Self {
        self.dim_scale = DimScale::PerDimension(scales);
        self
    }

    /// Check every field against its declared domain.
    ///
    /// # Arguments
    ///
    /// * `ndim` - Problem dimensionality, used to check per-dimension scales
    ///
    /// # Returns
    ///
    /// * `Ok(())`, or the first violation as a configuration error
    pub fn validate(&self, ndim: usize) -> Result<()> {
        if !(self.c1 > 0.0 && self.c1.is_finite()) {
            return Err(PsOptError::InvalidParameter(format!(
                "c1 must be a positive finite number, got {}",
                self.c1
            )));
        }
        if !(self.c2 > 0.0 && self.c2.is_finite()) {
            return Err(PsOptError::InvalidParameter(format!(
                "c2 must be a positive finite number, got {}",
                self.c2
            )));
        }
        if !self.w.is_finite() {
            return Err(PsOptError::InvalidParameter(format!(
                "w must be finite, got {}",
                self.w
            )));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(PsOptError::InvalidParameter(format!(
                "beta must be in (0, 1), got {}",
                self.beta
            )));
        }
        if self.maxfun < 1 {
            return Err(PsOptError::InvalidParameter(
                "maxfun must be at least 1".to_string(),
            ));
        }

        match &self.dim_scale {
            DimScale::Uniform(scale) => {
                check_scale(*scale, None)?;
            }
            DimScale::PerDimension(scales) => {
                if scales.len() != ndim {
                    return Err(PsOptError::DimensionMismatch(format!(
                        "Expected {} dim_scale entries, got {}",
                        ndim,
                        scales.len()
                    )));
                }
                for (d, &scale) in scales.iter().enumerate() {
                    check_scale(scale, Some(d))?;
                }
            }
        }

        Ok(())
    }

    /// Per-dimension refinement radii: `dim_scale_d * width_d`.
    ///
    /// # Arguments
    ///
    /// * `widths` - Per-dimension bound widths of the global space
    pub fn search_radii(&self, widths: &Array1<f64>) -> Result<Array1<f64>> {
        match &self.dim_scale {
            DimScale::Uniform(scale) => Ok(widths * *scale),
            DimScale::PerDimension(scales) => {
                if scales.len() != widths.len() {
                    return Err(PsOptError::DimensionMismatch(format!(
                        "Expected {} dim_scale entries, got {}",
                        widths.len(),
                        scales.len()
                    )));
                }
                Ok(widths
                    .iter()
                    .zip(scales.iter())
                    .map(|(&width, &scale)| width * scale)
                    .collect())
            }
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the parameters to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Read parameters from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }
}

fn check_scale(scale: f64, dimension: Option<usize>) -> Result<()> {
    if scale > 0.0 && scale <= 1.0 {
        return Ok(());
    }
    let detail = match dimension {
        Some(d) => format!("dim_scale for dimension {} must be in (0, 1], got {}", d, scale),
        None => format!("dim_scale must be in (0, 1], got {}", scale),
    };
    Err(PsOptError::InvalidParameter(detail))
}
