//! The weighted curve-fitting problem handed to the optimizer.

use ndarray::{Array1, Array2};

use crate::error::{FitLabError, Result};
use crate::models::ModelFunction;
use crate::parameters::BoundsTransform;
use crate::problem::Problem;
use crate::utils::finite_difference;

/// Residuals `sqrt(w)·(f(x, θ) - y)`, optionally in bounded internal
/// coordinates.
pub struct CurveProblem<'a> {
    x: &'a Array1<f64>,
    y: &'a Array1<f64>,
    sqrt_weights: Option<Array1<f64>>,
    model: &'a ModelFunction,
    transforms: Option<Vec<BoundsTransform>>,
    n_params: usize,
    fd_epsilon: f64,
}

impl<'a> CurveProblem<'a> {
    pub fn new(
        x: &'a Array1<f64>,
        y: &'a Array1<f64>,
        weights: Option<&Array1<f64>>,
        model: &'a ModelFunction,
        n_params: usize,
        fd_epsilon: f64,
    ) -> Self {
        Self {
            x,
            y,
            sqrt_weights: weights.map(|w| w.mapv(f64::sqrt)),
            model,
            transforms: None,
            n_params,
            fd_epsilon,
        }
    }

    /// Optimize in internal coordinates so the model only sees in-bounds values.
    pub fn with_transforms(mut self, transforms: Vec<BoundsTransform>) -> Self {
        self.transforms = Some(transforms);
        self
    }

    /// The same problem in external coordinates.
    pub fn unbounded(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            sqrt_weights: self.sqrt_weights.clone(),
            model: self.model,
            transforms: None,
            n_params: self.n_params,
            fd_epsilon: self.fd_epsilon,
        }
    }

    /// Map optimizer coordinates to model parameters.
    pub fn to_external(&self, internal: &Array1<f64>) -> Vec<f64> {
        match &self.transforms {
            Some(transforms) => internal
                .iter()
                .zip(transforms)
                .map(|(&u, t)| t.to_external(u))
                .collect(),
            None => internal.to_vec(),
        }
    }

    /// Map an initial guess to optimizer coordinates, clamping into bounds.
    pub fn to_internal(&self, external: &[f64]) -> Result<Array1<f64>> {
        match &self.transforms {
            Some(transforms) => external
                .iter()
                .zip(transforms)
                .map(|(&p, t)| t.start_internal(p))
                .collect::<Result<Vec<f64>>>()
                .map(Array1::from_vec),
            None => Ok(Array1::from_vec(external.to_vec())),
        }
    }

    /// Residuals `f(x, θ) - y` without weights, for external parameters.
    pub fn raw_residuals(&self, params: &[f64]) -> Result<Array1<f64>> {
        Ok(self.model.eval(self.x, params)? - self.y)
    }
}

impl Problem for CurveProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != self.n_params {
            return Err(FitLabError::DimensionMismatch(format!(
                "expected {} parameters, got {}",
                self.n_params,
                params.len()
            )));
        }
        let residuals = self.raw_residuals(&self.to_external(params))?;
        Ok(match &self.sqrt_weights {
            Some(w) => residuals * w,
            None => residuals,
        })
    }

    fn parameter_count(&self) -> usize {
        self.n_params
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        finite_difference::jacobian(self, params, Some(self.fd_epsilon))
    }
}
