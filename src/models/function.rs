//! Vectorized model callables shared by the registry and the fit engine.

use std::fmt;
use std::sync::Arc;

use ndarray::Array1;

use crate::error::{FitLabError, Result};

type ModelFn = dyn Fn(&Array1<f64>, &[f64]) -> Result<Array1<f64>> + Send + Sync;

/// A model `f(x, θ)` evaluated over a whole array of `x` values.
///
/// Cheap to clone and safe to call from several threads at once.
#[derive(Clone)]
pub struct ModelFunction {
    func: Arc<ModelFn>,
    arity: Option<usize>,
}

impl ModelFunction {
    /// Wrap a closure. The parameter count is not checked.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Array1<f64>, &[f64]) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            arity: None,
        }
    }

    /// Wrap a closure that needs exactly `arity` parameters.
    pub fn with_arity<F>(arity: usize, func: F) -> Self
    where
        F: Fn(&Array1<f64>, &[f64]) -> Result<Array1<f64>> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
            arity: Some(arity),
        }
    }

    /// Wrap a scalar function of one sample.
    pub fn elementwise<F>(arity: usize, func: F) -> Self
    where
        F: Fn(f64, &[f64]) -> f64 + Send + Sync + 'static,
    {
        Self::with_arity(arity, move |x, params| Ok(x.mapv(|xi| func(xi, params))))
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Evaluate at every `x`.
    ///
    /// Fails with an `Equation` error when the parameter count does not match
    /// the declared arity or the output length differs from the input length.
    pub fn eval(&self, x: &Array1<f64>, params: &[f64]) -> Result<Array1<f64>> {
        if let Some(arity) = self.arity {
            if params.len() != arity {
                return Err(FitLabError::Equation(format!(
                    "model expects {} parameter(s), got {}",
                    arity,
                    params.len()
                )));
            }
        }
        let y = (self.func)(x, params)?;
        if y.len() != x.len() {
            return Err(FitLabError::Equation(format!(
                "model returned {} value(s) for {} sample(s)",
                y.len(),
                x.len()
            )));
        }
        Ok(y)
    }
}

impl fmt::Debug for ModelFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFunction")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_elementwise_model() {
        let model = ModelFunction::elementwise(2, |x, p| p[0] * x + p[1]);
        let y = model.eval(&array![0.0, 1.0, 2.0], &[2.0, 1.0]).unwrap();
        assert_eq!(y, array![1.0, 3.0, 5.0]);
        assert_eq!(model.arity(), Some(2));
    }

    #[test]
    fn test_arity_mismatch_is_equation_error() {
        let model = ModelFunction::elementwise(2, |x, p| p[0] * x + p[1]);
        let err = model.eval(&array![1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, FitLabError::Equation(_)));
    }

    #[test]
    fn test_output_length_checked() {
        let model = ModelFunction::new(|_x, _p| Ok(array![1.0]));
        assert!(model.eval(&array![1.0, 2.0], &[]).is_err());
    }
}
