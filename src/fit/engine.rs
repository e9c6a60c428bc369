//! Weighted nonlinear least-squares fitting of one model to one dataset.

use log::{debug, info};
use ndarray::Array1;

use crate::config::FitConfig;
use crate::dataset::Dataset;
use crate::error::{FitLabError, Result};
use crate::formula::CustomFormulaSpec;
use crate::lm::LevenbergMarquardt;
use crate::models::{DisplayTemplate, EquationSpec, ModelFunction};
use crate::parameters::{Bounds, BoundsTransform};
use crate::problem::Problem;
use crate::uncertainty::UncertaintyCalculator;

use super::problem::CurveProblem;
use super::result::{FitResult, FitStatistics};

/// Fits models to datasets with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct FitEngine {
    config: FitConfig,
}

impl FitEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: FitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// Fit a registered equation, seeding the optimizer with its estimator.
    pub fn fit(&self, dataset: &Dataset, spec: &EquationSpec) -> Result<FitResult> {
        // Estimators assume paired, finite samples.
        dataset
            .validate()
            .map_err(|e| e.context(&format!("{}/{}", dataset.name, spec.id)))?;
        let guess = spec.initial_guess(dataset, &self.config);
        let mut result = self.fit_model(
            dataset,
            &spec.id,
            &spec.model,
            &spec.parameter_names,
            &spec.template,
            Some(&guess),
            spec.bounds.as_deref(),
        )?;
        result.formula = spec.formula.clone();
        Ok(result)
    }

    /// Compile a user formula and fit it under the identifier `id`.
    pub fn fit_custom(&self, dataset: &Dataset, custom: &CustomFormulaSpec, id: &str) -> Result<FitResult> {
        let spec = custom.clone().into_equation_spec(id).map_err(|e| e.context(id))?;
        self.fit(dataset, &spec)
    }

    /// Fit `model` to `dataset`.
    ///
    /// Minimizes `Σ w_i (f(x_i, θ) - y_i)²` with `w_i = 1/uy_i²` when every
    /// `uy` is positive, unit weights otherwise. Missing guesses default to
    /// ones and are clamped into `bounds`.
    ///
    /// # Errors
    ///
    /// * `DataValidation` when the dataset breaks its invariants.
    /// * `Fitting` when there are fewer samples than parameters, the model
    ///   cannot be evaluated, every sample is non-finite at the start, or
    ///   the optimizer does not converge.
    ///
    /// Every error is prefixed with `dataset/id`.
    #[allow(clippy::too_many_arguments)]
    pub fn fit_model(
        &self,
        dataset: &Dataset,
        id: &str,
        model: &ModelFunction,
        parameter_names: &[String],
        template: &DisplayTemplate,
        initial_guess: Option<&[f64]>,
        bounds: Option<&[Bounds]>,
    ) -> Result<FitResult> {
        let unit = format!("{}/{}", dataset.name, id);
        self.fit_model_inner(dataset, id, model, parameter_names, template, initial_guess, bounds)
            .map_err(|e| e.context(&unit))
    }

    #[allow(clippy::too_many_arguments)]
    fn fit_model_inner(
        &self,
        dataset: &Dataset,
        id: &str,
        model: &ModelFunction,
        parameter_names: &[String],
        template: &DisplayTemplate,
        initial_guess: Option<&[f64]>,
        bounds: Option<&[Bounds]>,
    ) -> Result<FitResult> {
        dataset.validate()?;

        let n_params = parameter_names.len();
        let n_samples = dataset.len();
        if n_params == 0 {
            return Err(FitLabError::Fitting("model has no free parameters".to_string()));
        }
        if n_samples < n_params {
            return Err(FitLabError::Fitting(format!(
                "{} samples cannot determine {} parameters",
                n_samples, n_params
            )));
        }

        let guess = match initial_guess {
            Some(guess) if guess.len() != n_params => {
                return Err(FitLabError::Fitting(format!(
                    "initial guess has {} values for {} parameters",
                    guess.len(),
                    n_params
                )));
            }
            Some(guess) => guess.to_vec(),
            None => vec![1.0; n_params],
        };
        if let Some(bounds) = bounds {
            if bounds.len() != n_params {
                return Err(FitLabError::Fitting(format!(
                    "{} bounds given for {} parameters",
                    bounds.len(),
                    n_params
                )));
            }
        }

        let start = model
            .eval(&dataset.x, &guess)
            .map_err(|e| FitLabError::Fitting(format!("model cannot be evaluated: {}", e)))?;
        if start.iter().all(|v| !v.is_finite()) {
            return Err(FitLabError::Fitting(
                "model is not finite anywhere on the data domain".to_string(),
            ));
        }

        let weights = dataset.weights();
        let weighted = weights.is_some();
        let optimizer_config = &self.config.optimizer;

        let mut problem = CurveProblem::new(
            &dataset.x,
            &dataset.y,
            weights.as_ref(),
            model,
            n_params,
            optimizer_config.fd_epsilon,
        );
        if let Some(bounds) = bounds {
            if bounds.iter().any(|b| b.has_lower_bound() || b.has_upper_bound()) {
                problem = problem.with_transforms(bounds.iter().copied().map(BoundsTransform::new).collect());
            }
        }

        debug!(
            "fitting '{}' to '{}' ({} samples, weighted: {}), guess {:?}",
            id, dataset.name, n_samples, weighted, guess
        );

        let optimizer = LevenbergMarquardt::with_config(optimizer_config.clone());
        let start = problem.to_internal(&guess)?;
        let solution = optimizer
            .minimize(&problem, start)
            .map_err(|e| match e {
                FitLabError::Fitting(_) => e,
                other => FitLabError::Fitting(other.to_string()),
            })?;

        let params = problem.to_external(&solution.params);
        let y_fitted = model
            .eval(&dataset.x, &params)
            .map_err(|e| FitLabError::Fitting(e.to_string()))?;
        if y_fitted.iter().any(|v| !v.is_finite()) {
            return Err(FitLabError::Fitting(
                "fitted model produces non-finite values".to_string(),
            ));
        }

        let statistics = FitStatistics::compute(&dataset.y, &y_fitted, weights.as_ref(), n_params);

        let external = problem.unbounded();
        let jacobian = external.jacobian(&Array1::from_vec(params.clone()))?;
        let uncertainty = UncertaintyCalculator::new(n_samples, n_params, statistics.chi_squared, weighted)
            .analyze(&jacobian, &params, self.config.confidence_level);

        let figures = self.config.significant_figures;
        let equation = template.render(parameter_names, &params, figures);

        info!(
            "fitted '{}' to '{}' in {} iterations: {}",
            id, dataset.name, solution.iterations, equation
        );

        Ok(FitResult {
            equation_id: id.to_string(),
            dataset_name: dataset.name.clone(),
            parameter_names: parameter_names.to_vec(),
            params,
            std_errors: uncertainty.standard_errors,
            confidence_intervals: uncertainty.confidence_intervals,
            confidence_level: self.config.confidence_level,
            covariance: uncertainty.covariance,
            correlation: uncertainty.correlation,
            y_fitted,
            equation,
            formula: template.as_str().to_string(),
            statistics,
            weighted,
            significant_figures: figures,
            iterations: solution.iterations,
            message: solution.message,
            success: solution.success,
        })
    }
}
