//! Equation specifications: everything the fit engine needs about one model.

use std::fmt;
use std::sync::Arc;

use crate::config::FitConfig;
use crate::dataset::Dataset;
use crate::error::{FitLabError, Result};
use crate::parameters::Bounds;

use super::function::ModelFunction;
use super::template::DisplayTemplate;

/// Produces an initial parameter vector from the data.
pub type Estimator = Arc<dyn Fn(&Dataset, &FitConfig) -> Vec<f64> + Send + Sync>;

/// A registered model: callable, parameter names, display template, and
/// optional bounds and initial-guess estimator.
#[derive(Clone)]
pub struct EquationSpec {
    pub id: String,
    /// Human-readable functional form, e.g. `y = m·x + n`.
    pub formula: String,
    pub model: ModelFunction,
    pub parameter_names: Vec<String>,
    pub template: DisplayTemplate,
    pub bounds: Option<Vec<Bounds>>,
    pub estimator: Option<Estimator>,
}

impl EquationSpec {
    /// Create a spec without bounds or estimator.
    ///
    /// Fails with a `Configuration` error when the template cannot be parsed.
    pub fn new(
        id: &str,
        formula: &str,
        parameter_names: &[&str],
        template: &str,
        model: ModelFunction,
    ) -> Result<Self> {
        Ok(Self {
            id: id.to_string(),
            formula: formula.to_string(),
            model,
            parameter_names: parameter_names.iter().map(|s| s.to_string()).collect(),
            template: DisplayTemplate::parse(template)
                .map_err(|e| e.context(id))?,
            bounds: None,
            estimator: None,
        })
    }

    pub fn with_bounds(mut self, bounds: Vec<Bounds>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_estimator<F>(mut self, estimator: F) -> Self
    where
        F: Fn(&Dataset, &FitConfig) -> Vec<f64> + Send + Sync + 'static,
    {
        self.estimator = Some(Arc::new(estimator));
        self
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_names.len()
    }

    /// Initial guess: the estimator's output when it has the right length,
    /// otherwise all ones.
    pub fn initial_guess(&self, data: &Dataset, config: &FitConfig) -> Vec<f64> {
        match &self.estimator {
            Some(estimator) => {
                let guess = estimator(data, config);
                if guess.len() == self.parameter_count() && guess.iter().all(|v| v.is_finite()) {
                    guess
                } else {
                    log::warn!(
                        "estimator for '{}' returned an unusable guess, starting from ones",
                        self.id
                    );
                    vec![1.0; self.parameter_count()]
                }
            }
            None => vec![1.0; self.parameter_count()],
        }
    }

    /// Check the registration invariants.
    pub fn check(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(FitLabError::Configuration(
                "equation identifier must not be empty".to_string(),
            ));
        }
        for (i, name) in self.parameter_names.iter().enumerate() {
            if self.parameter_names[..i].contains(name) {
                return Err(FitLabError::Configuration(format!(
                    "equation '{}' declares parameter '{}' twice",
                    self.id, name
                )));
            }
        }
        if !self.template.matches_parameters(&self.parameter_names) {
            return Err(FitLabError::Configuration(format!(
                "equation '{}': template '{}' placeholders {:?} do not match parameters {:?}",
                self.id,
                self.template.as_str(),
                self.template.placeholders(),
                self.parameter_names
            )));
        }
        if let Some(bounds) = &self.bounds {
            if bounds.len() != self.parameter_names.len() {
                return Err(FitLabError::Configuration(format!(
                    "equation '{}' has {} bounds for {} parameters",
                    self.id,
                    bounds.len(),
                    self.parameter_names.len()
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EquationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquationSpec")
            .field("id", &self.id)
            .field("formula", &self.formula)
            .field("parameter_names", &self.parameter_names)
            .field("template", &self.template.as_str())
            .field("bounds", &self.bounds)
            .field("estimator", &self.estimator.is_some())
            .finish()
    }
}
