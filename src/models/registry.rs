//! The equation registry: identifier → [`EquationSpec`], in registration order.

use std::collections::HashMap;

use log::debug;

use crate::error::{FitLabError, Result};

use super::spec::EquationSpec;
use super::{exponential, peak, periodic, polynomial};

/// Registry of models, populated once and then read-only.
///
/// Iteration order is registration order, which keeps sweep output
/// reproducible.
#[derive(Debug, Clone, Default)]
pub struct EquationRegistry {
    specs: Vec<EquationSpec>,
    index: HashMap<String, usize>,
}

impl EquationRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in catalogue.
    pub fn with_builtins() -> Result<Self> {
        let mut registry = Self::new();
        for spec in builtin_equations()? {
            registry.register(spec)?;
        }
        debug!("registered {} built-in equations", registry.len());
        Ok(registry)
    }

    /// Insert `spec`.
    ///
    /// Fails with a `Configuration` error on a duplicate identifier or when
    /// the template placeholders differ from the parameter names.
    pub fn register(&mut self, spec: EquationSpec) -> Result<()> {
        spec.check()?;
        if self.index.contains_key(&spec.id) {
            return Err(FitLabError::Configuration(format!(
                "equation '{}' is already registered",
                spec.id
            )));
        }
        self.index.insert(spec.id.clone(), self.specs.len());
        self.specs.push(spec);
        Ok(())
    }

    /// Find a spec by identifier, failing with an `Equation` error if absent.
    pub fn lookup(&self, id: &str) -> Result<&EquationSpec> {
        self.get(id)
            .ok_or_else(|| FitLabError::Equation(format!("unknown equation '{}'", id)))
    }

    pub fn get(&self, id: &str) -> Option<&EquationSpec> {
        self.index.get(id).map(|&i| &self.specs[i])
    }

    /// All specs in registration order.
    pub fn list_all(&self) -> &[EquationSpec] {
        &self.specs
    }

    /// Identifiers in registration order.
    pub fn identifiers(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// The built-in catalogue in registration order.
pub fn builtin_equations() -> Result<Vec<EquationSpec>> {
    Ok(vec![
        polynomial::linear_function_with_n()?,
        polynomial::linear_function()?,
        polynomial::quadratic_function_complete()?,
        polynomial::quadratic_function()?,
        polynomial::fourth_power()?,
        periodic::sin_function()?,
        periodic::sin_function_with_c()?,
        periodic::cos_function()?,
        periodic::cos_function_with_c()?,
        exponential::sinh_function()?,
        exponential::cosh_function()?,
        exponential::ln_function()?,
        polynomial::inverse_function()?,
        polynomial::inverse_square_function()?,
        exponential::exponential_function()?,
        peak::gaussian_function()?,
    ])
}
