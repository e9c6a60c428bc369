//! Experimental data handed to the fitting core.
//!
//! A [`Dataset`] holds parallel `x`/`y` samples with optional per-point
//! uncertainties. It is read-only to the core; the reload loop replaces it
//! wholesale with a freshly loaded copy from its [`DataOrigin`].

use std::path::PathBuf;

use log::warn;
use ndarray::Array1;

use crate::error::{FitLabError, Result};

/// Where a dataset was loaded from, used to reload it.
#[derive(Debug, Clone, PartialEq)]
pub struct DataOrigin {
    /// Path of the source file.
    pub path: PathBuf,
    /// Declared file type (e.g. `csv`, `txt`).
    pub file_type: String,
}

impl DataOrigin {
    pub fn new<P: Into<PathBuf>>(path: P, file_type: &str) -> Self {
        Self {
            path: path.into(),
            file_type: file_type.to_string(),
        }
    }
}

/// Parallel (x, y) samples with optional uncertainties.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Name used in results and error messages.
    pub name: String,
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub ux: Option<Array1<f64>>,
    pub uy: Option<Array1<f64>>,
    pub origin: Option<DataOrigin>,
}

impl Dataset {
    /// Create a dataset without uncertainties.
    pub fn new(name: &str, x: Array1<f64>, y: Array1<f64>) -> Self {
        Self {
            name: name.to_string(),
            x,
            y,
            ux: None,
            uy: None,
            origin: None,
        }
    }

    /// Create a dataset from plain vectors.
    pub fn from_vecs(name: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self::new(name, Array1::from_vec(x), Array1::from_vec(y))
    }

    /// Attach uncertainties of the independent variable.
    pub fn with_ux(mut self, ux: Array1<f64>) -> Self {
        self.ux = Some(ux);
        self
    }

    /// Attach uncertainties of the dependent variable.
    pub fn with_uy(mut self, uy: Array1<f64>) -> Self {
        self.uy = Some(uy);
        self
    }

    /// Record the source this dataset can be reloaded from.
    pub fn with_origin(mut self, origin: DataOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check the shape and value invariants.
    pub fn validate(&self) -> Result<()> {
        if self.x.is_empty() {
            return Err(FitLabError::DataValidation(format!(
                "dataset '{}' has no samples",
                self.name
            )));
        }
        if self.x.len() != self.y.len() {
            return Err(FitLabError::DataValidation(format!(
                "dataset '{}': x has {} samples but y has {}",
                self.name,
                self.x.len(),
                self.y.len()
            )));
        }
        for (column, values) in [("x", &self.x), ("y", &self.y)] {
            if let Some(i) = values.iter().position(|v| !v.is_finite()) {
                return Err(FitLabError::DataValidation(format!(
                    "dataset '{}': column {} has a non-finite value at row {}",
                    self.name, column, i
                )));
            }
        }
        for (column, values) in [("ux", &self.ux), ("uy", &self.uy)] {
            let Some(values) = values else { continue };
            if values.len() != self.x.len() {
                return Err(FitLabError::DataValidation(format!(
                    "dataset '{}': {} has {} entries, expected {}",
                    self.name,
                    column,
                    values.len(),
                    self.x.len()
                )));
            }
            if let Some(i) = values.iter().position(|v| !(v.is_finite() && *v >= 0.0)) {
                return Err(FitLabError::DataValidation(format!(
                    "dataset '{}': {} must be finite and non-negative (row {})",
                    self.name, column, i
                )));
            }
        }
        Ok(())
    }

    /// Least-squares weights `1/uy²`, or `None` for an unweighted fit.
    ///
    /// Weights are only used when every `uy` entry is finite and strictly
    /// positive; otherwise the whole fit falls back to unit weights.
    pub fn weights(&self) -> Option<Array1<f64>> {
        let uy = self.uy.as_ref()?;
        if uy.len() == self.y.len() && uy.iter().all(|u| u.is_finite() && *u > 0.0) {
            Some(uy.mapv(|u| 1.0 / (u * u)))
        } else {
            warn!(
                "dataset '{}': uy contains zero or non-finite entries, fitting unweighted",
                self.name
            );
            None
        }
    }
}
