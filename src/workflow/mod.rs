//! # Workflow Controller
//!
//! Sequences the fit engine over the four usage patterns:
//!
//! - [`run_single`]: one dataset and one model, with an optional
//!   reload-and-refit loop driven by a decision callback
//! - [`run_multi`]: several independent datasets advanced in lock-step rounds
//! - [`Sweep::checker`]: a caller-chosen list of models on one dataset
//! - [`Sweep::total`]: every registered model on one dataset
//!
//! Data loading and presentation stay outside the core, behind the
//! [`DataSource`] and [`Presenter`] traits. Every multi-unit workflow records
//! a failure against its unit and carries on with the others.

mod multi;
mod single;
mod sweep;

pub use multi::{run_multi, MultiEntry, MultiReport};
pub use single::{run_single, LoopReport, LoopState};
pub use sweep::{Sweep, SweepItem, SweepIter};

use std::path::Path;

use log::warn;

use crate::dataset::Dataset;
use crate::error::{FitLabError, Result};
use crate::fit::FitResult;
use crate::models::EquationSpec;

/// Loads datasets from their external source. Only used to reload.
pub trait DataSource {
    /// Read the dataset at `path`.
    ///
    /// Implementations report missing files, unsupported types and malformed
    /// content as `DataLoad` errors.
    fn load(&self, path: &Path, declared_type: &str) -> Result<Dataset>;
}

/// Receives every fit outcome, successful or not.
pub trait Presenter {
    fn present(&mut self, unit: &str, outcome: &Result<FitResult>);
}

/// Whether a loop should reload and refit after presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop,
}

/// One dataset paired with the model to fit to it.
#[derive(Debug, Clone)]
pub struct WorkUnit {
    pub dataset: Dataset,
    pub spec: EquationSpec,
    pub display_name: String,
}

impl WorkUnit {
    pub fn new(dataset: Dataset, spec: EquationSpec, display_name: &str) -> Self {
        Self {
            dataset,
            spec,
            display_name: display_name.to_string(),
        }
    }
}

/// Re-read `dataset` from the source it was loaded from.
pub(crate) fn reload(source: &dyn DataSource, dataset: &Dataset) -> Result<Dataset> {
    let origin = dataset.origin.as_ref().ok_or_else(|| {
        FitLabError::DataLoad(format!(
            "dataset '{}' has no source to reload from",
            dataset.name
        ))
    })?;

    let mut fresh = source
        .load(&origin.path, &origin.file_type)
        .map_err(|e| match e.kind() {
            crate::error::ErrorKind::DataLoad => e,
            _ => FitLabError::DataLoad(e.to_string()),
        })
        .map_err(|e| e.context(&dataset.name))?;
    fresh
        .validate()
        .map_err(|e| FitLabError::DataLoad(format!("[{}] {}", dataset.name, e)))?;
    if fresh.origin.is_none() {
        fresh.origin = Some(origin.clone());
    }
    Ok(fresh)
}

/// Log a failed unit. Multi-unit workflows call this instead of propagating.
pub(crate) fn record_failure(unit: &str, error: &FitLabError) {
    warn!("'{}' failed: {}", unit, error);
}
