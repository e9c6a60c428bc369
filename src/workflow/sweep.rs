//! Many models on one dataset.

use std::iter::FusedIterator;

use log::{info, warn};
use rayon::prelude::*;

use crate::dataset::Dataset;
use crate::error::{FitLabError, Result};
use crate::fit::{FitEngine, FitResult};
use crate::models::{EquationRegistry, EquationSpec};

/// One model's outcome within a sweep.
#[derive(Debug)]
pub struct SweepItem {
    pub identifier: String,
    /// `<plot name>_<identifier>`.
    pub display_name: String,
    pub outcome: Result<FitResult>,
}

/// A lazy, restartable batch of fits of one dataset.
///
/// Nothing is fitted until the sweep is iterated. Every call to
/// [`Sweep::iter`] starts over from the first model.
#[derive(Debug, Clone)]
pub struct Sweep<'a> {
    engine: &'a FitEngine,
    dataset: &'a Dataset,
    plot_name: String,
    targets: Vec<(String, Option<&'a EquationSpec>)>,
}

impl<'a> Sweep<'a> {
    /// The models named in `identifiers`, in that order.
    ///
    /// An identifier missing from the registry yields an `Equation` failure
    /// at its position instead of aborting the sweep.
    pub fn checker(
        engine: &'a FitEngine,
        registry: &'a EquationRegistry,
        identifiers: &[&str],
        dataset: &'a Dataset,
        plot_name: &str,
    ) -> Self {
        Self {
            engine,
            dataset,
            plot_name: plot_name.to_string(),
            targets: identifiers
                .iter()
                .map(|id| (id.to_string(), registry.get(id)))
                .collect(),
        }
    }

    /// Every registered model, in registration order.
    pub fn total(
        engine: &'a FitEngine,
        registry: &'a EquationRegistry,
        dataset: &'a Dataset,
        plot_name: &str,
    ) -> Self {
        Self {
            engine,
            dataset,
            plot_name: plot_name.to_string(),
            targets: registry
                .list_all()
                .iter()
                .map(|spec| (spec.id.clone(), Some(spec)))
                .collect(),
        }
    }

    /// Number of models, known before any fit runs.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|(id, _)| id.as_str())
    }

    /// Fit lazily, one model per `next()`.
    pub fn iter(&self) -> SweepIter<'_> {
        info!(
            "sweeping {} model(s) over '{}'",
            self.len(),
            self.dataset.name
        );
        SweepIter {
            sweep: self,
            position: 0,
        }
    }

    /// Fit everything, on the rayon pool when the engine's configuration
    /// asks for parallel sweeps.
    pub fn collect_all(&self) -> Vec<SweepItem> {
        if self.engine.config().parallel_sweeps {
            self.collect_parallel()
        } else {
            self.iter().collect()
        }
    }

    /// Fit everything on the rayon pool. Items keep submission order.
    pub fn collect_parallel(&self) -> Vec<SweepItem> {
        info!(
            "sweeping {} model(s) over '{}' in parallel",
            self.len(),
            self.dataset.name
        );
        (0..self.len()).into_par_iter().map(|i| self.run(i)).collect()
    }

    fn run(&self, index: usize) -> SweepItem {
        let (identifier, spec) = &self.targets[index];
        let display_name = format!("{}_{}", self.plot_name, identifier);

        let outcome = match spec {
            Some(spec) => self.engine.fit(self.dataset, spec),
            None => Err(FitLabError::Equation(format!(
                "unknown equation '{}'",
                identifier
            ))
            .context(&self.dataset.name)),
        };
        if let Err(e) = &outcome {
            warn!("'{}' failed: {}", display_name, e);
        }

        SweepItem {
            identifier: identifier.clone(),
            display_name,
            outcome,
        }
    }
}

impl<'s, 'a> IntoIterator for &'s Sweep<'a> {
    type Item = SweepItem;
    type IntoIter = SweepIter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Sweep`], fitting one model per step.
#[derive(Debug)]
pub struct SweepIter<'s> {
    sweep: &'s Sweep<'s>,
    position: usize,
}

impl Iterator for SweepIter<'_> {
    type Item = SweepItem;

    fn next(&mut self) -> Option<SweepItem> {
        if self.position >= self.sweep.len() {
            return None;
        }
        let item = self.sweep.run(self.position);
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.sweep.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SweepIter<'_> {}

impl FusedIterator for SweepIter<'_> {}
