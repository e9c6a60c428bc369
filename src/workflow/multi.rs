//! Several independent datasets, advanced in lock-step rounds.

use log::info;

use crate::error::Result;
use crate::fit::{FitEngine, FitResult};

use super::{record_failure, reload, DataSource, Decision, Presenter, WorkUnit};

/// Per-unit history of a multi-dataset run.
#[derive(Debug)]
pub struct MultiEntry {
    pub display_name: String,
    /// One outcome per round the unit took part in.
    pub history: Vec<Result<FitResult>>,
}

impl MultiEntry {
    /// Outcome of the unit's final round.
    pub fn last(&self) -> Option<&Result<FitResult>> {
        self.history.last()
    }

    pub fn failures(&self) -> usize {
        self.history.iter().filter(|outcome| outcome.is_err()).count()
    }
}

/// Outcome of [`run_multi`], with entries in submission order.
#[derive(Debug)]
pub struct MultiReport {
    pub rounds: usize,
    pub entries: Vec<MultiEntry>,
}

impl MultiReport {
    pub fn failures(&self) -> usize {
        self.entries.iter().map(MultiEntry::failures).sum()
    }
}

/// Fit every unit, then keep reloading and refitting the units for which
/// `decide` returns [`Decision::Continue`], one round at a time, until none
/// is left.
///
/// A failed fit is recorded and presented like a result; the caller decides
/// whether that unit continues. A failed reload is recorded and ends that
/// unit's participation. No failure reaches sibling units.
pub fn run_multi<F>(
    engine: &FitEngine,
    units: Vec<WorkUnit>,
    source: &dyn DataSource,
    presenter: &mut dyn Presenter,
    mut decide: F,
) -> MultiReport
where
    F: FnMut(&str, &Result<FitResult>) -> Decision,
{
    let mut entries: Vec<MultiEntry> = units
        .iter()
        .map(|unit| MultiEntry {
            display_name: unit.display_name.clone(),
            history: Vec::new(),
        })
        .collect();
    let mut units: Vec<(WorkUnit, bool)> = units.into_iter().map(|unit| (unit, true)).collect();
    let mut rounds = 0;

    while units.iter().any(|(_, active)| *active) {
        rounds += 1;
        info!(
            "round {}: {} of {} dataset(s) active",
            rounds,
            units.iter().filter(|(_, active)| *active).count(),
            units.len()
        );

        for ((unit, active), entry) in units.iter_mut().zip(entries.iter_mut()) {
            if !*active {
                continue;
            }

            if rounds > 1 {
                match reload(source, &unit.dataset) {
                    Ok(fresh) => unit.dataset = fresh,
                    Err(e) => {
                        record_failure(&unit.display_name, &e);
                        let outcome = Err(e);
                        presenter.present(&unit.display_name, &outcome);
                        entry.history.push(outcome);
                        *active = false;
                        continue;
                    }
                }
            }

            let outcome = engine.fit(&unit.dataset, &unit.spec);
            if let Err(e) = &outcome {
                record_failure(&unit.display_name, e);
            }
            presenter.present(&unit.display_name, &outcome);
            *active = decide(&unit.display_name, &outcome) == Decision::Continue;
            entry.history.push(outcome);
        }
    }

    MultiReport { rounds, entries }
}
