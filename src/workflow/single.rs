//! Single dataset, single model, optional reload loop.

use log::{debug, info};

use crate::dataset::Dataset;
use crate::error::Result;
use crate::fit::{FitEngine, FitResult};

use super::{reload, DataSource, Decision, Presenter, WorkUnit};

/// States of the fit → present → reload loop.
#[derive(Debug)]
pub enum LoopState {
    Fitting(Dataset),
    Presenting(Dataset, Result<FitResult>),
    Reloading(Dataset),
    Finished(FitResult),
}

/// Outcome of a completed loop.
#[derive(Debug, Clone)]
pub struct LoopReport {
    /// Number of fits performed.
    pub rounds: usize,
    /// Result of the final round.
    pub last: FitResult,
}

/// Fit `unit`, present the result and keep reloading and refitting while
/// `decide` returns [`Decision::Continue`].
///
/// Failures are presented and then returned: a failed fit or reload ends the
/// loop.
pub fn run_single<F>(
    engine: &FitEngine,
    unit: WorkUnit,
    source: &dyn DataSource,
    presenter: &mut dyn Presenter,
    mut decide: F,
) -> Result<LoopReport>
where
    F: FnMut(&FitResult) -> Decision,
{
    let WorkUnit {
        dataset,
        spec,
        display_name,
    } = unit;
    let mut rounds = 0;
    let mut state = LoopState::Fitting(dataset);

    loop {
        state = match state {
            LoopState::Fitting(dataset) => {
                rounds += 1;
                debug!("'{}' round {}: fitting", display_name, rounds);
                let outcome = engine.fit(&dataset, &spec);
                LoopState::Presenting(dataset, outcome)
            }
            LoopState::Presenting(dataset, outcome) => {
                presenter.present(&display_name, &outcome);
                let result = outcome?;
                match decide(&result) {
                    Decision::Continue => LoopState::Reloading(dataset),
                    Decision::Stop => LoopState::Finished(result),
                }
            }
            LoopState::Reloading(dataset) => {
                info!("'{}': reloading '{}'", display_name, dataset.name);
                match reload(source, &dataset) {
                    Ok(fresh) => LoopState::Fitting(fresh),
                    Err(e) => {
                        let failure: Result<FitResult> = Err(e);
                        presenter.present(&display_name, &failure);
                        return failure.map(|last| LoopReport { rounds, last });
                    }
                }
            }
            LoopState::Finished(last) => {
                info!("'{}' finished after {} round(s)", display_name, rounds);
                return Ok(LoopReport { rounds, last });
            }
        };
    }
}
