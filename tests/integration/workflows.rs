//! Workflow controller: reload loops, multi-dataset rounds and sweeps.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use fitlab_rs::workflow::run_multi;
use fitlab_rs::{
    run_single, DataSource, Dataset, Decision, EquationRegistry, EquationSpec, ErrorKind, FitConfig,
    FitEngine, FitLabError, FitResult, ModelFunction, Presenter, Result, Sweep, WorkUnit,
};
use ndarray::Array1;

use crate::test_helpers::{noisy_line, scenario_line, with_origin};

/// Hands out queued versions of each file, then fails.
#[derive(Default)]
struct ScriptedSource {
    versions: RefCell<HashMap<PathBuf, VecDeque<Dataset>>>,
    calls: RefCell<usize>,
}

impl ScriptedSource {
    fn queue(&self, path: &str, dataset: Dataset) {
        self.versions
            .borrow_mut()
            .entry(PathBuf::from(path))
            .or_default()
            .push_back(dataset);
    }
}

impl DataSource for ScriptedSource {
    fn load(&self, path: &Path, declared_type: &str) -> Result<Dataset> {
        *self.calls.borrow_mut() += 1;
        if declared_type != "csv" {
            return Err(FitLabError::DataLoad(format!("unsupported type '{}'", declared_type)));
        }
        self.versions
            .borrow_mut()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| FitLabError::DataLoad(format!("{} not found", path.display())))
    }
}

/// Records what was presented.
#[derive(Default)]
struct RecordingPresenter {
    shown: Vec<(String, bool)>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, unit: &str, outcome: &Result<FitResult>) {
        self.shown.push((unit.to_string(), outcome.is_ok()));
    }
}

fn line(name: &str, m: f64) -> Dataset {
    let x = Array1::linspace(0.0, 5.0, 12);
    Dataset::new(name, x.clone(), x.mapv(|v| m * v + 1.0))
}

fn linear_spec(registry: &EquationRegistry) -> EquationSpec {
    registry.lookup("linear_function_with_n").unwrap().clone()
}

#[test]
fn test_single_loop_reloads_until_stopped() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let engine = FitEngine::default();
    let source = ScriptedSource::default();
    source.queue("run.csv", line("run", 2.0));
    source.queue("run.csv", line("run", 3.0));
    let mut presenter = RecordingPresenter::default();

    let unit = WorkUnit::new(with_origin(line("run", 1.0), "run.csv"), linear_spec(&registry), "run");
    let mut decisions = vec![Decision::Continue, Decision::Continue, Decision::Stop].into_iter();
    let report = run_single(&engine, unit, &source, &mut presenter, |_| {
        decisions.next().unwrap_or(Decision::Stop)
    })
    .unwrap();

    assert_eq!(report.rounds, 3);
    assert_relative_eq!(report.last.params[0], 3.0, epsilon = 1e-6);
    assert_eq!(presenter.shown.len(), 3);
    assert!(presenter.shown.iter().all(|(name, ok)| name == "run" && *ok));
    assert_eq!(*source.calls.borrow(), 2);
}

#[test]
fn test_single_loop_reload_failure_is_terminal() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let source = ScriptedSource::default();
    let mut presenter = RecordingPresenter::default();

    let unit = WorkUnit::new(with_origin(line("gone", 1.0), "gone.csv"), linear_spec(&registry), "gone");
    let err = run_single(&FitEngine::default(), unit, &source, &mut presenter, |_| Decision::Continue)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DataLoad);
    assert!(err.to_string().contains("gone"));
    assert_eq!(presenter.shown, vec![("gone".to_string(), true), ("gone".to_string(), false)]);
    assert_eq!(*source.calls.borrow(), 1);
}

#[test]
fn test_single_loop_propagates_fit_failure() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let source = ScriptedSource::default();
    let mut presenter = RecordingPresenter::default();

    let tiny = Dataset::from_vecs("tiny", vec![1.0], vec![2.0]);
    let unit = WorkUnit::new(tiny, linear_spec(&registry), "tiny");
    let err = run_single(&FitEngine::default(), unit, &source, &mut presenter, |_| Decision::Continue)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Fitting);
    assert_eq!(presenter.shown, vec![("tiny".to_string(), false)]);
}

#[test]
fn test_single_loop_without_origin() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let source = ScriptedSource::default();
    let mut presenter = RecordingPresenter::default();

    let unit = WorkUnit::new(scenario_line(), linear_spec(&registry), "scenario");
    let err = run_single(&FitEngine::default(), unit, &source, &mut presenter, |_| Decision::Continue)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DataLoad);
    assert_eq!(*source.calls.borrow(), 0);
}

#[test]
fn test_multi_rounds_are_independent() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let spec = linear_spec(&registry);
    let source = ScriptedSource::default();
    source.queue("b.csv", line("b", 2.0));
    source.queue("b.csv", line("b", 3.0));
    let mut presenter = RecordingPresenter::default();

    let units = vec![
        WorkUnit::new(with_origin(line("a", 1.0), "a.csv"), spec.clone(), "A"),
        WorkUnit::new(with_origin(line("b", 1.0), "b.csv"), spec.clone(), "B"),
        WorkUnit::new(with_origin(line("c", 1.0), "c.csv"), spec, "C"),
    ];

    let mut b_rounds = 0;
    let report = run_multi(&FitEngine::default(), units, &source, &mut presenter, |name, _| match name {
        "A" => Decision::Stop,
        "B" => {
            b_rounds += 1;
            if b_rounds < 3 {
                Decision::Continue
            } else {
                Decision::Stop
            }
        }
        _ => Decision::Continue,
    });

    assert_eq!(report.rounds, 3);
    let names: Vec<&str> = report.entries.iter().map(|e| e.display_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    assert_eq!(report.entries[0].history.len(), 1);
    assert_eq!(report.entries[1].history.len(), 3);
    let last_b = report.entries[1].last().unwrap().as_ref().unwrap();
    assert_relative_eq!(last_b.params[0], 3.0, epsilon = 1e-6);

    // C's reload fails in round two; the failure is recorded, not raised.
    assert_eq!(report.entries[2].history.len(), 2);
    let failure = report.entries[2].last().unwrap().as_ref().unwrap_err();
    assert_eq!(failure.kind(), ErrorKind::DataLoad);
    assert_eq!(report.failures(), 1);
    assert_eq!(presenter.shown.len(), 6);
}

#[test]
fn test_multi_records_fit_failures() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let spec = linear_spec(&registry);
    let source = ScriptedSource::default();
    let mut presenter = RecordingPresenter::default();

    let units = vec![
        WorkUnit::new(Dataset::from_vecs("bad", vec![1.0], vec![1.0]), spec.clone(), "bad"),
        WorkUnit::new(noisy_line(1.0, 0.0, 20, 0.1, 3), spec, "good"),
    ];
    let report = run_multi(&FitEngine::default(), units, &source, &mut presenter, |_, _| Decision::Stop);

    assert_eq!(report.rounds, 1);
    assert!(report.entries[0].last().unwrap().is_err());
    assert!(report.entries[1].last().unwrap().is_ok());
}

#[test]
fn test_checker_sweep_isolates_malformed_model() {
    let mut registry = EquationRegistry::with_builtins().unwrap();
    // Declares one parameter but reads two.
    let malformed = EquationSpec::new(
        "malformed",
        "y = a·b·x",
        &["a"],
        "y={a}x",
        ModelFunction::with_arity(2, |x, p| Ok(x.mapv(|v| p[0] * p[1] * v))),
    )
    .unwrap();
    registry.register(malformed).unwrap();

    let ids = [
        "linear_function_with_n",
        "linear_function",
        "malformed",
        "quadratic_function_complete",
        "quadratic_function",
    ];
    let engine = FitEngine::default();
    let data = noisy_line(1.2, 4.0, 30, 0.05, 9);
    let sweep = Sweep::checker(&engine, &registry, &ids, &data, "plot");

    let items: Vec<_> = sweep.iter().collect();
    assert_eq!(items.len(), ids.len());
    let failures: Vec<&str> = items
        .iter()
        .filter(|item| item.outcome.is_err())
        .map(|item| item.identifier.as_str())
        .collect();
    assert_eq!(failures, vec!["malformed"]);

    let returned: Vec<&str> = items.iter().map(|item| item.identifier.as_str()).collect();
    assert_eq!(returned, ids);
    assert_eq!(items[2].display_name, "plot_malformed");
}

#[test]
fn test_total_sweep_length_and_parallel_order() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let x = Array1::linspace(0.5, 12.0, 60);
    let data = Dataset::new("total", x.clone(), x.mapv(|v| 2.0 * (1.1 * v).sin()));

    let sequential = FitEngine::default();
    let sweep = Sweep::total(&sequential, &registry, &data, "total");
    assert_eq!(sweep.len(), 16);
    assert_eq!(sweep.iter().len(), registry.len());
    let expected: Vec<(String, bool)> = sweep
        .iter()
        .map(|item| (item.identifier, item.outcome.is_ok()))
        .collect();

    let parallel = FitEngine::new(FitConfig::default().with_parallel_sweeps(true)).unwrap();
    let items = Sweep::total(&parallel, &registry, &data, "total").collect_all();
    let actual: Vec<(String, bool)> = items
        .into_iter()
        .map(|item| (item.identifier, item.outcome.is_ok()))
        .collect();
    assert_eq!(actual, expected);
    assert!(actual.iter().any(|(id, ok)| id == "sin_function" && *ok));
}

#[test]
fn test_total_sweep_reports_mismatched_dataset_per_model() {
    let registry = EquationRegistry::with_builtins().unwrap();
    let engine = FitEngine::default();
    let data = Dataset::from_vecs("bad", vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0, 5.0, 1.0]);

    let items: Vec<_> = Sweep::total(&engine, &registry, &data, "bad").iter().collect();
    assert_eq!(items.len(), registry.len());
    for item in &items {
        let err = item.outcome.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataValidation, "{}", item.identifier);
        assert!(err.to_string().contains(&item.identifier));
    }

    let gaussian = registry.lookup("gaussian_function").unwrap();
    assert_eq!(engine.fit(&data, gaussian).unwrap_err().kind(), ErrorKind::DataValidation);
}
