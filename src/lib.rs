//! # fitlab-rs
//!
//! `fitlab-rs` fits parametric models to experimental `(x, y)` data and
//! reports fitted parameters, their uncertainties, goodness-of-fit figures
//! and a ready-to-render equation string.
//!
//! The library provides:
//! - A Levenberg-Marquardt optimizer with Minuit-style parameter bounds
//! - Weighted least squares with covariance-based uncertainties
//! - A registry of built-in models with heuristic initial-guess estimators
//! - A safe, allow-listed evaluator for user-entered formulas
//! - Workflows for reload loops, multi-dataset rounds and model sweeps
//!
//! ## Basic Usage
//!
//! ```
//! use fitlab_rs::{Dataset, EquationRegistry, FitEngine, Sweep};
//!
//! let registry = EquationRegistry::with_builtins().unwrap();
//! let engine = FitEngine::default();
//! let data = Dataset::from_vecs(
//!     "demo",
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0],
//!     vec![2.1, 4.0, 5.9, 8.1, 9.9],
//! );
//!
//! let result = engine
//!     .fit(&data, registry.lookup("linear_function_with_n").unwrap())
//!     .unwrap();
//! println!("{}", result);
//!
//! let sweep = Sweep::checker(&engine, &registry, &["linear_function", "quadratic_function"], &data, "demo");
//! for item in sweep.iter() {
//!     println!("{}: {}", item.display_name, item.outcome.is_ok());
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod estimate;
pub mod fit;
pub mod formula;
pub mod lm;
pub mod models;
pub mod parameters;
pub mod problem;
pub mod uncertainty;
pub mod utils;
pub mod workflow;

// Re-exports for convenience
pub use config::FitConfig;
pub use dataset::{DataOrigin, Dataset};
pub use error::{ErrorKind, FitLabError, FormulaError, Result};
pub use fit::{FitEngine, FitResult, FitStatistics};
pub use formula::{CompiledFormula, CustomFormulaSpec};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use models::{EquationRegistry, EquationSpec, ModelFunction};
pub use parameters::Bounds;
pub use problem::Problem;
pub use workflow::{
    run_multi, run_single, DataSource, Decision, Presenter, Sweep, SweepItem, WorkUnit,
};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
