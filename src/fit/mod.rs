//! # Fit Engine
//!
//! Weighted nonlinear least-squares fitting of a model to a dataset, with
//! parameter uncertainties, goodness-of-fit statistics and a rendered
//! equation string.
//!
//! ```
//! use fitlab_rs::{Dataset, EquationRegistry, FitEngine};
//!
//! let registry = EquationRegistry::with_builtins().unwrap();
//! let data = Dataset::from_vecs(
//!     "demo",
//!     vec![1.0, 2.0, 3.0, 4.0, 5.0],
//!     vec![2.1, 4.0, 5.9, 8.1, 9.9],
//! );
//! let spec = registry.lookup("linear_function_with_n").unwrap();
//! let result = FitEngine::default().fit(&data, spec).unwrap();
//! assert!(result.r_squared().unwrap() > 0.99);
//! ```

pub mod engine;
pub mod problem;
pub mod result;

pub use engine::FitEngine;
pub use problem::CurveProblem;
pub use result::{FitResult, FitStatistics};
