//! Model definitions and the equation registry.
//!
//! Each model is an [`EquationSpec`]: a vectorized [`ModelFunction`], its
//! parameter names, a [`DisplayTemplate`] for the fitted equation, and
//! optional bounds and initial-guess estimator. The built-in catalogue is
//! grouped by family in the submodules.

pub mod exponential;
pub mod function;
pub mod peak;
pub mod periodic;
pub mod polynomial;
pub mod registry;
pub mod spec;
pub mod template;

pub use function::ModelFunction;
pub use registry::{builtin_equations, EquationRegistry};
pub use spec::{EquationSpec, Estimator};
pub use template::DisplayTemplate;
