//! Safe evaluation of user-entered formulas.
//!
//! A formula such as `a*sin(b*x) + c` is parsed with nom, every identifier is
//! resolved against an allow-list, and the result is a [`CompiledFormula`]
//! that evaluates element-wise over arrays. There is no dynamic name lookup:
//! an identifier that is not `x`, a declared parameter, `pi`, `e` or an
//! allow-listed function is rejected at compile time.

pub mod compiled;
pub mod parser;

pub use compiled::{is_reserved, validate_parameter_names, CompiledFormula, Func, INDEPENDENT_VARIABLE};
pub use parser::{parse, BinaryOp, Expr, UnaryOp, MAX_FORMULA_LEN, MAX_NESTING};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{EquationSpec, ModelFunction};

/// A user-supplied formula and its declared parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFormulaSpec {
    pub expression: String,
    pub parameter_names: Vec<String>,
}

impl CustomFormulaSpec {
    pub fn new(expression: &str, parameter_names: &[&str]) -> Self {
        Self {
            expression: expression.to_string(),
            parameter_names: parameter_names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Validate and compile. Errors are of the `Equation` kind.
    pub fn compile(&self) -> Result<CompiledFormula> {
        Ok(CompiledFormula::compile(&self.expression, &self.parameter_names)?)
    }

    /// Compile into a registrable equation with identifier `id`.
    pub fn into_equation_spec(self, id: &str) -> Result<EquationSpec> {
        let compiled = self.compile()?;
        let template = compiled.display_template();
        let formula = format!("y = {}", compiled.source());
        let names: Vec<&str> = self.parameter_names.iter().map(String::as_str).collect();
        let arity = names.len();
        EquationSpec::new(
            id,
            &formula,
            &names,
            &template,
            ModelFunction::with_arity(arity, move |x, params| Ok(compiled.eval(x, params)?)),
        )
    }
}

/// Compile `expression` against `parameter_names`.
pub fn compile(expression: &str, parameter_names: &[&str]) -> Result<CompiledFormula> {
    CustomFormulaSpec::new(expression, parameter_names).compile()
}
