//! Name resolution and evaluation of parsed formulas.
//!
//! Resolution is an allow-list: every identifier must be the independent
//! variable, a declared parameter, or one of the constants and functions
//! enumerated here. Anything else is rejected before a compiled formula
//! exists, so there is no path from formula text to arbitrary behavior.

use std::f64::consts::{E, PI};

use ndarray::Array1;

use super::parser::{self, BinaryOp, Expr, UnaryOp};
use crate::error::FormulaError;

/// Name of the independent variable in formulas.
pub const INDEPENDENT_VARIABLE: &str = "x";

const CONSTANTS: [(&str, f64); 2] = [("pi", PI), ("e", E)];

/// Allow-listed elementary functions. All take one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
}

impl Func {
    const ALL: [(&'static str, Func); 15] = [
        ("sin", Func::Sin),
        ("cos", Func::Cos),
        ("tan", Func::Tan),
        ("asin", Func::Asin),
        ("acos", Func::Acos),
        ("atan", Func::Atan),
        ("sinh", Func::Sinh),
        ("cosh", Func::Cosh),
        ("tanh", Func::Tanh),
        ("exp", Func::Exp),
        ("ln", Func::Ln),
        ("log", Func::Ln),
        ("log10", Func::Log10),
        ("sqrt", Func::Sqrt),
        ("abs", Func::Abs),
    ];

    pub fn from_name(name: &str) -> Option<Func> {
        Self::ALL.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
    }

    pub fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sinh => v.sinh(),
            Func::Cosh => v.cosh(),
            Func::Tanh => v.tanh(),
            Func::Exp => v.exp(),
            Func::Ln => v.ln(),
            Func::Log10 => v.log10(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
        }
    }
}

/// True for names that cannot be declared as parameters.
pub fn is_reserved(name: &str) -> bool {
    name == INDEPENDENT_VARIABLE
        || CONSTANTS.iter().any(|(c, _)| *c == name)
        || Func::from_name(name).is_some()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Resolved expression tree.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Const(f64),
    X,
    Param(usize),
    Neg(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Func, Box<Node>),
}

impl Node {
    fn resolve(expr: &Expr, parameter_names: &[String]) -> Result<Node, FormulaError> {
        Ok(match expr {
            Expr::Number(v) => Node::Const(*v),
            Expr::Ident(name) => {
                if name == INDEPENDENT_VARIABLE {
                    Node::X
                } else if let Some(i) = parameter_names.iter().position(|p| p == name) {
                    Node::Param(i)
                } else if let Some((_, v)) = CONSTANTS.iter().find(|(c, _)| c == name) {
                    Node::Const(*v)
                } else {
                    return Err(FormulaError::UnknownIdentifier { name: name.clone() });
                }
            }
            Expr::Unary(UnaryOp::Plus, operand) => Node::resolve(operand, parameter_names)?,
            Expr::Unary(UnaryOp::Neg, operand) => {
                Node::Neg(Box::new(Node::resolve(operand, parameter_names)?))
            }
            Expr::Binary(op, lhs, rhs) => Node::Binary(
                *op,
                Box::new(Node::resolve(lhs, parameter_names)?),
                Box::new(Node::resolve(rhs, parameter_names)?),
            ),
            Expr::Call(name, args) => {
                let func = Func::from_name(name)
                    .ok_or_else(|| FormulaError::UnknownFunction { name: name.clone() })?;
                if args.len() != 1 {
                    return Err(FormulaError::Arity {
                        function: name.clone(),
                        expected: 1,
                        got: args.len(),
                    });
                }
                Node::Call(func, Box::new(Node::resolve(&args[0], parameter_names)?))
            }
        })
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        match self {
            Node::Const(v) => *v,
            Node::X => x,
            Node::Param(i) => params[*i],
            Node::Neg(operand) => -operand.eval(x, params),
            Node::Binary(op, lhs, rhs) => op.apply(lhs.eval(x, params), rhs.eval(x, params)),
            Node::Call(func, arg) => func.apply(arg.eval(x, params)),
        }
    }
}

/// A validated formula that can be evaluated over arrays.
///
/// Evaluation follows IEEE 754: division by zero and domain errors produce
/// `inf`/`NaN` at the affected samples instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFormula {
    source: String,
    parameter_names: Vec<String>,
    root: Node,
}

impl CompiledFormula {
    /// Parse and validate `source` against the declared parameter names.
    pub fn compile(source: &str, parameter_names: &[String]) -> Result<Self, FormulaError> {
        validate_parameter_names(parameter_names)?;
        let expr = parser::parse(source)?;
        let root = Node::resolve(&expr, parameter_names)?;
        Ok(Self {
            source: source.trim().to_string(),
            parameter_names: parameter_names.to_vec(),
            root,
        })
    }

    /// The formula text as entered, trimmed.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// Evaluate element-wise over `x` with parameters in declared order.
    pub fn eval(&self, x: &Array1<f64>, params: &[f64]) -> Result<Array1<f64>, FormulaError> {
        if params.len() != self.parameter_names.len() {
            return Err(FormulaError::ParameterCount {
                expected: self.parameter_names.len(),
                got: params.len(),
            });
        }
        Ok(x.mapv(|xi| self.root.eval(xi, params)))
    }

    /// Display template `y=<formula>` with every parameter written as `{name}`.
    pub fn display_template(&self) -> String {
        let mut template = String::from("y=");
        let mut chars = self.source.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            if c.is_whitespace() {
                continue;
            }
            if c.is_ascii_digit() || c == '.' {
                // Keep number literals intact, exponent included.
                template.push(c);
                let mut prev = c;
                while let Some(&(_, next)) = chars.peek() {
                    let continues = next.is_ascii_digit()
                        || next == '.'
                        || next == 'e'
                        || next == 'E'
                        || ((next == '+' || next == '-') && (prev == 'e' || prev == 'E'));
                    if !continues {
                        break;
                    }
                    template.push(next);
                    prev = next;
                    chars.next();
                }
            } else if c.is_ascii_alphabetic() || c == '_' {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &self.source[start..end];
                if self.parameter_names.iter().any(|p| p == word) {
                    template.push('{');
                    template.push_str(word);
                    template.push('}');
                } else {
                    template.push_str(word);
                }
            } else {
                template.push(c);
            }
        }

        template
    }
}

/// Check a declared parameter list: non-empty, valid identifiers, unique,
/// and not reserved.
pub fn validate_parameter_names(parameter_names: &[String]) -> Result<(), FormulaError> {
    if parameter_names.is_empty() {
        return Err(FormulaError::InvalidParameterName {
            name: String::new(),
        });
    }
    for (i, name) in parameter_names.iter().enumerate() {
        if !is_identifier(name) {
            return Err(FormulaError::InvalidParameterName { name: name.clone() });
        }
        if is_reserved(name) {
            return Err(FormulaError::ReservedParameterName { name: name.clone() });
        }
        if parameter_names[..i].contains(name) {
            return Err(FormulaError::DuplicateParameter { name: name.clone() });
        }
    }
    Ok(())
}
