//! Expression parsing for user-supplied formulas.
//!
//! The grammar, loosest binding first:
//!
//! ```text
//! additive       := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := unary (('*' | '/') unary)*
//! unary          := ('+' | '-') unary | power
//! power          := primary (('**' | '^') unary)?
//! primary        := number | identifier ['(' args ')'] | '(' additive ')'
//! ```
//!
//! Binary `+ - * /` associate to the left, powers to the right, and a unary
//! minus binds looser than a power so `-x**2` is `-(x**2)`.

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map_res, opt, recognize},
    multi::{many0, separated_list1},
    sequence::{delimited, pair},
    IResult, Parser,
};

use crate::error::FormulaError;

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
            BinaryOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Parsed expression tree, before any name resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    /// Every identifier referenced as a value or called as a function.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => names.push(name),
            Expr::Unary(_, operand) => operand.collect_identifiers(names),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_identifiers(names);
                rhs.collect_identifiers(names);
            }
            Expr::Call(name, args) => {
                names.push(name);
                for arg in args {
                    arg.collect_identifiers(names);
                }
            }
        }
    }
}

/// Longest formula accepted, in bytes.
pub const MAX_FORMULA_LEN: usize = 4096;

/// Deepest nesting of parentheses, call arguments, signs and exponents.
pub const MAX_NESTING: usize = 64;

/// Parse a complete formula.
///
/// Fails with [`FormulaError::Empty`] for blank input,
/// [`FormulaError::TooLong`] or [`FormulaError::TooDeep`] past the size
/// limits, and [`FormulaError::Syntax`] with the byte offset of the
/// offending token otherwise.
pub fn parse(source: &str) -> Result<Expr, FormulaError> {
    if source.trim().is_empty() {
        return Err(FormulaError::Empty);
    }
    if source.len() > MAX_FORMULA_LEN {
        return Err(FormulaError::TooLong {
            length: source.len(),
            limit: MAX_FORMULA_LEN,
        });
    }

    match additive(source, 0) {
        Ok((rest, expr)) => {
            let rest = rest.trim_start();
            if rest.is_empty() {
                Ok(expr)
            } else {
                Err(syntax_error(source, rest))
            }
        }
        Err(nom::Err::Failure(e)) if e.code == nom::error::ErrorKind::TooLarge => Err(FormulaError::TooDeep {
            position: source.len() - e.input.len(),
            limit: MAX_NESTING,
        }),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(syntax_error(source, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(syntax_error(source, "")),
    }
}

fn syntax_error(source: &str, rest: &str) -> FormulaError {
    let rest = rest.trim_start();
    let token = match rest.chars().next() {
        None => "end of input".to_string(),
        Some(c) if c.is_alphanumeric() || c == '_' => {
            let word: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
                .collect();
            format!("'{}'", word)
        }
        Some(c) => format!("'{}'", c),
    };
    FormulaError::Syntax {
        position: source.len() - rest.len(),
        token,
    }
}

fn fail(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Alt))
}

/// One level deeper, or a hard failure at `input` once past [`MAX_NESTING`].
fn nest(input: &str, depth: usize) -> Result<usize, nom::Err<nom::error::Error<&str>>> {
    if depth >= MAX_NESTING {
        Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TooLarge,
        )))
    } else {
        Ok(depth + 1)
    }
}

/// Parse an identifier (variable, parameter, constant or function name)
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// Parse a decimal literal: `12`, `1.5`, `.5`, `3.`, `2e-3`.
///
/// `inf` and `nan` are identifiers here, not numbers.
fn number(input: &str) -> IResult<&str, f64> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    map_res(recognize(pair(mantissa, exponent)), str::parse::<f64>).parse(input)
}

/// Parse a function argument list after the opening parenthesis.
fn arguments(input: &str, depth: usize) -> IResult<&str, Vec<Expr>> {
    let (input, _) = multispace0.parse(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>(')').parse(input) {
        return Ok((input, Vec::new()));
    }

    let (input, args) = separated_list1(delimited(multispace0, char(','), multispace0), |i| {
        additive(i, depth)
    })
    .parse(input)?;
    let (input, _) = multispace0.parse(input)?;
    let (input, _) = char(')').parse(input)?;
    Ok((input, args))
}

/// Parse a primary expression (number, identifier, call, or parenthesized expression)
fn primary(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = multispace0.parse(input)?;

    if let Ok((rest, _)) = char::<_, nom::error::Error<_>>('(').parse(input) {
        let inner = nest(input, depth)?;
        let (rest, expr) = additive(rest, inner)?;
        let (rest, _) = multispace0.parse(rest)?;
        let (rest, _) = char(')').parse(rest)?;
        return Ok((rest, expr));
    }

    if let Ok((rest, value)) = number(input) {
        return Ok((rest, Expr::Number(value)));
    }

    let (rest, name) = identifier(input).map_err(|_| fail(input))?;
    let (after_space, _) = multispace0.parse(rest)?;
    if let Ok((after_paren, _)) = char::<_, nom::error::Error<_>>('(').parse(after_space) {
        let inner = nest(after_space, depth)?;
        let (rest, args) = arguments(after_paren, inner)?;
        return Ok((rest, Expr::Call(name.to_string(), args)));
    }
    Ok((rest, Expr::Ident(name.to_string())))
}

/// Parse a power expression; the exponent may carry its own sign.
fn power(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, base) = primary(input, depth)?;
    let (after_space, _) = multispace0.parse(input)?;

    match alt((tag::<_, _, nom::error::Error<_>>("**"), tag("^"))).parse(after_space) {
        Ok((rest, _)) => {
            let inner = nest(after_space, depth)?;
            let (rest, exponent) = unary(rest, inner)?;
            Ok((rest, Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent))))
        }
        Err(_) => Ok((input, base)),
    }
}

/// Parse a signed expression
fn unary(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (input, _) = multispace0.parse(input)?;

    match one_of::<_, _, nom::error::Error<_>>("+-").parse(input) {
        Ok((rest, sign)) => {
            let inner = nest(input, depth)?;
            let (rest, operand) = unary(rest, inner)?;
            let op = if sign == '-' { UnaryOp::Neg } else { UnaryOp::Plus };
            Ok((rest, Expr::Unary(op, Box::new(operand))))
        }
        Err(_) => power(input, depth),
    }
}

/// Parse a multiplicative expression (expr * expr, expr / expr)
fn multiplicative(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (mut input, mut left) = unary(input, depth)?;

    loop {
        let (after_space, _) = multispace0.parse(input)?;
        let op = match after_space.chars().next() {
            Some('*') if !after_space.starts_with("**") => BinaryOp::Mul,
            Some('/') => BinaryOp::Div,
            _ => return Ok((input, left)),
        };
        let (rest, right) = unary(&after_space[1..], depth)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right));
        input = rest;
    }
}

/// Parse an additive expression (expr + expr, expr - expr)
fn additive(input: &str, depth: usize) -> IResult<&str, Expr> {
    let (mut input, mut left) = multiplicative(input, depth)?;

    loop {
        let (after_space, _) = multispace0.parse(input)?;
        let op = match after_space.chars().next() {
            Some('+') => BinaryOp::Add,
            Some('-') => BinaryOp::Sub,
            _ => return Ok((input, left)),
        };
        let (rest, right) = multiplicative(&after_space[1..], depth)?;
        left = Expr::Binary(op, Box::new(left), Box::new(right));
        input = rest;
    }
}
