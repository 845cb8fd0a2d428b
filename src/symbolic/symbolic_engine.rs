//! # Symbolic Engine Module
//!
//! The expression tree consumed by the code printers of this crate.
//!
//! ## Purpose
//!
//! The engine does not simplify or evaluate anything on its own: a tree is
//! built once (by a CAS front end, a parser or by hand in tests) and then
//! handed to a printer. The module therefore only provides
//! - the closed `Expr` enum with every node kind a printer has to know about
//! - constructors that keep `Add`/`Mul` flat and rationals normalized
//! - operator overloading so trees read like formulas: `x.clone() * y + 2`
//! - child iteration (`args`, `walk`) used by the printers' pre-scans
//!
//! ## Node kinds
//!
//! - **Numbers**: `Integer`, `Rational` (always normalized, `q > 1`), `Float`
//! - **Atoms**: `Symbol`, `ImaginaryUnit`, `NumberSymbol` (pi, E, ...)
//! - **Operations**: n-ary `Add` and `Mul`, binary `Pow`
//! - **Functions**: `Function(name, args)` - the name is the function identity
//! - **Logic**: `Relational`, `BooleanTrue`, `BooleanFalse`, `Piecewise`
//! - **Tensors**: `Idx` (loop index with inclusive 0-based bounds), `Indexed`
//! - **Everything else** (`Derivative`, `Integral`, `Limit`, infinities,
//!   `Matrix`, sets, random variables, wildcards, raw aggregates): kinds that
//!   a target language usually has no direct spelling for.

#![allow(non_camel_case_types)]

use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

/// Named mathematical constants. They have no literal spelling in most target
/// languages, so printers declare them before use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, EnumIter)]
pub enum NumberSymbol {
    #[strum(serialize = "pi")]
    Pi,
    #[strum(serialize = "E")]
    E,
    #[strum(serialize = "EulerGamma")]
    EulerGamma,
    #[strum(serialize = "Catalan")]
    Catalan,
    #[strum(serialize = "GoldenRatio")]
    GoldenRatio,
}

/// Comparison operators of `Expr::Relational`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum RelOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    Ne,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    Le,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    Ge,
}

/// Probability distributions a random variable can be drawn from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Distribution {
    Normal,
    Uniform,
    Exponential,
    Poisson,
}

/// Loop index with inclusive, 0-based bounds: `Idx::new("i", 10)` runs over 0..=9.
#[derive(Clone, Debug, PartialEq)]
pub struct Idx {
    pub label: String,
    pub lower: Box<Expr>,
    pub upper: Box<Expr>,
}

impl Idx {
    /// index running over `0..=range-1`
    pub fn new(label: &str, range: i64) -> Idx {
        Idx::with_bounds(label, Expr::Integer(0), Expr::Integer(range - 1))
    }
    /// index running over `0..=n-1` for a symbolic dimension `n`
    pub fn symbolic(label: &str, range: Expr) -> Idx {
        Idx::with_bounds(label, Expr::Integer(0), range.shifted(-1))
    }
    pub fn with_bounds(label: &str, lower: Expr, upper: Expr) -> Idx {
        Idx {
            label: label.to_string(),
            lower: Box::new(lower),
            upper: Box::new(upper),
        }
    }
    pub fn to_expr(&self) -> Expr {
        Expr::Idx(self.clone())
    }
}

/// Core symbolic expression enum.
///
/// Each variant is one node kind of the tree. `Add` and `Mul` are n-ary and
/// keep their operands in construction order; printers may reorder them.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Integer(i64),
    /// numerator, denominator (normalized: gcd 1, denominator > 1)
    Rational(i64, i64),
    Float(f64),
    Symbol(String),
    ImaginaryUnit,
    NumberSymbol(NumberSymbol),
    Add(Vec<Expr>),
    Mul(Vec<Expr>),
    /// base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// function identity (its name) and arguments
    Function(String, Vec<Expr>),
    Relational(RelOp, Box<Expr>, Box<Expr>),
    BooleanTrue,
    BooleanFalse,
    /// (value, condition) pairs, first matching condition wins
    Piecewise(Vec<(Expr, Expr)>),
    Idx(Idx),
    /// base label and one index expression per dimension
    Indexed(String, Vec<Expr>),
    /// expression, differentiation variables
    Derivative(Box<Expr>, Vec<Expr>),
    /// integrand, integration variables
    Integral(Box<Expr>, Vec<Expr>),
    /// expression, variable, point
    Limit(Box<Expr>, Box<Expr>, Box<Expr>),
    Infinity,
    NegativeInfinity,
    ComplexInfinity,
    NaN,
    Matrix(Vec<Vec<Expr>>),
    Interval(Box<Expr>, Box<Expr>),
    FiniteSet(Vec<Expr>),
    RandomVariable(Distribution, Vec<Expr>),
    /// pattern wildcard
    Wild(String),
    /// big-O term
    Order(Box<Expr>),
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
}

/// Display goes through the generic precedence-aware printer.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", crate::symbolic::symbolic_str_printer::sstr(self))
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Expr {
    /// BASIC CONSTRUCTORS

    pub fn sym(name: &str) -> Expr {
        Expr::Symbol(name.to_string())
    }

    /// Creates multiple symbols from a comma-separated string: `Expr::Symbols("x, y")`
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(Expr::sym)
            .collect()
    }

    pub fn int(n: i64) -> Expr {
        Expr::Integer(n)
    }

    pub fn float(v: f64) -> Expr {
        Expr::Float(v)
    }

    /// Normalized rational p/q; collapses to an integer when q divides p.
    /// # Panics
    /// on a zero denominator
    pub fn rational(p: i64, q: i64) -> Expr {
        assert!(q != 0, "rational with zero denominator");
        let g = gcd(p, q).max(1);
        let (mut p, mut q) = (p / g, q / g);
        if q < 0 {
            p = -p;
            q = -q;
        }
        if q == 1 {
            Expr::Integer(p)
        } else {
            Expr::Rational(p, q)
        }
    }

    pub fn I() -> Expr {
        Expr::ImaginaryUnit
    }

    pub fn pi() -> Expr {
        Expr::NumberSymbol(NumberSymbol::Pi)
    }

    pub fn E() -> Expr {
        Expr::NumberSymbol(NumberSymbol::E)
    }

    pub fn func(name: &str, args: Vec<Expr>) -> Expr {
        Expr::Function(name.to_string(), args)
    }

    pub fn sin(self) -> Expr {
        Expr::func("sin", vec![self])
    }

    pub fn cos(self) -> Expr {
        Expr::func("cos", vec![self])
    }

    pub fn exp(self) -> Expr {
        Expr::func("exp", vec![self])
    }

    pub fn log(self) -> Expr {
        Expr::func("log", vec![self])
    }

    pub fn conjugate(self) -> Expr {
        Expr::func("conjugate", vec![self])
    }

    pub fn pow(self, exp: Expr) -> Expr {
        Expr::Pow(self.boxed(), exp.boxed())
    }

    pub fn sqrt(self) -> Expr {
        self.pow(Expr::Rational(1, 2))
    }

    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// Builds a sum without flattening surprises: no terms gives 0, one term is returned as is
    pub fn add_of(mut terms: Vec<Expr>) -> Expr {
        match terms.len() {
            0 => Expr::Integer(0),
            1 => terms.remove(0),
            _ => Expr::Add(terms),
        }
    }

    /// Builds a product: no factors gives 1, one factor is returned as is
    pub fn mul_of(mut factors: Vec<Expr>) -> Expr {
        match factors.len() {
            0 => Expr::Integer(1),
            1 => factors.remove(0),
            _ => Expr::Mul(factors),
        }
    }

    pub fn lt(self, rhs: Expr) -> Expr {
        Expr::Relational(RelOp::Lt, self.boxed(), rhs.boxed())
    }

    pub fn le(self, rhs: Expr) -> Expr {
        Expr::Relational(RelOp::Le, self.boxed(), rhs.boxed())
    }

    pub fn gt(self, rhs: Expr) -> Expr {
        Expr::Relational(RelOp::Gt, self.boxed(), rhs.boxed())
    }

    pub fn ge(self, rhs: Expr) -> Expr {
        Expr::Relational(RelOp::Ge, self.boxed(), rhs.boxed())
    }

    /// `base[i, j, ...]`
    pub fn indexed(base: &str, indices: &[Idx]) -> Expr {
        Expr::Indexed(
            base.to_string(),
            indices.iter().map(|i| i.to_expr()).collect(),
        )
    }

    pub fn derivative(self, vars: Vec<Expr>) -> Expr {
        Expr::Derivative(self.boxed(), vars)
    }

    pub fn integral(self, vars: Vec<Expr>) -> Expr {
        Expr::Integral(self.boxed(), vars)
    }

    /// expression + n, folding n into an integer term when there is one
    pub fn shifted(&self, n: i64) -> Expr {
        match self {
            Expr::Integer(m) => Expr::Integer(m + n),
            Expr::Add(terms) => {
                let mut rest = Vec::with_capacity(terms.len());
                let mut constant = n;
                for term in terms {
                    match term {
                        Expr::Integer(m) => constant += m,
                        _ => rest.push(term.clone()),
                    }
                }
                if constant != 0 {
                    rest.push(Expr::Integer(constant));
                }
                Expr::add_of(rest)
            }
            _ if n == 0 => self.clone(),
            _ => Expr::Add(vec![self.clone(), Expr::Integer(n)]),
        }
    }

    /// TREE TRAVERSAL

    /// Direct children of the node, in printing order.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Integer(_)
            | Expr::Rational(..)
            | Expr::Float(_)
            | Expr::Symbol(_)
            | Expr::ImaginaryUnit
            | Expr::NumberSymbol(_)
            | Expr::BooleanTrue
            | Expr::BooleanFalse
            | Expr::Infinity
            | Expr::NegativeInfinity
            | Expr::ComplexInfinity
            | Expr::NaN
            | Expr::Wild(_) => vec![],
            Expr::Add(items)
            | Expr::Mul(items)
            | Expr::Function(_, items)
            | Expr::Indexed(_, items)
            | Expr::FiniteSet(items)
            | Expr::RandomVariable(_, items)
            | Expr::Tuple(items)
            | Expr::List(items) => items.iter().collect(),
            Expr::Pow(a, b) | Expr::Relational(_, a, b) | Expr::Interval(a, b) => {
                vec![a.as_ref(), b.as_ref()]
            }
            Expr::Piecewise(pairs) | Expr::Dict(pairs) => {
                pairs.iter().flat_map(|(a, b)| [a, b]).collect()
            }
            Expr::Idx(idx) => vec![idx.lower.as_ref(), idx.upper.as_ref()],
            Expr::Derivative(e, vars) | Expr::Integral(e, vars) => {
                std::iter::once(e.as_ref()).chain(vars.iter()).collect()
            }
            Expr::Limit(e, z, z0) => vec![e.as_ref(), z.as_ref(), z0.as_ref()],
            Expr::Matrix(rows) => rows.iter().flatten().collect(),
            Expr::Order(e) => vec![e.as_ref()],
        }
    }

    /// Pre-order traversal: node first, then its children left to right.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        for child in self.args() {
            child.walk(visit);
        }
    }

    /// distinct number symbols of the tree, in order of first appearance
    pub fn number_symbols(&self) -> Vec<NumberSymbol> {
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if let Expr::NumberSymbol(ns) = e {
                if !found.contains(ns) {
                    found.push(*ns);
                }
            }
        });
        found
    }

    /// distinct loop indices of the tree, in order of first appearance
    pub fn indices(&self) -> Vec<Idx> {
        let mut found: Vec<Idx> = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Idx(idx) = e {
                if !found.contains(idx) {
                    found.push(idx.clone());
                }
            }
        });
        found
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Expr::Symbol(_))
    }

    /// true for Integer, Rational and Float nodes
    pub fn is_number_literal(&self) -> bool {
        matches!(self, Expr::Integer(_) | Expr::Rational(..) | Expr::Float(_))
    }

    /// true for negative Integer, Rational and Float nodes
    pub fn is_negative_literal(&self) -> bool {
        match self {
            Expr::Integer(n) => *n < 0,
            Expr::Rational(p, _) => *p < 0,
            Expr::Float(v) => *v < 0.0,
            _ => false,
        }
    }

    /// Numeric negation of a literal; None for anything else
    pub fn negated_literal(&self) -> Option<Expr> {
        match self {
            Expr::Integer(n) => Some(Expr::Integer(-n)),
            Expr::Rational(p, q) => Some(Expr::Rational(-p, *q)),
            Expr::Float(v) => Some(Expr::Float(-v)),
            _ => None,
        }
    }
}

/// OPERATOR OVERLOADING
/// Sums and products are flattened so that `x + y + z` is one Add with three terms.
impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut terms = match self {
            Expr::Add(terms) => terms,
            other => vec![other],
        };
        match rhs {
            Expr::Add(more) => terms.extend(more),
            other => terms.push(other),
        }
        Expr::Add(terms)
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        let mut factors = match self {
            Expr::Mul(factors) => factors,
            other => vec![other],
        };
        match rhs {
            Expr::Mul(more) => factors.extend(more),
            other => factors.push(other),
        }
        Expr::Mul(factors)
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self * rhs.pow(Expr::Integer(-1))
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        if let Some(negated) = self.negated_literal() {
            return negated;
        }
        match self {
            Expr::Mul(mut factors) => {
                let coeff = factors.first().and_then(|c| c.negated_literal());
                match coeff {
                    Some(Expr::Integer(1)) => {
                        factors.remove(0);
                        Expr::mul_of(factors)
                    }
                    Some(coeff) => {
                        factors[0] = coeff;
                        Expr::Mul(factors)
                    }
                    None => {
                        factors.insert(0, Expr::Integer(-1));
                        Expr::Mul(factors)
                    }
                }
            }
            other => Expr::Mul(vec![Expr::Integer(-1), other]),
        }
    }
}

impl std::ops::Add<i64> for Expr {
    type Output = Self;

    fn add(self, rhs: i64) -> Self::Output {
        self + Expr::Integer(rhs)
    }
}

impl std::ops::Mul<Expr> for i64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        Expr::Integer(self) * rhs
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::Integer(n)
    }
}

impl From<f64> for Expr {
    fn from(v: f64) -> Self {
        Expr::Float(v)
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::sym(name)
    }
}

impl From<Idx> for Expr {
    fn from(idx: Idx) -> Self {
        Expr::Idx(idx)
    }
}

/// Macro to create multiple symbols at once
/// Usage: let (x, y, z) = symbols!(x, y, z);
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        {
            let var_names = stringify!($($var),+);
            let vars = $crate::symbolic::symbolic_engine::Expr::Symbols(var_names);
            let mut iter = vars.into_iter();
            ($(
                {
                    let $var = iter.next().unwrap();
                    $var
                }
            ),+)
        }
    };
}
