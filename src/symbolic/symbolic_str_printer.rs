//! # Generic string printer
//!
//! Precedence-aware text rendering of `Expr`, the default every target
//! specific printer falls back to.
//!
//! The rendering functions (`print_add`, `print_mul`, `print_pow`, ...) are
//! free functions generic over the `Printer` trait: children are always
//! rendered through `printer.print(child)`, so a target printer that handles
//! a few node kinds itself and delegates the rest here still gets its own
//! rules applied at every depth of the tree.
//!
//! ```rust, ignore
//! let (x, y) = symbols!(x, y);
//! assert_eq!(sstr(&(x - y)), "x - y");
//! ```
use crate::symbolic::symbolic_engine::Expr;
use itertools::Itertools;
use strum_macros::{Display, EnumIter, EnumString};

pub const PREC_OR: u32 = 20;
pub const PREC_AND: u32 = 30;
pub const PREC_RELATIONAL: u32 = 35;
pub const PREC_ADD: u32 = 40;
pub const PREC_MUL: u32 = 50;
pub const PREC_POW: u32 = 60;
pub const PREC_ATOM: u32 = 1000;

/// Ordering of the terms of a sum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum TermOrder {
    /// construction order
    #[default]
    #[strum(to_string = "none", serialize = "given")]
    Given,
    /// sorted by the generic text of each term
    Lex,
    RevLex,
}

/// A printer renders one node and is called back for every child.
pub trait Printer {
    fn print(&mut self, expr: &Expr) -> String;

    fn term_order(&self) -> TermOrder {
        TermOrder::Given
    }
}

/// The generic printer: every node through `print_default`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrPrinter {
    pub order: TermOrder,
}

impl StrPrinter {
    pub fn new(order: TermOrder) -> Self {
        StrPrinter { order }
    }
}

impl Printer for StrPrinter {
    fn print(&mut self, expr: &Expr) -> String {
        print_default(self, expr)
    }

    fn term_order(&self) -> TermOrder {
        self.order
    }
}

/// generic text of an expression
pub fn sstr(expr: &Expr) -> String {
    StrPrinter::default().print(expr)
}

/// Binding strength of the node's outermost operator. Negative numbers and
/// products with a negative coefficient bind like a sum because they print
/// with a leading minus.
pub fn precedence(expr: &Expr) -> u32 {
    match expr {
        Expr::Add(_) => PREC_ADD,
        Expr::Mul(factors) => match factors.first() {
            Some(coeff) if coeff.is_negative_literal() => PREC_ADD,
            _ => PREC_MUL,
        },
        Expr::Pow(..) => PREC_POW,
        Expr::Integer(n) if *n < 0 => PREC_ADD,
        Expr::Float(v) if *v < 0.0 => PREC_ADD,
        Expr::Rational(p, _) if *p < 0 => PREC_ADD,
        Expr::Rational(..) => PREC_MUL,
        Expr::Relational(..) => PREC_RELATIONAL,
        Expr::NegativeInfinity => PREC_ADD,
        _ => PREC_ATOM,
    }
}

/// Renders `item`, wrapped in parentheses when it binds no tighter than `level`.
pub fn parenthesize<P: Printer + ?Sized>(printer: &mut P, item: &Expr, level: u32) -> String {
    let text = printer.print(item);
    if precedence(item) <= level {
        format!("({})", text)
    } else {
        text
    }
}

/// children rendered through the printer, joined by `sep`
pub fn stringify<P: Printer + ?Sized>(printer: &mut P, items: &[Expr], sep: &str) -> String {
    items.iter().map(|item| printer.print(item)).join(sep)
}

fn ordered_terms(order: TermOrder, terms: &[Expr]) -> Vec<&Expr> {
    match order {
        TermOrder::Given => terms.iter().collect(),
        TermOrder::Lex => terms.iter().sorted_by_cached_key(|t| sstr(t)).collect(),
        TermOrder::RevLex => terms
            .iter()
            .sorted_by_cached_key(|t| sstr(t))
            .rev()
            .collect(),
    }
}

/// `a + b - c`: a leading minus of a rendered term becomes the joining sign
pub fn print_add<P: Printer + ?Sized>(printer: &mut P, terms: &[Expr]) -> String {
    if terms.is_empty() {
        return "0".to_string();
    }
    let mut pieces: Vec<String> = Vec::with_capacity(2 * terms.len());
    for term in ordered_terms(printer.term_order(), terms) {
        let text = printer.print(term);
        let (sign, text) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest.to_string()),
            None => ("+", text),
        };
        pieces.push(sign.to_string());
        if precedence(term) < PREC_ADD {
            pieces.push(format!("({})", text));
        } else {
            pieces.push(text);
        }
    }
    let sign = pieces.remove(0);
    let sign = if sign == "+" { String::new() } else { sign };
    format!("{}{}", sign, pieces.join(" "))
}

/// `-a*b/(c*d)`: factors with a negative rational exponent and rational
/// denominators go below the fraction bar
pub fn print_mul<P: Printer + ?Sized>(printer: &mut P, factors: &[Expr]) -> String {
    let mut sign = "";
    let mut rest: Vec<Expr> = factors.to_vec();
    if let Some(coeff) = rest.first() {
        if coeff.is_negative_literal() {
            sign = "-";
            match coeff.negated_literal() {
                Some(Expr::Integer(1)) | None => {
                    rest.remove(0);
                }
                Some(positive) => rest[0] = positive,
            }
        } else if *coeff == Expr::Integer(1) && rest.len() > 1 {
            rest.remove(0);
        }
    }

    let mut numer: Vec<Expr> = Vec::new();
    let mut denom: Vec<Expr> = Vec::new();
    for item in rest {
        match item {
            Expr::Pow(base, exp)
                if matches!(*exp, Expr::Integer(_) | Expr::Rational(..))
                    && exp.is_negative_literal() =>
            {
                match exp.negated_literal() {
                    Some(Expr::Integer(1)) => denom.push(*base),
                    Some(positive) => denom.push(Expr::Pow(base, Box::new(positive))),
                    None => unreachable!("integer and rational literals negate"),
                }
            }
            Expr::Rational(p, q) => {
                if p != 1 {
                    numer.push(Expr::Integer(p));
                }
                denom.push(Expr::Integer(q));
            }
            Expr::Integer(1) => {}
            other => numer.push(other),
        }
    }
    if numer.is_empty() {
        numer.push(Expr::Integer(1));
    }
    let a = numer
        .iter()
        .map(|f| parenthesize(printer, f, PREC_MUL))
        .join("*");
    let b: Vec<String> = denom
        .iter()
        .map(|f| parenthesize(printer, f, PREC_MUL))
        .collect();
    match b.len() {
        0 => format!("{}{}", sign, a),
        1 => format!("{}{}/{}", sign, a, b[0]),
        _ => format!("{}{}/({})", sign, a, b.join("*")),
    }
}

/// `base**exp`, with `sqrt(base)` for a one-half exponent and `1/base` for minus one
pub fn print_pow<P: Printer + ?Sized>(printer: &mut P, base: &Expr, exp: &Expr) -> String {
    match exp {
        Expr::Rational(1, 2) => format!("sqrt({})", printer.print(base)),
        Expr::Integer(-1) => format!("1/{}", parenthesize(printer, base, PREC_POW)),
        _ => format!(
            "{}**{}",
            parenthesize(printer, base, PREC_POW),
            parenthesize(printer, exp, PREC_POW)
        ),
    }
}

pub fn print_function<P: Printer + ?Sized>(printer: &mut P, name: &str, args: &[Expr]) -> String {
    format!("{}({})", name, stringify(printer, args, ", "))
}

/// Generic rendering of every node kind.
pub fn print_default<P: Printer + ?Sized>(printer: &mut P, expr: &Expr) -> String {
    match expr {
        Expr::Integer(n) => n.to_string(),
        Expr::Rational(p, q) => format!("{}/{}", p, q),
        Expr::Float(v) => format!("{:?}", v),
        Expr::Symbol(name) => name.clone(),
        Expr::ImaginaryUnit => "I".to_string(),
        Expr::NumberSymbol(ns) => ns.to_string(),
        Expr::Add(terms) => print_add(printer, terms),
        Expr::Mul(factors) => print_mul(printer, factors),
        Expr::Pow(base, exp) => print_pow(printer, base, exp),
        Expr::Function(name, args) => print_function(printer, name, args),
        Expr::Relational(op, lhs, rhs) => format!(
            "{} {} {}",
            parenthesize(printer, lhs, PREC_RELATIONAL),
            op,
            parenthesize(printer, rhs, PREC_RELATIONAL)
        ),
        Expr::BooleanTrue => "True".to_string(),
        Expr::BooleanFalse => "False".to_string(),
        Expr::Piecewise(pairs) => format!(
            "Piecewise({})",
            pairs
                .iter()
                .map(|(value, cond)| format!("({}, {})", printer.print(value), printer.print(cond)))
                .join(", ")
        ),
        Expr::Idx(idx) => idx.label.clone(),
        Expr::Indexed(base, indices) => format!("{}[{}]", base, stringify(printer, indices, ", ")),
        Expr::Derivative(e, vars) => format!(
            "Derivative({}, {})",
            printer.print(e),
            stringify(printer, vars, ", ")
        ),
        Expr::Integral(e, vars) => format!(
            "Integral({}, {})",
            printer.print(e),
            stringify(printer, vars, ", ")
        ),
        Expr::Limit(e, z, z0) => format!(
            "Limit({}, {}, {})",
            printer.print(e),
            printer.print(z),
            printer.print(z0)
        ),
        Expr::Infinity => "oo".to_string(),
        Expr::NegativeInfinity => "-oo".to_string(),
        Expr::ComplexInfinity => "zoo".to_string(),
        Expr::NaN => "nan".to_string(),
        Expr::Matrix(rows) => format!(
            "Matrix([{}])",
            rows.iter()
                .map(|row| format!("[{}]", stringify(printer, row, ", ")))
                .join(", ")
        ),
        Expr::Interval(a, b) => format!("Interval({}, {})", printer.print(a), printer.print(b)),
        Expr::FiniteSet(items) => format!("{{{}}}", stringify(printer, items, ", ")),
        Expr::RandomVariable(dist, params) => {
            format!("{}({})", dist, stringify(printer, params, ", "))
        }
        Expr::Wild(name) => format!("{}_", name),
        Expr::Order(e) => format!("O({})", printer.print(e)),
        Expr::Tuple(items) if items.len() == 1 => format!("({},)", printer.print(&items[0])),
        Expr::Tuple(items) => format!("({})", stringify(printer, items, ", ")),
        Expr::List(items) => format!("[{}]", stringify(printer, items, ", ")),
        Expr::Dict(pairs) => format!(
            "{{{}}}",
            pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", printer.print(k), printer.print(v)))
                .join(", ")
        ),
    }
}
