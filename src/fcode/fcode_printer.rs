//! # Fortran code printer
//!
//! Converts a single `Expr` into Fortran 77 statements, using the intrinsic
//! functions of the Fortran 77 standard where possible.
//!
//! ## Pipeline
//! 1. named constants (pi, E, ...) are collected and evaluated to the
//!    requested precision; they become `parameter` statements
//! 2. every loop index found in the expression (and in the assignment
//!    target) opens a `do` loop around the statement
//! 3. the expression is rendered node by node; a top-level `Piecewise`
//!    becomes an `if`/`else if`/`else` chain
//! 4. lines get their leading columns, are wrapped to the column limits and,
//!    in free format, indented
//!
//! Constructs without a Fortran spelling (derivatives, integrals, infinities,
//! unknown functions, ...) are still printed as best-effort text, and are
//! listed in a `Not Fortran` comment block (human mode) or returned in the
//! unsupported set (structured mode).
//!
//! Fortran is case-insensitive while symbols are not; generating properly
//! cased names is left to the caller.
//!
//! # Example
//! ```rust, ignore
//! let x = Expr::sym("x");
//! let settings = FcodeSettings::builder().assign_to("s").build()?;
//! assert_eq!(fcode(&x.sin(), &settings).to_string(), "      s = sin(x)");
//! ```
use crate::Utils::logger::init_term_logger;
use crate::fcode::fcode_indent::indent_code;
use crate::fcode::fcode_settings::{FcodeSettings, FullPrecision, SourceFormat};
use crate::fcode::fcode_wrap::{pad_leading_columns, wrap_fortran};
use crate::symbolic::symbolic_engine::{Expr, Idx, RelOp};
use crate::symbolic::symbolic_numeric::format_float;
use crate::symbolic::symbolic_str_printer::{
    PREC_POW, PREC_RELATIONAL, Printer, TermOrder, parenthesize, precedence, print_add, print_mul,
    print_pow, sstr,
};
use itertools::Itertools;
use log::{debug, info};
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Functions of the Fortran 77 standard, by the name they carry in expressions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum IntrinsicFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Log,
    Exp,
    Abs,
    Sign,
    Conjugate,
}

impl IntrinsicFunction {
    pub fn fortran_name(self) -> &'static str {
        match self {
            IntrinsicFunction::Conjugate => "conjg",
            other => other.into(),
        }
    }
}

/// Sub-expressions met during one printing call that have no Fortran equivalent.
/// Keeps the first occurrence of each distinct expression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnsupportedSet {
    items: Vec<Expr>,
}

impl UnsupportedSet {
    pub fn new() -> Self {
        UnsupportedSet { items: Vec::new() }
    }

    /// true if the expression was not in the set yet
    pub fn insert(&mut self, expr: &Expr) -> bool {
        if self.items.contains(expr) {
            false
        } else {
            self.items.push(expr.clone());
            true
        }
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.items.contains(expr)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Expr> {
        self.items.iter()
    }

    /// members sorted by their text; equal texts keep insertion order
    pub fn sorted(&self) -> Vec<&Expr> {
        self.items.iter().sorted_by_cached_key(|e| sstr(e)).collect()
    }
}

impl<'a> IntoIterator for &'a UnsupportedSet {
    type Item = &'a Expr;
    type IntoIter = std::slice::Iter<'a, Expr>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The pieces of a non-human result
#[derive(Clone, Debug, PartialEq)]
pub struct FcodeParts {
    /// (name, value) of each named constant, sorted by name
    pub number_symbols: Vec<(String, String)>,
    pub not_fortran: UnsupportedSet,
    /// padded, wrapped and indented statements
    pub code: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FcodeOutput {
    /// parameter statements, warnings and code in one block of text
    Human(String),
    Structured(FcodeParts),
}

impl FcodeOutput {
    /// the text block in human mode, the code alone otherwise
    pub fn text(&self) -> &str {
        match self {
            FcodeOutput::Human(text) => text,
            FcodeOutput::Structured(parts) => &parts.code,
        }
    }

    pub fn into_parts(self) -> Option<FcodeParts> {
        match self {
            FcodeOutput::Human(_) => None,
            FcodeOutput::Structured(parts) => Some(parts),
        }
    }
}

impl fmt::Display for FcodeOutput {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

/// `do` statements opening the loops and matching `end do` statements
struct LoopNest {
    open: Vec<String>,
    close: Vec<String>,
}

/// A printer to convert expressions to strings of Fortran code
#[derive(Clone, Debug, Default)]
pub struct FCodePrinter {
    settings: FcodeSettings,
}

impl FCodePrinter {
    pub fn new(settings: FcodeSettings) -> Self {
        FCodePrinter { settings }
    }

    pub fn settings(&self) -> &FcodeSettings {
        &self.settings
    }

    /// Returns Fortran code for expr
    pub fn doprint(&self, expr: &Expr) -> FcodeOutput {
        let settings = &self.settings;
        let format = settings.source_format();

        let number_symbols: Vec<(String, String)> = expr
            .number_symbols()
            .into_iter()
            .sorted_by_cached_key(|ns| ns.to_string())
            .map(|ns| (ns.to_string(), ns.evalf(settings.precision())))
            .collect();

        let mut not_fortran = UnsupportedSet::new();
        let body = FortranPass::new(settings, &mut not_fortran).statements(expr);
        info!(
            "fcode: {} statement lines, {} parameters, {} constructs without Fortran equivalent",
            body.len(),
            number_symbols.len(),
            not_fortran.len()
        );

        if settings.human() {
            let mut lines: Vec<String> = Vec::new();
            if !not_fortran.is_empty() {
                lines.push("! Not Fortran:".to_string());
                for item in not_fortran.sorted() {
                    lines.push(format!("! {}", sstr(item)));
                }
            }
            for (name, value) in &number_symbols {
                lines.push(format!("parameter ({} = {})", name, value));
            }
            lines.extend(body);
            FcodeOutput::Human(layout(&lines, format).join("\n"))
        } else {
            FcodeOutput::Structured(FcodeParts {
                number_symbols,
                not_fortran,
                code: layout(&body, format).join("\n"),
            })
        }
    }
}

/// leading columns, wrapping, indentation
fn layout(lines: &[String], format: SourceFormat) -> Vec<String> {
    let padded = pad_leading_columns(lines, format);
    let wrapped = wrap_fortran(&padded, format);
    indent_code(&wrapped, format)
}

/// State of one printing call. Dropped when the call returns, so nothing
/// leaks from one expression into the next.
struct FortranPass<'a> {
    settings: &'a FcodeSettings,
    not_fortran: &'a mut UnsupportedSet,
    /// nesting depth of the node being printed, 1 at the top
    level: usize,
}

impl<'a> FortranPass<'a> {
    fn new(settings: &'a FcodeSettings, not_fortran: &'a mut UnsupportedSet) -> Self {
        FortranPass {
            settings,
            not_fortran,
            level: 0,
        }
    }

    /// Loops over the indices of the expression; indices that only occur on
    /// the assignment target become the outermost loops.
    fn loops(&mut self, expr: &Expr) -> LoopNest {
        let rhs_indices = expr.indices();
        let mut indices: Vec<Idx> = match self.settings.assign_to() {
            Some(lhs) => lhs
                .indices()
                .into_iter()
                .filter(|idx| !rhs_indices.contains(idx))
                .collect(),
            None => Vec::new(),
        };
        indices.extend(rhs_indices);

        let mut open = Vec::with_capacity(indices.len());
        for idx in &indices {
            // Fortran arrays start at 1 and end at the dimension
            let lower = self.print(&idx.lower.shifted(1));
            let upper = self.print(&idx.upper.shifted(1));
            open.push(format!("do {} = {}, {}", idx.label, lower, upper));
        }
        debug!("fcode: loops {:?}", open);
        LoopNest {
            close: vec!["end do".to_string(); open.len()],
            open,
        }
    }

    /// statement lines of the expression, without leading columns
    fn statements(&mut self, expr: &Expr) -> Vec<String> {
        let nest = self.loops(expr);
        let settings = self.settings;
        let lhs = settings.assign_to().map(|target| self.print(target));
        let assign = |value: String| match &lhs {
            Some(lhs) => format!("{} = {}", lhs, value),
            None => value,
        };

        let mut lines = Vec::new();
        match expr {
            Expr::Piecewise(branches) if !branches.is_empty() => {
                let last = branches.len() - 1;
                for (i, (value, cond)) in branches.iter().enumerate() {
                    if i == 0 {
                        lines.push(format!("if ({}) then", self.print(cond)));
                    } else if i == last && *cond == Expr::BooleanTrue {
                        lines.push("else".to_string());
                    } else {
                        lines.push(format!("else if ({}) then", self.print(cond)));
                    }
                    lines.extend(nest.open.iter().cloned());
                    let value = self.print(value);
                    lines.push(format!("  {}", assign(value)));
                    lines.extend(nest.close.iter().cloned());
                }
                lines.push("end if".to_string());
            }
            _ => {
                lines.extend(nest.open.iter().cloned());
                let value = self.print(expr);
                lines.push(assign(value));
                lines.extend(nest.close.iter().cloned());
            }
        }
        lines
    }

    fn print_not_fortran(&mut self, expr: &Expr) -> String {
        let text = sstr(expr);
        if self.not_fortran.insert(expr) {
            debug!("fcode: no Fortran equivalent for {}", text);
        }
        text
    }

    /// complex numbers are collected into one cmplx(real, imag) call
    fn print_add(&mut self, expr: &Expr, terms: &[Expr]) -> String {
        let mut pure_real = Vec::new();
        let mut pure_imaginary = Vec::new();
        let mut mixed = Vec::new();
        for term in terms {
            if term.is_real_number() {
                pure_real.push(term.clone());
            } else if term.is_imaginary_number() {
                pure_imaginary.push(term.imaginary_coefficient());
            } else {
                mixed.push(term.clone());
            }
        }
        if pure_imaginary.is_empty() {
            return print_add(self, terms);
        }
        let real = self.print(&Expr::add_of(pure_real));
        let imaginary = self.print(&Expr::add_of(pure_imaginary));
        if mixed.is_empty() {
            return format!("cmplx({},{})", real, imaginary);
        }
        let term = Expr::add_of(mixed);
        let text = self.print(&term);
        let (sign, text) = match text.strip_prefix('-') {
            Some(rest) => ("-", rest.to_string()),
            None => ("+", text),
        };
        let text = if precedence(&term) < precedence(expr) {
            format!("({})", text)
        } else {
            text
        };
        format!("cmplx({},{}) {} {}", real, imaginary, sign, text)
    }

    fn print_mul(&mut self, expr: &Expr, factors: &[Expr]) -> String {
        if expr.is_imaginary_number() {
            let imaginary = self.print(&expr.imaginary_coefficient());
            return format!("cmplx(0,{})", imaginary);
        }
        let (rationals, rest): (Vec<&Expr>, Vec<&Expr>) = factors
            .iter()
            .partition(|f| matches!(f, Expr::Rational(..)));
        if rationals.is_empty() {
            return print_mul(self, factors);
        }
        // rational factors stay one real division in front: 3.0/7.0*x
        let (p, q) = rationals
            .iter()
            .fold((1i64, 1i64), |(p, q), r| match r {
                Expr::Rational(a, b) => (p * a, q * b),
                _ => (p, q),
            });
        let rest: Vec<Expr> = rest.into_iter().cloned().collect();
        let (p, q) = match Expr::rational(p, q) {
            Expr::Rational(p, q) => (p, q),
            integer => {
                let mut factors = vec![integer];
                factors.extend(rest);
                return print_mul(self, &factors);
            }
        };
        let coeff = self.print(&Expr::Rational(p.abs(), q));
        if rest.is_empty() {
            let sign = if p < 0 { "-" } else { "" };
            return format!("{}{}", sign, coeff);
        }
        let rest_text = print_mul(self, &rest);
        let (negative, rest_text) = match rest_text.strip_prefix('-') {
            Some(stripped) => (p > 0, stripped.to_string()),
            None => (p < 0, rest_text),
        };
        let sign = if negative { "-" } else { "" };
        format!("{}{}*{}", sign, coeff, rest_text)
    }

    fn print_pow(&mut self, base: &Expr, exp: &Expr) -> String {
        match exp {
            Expr::Integer(-1) => format!("1.0/{}", parenthesize(self, base, PREC_POW)),
            Expr::Rational(1, 2) => format!("sqrt({})", self.print(base)),
            Expr::Float(v) if *v == 0.5 => format!("sqrt({})", self.print(base)),
            _ => print_pow(self, base, exp),
        }
    }

    fn print_function(&mut self, expr: &Expr, name: &str, args: &[Expr]) -> String {
        let settings = self.settings;
        let fortran_name = match settings.user_functions().get(name) {
            Some(user_name) => user_name.clone(),
            None => match IntrinsicFunction::from_str(name) {
                Ok(intrinsic) => intrinsic.fortran_name().to_string(),
                Err(_) => {
                    self.print_not_fortran(expr);
                    name.to_string()
                }
            },
        };
        let args = args.iter().map(|arg| self.print(arg)).join(", ");
        format!("{}({})", fortran_name, args)
    }

    fn print_float(&self, value: f64) -> String {
        let strip = match self.settings.full_prec() {
            FullPrecision::Always => false,
            FullPrecision::Never => true,
            FullPrecision::Auto => self.level > 1,
        };
        format_float(value, self.settings.precision(), strip)
    }

    fn print_node(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Integer(n) => n.to_string(),
            // real division, never integer division
            Expr::Rational(p, q) => format!("{}.0/{}.0", p, q),
            Expr::Float(v) if v.is_finite() => self.print_float(*v),
            Expr::Float(_) => self.print_not_fortran(expr),
            Expr::Symbol(name) => name.clone(),
            Expr::ImaginaryUnit => "cmplx(0,1)".to_string(),
            // declared by a parameter statement
            Expr::NumberSymbol(ns) => ns.to_string(),
            Expr::Add(terms) => self.print_add(expr, terms),
            Expr::Mul(factors) => self.print_mul(expr, factors),
            Expr::Pow(base, exp) => self.print_pow(base, exp),
            Expr::Function(name, args) => self.print_function(expr, name, args),
            Expr::Relational(op, lhs, rhs) => format!(
                "{} {} {}",
                parenthesize(self, lhs, PREC_RELATIONAL),
                relational_operator(*op),
                parenthesize(self, rhs, PREC_RELATIONAL)
            ),
            Expr::BooleanTrue => ".true.".to_string(),
            Expr::BooleanFalse => ".false.".to_string(),
            Expr::Idx(idx) => idx.label.clone(),
            Expr::Indexed(base, indices) => {
                let indices = indices.iter().map(|i| self.print(i)).join(", ");
                format!("{}({})", base, indices)
            }
            Expr::Piecewise(_)
            | Expr::Derivative(..)
            | Expr::Integral(..)
            | Expr::Limit(..)
            | Expr::Infinity
            | Expr::NegativeInfinity
            | Expr::ComplexInfinity
            | Expr::NaN
            | Expr::Matrix(_)
            | Expr::Interval(..)
            | Expr::FiniteSet(_)
            | Expr::RandomVariable(..)
            | Expr::Wild(_)
            | Expr::Order(_)
            | Expr::Tuple(_)
            | Expr::List(_)
            | Expr::Dict(_) => self.print_not_fortran(expr),
        }
    }
}

impl Printer for FortranPass<'_> {
    fn print(&mut self, expr: &Expr) -> String {
        self.level += 1;
        let text = self.print_node(expr);
        self.level -= 1;
        text
    }

    fn term_order(&self) -> TermOrder {
        self.settings.order()
    }
}

fn relational_operator(op: RelOp) -> &'static str {
    match op {
        RelOp::Eq => ".eq.",
        RelOp::Ne => ".ne.",
        RelOp::Lt => ".lt.",
        RelOp::Le => ".le.",
        RelOp::Gt => ".gt.",
        RelOp::Ge => ".ge.",
    }
}

/// Converts an expression to Fortran 77 code.
///
/// In human mode (the default) the result is one block of text with
/// parameter statements for named constants and a comment block listing
/// the constructs that are not Fortran; otherwise the same information
/// comes back as `FcodeParts`.
pub fn fcode(expr: &Expr, settings: &FcodeSettings) -> FcodeOutput {
    FCodePrinter::new(settings.clone()).doprint(expr)
}

/// Prints the human-readable Fortran code of the expression to stdout,
/// installing a terminal logger first when the settings carry a loglevel.
pub fn print_fcode(expr: &Expr, settings: &FcodeSettings) {
    if let Some(level) = settings.loglevel() {
        init_term_logger(level);
    }
    println!("{}", fcode(expr, &settings.to_human()));
}
