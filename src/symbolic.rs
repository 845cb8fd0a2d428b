#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree handed to the code printers:
/// 1) node kinds from numbers and symbols up to derivatives, matrices and sets
/// 2) operator overloading so that trees are written like formulas
/// 3) traversal helpers (children, pre-order walk, constants and loop indices of a tree)
///# Example#
/// ```
/// use RustedFcode::symbolic::symbolic_engine::Expr;
/// use RustedFcode::symbols;
/// let (x, y) = symbols!(x, y);
/// let expr = x.clone().pow(Expr::int(2)) + y.sin();
/// assert_eq!(expr.to_string(), "x**2 + sin(y)");
/// ```
pub mod symbolic_engine;
/// complex evaluation of constant subtrees, real/imaginary predicates,
/// digits of named constants and decimal rendering of floats
pub mod symbolic_numeric;
/// precedence-aware generic text of an expression and the `Printer` trait
/// every target printer implements
pub mod symbolic_str_printer;
