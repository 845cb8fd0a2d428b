#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
///____________________________________________________________________________________________________________________________
/// # Fortran 77 code printer
/// turns a symbolic expression into Fortran statements:
/// 1) named constants become `parameter` declarations
/// 2) loop indices found in the expression or the assignment target open `do` loops
/// 3) a top-level `Piecewise` becomes an `if`/`else if`/`else` chain
/// 4) constructs Fortran cannot express are still printed and listed in a `Not Fortran` comment
/// 5) lines are wrapped to the column limits of fixed or free source format
///# Example#
/// ```
/// use RustedFcode::fcode::{FcodeSettings, fcode};
/// use RustedFcode::symbolic::symbolic_engine::Expr;
/// let x = Expr::sym("x");
/// let settings = FcodeSettings::builder().assign_to("s").build().unwrap();
/// assert_eq!(fcode(&x.sin(), &settings).to_string(), "      s = sin(x)");
/// ```
/// Example2# (structured output)
/// ```
/// use RustedFcode::fcode::{FcodeSettings, fcode};
/// use RustedFcode::symbolic::symbolic_engine::Expr;
/// let expr = Expr::pi() * Expr::sym("r").pow(Expr::int(2));
/// let settings = FcodeSettings::builder().human(false).build().unwrap();
/// let parts = fcode(&expr, &settings).into_parts().unwrap();
/// assert_eq!(parts.number_symbols, vec![("pi".to_string(), "3.14159265358979".to_string())]);
/// assert_eq!(parts.code, "      pi*r**2");
/// ```
/// ________________________________________________________________________________________________________________________________
pub mod fcode_printer;
/// options of the printer, builder with validation, TOML loading
pub mod fcode_settings;
/// block indentation of free-format code
pub mod fcode_indent;
/// leading columns and line wrapping
pub mod fcode_wrap;
mod fcode_tests;

pub use fcode_printer::{FCodePrinter, FcodeOutput, FcodeParts, UnsupportedSet, fcode, print_fcode};
pub use fcode_settings::{FcodeError, FcodeSettings, FcodeSettingsBuilder, FullPrecision, SourceFormat};
