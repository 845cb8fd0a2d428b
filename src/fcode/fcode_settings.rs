//! Configuration of the Fortran printer.
//!
//! Settings are immutable once built. Everything that can be wrong about them
//! (an assignment target that is not a variable, an unknown source format,
//! zero precision, an unknown log level) is reported by `build()` before any
//! expression is printed.
//!
//! # Example
//! ```rust, ignore
//! let settings = FcodeSettings::builder()
//!     .assign_to("s")
//!     .source_format("free")
//!     .build()?;
//! ```
//! The same options can be read from a TOML document:
//! ```toml
//! [fcode]
//! assign_to = "s"
//! precision = 20
//! source_format = "free"
//! [fcode.user_functions]
//! f = "myfunc"
//! ```
use crate::Utils::logger::level_filter;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_str_printer::TermOrder;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};

pub const DEFAULT_PRECISION: usize = 15;

/// Fortran source layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum SourceFormat {
    /// columns 1-6 reserved, statements end at column 72
    #[default]
    Fixed,
    /// no column discipline, `&` marks continuation
    Free,
}

/// Whether floats keep all `precision` digits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
pub enum FullPrecision {
    /// full digits at the top level, trailing zeros stripped inside expressions
    #[default]
    #[strum(to_string = "auto")]
    Auto,
    #[strum(to_string = "always", serialize = "true")]
    Always,
    #[strum(to_string = "never", serialize = "false")]
    Never,
}

/// Error types of the printer configuration
#[derive(Debug, Clone, PartialEq)]
pub enum FcodeError {
    InvalidAssignTarget(String),
    UnknownSourceFormat(String),
    InvalidPrecision(i64),
    UnknownLogLevel(String),
    InvalidOption { key: String, value: String },
    Config(String),
}

impl fmt::Display for FcodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FcodeError::InvalidAssignTarget(target) => {
                write!(f, "FCodePrinter cannot assign to {}", target)
            }
            FcodeError::UnknownSourceFormat(format) => write!(f, "Unknown source format: {}", format),
            FcodeError::InvalidPrecision(p) => write!(f, "Precision must be positive, got {}", p),
            FcodeError::UnknownLogLevel(level) => {
                write!(f, "loglevel must be debug, info, warn, error, off or none, got {}", level)
            }
            FcodeError::InvalidOption { key, value } => {
                write!(f, "Invalid value for option {}: {}", key, value)
            }
            FcodeError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for FcodeError {}

/// Left-hand side of the generated assignment, before validation
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Name(String),
    Expr(Expr),
}

impl From<&str> for AssignTarget {
    fn from(name: &str) -> Self {
        AssignTarget::Name(name.to_string())
    }
}

impl From<String> for AssignTarget {
    fn from(name: String) -> Self {
        AssignTarget::Name(name)
    }
}

impl From<Expr> for AssignTarget {
    fn from(expr: Expr) -> Self {
        AssignTarget::Expr(expr)
    }
}

/// Validated, immutable printer settings
#[derive(Debug, Clone, PartialEq)]
pub struct FcodeSettings {
    order: TermOrder,
    full_prec: FullPrecision,
    assign_to: Option<Expr>,
    precision: usize,
    user_functions: HashMap<String, String>,
    human: bool,
    source_format: SourceFormat,
    loglevel: Option<String>,
}

impl Default for FcodeSettings {
    fn default() -> Self {
        FcodeSettings {
            order: TermOrder::default(),
            full_prec: FullPrecision::default(),
            assign_to: None,
            precision: DEFAULT_PRECISION,
            user_functions: HashMap::new(),
            human: true,
            source_format: SourceFormat::default(),
            loglevel: None,
        }
    }
}

impl FcodeSettings {
    pub fn builder() -> FcodeSettingsBuilder {
        FcodeSettingsBuilder::default()
    }

    pub fn order(&self) -> TermOrder {
        self.order
    }

    pub fn full_prec(&self) -> FullPrecision {
        self.full_prec
    }

    pub fn assign_to(&self) -> Option<&Expr> {
        self.assign_to.as_ref()
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// function name -> name emitted in its place
    pub fn user_functions(&self) -> &HashMap<String, String> {
        &self.user_functions
    }

    pub fn human(&self) -> bool {
        self.human
    }

    pub fn source_format(&self) -> SourceFormat {
        self.source_format
    }

    pub fn loglevel(&self) -> Option<&str> {
        self.loglevel.as_deref()
    }

    /// the same settings with human readable output switched on
    pub fn to_human(&self) -> FcodeSettings {
        FcodeSettings {
            human: true,
            ..self.clone()
        }
    }
}

/// Collects options; `build()` validates them.
#[derive(Debug, Clone)]
pub struct FcodeSettingsBuilder {
    order: TermOrder,
    full_prec: FullPrecision,
    assign_to: Option<AssignTarget>,
    precision: i64,
    user_functions: HashMap<String, String>,
    human: bool,
    source_format: String,
    loglevel: Option<String>,
}

impl Default for FcodeSettingsBuilder {
    fn default() -> Self {
        FcodeSettingsBuilder {
            order: TermOrder::default(),
            full_prec: FullPrecision::default(),
            assign_to: None,
            precision: DEFAULT_PRECISION as i64,
            user_functions: HashMap::new(),
            human: true,
            source_format: SourceFormat::default().to_string(),
            loglevel: None,
        }
    }
}

impl FcodeSettingsBuilder {
    pub fn order(mut self, order: TermOrder) -> Self {
        self.order = order;
        self
    }

    pub fn full_prec(mut self, full_prec: FullPrecision) -> Self {
        self.full_prec = full_prec;
        self
    }

    /// variable name or `Symbol`/`Indexed` expression receiving the result
    pub fn assign_to(mut self, target: impl Into<AssignTarget>) -> Self {
        self.assign_to = Some(target.into());
        self
    }

    pub fn precision(mut self, precision: i64) -> Self {
        self.precision = precision;
        self
    }

    pub fn user_function(mut self, name: &str, fortran_name: &str) -> Self {
        self.user_functions
            .insert(name.to_string(), fortran_name.to_string());
        self
    }

    pub fn user_functions(mut self, functions: HashMap<String, String>) -> Self {
        self.user_functions.extend(functions);
        self
    }

    pub fn human(mut self, human: bool) -> Self {
        self.human = human;
        self
    }

    /// "fixed" or "free"
    pub fn source_format(mut self, format: &str) -> Self {
        self.source_format = format.to_string();
        self
    }

    pub fn loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = Some(loglevel.to_string());
        self
    }

    /// Reads options from a TOML document. Keys live in an `[fcode]` table,
    /// or at the top level when there is none.
    pub fn from_toml_str(text: &str) -> Result<Self, FcodeError> {
        let document = text
            .parse::<toml::Table>()
            .map_err(|e| FcodeError::Config(e.to_string()))?;
        let section = match document.get("fcode") {
            Some(toml::Value::Table(table)) => table,
            Some(other) => {
                return Err(FcodeError::InvalidOption {
                    key: "fcode".to_string(),
                    value: other.to_string(),
                });
            }
            None => &document,
        };

        let mut builder = FcodeSettingsBuilder::default();
        for (key, value) in section {
            let invalid = || FcodeError::InvalidOption {
                key: key.clone(),
                value: value.to_string(),
            };
            match (key.as_str(), value) {
                ("order", toml::Value::String(s)) => {
                    builder.order = TermOrder::from_str(s).map_err(|_| invalid())?;
                }
                ("full_prec", toml::Value::Boolean(b)) => {
                    builder.full_prec = if *b {
                        FullPrecision::Always
                    } else {
                        FullPrecision::Never
                    };
                }
                ("full_prec", toml::Value::String(s)) => {
                    builder.full_prec = FullPrecision::from_str(s).map_err(|_| invalid())?;
                }
                ("assign_to", toml::Value::String(s)) => {
                    builder.assign_to = Some(AssignTarget::Name(s.clone()));
                }
                ("precision", toml::Value::Integer(p)) => builder.precision = *p,
                ("human", toml::Value::Boolean(b)) => builder.human = *b,
                ("source_format", toml::Value::String(s)) => builder.source_format = s.clone(),
                ("loglevel", toml::Value::String(s)) => builder.loglevel = Some(s.clone()),
                ("user_functions", toml::Value::Table(table)) => {
                    for (name, fortran_name) in table {
                        let fortran_name = fortran_name.as_str().ok_or_else(invalid)?;
                        builder
                            .user_functions
                            .insert(name.clone(), fortran_name.to_string());
                    }
                }
                _ => return Err(invalid()),
            }
        }
        Ok(builder)
    }

    pub fn build(self) -> Result<FcodeSettings, FcodeError> {
        let source_format = SourceFormat::from_str(&self.source_format)
            .map_err(|_| FcodeError::UnknownSourceFormat(self.source_format.clone()))?;
        if self.precision <= 0 {
            return Err(FcodeError::InvalidPrecision(self.precision));
        }
        if let Some(level) = &self.loglevel {
            if level_filter(level).is_none() {
                return Err(FcodeError::UnknownLogLevel(level.clone()));
            }
        }
        let assign_to = match self.assign_to {
            Some(target) => Some(validate_target(target)?),
            None => None,
        };
        Ok(FcodeSettings {
            order: self.order,
            full_prec: self.full_prec,
            assign_to,
            precision: self.precision as usize,
            user_functions: self.user_functions,
            human: self.human,
            source_format,
            loglevel: self.loglevel,
        })
    }
}

fn validate_target(target: AssignTarget) -> Result<Expr, FcodeError> {
    let identifier =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").map_err(|e| FcodeError::Config(e.to_string()))?;
    match target {
        AssignTarget::Name(name) if identifier.is_match(&name) => Ok(Expr::Symbol(name)),
        AssignTarget::Name(name) => Err(FcodeError::InvalidAssignTarget(format!("\"{}\"", name))),
        AssignTarget::Expr(Expr::Symbol(name)) if identifier.is_match(&name) => {
            Ok(Expr::Symbol(name))
        }
        AssignTarget::Expr(indexed @ Expr::Indexed(..)) => Ok(indexed),
        AssignTarget::Expr(other) => Err(FcodeError::InvalidAssignTarget(other.to_string())),
    }
}
