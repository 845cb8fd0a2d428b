//! Numeric side of the expression model: complex evaluation of constant
//! subtrees, the real/imaginary/number predicates the printers rely on, and
//! decimal rendering of constants and floats to a requested number of
//! significant digits.
//!
//! Named constants are evaluated in fixed point on big integers (a value v
//! stands for v / 10^digits), so any precision can be requested:
//! - pi: Machin's formula 16 atan(1/5) - 4 atan(1/239)
//! - E: the series of 1/k!
//! - GoldenRatio: (1 + sqrt(5))/2 with an integer square root
//! - EulerGamma: Brent-McMillan, with ln(n) from atanh series
//! - Catalan: 3/8 sum 1/((2k+1)^2 C(2k,k)) + pi/8 ln(2 + sqrt(3))
use crate::symbolic::symbolic_engine::{Expr, NumberSymbol};
use log::debug;
use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{One, Zero};

/// relative tolerance used to decide that a real or imaginary part vanishes
const REL_EPS: f64 = 1e-12;
/// digits computed beyond the requested precision before rounding
const GUARD_DIGITS: usize = 10;

impl NumberSymbol {
    /// double precision value
    pub fn value(&self) -> f64 {
        match self {
            NumberSymbol::Pi => std::f64::consts::PI,
            NumberSymbol::E => std::f64::consts::E,
            NumberSymbol::EulerGamma => 0.577_215_664_901_532_9,
            NumberSymbol::Catalan => 0.915_965_594_177_219,
            NumberSymbol::GoldenRatio => 1.618_033_988_749_895,
        }
    }

    /// value * 10^digits, truncated
    fn fixed_point(&self, digits: usize) -> BigInt {
        let scale = BigInt::from(10u32).pow(digits as u32);
        match self {
            NumberSymbol::Pi => pi_fixed(&scale),
            NumberSymbol::E => e_fixed(&scale),
            NumberSymbol::EulerGamma => euler_gamma_fixed(&scale, digits),
            NumberSymbol::Catalan => catalan_fixed(&scale),
            NumberSymbol::GoldenRatio => (&scale + (&scale * &scale * 5u32).sqrt()) / 2u32,
        }
    }

    /// Decimal value rounded to `precision` significant digits, e.g. pi at 15 -> "3.14159265358979".
    pub fn evalf(&self, precision: usize) -> String {
        let precision = precision.max(1);
        let digits = precision + GUARD_DIGITS;
        let expansion = fixed_to_decimal(&self.fixed_point(digits), digits);
        debug!("{} evaluated to {} digits", self, precision);
        round_significant(&expansion, precision)
    }
}

/// sum over k of (-1)^k scale / (x^(2k+1) (2k+1))
fn atan_inv(x: u32, scale: &BigInt) -> BigInt {
    let x2 = BigInt::from(x) * x;
    let mut power = scale / x;
    let mut total = BigInt::zero();
    let mut k: u32 = 0;
    while !power.is_zero() {
        let term = &power / (2 * k + 1);
        if k % 2 == 0 {
            total += term;
        } else {
            total -= term;
        }
        power /= &x2;
        k += 1;
    }
    total
}

fn pi_fixed(scale: &BigInt) -> BigInt {
    atan_inv(5, scale) * 16u32 - atan_inv(239, scale) * 4u32
}

fn e_fixed(scale: &BigInt) -> BigInt {
    let mut total = BigInt::zero();
    let mut term = scale.clone();
    let mut k: u32 = 0;
    while !term.is_zero() {
        total += &term;
        k += 1;
        term /= k;
    }
    total
}

/// atanh(p/q) for 0 <= p < q
fn atanh_ratio(p: u64, q: u64, scale: &BigInt) -> BigInt {
    let (p2, q2) = (BigInt::from(p) * p, BigInt::from(q) * q);
    let mut power = scale * p / q;
    let mut total = BigInt::zero();
    let mut k: u64 = 0;
    while !power.is_zero() {
        total += &power / (2 * k + 1);
        power = power * &p2 / &q2;
        k += 1;
    }
    total
}

/// ln(n) = j ln(2) + ln(n / 2^j) with 2^j <= n < 2^(j+1)
fn ln_fixed(n: u64, scale: &BigInt) -> BigInt {
    let j = 63 - n.leading_zeros() as u64;
    let power_of_two = 1u64 << j;
    let ln2 = atanh_ratio(1, 3, scale) * 2u32;
    ln2 * j + atanh_ratio(n - power_of_two, n + power_of_two, scale) * 2u32
}

fn euler_gamma_fixed(scale: &BigInt, digits: usize) -> BigInt {
    // the error of the method is about exp(-4n)
    let n = (digits as f64 * std::f64::consts::LN_10 / 4.0) as u64 + 2;
    let n2 = BigInt::from(n) * n;
    let mut a = -ln_fixed(n, scale);
    let mut b = scale.clone();
    let mut u = a.clone();
    let mut v = b.clone();
    let mut k: u64 = 1;
    loop {
        b = b * &n2 / (k * k);
        a = (a * &n2 / k + &b) / k;
        if a.is_zero() && b.is_zero() {
            break;
        }
        u += &a;
        v += &b;
        k += 1;
    }
    u * scale / v
}

fn catalan_fixed(scale: &BigInt) -> BigInt {
    let mut series = BigInt::zero();
    let mut binomial = BigInt::one();
    let mut k: u64 = 0;
    loop {
        let odd = 2 * k + 1;
        let term = scale / (&binomial * (odd * odd));
        if term.is_zero() {
            break;
        }
        series += term;
        k += 1;
        binomial = binomial * (2 * k) * (2 * k - 1) / (k * k);
    }
    // ln(2 + sqrt(3)) = 2 atanh(1/sqrt(3)) = (2/sqrt(3)) sum 3^-k/(2k+1)
    let mut atanh_sum = BigInt::zero();
    let mut power_of_three = BigInt::one();
    let mut k: u64 = 0;
    loop {
        let term = scale / (&power_of_three * (2 * k + 1));
        if term.is_zero() {
            break;
        }
        atanh_sum += term;
        k += 1;
        power_of_three *= 3u32;
    }
    let sqrt3 = (scale * scale * 3u32).sqrt();
    let atanh = atanh_sum * scale / sqrt3;
    (series * 3u32 + pi_fixed(scale) * atanh * 2u32 / scale) / 8u32
}

/// "int.frac" text of a non-negative fixed-point value with `digits` fraction digits
fn fixed_to_decimal(value: &BigInt, digits: usize) -> String {
    let text = value.to_string();
    let text = if text.len() <= digits {
        format!("{}{}", "0".repeat(digits + 1 - text.len()), text)
    } else {
        text
    };
    let (int_part, frac_part) = text.split_at(text.len() - digits);
    format!("{}.{}", int_part, frac_part)
}

/// Rounds a plain decimal string ("ddd.ddd", no sign) to `precision` significant digits, half up.
pub fn round_significant(expansion: &str, precision: usize) -> String {
    let (int_part, frac_part) = expansion.split_once('.').unwrap_or((expansion, ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes())
        .map(|b| b - b'0')
        .collect();
    let mut point = int_part.len();
    let first = digits
        .iter()
        .position(|&d| d != 0)
        .unwrap_or(digits.len().saturating_sub(1));
    let keep = (first + precision).min(digits.len());
    let round_up = digits.get(keep).is_some_and(|&d| d >= 5);
    digits.truncate(keep);
    if round_up {
        let mut i = keep;
        loop {
            if i == 0 {
                // carry out of the leading digit: 9.99 -> 10.0
                digits.insert(0, 1);
                point += 1;
                if digits.len() > point {
                    digits.pop();
                }
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                // 0.0995 -> 0.10: the carry created a new leading digit
                if i < first && digits.len() > point {
                    digits.pop();
                }
                break;
            }
        }
    }
    while digits.len() < point {
        digits.push(0);
    }
    let to_text = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let int_text = to_text(&digits[..point]);
    let frac_text = to_text(&digits[point..]);
    let int_text = if int_text.is_empty() {
        "0".to_string()
    } else {
        // leading zeros of "00.5"-like inputs
        let trimmed = int_text.trim_start_matches('0');
        if trimmed.is_empty() { "0".to_string() } else { trimmed.to_string() }
    };
    format!("{}.{}", int_text, frac_text)
}

/// Positional rendering of a double with `precision` significant digits.
/// Very small or very large magnitudes use an exponent (`1.5e-9`).
/// With `strip` the trailing zeros of the fraction are removed (one digit stays).
pub fn format_float(value: f64, precision: usize, strip: bool) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value.abs());
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    let sign = if value < 0.0 { "-" } else { "" };

    let (body, exp_suffix) = if exponent >= 0 && (exponent as usize) < precision {
        let (int, frac) = digits.split_at(exponent as usize + 1);
        (format!("{}.{}", int, frac), String::new())
    } else if (-5..0).contains(&exponent) {
        let zeros = "0".repeat((-exponent - 1) as usize);
        (format!("0.{}{}", zeros, digits), String::new())
    } else {
        let (lead, rest) = digits.split_at(1);
        (format!("{}.{}", lead, rest), format!("e{}", exponent))
    };
    let body = if strip {
        body.trim_end_matches('0').to_string()
    } else {
        body
    };
    let body = if body.ends_with('.') {
        format!("{}0", body)
    } else {
        body
    };
    format!("{}{}{}", sign, body, exp_suffix)
}

impl Expr {
    /// Evaluates a constant subtree to a complex double.
    /// Returns None when the tree contains symbols, unknown functions or
    /// anything without a numeric value.
    pub fn evalc(&self) -> Option<Complex64> {
        let value = match self {
            Expr::Integer(n) => Complex64::new(*n as f64, 0.0),
            Expr::Rational(p, q) => Complex64::new(*p as f64 / *q as f64, 0.0),
            Expr::Float(v) => Complex64::new(*v, 0.0),
            Expr::ImaginaryUnit => Complex64::i(),
            Expr::NumberSymbol(ns) => Complex64::new(ns.value(), 0.0),
            Expr::Add(terms) => {
                let mut sum = Complex64::new(0.0, 0.0);
                for term in terms {
                    sum += term.evalc()?;
                }
                sum
            }
            Expr::Mul(factors) => {
                let mut product = Complex64::new(1.0, 0.0);
                for factor in factors {
                    product *= factor.evalc()?;
                }
                product
            }
            Expr::Pow(base, exp) => {
                let b = base.evalc()?;
                match exp.as_ref() {
                    Expr::Integer(n) if i32::try_from(*n).is_ok() => b.powi(*n as i32),
                    _ => {
                        let e = exp.evalc()?;
                        if b.norm() == 0.0 && e.re > 0.0 {
                            Complex64::new(0.0, 0.0)
                        } else {
                            b.powc(e)
                        }
                    }
                }
            }
            Expr::Function(name, args) => eval_function(name, args)?,
            _ => return None,
        };
        if value.re.is_finite() && value.im.is_finite() {
            Some(value)
        } else {
            None
        }
    }

    /// true when the tree has a numeric value (no free symbols)
    pub fn is_number(&self) -> bool {
        self.evalc().is_some()
    }

    /// numeric and real
    pub fn is_real_number(&self) -> bool {
        match self.evalc() {
            Some(c) => c.im.abs() <= REL_EPS * c.re.abs().max(1.0),
            None => false,
        }
    }

    /// numeric, with a vanishing real part and a non-vanishing imaginary part
    pub fn is_imaginary_number(&self) -> bool {
        match self.evalc() {
            Some(c) => c.re.abs() <= REL_EPS * c.im.abs().max(1.0) && c.im.abs() > REL_EPS,
            None => false,
        }
    }

    /// The real coefficient b of a purely imaginary number b*I (i.e. -I*self).
    /// Keeps the symbolic form when the product carries exactly one factor I.
    pub fn imaginary_coefficient(&self) -> Expr {
        match self {
            Expr::ImaginaryUnit => Expr::Integer(1),
            Expr::Mul(factors)
                if factors
                    .iter()
                    .filter(|f| matches!(f, Expr::ImaginaryUnit))
                    .count()
                    == 1 =>
            {
                Expr::mul_of(
                    factors
                        .iter()
                        .filter(|f| !matches!(f, Expr::ImaginaryUnit))
                        .cloned()
                        .collect(),
                )
            }
            _ => match self.evalc() {
                Some(c) => Expr::Float(c.im),
                None => Expr::Mul(vec![Expr::Integer(-1), Expr::ImaginaryUnit, self.clone()]),
            },
        }
    }
}

fn eval_function(name: &str, args: &[Expr]) -> Option<Complex64> {
    let values = args
        .iter()
        .map(|a| a.evalc())
        .collect::<Option<Vec<Complex64>>>()?;
    let value = match (name, values.as_slice()) {
        ("sin", [z]) => z.sin(),
        ("cos", [z]) => z.cos(),
        ("tan", [z]) => z.tan(),
        ("asin", [z]) => z.asin(),
        ("acos", [z]) => z.acos(),
        ("atan", [z]) => z.atan(),
        ("sinh", [z]) => z.sinh(),
        ("cosh", [z]) => z.cosh(),
        ("tanh", [z]) => z.tanh(),
        ("exp", [z]) => z.exp(),
        ("log", [z]) => z.ln(),
        ("sqrt", [z]) => z.sqrt(),
        ("abs", [z]) => Complex64::new(z.norm(), 0.0),
        ("conjugate", [z]) => z.conj(),
        ("sign", [z]) if z.im == 0.0 => Complex64::new(
            if z.re == 0.0 { 0.0 } else { z.re.signum() },
            0.0,
        ),
        ("atan2", [y, x]) if y.im == 0.0 && x.im == 0.0 => Complex64::new(y.re.atan2(x.re), 0.0),
        _ => return None,
    };
    Some(value)
}
