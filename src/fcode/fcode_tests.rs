use crate::fcode::fcode_printer::{FCodePrinter, FcodeOutput, IntrinsicFunction, fcode, print_fcode};
use crate::fcode::fcode_settings::{FcodeSettings, FullPrecision};
use crate::fcode::fcode_wrap::LINE_LIMIT;
use crate::symbolic::symbolic_engine::{Expr, Idx};
use crate::symbolic::symbolic_str_printer::TermOrder;
use crate::symbols;
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn fixed() -> FcodeSettings {
        FcodeSettings::default()
    }

    fn free() -> FcodeSettings {
        FcodeSettings::builder()
            .source_format("free")
            .build()
            .unwrap()
    }

    fn assigned(target: impl Into<crate::fcode::fcode_settings::AssignTarget>, format: &str) -> FcodeSettings {
        FcodeSettings::builder()
            .assign_to(target)
            .source_format(format)
            .build()
            .unwrap()
    }

    fn text(expr: &Expr, settings: &FcodeSettings) -> String {
        fcode(expr, settings).to_string()
    }

    fn piecewise(branches: Vec<(Expr, Expr)>) -> Expr {
        Expr::Piecewise(branches)
    }

    #[test]
    fn test_power_with_rational_exponent() {
        let x = Expr::sym("x");
        let expr = Expr::int(8) * Expr::int(2).sqrt() * x.pow(Expr::rational(7, 2));
        assert_eq!(text(&expr, &fixed()), "      8*sqrt(2)*x**(7.0/2.0)");
    }

    #[test]
    fn test_assignment() {
        let x = Expr::sym("x");
        assert_eq!(text(&x.sin(), &assigned("s", "fixed")), "      s = sin(x)");
        assert_eq!(text(&Expr::sym("x").sin(), &assigned("s", "free")), "s = sin(x)");
    }

    #[test]
    fn test_named_constant_becomes_parameter() {
        assert_eq!(
            text(&Expr::pi(), &fixed()),
            "      parameter (pi = 3.14159265358979)\n      pi"
        );
        let expr = Expr::E() * Expr::pi();
        assert_eq!(
            text(&expr, &free()),
            "parameter (E = 2.71828182845905)\nparameter (pi = 3.14159265358979)\nE*pi"
        );
    }

    #[test]
    fn test_parameter_precision() {
        let settings = FcodeSettings::builder().precision(5).build().unwrap();
        assert_eq!(
            text(&Expr::pi(), &settings),
            "      parameter (pi = 3.1416)\n      pi"
        );
    }

    #[test]
    fn test_derivative_is_reported() {
        let x = Expr::sym("x");
        let expr = Expr::func("f", vec![x.clone()]).derivative(vec![x]);
        assert_eq!(
            text(&expr, &free()),
            "! Not Fortran:\n! Derivative(f(x), x)\nDerivative(f(x), x)"
        );
        assert_eq!(
            text(&expr, &fixed()),
            "C     Not Fortran:\nC     Derivative(f(x), x)\n      Derivative(f(x), x)"
        );
    }

    #[test]
    fn test_unsupported_items_sorted_and_unique() {
        let x = Expr::sym("x");
        let gamma = Expr::func("gamma", vec![x.clone()]);
        let expr = gamma.clone() + Expr::int(2) * gamma + Expr::Infinity;
        assert_eq!(
            text(&expr, &free()),
            "! Not Fortran:\n! gamma(x)\n! oo\ngamma(x) + 2*gamma(x) + oo"
        );
    }

    #[test]
    fn test_user_function_override() {
        let x = Expr::sym("x");
        let settings = FcodeSettings::builder()
            .user_function("f", "myfunc")
            .build()
            .unwrap();
        let expr = Expr::func("f", vec![x.clone(), Expr::int(2)]);
        assert_eq!(text(&expr, &settings), "      myfunc(x, 2)");
        // without the override the call is kept and reported
        assert_eq!(
            text(&expr, &fixed()),
            "C     Not Fortran:\nC     f(x, 2)\n      f(x, 2)"
        );
    }

    #[test]
    fn test_intrinsic_names() {
        let x = Expr::sym("x");
        assert_eq!(text(&x.clone().conjugate(), &fixed()), "      conjg(x)");
        assert_eq!(text(&x.clone().exp().log(), &fixed()), "      log(exp(x))");
        assert_eq!(
            IntrinsicFunction::from_str("atan2").unwrap().fortran_name(),
            "atan2"
        );
        assert!(IntrinsicFunction::from_str("gamma").is_err());
        // every intrinsic prints without a Not Fortran report
        for intrinsic in IntrinsicFunction::iter() {
            let call = Expr::func(&intrinsic.to_string(), vec![x.clone()]);
            let out = text(&call, &fixed());
            assert_eq!(out, format!("      {}(x)", intrinsic.fortran_name()));
        }
    }

    #[test]
    fn test_loop_over_target_index() {
        let i = Idx::new("i", 5);
        let y = Expr::indexed("y", &[i]);
        let x = Expr::sym("x");
        assert_eq!(
            text(&x, &assigned(y.clone(), "fixed")),
            "      do i = 1, 5\n      y(i) = x\n      end do"
        );
        assert_eq!(
            text(&Expr::sym("x"), &assigned(y, "free")),
            "do i = 1, 5\n   y(i) = x\nend do"
        );
    }

    #[test]
    fn test_shared_index_opens_one_loop() {
        let n = Expr::sym("n");
        let i = Idx::symbolic("i", n);
        let y = Expr::indexed("y", &[i.clone()]);
        let x = Expr::indexed("x", &[i]);
        assert_eq!(
            text(&(Expr::int(2) * x), &assigned(y, "free")),
            "do i = 1, n\n   y(i) = 2*x(i)\nend do"
        );
    }

    #[test]
    fn test_target_only_indices_come_first() {
        let (i, j) = (Idx::new("i", 3), Idx::new("j", 4));
        let a = Expr::indexed("A", &[i, j.clone()]);
        let x = Expr::indexed("x", &[j]);
        assert_eq!(
            text(&x, &assigned(a, "free")),
            "do i = 1, 3\n   do j = 1, 4\n      A(i, j) = x(j)\n   end do\nend do"
        );
    }

    #[test]
    fn test_imaginary_numbers() {
        let i = Expr::I();
        assert_eq!(text(&i, &fixed()), "      cmplx(0,1)");
        assert_eq!(text(&(Expr::int(2) * Expr::I()), &fixed()), "      cmplx(0,2)");
        assert_eq!(
            text(&(Expr::int(3) + Expr::int(2) * Expr::I()), &fixed()),
            "      cmplx(3,2)"
        );
    }

    #[test]
    fn test_complex_sum_with_symbolic_terms() {
        let (x, y) = symbols!(x, y);
        let expr = x.clone() + Expr::int(3) + Expr::int(2) * Expr::I();
        assert_eq!(text(&expr, &fixed()), "      cmplx(3,2) + x");
        let expr = -x.clone() + Expr::I();
        assert_eq!(text(&expr, &fixed()), "      cmplx(0,1) - x");
        let expr = x - y + Expr::I();
        assert_eq!(text(&expr, &fixed()), "      cmplx(0,1) + x - y");
    }

    #[test]
    fn test_reciprocal_and_sqrt_powers() {
        let (x, y) = symbols!(x, y);
        assert_eq!(text(&x.clone().pow(Expr::int(-1)), &fixed()), "      1.0/x");
        assert_eq!(
            text(&(x.clone() + y.clone()).pow(Expr::int(-1)), &fixed()),
            "      1.0/(x + y)"
        );
        assert_eq!(text(&x.clone().pow(Expr::float(0.5)), &fixed()), "      sqrt(x)");
        assert_eq!(text(&(x + y).sqrt(), &fixed()), "      sqrt(x + y)");
    }

    #[test]
    fn test_rational_is_real_division() {
        assert_eq!(text(&Expr::rational(1, 3), &fixed()), "      1.0/3.0");
        assert_eq!(text(&Expr::rational(-2, 4), &fixed()), "      -1.0/2.0");
    }

    #[test]
    fn test_rational_factor_is_real_division() {
        let (x, y) = symbols!(x, y);
        assert_eq!(text(&(Expr::rational(3, 7) * x.clone()), &fixed()), "      3.0/7.0*x");
        assert_eq!(text(&(Expr::rational(1, 2) * x.clone()), &fixed()), "      1.0/2.0*x");
        assert_eq!(
            text(&(Expr::rational(-1, 2) * x.clone() * y.clone()), &fixed()),
            "      -1.0/2.0*x*y"
        );
        assert_eq!(
            text(&(x.clone() + Expr::rational(1, 2) * y.clone()), &fixed()),
            "      x + 1.0/2.0*y"
        );
        assert_eq!(
            text(&(x.clone() - Expr::rational(1, 2) * y.clone()), &fixed()),
            "      x - 1.0/2.0*y"
        );
        // x**(7/2)/3
        assert_eq!(
            text(&(x.pow(Expr::rational(7, 2)) * Expr::rational(1, 3)), &fixed()),
            "      1.0/3.0*x**(7.0/2.0)"
        );
    }

    #[test]
    fn test_non_finite_float_is_reported() {
        assert_eq!(
            text(&Expr::float(f64::INFINITY), &free()),
            "! Not Fortran:\n! inf\ninf"
        );
        let x = Expr::sym("x");
        let out = fcode(
            &(x * Expr::float(f64::NAN)),
            &FcodeSettings::builder().human(false).build().unwrap(),
        );
        let parts = out.into_parts().unwrap();
        assert_eq!(parts.not_fortran.len(), 1);
        assert_eq!(parts.code, "      x*NaN");
    }

    #[test]
    fn test_parameter_beyond_double_precision() {
        let settings = FcodeSettings::builder()
            .precision(80)
            .source_format("free")
            .human(false)
            .build()
            .unwrap();
        let parts = fcode(&Expr::pi(), &settings).into_parts().unwrap();
        assert_eq!(
            parts.number_symbols,
            vec![(
                "pi".to_string(),
                "3.1415926535897932384626433832795028841971693993751058209749445923078164062862090"
                    .to_string()
            )]
        );
    }

    #[test]
    fn test_long_parameter_value_moves_whole_to_next_line() {
        let settings = FcodeSettings::builder()
            .precision(60)
            .source_format("free")
            .build()
            .unwrap();
        assert_eq!(
            text(&Expr::pi(), &settings),
            [
                "parameter (pi = &",
                "      3.14159265358979323846264338327950288419716939937510582097494)",
                "pi",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_float_digits_depend_on_depth() {
        let x = Expr::sym("x");
        assert_eq!(text(&Expr::float(2.5), &fixed()), "      2.50000000000000");
        assert_eq!(text(&(Expr::float(2.5) * x.clone()), &fixed()), "      2.5*x");

        let always = FcodeSettings::builder()
            .full_prec(FullPrecision::Always)
            .build()
            .unwrap();
        assert_eq!(
            text(&(Expr::float(2.5) * x), &always),
            "      2.50000000000000*x"
        );
        let never = FcodeSettings::builder()
            .full_prec(FullPrecision::Never)
            .build()
            .unwrap();
        assert_eq!(text(&Expr::float(2.5), &never), "      2.5");
    }

    #[test]
    fn test_relational_and_booleans() {
        let x = Expr::sym("x");
        assert_eq!(text(&x.clone().lt(Expr::int(1)), &fixed()), "      x .lt. 1");
        assert_eq!(text(&x.ge(Expr::int(0)), &fixed()), "      x .ge. 0");
        assert_eq!(text(&Expr::BooleanTrue, &fixed()), "      .true.");
        assert_eq!(text(&Expr::BooleanFalse, &fixed()), "      .false.");
    }

    #[test]
    fn test_piecewise_chain() {
        let x = Expr::sym("x");
        let expr = piecewise(vec![
            (x.clone(), x.clone().lt(Expr::int(1))),
            (x.clone().pow(Expr::int(2)), Expr::BooleanTrue),
        ]);
        assert_eq!(
            text(&expr, &assigned("y", "free")),
            "if (x .lt. 1) then\n   y = x\nelse\n   y = x**2\nend if"
        );
        assert_eq!(
            text(&expr, &assigned("y", "fixed")),
            "      if (x .lt. 1) then\n        y = x\n      else\n        y = x**2\n      end if"
        );
    }

    #[test]
    fn test_piecewise_without_default_branch() {
        let x = Expr::sym("x");
        let expr = piecewise(vec![
            (Expr::int(-1), x.clone().lt(Expr::int(0))),
            (Expr::int(1), x.clone().gt(Expr::int(0))),
        ]);
        assert_eq!(
            text(&expr, &free()),
            "if (x .lt. 0) then\n   -1\nelse if (x .gt. 0) then\n   1\nend if"
        );
    }

    #[test]
    fn test_piecewise_with_loops_inside_branches() {
        let i = Idx::new("i", 2);
        let x = Expr::indexed("x", &[i.clone()]);
        let y = Expr::indexed("y", &[i]);
        let t = Expr::sym("t");
        let expr = piecewise(vec![(x, t.lt(Expr::int(0))), (Expr::int(0), Expr::BooleanTrue)]);
        assert_eq!(
            text(&expr, &assigned(y, "free")),
            [
                "if (t .lt. 0) then",
                "   do i = 1, 2",
                "      y(i) = x(i)",
                "   end do",
                "else",
                "   do i = 1, 2",
                "      y(i) = 0",
                "   end do",
                "end if",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_nested_piecewise_is_not_fortran() {
        let x = Expr::sym("x");
        let inner = piecewise(vec![
            (Expr::int(1), x.clone().lt(Expr::int(0))),
            (Expr::int(2), Expr::BooleanTrue),
        ]);
        let expr = x + inner;
        assert_eq!(
            text(&expr, &free()),
            "! Not Fortran:\n! Piecewise((1, x < 0), (2, True))\nx + Piecewise((1, x < 0), (2, True))"
        );
    }

    #[test]
    fn test_long_statement_is_wrapped() {
        let terms: Vec<Expr> = (0..20)
            .map(|k| Expr::sym(&format!("coefficient_{}", k)) * Expr::sym(&format!("x_{}", k)))
            .collect();
        let expr = Expr::add_of(terms);
        let out = text(&expr, &assigned("result", "fixed"));
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("      result = coefficient_0*x_0"));
        for (k, line) in lines.iter().enumerate() {
            assert!(line.chars().count() <= LINE_LIMIT, "line too long: {}", line);
            if k > 0 {
                assert!(line.starts_with("     @ "));
            }
        }

        let out = text(&expr, &assigned("result", "free"));
        let lines: Vec<&str> = out.lines().collect();
        let last = lines.len() - 1;
        for (k, line) in lines.iter().enumerate() {
            assert_eq!(line.ends_with(" &"), k < last, "{}", line);
        }
    }

    #[test]
    fn test_term_order_is_applied() {
        let (b, a) = symbols!(b, a);
        let settings = FcodeSettings::builder().order(TermOrder::Lex).build().unwrap();
        assert_eq!(text(&(b.clone() + a.clone()), &settings), "      a + b");
        assert_eq!(text(&(b + a), &fixed()), "      b + a");
    }

    #[test]
    fn test_structured_output() {
        let x = Expr::sym("x");
        let gamma = Expr::func("gamma", vec![x.clone()]);
        let expr = Expr::pi() * gamma.clone() + Expr::E();
        let settings = FcodeSettings::builder()
            .human(false)
            .assign_to("y")
            .build()
            .unwrap();
        let parts = fcode(&expr, &settings).into_parts().unwrap();
        assert_eq!(
            parts.number_symbols,
            vec![
                ("E".to_string(), "2.71828182845905".to_string()),
                ("pi".to_string(), "3.14159265358979".to_string()),
            ]
        );
        assert_eq!(parts.not_fortran.len(), 1);
        assert!(parts.not_fortran.contains(&gamma));
        assert_eq!(parts.code, "      y = pi*gamma(x) + E");
    }

    #[test]
    fn test_calls_do_not_share_state() {
        let x = Expr::sym("x");
        let printer = FCodePrinter::new(free());
        let first = printer.doprint(&Expr::func("gamma", vec![x.clone()]));
        assert!(first.text().starts_with("! Not Fortran:"));
        let second = printer.doprint(&x.sin());
        assert_eq!(second, FcodeOutput::Human("sin(x)".to_string()));
    }

    #[test]
    fn test_print_fcode_forces_human_output() {
        let settings = FcodeSettings::builder()
            .human(false)
            .loglevel("off")
            .build()
            .unwrap();
        // writes to stdout
        print_fcode(&Expr::pi(), &settings);
        assert!(!settings.human());
        assert!(matches!(fcode(&Expr::pi(), &settings.to_human()), FcodeOutput::Human(_)));
    }
}
