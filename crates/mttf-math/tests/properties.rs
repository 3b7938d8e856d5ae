//! Property-based tests for the symbolic arithmetic in mttf-math.
//!
//! Random small polynomials in `e` and `r` exercise the canonical form, the
//! GCD and the fraction-free determinant against floating point evaluation.

use mttf_math::{gcd, BigInt, BigRational, Bindings, Expr, Matrix, Monomial, Poly};
use proptest::prelude::*;

const TOL: f64 = 1e-9;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol.max(tol * a.abs().max(b.abs()))
}

fn poly_strategy() -> impl Strategy<Value = Poly> {
    prop::collection::vec((-6i64..=6, 0u32..=2, 0u32..=2), 1..4).prop_map(|terms| {
        let mut p = Poly::zero();
        for (c, de, dr) in terms {
            let mono = Monomial::power("e", de).mul(&Monomial::power("r", dr));
            p.add_term(mono, BigRational::from_integer(BigInt::from(c)));
        }
        p
    })
}

fn nonzero_poly() -> impl Strategy<Value = Poly> {
    poly_strategy().prop_filter("non-zero polynomial", |p| !p.is_zero())
}

fn bindings(e: f64, r: f64) -> Bindings {
    let mut b = Bindings::new();
    b.insert("e".to_string(), e);
    b.insert("r".to_string(), r);
    b
}

// ============================================================================
// Canonical form
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Multiplying a quotient back by its divisor recovers the dividend exactly.
    #[test]
    fn division_round_trips(a in poly_strategy(), b in nonzero_poly()) {
        let a = Expr::from_poly(a);
        let b = Expr::from_poly(b);
        let q = a.checked_div(&b).unwrap();
        prop_assert_eq!(&q * &b, a);
    }

    /// Addition and multiplication are commutative on the canonical form.
    #[test]
    fn operations_commute(a in poly_strategy(), b in nonzero_poly(), c in nonzero_poly()) {
        let x = Expr::from_poly(a) / Expr::from_poly(b.clone());
        let y = Expr::from_poly(c) / Expr::from_poly(b);
        prop_assert_eq!(&x + &y, &y + &x);
        prop_assert_eq!(&x * &y, &y * &x);
        prop_assert!((&x - &x).is_zero());
    }

    /// The canonical form evaluates to the same value as the raw quotient.
    #[test]
    fn canonical_form_preserves_value(
        a in poly_strategy(),
        b in nonzero_poly(),
        e in 0.5f64..3.0,
        r in 0.5f64..3.0,
    ) {
        let env = bindings(e, r);
        let den = b.eval(&env).unwrap();
        prop_assume!(den.abs() > 1e-6);
        let expected = a.eval(&env).unwrap() / den;
        let expr = Expr::from_poly(a) / Expr::from_poly(b);
        if let Ok(value) = expr.eval(&env) {
            prop_assert!(approx_eq(value, expected, TOL), "{} vs {}", value, expected);
        }
    }
}

// ============================================================================
// GCD and determinant
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The GCD divides both inputs.
    #[test]
    fn gcd_divides_both(a in nonzero_poly(), b in nonzero_poly(), shared in nonzero_poly()) {
        let a = &a * &shared;
        let b = &b * &shared;
        let g = gcd(&a, &b);
        prop_assert!(a.div_exact(&g).is_some());
        prop_assert!(b.div_exact(&g).is_some());
        prop_assert!(g.div_exact(&shared.integer_normalized()).is_some());
    }

    /// The symbolic determinant agrees with the determinant of the evaluated matrix.
    #[test]
    fn determinant_matches_numeric(
        entries in prop::collection::vec(poly_strategy(), 9),
        e in 0.5f64..2.0,
        r in 0.5f64..2.0,
    ) {
        let env = bindings(e, r);
        let symbolic: Vec<Vec<Expr>> = entries
            .chunks(3)
            .map(|row| row.iter().cloned().map(Expr::from_poly).collect())
            .collect();
        let numeric: Vec<Vec<f64>> = entries
            .chunks(3)
            .map(|row| row.iter().map(|p| p.eval(&env).unwrap()).collect())
            .collect();

        let det = Matrix::from_rows(symbolic).unwrap().determinant().unwrap();
        let expected = Matrix::from_rows(numeric).unwrap().determinant().unwrap();
        let got = det.eval(&env).unwrap();
        prop_assert!(approx_eq(got, expected, 1e-6), "{} vs {}", got, expected);
    }
}
