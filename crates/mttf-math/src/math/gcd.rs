//! Multivariate polynomial GCD over the rationals.
//!
//! Shared monomial factors are split off first, and inputs that evaluation
//! proves coprime return early. Everything else goes through the recursive
//! primitive polynomial remainder sequence: pick a shared variable, split both
//! inputs into content (free of that variable) and primitive part, recurse on
//! the contents and run a pseudo-remainder sequence on the primitive parts.
//!
//! Every result is integer-normalized: coprime integer coefficients and a
//! positive leading coefficient. `gcd(0, 0)` is zero.

use super::poly::{Monomial, Poly};
use num_bigint::BigInt;
use num_rational::BigRational;

/// Greatest common divisor of two polynomials.
pub fn gcd(a: &Poly, b: &Poly) -> Poly {
    if a.is_zero() {
        return b.integer_normalized();
    }
    if b.is_zero() {
        return a.integer_normalized();
    }
    if a.is_constant() || b.is_constant() {
        return Poly::one();
    }
    if a == b {
        return a.integer_normalized();
    }

    let (mono_a, mono_b) = (a.monomial_content(), b.monomial_content());
    if !mono_a.is_one() || !mono_b.is_one() {
        // Variables are prime, so the monomial parts split off exactly.
        let shared = mono_a.gcd(&mono_b);
        let rest = gcd(&strip_monomial(a, &mono_a), &strip_monomial(b, &mono_b));
        return rest.mul_monomial(&shared).integer_normalized();
    }
    if coprime_by_evaluation(a, b) {
        return Poly::one();
    }

    // A common factor only involves shared variables; recurse on the one
    // of lowest degree.
    let Some(var) = a
        .variables()
        .intersection(&b.variables())
        .min_by_key(|var| a.degree(var).max(b.degree(var)))
        .cloned()
    else {
        return Poly::one();
    };

    let content_a = content_in(a, &var);
    let content_b = content_in(b, &var);
    let content = gcd(&content_a, &content_b);

    let prim_a = exact_quotient(a, &content_a);
    let prim_b = exact_quotient(b, &content_b);
    let primitive = if prim_a.degree(&var) == 0 || prim_b.degree(&var) == 0 {
        Poly::one()
    } else {
        primitive_gcd(prim_a, prim_b, &var)
    };

    (&content * &primitive).integer_normalized()
}

/// GCD of the coefficients of `p` viewed as a polynomial in `var`.
///
/// The result does not contain `var`.
pub fn content_in(p: &Poly, var: &str) -> Poly {
    p.coefficients_in(var)
        .values()
        .fold(Poly::zero(), |acc, coeff| gcd(&acc, coeff))
}

/// `p` divided by its content with respect to `var`.
pub fn primitive_part_in(p: &Poly, var: &str) -> Poly {
    if p.is_zero() {
        return Poly::zero();
    }
    exact_quotient(p, &content_in(p, var)).integer_normalized()
}

/// Pseudo-remainder of `a` by `b` in `var`: `lc(b)^k * a mod b` for the
/// smallest `k` that keeps every step polynomial.
pub fn pseudo_remainder(a: &Poly, b: &Poly, var: &str) -> Poly {
    let n = b.degree(var);
    let lead_b = b.coefficient_in(var, n);
    let mut r = a.clone();
    while !r.is_zero() && r.degree(var) >= n {
        let m = r.degree(var);
        let lead_r = r.coefficient_in(var, m);
        let shift = Monomial::power(var, m - n);
        r = &(&lead_b * &r) - &(&lead_r * b).mul_monomial(&shift);
    }
    r
}

/// GCD of two polynomials that are primitive in `var` with positive degree.
fn primitive_gcd(a: Poly, b: Poly, var: &str) -> Poly {
    let (mut a, mut b) = if a.degree(var) >= b.degree(var) {
        (a, b)
    } else {
        (b, a)
    };
    loop {
        let r = pseudo_remainder(&a, &b, var);
        if r.is_zero() {
            return primitive_part_in(&b, var);
        }
        if r.degree(var) == 0 {
            return Poly::one();
        }
        a = b;
        b = primitive_part_in(&r, var);
    }
}

/// Small primes used as evaluation points, one per variable.
const EVALUATION_POINTS: [i64; 10] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29];

/// True when `a` and `b` are provably coprime.
///
/// For each variable `x`, every other variable is fixed at a small prime. If
/// the images keep their degree in `x` and have a constant univariate gcd, no
/// common factor of positive degree in `x` exists. A `false` answer is
/// inconclusive.
fn coprime_by_evaluation(a: &Poly, b: &Poly) -> bool {
    let vars: Vec<String> = a.variables().union(&b.variables()).cloned().collect();
    if vars.len() < 2 {
        return false;
    }
    vars.iter().all(|keep| {
        let (deg_a, deg_b) = (a.degree(keep), b.degree(keep));
        if deg_a == 0 || deg_b == 0 {
            return true;
        }
        let image = |p: &Poly| {
            vars.iter()
                .enumerate()
                .filter(|(_, var)| *var != keep)
                .fold(p.clone(), |acc, (i, var)| {
                    let point = EVALUATION_POINTS[i % EVALUATION_POINTS.len()];
                    acc.substitute_value(var, &BigRational::from_integer(BigInt::from(point)))
                })
        };
        let (image_a, image_b) = (image(a), image(b));
        image_a.degree(keep) == deg_a
            && image_b.degree(keep) == deg_b
            && gcd(&image_a, &image_b).is_constant()
    })
}

fn strip_monomial(p: &Poly, monomial: &Monomial) -> Poly {
    if monomial.is_one() {
        return p.clone();
    }
    p.div_monomial(monomial)
        .expect("monomial content divides every term")
}

fn exact_quotient(p: &Poly, divisor: &Poly) -> Poly {
    if divisor.is_one() {
        return p.clone();
    }
    p.div_exact(divisor)
        .expect("content divides every coefficient of the polynomial")
}
