//! Closed-form rational functions of named variables.
//!
//! An [`Expr`] is a quotient of two [`Poly`] values kept in a canonical form:
//! numerator and denominator share no common factor, their coefficients are
//! jointly coprime integers and the denominator has a positive leading
//! coefficient. Two expressions are therefore equal exactly when their
//! values are equal, with no separate simplification step.

use super::factor::{factor, FactoredExpr};
use super::gcd::gcd;
use super::poly::{Bindings, Poly};
use super::scalar::Scalar;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Errors from evaluating or rewriting an expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("no value bound for variable '{0}'")]
    UnboundVariable(String),

    #[error("division by zero")]
    DivisionByZero,
}

/// A rational function over the rationals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    num: Poly,
    den: Poly,
}

impl Expr {
    pub fn zero() -> Self {
        Expr {
            num: Poly::zero(),
            den: Poly::one(),
        }
    }

    pub fn one() -> Self {
        Expr::integer(1)
    }

    /// A free variable.
    pub fn symbol(name: &str) -> Self {
        Expr::from_poly(Poly::var(name))
    }

    pub fn integer(value: i64) -> Self {
        Expr::from_poly(Poly::integer(value))
    }

    /// The exact fraction `numer / denom`.
    ///
    /// # Panics
    ///
    /// Panics when `denom` is zero.
    pub fn rational(numer: i64, denom: i64) -> Self {
        Expr::constant(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    pub fn constant(value: BigRational) -> Self {
        Expr::from_poly(Poly::constant(value))
    }

    pub fn from_poly(poly: Poly) -> Self {
        Expr::normalized(poly, Poly::one())
    }

    /// `num / den`, reduced to canonical form.
    pub fn from_ratio(num: Poly, den: Poly) -> Result<Self, EvalError> {
        if den.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Expr::normalized(num, den))
    }

    pub fn numerator(&self) -> &Poly {
        &self.num
    }

    pub fn denominator(&self) -> &Poly {
        &self.den
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.num.is_one() && self.den.is_one()
    }

    /// True when the denominator is constant.
    pub fn is_polynomial(&self) -> bool {
        self.den.is_constant()
    }

    /// The exact value when no variables occur.
    pub fn as_constant(&self) -> Option<BigRational> {
        let num = self.num.as_constant()?;
        let den = self.den.as_constant()?;
        Some(num / den)
    }

    pub fn variables(&self) -> BTreeSet<String> {
        let mut vars = self.num.variables();
        vars.extend(self.den.variables());
        vars
    }

    /// `self / rhs`, or `None` when `rhs` is zero.
    pub fn checked_div(&self, rhs: &Expr) -> Option<Expr> {
        if rhs.is_zero() {
            return None;
        }
        // Exact polynomial quotients skip the gcd.
        if let (Some(da), Some(db)) = (self.den.as_constant(), rhs.den.as_constant()) {
            if let Some(q) = self.num.div_exact(&rhs.num) {
                return Some(Expr::from_poly(q.scale(&(db / da))));
            }
        }
        Some(Expr::normalized(
            &self.num * &rhs.den,
            &self.den * &rhs.num,
        ))
    }

    pub fn recip(&self) -> Option<Expr> {
        Expr::one().checked_div(self)
    }

    /// Integer power; negative exponents of zero are an error.
    pub fn powi(&self, exp: i32) -> Result<Expr, EvalError> {
        let base = if exp < 0 {
            self.recip().ok_or(EvalError::DivisionByZero)?
        } else {
            self.clone()
        };
        let k = exp.unsigned_abs();
        Ok(Expr::normalized(base.num.pow(k), base.den.pow(k)))
    }

    /// Evaluates with a numeric value for every variable.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        let num = self.num.eval(bindings)?;
        let den = self.den.eval(bindings)?;
        if den == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(num / den)
    }

    /// Replaces `var` by another expression.
    pub fn substitute(&self, var: &str, value: &Expr) -> Result<Expr, EvalError> {
        // p(a/b) * b^d is a polynomial when d >= deg(p); the shared b^d cancels.
        let d = self.num.degree(var).max(self.den.degree(var));
        let num = homogenize(&self.num, var, &value.num, &value.den, d);
        let den = homogenize(&self.den, var, &value.num, &value.den, d);
        Expr::from_ratio(num, den)
    }

    /// Replaces several variables by numbers, keeping the rest symbolic.
    pub fn bind(&self, values: &[(String, BigRational)]) -> Result<Expr, EvalError> {
        values.iter().try_fold(self.clone(), |acc, (var, value)| {
            acc.substitute(var, &Expr::constant(value.clone()))
        })
    }

    pub fn factor(&self) -> FactoredExpr {
        FactoredExpr {
            numerator: factor(&self.num),
            denominator: factor(&self.den),
        }
    }

    fn normalized(num: Poly, den: Poly) -> Expr {
        if num.is_zero() {
            return Expr::zero();
        }
        let g = gcd(&num, &den);
        let (num, den) = if g.is_one() {
            (num, den)
        } else {
            (
                num.div_exact(&g).expect("gcd divides the numerator"),
                den.div_exact(&g).expect("gcd divides the denominator"),
            )
        };

        let lead = den.leading_coefficient().recip();
        let (num, den) = (num.scale(&lead), den.scale(&lead));

        let content = joint_content(&num, &den).recip();
        Expr {
            num: num.scale(&content),
            den: den.scale(&content),
        }
    }

    fn add_impl(a: &Expr, b: &Expr) -> Expr {
        if a.den == b.den {
            return Expr::normalized(&a.num + &b.num, a.den.clone());
        }
        Expr::normalized(&(&a.num * &b.den) + &(&b.num * &a.den), &a.den * &b.den)
    }

    fn sub_impl(a: &Expr, b: &Expr) -> Expr {
        Expr::add_impl(a, &-b)
    }

    fn mul_impl(a: &Expr, b: &Expr) -> Expr {
        Expr::normalized(&a.num * &b.num, &a.den * &b.den)
    }

    fn div_impl(a: &Expr, b: &Expr) -> Expr {
        a.checked_div(b).expect("attempt to divide an expression by zero")
    }
}

/// Σ c_k a^k b^(d-k) for p = Σ c_k var^k.
fn homogenize(p: &Poly, var: &str, a: &Poly, b: &Poly, d: u32) -> Poly {
    p.coefficients_in(var)
        .into_iter()
        .fold(Poly::zero(), |acc, (k, coeff)| {
            &acc + &(&(&coeff * &a.pow(k)) * &b.pow(d - k))
        })
}

/// Positive rational dividing every coefficient of both polynomials to a
/// jointly coprime set of integers.
fn joint_content(a: &Poly, b: &Poly) -> BigRational {
    let ca = a.rational_content();
    let cb = b.rational_content();
    if Zero::is_zero(&ca) {
        return cb;
    }
    if Zero::is_zero(&cb) {
        return ca;
    }
    BigRational::new(ca.numer().gcd(cb.numer()), ca.denom().lcm(cb.denom()))
}

forward_binop!(Expr, Add, add, Expr::add_impl);
forward_binop!(Expr, Sub, sub, Expr::sub_impl);
forward_binop!(Expr, Mul, mul, Expr::mul_impl);
forward_binop!(Expr, Div, div, Expr::div_impl);
forward_assign_op!(Expr, AddAssign, add_assign, Expr::add_impl);
forward_assign_op!(Expr, MulAssign, mul_assign, Expr::mul_impl);

impl std::ops::Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr {
            num: -self.num,
            den: self.den,
        }
    }
}

impl std::ops::Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        -self.clone()
    }
}

impl std::iter::Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |acc, x| acc + x)
    }
}

impl<'a> std::iter::Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |acc, x| &acc + x)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::integer(value)
    }
}

impl From<Poly> for Expr {
    fn from(value: Poly) -> Self {
        Expr::from_poly(value)
    }
}

impl From<BigRational> for Expr {
    fn from(value: BigRational) -> Self {
        Expr::constant(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factor())
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Scalar for Expr {
    fn zero() -> Self {
        Expr::zero()
    }

    fn one() -> Self {
        Expr::one()
    }

    fn from_i64(value: i64) -> Self {
        Expr::integer(value)
    }

    fn is_zero(&self) -> bool {
        Expr::is_zero(self)
    }

    fn checked_div(&self, rhs: &Self) -> Option<Self> {
        Expr::checked_div(self, rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e() -> Expr {
        Expr::symbol("e")
    }

    fn r() -> Expr {
        Expr::symbol("r")
    }

    fn n(v: i64) -> Expr {
        Expr::integer(v)
    }

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol * b.abs().max(1.0)
    }

    #[test]
    fn equal_values_are_structurally_equal() {
        let a = (&e() * &e() - &r() * &r()) / (&e() - &r());
        assert_eq!(a, &e() + &r());
        assert!(a.is_polynomial());

        let half = Expr::rational(1, 2);
        assert_eq!(&half + &half, Expr::one());
        assert_eq!((&e() / &n(2)) * n(4), &e() * &n(2));
    }

    #[test]
    fn denominator_has_positive_lead_and_integer_coefficients() {
        let x = &r() / &(-(&e() * &n(2)));
        assert_eq!(x.denominator(), &(&Poly::var("e") * &Poly::integer(2)));
        assert_eq!(x.numerator(), &-Poly::var("r"));

        let y = &(&e() / &n(3)) / &(&r() / &n(6));
        assert_eq!(y.numerator(), &(&Poly::var("e") * &Poly::integer(2)));
        assert_eq!(y.denominator(), &Poly::var("r"));
    }

    #[test]
    fn exact_polynomial_quotient_keeps_canonical_form() {
        let a = &(&(&e() * &e()) + &(&e() * &r())) / &n(2);
        let b = &(&e() + &r()) / &n(3);
        let q = &a / &b;
        assert_eq!(q, &e() * &Expr::rational(3, 2));
        assert_eq!(q.numerator(), &(&Poly::var("e") * &Poly::integer(3)));
        assert_eq!(q.denominator(), &Poly::integer(2));

        // Not an exact quotient, falls back to the reduced fraction.
        assert_eq!((&e() / &(&e() + &r())).denominator(), &(&Poly::var("e") + &Poly::var("r")));
    }

    #[test]
    fn zero_is_canonical() {
        let z = &e() / &r() - &e() / &r();
        assert!(z.is_zero());
        assert_eq!(z, Expr::zero());
        assert_eq!(z.to_string(), "0");
    }

    #[test]
    fn checked_div_by_zero() {
        assert!(e().checked_div(&Expr::zero()).is_none());
        assert!(Expr::zero().recip().is_none());
        assert_eq!(Expr::zero().powi(-1), Err(EvalError::DivisionByZero));
        assert_eq!(e().powi(-2).unwrap(), &n(1) / &(&e() * &e()));
    }

    #[test]
    #[should_panic(expected = "divide an expression by zero")]
    fn div_operator_panics_on_zero() {
        let _ = e() / Expr::zero();
    }

    #[test]
    fn displays_factored_fraction() {
        let exact = &(&r() + &(&e() * &n(3))) / &(&(&e() * &e()) * &n(2));
        assert_eq!(exact.to_string(), "(3*e + r)/(2*e^2)");

        let asymptotic = &r() / &(&(&e() * &e()) * &n(2));
        assert_eq!(asymptotic.to_string(), "r/(2*e^2)");

        let simple = &n(1) / &(&e() + &r());
        assert_eq!(simple.to_string(), "1/(e + r)");

        assert_eq!((&e() + &r()).to_string(), "e + r");
        assert_eq!(Expr::rational(-3, 4).to_string(), "-3/4");
    }

    #[test]
    fn eval_and_errors() {
        let x = &r() / &(&e() - &n(1));
        let mut bindings = Bindings::new();
        bindings.insert("r".into(), 3.0);
        assert_eq!(x.eval(&bindings), Err(EvalError::UnboundVariable("e".into())));
        bindings.insert("e".into(), 1.0);
        assert_eq!(x.eval(&bindings), Err(EvalError::DivisionByZero));
        bindings.insert("e".into(), 4.0);
        assert!(approx_eq(x.eval(&bindings).unwrap(), 1.0, 1e-12));
    }

    #[test]
    fn substitute_rational_function() {
        // (e + r) / e with e := 1/r  ->  (1 + r^2) / 1
        let x = &(&e() + &r()) / &e();
        let s = x.substitute("e", &(&n(1) / &r())).unwrap();
        assert_eq!(s, &n(1) + &(&r() * &r()));

        let bound = x
            .bind(&[("r".to_string(), BigRational::from_integer(BigInt::from(2)))])
            .unwrap();
        assert_eq!(bound, &(&e() + &n(2)) / &e());

        assert_eq!(
            (&n(1) / &e()).substitute("e", &Expr::zero()),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn sums_and_constants() {
        let parts = vec![e(), r(), e()];
        let total: Expr = parts.iter().sum();
        assert_eq!(total, &(&e() * &n(2)) + &r());
        assert_eq!(
            Expr::rational(6, 4).as_constant(),
            Some(BigRational::new(BigInt::from(3), BigInt::from(2)))
        );
        assert!(e().as_constant().is_none());
        assert_eq!(
            (&e() / &r()).variables().into_iter().collect::<Vec<_>>(),
            vec!["e".to_string(), "r".to_string()]
        );
    }
}
