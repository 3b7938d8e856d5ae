//! Sparse multivariate polynomials with exact rational coefficients.
//!
//! Variables are identified by name. Monomials are ordered lexicographically
//! with variables ranked by name, so `e` outranks `r` and `N` outranks `e`.
//! The leading term of a polynomial is its largest monomial in that order.

use super::expr::EvalError;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Numeric values for named variables.
pub type Bindings = BTreeMap<String, f64>;

/// A power product of named variables. Stored exponents are always positive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Monomial(BTreeMap<String, u32>);

impl Monomial {
    /// The empty power product.
    pub fn one() -> Self {
        Self::default()
    }

    /// A single variable raised to `exp`.
    pub fn power(var: &str, exp: u32) -> Self {
        let mut out = BTreeMap::new();
        if exp > 0 {
            out.insert(var.to_string(), exp);
        }
        Monomial(out)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Exponent of `var` (zero when absent).
    pub fn degree(&self, var: &str) -> u32 {
        self.0.get(var).copied().unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn exponents(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(v, e)| (v.as_str(), *e))
    }

    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = self.0.clone();
        for (var, exp) in &other.0 {
            *out.entry(var.clone()).or_insert(0) += exp;
        }
        Monomial(out)
    }

    /// True when `self` divides `other`.
    pub fn divides(&self, other: &Monomial) -> bool {
        self.0.iter().all(|(var, exp)| other.degree(var) >= *exp)
    }

    pub fn checked_div(&self, divisor: &Monomial) -> Option<Monomial> {
        if !divisor.divides(self) {
            return None;
        }
        let mut out = self.0.clone();
        for (var, exp) in &divisor.0 {
            let slot = out.get_mut(var)?;
            *slot -= exp;
            if *slot == 0 {
                out.remove(var);
            }
        }
        Some(Monomial(out))
    }

    /// Largest monomial dividing both.
    pub fn gcd(&self, other: &Monomial) -> Monomial {
        Monomial(
            self.0
                .iter()
                .filter_map(|(var, exp)| {
                    let common = (*exp).min(other.degree(var));
                    (common > 0).then(|| (var.clone(), common))
                })
                .collect(),
        )
    }

    fn without(&self, var: &str) -> Monomial {
        let mut out = self.0.clone();
        out.remove(var);
        Monomial(out)
    }
}

impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut a = self.0.iter().peekable();
        let mut b = other.0.iter().peekable();
        loop {
            match (a.peek(), b.peek()) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((va, ea)), Some((vb, eb))) => match va.cmp(vb) {
                    // `other` lacks `va`, which ranks above everything after it.
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                    Ordering::Equal => match ea.cmp(eb) {
                        Ordering::Equal => {
                            a.next();
                            b.next();
                        }
                        unequal => return unequal,
                    },
                },
            }
        }
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let mut first = true;
        for (var, exp) in &self.0 {
            if !first {
                write!(f, "*")?;
            }
            first = false;
            if *exp == 1 {
                write!(f, "{}", var)?;
            } else {
                write!(f, "{}^{}", var, exp)?;
            }
        }
        Ok(())
    }
}

/// Polynomial over the rationals in any number of named variables.
///
/// Zero coefficients are never stored, so structural equality is value
/// equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Poly {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(value: BigRational) -> Self {
        Self::term(Monomial::one(), value)
    }

    pub fn integer(value: i64) -> Self {
        Self::constant(BigRational::from_integer(BigInt::from(value)))
    }

    /// The polynomial consisting of the single variable `name`.
    pub fn var(name: &str) -> Self {
        Self::term(Monomial::power(name, 1), BigRational::one())
    }

    pub fn term(monomial: Monomial, coefficient: BigRational) -> Self {
        let mut poly = Self::zero();
        poly.add_term(monomial, coefficient);
        poly
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn is_one(&self) -> bool {
        self.as_constant().map_or(false, |c| c.is_one())
    }

    /// The constant value when the polynomial has no variables.
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.as_constant().is_some()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Terms in descending monomial order.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter().rev()
    }

    pub fn leading_term(&self) -> Option<(&Monomial, &BigRational)> {
        self.terms.iter().next_back()
    }

    pub fn leading_coefficient(&self) -> BigRational {
        self.leading_term()
            .map(|(_, c)| c.clone())
            .unwrap_or_else(BigRational::zero)
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.terms
            .keys()
            .flat_map(|m| m.exponents().map(|(v, _)| v.to_string()))
            .collect()
    }

    /// The only variable, when exactly one occurs.
    pub fn single_variable(&self) -> Option<String> {
        let vars = self.variables();
        if vars.len() == 1 {
            vars.into_iter().next()
        } else {
            None
        }
    }

    /// Highest exponent of `var` over all terms.
    pub fn degree(&self, var: &str) -> u32 {
        self.terms.keys().map(|m| m.degree(var)).max().unwrap_or(0)
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .keys()
            .map(Monomial::total_degree)
            .max()
            .unwrap_or(0)
    }

    /// Coefficient of `var^k`, as a polynomial in the remaining variables.
    pub fn coefficient_in(&self, var: &str, k: u32) -> Poly {
        let mut out = Poly::zero();
        for (mono, coeff) in &self.terms {
            if mono.degree(var) == k {
                out.add_term(mono.without(var), coeff.clone());
            }
        }
        out
    }

    /// Splits into coefficients of the powers of `var`.
    pub fn coefficients_in(&self, var: &str) -> BTreeMap<u32, Poly> {
        let mut out: BTreeMap<u32, Poly> = BTreeMap::new();
        for (mono, coeff) in &self.terms {
            out.entry(mono.degree(var))
                .or_default()
                .add_term(mono.without(var), coeff.clone());
        }
        out
    }

    pub fn add_term(&mut self, monomial: Monomial, coefficient: BigRational) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.get_mut(&monomial) {
            Some(existing) => {
                *existing += coefficient;
                if existing.is_zero() {
                    self.terms.remove(&monomial);
                }
            }
            None => {
                self.terms.insert(monomial, coefficient);
            }
        }
    }

    pub fn scale(&self, factor: &BigRational) -> Poly {
        if factor.is_zero() {
            return Poly::zero();
        }
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
    }

    pub fn mul_monomial(&self, monomial: &Monomial) -> Poly {
        Poly {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.mul(monomial), c.clone()))
                .collect(),
        }
    }

    pub fn pow(&self, exp: u32) -> Poly {
        let mut result = Poly::one();
        let mut base = self.clone();
        let mut e = exp;
        while e > 0 {
            if e & 1 == 1 {
                result = &result * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        result
    }

    /// Quotient when `divisor` divides `self` exactly, otherwise `None`.
    pub fn div_exact(&self, divisor: &Poly) -> Option<Poly> {
        let (div_mono, div_coeff) = divisor.leading_term()?;
        let mut remainder = self.clone();
        let mut quotient = Poly::zero();
        while let Some((mono, coeff)) = remainder.leading_term() {
            let q_mono = mono.checked_div(div_mono)?;
            let q_coeff = coeff / div_coeff;
            let step = Poly::term(q_mono, q_coeff);
            remainder = &remainder - &(divisor * &step);
            quotient = &quotient + &step;
        }
        Some(quotient)
    }

    /// Divides every term by a monomial that divides all of them.
    pub fn div_monomial(&self, monomial: &Monomial) -> Option<Poly> {
        let mut out = Poly::zero();
        for (mono, coeff) in &self.terms {
            out.add_term(mono.checked_div(monomial)?, coeff.clone());
        }
        Some(out)
    }

    /// Largest monomial dividing every term.
    pub fn monomial_content(&self) -> Monomial {
        let mut iter = self.terms.keys();
        let Some(first) = iter.next() else {
            return Monomial::one();
        };
        iter.fold(first.clone(), |acc, m| acc.gcd(m))
    }

    /// Positive rational `c` such that `self / c` has coprime integer
    /// coefficients. Zero for the zero polynomial.
    pub fn rational_content(&self) -> BigRational {
        let mut numer = BigInt::zero();
        let mut denom = BigInt::one();
        for coeff in self.terms.values() {
            numer = numer.gcd(coeff.numer());
            denom = denom.lcm(coeff.denom());
        }
        if numer.is_zero() {
            return BigRational::zero();
        }
        BigRational::new(numer, denom)
    }

    /// Scaled to coprime integer coefficients with a positive leading
    /// coefficient.
    pub fn integer_normalized(&self) -> Poly {
        if self.is_zero() {
            return Poly::zero();
        }
        let mut content = self.rational_content();
        if self.leading_coefficient().is_negative() {
            content = -content;
        }
        self.scale(&content.recip())
    }

    /// Formal partial derivative.
    pub fn derivative(&self, var: &str) -> Poly {
        let mut out = Poly::zero();
        for (mono, coeff) in &self.terms {
            let k = mono.degree(var);
            if k == 0 {
                continue;
            }
            let lowered = mono.without(var).mul(&Monomial::power(var, k - 1));
            out.add_term(lowered, coeff * BigRational::from_integer(BigInt::from(k)));
        }
        out
    }

    /// Replaces `var` by a polynomial.
    pub fn substitute(&self, var: &str, value: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (k, coeff) in self.coefficients_in(var) {
            out = &out + &(&coeff * &value.pow(k));
        }
        out
    }

    /// Replaces `var` by an exact rational number.
    pub fn substitute_value(&self, var: &str, value: &BigRational) -> Poly {
        self.substitute(var, &Poly::constant(value.clone()))
    }

    /// Evaluates with floating point bindings for every variable.
    pub fn eval(&self, bindings: &Bindings) -> Result<f64, EvalError> {
        let mut total = 0.0;
        for (mono, coeff) in &self.terms {
            let mut value = rational_to_f64(coeff);
            for (var, exp) in mono.exponents() {
                let x = bindings
                    .get(var)
                    .ok_or_else(|| EvalError::UnboundVariable(var.to_string()))?;
                value *= x.powi(exp as i32);
            }
            total += value;
        }
        Ok(total)
    }

    fn add_impl(a: &Poly, b: &Poly) -> Poly {
        let mut out = a.clone();
        for (mono, coeff) in &b.terms {
            out.add_term(mono.clone(), coeff.clone());
        }
        out
    }

    fn sub_impl(a: &Poly, b: &Poly) -> Poly {
        let mut out = a.clone();
        for (mono, coeff) in &b.terms {
            out.add_term(mono.clone(), -coeff.clone());
        }
        out
    }

    fn mul_impl(a: &Poly, b: &Poly) -> Poly {
        let mut out = Poly::zero();
        for (ma, ca) in &a.terms {
            for (mb, cb) in &b.terms {
                out.add_term(ma.mul(mb), ca * cb);
            }
        }
        out
    }
}

forward_binop!(Poly, Add, add, Poly::add_impl);
forward_binop!(Poly, Sub, sub, Poly::sub_impl);
forward_binop!(Poly, Mul, mul, Poly::mul_impl);

impl std::ops::Neg for Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        Poly {
            terms: self.terms.into_iter().map(|(m, c)| (m, -c)).collect(),
        }
    }
}

impl std::ops::Neg for &Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        -self.clone()
    }
}

impl From<i64> for Poly {
    fn from(value: i64) -> Self {
        Poly::integer(value)
    }
}

impl fmt::Display for Poly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (mono, coeff)) in self.terms().enumerate() {
            let negative = coeff.is_negative();
            match (i, negative) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, " - ")?,
                (_, false) => write!(f, " + ")?,
            }
            let magnitude = coeff.abs();
            if mono.is_one() {
                write!(f, "{}", magnitude)?;
            } else if magnitude.is_one() {
                write!(f, "{}", mono)?;
            } else {
                write!(f, "{}*{}", magnitude, mono)?;
            }
        }
        Ok(())
    }
}

/// Best-effort conversion of an exact rational to `f64`.
pub(crate) fn rational_to_f64(value: &BigRational) -> f64 {
    let numer = value.numer().to_f64().unwrap_or(f64::NAN);
    let denom = value.denom().to_f64().unwrap_or(f64::NAN);
    numer / denom
}
