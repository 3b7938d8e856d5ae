//! Partial factorization used for printing closed-form results.
//!
//! Pulls out the numeric content, monomial factors, per-variable contents and
//! linear factors of univariate pieces that have rational roots. The
//! remaining factors are not guaranteed irreducible.

use super::gcd::{content_in, primitive_part_in};
use super::poly::Poly;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeSet;
use std::fmt;

/// Candidate roots are only enumerated when both end coefficients stay below
/// this magnitude.
const MAX_DIVISOR_SEARCH: u64 = 1_000_000_000_000;

/// `coefficient * Π factor^exponent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Factorization {
    pub coefficient: BigRational,
    pub factors: Vec<(Poly, u32)>,
}

impl Factorization {
    /// Multiplies the factorization back out.
    pub fn expand(&self) -> Poly {
        self.factors
            .iter()
            .fold(Poly::constant(self.coefficient.clone()), |acc, (f, k)| {
                &acc * &f.pow(*k)
            })
    }

    /// True when printing needs more than one multiplicand.
    pub fn is_product(&self) -> bool {
        let coefficient_shown =
            !self.coefficient.abs().is_one() || self.factors.is_empty();
        let items = self.factors.len() + usize::from(coefficient_shown);
        items > 1
    }

    /// A lone sum printed without surrounding parentheses.
    pub fn is_bare_sum(&self) -> bool {
        matches!(self.factors.as_slice(), [(f, 1)] if f.num_terms() > 1)
            && self.coefficient.is_one()
    }
}

impl fmt::Display for Factorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.factors.is_empty() {
            return write!(f, "{}", self.coefficient);
        }
        if self.is_bare_sum() {
            return write!(f, "{}", self.factors[0].0);
        }
        if self.coefficient == -BigRational::one() {
            write!(f, "-")?;
        } else if !self.coefficient.is_one() {
            if self.coefficient.is_integer() {
                write!(f, "{}*", self.coefficient)?;
            } else {
                write!(f, "({})*", self.coefficient)?;
            }
        }
        for (i, (factor, exp)) in self.factors.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            let bare = factor.num_terms() == 1 && factor.leading_coefficient().is_one();
            if bare {
                write!(f, "{}", factor)?;
            } else {
                write!(f, "({})", factor)?;
            }
            if *exp > 1 {
                write!(f, "^{}", exp)?;
            }
        }
        Ok(())
    }
}

/// A rational function printed as factored numerator over factored
/// denominator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoredExpr {
    pub numerator: Factorization,
    pub denominator: Factorization,
}

impl fmt::Display for FactoredExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator.factors.is_empty() && self.denominator.coefficient.is_one() {
            return write!(f, "{}", self.numerator);
        }
        if self.numerator.is_bare_sum() {
            write!(f, "({})", self.numerator)?;
        } else {
            write!(f, "{}", self.numerator)?;
        }
        if self.denominator.is_product() || self.denominator.is_bare_sum() {
            write!(f, "/({})", self.denominator)
        } else {
            write!(f, "/{}", self.denominator)
        }
    }
}

/// Factors `p` as far as the cheap techniques above allow.
pub fn factor(p: &Poly) -> Factorization {
    if p.is_constant() {
        return Factorization {
            coefficient: p.as_constant().unwrap_or_else(BigRational::zero),
            factors: Vec::new(),
        };
    }

    let mut factors: Vec<(Poly, u32)> = Vec::new();
    let primitive = p.integer_normalized();

    let monomial = primitive.monomial_content();
    for (var, exp) in monomial.exponents() {
        factors.push((Poly::var(var), exp));
    }
    let rest = primitive.div_monomial(&monomial).unwrap_or(primitive);

    split(rest, &mut factors);

    let expanded_lead = factors
        .iter()
        .fold(BigRational::one(), |acc, (f, k)| {
            acc * num_traits::pow(f.leading_coefficient(), *k as usize)
        });
    Factorization {
        coefficient: p.leading_coefficient() / expanded_lead,
        factors,
    }
}

fn split(piece: Poly, out: &mut Vec<(Poly, u32)>) {
    if piece.is_constant() {
        return;
    }
    for var in piece.variables() {
        let content = content_in(&piece, &var);
        if !content.is_constant() {
            let primitive = primitive_part_in(&piece, &var);
            split(content, out);
            split(primitive, out);
            return;
        }
    }
    let rest = match piece.single_variable() {
        Some(var) => peel_linear_factors(piece, &var, out),
        None => piece,
    };
    if !rest.is_constant() {
        push_factor(out, rest);
    }
}

fn peel_linear_factors(mut piece: Poly, var: &str, out: &mut Vec<(Poly, u32)>) -> Poly {
    while piece.degree(var) >= 2 {
        let Some(root) = rational_root(&piece, var) else {
            break;
        };
        let linear = (&Poly::var(var).scale(&BigRational::from_integer(root.denom().clone()))
            - &Poly::constant(BigRational::from_integer(root.numer().clone())))
            .integer_normalized();
        match piece.div_exact(&linear) {
            Some(quotient) => {
                push_factor(out, linear);
                piece = quotient.integer_normalized();
            }
            None => break,
        }
    }
    piece
}

fn rational_root(piece: &Poly, var: &str) -> Option<BigRational> {
    let lead = piece.leading_coefficient().to_integer();
    let constant = piece.coefficient_in(var, 0).as_constant()?.to_integer();
    let numerators = divisors(&constant)?;
    let denominators = divisors(&lead)?;

    let mut candidates = BTreeSet::new();
    for p in &numerators {
        for q in &denominators {
            let candidate = BigRational::new(p.clone(), q.clone());
            candidates.insert(-candidate.clone());
            candidates.insert(candidate);
        }
    }
    candidates
        .into_iter()
        .find(|root| piece.substitute_value(var, root).is_zero())
}

fn divisors(n: &BigInt) -> Option<Vec<BigInt>> {
    let n = n.abs().to_u64()?;
    if n == 0 || n > MAX_DIVISOR_SEARCH {
        return None;
    }
    let mut out = Vec::new();
    let mut d = 1u64;
    while d * d <= n {
        if n % d == 0 {
            out.push(BigInt::from(d));
            if d * d != n {
                out.push(BigInt::from(n / d));
            }
        }
        d += 1;
    }
    Some(out)
}

fn push_factor(out: &mut Vec<(Poly, u32)>, factor: Poly) {
    match out.iter_mut().find(|(f, _)| *f == factor) {
        Some((_, exp)) => *exp += 1,
        None => out.push((factor, 1)),
    }
}
