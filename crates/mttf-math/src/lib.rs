//! Exact symbolic arithmetic for Markov reliability models.
//!
//! The graph engine in `mttf-core` is generic over [`Scalar`]; this crate
//! provides the symbolic implementation ([`Expr`], a reduced rational function
//! in named rate parameters) together with the linear algebra it needs.

pub mod math;

pub use math::expr::{Expr, EvalError};
pub use math::factor::{factor, Factorization, FactoredExpr};
pub use math::gcd::{content_in, gcd, primitive_part_in};
pub use math::matrix::{Matrix, MatrixError};
pub use math::poly::{Bindings, Monomial, Poly};
pub use math::scalar::Scalar;

pub use num_bigint::BigInt;
pub use num_rational::BigRational;
