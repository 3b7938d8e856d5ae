//! Core math modules.

#[macro_use]
mod macros;

pub mod expr;
pub mod factor;
pub mod gcd;
pub mod matrix;
pub mod poly;
pub mod scalar;
