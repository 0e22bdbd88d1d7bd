//! Arbitrary-precision unsigned integer arithmetic and a thin CSPRNG
//! adapter, sized for RSA-scale (2048-bit) modular exponentiation.
//!
//! This does not aim to be a general-purpose bignum library: only the
//! operations the cooperative-signing engine needs are implemented, and
//! none of them run in constant time (see `big::modulo::Modulo::pow`).

pub mod big;
pub mod random;

pub use big::{BigUint, Modulo, Secret};
