//! Cooperative RSA signing: split a private exponent across several
//! parties, have each sign independently, and recombine the partials into
//! one ordinary RSA signature. Two sharing modes are supported:
//!
//! * **Unanimous** (`genkey N basename`) — `N` shares, all `N` required.
//! * **Threshold** (`threshold basename`) — a fixed 2-of-3 split, plus
//!   re-splitting into a fresh 2-of-3 from any 2 existing shards.
//!
//! Final signature verification is always left to an external verifier
//! (e.g. `openssl dgst -verify`); this crate never checks its own output.

pub mod dealer;
pub mod der;
pub mod errors;
pub mod keys;
pub mod merger;
pub mod pem;
pub mod pkcs1;
pub mod rsagen;
pub mod signer;
pub mod threshold;
pub mod x509;
