//! Fresh RSA key generation.
//!
//! Nothing downstream of this module generates RSA primes from scratch —
//! the dealer and re-splitter only ever split or consume an
//! already-existing private exponent. Trusted-dealer prime generation has
//! to come from somewhere, though, so this reaches for the `rsa`/
//! `num-bigint-dig` pairing rather than hand-rolling a prime generator,
//! which stays out of scope here.

use rsa::{PublicKeyParts, RsaPrivateKey};

use math::{BigUint, Secret};

use crate::errors::*;

const KEY_BITS: usize = 2048;

pub struct GeneratedKey {
    pub n: BigUint,
    pub e: BigUint,
    pub d: Secret,
}

fn to_math_biguint(v: &num_bigint_dig::BigUint) -> BigUint {
    BigUint::from_be_bytes(&v.to_bytes_be())
}

/// Generates a fresh 2048-bit RSA keypair and returns it in this crate's
/// own `BigUint` representation. `p`, `q`, and the CRT parameters are
/// discarded once `n`, `e`, `d` are extracted: nothing downstream of key
/// generation uses CRT (see the dealer's Non-goals).
pub fn generate() -> Result<GeneratedKey> {
    let mut rng = rand::rngs::OsRng;
    let key = RsaPrivateKey::new(&mut rng, KEY_BITS).context("RSA key generation failed")?;

    Ok(GeneratedKey {
        n: to_math_biguint(key.n()),
        e: to_math_biguint(key.e()),
        d: Secret::new(to_math_biguint(key.d())),
    })
}
