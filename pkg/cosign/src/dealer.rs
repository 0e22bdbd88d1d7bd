//! The unanimous (N-of-N) dealer: `genkey N basename`.
//!
//! Splits a freshly generated RSA private exponent into `N` additive
//! shares by integer addition — `d == d_0 + d_1 + ... + d_{N-1}`, with no
//! reduction mod `lambda(n)` anywhere in the sum. All `N` shares must be
//! present and summed to recover `d`; there is no way to sign with fewer.

use std::path::Path;

use math::{BigUint, Secret};

use crate::errors::*;
use crate::keys::{PrivateKeyShard, PublicKey};
use crate::rsagen;
use crate::x509;

pub const MIN_SHARES: usize = 1;
pub const MAX_SHARES: usize = 16;

/// Byte width each non-final share is drawn under. Chosen comfortably
/// smaller than a 2048-bit modulus so that summing up to `MAX_SHARES - 1`
/// of them can never reach `d` and force the final share negative.
const SHARE_BOUND_BYTES: usize = 254;

pub fn genkey(n_shares: usize, basename: &str) -> Result<()> {
    if n_shares < MIN_SHARES || n_shares > MAX_SHARES {
        bail!(
            "number of shares must be between {} and {}, got {}",
            MIN_SHARES,
            MAX_SHARES,
            n_shares
        );
    }

    log::info!("generating a fresh 2048-bit RSA key for {} unanimous shares", n_shares);
    let key = rsagen::generate()?;

    let public_key = PublicKey::new(key.n.clone(), key.e.clone());
    public_key.save(format!("{}.pub", basename))?;

    let cert_pem = x509::self_signed_certificate_pem(&public_key, &key.d)?;
    std::fs::write(format!("{}.pem", basename), cert_pem).context("failed to write certificate")?;

    let shares = split_d(key.d.expose_secret(), n_shares);
    for (i, share) in shares.into_iter().enumerate() {
        let shard = PrivateKeyShard::unanimous(key.n.clone(), key.e.clone(), share);
        shard
            .save(shard_path(basename, i))
            .with_context(|| format!("failed to write share {}", i))?;
    }

    Ok(())
}

pub fn shard_path(basename: &str, index: usize) -> impl AsRef<Path> {
    format!("{}-{}.key", basename, index)
}

/// Splits `d` into `n` non-negative addends summing to exactly `d`. The
/// first `n - 1` are drawn uniformly from `[0, 2^(8*SHARE_BOUND_BYTES))`;
/// the last is whatever integer makes the sum exact. At most 15 such draws
/// ever happen (`MAX_SHARES - 1`), so their sum is bounded well below a
/// 2048-bit `d` and the final share is always a large positive integer.
fn split_d(d: &BigUint, n: usize) -> Vec<BigUint> {
    let mut bound_bytes = vec![0u8; SHARE_BOUND_BYTES + 1];
    bound_bytes[0] = 1;
    let bound = BigUint::from_be_bytes(&bound_bytes);

    let mut shares = Vec::with_capacity(n);
    let mut sum = BigUint::zero();
    for _ in 0..(n - 1) {
        let share = math::random::uniform_below(&bound);
        sum = &sum + &share;
        shares.push(share);
    }
    shares.push(d - &sum);
    shares
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_sum_to_d() {
        let d = BigUint::from_be_bytes(&[0x12u8; 256]);
        for n in [1usize, 2, 4, 16] {
            let shares = split_d(&d, n);
            assert_eq!(shares.len(), n);

            let mut sum = BigUint::zero();
            for s in &shares {
                sum = &sum + s;
            }
            assert_eq!(sum, d, "n = {}", n);
        }
    }

    #[test]
    fn single_share_is_d_itself() {
        let d = BigUint::from(12345u32);
        let shares = split_d(&d, 1);
        assert_eq!(shares, vec![d]);
    }
}
