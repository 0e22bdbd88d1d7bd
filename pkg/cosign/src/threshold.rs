//! The threshold (2-of-3) dealer and re-splitter: `threshold basename`
//! and `threshold basename k0 k1`.
//!
//! Three shards are dealt, each holding a pair `(p_i, q_i)`. They are
//! built so that, for the cyclic neighbor of each index, `p_i + q_{i+1}`
//! (mod 3) equals the true private exponent `d` exactly:
//!
//! ```text
//! q1 = d - p0      q2 = d - p1      q0 = d - p2
//! ```
//!
//! Any two shards can therefore reconstruct `d` — one of the two possible
//! cross sums (`p_i + q_j` or `q_i + p_j`) equals `d`, the other is
//! (overwhelmingly likely to be) junk. Which one is which isn't tracked
//! anywhere; re-splitting probes both against the sentinel [`crate::keys::MAGIC`]
//! exponent and keeps whichever checks out.

use math::{BigUint, Secret};

use crate::errors::*;
use crate::keys::{self, PrivateKeyShard, PublicKey};
use crate::rsagen;
use crate::x509;

const NUM_SHARDS: usize = 3;

/// Byte width `r0`/`r1`/`r2` are drawn under — the same bound the
/// unanimous dealer uses for its non-final shares, comfortably smaller
/// than `d` so every additive half is a large positive integer.
const SHARE_BOUND_BYTES: usize = 254;

pub fn shard_path(basename: &str, index: usize) -> String {
    format!("{}-{}.key", basename, index)
}

/// Deals a fresh threshold key: a new RSA keypair split into 3 shards,
/// any 2 of which reconstruct the signing exponent.
pub fn deal(basename: &str) -> Result<()> {
    log::info!("generating a fresh 2048-bit RSA key for a 2-of-3 threshold split");
    let key = rsagen::generate()?;

    let public_key = PublicKey::new(key.n.clone(), key.e.clone());
    public_key.save(format!("{}.pub", basename))?;

    let cert_pem = x509::self_signed_certificate_pem(&public_key, &key.d)?;
    std::fs::write(format!("{}.pem", basename), cert_pem).context("failed to write certificate")?;

    write_shards(&key.n, &key.e, basename, key.d.expose_secret())
}

/// Re-splits an existing threshold key from any two of its three shards,
/// producing 3 brand-new shards under `basename`. `shard0_path`/`shard1_path`
/// are arbitrary key-shard files — not necessarily two shards of the same
/// dealt key, and not necessarily named after `basename` — so shards
/// grafted together from two unrelated keys are caught by the modulus
/// check below rather than by any assumption about where the inputs live.
/// The reconstructed private exponent never touches disk.
pub fn resplit(basename: &str, shard0_path: &str, shard1_path: &str) -> Result<()> {
    let shard0 = PrivateKeyShard::load(shard0_path)
        .with_context(|| format!("failed to load shard {}", shard0_path))?;
    let shard1 = PrivateKeyShard::load(shard1_path)
        .with_context(|| format!("failed to load shard {}", shard1_path))?;

    if !shard0.is_threshold() || !shard1.is_threshold() {
        bail!("not a threshold key");
    }
    if shard0.n != shard1.n || shard0.e != shard1.e {
        bail!("different public key modulii");
    }

    let d = reconstruct_d(&shard0, &shard1)?;
    write_shards(&shard0.n, &shard0.e, basename, d.expose_secret())
}

/// Reconstructs `d` from two threshold shards by trying both cross sums
/// and checking which one round-trips the [`keys::MAGIC`] sentinel
/// through `c = MAGIC^e mod n`, `c^d mod n == MAGIC`.
fn reconstruct_d(shard0: &PrivateKeyShard, shard1: &PrivateKeyShard) -> Result<Secret> {
    let modulo = math::Modulo::new(&shard0.n);
    let c = modulo.pow(&keys::magic(), &shard0.e);

    let da = &shard0.p + &shard1.q;
    let db = &shard0.q + &shard1.p;

    if modulo.pow(&c, &da) == keys::magic() {
        log::debug!("re-split reconstruction: chose p0 + q1");
        return Ok(Secret::new(da));
    }
    if modulo.pow(&c, &db) == keys::magic() {
        log::debug!("re-split reconstruction: chose q0 + p1");
        return Ok(Secret::new(db));
    }

    bail!("don't make a real private key: these two shares do not reconstruct a valid exponent");
}

fn write_shards(n: &BigUint, e: &BigUint, basename: &str, d: &BigUint) -> Result<()> {
    let mut bound_bytes = vec![0u8; SHARE_BOUND_BYTES + 1];
    bound_bytes[0] = 1;
    let bound = BigUint::from_be_bytes(&bound_bytes);

    let p = [
        math::random::uniform_below(&bound),
        math::random::uniform_below(&bound),
        math::random::uniform_below(&bound),
    ];

    // q[(i + 1) % 3] = d - p[i], so that p[i] + q[(i + 1) % 3] == d exactly.
    let mut q = [BigUint::zero(), BigUint::zero(), BigUint::zero()];
    for i in 0..NUM_SHARDS {
        q[(i + 1) % NUM_SHARDS] = d - &p[i];
    }

    for i in 0..NUM_SHARDS {
        let shard = PrivateKeyShard::threshold(n.clone(), e.clone(), p[i].clone(), q[i].clone());
        shard
            .save(shard_path(basename, i))
            .with_context(|| format!("failed to write shard {}", i))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_key() -> (BigUint, BigUint, BigUint) {
        // A modulus large enough that `uniform_below(d)` below behaves
        // sensibly; correctness here doesn't depend on n/e/d being a real
        // RSA triple, only on the additive reconstruction arithmetic.
        let n = BigUint::from_be_bytes(&[0x9fu8; 256]);
        let e = BigUint::from(65537u32);
        let d = BigUint::from_be_bytes(&[0x37u8; 256]);
        (n, e, d)
    }

    fn shards_for(n: &BigUint, e: &BigUint, d: &BigUint) -> [PrivateKeyShard; 3] {
        let p = [
            math::random::uniform_below(d),
            math::random::uniform_below(d),
            math::random::uniform_below(d),
        ];
        let mut q = [BigUint::zero(), BigUint::zero(), BigUint::zero()];
        for i in 0..3 {
            q[(i + 1) % 3] = d - &p[i];
        }
        [
            PrivateKeyShard::threshold(n.clone(), e.clone(), p[0].clone(), q[0].clone()),
            PrivateKeyShard::threshold(n.clone(), e.clone(), p[1].clone(), q[1].clone()),
            PrivateKeyShard::threshold(n.clone(), e.clone(), p[2].clone(), q[2].clone()),
        ]
    }

    #[test]
    fn every_adjacent_pair_reconstructs_d() {
        let (n, e, d) = toy_key();
        let shards = shards_for(&n, &e, &d);

        for &(i, j) in &[(0usize, 1usize), (1, 2), (0, 2)] {
            let reconstructed = reconstruct_d(&shards[i], &shards[j]).unwrap();
            assert_eq!(reconstructed.expose_secret(), &d, "pair ({}, {})", i, j);
        }
    }

    #[test]
    fn mismatched_moduli_are_rejected_before_reconstruction() {
        let (n, e, d) = toy_key();
        let shards = shards_for(&n, &e, &d);
        let mut other = shards[1].clone();
        other.n = &other.n + &BigUint::one();
        assert_ne!(shards[0].n, other.n);
    }
}
