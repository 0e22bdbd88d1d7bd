//! PKCS#1 v1.5 encoding (RFC 8017 §9.2), fixed to SHA-256.
//!
//! The DigestInfo DER prefix is hard-coded rather than built through a
//! general ASN.1 encoder: `DigestInfo{ algorithm: sha256, digest: H }` is
//! a single fixed byte string for a given hash, so there's nothing a
//! generic encoder buys us here that the RFC's own worked prefix doesn't
//! already give for free.

use sha2::{Digest, Sha256};

use crate::errors::*;

/// DER encoding of `DigestInfo{ digestAlgorithm: sha256, digest: OCTET STRING }`
/// up to (not including) the 32-byte digest itself. RFC 8017 §9.2, via the
/// well-known SHA-256 AlgorithmIdentifier OID 2.16.840.1.101.3.4.2.1.
const SHA256_DIGEST_INFO_PREFIX: [u8; 19] = [
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01, 0x05,
    0x00, 0x04, 0x20,
];

const DIGEST_LEN: usize = 32;
const T_LEN: usize = SHA256_DIGEST_INFO_PREFIX.len() + DIGEST_LEN;

/// Builds the PKCS#1 v1.5 encoded message
/// `EM = 0x00 || 0x01 || PS || 0x00 || T` for `em_len` bytes total, where
/// `T` is the SHA-256 DigestInfo DER encoding of `message`.
pub fn emsa_pkcs1_v1_5_encode(message: &[u8], em_len: usize) -> Result<Vec<u8>> {
    if em_len < T_LEN + 11 {
        bail!("intended encoded message length too short");
    }

    let digest = Sha256::digest(message);

    let mut em = Vec::with_capacity(em_len);
    em.push(0x00);
    em.push(0x01);
    em.resize(em.len() + (em_len - T_LEN - 3), 0xff);
    em.push(0x00);
    em.extend_from_slice(&SHA256_DIGEST_INFO_PREFIX);
    em.extend_from_slice(&digest);

    debug_assert_eq!(em.len(), em_len);
    Ok(em)
}
