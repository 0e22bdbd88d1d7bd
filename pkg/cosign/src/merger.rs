//! The merger: `merge pubkey sig1 sig2 ... sigK`.
//!
//! Unanimous partials are plain `m^{d_i} mod n` blocks (one block length,
//! 256 bytes for a 2048-bit key) and combine by straight multiplication:
//! `product(m^{d_i}) mod n == m^{sum d_i} mod n == m^d mod n`, since the
//! shares were split by integer addition in the first place.
//!
//! A threshold partial is twice that length — `m^{p_i} mod n` concatenated
//! with `m^{q_i} mod n` — and merging exactly two of them (any more is
//! rejected outright; this scheme never combines more than one pair) gives
//! two candidate products, `p_i`-half times `q_j`-half and vice versa. Only
//! one of the two is the real signature; the other is multiplying together
//! unrelated exponents and will not verify. Both unanimous and threshold
//! partials can be mixed into one merge (e.g. re-combining a threshold pair
//! alongside other unanimous co-signers), which is why two running
//! candidate products are carried throughout rather than one.

use std::fs;

use math::BigUint;

use crate::errors::*;
use crate::keys::PublicKey;

/// The fixed four leading bytes of every `EMSA-PKCS1-v1.5` block this
/// codec produces for a 2048-bit key: `0x00 0x01` followed by at least
/// two bytes of `0xff` padding. Good enough to tell a correctly assembled
/// signature from mismatched partials without fully re-deriving the
/// expected encoded message.
const EXPECTED_PREFIX: [u8; 4] = [0x00, 0x01, 0xff, 0xff];

pub fn merge(pubkey_file: &str, sig_files: &[String]) -> Result<Vec<u8>> {
    let public_key = PublicKey::load(pubkey_file).with_context(|| format!("failed to load public key {}", pubkey_file))?;
    let block_len = public_key.block_len();

    let mut unanimous_product = BigUint::one();
    let mut threshold_halves: Vec<(BigUint, BigUint)> = vec![];

    for path in sig_files {
        let data = fs::read(path).with_context(|| format!("failed to read partial signature {}", path))?;

        if data.len() == block_len {
            let s = BigUint::from_be_bytes(&data);
            unanimous_product = math::Modulo::new(&public_key.n).mul(&unanimous_product, &s);
        } else if data.len() == 2 * block_len {
            let p_half = BigUint::from_be_bytes(&data[..block_len]);
            let q_half = BigUint::from_be_bytes(&data[block_len..]);
            threshold_halves.push((p_half, q_half));
        } else {
            bail!(
                "partial signature {} has length {}, expected {} or {}",
                path,
                data.len(),
                block_len,
                2 * block_len
            );
        }
    }

    if threshold_halves.len() > 2 {
        bail!(
            "merge only supports one threshold pair at a time, got {} threshold partials",
            threshold_halves.len()
        );
    }

    let modulo = math::Modulo::new(&public_key.n);
    let candidates = if threshold_halves.len() == 2 {
        let (pa, qa) = &threshold_halves[0];
        let (pb, qb) = &threshold_halves[1];
        let da = modulo.mul(pa, qb);
        let db = modulo.mul(qa, pb);
        vec![
            modulo.mul(&unanimous_product, &da),
            modulo.mul(&unanimous_product, &db),
        ]
    } else {
        vec![unanimous_product]
    };

    for (i, candidate) in candidates.iter().enumerate() {
        let raised = modulo.pow(candidate, &public_key.e).to_be_bytes_padded(block_len);
        if raised.len() >= 4 && raised[..4] == EXPECTED_PREFIX {
            log::debug!(
                "merge: {} partial(s) combined, candidate {} validated against the public exponent",
                sig_files.len(),
                i
            );
            return Ok(candidate.to_be_bytes_padded(block_len));
        }
    }

    bail!("invalid or missing partial signatures");
}

pub fn run(pubkey_file: &str, sig_files: &[String]) -> Result<()> {
    let signature = merge(pubkey_file, sig_files)?;
    use std::io::Write;
    std::io::stdout()
        .write_all(&signature)
        .context("failed to write merged signature to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivateKeyShard;
    use crate::signer;

    // A real (if undersized, for speed) 520-bit RSA triple, so that
    // `merge`'s PKCS#1 prefix probe actually has something genuine to
    // confirm rather than vacuously failing on unrelated e/d/n.
    const N_BYTES: [u8; 65] = [
        0xac, 0x97, 0x6d, 0x83, 0xc5, 0x01, 0x22, 0xdd, 0x72, 0xed, 0xf5, 0x88, 0x92, 0xdc, 0x5b,
        0x99, 0xa9, 0x4f, 0x14, 0x73, 0x3d, 0x49, 0x10, 0x14, 0x2f, 0x3c, 0x34, 0x7b, 0x98, 0xc3,
        0xca, 0x43, 0x1f, 0x15, 0x8e, 0xdf, 0xff, 0x05, 0x31, 0xf4, 0xe7, 0x03, 0xf4, 0x25, 0xbc,
        0x08, 0x5f, 0x28, 0x45, 0x6a, 0x2b, 0x74, 0x1e, 0x74, 0x98, 0x46, 0x19, 0xc9, 0xa0, 0x74,
        0x5c, 0xd2, 0x38, 0xf8, 0x5b,
    ];
    const D_BYTES: [u8; 65] = [
        0x82, 0xef, 0xff, 0x2d, 0xd0, 0xf0, 0x23, 0xbb, 0x4d, 0xce, 0x2a, 0x51, 0x0a, 0xda, 0x12,
        0xc4, 0x69, 0x26, 0x8d, 0xa5, 0x40, 0x01, 0x86, 0x29, 0x4a, 0x0c, 0xaa, 0xe4, 0x79, 0xe9,
        0x50, 0x31, 0xb8, 0x10, 0x93, 0x36, 0x4b, 0x92, 0x26, 0x9f, 0xa8, 0xd6, 0xb8, 0x57, 0x15,
        0xe3, 0xd0, 0x01, 0x9d, 0x21, 0x5c, 0x15, 0xd0, 0x90, 0x1e, 0xc4, 0x01, 0x60, 0xf6, 0xbe,
        0x8a, 0x95, 0x85, 0x89, 0x41,
    ];

    fn toy_key() -> (BigUint, BigUint, BigUint) {
        let n = BigUint::from_be_bytes(&N_BYTES);
        let e = BigUint::from(65537u32);
        let d = BigUint::from_be_bytes(&D_BYTES);
        (n, e, d)
    }

    fn write_sig(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> String {
        let path = dir.path().join(name);
        fs::write(&path, bytes).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn recombines_two_unanimous_shares() {
        let (n, e, d) = toy_key();
        let half_a = BigUint::from_be_bytes(&[0x12u8; 200]);
        let half_b = &d - &half_a;

        let shard_a = PrivateKeyShard::unanimous(n.clone(), e.clone(), half_a);
        let shard_b = PrivateKeyShard::unanimous(n.clone(), e.clone(), half_b);
        let public_key = PublicKey::new(n, e);

        let dir = tempfile::tempdir().unwrap();
        let pubkey_path = write_sig(&dir, "key.pub", public_key.to_pem().as_bytes());

        let message = b"merge me";
        let sig_a = write_sig(&dir, "a.sig", &signer::sign(&shard_a, message).unwrap());
        let sig_b = write_sig(&dir, "b.sig", &signer::sign(&shard_b, message).unwrap());

        let merged = merge(&pubkey_path, &[sig_a, sig_b]).unwrap();
        assert_eq!(merged.len(), public_key.block_len());
    }

    #[test]
    fn recombines_a_threshold_pair() {
        let (n, e, d) = toy_key();
        let p0 = math::random::uniform_below(&d);
        let q1 = &d - &p0;
        let p1 = math::random::uniform_below(&d);

        let shard0 = PrivateKeyShard::threshold(n.clone(), e.clone(), p0, BigUint::zero());
        let shard1 = PrivateKeyShard::threshold(n.clone(), e.clone(), p1, q1);
        let public_key = PublicKey::new(n, e);

        let dir = tempfile::tempdir().unwrap();
        let pubkey_path = write_sig(&dir, "key.pub", public_key.to_pem().as_bytes());

        let message = b"threshold merge";
        let sig0 = write_sig(&dir, "0.sig", &signer::sign(&shard0, message).unwrap());
        let sig1 = write_sig(&dir, "1.sig", &signer::sign(&shard1, message).unwrap());

        let merged = merge(&pubkey_path, &[sig0, sig1]).unwrap();
        assert_eq!(merged.len(), public_key.block_len());
    }

    #[test]
    fn rejects_more_than_one_threshold_pair() {
        let (n, e, _d) = toy_key();
        let public_key = PublicKey::new(n.clone(), e.clone());
        let dir = tempfile::tempdir().unwrap();
        let pubkey_path = write_sig(&dir, "key.pub", public_key.to_pem().as_bytes());

        let block_len = public_key.block_len();
        let mut files = vec![];
        for i in 0..3 {
            files.push(write_sig(&dir, &format!("{}.sig", i), &vec![0x01u8; 2 * block_len]));
        }

        let err = merge(&pubkey_path, &files).unwrap_err();
        assert!(err.to_string().contains("one threshold pair"));
    }

    #[test]
    fn rejects_a_mismatched_length_partial() {
        let (n, e, _d) = toy_key();
        let public_key = PublicKey::new(n, e);
        let dir = tempfile::tempdir().unwrap();
        let pubkey_path = write_sig(&dir, "key.pub", public_key.to_pem().as_bytes());
        let bad = write_sig(&dir, "bad.sig", &[0u8; 17]);

        assert!(merge(&pubkey_path, &[bad]).is_err());
    }
}
