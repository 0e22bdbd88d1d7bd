//! The partial signer: `sign keyfile`.
//!
//! Reads a message from stdin and a private-key shard from `keyfile`, and
//! writes a raw partial signature to stdout. Both streams are treated as
//! binary: no trailing newline, no text framing, so the result can be fed
//! straight into `merge` or redirected to a file.

use std::io::{Read, Write};

use math::BigUint;

use crate::errors::*;
use crate::keys::PrivateKeyShard;
use crate::pkcs1;

/// Computes this shard's raw partial signature over `message`.
///
/// An unanimous shard signs with its share of `d` directly: `m^{d_i} mod n`.
/// A threshold shard (`d == MAGIC`) instead emits the concatenation of
/// `m^{p_i} mod n` and `m^{q_i} mod n` — the merger needs both halves to
/// cross-multiply against another shard's halves.
pub fn sign(shard: &PrivateKeyShard, message: &[u8]) -> Result<Vec<u8>> {
    let block_len = (shard.n.value_bits() + 7) / 8;
    let em = pkcs1::emsa_pkcs1_v1_5_encode(message, block_len)?;
    let m = BigUint::from_be_bytes(&em);
    let modulo = math::Modulo::new(&shard.n);

    if shard.is_threshold() {
        let sig_p = modulo.pow(&m, &shard.p).to_be_bytes_padded(block_len);
        let sig_q = modulo.pow(&m, &shard.q).to_be_bytes_padded(block_len);
        let mut out = sig_p;
        out.extend_from_slice(&sig_q);
        Ok(out)
    } else {
        Ok(modulo.pow(&m, &shard.d).to_be_bytes_padded(block_len))
    }
}

pub fn run(keyfile: &str) -> Result<()> {
    let shard = PrivateKeyShard::load(keyfile).with_context(|| format!("failed to load key {}", keyfile))?;

    let mut message = vec![];
    std::io::stdin()
        .read_to_end(&mut message)
        .context("failed to read message from stdin")?;

    let partial = sign(&shard, &message)?;

    std::io::stdout()
        .write_all(&partial)
        .context("failed to write partial signature to stdout")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanimous_partial_signature_has_one_block_length() {
        let n = BigUint::from_be_bytes(&[0x9fu8; 256]);
        let shard = PrivateKeyShard::unanimous(n, BigUint::from(65537u32), BigUint::from_be_bytes(&[0x11u8; 200]));

        let sig = sign(&shard, b"a message").unwrap();
        assert_eq!(sig.len(), 256);
    }

    #[test]
    fn threshold_partial_signature_is_two_block_lengths() {
        let n = BigUint::from_be_bytes(&[0x9fu8; 256]);
        let shard = PrivateKeyShard::threshold(
            n,
            BigUint::from(65537u32),
            BigUint::from_be_bytes(&[0x11u8; 200]),
            BigUint::from_be_bytes(&[0x22u8; 200]),
        );

        let sig = sign(&shard, b"a message").unwrap();
        assert_eq!(sig.len(), 512);
    }

    #[test]
    fn signing_is_deterministic() {
        let n = BigUint::from_be_bytes(&[0x9fu8; 256]);
        let shard = PrivateKeyShard::unanimous(n, BigUint::from(65537u32), BigUint::from_be_bytes(&[0x11u8; 200]));

        let a = sign(&shard, b"same message").unwrap();
        let b = sign(&shard, b"same message").unwrap();
        assert_eq!(a, b);
    }
}
