//! Public keys and private-key shards.
//!
//! A shard's `RSAPrivateKey` carries the same nine PKCS#1 fields a normal
//! private key would (`version, n, e, d, p, q, dP, dQ, qInv`), but no
//! single shard holds a usable key on its own:
//!
//! * an **unanimous** shard stores its additive share of `d` in the `d`
//!   field and leaves `p`, `q`, `dP`, `dQ`, `qInv` as zero sentinels —
//!   nothing here is prime, so a library that checks `p * q == n` would
//!   refuse to load it. That's why this codec talks to `RSAPrivateKey` as
//!   a flat SEQUENCE (see `der.rs`) rather than through such a type.
//! * a **threshold** shard instead puts the sentinel [`MAGIC`] exponent in
//!   the `d` field, and stashes its additive half of the reconstructed
//!   `p`-path/`q`-path exponent in the `p`/`q` fields — those slots would
//!   otherwise just be more zero sentinels, so re-using them avoids adding
//!   a fourth and fifth field nothing else needs.
//!
//! `d == MAGIC` is exactly how [`PrivateKeyShard::is_threshold`]
//! distinguishes the two shapes on load.

use std::fs;
use std::path::Path;

use math::BigUint;

use crate::der;
use crate::errors::*;
use crate::pem;

/// Sentinel value written to a threshold shard's `d` field. Re-splitting
/// probes a reconstructed exponent against this value (see
/// `threshold.rs`) to tell `p0 + q1` apart from `q0 + p1`.
pub const MAGIC: u64 = 0x2323_2323_2323_2323;

pub fn magic() -> BigUint {
    BigUint::from(MAGIC)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

impl PublicKey {
    pub fn new(n: BigUint, e: BigUint) -> Self {
        Self { n, e }
    }

    /// Size in bytes of an RSA signature block under this modulus (`k` in
    /// RFC 8017's notation). This codec only ever deals in 2048-bit keys.
    pub fn block_len(&self) -> usize {
        (self.n.value_bits() + 7) / 8
    }

    fn rsa_public_key_der(&self) -> Vec<u8> {
        der::sequence(&[
            der::integer_from_biguint(&self.n),
            der::integer_from_biguint(&self.e),
        ])
    }

    pub fn to_der(&self) -> Vec<u8> {
        der::sequence(&[
            der::algorithm_identifier_with_null_params(der::OID_RSA_ENCRYPTION),
            der::bit_string(&self.rsa_public_key_der()),
        ])
    }

    pub fn from_der(data: &[u8]) -> Result<Self> {
        let mut top = der::Reader::new(data);
        let mut spki = top.expect_sequence().context("SubjectPublicKeyInfo")?;

        let mut algo = spki.expect_sequence().context("AlgorithmIdentifier")?;
        algo.read_tlv().context("algorithm OID")?;
        let _ = algo.read_tlv(); // optional NULL parameters

        let bits = spki.expect_bit_string().context("subjectPublicKey")?;
        let mut inner = der::Reader::new(bits).expect_sequence().context("RSAPublicKey")?;
        let n = inner.expect_integer_biguint().context("modulus")?;
        let e = inner.expect_integer_biguint().context("publicExponent")?;

        Ok(Self { n, e })
    }

    pub fn to_pem(&self) -> String {
        pem::encode(pem::PUBLIC_KEY_LABEL, &self.to_der())
    }

    pub fn from_pem(text: &str) -> Result<Self> {
        Self::from_der(&pem::decode(pem::PUBLIC_KEY_LABEL, text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_pem()).context("failed to write public key")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read public key at {}", path.as_ref().display()))?;
        Self::from_pem(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyShard {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

impl PrivateKeyShard {
    pub fn unanimous(n: BigUint, e: BigUint, d_share: BigUint) -> Self {
        Self {
            n,
            e,
            d: d_share,
            p: BigUint::one(),
            q: BigUint::one(),
        }
    }

    pub fn threshold(n: BigUint, e: BigUint, p_half: BigUint, q_half: BigUint) -> Self {
        Self {
            n,
            e,
            d: magic(),
            p: p_half,
            q: q_half,
        }
    }

    pub fn is_threshold(&self) -> bool {
        self.d == magic()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(self.n.clone(), self.e.clone())
    }

    fn rsa_private_key_der(&self) -> Vec<u8> {
        der::sequence(&[
            der::integer_from_u64(0), // version
            der::integer_from_biguint(&self.n),
            der::integer_from_biguint(&self.e),
            der::integer_from_biguint(&self.d),
            der::integer_from_biguint(&self.p),
            der::integer_from_biguint(&self.q),
            der::integer_from_u64(0), // dP, always a sentinel in a shard
            der::integer_from_u64(0), // dQ, always a sentinel in a shard
            der::integer_from_u64(0), // qInv, always a sentinel in a shard
        ])
    }

    pub fn to_der(&self) -> Vec<u8> {
        der::sequence(&[
            der::integer_from_u64(0), // version
            der::algorithm_identifier_with_null_params(der::OID_RSA_ENCRYPTION),
            der::octet_string(&self.rsa_private_key_der()),
        ])
    }

    pub fn from_der(data: &[u8]) -> Result<Self> {
        let mut top = der::Reader::new(data);
        let mut info = top.expect_sequence().context("PrivateKeyInfo")?;
        info.read_tlv().context("version")?;

        let mut algo = info.expect_sequence().context("AlgorithmIdentifier")?;
        algo.read_tlv().context("algorithm OID")?;
        let _ = algo.read_tlv();

        let key_bytes = info.expect_octet_string().context("privateKey")?;
        let mut inner = der::Reader::new(key_bytes)
            .expect_sequence()
            .context("RSAPrivateKey")?;

        inner.read_tlv().context("version")?;
        let n = inner.expect_integer_biguint().context("modulus")?;
        let e = inner.expect_integer_biguint().context("publicExponent")?;
        let d = inner.expect_integer_biguint().context("privateExponent")?;
        let p = inner.expect_integer_biguint().context("prime1")?;
        let q = inner.expect_integer_biguint().context("prime2")?;
        // dP, dQ, qInv are sentinel zeros in every shard this codec reads.

        Ok(Self { n, e, d, p, q })
    }

    pub fn to_pem(&self) -> String {
        pem::encode(pem::PRIVATE_KEY_LABEL, &self.to_der())
    }

    pub fn from_pem(text: &str) -> Result<Self> {
        Self::from_der(&pem::decode(pem::PRIVATE_KEY_LABEL, text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_pem()).context("failed to write private key shard")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read key shard at {}", path.as_ref().display()))?;
        Self::from_pem(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_public_key() -> PublicKey {
        PublicKey::new(BigUint::from(3233u32), BigUint::from(17u32))
    }

    #[test]
    fn public_key_roundtrips_through_pem() {
        let pk = toy_public_key();
        let pem_text = pk.to_pem();
        assert!(pem_text.contains("BEGIN PUBLIC KEY"));
        let back = PublicKey::from_pem(&pem_text).unwrap();
        assert_eq!(pk, back);
    }

    #[test]
    fn unanimous_shard_roundtrips_and_is_not_threshold() {
        let shard = PrivateKeyShard::unanimous(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(413u32),
        );
        let back = PrivateKeyShard::from_pem(&shard.to_pem()).unwrap();
        assert_eq!(shard, back);
        assert!(!back.is_threshold());
    }

    #[test]
    fn threshold_shard_roundtrips_and_is_threshold() {
        let shard = PrivateKeyShard::threshold(
            BigUint::from(3233u32),
            BigUint::from(17u32),
            BigUint::from(101u32),
            BigUint::from(202u32),
        );
        let back = PrivateKeyShard::from_pem(&shard.to_pem()).unwrap();
        assert_eq!(shard, back);
        assert!(back.is_threshold());
        assert_eq!(back.p, BigUint::from(101u32));
        assert_eq!(back.q, BigUint::from(202u32));
    }
}
