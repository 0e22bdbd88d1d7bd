//! A deliberately small, hand-rolled DER encoder/decoder.
//!
//! The key codec needs to emit `RSAPrivateKey` structures whose `p`, `q`,
//! and CRT fields are sentinel values rather than values consistent with
//! `n`/`d` — a validating ASN.1 key type (the kind a general-purpose PEM/
//! ASN.1 library normally hands you) would refuse to construct that. Per
//! the design note this spec carries over, the fix is to not go through
//! a validating type at all: an `RSAPrivateKey` is a flat `SEQUENCE` of
//! `INTEGER`s, so this module writes (and, on the read path, parses) that
//! SEQUENCE directly. Everything here is scoped to exactly the handful of
//! shapes this crate needs (PKCS#8 `PrivateKeyInfo`, PKCS#1
//! `RSAPrivateKey`/`RSAPublicKey`, `SubjectPublicKeyInfo`, and a minimal
//! X.509 `Certificate`) — it is not a general ASN.1 implementation.

use math::BigUint;

use crate::errors::*;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_BIT_STRING: u8 = 0x03;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_NULL: u8 = 0x05;
pub const TAG_OBJECT_IDENTIFIER: u8 = 0x06;
pub const TAG_UTF8_STRING: u8 = 0x0c;
pub const TAG_UTC_TIME: u8 = 0x17;
pub const TAG_SEQUENCE: u8 = 0x30;
pub const TAG_SET: u8 = 0x31;

/// The rsaEncryption AlgorithmIdentifier OID, 1.2.840.113549.1.1.1.
pub const OID_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 1];
/// sha256WithRSAEncryption, 1.2.840.113549.1.1.11.
pub const OID_SHA256_WITH_RSA_ENCRYPTION: &[u64] = &[1, 2, 840, 113549, 1, 1, 11];
/// id-at-commonName, 2.5.4.3.
pub const OID_COMMON_NAME: &[u64] = &[2, 5, 4, 3];

// --- Encoding -----------------------------------------------------------

fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }

    let mut be = vec![];
    let mut n = len;
    while n > 0 {
        be.insert(0, (n & 0xff) as u8);
        n >>= 8;
    }

    let mut out = vec![0x80 | (be.len() as u8)];
    out.extend_from_slice(&be);
    out
}

pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend_from_slice(&encode_length(content.len()));
    out.extend_from_slice(content);
    out
}

pub fn sequence(items: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SEQUENCE, &items.concat())
}

pub fn set_of(items: &[Vec<u8>]) -> Vec<u8> {
    tlv(TAG_SET, &items.concat())
}

/// Wraps `content` in an explicit, constructed context tag `[n]`, as used
/// for the X.509 TBSCertificate `version` field.
pub fn explicit(tag_number: u8, content: &[u8]) -> Vec<u8> {
    tlv(0xa0 | tag_number, content)
}

pub fn integer_from_be_bytes(mut bytes: &[u8]) -> Vec<u8> {
    while bytes.len() > 1 && bytes[0] == 0 && bytes[1] < 0x80 {
        bytes = &bytes[1..];
    }

    let mut content = vec![];
    if bytes.is_empty() {
        content.push(0x00);
    } else {
        if bytes[0] & 0x80 != 0 {
            content.push(0x00);
        }
        content.extend_from_slice(bytes);
    }

    tlv(TAG_INTEGER, &content)
}

pub fn integer_from_biguint(v: &BigUint) -> Vec<u8> {
    integer_from_be_bytes(&v.to_be_bytes())
}

pub fn integer_from_u64(v: u64) -> Vec<u8> {
    integer_from_be_bytes(&v.to_be_bytes())
}

pub fn null() -> Vec<u8> {
    tlv(TAG_NULL, &[])
}

pub fn octet_string(data: &[u8]) -> Vec<u8> {
    tlv(TAG_OCTET_STRING, data)
}

pub fn bit_string(data: &[u8]) -> Vec<u8> {
    let mut content = vec![0u8]; // zero unused bits; every value we wrap is byte-aligned.
    content.extend_from_slice(data);
    tlv(TAG_BIT_STRING, &content)
}

pub fn utf8_string(s: &str) -> Vec<u8> {
    tlv(TAG_UTF8_STRING, s.as_bytes())
}

pub fn utc_time(dt: &chrono::DateTime<chrono::Utc>) -> Vec<u8> {
    // YYMMDDHHMMSSZ, per RFC 5280 §4.1.2.5.1.
    let s = dt.format("%y%m%d%H%M%SZ").to_string();
    tlv(TAG_UTC_TIME, s.as_bytes())
}

pub fn object_identifier(arcs: &[u64]) -> Vec<u8> {
    assert!(arcs.len() >= 2);
    let mut content = vec![(arcs[0] * 40 + arcs[1]) as u8];
    for &arc in &arcs[2..] {
        content.extend_from_slice(&encode_base128(arc));
    }
    tlv(TAG_OBJECT_IDENTIFIER, &content)
}

fn encode_base128(mut v: u64) -> Vec<u8> {
    let mut groups = vec![(v & 0x7f) as u8];
    v >>= 7;
    while v > 0 {
        groups.push(0x80 | (v & 0x7f) as u8);
        v >>= 7;
    }
    groups.reverse();
    groups
}

/// `AlgorithmIdentifier{ algorithm, parameters: NULL }`.
pub fn algorithm_identifier_with_null_params(oid: &[u64]) -> Vec<u8> {
    sequence(&[object_identifier(oid), null()])
}

// --- Decoding -------------------------------------------------------------

/// A cursor over a byte slice that reads one DER TLV at a time. Scoped to
/// the fixed shapes this crate emits, not general ASN.1 — e.g. only
/// length forms that actually occur in 2048-bit RSA key material are
/// handled.
pub struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn read_length(&mut self) -> Result<usize> {
        let first = *self.data.get(0).ok_or_else(|| err_msg("truncated DER length"))?;
        self.data = &self.data[1..];

        if first & 0x80 == 0 {
            return Ok(first as usize);
        }

        let num_bytes = (first & 0x7f) as usize;
        if self.data.len() < num_bytes {
            bail!("truncated DER long-form length");
        }

        let mut len = 0usize;
        for &b in &self.data[0..num_bytes] {
            len = (len << 8) | (b as usize);
        }
        self.data = &self.data[num_bytes..];
        Ok(len)
    }

    /// Reads one TLV, returning its tag and content, and advances past it.
    pub fn read_tlv(&mut self) -> Result<(u8, &'a [u8])> {
        let tag = *self.data.get(0).ok_or_else(|| err_msg("truncated DER tag"))?;
        self.data = &self.data[1..];
        let len = self.read_length()?;
        if self.data.len() < len {
            bail!("truncated DER content");
        }
        let content = &self.data[0..len];
        self.data = &self.data[len..];
        Ok((tag, content))
    }

    pub fn expect_tag(&mut self, tag: u8) -> Result<&'a [u8]> {
        let (got, content) = self.read_tlv()?;
        if got != tag {
            bail!("expected DER tag 0x{:02x}, got 0x{:02x}", tag, got);
        }
        Ok(content)
    }

    pub fn expect_sequence(&mut self) -> Result<Reader<'a>> {
        Ok(Reader::new(self.expect_tag(TAG_SEQUENCE)?))
    }

    pub fn expect_integer(&mut self) -> Result<Vec<u8>> {
        let content = self.expect_tag(TAG_INTEGER)?;
        Ok(strip_integer_padding(content))
    }

    pub fn expect_integer_biguint(&mut self) -> Result<BigUint> {
        Ok(BigUint::from_be_bytes(&self.expect_integer()?))
    }

    pub fn expect_octet_string(&mut self) -> Result<&'a [u8]> {
        self.expect_tag(TAG_OCTET_STRING)
    }

    pub fn expect_bit_string(&mut self) -> Result<&'a [u8]> {
        let content = self.expect_tag(TAG_BIT_STRING)?;
        if content.is_empty() {
            bail!("empty BIT STRING");
        }
        if content[0] != 0 {
            bail!("unsupported non-byte-aligned BIT STRING");
        }
        Ok(&content[1..])
    }

    pub fn expect_null(&mut self) -> Result<()> {
        self.expect_tag(TAG_NULL)?;
        Ok(())
    }
}

fn strip_integer_padding(content: &[u8]) -> Vec<u8> {
    let mut bytes = content;
    while bytes.len() > 1 && bytes[0] == 0 {
        bytes = &bytes[1..];
    }
    bytes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_roundtrip_with_high_bit_set() {
        let der = integer_from_be_bytes(&[0xff, 0x01]);
        let mut r = Reader::new(&der);
        let back = r.expect_integer().unwrap();
        assert_eq!(back, vec![0xff, 0x01]);
    }

    #[test]
    fn integer_roundtrip_zero() {
        let der = integer_from_biguint(&BigUint::zero());
        let mut r = Reader::new(&der);
        assert_eq!(r.expect_integer().unwrap(), vec![0x00]);
    }

    #[test]
    fn sequence_roundtrip() {
        let der = sequence(&[integer_from_u64(1), integer_from_u64(65537)]);
        let mut r = Reader::new(&der);
        let mut seq = r.expect_sequence().unwrap();
        assert_eq!(seq.expect_integer().unwrap(), vec![1]);
        assert_eq!(seq.expect_integer().unwrap(), vec![0x01, 0x00, 0x01]);
        assert!(seq.is_empty());
    }

    #[test]
    fn oid_matches_known_encoding() {
        // rsaEncryption, widely published DER: 06 09 2A 86 48 86 F7 0D 01 01 01
        let der = object_identifier(OID_RSA_ENCRYPTION);
        assert_eq!(
            der,
            vec![0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01]
        );
    }
}
