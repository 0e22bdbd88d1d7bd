//! Self-signed X.509 certificates.
//!
//! Every cooperative key needs something `openssl dgst -verify` (or any
//! other consumer) can load as the public half — a bare SubjectPublicKeyInfo
//! works for that, but a certificate is what downstream tooling usually
//! expects, so `genkey`/`threshold` mint one self-signed certificate per
//! key rather than just a raw public key. The certificate never needs to
//! chain anywhere: issuer and subject are both `CN=cosign.dev`.

use chrono::{Duration, Utc};

use math::{BigUint, Secret};

use crate::der;
use crate::errors::*;
use crate::keys::PublicKey;
use crate::pem;
use crate::pkcs1;

const COMMON_NAME: &str = "cosign.dev";
const VALIDITY_DAYS: i64 = 365;

fn name_der() -> Vec<u8> {
    // RDNSequence with a single RelativeDistinguishedName{ commonName }.
    der::sequence(&[der::set_of(&[der::sequence(&[
        der::object_identifier(der::OID_COMMON_NAME),
        der::utf8_string(COMMON_NAME),
    ])])])
}

fn serial_number() -> BigUint {
    let mut bytes = [0u8; 8];
    math::random::fill_random(&mut bytes);
    bytes[0] &= 0x7f; // keep the DER INTEGER encoding positive without extra padding.
    BigUint::from_be_bytes(&bytes)
}

/// Builds and signs a self-signed certificate for `public_key`, using the
/// matching full private exponent `d`. `d` is expected to exist only for
/// the lifetime of key generation — this is the one place it's used whole.
pub fn self_signed_certificate(public_key: &PublicKey, d: &Secret) -> Result<Vec<u8>> {
    let now = Utc::now();
    let not_after = now + Duration::days(VALIDITY_DAYS);

    let tbs = der::sequence(&[
        der::explicit(0, &der::integer_from_u64(2)), // version 3 (value 2)
        der::integer_from_biguint(&serial_number()),
        der::algorithm_identifier_with_null_params(der::OID_SHA256_WITH_RSA_ENCRYPTION),
        name_der(), // issuer
        der::sequence(&[der::utc_time(&now), der::utc_time(&not_after)]), // validity
        name_der(), // subject
        der::sequence(&[
            der::algorithm_identifier_with_null_params(der::OID_RSA_ENCRYPTION),
            der::bit_string(&der::sequence(&[
                der::integer_from_biguint(&public_key.n),
                der::integer_from_biguint(&public_key.e),
            ])),
        ]), // subjectPublicKeyInfo
    ]);

    let em = pkcs1::emsa_pkcs1_v1_5_encode(&tbs, public_key.block_len())?;
    let m = BigUint::from_be_bytes(&em);
    let signature = math::Modulo::new(&public_key.n).pow(&m, d.expose_secret());
    let signature_bytes = signature.to_be_bytes_padded(public_key.block_len());

    Ok(der::sequence(&[
        tbs,
        der::algorithm_identifier_with_null_params(der::OID_SHA256_WITH_RSA_ENCRYPTION),
        der::bit_string(&signature_bytes),
    ]))
}

pub fn self_signed_certificate_pem(public_key: &PublicKey, d: &Secret) -> Result<String> {
    Ok(pem::encode(
        pem::CERTIFICATE_LABEL,
        &self_signed_certificate(public_key, d)?,
    ))
}
