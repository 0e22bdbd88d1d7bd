//! PEM armor.
//!
//! Textbook PEM encoding is a parser-combinator exercise in its own right,
//! built on a hand-rolled grammar. That machinery doesn't travel well
//! outside the codebase that hosts it, so this wraps the `pem` crate
//! instead, keeping only familiar label-constant naming.

use crate::errors::*;

pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
pub const CERTIFICATE_LABEL: &str = "CERTIFICATE";

pub fn encode(label: &str, der: &[u8]) -> String {
    let p = pem::Pem {
        tag: label.to_string(),
        contents: der.to_vec(),
    };
    pem::encode(&p)
}

pub fn decode(label: &str, text: &str) -> Result<Vec<u8>> {
    let p = pem::parse(text).context("failed to parse PEM armor")?;
    if p.tag != label {
        bail!("expected PEM label '{}', found '{}'", label, p.tag);
    }
    Ok(p.contents)
}
