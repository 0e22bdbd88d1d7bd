use zeroize::Zeroize;

use crate::big::uint::BigUint;

/// Wraps a `BigUint` that must not outlive its usefulness: the full RSA
/// private exponent `d` (and each additive share `d_i` before it is
/// folded into its shard's serialized form) is held only on the stack of
/// the dealer/re-splitter and is zeroized on drop.
///
/// This does not protect against anything beyond accidental retention —
/// it's the integer analog of the `secrecy`-style wrapper pattern, not a
/// defense against a hostile co-resident process.
pub struct Secret(BigUint);

impl Secret {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn expose_secret(&self) -> &BigUint {
        &self.0
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.value.zeroize();
    }
}
