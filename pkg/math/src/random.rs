//! Adapter between the OS CSPRNG and `BigUint`. The randomness source
//! itself is treated as an external collaborator (see spec §1) — this
//! module only shapes raw random bytes into the integers the sharing
//! scheme needs.

use rand::RngCore;

use crate::big::uint::BigUint;

/// Draws a uniformly random integer in `[0, 2^(8*num_bytes))` by filling
/// `num_bytes` random bytes and interpreting them as a big-endian
/// integer.
pub fn uniform_below_2_pow_bytes(num_bytes: usize) -> BigUint {
    let mut buf = vec![0u8; num_bytes];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    BigUint::from_be_bytes(&buf)
}

/// Fills `buf` with cryptographically secure random bytes.
pub fn fill_random(buf: &mut [u8]) {
    rand::rngs::OsRng.fill_bytes(buf);
}

/// Draws a uniformly random integer in `[0, bound)` by rejection sampling:
/// redraw `bound`'s byte width at a time until the result fits. Uniform
/// and unbiased, at the cost of an unbounded (but fast-converging, at
/// worst ~50% rejection per draw) number of attempts.
pub fn uniform_below(bound: &BigUint) -> BigUint {
    assert!(!bound.is_zero(), "uniform_below of an empty range");
    let num_bytes = bound.min_bytes();
    loop {
        let candidate = uniform_below_2_pow_bytes(num_bytes);
        if &candidate < bound {
            return candidate;
        }
    }
}
