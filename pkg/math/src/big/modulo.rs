use crate::big::uint::BigUint;

/// A set of operations which all produce a result reduced `mod n`.
pub struct Modulo<'a> {
    pub n: &'a BigUint,
}

impl<'a> Modulo<'a> {
    pub fn new(n: &'a BigUint) -> Self {
        Modulo { n }
    }

    pub fn rem(&self, a: &BigUint) -> BigUint {
        a.quorem(self.n).1
    }

    pub fn mul(&self, a: &BigUint, b: &BigUint) -> BigUint {
        self.rem(&(a * b))
    }

    /// Computes `a^b mod n` by left-to-right repeated squaring.
    ///
    /// This is the one operation the whole cooperative-signing core
    /// funnels through: partial signing raises a message to a share
    /// exponent, and the merger's disambiguation probe raises a
    /// candidate product to the public exponent. Not constant time —
    /// side-channel resistance is an explicit non-goal here.
    pub fn pow(&self, a: &BigUint, b: &BigUint) -> BigUint {
        if b.is_zero() {
            return BigUint::from(1u32);
        }

        let base = self.rem(a);
        let mut out = BigUint::from(1u32);
        let mut p = base;
        for i in 0..b.value_bits() {
            if b.bit(i) == 1 {
                out = self.mul(&out, &p);
            }
            p = self.mul(&p, &p);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_matches_repeated_multiplication() {
        let n = BigUint::from(143u32); // 11 * 13
        let m = Modulo::new(&n);

        let base = BigUint::from(7u32);
        let exp = BigUint::from(5u32);

        let got = m.pow(&base, &exp);

        let mut want = BigUint::from(1u32);
        for _ in 0..5 {
            want = m.mul(&want, &base);
        }

        assert_eq!(got, want);
    }

    #[test]
    fn pow_zero_exponent_is_one() {
        let n = BigUint::from(97u32);
        let m = Modulo::new(&n);
        assert_eq!(m.pow(&BigUint::from(42u32), &BigUint::zero()), BigUint::from(1u32));
    }
}
