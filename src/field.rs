//! The secp256k1 base field.
//!
//! `FieldElement` implements arithmetic modulo p = 2^256 - 2^32 - 977.
//! Values are held over four 64-bit limbs; the internal representation
//! is any integer in the 0..2^256-1 range, i.e. an element may have two
//! representations (x and x + p, when the latter fits). Functions that
//! produce externally visible values (encoding, comparisons, parity)
//! always normalize first.
//!
//! All functions are constant-time unless documented otherwise. Boolean
//! results use the `u32` mask convention (0xFFFFFFFF for "true",
//! 0x00000000 for "false").
//!
//! Encoding is unsigned **big-endian** over exactly 32 bytes, which is
//! the convention used by SEC 1 and by all secp256k1 wire formats.

use zeroize::Zeroize;

use crate::backend::{addcarry_u64, subborrow_u64, umull, umull_add2,
    mul256x256, limbs_from_be, limbs_to_be, impl_arith_ops};
use crate::{Error, Vec};

/// An element of the secp256k1 base field.
#[derive(Clone, Copy, Debug)]
pub struct FieldElement(pub(crate) [u64; 4]);

impl FieldElement {

    // Modulus is p = 2^256 - 2^32 - 977
    const T256_MINUS_P: u64 = 0x1000003D1;
    const MOD0: u64 = 0xFFFFFFFEFFFFFC2F;

    pub const ZERO: Self = Self([ 0, 0, 0, 0 ]);
    pub const ONE: Self = Self([ 1, 0, 0, 0 ]);
    pub const MINUS_ONE: Self = Self([
        Self::MOD0 - 1,
        0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF,
        0xFFFFFFFFFFFFFFFF,
    ]);

    /// Creates an element from four 64-bit limbs (low-to-high order).
    /// The value is implicitly reduced modulo p.
    pub const fn w64le(x0: u64, x1: u64, x2: u64, x3: u64) -> Self {
        Self([ x0, x1, x2, x3 ])
    }

    /// Creates an element from four 64-bit limbs (high-to-low order).
    /// The value is implicitly reduced modulo p.
    pub const fn w64be(x3: u64, x2: u64, x1: u64, x0: u64) -> Self {
        Self([ x0, x1, x2, x3 ])
    }

    #[inline(always)]
    pub fn from_u32(x: u32) -> Self {
        Self([ x as u64, 0, 0, 0 ])
    }

    #[inline(always)]
    pub fn from_u64(x: u64) -> Self {
        Self([ x, 0, 0, 0 ])
    }

    #[inline]
    fn set_add(&mut self, rhs: &Self) {
        let (d0, cc) = addcarry_u64(self.0[0], rhs.0[0], 0);
        let (d1, cc) = addcarry_u64(self.0[1], rhs.0[1], cc);
        let (d2, cc) = addcarry_u64(self.0[2], rhs.0[2], cc);
        let (d3, cc) = addcarry_u64(self.0[3], rhs.0[3], cc);

        // An output carry is 2^256 = 2^256 - p (mod p); fold it back.
        let (d0, cc) = addcarry_u64(d0,
            (cc as u64).wrapping_neg() & Self::T256_MINUS_P, 0);
        let (d1, cc) = addcarry_u64(d1, 0, cc);
        let (d2, cc) = addcarry_u64(d2, 0, cc);
        let (d3, cc) = addcarry_u64(d3, 0, cc);

        // A second carry implies that the low limbs are now tiny, thus
        // this last fold cannot propagate.
        let w = (cc as u64).wrapping_neg();
        self.0 = [ d0.wrapping_add(w & Self::T256_MINUS_P), d1, d2, d3 ];
    }

    #[inline]
    fn set_sub(&mut self, rhs: &Self) {
        let (d0, cc) = subborrow_u64(self.0[0], rhs.0[0], 0);
        let (d1, cc) = subborrow_u64(self.0[1], rhs.0[1], cc);
        let (d2, cc) = subborrow_u64(self.0[2], rhs.0[2], cc);
        let (d3, cc) = subborrow_u64(self.0[3], rhs.0[3], cc);

        // A borrow means we computed x - y + 2^256; subtract 2^256 - p.
        let (d0, cc) = subborrow_u64(d0,
            (cc as u64).wrapping_neg() & Self::T256_MINUS_P, 0);
        let (d1, cc) = subborrow_u64(d1, 0, cc);
        let (d2, cc) = subborrow_u64(d2, 0, cc);
        let (d3, cc) = subborrow_u64(d3, 0, cc);

        let w = (cc as u64).wrapping_neg();
        self.0 = [ d0.wrapping_sub(w & Self::T256_MINUS_P), d1, d2, d3 ];
    }

    /// Negates this value (in place).
    #[inline]
    pub fn set_neg(&mut self) {
        let (d0, cc) = subborrow_u64(Self::MOD0, self.0[0], 0);
        let (d1, cc) = subborrow_u64(0xFFFFFFFFFFFFFFFF, self.0[1], cc);
        let (d2, cc) = subborrow_u64(0xFFFFFFFFFFFFFFFF, self.0[2], cc);
        let (d3, cc) = subborrow_u64(0xFFFFFFFFFFFFFFFF, self.0[3], cc);

        // Input was in p..2^256-1: the result is negative, add back p.
        let e = (cc as u64).wrapping_neg();
        let (d0, cc) = subborrow_u64(d0, e & Self::T256_MINUS_P, 0);
        let (d1, cc) = subborrow_u64(d1, 0, cc);
        let (d2, cc) = subborrow_u64(d2, 0, cc);
        let (d3, _)  = subborrow_u64(d3, 0, cc);

        self.0 = [ d0, d1, d2, d3 ];
    }

    /// Conditionally copies `a` into `self` (if `ctl` = 0xFFFFFFFF);
    /// `self` is unchanged if `ctl` = 0x00000000.
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..4 {
            self.0[i] ^= cw & (self.0[i] ^ a.0[i]);
        }
    }

    /// Returns `a0` (if `ctl` = 0x00000000) or `a1` (if `ctl` =
    /// 0xFFFFFFFF).
    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    /// Exchanges `a` and `b` if `ctl` = 0xFFFFFFFF.
    #[inline]
    pub fn cswap(a: &mut Self, b: &mut Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..4 {
            let t = cw & (a.0[i] ^ b.0[i]);
            a.0[i] ^= t;
            b.0[i] ^= t;
        }
    }

    /// Conditionally negates this value (if `ctl` = 0xFFFFFFFF).
    #[inline]
    pub fn set_condneg(&mut self, ctl: u32) {
        let n = -*self;
        self.set_cond(&n, ctl);
    }

    /// Multiplies this value by a small integer (in place).
    #[inline]
    pub fn set_mul_small(&mut self, x: u32) {
        let x = x as u64;
        let (d0, h) = umull(self.0[0], x);
        let (d1, h) = umull_add2(self.0[1], x, h, 0);
        let (d2, h) = umull_add2(self.0[2], x, h, 0);
        let (d3, h) = umull_add2(self.0[3], x, h, 0);

        // h < 2^32, thus h*(2^256 - p) < 2^65.
        let (lo, hi) = umull(h, Self::T256_MINUS_P);
        let (d0, cc) = addcarry_u64(d0, lo, 0);
        let (d1, cc) = addcarry_u64(d1, hi, cc);
        let (d2, cc) = addcarry_u64(d2, 0, cc);
        let (d3, cc) = addcarry_u64(d3, 0, cc);

        let w = (cc as u64).wrapping_neg();
        let (d0, cc) = addcarry_u64(d0, w & Self::T256_MINUS_P, 0);
        let (d1, cc) = addcarry_u64(d1, 0, cc);
        let (d2, cc) = addcarry_u64(d2, 0, cc);
        let (d3, _)  = addcarry_u64(d3, 0, cc);

        self.0 = [ d0, d1, d2, d3 ];
    }

    #[inline(always)]
    pub fn mul_small(self, x: u32) -> Self {
        let mut r = self;
        r.set_mul_small(x);
        r
    }

    #[inline(always)]
    pub fn mul2(self) -> Self {
        self + self
    }

    #[inline(always)]
    pub fn mul3(self) -> Self {
        self.mul_small(3)
    }

    #[inline(always)]
    pub fn mul8(self) -> Self {
        self.mul_small(8)
    }

    /// Multiplies by 21 = 3*b (with b = 7 the curve constant).
    #[inline(always)]
    pub fn mul21(self) -> Self {
        self.mul_small(21)
    }

    // Reduces a 512-bit integer (low-to-high limbs) into four limbs.
    // Output is not necessarily normalized.
    #[inline]
    fn reduce512(e: &[u64; 8]) -> [u64; 4] {
        // First fold: e[0..4] + e[4..8]*(2^256 - p), top word < 2^34.
        let mut d = [0u64; 4];
        let mut h = 0u64;
        for i in 0..4 {
            let (lo, hi) = umull_add2(e[i + 4], Self::T256_MINUS_P, e[i], h);
            d[i] = lo;
            h = hi;
        }

        // Second fold: h*(2^256 - p) < 2^67.
        let (lo, hi) = umull(h, Self::T256_MINUS_P);
        let (d0, cc) = addcarry_u64(d[0], lo, 0);
        let (d1, cc) = addcarry_u64(d[1], hi, cc);
        let (d2, cc) = addcarry_u64(d[2], 0, cc);
        let (d3, cc) = addcarry_u64(d[3], 0, cc);

        // Final carry: low limbs are below 2^67, no further overflow.
        let w = (cc as u64).wrapping_neg();
        let (d0, cc) = addcarry_u64(d0, w & Self::T256_MINUS_P, 0);
        let (d1, cc) = addcarry_u64(d1, 0, cc);
        let (d2, cc) = addcarry_u64(d2, 0, cc);
        let (d3, _)  = addcarry_u64(d3, 0, cc);
        [ d0, d1, d2, d3 ]
    }

    #[inline]
    fn set_mul(&mut self, rhs: &Self) {
        self.0 = Self::reduce512(&mul256x256(&self.0, &rhs.0));
    }

    /// Squares this value (in place).
    #[inline]
    pub fn set_square(&mut self) {
        self.0 = Self::reduce512(&mul256x256(&self.0, &self.0));
    }

    #[inline(always)]
    pub fn square(self) -> Self {
        let mut r = self;
        r.set_square();
        r
    }

    /// Squares this value `n` times.
    #[inline]
    pub fn xsquare(self, n: u32) -> Self {
        let mut r = self;
        for _ in 0..n {
            r.set_square();
        }
        r
    }

    // Ensures that the internal representation is in the 0..p-1 range.
    #[inline]
    pub(crate) fn set_normalized(&mut self) {
        // Adding 2^256 - p overflows if and only if the value is >= p.
        let (_, cc) = addcarry_u64(self.0[0], Self::T256_MINUS_P, 0);
        let (_, cc) = addcarry_u64(self.0[1], 0, cc);
        let (_, cc) = addcarry_u64(self.0[2], 0, cc);
        let (_, cc) = addcarry_u64(self.0[3], 0, cc);

        let w = (cc as u64).wrapping_neg();
        let (d0, cc) = addcarry_u64(self.0[0], w & Self::T256_MINUS_P, 0);
        let (d1, cc) = addcarry_u64(self.0[1], 0, cc);
        let (d2, cc) = addcarry_u64(self.0[2], 0, cc);
        let (d3, _)  = addcarry_u64(self.0[3], 0, cc);

        self.0 = [ d0, d1, d2, d3 ];
    }

    // Common prefix of the exponentiations for inversion and square
    // root: both exponents start with 223 ones followed by a zero and
    // 22 ones. Returned values are x^(2^k - 1) for k = 2, 22 and 223.
    fn pow_chain(self) -> (Self, Self, Self) {
        let x = self;
        let x2 = x.square() * x;
        let x3 = x2.square() * x;
        let x6 = x3.xsquare(3) * x3;
        let x9 = x6.xsquare(3) * x3;
        let x11 = x9.xsquare(2) * x2;
        let x22 = x11.xsquare(11) * x11;
        let x44 = x22.xsquare(22) * x22;
        let x88 = x44.xsquare(44) * x44;
        let x176 = x88.xsquare(88) * x88;
        let x220 = x176.xsquare(44) * x44;
        let x223 = x220.xsquare(3) * x3;
        (x2, x22, x223)
    }

    /// Returns the inverse of this value, computed as x^(p-2).
    ///
    /// The inverse of zero is zero; callers that may hold a zero must
    /// check for it themselves.
    pub fn invert(self) -> Self {
        // p - 2 = [223 ones] 0 [22 ones] 0000101101
        let (x2, x22, x223) = self.pow_chain();
        let t = (x223.xsquare(23) * x22).xsquare(5) * self;
        let t = t.xsquare(3) * x2;
        t.xsquare(2) * self
    }

    #[inline]
    fn set_div(&mut self, rhs: &Self) {
        let d = rhs.invert();
        self.set_mul(&d);
    }

    /// Computes a square root of this value.
    ///
    /// Returned values are (y, r). If this value is a quadratic residue,
    /// then y is the square root whose least significant bit is 0 (the
    /// "even" root, as used by X-only keys) and r = 0xFFFFFFFF.
    /// Otherwise, y is zero and r = 0.
    pub fn sqrt(self) -> (Self, u32) {
        // p = 3 mod 4, so a root candidate is x^((p+1)/4), with
        // (p+1)/4 = [223 ones] 0 [22 ones] 00001100
        let (x2, x22, x223) = self.pow_chain();
        let mut y = ((x223.xsquare(23) * x22).xsquare(6) * x2).xsquare(2);

        y.set_normalized();
        y.set_condneg(((y.0[0] as u32) & 1).wrapping_neg());

        let r = y.square().equals(self);
        y.set_cond(&Self::ZERO, !r);
        (y, r)
    }

    /// Returns 0xFFFFFFFF if this value (normalized) is odd, 0 otherwise.
    #[inline]
    pub fn is_odd(self) -> u32 {
        let mut r = self;
        r.set_normalized();
        ((r.0[0] as u32) & 1).wrapping_neg()
    }

    /// Equality check (0xFFFFFFFF on equality, 0 otherwise).
    #[inline(always)]
    pub fn equals(self, rhs: Self) -> u32 {
        (self - rhs).iszero()
    }

    /// Returns 0xFFFFFFFF if this value is zero, 0 otherwise.
    #[inline]
    pub fn iszero(self) -> u32 {
        // The two possible representations of 0 are 0 and p.
        let [a0, a1, a2, a3] = self.0;
        let t0 = a0 | a1 | a2 | a3;
        let t1 = (a0 ^ Self::MOD0) | !a1 | !a2 | !a3;

        // Top bit of r is 0 if and only if one of t0 or t1 is zero.
        let r = (t0 | t0.wrapping_neg()) & (t1 | t1.wrapping_neg());
        ((r >> 63) as u32).wrapping_sub(1)
    }

    /// Encodes this value over 32 bytes (canonical, big-endian).
    #[inline]
    pub fn encode32(self) -> [u8; 32] {
        let mut r = self;
        r.set_normalized();
        limbs_to_be(&r.0)
    }

    /// Decodes an element from 32 bytes (big-endian).
    ///
    /// Returns (x, 0xFFFFFFFF) on success. If the encoded integer is not
    /// lower than p, then (0, 0) is returned.
    #[inline]
    pub fn decode32(buf: &[u8; 32]) -> (Self, u32) {
        let mut r = Self(limbs_from_be(buf));

        // Subtracting p yields a borrow only for canonical values.
        let (_, cc) = subborrow_u64(r.0[0], Self::MOD0, 0);
        let (_, cc) = subborrow_u64(r.0[1], 0xFFFFFFFFFFFFFFFF, cc);
        let (_, cc) = subborrow_u64(r.0[2], 0xFFFFFFFFFFFFFFFF, cc);
        let (_, cc) = subborrow_u64(r.0[3], 0xFFFFFFFFFFFFFFFF, cc);

        let m = (cc as u64).wrapping_neg();
        for i in 0..4 {
            r.0[i] &= m;
        }
        (r, m as u32)
    }

    /// Decodes an element from bytes; the slice must have length exactly
    /// 32 and hold a canonical big-endian value (lower than p).
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let buf: &[u8; 32] = buf.try_into()
            .map_err(|_| Error::InvalidFieldElement)?;
        let (r, cc) = Self::decode32(buf);
        if cc != 0 {
            Ok(r)
        } else {
            Err(Error::InvalidFieldElement)
        }
    }

    /// Interprets 32 bytes as a big-endian integer, reduced modulo p.
    #[inline]
    pub fn decode_reduce(buf: &[u8; 32]) -> Self {
        let mut r = Self(limbs_from_be(buf));
        r.set_normalized();
        r
    }

    /// Inverts all elements of the slice in place, with a single field
    /// inversion (Montgomery's trick). Zeros are left unchanged.
    pub fn batch_invert(xx: &mut [Self]) {
        let n = xx.len();
        if n == 0 {
            return;
        }

        // tt[j] = product of xx[0..=j], with zeros replaced by ones.
        let mut tt: Vec<Self> = Vec::with_capacity(n);
        let mut acc = Self::ONE;
        for x in xx.iter() {
            let mut y = *x;
            y.set_cond(&Self::ONE, x.iszero());
            acc *= y;
            tt.push(acc);
        }

        let mut k = tt[n - 1].invert();
        for j in (0..n).rev() {
            let mut x = xx[j];
            let zz = x.iszero();
            x.set_cond(&Self::ONE, zz);
            let inv = if j > 0 { k * tt[j - 1] } else { k };
            xx[j].set_cond(&inv, !zz);
            k *= x;
        }
    }
}

impl Zeroize for FieldElement {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl_arith_ops!(FieldElement);
