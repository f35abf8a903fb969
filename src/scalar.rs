//! Integers modulo the secp256k1 group order.
//!
//! `Scalar` implements arithmetic modulo the prime
//! n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141.
//! Unlike field elements, scalars are always kept in canonical form
//! (0..n-1), so that equality and range tests are plain limb compares.
//!
//! Scalars are used for private keys, nonces and signature components.
//! All operations are constant-time. Scalars can be wiped with
//! `Zeroize::zeroize()`; containers of secret scalars in this crate do
//! so when dropped.

use zeroize::Zeroize;

use crate::backend::{addcarry_u64, subborrow_u64, umull_add2,
    mul256x256, limbs_from_be, limbs_to_be, nonzero_mask, impl_arith_ops};
use crate::Error;

/// An integer modulo n (the curve order).
#[derive(Clone, Copy, Debug)]
pub struct Scalar(pub(crate) [u64; 4]);

impl Scalar {

    // The group order n, low-to-high limbs.
    const N: [u64; 4] = [
        0xBFD25E8CD0364141, 0xBAAEDCE6AF48A03B,
        0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
    ];

    // 2^256 - n (129 bits).
    const NC: [u64; 3] = [ 0x402DA1732FC9BEBF, 0x4551231950B75FC4, 1 ];

    // floor(n/2)
    const HALF_N: [u64; 4] = [
        0xDFE92F46681B20A0, 0x5D576E7357A4501D,
        0xFFFFFFFFFFFFFFFF, 0x7FFFFFFFFFFFFFFF,
    ];

    pub const ZERO: Self = Self([ 0, 0, 0, 0 ]);
    pub const ONE: Self = Self([ 1, 0, 0, 0 ]);
    pub const MINUS_ONE: Self = Self([
        0xBFD25E8CD0364140, 0xBAAEDCE6AF48A03B,
        0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
    ]);

    /// Creates a scalar from four 64-bit limbs (high-to-low order).
    /// The value MUST be lower than n.
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

    // Subtracts n if the 257-bit value (d, carry) is at least n.
    #[inline]
    fn reduce_once(d: [u64; 4], carry: u8) -> [u64; 4] {
        let (t0, cc) = subborrow_u64(d[0], Self::N[0], 0);
        let (t1, cc) = subborrow_u64(d[1], Self::N[1], cc);
        let (t2, cc) = subborrow_u64(d[2], Self::N[2], cc);
        let (t3, cc) = subborrow_u64(d[3], Self::N[3], cc);

        // Keep the subtracted value unless it borrowed without an
        // incoming carry.
        let (_, keep) = subborrow_u64(carry as u64, 0, cc);
        let m = (keep as u64).wrapping_sub(1);
        [
            d[0] ^ (m & (d[0] ^ t0)),
            d[1] ^ (m & (d[1] ^ t1)),
            d[2] ^ (m & (d[2] ^ t2)),
            d[3] ^ (m & (d[3] ^ t3)),
        ]
    }

    #[inline]
    fn set_add(&mut self, rhs: &Self) {
        let (d0, cc) = addcarry_u64(self.0[0], rhs.0[0], 0);
        let (d1, cc) = addcarry_u64(self.0[1], rhs.0[1], cc);
        let (d2, cc) = addcarry_u64(self.0[2], rhs.0[2], cc);
        let (d3, cc) = addcarry_u64(self.0[3], rhs.0[3], cc);
        self.0 = Self::reduce_once([ d0, d1, d2, d3 ], cc);
    }

    #[inline]
    fn set_sub(&mut self, rhs: &Self) {
        let (d0, cc) = subborrow_u64(self.0[0], rhs.0[0], 0);
        let (d1, cc) = subborrow_u64(self.0[1], rhs.0[1], cc);
        let (d2, cc) = subborrow_u64(self.0[2], rhs.0[2], cc);
        let (d3, cc) = subborrow_u64(self.0[3], rhs.0[3], cc);

        // On borrow, add back n.
        let m = (cc as u64).wrapping_neg();
        let (d0, cc) = addcarry_u64(d0, m & Self::N[0], 0);
        let (d1, cc) = addcarry_u64(d1, m & Self::N[1], cc);
        let (d2, cc) = addcarry_u64(d2, m & Self::N[2], cc);
        let (d3, _)  = addcarry_u64(d3, m & Self::N[3], cc);
        self.0 = [ d0, d1, d2, d3 ];
    }

    /// Negates this scalar (in place).
    #[inline]
    pub fn set_neg(&mut self) {
        let mut r = Self::ZERO;
        r.set_sub(self);
        *self = r;
    }

    // Computes a + b*(2^256 - n) over 512 bits.
    fn mul_nc_add(a: &[u64], b: &[u64]) -> [u64; 8] {
        let mut r = [0u64; 8];
        r[..a.len()].copy_from_slice(a);
        for i in 0..b.len() {
            let mut cc = 0u64;
            for j in 0..3 {
                let (lo, hi) = umull_add2(b[i], Self::NC[j], r[i + j], cc);
                r[i + j] = lo;
                cc = hi;
            }
            for k in (i + 3)..8 {
                let (d, c) = addcarry_u64(r[k], cc, 0);
                r[k] = d;
                cc = c as u64;
            }
        }
        r
    }

    // Reduces a 512-bit integer modulo n.
    fn reduce512(e: &[u64; 8]) -> [u64; 4] {
        // Since 2^256 = 2^256 - n (mod n), the high half is folded with
        // a multiplication by a 129-bit constant; three folds bring the
        // value below 2^256 + 2^134.
        let m = Self::mul_nc_add(&e[0..4], &e[4..8]);   // < 2^386
        let p = Self::mul_nc_add(&m[0..4], &m[4..7]);   // < 2^260
        let q = Self::mul_nc_add(&p[0..4], &p[4..5]);   // < 2^256 + 2^133

        // q[4] is 0 or 1; fold it once more (no carry out possible).
        let w = q[4].wrapping_neg();
        let (d0, cc) = addcarry_u64(q[0], w & Self::NC[0], 0);
        let (d1, cc) = addcarry_u64(q[1], w & Self::NC[1], cc);
        let (d2, cc) = addcarry_u64(q[2], w & Self::NC[2], cc);
        let (d3, _)  = addcarry_u64(q[3], 0, cc);
        Self::reduce_once([ d0, d1, d2, d3 ], 0)
    }

    #[inline]
    fn set_mul(&mut self, rhs: &Self) {
        self.0 = Self::reduce512(&mul256x256(&self.0, &rhs.0));
    }

    /// Squares this scalar (in place).
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

    /// Squares this scalar `n` times.
    pub fn xsquare(self, n: u32) -> Self {
        let mut r = self;
        for _ in 0..n {
            r.set_square();
        }
        r
    }

    /// Returns the inverse of this scalar (computed as x^(n-2)).
    ///
    /// The inverse of zero is zero.
    pub fn invert(self) -> Self {
        // n - 2, low-to-high limbs.
        const E: [u64; 4] = [
            0xBFD25E8CD036413F, 0xBAAEDCE6AF48A03B,
            0xFFFFFFFFFFFFFFFE, 0xFFFFFFFFFFFFFFFF,
        ];

        // win[i] = x^i; the exponent is public, so indexing the window
        // by exponent digits does not leak anything about x.
        let mut win = [Self::ONE; 16];
        for i in 1..16 {
            win[i] = win[i - 1] * self;
        }
        let mut r = Self::ONE;
        for i in (0..64).rev() {
            r = r.xsquare(4);
            let d = (E[i >> 4] >> ((i & 15) << 2)) & 15;
            r *= win[d as usize];
        }
        win.zeroize();
        r
    }

    #[inline]
    fn set_div(&mut self, rhs: &Self) {
        let d = rhs.invert();
        self.set_mul(&d);
    }

    /// Conditionally copies `a` into `self` (if `ctl` = 0xFFFFFFFF).
    #[inline]
    pub fn set_cond(&mut self, a: &Self, ctl: u32) {
        let cw = ((ctl as i32) as i64) as u64;
        for i in 0..4 {
            self.0[i] ^= cw & (self.0[i] ^ a.0[i]);
        }
    }

    /// Returns `a0` (if `ctl` = 0) or `a1` (if `ctl` = 0xFFFFFFFF).
    #[inline(always)]
    pub fn select(a0: &Self, a1: &Self, ctl: u32) -> Self {
        let mut r = *a0;
        r.set_cond(a1, ctl);
        r
    }

    /// Negates this scalar if `ctl` = 0xFFFFFFFF; leaves it unchanged
    /// if `ctl` = 0.
    #[inline]
    pub fn set_condneg(&mut self, ctl: u32) {
        let n = -*self;
        self.set_cond(&n, ctl);
    }

    /// Equality check (0xFFFFFFFF on equality, 0 otherwise).
    #[inline]
    pub fn equals(self, rhs: Self) -> u32 {
        let t = (self.0[0] ^ rhs.0[0]) | (self.0[1] ^ rhs.0[1])
            | (self.0[2] ^ rhs.0[2]) | (self.0[3] ^ rhs.0[3]);
        !nonzero_mask(t)
    }

    /// Returns 0xFFFFFFFF if this scalar is zero, 0 otherwise.
    #[inline]
    pub fn iszero(self) -> u32 {
        !nonzero_mask(self.0[0] | self.0[1] | self.0[2] | self.0[3])
    }

    /// Returns 0xFFFFFFFF if this scalar is greater than n/2 (a "high"
    /// value, whose negation is low), 0 otherwise.
    #[inline]
    pub fn is_high(self) -> u32 {
        let (_, cc) = subborrow_u64(Self::HALF_N[0], self.0[0], 0);
        let (_, cc) = subborrow_u64(Self::HALF_N[1], self.0[1], cc);
        let (_, cc) = subborrow_u64(Self::HALF_N[2], self.0[2], cc);
        let (_, cc) = subborrow_u64(Self::HALF_N[3], self.0[3], cc);
        (cc as u32).wrapping_neg()
    }

    /// Returns 0xFFFFFFFF if this scalar is odd, 0 otherwise.
    #[inline(always)]
    pub fn is_odd(self) -> u32 {
        ((self.0[0] as u32) & 1).wrapping_neg()
    }

    /// Encodes this scalar over 32 bytes (unsigned big-endian).
    #[inline]
    pub fn encode32(self) -> [u8; 32] {
        limbs_to_be(&self.0)
    }

    /// Decodes a scalar from 32 bytes (unsigned big-endian).
    ///
    /// Returns (s, 0xFFFFFFFF) if the value is lower than n; otherwise,
    /// (0, 0) is returned.
    pub fn decode32(buf: &[u8; 32]) -> (Self, u32) {
        let d = limbs_from_be(buf);
        let (_, cc) = subborrow_u64(d[0], Self::N[0], 0);
        let (_, cc) = subborrow_u64(d[1], Self::N[1], cc);
        let (_, cc) = subborrow_u64(d[2], Self::N[2], cc);
        let (_, cc) = subborrow_u64(d[3], Self::N[3], cc);
        let m = (cc as u64).wrapping_neg();
        (Self([ d[0] & m, d[1] & m, d[2] & m, d[3] & m ]), m as u32)
    }

    /// Decodes a scalar from bytes; the slice must have length 32 and
    /// encode (big-endian) an integer lower than n. Zero is accepted.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let buf: &[u8; 32] = buf.try_into().map_err(|_| Error::InvalidScalar)?;
        let (s, cc) = Self::decode32(buf);
        if cc != 0 {
            Ok(s)
        } else {
            Err(Error::InvalidScalar)
        }
    }

    /// Interprets 32 bytes (e.g. a hash output) as a big-endian integer
    /// and reduces it modulo n. The second returned value is 0xFFFFFFFF
    /// if a reduction was needed (the value was at least n), 0 otherwise.
    pub fn reduce32(buf: &[u8; 32]) -> (Self, u32) {
        let d = limbs_from_be(buf);
        let (_, cc) = subborrow_u64(d[0], Self::N[0], 0);
        let (_, cc) = subborrow_u64(d[1], Self::N[1], cc);
        let (_, cc) = subborrow_u64(d[2], Self::N[2], cc);
        let (_, cc) = subborrow_u64(d[3], Self::N[3], cc);
        (Self(Self::reduce_once(d, 0)), (cc as u32).wrapping_sub(1))
    }

    /// Interprets 32 bytes as a big-endian integer, reduced modulo n.
    /// This never fails.
    #[inline(always)]
    pub fn decode_reduce(buf: &[u8; 32]) -> Self {
        Self::reduce32(buf).0
    }

    /// Interprets 64 bytes as a big-endian integer, reduced modulo n.
    /// This never fails; with uniformly random input, the output bias
    /// is negligible.
    pub fn decode_reduce_wide(buf: &[u8; 64]) -> Self {
        let mut hi = [0u8; 32];
        let mut lo = [0u8; 32];
        hi.copy_from_slice(&buf[..32]);
        lo.copy_from_slice(&buf[32..]);
        let h = limbs_from_be(&hi);
        let l = limbs_from_be(&lo);
        let e = [ l[0], l[1], l[2], l[3], h[0], h[1], h[2], h[3] ];
        Self(Self::reduce512(&e))
    }

    /// Extracts `count` bits (at most 31) starting at bit `pos`; bits
    /// beyond the top of the value read as zero. `pos` and `count` are
    /// public, the scalar may be secret.
    #[inline]
    pub(crate) fn bits(self, pos: usize, count: usize) -> u32 {
        let j = pos >> 6;
        if j >= 4 {
            return 0;
        }
        let k = pos & 63;
        let mut w = self.0[j] >> k;
        if k + count > 64 && j < 3 {
            w |= self.0[j + 1] << (64 - k);
        }
        (w as u32) & ((1u32 << count) - 1)
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl_arith_ops!(Scalar);
