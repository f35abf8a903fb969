//! Points on the secp256k1 curve (y^2 = x^3 + 7).
//!
//! `Point` uses projective coordinates and complete addition formulas,
//! so no special case (neutral, doubling) needs to be handled by callers.
//! `AffinePoint` is the normalized form used in precomputed tables and for
//! encoding; it carries an explicit neutral flag.
//!
//! Serialization formats are those of SEC 1: 33-byte compressed (0x02 or
//! 0x03 followed by x), 65-byte uncompressed (0x04, x, y), plus the
//! 32-byte X-only format of BIP340 (x alone, y implicitly even). The
//! 65-byte "hybrid" format (0x06 or 0x07 with y parity in the first byte)
//! is accepted on decoding but never produced.

// Projective/fractional coordinates traditionally use uppercase letters,
// using lowercase only for affine coordinates.
#![allow(non_snake_case)]

use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use zeroize::Zeroize;

use crate::field::FieldElement;
use crate::scalar::Scalar;
use crate::{Error, Vec};

/// A point on secp256k1, in projective coordinates.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    pub(crate) X: FieldElement,
    pub(crate) Y: FieldElement,
    pub(crate) Z: FieldElement,
}

/// A point in affine coordinates.
///
/// `inf` is 0xFFFFFFFF for the neutral, in which case `x` and `y` are
/// meaningless (both zero when produced by this crate).
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    pub(crate) inf: u32,
}

// 0xFFFFFFFF if a == b, 0 otherwise.
#[inline(always)]
fn byte_eq(a: u8, b: u8) -> u32 {
    ((((a ^ b) as i32) - 1) >> 8) as u32
}

// Copies a 32-byte sub-slice; callers guarantee the length.
#[inline(always)]
fn take32(buf: &[u8]) -> [u8; 32] {
    let mut r = [0u8; 32];
    r.copy_from_slice(&buf[..32]);
    r
}

impl AffinePoint {

    pub const NEUTRAL: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        inf: 0xFFFFFFFF,
    };

    /// Returns the x coordinate (zero for the neutral).
    #[inline(always)]
    pub fn x(&self) -> FieldElement {
        self.x
    }

    /// Returns the y coordinate (zero for the neutral).
    #[inline(always)]
    pub fn y(&self) -> FieldElement {
        self.y
    }

    /// Returns 0xFFFFFFFF for the neutral, 0 otherwise.
    #[inline(always)]
    pub fn isneutral(&self) -> u32 {
        self.inf
    }

    #[inline]
    pub fn set_cond(&mut self, P: &Self, ctl: u32) {
        self.x.set_cond(&P.x, ctl);
        self.y.set_cond(&P.y, ctl);
        self.inf ^= ctl & (self.inf ^ P.inf);
    }

    #[inline]
    pub fn set_condneg(&mut self, ctl: u32) {
        self.y.set_condneg(ctl);
    }
}

impl Point {

    // Curve equation is: y^2 = x^3 + b  with b = 7.
    // Projective coordinates: (x, y) -> (X:Y:Z) with x = X/Z and y = Y/Z.
    //   Y is never 0 (not even for the neutral)
    //   X = 0 and Z = 0 for the neutral
    //   Z != 0 for all non-neutral points
    //
    // Additions use the complete formulas of Renes-Costello-Batina
    // (https://eprint.iacr.org/2015/1060), algorithms 7, 8 and 9,
    // specialized for a = 0 (3*b = 21).

    /// The neutral element (point-at-infinity).
    pub const NEUTRAL: Self = Self {
        X: FieldElement::ZERO,
        Y: FieldElement::ONE,
        Z: FieldElement::ZERO,
    };

    /// The conventional generator G.
    pub const BASE: Self = Self {
        X: FieldElement::w64be(
            0x79BE667EF9DCBBAC, 0x55A06295CE870B07,
            0x029BFCDB2DCE28D9, 0x59F2815B16F81798),
        Y: FieldElement::w64be(
            0x483ADA7726A3C465, 0x5DA4FBFC0E1108A8,
            0xFD17B448A6855419, 0x9C47D08FFB10D4B8),
        Z: FieldElement::ONE,
    };

    const B: FieldElement = FieldElement::w64be(0, 0, 0, 7);

    /// Returns the point with abscissa `x` whose y coordinate has the
    /// parity given by `odd` (0xFFFFFFFF for odd y, 0 for even y).
    ///
    /// Returned values are (P, r): if `x` is the abscissa of a curve
    /// point, r = 0xFFFFFFFF; otherwise, P is the neutral and r = 0.
    pub fn lift_x(x: FieldElement, odd: u32) -> (Self, u32) {
        let (mut y, r) = (x * x.square() + Self::B).sqrt();

        // sqrt() returns the even root; there is no point with y = 0.
        y.set_condneg(odd);
        let mut P = Self::NEUTRAL;
        P.X.set_cond(&x, r);
        P.Y.set_cond(&y, r);
        P.Z.set_cond(&FieldElement::ONE, r);
        (P, r)
    }

    /// Tries to decode a point from its compressed (33 bytes),
    /// uncompressed or hybrid (65 bytes) encoding.
    ///
    /// On success, this structure is set to the decoded point and
    /// 0xFFFFFFFF is returned. On failure, this structure is set to the
    /// neutral and 0 is returned. The neutral itself has no valid
    /// encoding here.
    ///
    /// Timing may leak the encoding length, but not the point value nor
    /// whether decoding succeeded.
    pub fn set_decode(&mut self, buf: &[u8]) -> u32 {
        *self = Self::NEUTRAL;
        match buf.len() {
            33 => {
                let mut r = byte_eq(buf[0] & 0xFE, 0x02);
                let (x, rx) = FieldElement::decode32(&take32(&buf[1..]));
                let odd = ((buf[0] & 1) as u32).wrapping_neg();
                let (P, ry) = Self::lift_x(x, odd);
                r &= rx & ry;
                self.set_cond(&P, r);
                r
            }
            65 => {
                let h = buf[0];
                let (x, rx) = FieldElement::decode32(&take32(&buf[1..]));
                let (y, ry) = FieldElement::decode32(&take32(&buf[33..]));

                // Hybrid encodings must agree with the parity of y.
                let hp = ((h & 1) as u32).wrapping_neg();
                let hyb = byte_eq(h & 0xFE, 0x06) & !(hp ^ y.is_odd());
                let mut r = (byte_eq(h, 0x04) | hyb) & rx & ry;
                r &= y.square().equals(x * x.square() + Self::B);

                self.X.set_cond(&x, r);
                self.Y.set_cond(&y, r);
                self.Z.set_cond(&FieldElement::ONE, r);
                r
            }
            _ => 0,
        }
    }

    /// Decodes a point from its compressed or uncompressed encoding.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let mut P = Self::NEUTRAL;
        if P.set_decode(buf) != 0 {
            Ok(P)
        } else {
            Err(Error::InvalidPublicKey)
        }
    }

    /// Decodes a 32-byte X-only encoding (the point with that x and an
    /// even y).
    pub fn decode_xonly(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != 32 {
            return Err(Error::InvalidPublicKey);
        }
        let (x, rx) = FieldElement::decode32(&take32(buf));
        let (P, ry) = Self::lift_x(x, 0);
        if (rx & ry) != 0 {
            Ok(P)
        } else {
            Err(Error::InvalidPublicKey)
        }
    }

    /// Gets the affine coordinates of this point.
    pub fn to_affine(self) -> AffinePoint {
        // iZ is 0 for the neutral, hence x = y = 0 in that case.
        let iZ = self.Z.invert();
        let mut x = self.X * iZ;
        let mut y = self.Y * iZ;
        x.set_normalized();
        y.set_normalized();
        AffinePoint { x, y, inf: self.isneutral() }
    }

    /// Converts an affine point back to projective coordinates.
    pub fn from_affine(P: &AffinePoint) -> Self {
        let mut Q = Self { X: P.x, Y: P.y, Z: FieldElement::ONE };
        Q.set_cond(&Self::NEUTRAL, P.inf);
        Q
    }

    /// Normalizes a batch of points with a single field inversion.
    pub fn batch_to_affine(pp: &[Self]) -> Vec<AffinePoint> {
        let mut zz: Vec<FieldElement> = pp.iter().map(|P| P.Z).collect();
        FieldElement::batch_invert(&mut zz);
        pp.iter().zip(zz.iter()).map(|(P, iZ)| {
            let mut x = P.X * iZ;
            let mut y = P.Y * iZ;
            x.set_normalized();
            y.set_normalized();
            AffinePoint { x, y, inf: P.isneutral() }
        }).collect()
    }

    /// Encodes this point in compressed format (33 bytes).
    ///
    /// The neutral encodes as 33 zeros (this is not a valid encoding).
    pub fn encode_compressed(self) -> [u8; 33] {
        let P = self.to_affine();
        let mut b = [0u8; 33];
        b[0] = (0x02 | (P.y.is_odd() as u8 & 1)) & !(P.inf as u8);
        b[1..].copy_from_slice(&P.x.encode32());
        b
    }

    /// Encodes this point in uncompressed format (65 bytes).
    ///
    /// The neutral encodes as 65 zeros (this is not a valid encoding).
    pub fn encode_uncompressed(self) -> [u8; 65] {
        let P = self.to_affine();
        let mut b = [0u8; 65];
        b[0] = 0x04 & !(P.inf as u8);
        b[1..33].copy_from_slice(&P.x.encode32());
        b[33..].copy_from_slice(&P.y.encode32());
        b
    }

    /// Encodes the x coordinate of this point (32 bytes). The parity of
    /// y is lost.
    pub fn encode_xonly(self) -> [u8; 32] {
        self.to_affine().x.encode32()
    }

    /// Returns 0xFFFFFFFF if the y coordinate of this point is odd.
    /// The neutral reports even.
    pub fn y_is_odd(self) -> u32 {
        self.to_affine().y.is_odd()
    }

    /// Adds point `rhs` to `self`.
    fn set_add(&mut self, rhs: &Self) {
        let (X1, Y1, Z1) = (&self.X, &self.Y, &self.Z);
        let (X2, Y2, Z2) = (&rhs.X, &rhs.Y, &rhs.Z);

        let x1x2 = X1 * X2;
        let y1y2 = Y1 * Y2;
        let z1z2 = Z1 * Z2;
        let C = (X1 + Y1) * (X2 + Y2) - x1x2 - y1y2;  // X1*Y2 + X2*Y1
        let D = (Y1 + Z1) * (Y2 + Z2) - y1y2 - z1z2;  // Y1*Z2 + Y2*Z1
        let E = (X1 + Z1) * (X2 + Z2) - x1x2 - z1z2;  // X1*Z2 + X2*Z1
        let F = x1x2.mul3();
        let G = z1z2.mul21();
        let H = y1y2 + G;
        let I = y1y2 - G;
        let J = E.mul21();

        self.X = C * I - D * J;
        self.Y = J * F + I * H;
        self.Z = H * D + F * C;
    }

    /// Adds the affine point `rhs` to `self` (the neutral flag of `rhs`
    /// is honoured).
    pub(crate) fn set_add_affine(&mut self, rhs: &AffinePoint) {
        let (X1, Y1, Z1) = (&self.X, &self.Y, &self.Z);
        let (X2, Y2) = (&rhs.x, &rhs.y);

        // set_add() with Z2 = 1.
        let x1x2 = X1 * X2;
        let y1y2 = Y1 * Y2;
        let C = (X1 + Y1) * (X2 + Y2) - x1x2 - y1y2;
        let D = Y2 * Z1 + Y1;
        let E = X2 * Z1 + X1;
        let F = x1x2.mul3();
        let G = Z1.mul21();
        let H = y1y2 + G;
        let I = y1y2 - G;
        let J = E.mul21();
        let X3 = C * I - D * J;
        let Y3 = J * F + I * H;
        let Z3 = H * D + F * C;

        // Adding the neutral leaves self unchanged.
        let nz = !rhs.inf;
        self.X.set_cond(&X3, nz);
        self.Y.set_cond(&Y3, nz);
        self.Z.set_cond(&Z3, nz);
    }

    /// Subtracts the affine point `rhs` from `self`.
    pub(crate) fn set_sub_affine(&mut self, rhs: &AffinePoint) {
        let mut Q = *rhs;
        Q.y.set_neg();
        self.set_add_affine(&Q);
    }

    /// Doubles this point (in place).
    pub fn set_double(&mut self) {
        let (X, Y, Z) = (&self.X, &self.Y, &self.Z);

        let yy = Y.square();
        let yy8 = yy.mul8();
        let C = Z.square().mul21();
        let Z3 = Y * Z * yy8;
        let D = yy - C.mul3();
        let Y3 = D * (yy + C) + C * yy8;
        let X3 = (D * X * Y).mul2();

        self.X = X3;
        self.Y = Y3;
        self.Z = Z3;
    }

    #[inline(always)]
    pub fn double(self) -> Self {
        let mut r = self;
        r.set_double();
        r
    }

    /// Doubles this point n times (in place).
    pub fn set_xdouble(&mut self, n: u32) {
        for _ in 0..n {
            self.set_double();
        }
    }

    #[inline(always)]
    pub fn xdouble(self, n: u32) -> Self {
        let mut r = self;
        r.set_xdouble(n);
        r
    }

    #[inline(always)]
    pub fn set_neg(&mut self) {
        self.Y.set_neg();
    }

    fn set_sub(&mut self, rhs: &Self) {
        self.set_add(&-rhs);
    }

    /// Multiplies this point by a small integer.
    ///
    /// Constant-time with regard to the point, NOT to the multiplier.
    pub fn set_mul_small(&mut self, n: u64) {
        if n == 0 {
            *self = Self::NEUTRAL;
            return;
        }
        let T = *self;
        for i in (0..(63 - n.leading_zeros())).rev() {
            self.set_double();
            if ((n >> i) & 1) != 0 {
                self.set_add(&T);
            }
        }
    }

    /// Compares two points for equality (0xFFFFFFFF if equal, 0
    /// otherwise).
    #[inline]
    pub fn equals(self, rhs: Self) -> u32 {
        // Y != 0 for all points, so a neutral never matches a
        // non-neutral point on the Y test.
        (self.X * rhs.Z).equals(rhs.X * self.Z)
        & (self.Y * rhs.Z).equals(rhs.Y * self.Z)
    }

    /// Returns 0xFFFFFFFF for the neutral, 0 otherwise.
    #[inline(always)]
    pub fn isneutral(self) -> u32 {
        self.Z.iszero()
    }

    /// Copies `P` into `self` if `ctl` = 0xFFFFFFFF.
    #[inline]
    pub fn set_cond(&mut self, P: &Self, ctl: u32) {
        self.X.set_cond(&P.X, ctl);
        self.Y.set_cond(&P.Y, ctl);
        self.Z.set_cond(&P.Z, ctl);
    }

    /// Returns `P0` (if `ctl` = 0) or `P1` (if `ctl` = 0xFFFFFFFF).
    #[inline(always)]
    pub fn select(P0: &Self, P1: &Self, ctl: u32) -> Self {
        let mut P = *P0;
        P.set_cond(P1, ctl);
        P
    }

    /// Negates this point if `ctl` = 0xFFFFFFFF.
    #[inline]
    pub fn set_condneg(&mut self, ctl: u32) {
        self.Y.set_condneg(ctl);
    }

    /// Recodes a scalar into 52 signed 5-bit digits (low to high).
    ///
    /// Each digit is in -15..+16, the top digit is in 0..+2.
    pub(crate) fn recode_scalar(n: &Scalar) -> [i8; 52] {
        let mut sd = [0i8; 52];
        let mut cc = 0u32;
        for j in 0..52 {
            let d = n.bits(5 * j, 5) + cc;
            let m = 16u32.wrapping_sub(d) >> 8;
            sd[j] = d.wrapping_sub(m & 32) as i8;
            cc = m & 1;
        }
        sd
    }

    /// Looks up `k*P` in a window holding `(i+1)*P` at index i, with
    /// sign handling (constant-time).
    fn lookup(win: &[Self; 16], k: i8) -> Self {
        let s = ((k as i32) >> 8) as u32;
        let f = ((k as u32) ^ s).wrapping_sub(s);
        let mut P = Self::NEUTRAL;
        for (i, W) in win.iter().enumerate() {
            // a-b and b-a both have a clear top bit only if a == b.
            let j = (i as u32) + 1;
            let w = !(f.wrapping_sub(j) | j.wrapping_sub(f));
            P.set_cond(W, ((w as i32) >> 31) as u32);
        }
        P.set_condneg(s);
        P
    }

    /// Affine counterpart of `lookup()`; digit 0 yields the neutral.
    pub(crate) fn lookup_affine(win: &[AffinePoint], k: i8) -> AffinePoint {
        let s = ((k as i32) >> 8) as u32;
        let f = ((k as u32) ^ s).wrapping_sub(s);
        let mut P = AffinePoint::NEUTRAL;
        for (i, W) in win.iter().enumerate() {
            let j = (i as u32) + 1;
            let w = !(f.wrapping_sub(j) | j.wrapping_sub(f));
            P.set_cond(W, ((w as i32) >> 31) as u32);
        }
        P.set_condneg(s);
        P
    }

    /// Multiplies this point by a scalar (in place).
    ///
    /// Constant-time with regard to both the point and the scalar.
    pub fn set_mul(&mut self, n: &Scalar) {
        let mut win = [Self::NEUTRAL; 16];
        win[0] = *self;
        for i in 1..8 {
            let j = 2 * i;
            win[j - 1] = win[i - 1].double();
            win[j] = win[j - 1] + win[0];
        }
        win[15] = win[7].double();

        let mut sd = Self::recode_scalar(n);
        *self = Self::lookup(&win, sd[51]);
        for i in (0..51).rev() {
            self.set_xdouble(5);
            self.set_add(&Self::lookup(&win, sd[i]));
        }
        sd.zeroize();
        win.zeroize();
    }

    /// Computes `n*G` with the generic constant-time multiplication.
    ///
    /// `Context::mul_gen()` is faster and blinded.
    pub fn mulgen(n: &Scalar) -> Self {
        let mut P = Self::BASE;
        P.set_mul(n);
        P
    }

    /// wNAF recoding with window width `w` (2 to 8) into 257 digits;
    /// non-zero digits are odd and lie in -(2^(w-1)-1)..+(2^(w-1)-1).
    ///
    /// NOT constant-time; for public scalars only.
    pub(crate) fn recode_wnaf(n: &Scalar, w: usize) -> [i8; 257] {
        let mut sd = [0i8; 257];
        let mut carry = 0u32;
        let mut bit = 0usize;
        while bit < 257 {
            if n.bits(bit, 1) == carry {
                bit += 1;
                continue;
            }
            let now = core::cmp::min(w, 257 - bit);
            let mut word = n.bits(bit, now) + carry;
            carry = (word >> (w - 1)) & 1;
            word = word.wrapping_sub(carry << w);
            sd[bit] = word as i32 as i8;
            bit += now;
        }
        sd
    }

    /// Odd multiples `(2*i+1)*P` for i = 0 to `count - 1`, normalized.
    pub(crate) fn odd_multiples(self, count: usize) -> Vec<AffinePoint> {
        let mut pp = Vec::with_capacity(count);
        let Q = self.double();
        let mut T = self;
        for _ in 0..count {
            pp.push(T);
            T += Q;
        }
        Self::batch_to_affine(&pp)
    }

    /// Sets this point to `u*self + v*G`, where `gtab` holds the odd
    /// multiples of G used with wNAF width `gw` (`gtab.len()` must be
    /// at least 2^(gw-2)).
    ///
    /// NOT constant-time; for public data only.
    pub(crate) fn set_mul_add_mulgen_with_vartime(&mut self,
        u: &Scalar, v: &Scalar, gtab: &[AffinePoint], gw: usize)
    {
        // win[i] = (2*i+1)*self
        let mut win = [Self::NEUTRAL; 8];
        let Q = self.double();
        win[0] = *self;
        for i in 1..8 {
            win[i] = win[i - 1] + Q;
        }

        let sd0 = Self::recode_wnaf(u, 5);
        let sd1 = Self::recode_wnaf(v, gw);

        let mut zz = true;
        let mut ndbl = 0u32;
        for i in (0..257).rev() {
            ndbl += 1;
            let e0 = sd0[i];
            let e1 = sd1[i];
            if (e0 | e1) == 0 {
                continue;
            }
            if zz {
                *self = Self::NEUTRAL;
                zz = false;
            } else {
                self.set_xdouble(ndbl);
            }
            ndbl = 0;

            if e0 > 0 {
                self.set_add(&win[(e0 >> 1) as usize]);
            } else if e0 < 0 {
                self.set_sub(&win[((-e0) >> 1) as usize]);
            }
            if e1 > 0 {
                self.set_add_affine(&gtab[(e1 >> 1) as usize]);
            } else if e1 < 0 {
                self.set_sub_affine(&gtab[((-(e1 as i32)) >> 1) as usize]);
            }
        }

        if zz {
            *self = Self::NEUTRAL;
        } else {
            self.set_xdouble(ndbl);
        }
    }

    /// Returns `u*self + v*G`.
    ///
    /// NOT constant-time; for public data only. The odd multiples of G
    /// are computed on the fly; `Context::mul_gen_add_vartime()` uses
    /// its precomputed table instead.
    pub fn mul_add_mulgen_vartime(self, u: &Scalar, v: &Scalar) -> Self {
        let gtab = Self::BASE.odd_multiples(8);
        let mut R = self;
        R.set_mul_add_mulgen_with_vartime(u, v, &gtab, 5);
        R
    }
}

impl Zeroize for Point {
    fn zeroize(&mut self) {
        self.X.zeroize();
        self.Y.zeroize();
        self.Z.zeroize();
    }
}

impl Zeroize for AffinePoint {
    fn zeroize(&mut self) {
        self.x.zeroize();
        self.y.zeroize();
        self.inf = 0;
    }
}

impl Add<Point> for Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, other: Point) -> Point {
        let mut r = self;
        r.set_add(&other);
        r
    }
}

impl Add<&Point> for Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, other: &Point) -> Point {
        let mut r = self;
        r.set_add(other);
        r
    }
}

impl Add<Point> for &Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, other: Point) -> Point {
        let mut r = *self;
        r.set_add(&other);
        r
    }
}

impl Add<&Point> for &Point {
    type Output = Point;

    #[inline(always)]
    fn add(self, other: &Point) -> Point {
        let mut r = *self;
        r.set_add(other);
        r
    }
}

impl Sub<Point> for Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, other: Point) -> Point {
        let mut r = self;
        r.set_sub(&other);
        r
    }
}

impl Sub<&Point> for Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, other: &Point) -> Point {
        let mut r = self;
        r.set_sub(other);
        r
    }
}

impl Sub<Point> for &Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, other: Point) -> Point {
        let mut r = *self;
        r.set_sub(&other);
        r
    }
}

impl Sub<&Point> for &Point {
    type Output = Point;

    #[inline(always)]
    fn sub(self, other: &Point) -> Point {
        let mut r = *self;
        r.set_sub(other);
        r
    }
}

impl AddAssign<Point> for Point {
    #[inline(always)]
    fn add_assign(&mut self, other: Point) {
        self.set_add(&other);
    }
}

impl AddAssign<&Point> for Point {
    #[inline(always)]
    fn add_assign(&mut self, other: &Point) {
        self.set_add(other);
    }
}

impl SubAssign<Point> for Point {
    #[inline(always)]
    fn sub_assign(&mut self, other: Point) {
        self.set_sub(&other);
    }
}

impl SubAssign<&Point> for Point {
    #[inline(always)]
    fn sub_assign(&mut self, other: &Point) {
        self.set_sub(other);
    }
}

impl Neg for Point {
    type Output = Point;

    #[inline(always)]
    fn neg(self) -> Point {
        let mut r = self;
        r.set_neg();
        r
    }
}

impl Neg for &Point {
    type Output = Point;

    #[inline(always)]
    fn neg(self) -> Point {
        let mut r = *self;
        r.set_neg();
        r
    }
}

impl Mul<Scalar> for Point {
    type Output = Point;

    #[inline(always)]
    fn mul(self, other: Scalar) -> Point {
        let mut r = self;
        r.set_mul(&other);
        r
    }
}

impl Mul<&Scalar> for Point {
    type Output = Point;

    #[inline(always)]
    fn mul(self, other: &Scalar) -> Point {
        let mut r = self;
        r.set_mul(other);
        r
    }
}

impl Mul<&Scalar> for &Point {
    type Output = Point;

    #[inline(always)]
    fn mul(self, other: &Scalar) -> Point {
        let mut r = *self;
        r.set_mul(other);
        r
    }
}

impl Mul<Point> for Scalar {
    type Output = Point;

    #[inline(always)]
    fn mul(self, other: Point) -> Point {
        let mut r = other;
        r.set_mul(&self);
        r
    }
}

impl MulAssign<Scalar> for Point {
    #[inline(always)]
    fn mul_assign(&mut self, other: Scalar) {
        self.set_mul(&other);
    }
}

impl MulAssign<&Scalar> for Point {
    #[inline(always)]
    fn mul_assign(&mut self, other: &Scalar) {
        self.set_mul(other);
    }
}

#[cfg(test)]
mod tests {

    use super::{Point, AffinePoint};
    use crate::field::FieldElement;
    use crate::scalar::Scalar;
    use crate::hash::Sha256;
    use crate::Error;

    // For a point P = k*G (k = SHA256("point") mod n), points i*P for
    // i = 1 to 6, compressed.
    const EPC: [&str; 6] = [
        "02adafa1c0c3a52e3da24bb7c22e38582bf907eef30d2bd126948a5592079336b1",
        "03f7f69afffcb86e8aab755e092a00c46699f98cbec9f3e4e391e9bb12040c2919",
        "03fca2ef52e6b2d4f9a1adf0bce57674b58a60e1beb81296f23ca77bb87dea4fa7",
        "03fa055bf82caba70af5ca4be21af79cc27edb0d378e0488f14a1e8fd1086411d7",
        "03ab7b7f7463ce911415d0c14d29d35c97c791697fc851fd43237d970b9c6c6cbd",
        "02beb60a3aada15c92f5439c0ab95b1687e0491ecd43d247aa2147aabee17234b1",
    ];

    const EPU1: &str = "04adafa1c0c3a52e3da24bb7c22e38582bf907eef30d2bd126948a5592079336b17a4d5dd2ea9a7e388d94201ef1933282b45e1911a9188ef589fe78dbb0df7284";
    const EPU5: &str = "04ab7b7f7463ce911415d0c14d29d35c97c791697fc851fd43237d970b9c6c6cbd66e86daff635f3a43123f8ca6c2a4db1d902c4be4cffdb8d01977bf700bd1a79";

    fn sc(data: &[u8]) -> Scalar {
        Scalar::decode_reduce(&Sha256::hash(data))
    }

    #[test]
    fn encode_decode() {
        let mut PP = [Point::NEUTRAL; 7];
        for i in 1..7 {
            let enc = hex::decode(EPC[i - 1]).unwrap();
            let P = Point::decode(&enc).unwrap();
            assert!(P.isneutral() == 0);
            assert_eq!(&P.encode_compressed()[..], &enc[..]);
            PP[i] = P;
        }
        assert!(PP[1].equals(Point::mulgen(&sc(b"point"))) == 0xFFFFFFFF);

        let u1 = hex::decode(EPU1).unwrap();
        let u5 = hex::decode(EPU5).unwrap();
        assert!(Point::decode(&u1).unwrap().equals(PP[1]) == 0xFFFFFFFF);
        assert!(Point::decode(&u5).unwrap().equals(PP[5]) == 0xFFFFFFFF);
        assert_eq!(&PP[1].encode_uncompressed()[..], &u1[..]);
        assert_eq!(&PP[5].encode_uncompressed()[..], &u5[..]);

        // Hybrid encodings: 0x06 for even y, 0x07 for odd y.
        let mut h1 = u1.clone();
        h1[0] = 0x06;
        assert!(Point::decode(&h1).unwrap().equals(PP[1]) == 0xFFFFFFFF);
        h1[0] = 0x07;
        assert!(matches!(Point::decode(&h1), Err(Error::InvalidPublicKey)));
        let mut h5 = u5.clone();
        h5[0] = 0x07;
        assert!(Point::decode(&h5).unwrap().equals(PP[5]) == 0xFFFFFFFF);

        // X-only: P3 has odd y, so the X-only decoding yields -P3.
        let e3 = hex::decode(EPC[2]).unwrap();
        let x3 = &e3[1..];
        let Q = Point::decode_xonly(x3).unwrap();
        assert!(Q.equals(-PP[3]) == 0xFFFFFFFF);
        assert!(Q.y_is_odd() == 0);
        assert!(PP[3].y_is_odd() == 0xFFFFFFFF);
        assert_eq!(&PP[3].encode_xonly()[..], x3);

        // Invalid encodings.
        assert!(Point::decode(&[0u8]).is_err());
        assert!(Point::decode(&u1[..64]).is_err());
        let mut bad = u1.clone();
        bad[64] ^= 1;
        assert!(Point::decode(&bad).is_err());
        let mut bad = hex::decode(EPC[0]).unwrap();
        bad[0] = 0x04;
        assert!(Point::decode(&bad).is_err());
        assert!(Point::decode_xonly(&[0u8; 32]).is_err());
        assert!(Point::decode_xonly(&[0xFFu8; 32]).is_err());
        assert!(Point::decode_xonly(&[0u8; 33]).is_err());
        assert!(Point::NEUTRAL.encode_compressed() == [0u8; 33]);
    }

    #[test]
    fn add_double() {
        let mut PP = [Point::NEUTRAL; 7];
        for i in 1..7 {
            PP[i] = Point::decode(&hex::decode(EPC[i - 1]).unwrap()).unwrap();
        }
        for i in 1..7 {
            assert!(PP[i].equals(PP[i - 1]) == 0);
            let Q = PP[i - 1] + PP[1];
            assert!(PP[i].equals(Q) == 0xFFFFFFFF);
            assert!((Q + Point::NEUTRAL).equals(Q) == 0xFFFFFFFF);
            assert!((Point::NEUTRAL + Q).equals(Q) == 0xFFFFFFFF);
            let mut R = PP[1];
            R.set_mul_small(i as u64);
            assert!(R.equals(PP[i]) == 0xFFFFFFFF);
        }
        assert!(PP[1].double().equals(PP[2]) == 0xFFFFFFFF);
        assert!(PP[3].double().equals(PP[6]) == 0xFFFFFFFF);
        assert!(PP[1].xdouble(2).equals(PP[4]) == 0xFFFFFFFF);
        assert!((PP[5] - PP[3]).equals(PP[2]) == 0xFFFFFFFF);
        assert!((PP[3] - PP[3]).isneutral() == 0xFFFFFFFF);
        assert!((PP[2] + (-PP[2])).isneutral() == 0xFFFFFFFF);
        assert!(Point::NEUTRAL.double().isneutral() == 0xFFFFFFFF);

        // Mixed additions, including the neutral on either side.
        let aa = Point::batch_to_affine(&PP);
        assert!(aa[0].isneutral() == 0xFFFFFFFF);
        for i in 1..7 {
            assert!(aa[i].isneutral() == 0);
            assert!(Point::from_affine(&aa[i]).equals(PP[i]) == 0xFFFFFFFF);
            let mut Q = PP[1];
            Q.set_add_affine(&aa[i - 1]);
            assert!(Q.equals(PP[i]) == 0xFFFFFFFF);
            let mut Q = Point::NEUTRAL;
            Q.set_add_affine(&aa[i]);
            assert!(Q.equals(PP[i]) == 0xFFFFFFFF);
            let mut Q = PP[6];
            Q.set_sub_affine(&aa[i]);
            assert!(Q.equals(PP[6 - i]) == 0xFFFFFFFF);
        }
        let A = PP[4].to_affine();
        assert!(A.x().equals(aa[4].x()) == 0xFFFFFFFF);
        assert!(Point::from_affine(&AffinePoint::NEUTRAL).isneutral() == 0xFFFFFFFF);
    }

    #[test]
    fn mulgen() {
        let s = Scalar::w64be(0xF0FCA55C06488D1C, 0x6CA454ED29573B6C,
                              0x89D4F76592F96F10, 0x98BD4A5F08DF863E);
        let enc = hex::decode(
            "0208289C906282497194389EA32BD63518ADEAE84C179FEA6FD2531A71144C94FA")
            .unwrap();
        let P = Point::BASE * s;
        assert_eq!(&P.encode_compressed()[..], &enc[..]);
        assert!(Point::mulgen(&s).equals(Point::decode(&enc).unwrap()) == 0xFFFFFFFF);

        assert!(Point::mulgen(&Scalar::ZERO).isneutral() == 0xFFFFFFFF);
        assert!(Point::mulgen(&Scalar::ONE).equals(Point::BASE) == 0xFFFFFFFF);
        assert!(Point::mulgen(&Scalar::MINUS_ONE).equals(-Point::BASE) == 0xFFFFFFFF);
    }

    #[test]
    fn mul() {
        for i in 0..20u64 {
            let s1 = sc(&(2 * i).to_le_bytes());
            let s2 = sc(&(2 * i + 1).to_le_bytes());
            let P1 = Point::mulgen(&s1);
            let P2 = Point::mulgen(&(s1 * s2));
            assert!(P2.equals(s2 * P1) == 0xFFFFFFFF);
            assert!((P1 * s2 + P1).equals(P1 * (s2 + Scalar::ONE)) == 0xFFFFFFFF);
        }
    }

    #[test]
    fn wnaf() {
        for w in [2usize, 5, 8] {
            for i in 0..20u64 {
                let k = if i == 0 { Scalar::MINUS_ONE } else { sc(&i.to_le_bytes()) };
                let sd = Point::recode_wnaf(&k, w);
                let mut t = Scalar::ZERO;
                let mut p = Scalar::ONE;
                let two = Scalar::from_u32(2);
                for d in sd.iter() {
                    let v = Scalar::from_u32(d.unsigned_abs() as u32);
                    if *d >= 0 {
                        t += v * p;
                    } else {
                        t -= v * p;
                    }
                    assert!((*d as i32) % 2 != 0 || *d == 0);
                    assert!((d.unsigned_abs() as u32) < (1u32 << (w - 1)));
                    p *= two;
                }
                assert!(t.equals(k) == 0xFFFFFFFF);
            }
        }
    }

    #[test]
    fn mul_add_mulgen() {
        for i in 0..20u64 {
            let A = Point::mulgen(&sc(&(3 * i).to_le_bytes()));
            let u = sc(&(3 * i + 1).to_le_bytes());
            let v = sc(&(3 * i + 2).to_le_bytes());
            let R1 = u * A + Point::mulgen(&v);
            let R2 = A.mul_add_mulgen_vartime(&u, &v);
            assert!(R1.equals(R2) == 0xFFFFFFFF);

            let gtab = Point::BASE.odd_multiples(64);
            let mut R3 = A;
            R3.set_mul_add_mulgen_with_vartime(&u, &v, &gtab, 8);
            assert!(R1.equals(R3) == 0xFFFFFFFF);
        }
        let A = Point::BASE;
        let R = A.mul_add_mulgen_vartime(&Scalar::ONE, &Scalar::MINUS_ONE);
        assert!(R.isneutral() == 0xFFFFFFFF);
    }

    #[test]
    fn lift() {
        let (P, r) = Point::lift_x(FieldElement::ZERO, 0);
        assert!(r == 0 && P.isneutral() == 0xFFFFFFFF);
        let x = Point::BASE.to_affine().x();
        let (P, r) = Point::lift_x(x, 0);
        assert!(r == 0xFFFFFFFF);
        assert!(P.equals(Point::BASE) == 0xFFFFFFFF);
        let (P, _) = Point::lift_x(x, 0xFFFFFFFF);
        assert!(P.equals(-Point::BASE) == 0xFFFFFFFF);
    }
}
