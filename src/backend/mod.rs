//! Low-level helpers for 256-bit arithmetic with 64-bit limbs.
//!
//! Both the base field (`FieldElement`) and the scalars (`Scalar`) are
//! represented as four 64-bit limbs in low-to-high order. This module
//! provides the carry-propagating primitives that they share, and a
//! macro that implements the usual operator traits (`+`, `-`, `*`, `/`
//! and their compound assignment variants) on top of in-place `set_*()`
//! functions.
//!
//! On x86-64 the `_addcarry_u64()` and `_subborrow_u64()` intrinsics are
//! used; on other architectures, plain implementations over `u128` are
//! used instead. No inline assembly is involved.

// Add with carry; carry is 0 or 1.
// (x, y, c_in) -> x + y + c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_addcarry_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _addcarry_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn addcarry_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_add(y as u128).wrapping_add(c as u128);
    (z as u64, (z >> 64) as u8)
}

// Subtract with borrow; borrow is 0 or 1.
// (x, y, c_in) -> x - y - c_in mod 2^64, c_out

#[cfg(target_arch = "x86_64")]
#[inline(always)]
pub(crate) fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    use core::arch::x86_64::_subborrow_u64;
    unsafe {
        let mut d = 0u64;
        let cc = _subborrow_u64(c, x, y, &mut d);
        (d, cc)
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
pub(crate) const fn subborrow_u64(x: u64, y: u64, c: u8) -> (u64, u8) {
    let z = (x as u128).wrapping_sub(y as u128).wrapping_sub(c as u128);
    (z as u64, (z >> 127) as u8)
}

// Compute x*y over 128 bits, returned as two 64-bit words (lo, hi)
#[inline(always)]
pub(crate) const fn umull(x: u64, y: u64) -> (u64, u64) {
    let z = (x as u128) * (y as u128);
    (z as u64, (z >> 64) as u64)
}

// Compute x*y+z1+z2 over 128 bits, returned as two 64-bit words (lo, hi).
// This cannot overflow: (2^64-1)^2 + 2*(2^64-1) = 2^128-1.
#[inline(always)]
pub(crate) const fn umull_add2(x: u64, y: u64, z1: u64, z2: u64) -> (u64, u64) {
    let t = ((x as u128) * (y as u128))
        .wrapping_add(z1 as u128).wrapping_add(z2 as u128);
    (t as u64, (t >> 64) as u64)
}

// Full 256x256->512 product, schoolbook, low-to-high limbs.
#[inline]
pub(crate) fn mul256x256(a: &[u64; 4], b: &[u64; 4]) -> [u64; 8] {
    let mut e = [0u64; 8];
    for i in 0..4 {
        let mut hi = 0u64;
        for j in 0..4 {
            let (lo, h) = umull_add2(a[i], b[j], e[i + j], hi);
            e[i + j] = lo;
            hi = h;
        }
        e[i + 4] = hi;
    }
    e
}

// Read a 256-bit big-endian integer into limbs (low-to-high order).
#[inline]
pub(crate) fn limbs_from_be(buf: &[u8; 32]) -> [u64; 4] {
    let mut d = [0u64; 4];
    for i in 0..4 {
        let mut w = [0u8; 8];
        w.copy_from_slice(&buf[(24 - 8 * i)..(32 - 8 * i)]);
        d[i] = u64::from_be_bytes(w);
    }
    d
}

// Write limbs (low-to-high order) as a 256-bit big-endian integer.
#[inline]
pub(crate) fn limbs_to_be(d: &[u64; 4]) -> [u8; 32] {
    let mut buf = [0u8; 32];
    for i in 0..4 {
        buf[(24 - 8 * i)..(32 - 8 * i)].copy_from_slice(&d[i].to_be_bytes());
    }
    buf
}

// Returns 0xFFFFFFFF if x != 0, 0 otherwise.
#[inline(always)]
pub(crate) const fn nonzero_mask(x: u64) -> u32 {
    (((x | x.wrapping_neg()) >> 63) as u32).wrapping_neg()
}

// Implements the operator traits on a type that provides the in-place
// functions set_add(), set_sub(), set_mul(), set_neg() and set_div().
// All combinations of values and references are covered.
macro_rules! impl_arith_ops {
    ($t:ty) => {
        $crate::backend::impl_arith_ops!(@bin $t, Add, add, AddAssign, add_assign, set_add);
        $crate::backend::impl_arith_ops!(@bin $t, Sub, sub, SubAssign, sub_assign, set_sub);
        $crate::backend::impl_arith_ops!(@bin $t, Mul, mul, MulAssign, mul_assign, set_mul);
        $crate::backend::impl_arith_ops!(@bin $t, Div, div, DivAssign, div_assign, set_div);

        impl core::ops::Neg for $t {
            type Output = $t;

            #[inline(always)]
            fn neg(self) -> $t {
                let mut r = self;
                r.set_neg();
                r
            }
        }

        impl core::ops::Neg for &$t {
            type Output = $t;

            #[inline(always)]
            fn neg(self) -> $t {
                let mut r = *self;
                r.set_neg();
                r
            }
        }
    };

    (@bin $t:ty, $tr:ident, $f:ident, $tra:ident, $fa:ident, $set:ident) => {
        impl core::ops::$tr<$t> for $t {
            type Output = $t;

            #[inline(always)]
            fn $f(self, other: $t) -> $t {
                let mut r = self;
                r.$set(&other);
                r
            }
        }

        impl core::ops::$tr<&$t> for $t {
            type Output = $t;

            #[inline(always)]
            fn $f(self, other: &$t) -> $t {
                let mut r = self;
                r.$set(other);
                r
            }
        }

        impl core::ops::$tr<$t> for &$t {
            type Output = $t;

            #[inline(always)]
            fn $f(self, other: $t) -> $t {
                let mut r = *self;
                r.$set(&other);
                r
            }
        }

        impl core::ops::$tr<&$t> for &$t {
            type Output = $t;

            #[inline(always)]
            fn $f(self, other: &$t) -> $t {
                let mut r = *self;
                r.$set(other);
                r
            }
        }

        impl core::ops::$tra<$t> for $t {
            #[inline(always)]
            fn $fa(&mut self, other: $t) {
                self.$set(&other);
            }
        }

        impl core::ops::$tra<&$t> for $t {
            #[inline(always)]
            fn $fa(&mut self, other: &$t) {
                self.$set(other);
            }
        }
    };
}

pub(crate) use impl_arith_ops;
