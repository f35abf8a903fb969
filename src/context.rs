//! Precomputation and blinding context.
//!
//! A `Context` holds the tables used to speed up multiplications of the
//! generator G, and the blinding state that protects fixed-base
//! multiplications against side channels:
//!
//!  - with `ContextFlags::SIGN`, a table of 52 rows of 16 affine points,
//!    row j holding `(i+1)*32^j*G` for i = 0 to 15. A multiplication
//!    `k*G` then costs 52 constant-time lookups and mixed additions, and
//!    no doubling.
//!  - with `ContextFlags::VERIFY`, the 64 odd multiples `(2*i+1)*G`,
//!    used with width-8 wNAF in variable-time double multiplications.
//!
//! A missing table never makes an operation fail: signing falls back to
//! the generic constant-time multiplication, verification to a small
//! table computed on the fly.
//!
//! Blinding: the context keeps a scalar b and the point `-b*G`;
//! `mul_gen(k)` computes `(k + b)*G + (-b*G)`. The result does not
//! depend on b. `randomize()` derives a fresh b from a caller-provided
//! seed and the previous b; a new context starts with b = 0.

#![allow(non_snake_case)]

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::hash::Rfc6979;
use crate::point::{AffinePoint, Point};
use crate::scalar::Scalar;
use crate::{Error, Vec};

/// Context creation flags; combine with `|`.
///
/// The numeric values are those of libsecp256k1, so that raw flag
/// words can be passed through `from_bits()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextFlags(u32);

impl ContextFlags {

    const TYPE_CONTEXT: u32 = 1;
    const BIT_VERIFY: u32 = 1 << 8;
    const BIT_SIGN: u32 = 1 << 9;

    /// No precomputed table.
    pub const NONE: Self = Self(Self::TYPE_CONTEXT);

    /// Precompute the table for signing and key generation.
    pub const SIGN: Self = Self(Self::TYPE_CONTEXT | Self::BIT_SIGN);

    /// Precompute the table for signature verification.
    pub const VERIFY: Self = Self(Self::TYPE_CONTEXT | Self::BIT_VERIFY);

    /// Wraps a raw flag word; it is validated by `Context::new()`.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if all flags of `other` are set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl core::ops::BitOr for ContextFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for ContextFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Width of the wNAF recoding used with the verification table.
const VERIFY_WINDOW: usize = 8;

/// Number of rows in the signing table (5-bit digits of a 256-bit
/// scalar, plus the top carry).
const GEN_ROWS: usize = 52;

/// A secp256k1 context.
///
/// The tables are immutable after creation, so a context can be shared
/// between threads; `randomize()` needs exclusive access.
#[derive(Clone)]
pub struct Context {
    flags: ContextFlags,
    gen_table: Option<Vec<[AffinePoint; 16]>>,
    verify_table: Option<Vec<AffinePoint>>,
    blind: Scalar,
    blind_init: Point,
}

impl Context {

    /// Creates a context with the requested precomputed tables.
    ///
    /// Unknown flag bits are rejected with `ContextCreationFailed`.
    pub fn new(flags: ContextFlags) -> Result<Self, Error> {
        let all = ContextFlags::TYPE_CONTEXT
            | ContextFlags::BIT_SIGN | ContextFlags::BIT_VERIFY;
        if (flags.0 & ContextFlags::TYPE_CONTEXT) == 0 || (flags.0 & !all) != 0 {
            tracing::debug!(bits = flags.0, "rejected context flags");
            return Err(Error::ContextCreationFailed);
        }

        Ok(Self::build(flags))
    }

    fn build(flags: ContextFlags) -> Self {
        let gen_table = if flags.contains(ContextFlags::SIGN) {
            Some(Self::build_gen_table())
        } else {
            None
        };
        let verify_table = if flags.contains(ContextFlags::VERIFY) {
            Some(Point::BASE.odd_multiples(1 << (VERIFY_WINDOW - 2)))
        } else {
            None
        };
        tracing::debug!(
            sign = gen_table.is_some(),
            verify = verify_table.is_some(),
            "context created");

        Self {
            flags,
            gen_table,
            verify_table,
            blind: Scalar::ZERO,
            blind_init: Point::NEUTRAL,
        }
    }

    // Row j holds (i+1)*32^j*G for i = 0 to 15.
    fn build_gen_table() -> Vec<[AffinePoint; 16]> {
        let mut pts = Vec::with_capacity(GEN_ROWS * 16);
        let mut B = Point::BASE;
        for _ in 0..GEN_ROWS {
            let mut T = B;
            for _ in 0..16 {
                pts.push(T);
                T += B;
            }
            B.set_xdouble(5);
        }
        Point::batch_to_affine(&pts)
            .chunks_exact(16)
            .map(|c| {
                let mut row = [AffinePoint::NEUTRAL; 16];
                row.copy_from_slice(c);
                row
            })
            .collect()
    }

    /// Returns the flags this context was created with.
    pub fn flags(&self) -> ContextFlags {
        self.flags
    }

    // k*G with the signing table, without blinding.
    fn mul_gen_table(tab: &[[AffinePoint; 16]], start: Point, k: &Scalar) -> Point {
        let mut sd = Point::recode_scalar(k);
        let mut P = start;
        for (row, d) in tab.iter().zip(sd.iter()) {
            P.set_add_affine(&Point::lookup_affine(row, *d));
        }
        sd.zeroize();
        P
    }

    /// Computes `k*G` (constant-time, blinded).
    pub fn mul_gen(&self, k: &Scalar) -> Point {
        let kb = Zeroizing::new(k + self.blind);
        match &self.gen_table {
            Some(tab) => Self::mul_gen_table(tab, self.blind_init, &kb),
            None => Point::mulgen(&kb) + self.blind_init,
        }
    }

    /// Computes `u*P + v*G`.
    ///
    /// NOT constant-time; for public data only (signature verification,
    /// key recovery).
    pub fn mul_gen_add_vartime(&self, P: &Point, u: &Scalar, v: &Scalar) -> Point {
        let mut R = *P;
        match &self.verify_table {
            Some(tab) => R.set_mul_add_mulgen_with_vartime(u, v, tab, VERIFY_WINDOW),
            None => R = P.mul_add_mulgen_vartime(u, v),
        }
        R
    }

    /// Refreshes the blinding state from a 32-byte seed.
    ///
    /// The new blinding scalar is derived with HMAC-DRBG from the seed
    /// and the current blinding scalar, so repeated calls accumulate
    /// entropy. Results of all operations are unchanged.
    pub fn randomize(&mut self, seed32: &[u8; 32]) {
        let mut keydata = [0u8; 64];
        keydata[..32].copy_from_slice(&self.blind.encode32());
        keydata[32..].copy_from_slice(seed32);
        let mut drbg = Rfc6979::new(&keydata);
        let mut out = drbg.generate();

        // A zero scalar (probability about 2^-256) is replaced by one.
        let mut b = Zeroizing::new(Scalar::decode_reduce(&out));
        let bz = b.iszero();
        b.set_cond(&Scalar::ONE, bz);

        let mut bG = match &self.gen_table {
            Some(tab) => Self::mul_gen_table(tab, Point::NEUTRAL, &b),
            None => Point::mulgen(&b),
        };
        self.blind = *b;
        self.blind_init = -bG;

        bG.zeroize();
        out.zeroize();
        keydata.zeroize();
        tracing::trace!("context blinding refreshed");
    }

    /// Refreshes the blinding state with a seed drawn from `rng`.
    pub fn randomize_with_rng<T: CryptoRng + RngCore>(&mut self, rng: &mut T) {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        self.randomize(&seed);
        seed.zeroize();
    }

    /// Removes blinding (b = 0), as in a freshly created context.
    pub fn reset_blinding(&mut self) {
        self.blind.zeroize();
        self.blind_init = Point::NEUTRAL;
    }

    /// Destroys this context, wiping its contents.
    pub fn destroy(self) {
        drop(self);
    }
}

impl Default for Context {

    /// A context with both the signing and the verification tables.
    fn default() -> Self {
        Self::build(ContextFlags::SIGN | ContextFlags::VERIFY)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.blind.zeroize();
        self.blind_init.zeroize();
        if let Some(tab) = self.gen_table.as_mut() {
            for row in tab.iter_mut() {
                row.zeroize();
            }
        }
        if let Some(tab) = self.verify_table.as_mut() {
            tab.zeroize();
        }
    }
}

impl core::fmt::Debug for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Context")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
