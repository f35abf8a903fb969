//! ECDSA signatures over secp256k1.
//!
//! Signing uses deterministic nonces (RFC 6979 with HMAC-SHA256, seeded
//! with the private key, the digest reduced modulo n, and optional extra
//! data), and always produces low-S signatures (s <= n/2). Verification
//! rejects high-S signatures; callers that accept malleable input should
//! first call `Signature::normalize_s()`.
//!
//! Signatures can be encoded in DER (strict: minimal integers, no
//! trailing data) or in the 64-byte compact format (r and s over 32
//! bytes each, big-endian). Recoverable signatures carry a recovery id
//! (0 to 3): bit 0 is the parity of the y coordinate of R, bit 1 is set
//! when the x coordinate of R was not lower than n.

#![allow(non_snake_case)]

use zeroize::Zeroize;

use crate::context::Context;
use crate::field::FieldElement;
use crate::hash::Rfc6979;
use crate::keys::{PrivateKey, PublicKey};
use crate::point::Point;
use crate::scalar::Scalar;
use crate::Error;

/// Maximum number of candidate nonces tried by a signing operation.
/// Each rejection has probability about 2^-128, so this bound is never
/// reached with a working hash function.
pub const MAX_NONCE_ATTEMPTS: usize = 16;

// The curve order n as a field element (n < p).
const N_FIELD: FieldElement = FieldElement::w64be(
    0xFFFFFFFFFFFFFFFF, 0xFFFFFFFFFFFFFFFE,
    0xBAAEDCE6AF48A03B, 0xBFD25E8CD0364141);

// p - n, big-endian; r + n is a valid x coordinate only if r < p - n.
const P_MINUS_N: [u8; 32] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
    0x45, 0x51, 0x23, 0x19, 0x50, 0xB7, 0x5F, 0xC4,
    0x40, 0x2D, 0xA1, 0x72, 0x2F, 0xC9, 0xBA, 0xEE,
];

/// An ECDSA signature (r, s).
#[derive(Clone, Copy, Debug)]
pub struct Signature {
    r: Scalar,
    s: Scalar,
}

/// A DER-encoded signature (at most 72 bytes).
#[derive(Clone, Copy, Debug)]
pub struct DerSignature {
    buf: [u8; 72],
    len: usize,
}

impl DerSignature {

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for DerSignature {
    fn as_ref(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

// Appends a DER INTEGER holding the 32-byte big-endian value v.
fn der_put_int(out: &mut [u8; 72], off: usize, v: &[u8; 32]) -> usize {
    let mut i = 0;
    while i < 31 && v[i] == 0 {
        i += 1;
    }
    let pad = (v[i] >> 7) as usize;
    let len = 32 - i + pad;
    out[off] = 0x02;
    out[off + 1] = len as u8;
    out[off + 2] = 0x00;
    out[(off + 2 + pad)..(off + 2 + len)].copy_from_slice(&v[i..]);
    off + 2 + len
}

// Parses a DER INTEGER at the start of buf; returns the value (with any
// sign byte removed) and the remaining data.
fn der_get_int(buf: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    if buf.len() < 2 || buf[0] != 0x02 {
        return Err(Error::InvalidSignatureEncoding);
    }
    let len = buf[1] as usize;
    if len == 0 || len >= 0x80 || buf.len() < 2 + len {
        return Err(Error::InvalidSignatureEncoding);
    }
    let (v, rest) = buf[2..].split_at(len);

    // Negative values and non-minimal encodings.
    if v[0] & 0x80 != 0 {
        return Err(Error::InvalidSignatureEncoding);
    }
    if v[0] == 0x00 && len > 1 && v[1] & 0x80 == 0 {
        return Err(Error::InvalidSignatureEncoding);
    }
    let v = if v[0] == 0x00 && len > 1 { &v[1..] } else { v };
    Ok((v, rest))
}

// Decodes a DER integer value into a scalar; values >= n are rejected.
fn der_scalar(v: &[u8]) -> Result<Scalar, Error> {
    if v.len() > 32 {
        return Err(Error::InvalidSignature);
    }
    let mut tmp = [0u8; 32];
    tmp[(32 - v.len())..].copy_from_slice(v);
    let (x, r) = Scalar::decode32(&tmp);
    if r == 0 {
        return Err(Error::InvalidSignature);
    }
    Ok(x)
}

impl Signature {

    /// Builds a signature from its two scalars.
    pub fn from_scalars(r: Scalar, s: Scalar) -> Self {
        Self { r, s }
    }

    pub fn r(&self) -> Scalar {
        self.r
    }

    pub fn s(&self) -> Scalar {
        self.s
    }

    /// Decodes a 64-byte compact signature (r || s, big-endian).
    ///
    /// A wrong length fails with `InvalidSignatureEncoding`; r or s not
    /// lower than n fails with `InvalidSignature`. Zero values are
    /// accepted here and rejected by verification.
    pub fn from_compact(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() != 64 {
            return Err(Error::InvalidSignatureEncoding);
        }
        let mut tmp = [0u8; 32];
        tmp.copy_from_slice(&buf[..32]);
        let (r, rr) = Scalar::decode32(&tmp);
        tmp.copy_from_slice(&buf[32..]);
        let (s, rs) = Scalar::decode32(&tmp);
        if (rr & rs) == 0 {
            tracing::debug!("compact signature value out of range");
            return Err(Error::InvalidSignature);
        }
        Ok(Self { r, s })
    }

    /// Encodes this signature in compact format (64 bytes).
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.encode32());
        out[32..].copy_from_slice(&self.s.encode32());
        out
    }

    /// Decodes a strict DER signature: `SEQUENCE { INTEGER r, INTEGER s }`
    /// with minimal-length lengths and integers and no trailing bytes.
    pub fn from_der(buf: &[u8]) -> Result<Self, Error> {
        let r = Self::from_der_inner(buf);
        if let Err(e) = r {
            tracing::debug!(len = buf.len(), error = %e, "DER signature rejected");
        }
        r
    }

    fn from_der_inner(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < 2 || buf[0] != 0x30 {
            return Err(Error::InvalidSignatureEncoding);
        }
        let len = buf[1] as usize;
        if len >= 0x80 || buf.len() != 2 + len {
            return Err(Error::InvalidSignatureEncoding);
        }
        let (rv, rest) = der_get_int(&buf[2..])?;
        let (sv, rest) = der_get_int(rest)?;
        if !rest.is_empty() {
            return Err(Error::InvalidSignatureEncoding);
        }
        Ok(Self { r: der_scalar(rv)?, s: der_scalar(sv)? })
    }

    /// Encodes this signature in DER.
    pub fn to_der(&self) -> DerSignature {
        let mut buf = [0u8; 72];
        let off = der_put_int(&mut buf, 2, &self.r.encode32());
        let off = der_put_int(&mut buf, off, &self.s.encode32());
        buf[0] = 0x30;
        buf[1] = (off - 2) as u8;
        DerSignature { buf, len: off }
    }

    /// Returns true if s <= n/2.
    pub fn is_low_s(&self) -> bool {
        self.s.is_high() == 0
    }

    /// Replaces s with n - s if s > n/2. Returns true if the signature
    /// was modified.
    pub fn normalize_s(&mut self) -> bool {
        let high = self.s.is_high();
        self.s.set_condneg(high);
        high != 0
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        (self.r.equals(other.r) & self.s.equals(other.s)) != 0
    }
}

impl Eq for Signature { }

/// Recovery id of a recoverable signature (0 to 3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoveryId(u8);

impl RecoveryId {

    /// Fails with `InvalidRecoveryId` if the value is not in 0..=3.
    pub fn from_u8(id: u8) -> Result<Self, Error> {
        if id > 3 {
            return Err(Error::InvalidRecoveryId);
        }
        Ok(Self(id))
    }

    pub fn from_i32(id: i32) -> Result<Self, Error> {
        match u8::try_from(id) {
            Ok(b) => Self::from_u8(b),
            Err(_) => Err(Error::InvalidRecoveryId),
        }
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    pub fn to_i32(self) -> i32 {
        self.0 as i32
    }
}

/// A signature with its recovery id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    sig: Signature,
    id: RecoveryId,
}

impl RecoverableSignature {

    pub fn new(sig: Signature, id: RecoveryId) -> Self {
        Self { sig, id }
    }

    /// Decodes a compact signature (64 bytes) with its recovery id.
    pub fn from_compact(buf: &[u8], id: RecoveryId) -> Result<Self, Error> {
        Ok(Self { sig: Signature::from_compact(buf)?, id })
    }

    pub fn to_compact(&self) -> ([u8; 64], RecoveryId) {
        (self.sig.to_compact(), self.id)
    }

    pub fn recovery_id(&self) -> RecoveryId {
        self.id
    }

    /// Drops the recovery id.
    pub fn to_standard(&self) -> Signature {
        self.sig
    }
}

impl Context {

    fn sign_ecdsa_inner(&self, sk: &PrivateKey, digest: &[u8; 32],
        extra: Option<&[u8; 32]>) -> Result<(Signature, RecoveryId), Error>
    {
        let x = sk.scalar();
        let z = Scalar::decode_reduce(digest);

        let mut keydata = [0u8; 96];
        keydata[..32].copy_from_slice(&x.encode32());
        keydata[32..64].copy_from_slice(&z.encode32());
        let klen = match extra {
            Some(e) => {
                keydata[64..].copy_from_slice(e);
                96
            }
            None => 64,
        };
        let mut drbg = Rfc6979::new(&keydata[..klen]);
        keydata.zeroize();
        self.sign_with_nonces(x, &z, || drbg.generate())
    }

    // Tries successive 32-byte nonce candidates from `next_nonce`, at
    // most MAX_NONCE_ATTEMPTS of them.
    fn sign_with_nonces<F>(&self, x: &Scalar, z: &Scalar, mut next_nonce: F)
        -> Result<(Signature, RecoveryId), Error>
        where F: FnMut() -> [u8; 32]
    {
        for attempt in 0..MAX_NONCE_ATTEMPTS {
            let mut kb = next_nonce();
            let (mut k, kr) = Scalar::decode32(&kb);
            kb.zeroize();
            if (kr & !k.iszero()) == 0 {
                tracing::debug!(attempt, "nonce out of range, retrying");
                continue;
            }

            let R = self.mul_gen(&k).to_affine();
            let (r, overflow) = Scalar::reduce32(&R.x().encode32());
            let mut id = ((R.y().is_odd() & 1) | (overflow & 2)) as u8;

            let mut t = z + r * x;
            let mut s = t / k;
            t.zeroize();
            k.zeroize();
            if (r.iszero() | s.iszero()) != 0 {
                s.zeroize();
                tracing::debug!(attempt, "zero signature value, retrying");
                continue;
            }

            let high = s.is_high();
            s.set_condneg(high);
            id ^= (high & 1) as u8;
            return Ok((Signature { r, s }, RecoveryId(id)));
        }
        tracing::debug!(attempts = MAX_NONCE_ATTEMPTS, "no valid nonce found");
        Err(Error::SigningFailed)
    }

    /// Signs a 32-byte digest. The output is deterministic and low-S.
    pub fn sign_ecdsa(&self, sk: &PrivateKey, digest: &[u8; 32])
        -> Result<Signature, Error>
    {
        Ok(self.sign_ecdsa_inner(sk, digest, None)?.0)
    }

    /// Signs a 32-byte digest, with 32 bytes of extra data mixed into the
    /// nonce derivation (as extra entropy or to obtain a distinct
    /// signature).
    pub fn sign_ecdsa_with_noncedata(&self, sk: &PrivateKey, digest: &[u8; 32],
        extra: &[u8; 32]) -> Result<Signature, Error>
    {
        Ok(self.sign_ecdsa_inner(sk, digest, Some(extra))?.0)
    }

    /// Signs a 32-byte digest and returns the signature with its
    /// recovery id.
    pub fn sign_ecdsa_recoverable(&self, sk: &PrivateKey, digest: &[u8; 32])
        -> Result<RecoverableSignature, Error>
    {
        let (sig, id) = self.sign_ecdsa_inner(sk, digest, None)?;
        Ok(RecoverableSignature { sig, id })
    }

    /// Verifies a signature on a 32-byte digest.
    ///
    /// Signatures with r = 0, s = 0 or s > n/2 are rejected. This
    /// function is NOT constant-time; it handles only public data.
    pub fn verify_ecdsa(&self, pk: &PublicKey, digest: &[u8; 32],
        sig: &Signature) -> bool
    {
        if (sig.r.iszero() | sig.s.iszero()) != 0 {
            return false;
        }
        if sig.s.is_high() != 0 {
            tracing::debug!("high-S signature rejected");
            return false;
        }
        let z = Scalar::decode_reduce(digest);
        let w = sig.s.invert();
        let R = self.mul_gen_add_vartime(&pk.point(), &(sig.r * w), &(z * w));
        if R.isneutral() != 0 {
            return false;
        }
        let (xr, _) = Scalar::reduce32(&R.to_affine().x().encode32());
        xr.equals(sig.r) != 0
    }

    /// Recovers the public key from a recoverable signature on a 32-byte
    /// digest. Fails with `RecoveryFailed` if no valid key matches.
    ///
    /// This function is NOT constant-time.
    pub fn recover_ecdsa(&self, sig: &RecoverableSignature, digest: &[u8; 32])
        -> Result<PublicKey, Error>
    {
        let r = self.recover_inner(sig, digest);
        if r.is_err() {
            tracing::debug!(id = sig.id.0, "public key recovery failed");
        }
        r
    }

    fn recover_inner(&self, sig: &RecoverableSignature, digest: &[u8; 32])
        -> Result<PublicKey, Error>
    {
        let Signature { r, s } = sig.sig;
        if (r.iszero() | s.iszero()) != 0 {
            return Err(Error::RecoveryFailed);
        }

        // Rebuild R from r, the parity bit and the overflow bit.
        let rb = r.encode32();
        let (mut x, _) = FieldElement::decode32(&rb);
        if sig.id.0 & 2 != 0 {
            if rb >= P_MINUS_N {
                return Err(Error::RecoveryFailed);
            }
            x += N_FIELD;
        }
        let odd = ((sig.id.0 & 1) as u32).wrapping_neg();
        let (R, ok) = Point::lift_x(x, odd);
        if ok == 0 {
            return Err(Error::RecoveryFailed);
        }

        // Q = r^-1 * (s*R - z*G)
        let z = Scalar::decode_reduce(digest);
        let ri = r.invert();
        let Q = self.mul_gen_add_vartime(&R, &(s * ri), &-(z * ri));
        PublicKey::from_point(Q).map_err(|_| Error::RecoveryFailed)
    }
}
