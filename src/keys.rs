//! Private keys, public keys, X-only public keys and key pairs.
//!
//! Private keys are scalars in 1..n-1, encoded over 32 bytes (unsigned
//! big-endian, as per SEC 1). They are wiped from memory when dropped
//! and are deliberately not `Copy`.
//!
//! Public keys are non-neutral curve points. X-only public keys (BIP340)
//! are points with an even y coordinate, encoded as their x coordinate
//! alone; any public key maps to an X-only key by negating it if needed,
//! the negation being reported as a `Parity`.
//!
//! Tweaking (additive and multiplicative, plain and X-only) follows
//! BIP32 and BIP341 usage. A tweak must be a 32-byte big-endian value
//! lower than n; out-of-range tweaks, and tweaks that would yield a zero
//! key or the neutral point, are rejected with `Error::InvalidTweak`.

#![allow(non_snake_case)]

use rand_core::{CryptoRng, RngCore};
use sha2::{Sha512, Digest};
use zeroize::{Zeroize, Zeroizing};

use crate::context::Context;
use crate::point::Point;
use crate::scalar::Scalar;
use crate::Error;

/// Parity of the y coordinate of a point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    Even = 0,
    Odd = 1,
}

impl Parity {

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    // Parity from a constant-time mask; only used on public values.
    pub(crate) fn from_mask(m: u32) -> Self {
        if m != 0 { Parity::Odd } else { Parity::Even }
    }

    fn mask(self) -> u32 {
        (self as u32).wrapping_neg()
    }
}

// Decodes a tweak: 32 bytes, big-endian, lower than n (zero allowed).
fn decode_tweak(tweak: &[u8; 32]) -> Result<Scalar, Error> {
    let (t, r) = Scalar::decode32(tweak);
    if r == 0 {
        return Err(Error::InvalidTweak);
    }
    Ok(t)
}

/// A secp256k1 private key.
#[derive(Clone)]
pub struct PrivateKey {
    x: Scalar,
}

impl PrivateKey {

    /// Generates a new private key from a cryptographically secure RNG.
    pub fn generate<T: CryptoRng + RngCore>(rng: &mut T) -> Self {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let sk = Self::from_seed(&seed);
        seed.zeroize();
        sk
    }

    /// Derives a private key from a random seed.
    ///
    /// The seed must carry at least 128 bits of entropy. The derivation
    /// (SHA-512 of a fixed prefix and the seed, reduced modulo n) is not
    /// standard; store the private key, not the seed. The output is
    /// always a valid key.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut sh = Sha512::new();
        sh.update(b"secp256k1-ct keygen");
        sh.update(seed);
        let mut h = [0u8; 64];
        h.copy_from_slice(&sh.finalize());
        let mut x = Scalar::decode_reduce_wide(&h);
        h.zeroize();

        // Zero has negligible probability; it is replaced by one.
        x.set_cond(&Scalar::ONE, x.iszero());
        Self { x }
    }

    /// Decodes a private key from 32 bytes (unsigned big-endian).
    ///
    /// Fails with `InvalidScalar` if the slice does not have length 32,
    /// or if the value is zero or not lower than n. Side channels may
    /// leak whether decoding succeeded, but not the value.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let x = Scalar::decode(buf)?;
        if x.iszero() != 0 {
            return Err(Error::InvalidScalar);
        }
        Ok(Self { x })
    }

    /// Encodes this private key over 32 bytes (unsigned big-endian).
    pub fn encode(&self) -> [u8; 32] {
        self.x.encode32()
    }

    pub(crate) fn scalar(&self) -> &Scalar {
        &self.x
    }

    pub(crate) fn from_scalar(x: Scalar) -> Self {
        Self { x }
    }

    /// Computes the public key.
    pub fn public_key(&self, ctx: &Context) -> PublicKey {
        PublicKey { point: ctx.mul_gen(&self.x) }
    }

    /// Returns the negation of this key (n - x).
    pub fn negate(&self) -> Self {
        Self { x: -self.x }
    }

    /// Returns `x + tweak mod n`.
    pub fn tweak_add(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let mut t = decode_tweak(tweak)?;
        let x = self.x + t;
        t.zeroize();
        if x.iszero() != 0 {
            return Err(Error::InvalidTweak);
        }
        Ok(Self { x })
    }

    /// Returns `x * tweak mod n`; the tweak must not be zero.
    pub fn tweak_mul(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let mut t = decode_tweak(tweak)?;
        if t.iszero() != 0 {
            return Err(Error::InvalidTweak);
        }
        let x = self.x * t;
        t.zeroize();
        Ok(Self { x })
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("PrivateKey(..)")
    }
}

/// A secp256k1 public key (a non-neutral point).
#[derive(Clone, Copy, Debug)]
pub struct PublicKey {
    point: Point,
}

impl PublicKey {

    /// Decodes a public key from its compressed (33 bytes) or
    /// uncompressed (65 bytes) encoding.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let point = Point::decode(buf)?;
        Self::from_point(point)
    }

    /// Wraps a point; the neutral is rejected with `InvalidPublicKey`.
    pub fn from_point(point: Point) -> Result<Self, Error> {
        if point.isneutral() != 0 {
            return Err(Error::InvalidPublicKey);
        }
        Ok(Self { point })
    }

    pub fn from_private_key(ctx: &Context, sk: &PrivateKey) -> Self {
        sk.public_key(ctx)
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// Encodes this key in compressed format (33 bytes, first byte 0x02
    /// or 0x03).
    pub fn encode_compressed(&self) -> [u8; 33] {
        self.point.encode_compressed()
    }

    /// Encodes this key in uncompressed format (65 bytes, first byte
    /// 0x04).
    pub fn encode_uncompressed(&self) -> [u8; 65] {
        self.point.encode_uncompressed()
    }

    /// Gets the X-only key for this point, and whether the point had to
    /// be negated for that (`Parity::Odd`).
    pub fn x_only_public_key(&self) -> (XOnlyPublicKey, Parity) {
        XOnlyPublicKey::from_public_key(self)
    }

    pub fn negate(&self) -> Self {
        Self { point: -self.point }
    }

    /// Returns `P + tweak*G`.
    pub fn tweak_add(&self, ctx: &Context, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        let Q = ctx.mul_gen_add_vartime(&self.point, &Scalar::ONE, &t);
        Self::from_point(Q).map_err(|_| Error::InvalidTweak)
    }

    /// Returns `tweak*P`; the tweak must not be zero.
    pub fn tweak_mul(&self, tweak: &[u8; 32]) -> Result<Self, Error> {
        let t = decode_tweak(tweak)?;
        if t.iszero() != 0 {
            return Err(Error::InvalidTweak);
        }
        Ok(Self { point: self.point * t })
    }

    /// Adds public keys together. Fails with `InvalidPublicKey` if the
    /// list is empty or if the sum is the neutral.
    pub fn combine(keys: &[&PublicKey]) -> Result<Self, Error> {
        let mut P = Point::NEUTRAL;
        for k in keys {
            P += k.point;
        }
        Self::from_point(P)
    }

    /// Compares two public keys.
    pub fn equals(&self, other: &PublicKey) -> bool {
        self.point.equals(other.point) != 0
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for PublicKey { }

/// A BIP340 X-only public key (a point with even y).
#[derive(Clone, Copy, Debug)]
pub struct XOnlyPublicKey {
    point: Point,
}

impl XOnlyPublicKey {

    /// Decodes an X-only key (32 bytes); fails with `InvalidPublicKey`
    /// if the value is not the x coordinate of a curve point.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        Ok(Self { point: Point::decode_xonly(buf)? })
    }

    pub fn encode(&self) -> [u8; 32] {
        self.point.encode_xonly()
    }

    pub fn from_public_key(pk: &PublicKey) -> (Self, Parity) {
        let odd = pk.point.y_is_odd();
        let mut point = pk.point;
        point.set_condneg(odd);
        (Self { point }, Parity::from_mask(odd))
    }

    /// Returns the full public key (with even y).
    pub fn public_key(&self) -> PublicKey {
        PublicKey { point: self.point }
    }

    pub(crate) fn point(&self) -> Point {
        self.point
    }

    /// Computes `Q = P + tweak*G` (BIP341 key tweaking) and returns the
    /// X-only key of Q with the parity of its y coordinate.
    pub fn tweak_add(&self, ctx: &Context, tweak: &[u8; 32])
        -> Result<(XOnlyPublicKey, Parity), Error>
    {
        let Q = self.public_key().tweak_add(ctx, tweak)?;
        Ok(Q.x_only_public_key())
    }

    /// Checks that `tweaked` with parity `parity` is the result of
    /// tweaking this key with `tweak`.
    pub fn tweak_add_check(&self, ctx: &Context, tweaked: &XOnlyPublicKey,
        parity: Parity, tweak: &[u8; 32]) -> bool
    {
        match self.tweak_add(ctx, tweak) {
            Ok((q, p)) => p == parity && q.equals(tweaked),
            Err(_) => false,
        }
    }

    pub fn equals(&self, other: &XOnlyPublicKey) -> bool {
        self.point.equals(other.point) != 0
    }
}

impl PartialEq for XOnlyPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for XOnlyPublicKey { }

/// A private key with its public key.
#[derive(Clone, Debug)]
pub struct Keypair {
    sk: PrivateKey,
    pk: PublicKey,
}

impl Keypair {

    pub fn new(ctx: &Context, sk: PrivateKey) -> Self {
        let pk = sk.public_key(ctx);
        Self { sk, pk }
    }

    /// Decodes the private key (32 bytes) and computes the public key.
    pub fn decode(ctx: &Context, buf: &[u8]) -> Result<Self, Error> {
        Ok(Self::new(ctx, PrivateKey::decode(buf)?))
    }

    pub fn from_seed(ctx: &Context, seed: &[u8]) -> Self {
        Self::new(ctx, PrivateKey::from_seed(seed))
    }

    pub fn generate<T: CryptoRng + RngCore>(ctx: &Context, rng: &mut T) -> Self {
        Self::new(ctx, PrivateKey::generate(rng))
    }

    pub fn secret_key(&self) -> &PrivateKey {
        &self.sk
    }

    pub fn public_key(&self) -> PublicKey {
        self.pk
    }

    pub fn x_only_public_key(&self) -> (XOnlyPublicKey, Parity) {
        self.pk.x_only_public_key()
    }

    /// BIP341 tweaking of the key pair: the private key is first negated
    /// if the public key has an odd y, then the tweak is added.
    pub fn tweak_add_xonly(&self, ctx: &Context, tweak: &[u8; 32])
        -> Result<Self, Error>
    {
        let (_, parity) = self.x_only_public_key();
        let mut d = Zeroizing::new(*self.sk.scalar());
        d.set_condneg(parity.mask());
        let sk = PrivateKey::from_scalar(*d).tweak_add(tweak)?;
        Ok(Self::new(ctx, sk))
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::test_util::DRNG;

    #[test]
    fn keypair_vectors() {
        // Uncompressed, with the context randomized by the key itself.
        let skb = hex::decode(
            "14E4A74438858920D8A35FB2D88677580B6A2EE9BE4E711AE34EC6B396D87B5C")
            .unwrap();
        let mut ctx = Context::default();
        let seed: [u8; 32] = skb[..].try_into().unwrap();
        ctx.randomize(&seed);
        let sk = PrivateKey::decode(&skb).unwrap();
        assert_eq!(hex::encode_upper(sk.public_key(&ctx).encode_uncompressed()),
            "04734B3511150A60FC8CAC329CD5FF804555728740F2F2E98BC4242135EF5D5E4E\
             6C4918116B0866F50C46614F3015D8667FBFB058471D662A642B8EA2C9C78E8A");

        let skb = hex::decode(
            "B035FCFC6ABF660856C5F3A6F9AC51FCA897BB4E76AD9ACA3EFD40DA6B9C864B")
            .unwrap();
        let mut ctx = Context::default();
        let seed: [u8; 32] = skb[..].try_into().unwrap();
        ctx.randomize(&seed);
        let sk = PrivateKey::decode(&skb).unwrap();
        assert_eq!(hex::encode_upper(sk.public_key(&ctx).encode_compressed()),
            "02EA724B70B48B61FB87E4310871A48C65BF38BF3FDFEFE73C2B90F8F32F9C1794");

        // Raw round trip, without precomputed tables.
        let ctx = Context::new(crate::ContextFlags::NONE).unwrap();
        let skh = "7da12cc39bb4189ac72d34fc2225df5cf36aaacdcac7e5a43963299bc8d888ed";
        let sk = PrivateKey::decode(&hex::decode(skh).unwrap()).unwrap();
        assert_eq!(hex::encode(sk.encode()), skh);
        let pk = sk.public_key(&ctx);
        assert_eq!(hex::encode(pk.encode_compressed()),
            "023521df7b94248ffdf0d37f738a4792cc3932b6b1b89ef71cddde8251383b26e7");
        assert!(PublicKey::decode(&pk.encode_uncompressed()).unwrap() == pk);
    }

    #[test]
    fn private_key_decode() {
        assert!(matches!(PrivateKey::decode(&[0u8; 32]), Err(Error::InvalidScalar)));
        assert!(matches!(PrivateKey::decode(&[0xFFu8; 32]), Err(Error::InvalidScalar)));
        assert!(matches!(PrivateKey::decode(&[1u8; 31]), Err(Error::InvalidScalar)));
        let n = hex::decode(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141")
            .unwrap();
        assert!(PrivateKey::decode(&n).is_err());
        let mut nm1 = n.clone();
        nm1[31] = 0x40;
        assert!(PrivateKey::decode(&nm1).is_ok());
        assert!(matches!(PublicKey::decode(&[0x05u8; 33]), Err(Error::InvalidPublicKey)));
    }

    #[test]
    fn generate_and_seed() {
        let ctx = Context::default();
        let mut rng = DRNG::from_seed(b"keys");
        let k1 = PrivateKey::generate(&mut rng);
        let k2 = PrivateKey::generate(&mut rng);
        assert!(k1.encode() != k2.encode());
        let a = PrivateKey::from_seed(b"some seed with enough entropy");
        let b = PrivateKey::from_seed(b"some seed with enough entropy");
        assert_eq!(a.encode(), b.encode());
        assert!(a.public_key(&ctx) == b.public_key(&ctx));
        let kp = Keypair::from_seed(&ctx, b"some seed with enough entropy");
        assert!(kp.public_key() == a.public_key(&ctx));
        assert_eq!(alloc::format!("{:?}", a), "PrivateKey(..)");
    }

    #[test]
    fn tweaks() {
        let ctx = Context::default();
        let mut rng = DRNG::from_seed(b"tweaks");
        for _ in 0..10 {
            let sk = PrivateKey::generate(&mut rng);
            let pk = sk.public_key(&ctx);
            let mut t = [0u8; 32];
            rng.fill_bytes(&mut t);
            t[0] &= 0x7F;

            let sk2 = sk.tweak_add(&t).unwrap();
            assert!(sk2.public_key(&ctx) == pk.tweak_add(&ctx, &t).unwrap());
            let sk3 = sk.tweak_mul(&t).unwrap();
            assert!(sk3.public_key(&ctx) == pk.tweak_mul(&t).unwrap());
            assert!(sk.negate().public_key(&ctx) == pk.negate());

            let sum = PublicKey::combine(&[&pk, &sk2.public_key(&ctx)]).unwrap();
            let skp = PrivateKey::from_scalar(*sk.scalar() + *sk2.scalar());
            assert!(skp.public_key(&ctx) == sum);
            assert!(matches!(PublicKey::combine(&[&pk, &pk.negate()]),
                Err(Error::InvalidPublicKey)));
        }
        assert!(matches!(PublicKey::combine(&[]), Err(Error::InvalidPublicKey)));

        // Out-of-range and degenerate tweaks.
        let sk = PrivateKey::from_seed(b"t");
        let pk = sk.public_key(&ctx);
        assert!(matches!(sk.tweak_add(&[0xFFu8; 32]), Err(Error::InvalidTweak)));
        assert!(matches!(sk.tweak_mul(&[0u8; 32]), Err(Error::InvalidTweak)));
        assert!(matches!(pk.tweak_mul(&[0u8; 32]), Err(Error::InvalidTweak)));
        let neg = sk.negate().encode();
        assert!(matches!(sk.tweak_add(&neg), Err(Error::InvalidTweak)));
        assert!(matches!(pk.tweak_add(&ctx, &neg), Err(Error::InvalidTweak)));
        assert!(sk.tweak_add(&[0u8; 32]).unwrap().encode() == sk.encode());
    }

    #[test]
    fn xonly() {
        let ctx = Context::default();
        let mut rng = DRNG::from_seed(b"xonly");
        let mut seen = [false; 2];
        for _ in 0..16 {
            let kp = Keypair::generate(&ctx, &mut rng);
            let pk = kp.public_key();
            let (xo, parity) = kp.x_only_public_key();
            seen[parity.to_u8() as usize] = true;
            assert_eq!(&xo.encode()[..], &pk.encode_compressed()[1..]);
            assert_eq!(parity.to_u8() + 2, pk.encode_compressed()[0]);
            assert!(XOnlyPublicKey::decode(&xo.encode()).unwrap() == xo);
            assert!(xo.public_key().encode_compressed()[0] == 0x02);

            let mut t = [0u8; 32];
            rng.fill_bytes(&mut t);
            t[0] = 0;
            let (q, qp) = xo.tweak_add(&ctx, &t).unwrap();
            assert!(xo.tweak_add_check(&ctx, &q, qp, &t));
            let wrong = if qp == Parity::Odd { Parity::Even } else { Parity::Odd };
            assert!(!xo.tweak_add_check(&ctx, &q, wrong, &t));
            t[31] ^= 1;
            assert!(!xo.tweak_add_check(&ctx, &q, qp, &t));
            t[31] ^= 1;

            let kp2 = kp.tweak_add_xonly(&ctx, &t).unwrap();
            let (q2, qp2) = kp2.x_only_public_key();
            assert!(q2 == q && qp2 == qp);
        }
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn xonly_tweak_rejected() {
        let ctx = Context::default();
        let mut rng = DRNG::from_seed(b"xonly tweak");
        for _ in 0..4 {
            let kp = Keypair::generate(&ctx, &mut rng);
            assert_eq!(kp.tweak_add_xonly(&ctx, &[0xFF; 32]).unwrap_err(),
                Error::InvalidTweak);

            // Tweak equal to minus the even-y private key.
            let (_, parity) = kp.x_only_public_key();
            let mut d = *kp.secret_key().scalar();
            d.set_condneg(parity.mask());
            assert_eq!(kp.tweak_add_xonly(&ctx, &(-d).encode32()).unwrap_err(),
                Error::InvalidTweak);

            // The key pair itself is unchanged and still usable.
            assert!(kp.public_key() == kp.secret_key().public_key(&ctx));
        }
    }
}
