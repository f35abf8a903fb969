//! ECDH key exchange.
//!
//! The shared point `S = d*Q` is computed in constant time. By default,
//! the shared secret is the SHA-256 of the compressed encoding of S
//! (0x02 or 0x03 followed by the x coordinate), as in libsecp256k1; a
//! custom function of the x and y coordinates can be used instead.

#![allow(non_snake_case)]

use zeroize::Zeroize;

use crate::context::Context;
use crate::hash::Sha256;
use crate::keys::{PrivateKey, PublicKey};
use crate::Error;

/// An ECDH shared secret (32 bytes), wiped when dropped.
#[derive(Clone)]
pub struct SharedSecret([u8; 32]);

impl SharedSecret {

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for SharedSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl core::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

fn default_hash(x: &[u8; 32], y: &[u8; 32]) -> [u8; 32] {
    let mut sh = Sha256::new();
    sh.update([0x02 | (y[31] & 1)]);
    sh.update(x);
    sh.finalize()
}

impl Context {

    /// Computes the shared secret between private key `sk` and peer
    /// public key `pk`, with the default hash.
    pub fn ecdh(&self, sk: &PrivateKey, pk: &PublicKey)
        -> Result<SharedSecret, Error>
    {
        self.ecdh_with_hash(sk, pk, default_hash)
    }

    /// Computes the shared secret with a custom function of the
    /// coordinates (32-byte big-endian x and y) of the shared point.
    pub fn ecdh_with_hash<F>(&self, sk: &PrivateKey, pk: &PublicKey, hashfp: F)
        -> Result<SharedSecret, Error>
        where F: FnOnce(&[u8; 32], &[u8; 32]) -> [u8; 32]
    {
        let mut S = pk.point() * sk.scalar();
        if S.isneutral() != 0 {
            return Err(Error::InvalidPublicKey);
        }
        let mut A = S.to_affine();
        let mut x = A.x().encode32();
        let mut y = A.y().encode32();
        let out = SharedSecret(hashfp(&x, &y));
        x.zeroize();
        y.zeroize();
        A.zeroize();
        S.zeroize();
        Ok(out)
    }

    /// Same as `ecdh()`, with the peer public key given in encoded form
    /// (compressed or uncompressed); a bad encoding fails with
    /// `InvalidPublicKey`.
    pub fn ecdh_encoded(&self, sk: &PrivateKey, pk: &[u8])
        -> Result<SharedSecret, Error>
    {
        self.ecdh(sk, &PublicKey::decode(pk)?)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::test_util::DRNG;

    #[test]
    fn ecdh_vector() {
        let ctx = Context::default();
        let a = PrivateKey::decode(&hex::decode(
            "5f6d5afecc677d66fb3d41eee7a8ad8195659ceff588edaf416a9a17daf38fdd")
            .unwrap()).unwrap();
        let b = PrivateKey::decode(&hex::decode(
            "7da12cc39bb4189ac72d34fc2225df5cf36aaacdcac7e5a43963299bc8d888ed")
            .unwrap()).unwrap();
        let pb = hex::decode(
            "023521df7b94248ffdf0d37f738a4792cc3932b6b1b89ef71cddde8251383b26e7")
            .unwrap();
        let ss = ctx.ecdh_encoded(&a, &pb).unwrap();
        assert_eq!(hex::encode(&ss),
            "fa760b15fbcf75b8454b7f19a9951661c903a4ff7f1de27d9c82f39645fdbb1b");
        let ss2 = ctx.ecdh(&b, &a.public_key(&ctx)).unwrap();
        assert_eq!(ss.to_bytes(), ss2.to_bytes());

        // SHA-256 over x || y.
        let ss3 = ctx.ecdh_with_hash(&a, &b.public_key(&ctx), |x, y| {
            let mut sh = Sha256::new();
            sh.update(x);
            sh.update(y);
            sh.finalize()
        }).unwrap();
        assert_eq!(hex::encode(ss3),
            "62640bf582878a4f5fd636c1475bc4d59b335eafb00718782652f61c1854a918");

        assert_eq!(ctx.ecdh_encoded(&a, &pb[..32]).unwrap_err(),
            Error::InvalidPublicKey);
        assert_eq!(alloc::format!("{:?}", ss), "SharedSecret(..)");
    }

    #[test]
    fn ecdh_symmetry() {
        let ctx = Context::default();
        let mut rng = DRNG::from_seed(b"ecdh");
        for _ in 0..10 {
            let a = PrivateKey::generate(&mut rng);
            let b = PrivateKey::generate(&mut rng);
            let pa = a.public_key(&ctx);
            let pb = b.public_key(&ctx);
            let s1 = ctx.ecdh(&a, &pb).unwrap();
            let s2 = ctx.ecdh(&b, &pa).unwrap();
            assert_eq!(s1.to_bytes(), s2.to_bytes());
            let s3 = ctx.ecdh_encoded(&b, &pa.encode_uncompressed()).unwrap();
            assert_eq!(s1.to_bytes(), s3.to_bytes());

            // The custom hash sees the same point from both sides.
            let raw = |x: &[u8; 32], _: &[u8; 32]| *x;
            assert_eq!(ctx.ecdh_with_hash(&a, &pb, raw).unwrap().to_bytes(),
                ctx.ecdh_with_hash(&b, &pa, raw).unwrap().to_bytes());
        }
    }
}
