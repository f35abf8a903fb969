//! BIP340 Schnorr signatures.
//!
//! Public keys are X-only (see `XOnlyPublicKey`), signatures are 64
//! bytes (the x coordinate of R, then s). Messages have arbitrary length.
//! Nonces are derived from the private key, the public key, the message
//! and 32 bytes of auxiliary randomness; without auxiliary randomness,
//! 32 zero bytes are used, which keeps signatures deterministic.

#![allow(non_snake_case)]

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::context::Context;
use crate::field::FieldElement;
use crate::hash::Sha256;
use crate::keys::{Keypair, XOnlyPublicKey};
use crate::scalar::Scalar;
use crate::Error;

/// A BIP340 signature (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {

    /// Decodes a signature; only the length is checked here, value
    /// ranges are checked by verification.
    pub fn decode(buf: &[u8]) -> Result<Self, Error> {
        let sig: [u8; 64] = buf.try_into()
            .map_err(|_| Error::InvalidSignatureEncoding)?;
        Ok(Self(sig))
    }

    pub fn from_bytes(sig: [u8; 64]) -> Self {
        Self(sig)
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// e = H_challenge(R.x || P.x || m) mod n
fn challenge(rx: &[u8], px: &[u8; 32], msg: &[u8]) -> Scalar {
    let mut sh = Sha256::bip340_challenge();
    sh.update(rx);
    sh.update(px);
    sh.update(msg);
    Scalar::decode_reduce(&sh.finalize())
}

impl Context {

    /// Signs a message with BIP340.
    ///
    /// `aux` is the auxiliary randomness; `None` is the same as 32 zero
    /// bytes. Fails with `SigningFailed` only if the derived nonce is
    /// zero (probability about 2^-256).
    pub fn sign_schnorr(&self, kp: &Keypair, msg: &[u8], aux: Option<&[u8; 32]>)
        -> Result<Signature, Error>
    {
        let P = kp.public_key().point();
        let px = P.encode_xonly();

        // Use the private key matching the even-y public key.
        let mut d = Zeroizing::new(*kp.secret_key().scalar());
        d.set_condneg(P.y_is_odd());

        let mut sh = Sha256::bip340_aux();
        sh.update(aux.unwrap_or(&[0u8; 32]));
        let mut t = sh.finalize();
        let mut db = d.encode32();
        for (ti, di) in t.iter_mut().zip(db.iter()) {
            *ti ^= *di;
        }
        db.zeroize();

        let mut sh = Sha256::bip340_nonce();
        sh.update(t);
        sh.update(px);
        sh.update(msg);
        let mut rand = sh.finalize();
        t.zeroize();
        let mut k = Zeroizing::new(Scalar::decode_reduce(&rand));
        rand.zeroize();
        if k.iszero() != 0 {
            tracing::debug!("zero Schnorr nonce");
            return Err(Error::SigningFailed);
        }

        let R = self.mul_gen(&k);
        k.set_condneg(R.y_is_odd());
        let rx = R.encode_xonly();
        let e = challenge(&rx, &px, msg);
        let s = *k + e * *d;

        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&rx);
        sig[32..].copy_from_slice(&s.encode32());
        Ok(Signature(sig))
    }

    /// Signs a message with BIP340, with auxiliary randomness drawn from
    /// `rng`.
    pub fn sign_schnorr_with_rng<T: CryptoRng + RngCore>(&self, kp: &Keypair,
        msg: &[u8], rng: &mut T) -> Result<Signature, Error>
    {
        let mut aux = [0u8; 32];
        rng.fill_bytes(&mut aux);
        let sig = self.sign_schnorr(kp, msg, Some(&aux));
        aux.zeroize();
        sig
    }

    /// Verifies a BIP340 signature.
    ///
    /// This function is NOT constant-time; it handles only public data.
    pub fn verify_schnorr(&self, pk: &XOnlyPublicKey, msg: &[u8],
        sig: &Signature) -> bool
    {
        let mut rb = [0u8; 32];
        rb.copy_from_slice(&sig.0[..32]);
        let (r, okr) = FieldElement::decode32(&rb);
        let mut sb = [0u8; 32];
        sb.copy_from_slice(&sig.0[32..]);
        let (s, oks) = Scalar::decode32(&sb);
        if (okr & oks) == 0 {
            return false;
        }

        let P = pk.point();
        let e = challenge(&rb, &P.encode_xonly(), msg);

        // R = s*G - e*P
        let R = self.mul_gen_add_vartime(&P, &-e, &s);
        if R.isneutral() != 0 || R.y_is_odd() != 0 {
            return false;
        }
        R.to_affine().x().equals(r) != 0
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::test_util::DRNG;
    use crate::{ContextFlags, PrivateKey};

    fn check_vector(ctx: &Context, skh: &str, pkh: &str, auxh: &str,
        msgh: &str, sigh: &str)
    {
        let kp = Keypair::decode(ctx, &hex::decode(skh).unwrap()).unwrap();
        let (xo, _) = kp.x_only_public_key();
        assert_eq!(hex::encode_upper(xo.encode()), pkh);
        let mut aux = [0u8; 32];
        aux.copy_from_slice(&hex::decode(auxh).unwrap());
        let msg = hex::decode(msgh).unwrap();
        let sig = ctx.sign_schnorr(&kp, &msg, Some(&aux)).unwrap();
        assert_eq!(hex::encode_upper(sig), sigh);
        let pk = XOnlyPublicKey::decode(&hex::decode(pkh).unwrap()).unwrap();
        assert!(ctx.verify_schnorr(&pk, &msg, &sig));
    }

    #[test]
    fn bip340_vectors() {
        let ctx = Context::default();
        check_vector(&ctx,
            "0000000000000000000000000000000000000000000000000000000000000003",
            "F9308A019258C31049344F85F89D5229B531C845836F99B08601F113BCE036F9",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "E907831F80848D1069A5371B402410364BDF1C5F8307B0084C55F1CE2DCA8215\
             25F66A4A85EA8B71E482A74F382D2CE5EBEEE8FDB2172F477DF4900D310536C0");
        check_vector(&ctx,
            "B7E151628AED2A6ABF7158809CF4F3C762E7160F38B4DA56A784D9045190CFEF",
            "DFF1D77F2A671C5F36183726DB2341BE58FEAE1DA2DECED843240F7B502BA659",
            "0000000000000000000000000000000000000000000000000000000000000001",
            "243F6A8885A308D313198A2E03707344A4093822299F31D0082EFA98EC4E6C89",
            "6896BD60EEAE296DB48A229FF71DFE071BDE413E6D43F917DC8DCF8C78DE3341\
             8906D11AC976ABCCB20B091292BFF4EA897EFCB639EA871CFA95F6DE339E4B0A");

        // Empty and 17-byte messages.
        check_vector(&ctx,
            "0340034003400340034003400340034003400340034003400340034003400340",
            "778CAA53B4393AC467774D09497A87224BF9FAB6F6E68B23086497324D6FD117",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "",
            "71535DB165ECD9FBBC046E5FFAEA61186BB6AD436732FCCC25291A55895464CF\
             6069CE26BF03466228F19A3A62DB8A649F2D560FAC652827D1AF0574E427AB63");
        check_vector(&ctx,
            "0340034003400340034003400340034003400340034003400340034003400340",
            "778CAA53B4393AC467774D09497A87224BF9FAB6F6E68B23086497324D6FD117",
            "0000000000000000000000000000000000000000000000000000000000000000",
            "000102030405060708090A0B0C0D0E0F10",
            "64EB15157C712DCB81320BF0DA2FB6F3EBB773440C9A18ED65256A8D7E76C2E4\
             2DC4B53D315B32051BF274729437174F7BACA25090EF2067D09F7636ABF9C4A8");

        // Public key not on the curve.
        assert_eq!(XOnlyPublicKey::decode(&hex::decode(
            "EEFDEA4CDB677750A420FEE807EACF21EB9898AE79B9768766E4FAA04A2D4A34")
            .unwrap()), Err(Error::InvalidPublicKey));
    }

    #[test]
    fn sign_verify() {
        let mut rng = DRNG::from_seed(b"schnorr");
        for flags in [ContextFlags::NONE, ContextFlags::SIGN | ContextFlags::VERIFY] {
            let mut ctx = Context::new(flags).unwrap();
            ctx.randomize_with_rng(&mut rng);
            for i in 0..8 {
                let kp = Keypair::generate(&ctx, &mut rng);
                let (pk, _) = kp.x_only_public_key();
                let mut msg = [0u8; 40];
                rng.fill_bytes(&mut msg);
                let msg = &msg[..(i * 5)];

                let sig = ctx.sign_schnorr(&kp, msg, None).unwrap();
                assert!(ctx.verify_schnorr(&pk, msg, &sig));
                let zero_aux = ctx.sign_schnorr(&kp, msg, Some(&[0u8; 32])).unwrap();
                assert_eq!(sig, zero_aux);

                let sig2 = ctx.sign_schnorr_with_rng(&kp, msg, &mut rng).unwrap();
                assert!(sig2 != sig);
                assert!(ctx.verify_schnorr(&pk, msg, &sig2));

                let mut m2 = [0u8; 41];
                m2[..msg.len()].copy_from_slice(msg);
                assert!(!ctx.verify_schnorr(&pk, &m2[..(msg.len() + 1)], &sig));

                let mut b = sig.to_bytes();
                b[63] ^= 1;
                assert!(!ctx.verify_schnorr(&pk, msg, &Signature::from_bytes(b)));
                let mut b = sig.to_bytes();
                b[7] ^= 0x40;
                assert!(!ctx.verify_schnorr(&pk, msg, &Signature::from_bytes(b)));

                let other = PrivateKey::generate(&mut rng).public_key(&ctx);
                let (opk, _) = other.x_only_public_key();
                assert!(!ctx.verify_schnorr(&opk, msg, &sig));
            }
        }
    }

    #[test]
    fn out_of_range() {
        let ctx = Context::default();
        let kp = Keypair::from_seed(&ctx, b"schnorr range");
        let (pk, _) = kp.x_only_public_key();
        let sig = ctx.sign_schnorr(&kp, b"msg", None).unwrap();

        // s replaced with n, r replaced with p.
        let n = hex::decode(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141")
            .unwrap();
        let p = hex::decode(
            "FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F")
            .unwrap();
        let mut b = sig.to_bytes();
        b[32..].copy_from_slice(&n);
        assert!(!ctx.verify_schnorr(&pk, b"msg", &Signature::from_bytes(b)));
        let mut b = sig.to_bytes();
        b[..32].copy_from_slice(&p);
        assert!(!ctx.verify_schnorr(&pk, b"msg", &Signature::from_bytes(b)));

        assert_eq!(Signature::decode(&[0u8; 63]), Err(Error::InvalidSignatureEncoding));
        assert_eq!(Signature::decode(&sig.to_bytes()).unwrap(), sig);
    }
}
