#![allow(non_snake_case)]

mod util;
use util::{core_cycles, measure};

use secp256k1_ct::{Context, Keypair, PrivateKey};
use secp256k1_ct::ecdsa::Signature;
use secp256k1_ct::hash::Sha256;
use secp256k1_ct::point::Point;
use secp256k1_ct::scalar::Scalar;

// Scalars and keys are seeded from the cycle counter so that the
// compiler cannot fold the computations.
fn seed_scalar(i: u64) -> Scalar {
    let mut sh = Sha256::new();
    sh.update(core_cycles().to_le_bytes());
    sh.update(i.to_le_bytes());
    Scalar::decode_reduce(&sh.finalize())
}

fn seed_key() -> PrivateKey {
    PrivateKey::from_seed(&seed_scalar(0).encode32())
}

fn bench_mul() -> (f64, u8) {
    let mut s = seed_scalar(0);
    let mut P = Point::mulgen(&s);
    let v = measure(100, || {
        P *= s;
        s += Scalar::ONE;
    });
    (v, P.encode_compressed()[1])
}

fn bench_mulgen(ctx: &Context) -> (f64, u8) {
    let mut s = seed_scalar(0);
    let mut x = 0u8;
    let v = measure(100, || {
        x ^= ctx.mul_gen(&s).encode_compressed()[0];
        s += Scalar::ONE;
    });
    (v, x)
}

fn bench_mul_add_mulgen(ctx: &Context) -> (f64, u8) {
    let uu: Vec<Scalar> = (0..128).map(|i| seed_scalar(2 * i)).collect();
    let vv: Vec<Scalar> = (0..128).map(|i| seed_scalar(2 * i + 1)).collect();
    let mut P = Point::mulgen(&uu[127]);
    let mut j = 0usize;
    let v = measure(128, || {
        let Q = ctx.mul_gen_add_vartime(&P, &uu[j & 127], &vv[(j * 7) & 127]);
        P += Q;
        j += 1;
    });
    (v, P.encode_compressed()[0])
}

fn bench_ecdsa_sign(ctx: &Context) -> (f64, u8) {
    let sk = seed_key();
    let mut msg = [0u8; 32];
    let v = measure(100, || {
        if let Ok(sig) = ctx.sign_ecdsa(&sk, &msg) {
            msg.copy_from_slice(&sig.to_compact()[..32]);
        }
    });
    (v, msg[0])
}

fn bench_ecdsa_verify(ctx: &Context) -> (f64, u8) {
    let sk = seed_key();
    let pk = sk.public_key(ctx);
    let sigs: Vec<Signature> = (0..128u8)
        .filter_map(|i| ctx.sign_ecdsa(&sk, &[i; 32]).ok())
        .collect();
    let mut j = 0usize;
    let mut x = 0u8;
    let v = measure(128, || {
        let i = j % sigs.len();
        x ^= ctx.verify_ecdsa(&pk, &[i as u8; 32], &sigs[i]) as u8;
        j += 1;
    });
    (v, x)
}

fn bench_schnorr_sign(ctx: &Context) -> (f64, u8) {
    let kp = Keypair::new(ctx, seed_key());
    let mut msg = [0u8; 32];
    let v = measure(100, || {
        if let Ok(sig) = ctx.sign_schnorr(&kp, &msg, None) {
            msg.copy_from_slice(&sig.to_bytes()[32..]);
        }
    });
    (v, msg[0])
}

fn bench_schnorr_verify(ctx: &Context) -> (f64, u8) {
    let kp = Keypair::new(ctx, seed_key());
    let (pk, _) = kp.x_only_public_key();
    let sigs: Vec<_> = (0..128u8)
        .filter_map(|i| ctx.sign_schnorr(&kp, &[i; 32], None).ok())
        .collect();
    let mut j = 0usize;
    let mut x = 0u8;
    let v = measure(128, || {
        let i = j % sigs.len();
        x ^= ctx.verify_schnorr(&pk, &[i as u8; 32], &sigs[i]) as u8;
        j += 1;
    });
    (v, x)
}

fn bench_ecdh(ctx: &Context) -> (f64, u8) {
    let sk = seed_key();
    let pk = seed_key().public_key(ctx);
    let mut x = 0u8;
    let v = measure(100, || {
        if let Ok(ss) = ctx.ecdh(&sk, &pk) {
            x ^= ss.as_ref()[0];
        }
    });
    (v, x)
}

fn main() {
    let mut bx = 0u8;
    let ctx = Context::default();

    let (v, x) = bench_mul();
    bx ^= x;
    println!("secp256k1 point mul:           {:13.2}", v);
    let (v, x) = bench_mulgen(&ctx);
    bx ^= x;
    println!("secp256k1 ctx mul_gen:         {:13.2}", v);
    let (v, x) = bench_mul_add_mulgen(&ctx);
    bx ^= x;
    println!("secp256k1 ctx mul_gen_add:     {:13.2}", v);
    let (v, x) = bench_ecdsa_sign(&ctx);
    bx ^= x;
    println!("secp256k1 ECDSA sign:          {:13.2}", v);
    let (v, x) = bench_ecdsa_verify(&ctx);
    bx ^= x;
    println!("secp256k1 ECDSA verify:        {:13.2}", v);
    let (v, x) = bench_schnorr_sign(&ctx);
    bx ^= x;
    println!("secp256k1 Schnorr sign:        {:13.2}", v);
    let (v, x) = bench_schnorr_verify(&ctx);
    bx ^= x;
    println!("secp256k1 Schnorr verify:      {:13.2}", v);
    let (v, x) = bench_ecdh(&ctx);
    bx ^= x;
    println!("secp256k1 ECDH:                {:13.2}", v);

    println!("{}", bx);
}
