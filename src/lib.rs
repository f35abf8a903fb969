//! secp256k1-ct is a constant-time implementation of the secp256k1
//! elliptic curve, with the protocols built on it in the Bitcoin
//! ecosystem: ECDSA (with RFC 6979 deterministic nonces, low-S
//! normalization, DER and compact encodings, and public key recovery),
//! BIP340 Schnorr signatures, and ECDH key exchange.
//!
//! The layers are, from the bottom up:
//!
//!  - `field`: arithmetic modulo p = 2^256 - 2^32 - 977;
//!  - `scalar`: arithmetic modulo the curve order n;
//!  - `point`: curve points (projective coordinates, complete formulas)
//!    and their SEC 1 / X-only encodings;
//!  - `hash`: SHA-256, BIP340 tagged hashes, HMAC-SHA256 and the
//!    HMAC-DRBG used for deterministic nonces;
//!  - `context`: the `Context` type, which holds precomputed tables for
//!    multiplications of the generator, and the blinding state;
//!  - `keys`: private keys, public keys, X-only keys and key pairs,
//!    including tweaking;
//!  - `ecdsa`, `schnorr` and `ecdh`: the signature and key exchange
//!    schemes, exposed as methods on `Context`.
//!
//! # Usage
//!
//! ```
//! use secp256k1_ct::{Context, PrivateKey, hash::Sha256};
//!
//! let ctx = Context::default();
//! let sk = PrivateKey::decode(&[0x42u8; 32]).unwrap();
//! let pk = sk.public_key(&ctx);
//! let digest = Sha256::hash(b"Hello");
//! let sig = ctx.sign_ecdsa(&sk, &digest).unwrap();
//! assert!(ctx.verify_ecdsa(&pk, &digest, &sig));
//! ```
//!
//! The library is `no_std` but requires `alloc` (context tables are
//! allocated on the heap). The default `std` feature only enables the
//! standard library flavour of the dependencies.
//!
//! # Conventions
//!
//! All functions are constant-time, unless explicitly documented
//! otherwise (such functions have "vartime" in their name, and are used
//! only on public data, e.g. for signature verification). Booleans that
//! may depend on secret data are represented as `u32` values, with
//! 0xFFFFFFFF for "true" and 0x00000000 for "false"; no other value is
//! allowed. For the same reason, `Eq` and `PartialEq` are not
//! implemented on field elements, scalars and points.
//!
//! Functions that modify the object on which they are called have a
//! name in `set_*()` (e.g. `P.set_double()` doubles `P` in place, while
//! `P.double()` returns a new point). The usual operators (`+`, `-`,
//! `*`, `/`, unary `-`) are implemented on values and references.
//!
//! Secret values (private keys, nonces, DRBG states, ECDH outputs) are
//! held in types that wipe their contents when dropped.
//!
//! Logging goes through `tracing`, and only ever reports non-secret
//! events (context creation, signature decoding failures, nonce
//! retries).

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub(crate) use alloc::vec::Vec;

pub use rand_core::{CryptoRng, RngCore, Error as RngError};

pub mod backend;
pub mod error;
pub mod field;
pub mod scalar;
pub mod point;
pub mod hash;
pub mod context;
pub mod keys;
pub mod ecdsa;
pub mod schnorr;
pub mod ecdh;

pub use error::Error;
pub use context::{Context, ContextFlags};
pub use keys::{PrivateKey, PublicKey, XOnlyPublicKey, Keypair, Parity};
pub use ecdh::SharedSecret;
