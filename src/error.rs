//! Error type for all fallible operations of this crate.
//!
//! Internally, arithmetic code reports conditions with constant-time
//! `u32` masks; these are turned into `Error` values only at the API
//! boundary, on data that is either public or no longer secret.

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid field element encoding")]
    InvalidFieldElement,

    #[error("invalid scalar (zero or not lower than the group order)")]
    InvalidScalar,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("unsupported context flags")]
    ContextCreationFailed,

    #[error("signature generation failed")]
    SigningFailed,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("malformed signature encoding")]
    InvalidSignatureEncoding,

    #[error("invalid tweak")]
    InvalidTweak,

    #[error("invalid recovery id")]
    InvalidRecoveryId,
}
