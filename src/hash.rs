//! SHA-256 and the constructions built on it.
//!
//! This module provides:
//!
//!  - `Sha256`: incremental SHA-256 (FIPS 180-4), with support for
//!    starting from a precomputed midstate;
//!  - `tagged_hash()`: BIP340 tagged hashing,
//!    `SHA256(SHA256(tag) || SHA256(tag) || data)`;
//!  - `HmacSha256`: HMAC (RFC 2104) over SHA-256;
//!  - `Rfc6979`: the HMAC-DRBG of RFC 6979 (section 3.2), used for
//!    deterministic ECDSA nonces and context randomization.
//!
//! Hash states that may contain secret data (HMAC keys, DRBG state)
//! are wiped when dropped.

use zeroize::Zeroize;

// SHA-256 initial value.
const IV: [u32; 8] = [
    0x6A09E667, 0xBB67AE85, 0x3C6EF372, 0xA54FF53A,
    0x510E527F, 0x9B05688C, 0x1F83D9AB, 0x5BE0CD19,
];

// Round constants.
const K: [u32; 64] = [
    0x428A2F98, 0x71374491, 0xB5C0FBCF, 0xE9B5DBA5,
    0x3956C25B, 0x59F111F1, 0x923F82A4, 0xAB1C5ED5,
    0xD807AA98, 0x12835B01, 0x243185BE, 0x550C7DC3,
    0x72BE5D74, 0x80DEB1FE, 0x9BDC06A7, 0xC19BF174,
    0xE49B69C1, 0xEFBE4786, 0x0FC19DC6, 0x240CA1CC,
    0x2DE92C6F, 0x4A7484AA, 0x5CB0A9DC, 0x76F988DA,
    0x983E5152, 0xA831C66D, 0xB00327C8, 0xBF597FC7,
    0xC6E00BF3, 0xD5A79147, 0x06CA6351, 0x14292967,
    0x27B70A85, 0x2E1B2138, 0x4D2C6DFC, 0x53380D13,
    0x650A7354, 0x766A0ABB, 0x81C2C92E, 0x92722C85,
    0xA2BFE8A1, 0xA81A664B, 0xC24B8B70, 0xC76C51A3,
    0xD192E819, 0xD6990624, 0xF40E3585, 0x106AA070,
    0x19A4C116, 0x1E376C08, 0x2748774C, 0x34B0BCB5,
    0x391C0CB3, 0x4ED8AA4A, 0x5B9CCA4F, 0x682E6FF3,
    0x748F82EE, 0x78A5636F, 0x84C87814, 0x8CC70208,
    0x90BEFFFA, 0xA4506CEB, 0xBEF9A3F7, 0xC67178F2,
];

/// Midstate after absorbing `SHA256("BIP0340/aux")` twice.
pub const BIP340_AUX_MIDSTATE: [u32; 8] = [
    0x24DD3219, 0x4EBA7E70, 0xCA0FABB9, 0x0FA3166D,
    0x3AFBE4B1, 0x4C44DF97, 0x4AAC2739, 0x249E850A,
];

/// Midstate after absorbing `SHA256("BIP0340/nonce")` twice.
pub const BIP340_NONCE_MIDSTATE: [u32; 8] = [
    0x46615B35, 0xF4BFBFF7, 0x9F8DC671, 0x83627AB3,
    0x60217180, 0x57358661, 0x21A29E54, 0x68B07B4C,
];

/// Midstate after absorbing `SHA256("BIP0340/challenge")` twice.
pub const BIP340_CHALLENGE_MIDSTATE: [u32; 8] = [
    0x9CECBA11, 0x23925381, 0x11679112, 0xD1627E0F,
    0x97C87550, 0x003CC765, 0x90F61164, 0x33E9B66A,
];

/// SHA-256 implementation.
///
/// Cloning captures the current object state. `finalize_reset()`
/// returns the instance to the state it was created in (which, for
/// tagged or midstate instances, includes the absorbed prefix).
#[derive(Clone, Debug)]
pub struct Sha256 {
    h: [u32; 8],
    buf: [u8; 64],
    ctr: u64,
    h0: [u32; 8],
    ctr0: u64,
}

impl Sha256 {

    /// Creates a new instance.
    pub fn new() -> Self {
        Self::from_midstate(&IV, 0)
    }

    /// Creates an instance from a chaining state `h` obtained after
    /// processing `blocks` full 64-byte blocks.
    pub fn from_midstate(h: &[u32; 8], blocks: u64) -> Self {
        Self {
            h: *h,
            buf: [0u8; 64],
            ctr: blocks << 6,
            h0: *h,
            ctr0: blocks << 6,
        }
    }

    /// Creates an instance for the BIP340 tagged hash with the given
    /// tag: `SHA256(tag)` is absorbed twice.
    pub fn new_tagged(tag: &[u8]) -> Self {
        let t = Self::hash(tag);
        let mut sh = Self::new();
        sh.update(t);
        sh.update(t);
        sh.h0 = sh.h;
        sh.ctr0 = sh.ctr;
        sh
    }

    pub(crate) fn bip340_aux() -> Self {
        Self::from_midstate(&BIP340_AUX_MIDSTATE, 1)
    }

    pub(crate) fn bip340_nonce() -> Self {
        Self::from_midstate(&BIP340_NONCE_MIDSTATE, 1)
    }

    pub(crate) fn bip340_challenge() -> Self {
        Self::from_midstate(&BIP340_CHALLENGE_MIDSTATE, 1)
    }

    /// Processes some input bytes; this function can be called
    /// repeatedly.
    pub fn update(&mut self, src: impl AsRef<[u8]>) {
        let src = src.as_ref();
        let mut ptr = (self.ctr as usize) & 63;
        let mut j = 0;
        while j < src.len() {
            let clen = core::cmp::min(src.len() - j, 64 - ptr);
            self.buf[ptr..(ptr + clen)].copy_from_slice(&src[j..(j + clen)]);
            ptr += clen;
            j += clen;
            if ptr == 64 {
                self.process();
                ptr = 0;
            }
        }
        self.ctr = self.ctr.wrapping_add(src.len() as u64);
    }

    /// Returns the current chaining state; meaningful only when the
    /// number of absorbed bytes is a multiple of 64.
    pub fn midstate(&self) -> [u32; 8] {
        self.h
    }

    /// Computes the hash of all bytes injected so far, consuming the
    /// instance.
    pub fn finalize(mut self) -> [u8; 32] {
        self.finalize_reset()
    }

    /// Computes the hash of all bytes injected since the creation (or
    /// the last reset) of this instance, then resets it.
    pub fn finalize_reset(&mut self) -> [u8; 32] {
        let mut ptr = (self.ctr as usize) & 63;
        let bitlen = self.ctr << 3;
        self.buf[ptr] = 0x80;
        ptr += 1;
        if ptr > 56 {
            self.buf[ptr..].fill(0);
            self.process();
            ptr = 0;
        }
        self.buf[ptr..56].fill(0);
        self.buf[56..].copy_from_slice(&bitlen.to_be_bytes());
        self.process();

        let mut r = [0u8; 32];
        for (i, w) in self.h.iter().enumerate() {
            r[(i << 2)..((i << 2) + 4)].copy_from_slice(&w.to_be_bytes());
        }
        self.reset();
        r
    }

    /// Resets this instance to its initial state.
    pub fn reset(&mut self) {
        self.h = self.h0;
        self.ctr = self.ctr0;
        self.buf.zeroize();
    }

    /// One-call hash of a given input.
    pub fn hash(src: impl AsRef<[u8]>) -> [u8; 32] {
        let mut sh = Self::new();
        sh.update(src);
        sh.finalize()
    }

    fn process(&mut self) {
        let mut w = [0u32; 64];
        for (i, c) in self.buf.chunks_exact(4).enumerate() {
            w[i] = u32::from_be_bytes([ c[0], c[1], c[2], c[3] ]);
        }
        for i in 16..64 {
            let x = w[i - 15];
            let y = w[i - 2];
            let s0 = x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3);
            let s1 = y.rotate_right(17) ^ y.rotate_right(19) ^ (y >> 10);
            w[i] = w[i - 16].wrapping_add(s0)
                .wrapping_add(w[i - 7]).wrapping_add(s1);
        }

        let mut s = self.h;
        for i in 0..64 {
            let [a, b, c, d, e, f, g, h] = s;
            let t1 = h
                .wrapping_add(e.rotate_right(6) ^ e.rotate_right(11)
                    ^ e.rotate_right(25))
                .wrapping_add(g ^ (e & (f ^ g)))
                .wrapping_add(K[i])
                .wrapping_add(w[i]);
            let t2 = (a.rotate_right(2) ^ a.rotate_right(13)
                    ^ a.rotate_right(22))
                .wrapping_add((a & b) | (c & (a | b)));
            s = [ t1.wrapping_add(t2), a, b, c, d.wrapping_add(t1), e, f, g ];
        }
        for i in 0..8 {
            self.h[i] = self.h[i].wrapping_add(s[i]);
        }
        w.zeroize();
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Zeroize for Sha256 {
    fn zeroize(&mut self) {
        self.h.zeroize();
        self.buf.zeroize();
        self.ctr = 0;
        self.h0.zeroize();
        self.ctr0 = 0;
    }
}

/// One-call BIP340 tagged hash: `SHA256(SHA256(tag) || SHA256(tag) || data)`
/// where `data` is the concatenation of `parts`.
pub fn tagged_hash(tag: &[u8], parts: &[&[u8]]) -> [u8; 32] {
    let mut sh = Sha256::new_tagged(tag);
    for p in parts {
        sh.update(p);
    }
    sh.finalize()
}

/// HMAC-SHA256.
///
/// The instance keeps key-dependent hash states; they are wiped on drop.
#[derive(Clone)]
pub struct HmacSha256 {
    inner: Sha256,
    outer: Sha256,
}

impl HmacSha256 {

    /// Creates an instance keyed with `key` (of any length).
    pub fn new(key: &[u8]) -> Self {
        let mut k = [0u8; 64];
        if key.len() > 64 {
            k[..32].copy_from_slice(&Sha256::hash(key));
        } else {
            k[..key.len()].copy_from_slice(key);
        }
        for x in k.iter_mut() {
            *x ^= 0x36;
        }
        let mut inner = Sha256::new();
        inner.update(&k);
        for x in k.iter_mut() {
            *x ^= 0x36 ^ 0x5C;
        }
        let mut outer = Sha256::new();
        outer.update(&k);
        k.zeroize();
        Self { inner, outer }
    }

    pub fn update(&mut self, src: impl AsRef<[u8]>) {
        self.inner.update(src);
    }

    /// Computes the MAC over all injected bytes.
    pub fn finalize(mut self) -> [u8; 32] {
        let t = self.inner.finalize_reset();
        self.outer.update(t);
        self.outer.finalize_reset()
    }

    /// One-call MAC over the concatenation of `parts`.
    pub fn mac(key: &[u8], parts: &[&[u8]]) -> [u8; 32] {
        let mut hm = Self::new(key);
        for p in parts {
            hm.update(p);
        }
        hm.finalize()
    }
}

impl Drop for HmacSha256 {
    fn drop(&mut self) {
        self.inner.zeroize();
        self.outer.zeroize();
    }
}

/// HMAC-DRBG with SHA-256, as specified for deterministic nonces in
/// RFC 6979, section 3.2.
///
/// Seeding absorbs the key material once (steps b to g); every call to
/// `generate()` after the first applies the update step
/// `K = HMAC_K(V || 0x00); V = HMAC_K(V)` before producing output, as
/// required when a candidate nonce is rejected (step h.3).
pub struct Rfc6979 {
    k: [u8; 32],
    v: [u8; 32],
    retry: bool,
}

impl Rfc6979 {

    /// Instantiates the generator with seed material `key` (typically
    /// private key, reduced message digest, and optional extra data).
    pub fn new(key: &[u8]) -> Self {
        let mut k = [0x00u8; 32];
        let mut v = [0x01u8; 32];
        for sep in [0x00u8, 0x01u8] {
            k = HmacSha256::mac(&k, &[&v, &[sep], key]);
            v = HmacSha256::mac(&k, &[&v]);
        }
        Self { k, v, retry: false }
    }

    /// Produces the next 32 bytes of output.
    pub fn generate(&mut self) -> [u8; 32] {
        if self.retry {
            self.k = HmacSha256::mac(&self.k, &[&self.v, &[0x00]]);
            self.v = HmacSha256::mac(&self.k, &[&self.v]);
        }
        self.v = HmacSha256::mac(&self.k, &[&self.v]);
        self.retry = true;
        self.v
    }
}

impl Drop for Rfc6979 {
    fn drop(&mut self) {
        self.k.zeroize();
        self.v.zeroize();
        self.retry = false;
    }
}
